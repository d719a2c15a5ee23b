use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct ChangeRecord<'a> {
    observed_at: DateTime<Utc>,
    value: &'a Value,
}

pub(super) fn format_change_line(value: &Value, observed_at: DateTime<Utc>) -> Result<String> {
    serde_json::to_string(&ChangeRecord { observed_at, value })
        .context("failed to serialize change")
}

pub(super) fn format_error_line(err: &anyhow::Error, failed_at: DateTime<Utc>) -> String {
    format!("{} poll failed: {err:#}", failed_at.to_rfc3339())
}

pub(super) fn write_line<W: Write>(out: &mut W, line: &str, raw_mode: bool) -> io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.write_all(if raw_mode { b"\r\n" } else { b"\n" })?;
    out.flush()
}
