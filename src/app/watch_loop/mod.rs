use std::{
    io::{self, Write},
    sync::Arc,
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream},
    tty::IsTty,
};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    app::{
        future_poll::FuturePoll,
        poller::{Poller, PollerOptions},
    },
    config::Config,
    infra::visibility::{HostVisibilityMonitor, TerminalFocusHost, TerminalSession},
    ports::{ClockPort, FetchPort, VisibilityPort},
};

mod output;
mod stream_controller;

use output::{format_change_line, format_error_line, write_line};
use stream_controller::{handle_stream_event, LoopControl};

enum WatchUpdate {
    Changed(Value),
    Failed(anyhow::Error),
}

pub async fn run_watch<F, K>(
    config: &Config,
    source: F,
    clock: &K,
    max_changes: Option<usize>,
) -> Result<()>
where
    F: FetchPort<Value, anyhow::Error> + 'static,
    K: ClockPort,
{
    let session = if config.pause_when_hidden && io::stdin().is_tty() && io::stdout().is_tty() {
        Some(TerminalSession::enter()?)
    } else {
        None
    };
    let raw_mode = session.is_some();

    let focus_host = Arc::new(TerminalFocusHost::new());
    let visibility: Arc<dyn VisibilityPort> = if raw_mode {
        Arc::new(HostVisibilityMonitor::detect(Arc::clone(&focus_host)))
    } else {
        Arc::new(HostVisibilityMonitor::always_visible())
    };

    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let change_tx = updates_tx.clone();
    let options = PollerOptions::new(
        FuturePoll::new(source),
        Duration::from_millis(config.wait_time_ms),
    )
    .on_change(move |value: &Value| {
        let _ = change_tx.send(WatchUpdate::Changed(value.clone()));
    })
    .on_error(move |err: anyhow::Error| {
        let _ = updates_tx.send(WatchUpdate::Failed(err));
    })
    .visibility(visibility);

    let poller = Poller::new(options)?;
    poller.start_once();

    let mut reader = raw_mode.then(EventStream::new);
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut change_count = 0usize;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else {
                    break;
                };
                match update {
                    WatchUpdate::Changed(value) => {
                        let line = format_change_line(&value, clock.now())?;
                        write_line(&mut stdout, &line, raw_mode)?;
                        change_count += 1;
                        if max_changes.is_some_and(|max| change_count >= max) {
                            break;
                        }
                    }
                    WatchUpdate::Failed(err) => {
                        let line = format_error_line(&err, clock.now());
                        write_line(&mut stderr, &line, raw_mode)?;
                    }
                }
            }
            maybe_event = next_terminal_event(&mut reader) => {
                if handle_stream_event(maybe_event, &focus_host) == LoopControl::Quit {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    stdout.flush()?;
    drop(session);
    Ok(())
}

async fn next_terminal_event(reader: &mut Option<EventStream>) -> Option<io::Result<Event>> {
    match reader.as_mut() {
        Some(reader) => reader.next().await,
        None => std::future::pending().await,
    }
}
