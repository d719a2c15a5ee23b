use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::poller::PollCompletion;

pub use crate::domain::visibility::VisibilityHandler;

/// A callback-style poll operation.
///
/// Each invocation must eventually resolve `completion` with exactly one of
/// `success` or `error`. A completion that is dropped unresolved keeps the
/// poller waiting forever.
pub trait PollPort<T, E>: Send + Sync {
    fn poll(&self, completion: PollCompletion<T, E>);
}

impl<T, E, F> PollPort<T, E> for F
where
    F: Fn(PollCompletion<T, E>) + Send + Sync,
{
    fn poll(&self, completion: PollCompletion<T, E>) {
        self(completion)
    }
}

#[async_trait]
pub trait FetchPort<T, E>: Send + Sync {
    async fn fetch(&self) -> Result<T, E>;
}

pub trait VisibilityPort: Send + Sync {
    fn add_handler(&self, handler: VisibilityHandler);
}

pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
