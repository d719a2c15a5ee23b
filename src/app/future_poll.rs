use std::sync::Arc;

use crate::{
    app::poller::PollCompletion,
    ports::{FetchPort, PollPort},
};

#[derive(Debug)]
pub struct FuturePoll<F> {
    fetch: Arc<F>,
}

impl<F> FuturePoll<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch: Arc::new(fetch),
        }
    }
}

impl<F> Clone for FuturePoll<F> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<T, E, F> PollPort<T, E> for FuturePoll<F>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FetchPort<T, E> + 'static,
{
    fn poll(&self, completion: PollCompletion<T, E>) {
        let fetch = Arc::clone(&self.fetch);
        tokio::spawn(async move {
            match fetch.fetch().await {
                Ok(value) => completion.success(value),
                Err(err) => completion.error(err),
            }
        });
    }
}
