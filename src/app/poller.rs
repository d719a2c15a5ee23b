use std::{fmt, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};

use crate::{
    domain::{poller_state::PollerState, throttle::Throttle},
    infra::visibility::HostVisibilityMonitor,
    ports::{PollPort, VisibilityPort},
};

pub use crate::domain::poller_state::PollerStatus;

pub type ChangeSink<T> = Box<dyn FnMut(&T) + Send>;
pub type ErrorSink<E> = Box<dyn FnMut(E) + Send>;

pub struct PollerOptions<T, E> {
    pub poll: Arc<dyn PollPort<T, E>>,
    pub on_error: Option<ErrorSink<E>>,
    pub on_change: Option<ChangeSink<T>>,
    pub wait_time: Duration,
    pub visibility: Option<Arc<dyn VisibilityPort>>,
}

impl<T, E> PollerOptions<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new<P>(poll: P, wait_time: Duration) -> Self
    where
        P: PollPort<T, E> + 'static,
    {
        Self {
            poll: Arc::new(poll),
            on_error: None,
            on_change: None,
            wait_time,
            visibility: None,
        }
    }

    pub fn on_change(mut self, sink: impl FnMut(&T) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(sink));
        self
    }

    pub fn on_error(mut self, sink: impl FnMut(E) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(sink));
        self
    }

    pub fn visibility(mut self, monitor: Arc<dyn VisibilityPort>) -> Self {
        self.visibility = Some(monitor);
        self
    }
}

enum Command<T, E> {
    Start,
    Stop,
    SetPaused(bool),
    Succeeded(T),
    Failed(E),
    Status(oneshot::Sender<PollerStatus>),
}

/// Continuation handed to a [`PollPort`] for one poll invocation.
///
/// Both resolving methods consume the completion, so a single invocation can
/// report at most one outcome.
pub struct PollCompletion<T, E> {
    tx: mpsc::UnboundedSender<Command<T, E>>,
}

impl<T, E> PollCompletion<T, E> {
    pub fn success(self, value: T) {
        if self.tx.send(Command::Succeeded(value)).is_err() {
            tracing::debug!("poll succeeded after the poller driver exited");
        }
    }

    pub fn error(self, err: E) {
        if self.tx.send(Command::Failed(err)).is_err() {
            tracing::debug!("poll failed after the poller driver exited");
        }
    }
}

impl<T, E> fmt::Debug for PollCompletion<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollCompletion").finish_non_exhaustive()
    }
}

pub struct Poller<T, E> {
    tx: mpsc::UnboundedSender<Command<T, E>>,
}

impl<T, E> Clone for Poller<T, E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Poller<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller").finish_non_exhaustive()
    }
}

impl<T, E> Poller<T, E>
where
    T: PartialEq + Send + 'static,
    E: Send + 'static,
{
    pub fn new(options: PollerOptions<T, E>) -> Result<Self> {
        if options.wait_time.is_zero() {
            return Err(anyhow!("wait_time must be greater than zero"));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .context("a poller must be created inside a tokio runtime")?;

        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Driver {
            state: PollerState::new(),
            throttle: Throttle::new(options.wait_time),
            poll: options.poll,
            on_change: options.on_change,
            on_error: options.on_error,
            tx: tx.downgrade(),
            next_poll_deferred: false,
        };

        let visibility: Arc<dyn VisibilityPort> = match options.visibility {
            Some(monitor) => monitor,
            None => Arc::new(HostVisibilityMonitor::always_visible()),
        };
        let weak_tx = tx.downgrade();
        visibility.add_handler(Box::new(move |visible| {
            if let Some(tx) = weak_tx.upgrade() {
                let _ = tx.send(Command::SetPaused(!visible));
            }
        }));

        runtime.spawn(driver.run(rx));
        Ok(Self { tx })
    }

    pub fn start_once(&self) -> &Self {
        self.post(Command::Start);
        self
    }

    pub fn stop(&self) -> &Self {
        self.post(Command::Stop);
        self
    }

    pub fn set_paused(&self, paused: bool) -> &Self {
        self.post(Command::SetPaused(paused));
        self
    }

    pub async fn status(&self) -> Result<PollerStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Status(reply_tx))
            .map_err(|_| anyhow!("poller driver is no longer running"))?;
        reply_rx
            .await
            .context("poller driver dropped the status request")
    }

    fn post(&self, command: Command<T, E>) {
        if self.tx.send(command).is_err() {
            tracing::warn!("poller driver is no longer running");
        }
    }
}

struct Driver<T, E> {
    state: PollerState<T>,
    throttle: Throttle,
    poll: Arc<dyn PollPort<T, E>>,
    on_change: Option<ChangeSink<T>>,
    on_error: Option<ErrorSink<E>>,
    tx: mpsc::WeakUnboundedSender<Command<T, E>>,
    next_poll_deferred: bool,
}

impl<T, E> Driver<T, E>
where
    T: PartialEq + Send + 'static,
    E: Send + 'static,
{
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command<T, E>>) {
        loop {
            let trailing_at = self.throttle.trailing_deadline();

            // Queued commands always win, so a deferred reschedule only runs
            // once pause and visibility updates already posted have settled.
            tokio::select! {
                biased;
                command = rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = tokio::time::sleep_until(trailing_at.unwrap_or_else(Instant::now)),
                    if trailing_at.is_some() =>
                {
                    if self.throttle.fire_trailing(Instant::now()) {
                        self.do_poll();
                    }
                }
                _ = std::future::ready(()), if self.next_poll_deferred => {
                    self.next_poll_deferred = false;
                    self.next_poll();
                }
            }
        }

        tracing::debug!("poller driver exited");
    }

    fn handle(&mut self, command: Command<T, E>) {
        match command {
            Command::Start => {
                if self.state.start_once() {
                    tracing::debug!("poller started");
                    self.next_poll();
                }
            }
            Command::Stop => {
                self.state.stop();
                tracing::debug!("poller stopped");
            }
            Command::SetPaused(paused) => {
                tracing::trace!(paused, "poller pause changed");
                if self.state.set_paused(paused) {
                    self.next_poll();
                }
            }
            Command::Succeeded(value) => {
                let changed = self.state.complete_success(value);
                tracing::trace!(changed, "poll succeeded");
                if changed {
                    if let (Some(sink), Some(value)) =
                        (self.on_change.as_mut(), self.state.last_observed())
                    {
                        sink(value);
                    }
                }
                self.next_poll_deferred = true;
            }
            Command::Failed(err) => {
                self.state.complete_error();
                tracing::debug!("poll failed");
                if let Some(sink) = self.on_error.as_mut() {
                    sink(err);
                }
                self.next_poll_deferred = true;
            }
            Command::Status(reply) => {
                let _ = reply.send(self.state.status());
            }
        }
    }

    fn next_poll(&mut self) {
        if !self.state.can_schedule() {
            return;
        }
        if self.throttle.call(Instant::now()) {
            self.do_poll();
        }
    }

    fn do_poll(&mut self) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        if !self.state.begin_poll() {
            return;
        }

        tracing::trace!("issuing poll");
        self.poll.poll(PollCompletion { tx });
    }
}
