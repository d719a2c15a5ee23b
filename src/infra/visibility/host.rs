use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::{
    domain::visibility::{VisibilityHandler, VisibilityState},
    ports::VisibilityPort,
};

pub type HostListener = Box<dyn Fn() + Send + Sync>;

pub trait VisibilityHost: Send + Sync {
    fn hidden_attribute(&self, name: &str) -> Option<bool>;
    fn listen(&self, event: &str, listener: HostListener);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSignal {
    pub hidden_attribute: &'static str,
    pub change_event: &'static str,
}

// Probed in order; the first attribute the host offers wins.
pub const HOST_SIGNALS: [HostSignal; 4] = [
    HostSignal {
        hidden_attribute: "hidden",
        change_event: "visibilitychange",
    },
    HostSignal {
        hidden_attribute: "mozHidden",
        change_event: "mozvisibilitychange",
    },
    HostSignal {
        hidden_attribute: "msHidden",
        change_event: "msvisibilitychange",
    },
    HostSignal {
        hidden_attribute: "webkitHidden",
        change_event: "webkitvisibilitychange",
    },
];

// Handlers run while the monitor is locked and must not call back into it.
#[derive(Debug)]
pub struct HostVisibilityMonitor {
    state: Arc<Mutex<VisibilityState>>,
    signal: Option<HostSignal>,
}

impl HostVisibilityMonitor {
    pub fn always_visible() -> Self {
        Self {
            state: Arc::new(Mutex::new(VisibilityState::new(true))),
            signal: None,
        }
    }

    pub fn detect<H>(host: Arc<H>) -> Self
    where
        H: VisibilityHost + 'static,
    {
        let detected = HOST_SIGNALS.iter().find_map(|signal| {
            host.hidden_attribute(signal.hidden_attribute)
                .map(|hidden| (*signal, hidden))
        });
        let Some((signal, hidden)) = detected else {
            tracing::debug!("host offers no visibility signal; treating as always visible");
            return Self::always_visible();
        };

        tracing::debug!(
            attribute = signal.hidden_attribute,
            event = signal.change_event,
            "bound host visibility signal"
        );
        let state = Arc::new(Mutex::new(VisibilityState::new(!hidden)));
        let listener_state = Arc::clone(&state);
        let weak_host: Weak<H> = Arc::downgrade(&host);
        host.listen(
            signal.change_event,
            Box::new(move || {
                let Some(host) = weak_host.upgrade() else {
                    return;
                };
                let hidden = host
                    .hidden_attribute(signal.hidden_attribute)
                    .unwrap_or(false);
                lock(&listener_state).update(!hidden);
            }),
        );

        Self {
            state,
            signal: Some(signal),
        }
    }

    pub fn signal(&self) -> Option<HostSignal> {
        self.signal
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).is_visible()
    }
}

impl Default for HostVisibilityMonitor {
    fn default() -> Self {
        Self::always_visible()
    }
}

impl VisibilityPort for HostVisibilityMonitor {
    fn add_handler(&self, handler: VisibilityHandler) {
        lock(&self.state).register(handler);
    }
}

pub(super) fn lock(state: &Mutex<VisibilityState>) -> MutexGuard<'_, VisibilityState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
