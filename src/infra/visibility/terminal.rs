use std::{
    io::{self, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};

use super::host::{HostListener, VisibilityHost};

const HIDDEN_ATTRIBUTE: &str = "hidden";
const CHANGE_EVENT: &str = "visibilitychange";

struct FocusInner {
    focused: bool,
    listeners: Vec<Arc<dyn Fn() + Send + Sync>>,
}

pub struct TerminalFocusHost {
    inner: Mutex<FocusInner>,
}

impl TerminalFocusHost {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FocusInner {
                focused: true,
                listeners: Vec::new(),
            }),
        }
    }

    pub fn is_focused(&self) -> bool {
        self.lock().focused
    }

    pub fn apply_focus(&self, focused: bool) {
        let listeners = {
            let mut inner = self.lock();
            inner.focused = focused;
            inner.listeners.clone()
        };
        for listener in listeners {
            listener();
        }
    }

    pub fn handle_event(&self, event: &Event) -> bool {
        match event {
            Event::FocusGained => {
                self.apply_focus(true);
                true
            }
            Event::FocusLost => {
                self.apply_focus(false);
                true
            }
            _ => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FocusInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TerminalFocusHost {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityHost for TerminalFocusHost {
    fn hidden_attribute(&self, name: &str) -> Option<bool> {
        (name == HIDDEN_ATTRIBUTE).then(|| !self.is_focused())
    }

    fn listen(&self, event: &str, listener: HostListener) {
        if event == CHANGE_EVENT {
            self.lock().listeners.push(Arc::from(listener));
        }
    }
}

#[derive(Debug)]
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable terminal raw mode")?;
        if let Err(err) = execute!(io::stdout(), EnableFocusChange) {
            let _ = disable_raw_mode();
            return Err(err).context("failed to enable terminal focus reporting");
        }
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, DisableFocusChange) {
            tracing::warn!(error = %err, "failed to disable terminal focus reporting");
        }
        let _ = stdout.flush();
        if let Err(err) = disable_raw_mode() {
            tracing::warn!(error = %err, "failed to restore terminal mode");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crossterm::event::Event;

    use super::TerminalFocusHost;
    use crate::{
        infra::visibility::{HostVisibilityMonitor, VisibilityHost},
        ports::VisibilityPort,
    };

    #[test]
    fn terminal_offers_only_the_standard_attribute() {
        let host = TerminalFocusHost::new();

        assert_eq!(host.hidden_attribute("hidden"), Some(false));
        assert_eq!(host.hidden_attribute("webkitHidden"), None);

        host.apply_focus(false);
        assert_eq!(host.hidden_attribute("hidden"), Some(true));
    }

    #[test]
    fn focus_events_drive_the_host_monitor() {
        let host = Arc::new(TerminalFocusHost::new());
        let monitor = HostVisibilityMonitor::detect(Arc::clone(&host));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        monitor.add_handler(Box::new(move |visible| sink.lock().unwrap().push(visible)));

        assert!(host.handle_event(&Event::FocusLost));
        assert!(!host.handle_event(&Event::Resize(80, 24)));
        assert!(host.handle_event(&Event::FocusGained));

        assert_eq!(*seen.lock().unwrap(), vec![true, false, true]);
    }
}
