#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerStatus {
    pub started: bool,
    pub stopped: bool,
    pub paused: bool,
    pub is_polling: bool,
    pub has_observed_value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerState<T> {
    started_once: bool,
    stopped: bool,
    paused: bool,
    is_polling: bool,
    last_observed: Option<T>,
}

impl<T> Default for PollerState<T> {
    fn default() -> Self {
        Self {
            started_once: false,
            stopped: true,
            paused: false,
            is_polling: false,
            last_observed: None,
        }
    }
}

impl<T: PartialEq> PollerState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_once(&mut self) -> bool {
        if self.started_once {
            return false;
        }

        self.started_once = true;
        self.stopped = false;
        true
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn set_paused(&mut self, paused: bool) -> bool {
        self.paused = paused;
        !paused && !self.stopped
    }

    pub fn can_schedule(&self) -> bool {
        !self.stopped && !self.paused
    }

    pub fn begin_poll(&mut self) -> bool {
        if self.is_polling || self.stopped {
            return false;
        }

        self.is_polling = true;
        true
    }

    pub fn complete_success(&mut self, value: T) -> bool {
        self.is_polling = false;
        let report = !self.stopped && self.last_observed.as_ref() != Some(&value);
        self.last_observed = Some(value);
        report
    }

    pub fn complete_error(&mut self) {
        self.is_polling = false;
    }

    pub fn last_observed(&self) -> Option<&T> {
        self.last_observed.as_ref()
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn is_polling(&self) -> bool {
        self.is_polling
    }

    pub fn status(&self) -> PollerStatus {
        PollerStatus {
            started: self.started_once,
            stopped: self.stopped,
            paused: self.paused,
            is_polling: self.is_polling,
            has_observed_value: self.last_observed.is_some(),
        }
    }
}
