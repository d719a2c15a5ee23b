use std::sync::{Arc, Mutex};

use super::host::lock;
use crate::{
    domain::visibility::{VisibilityHandler, VisibilityState},
    ports::VisibilityPort,
};

#[derive(Debug, Clone)]
pub struct ManualVisibility {
    state: Arc<Mutex<VisibilityState>>,
}

impl ManualVisibility {
    pub fn new(is_visible: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(VisibilityState::new(is_visible))),
        }
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).is_visible()
    }

    pub fn set_visible(&self, is_visible: bool) {
        lock(&self.state).update(is_visible);
    }
}

impl VisibilityPort for ManualVisibility {
    fn add_handler(&self, handler: VisibilityHandler) {
        lock(&self.state).register(handler);
    }
}
