use std::fmt;

pub type VisibilityHandler = Box<dyn Fn(bool) + Send + Sync>;

pub struct VisibilityState {
    is_visible: bool,
    handlers: Vec<VisibilityHandler>,
}

impl VisibilityState {
    pub fn new(is_visible: bool) -> Self {
        Self {
            is_visible,
            handlers: Vec::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn register(&mut self, handler: VisibilityHandler) {
        handler(self.is_visible);
        self.handlers.push(handler);
    }

    pub fn update(&mut self, is_visible: bool) {
        self.is_visible = is_visible;
        for handler in &self.handlers {
            handler(is_visible);
        }
    }
}

impl fmt::Debug for VisibilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityState")
            .field("is_visible", &self.is_visible)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
