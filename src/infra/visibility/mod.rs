mod host;
mod manual;
mod terminal;

pub use host::{HostListener, HostSignal, HostVisibilityMonitor, VisibilityHost, HOST_SIGNALS};
pub use manual::ManualVisibility;
pub use terminal::{TerminalFocusHost, TerminalSession};
