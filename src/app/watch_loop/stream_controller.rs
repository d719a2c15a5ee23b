use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::infra::visibility::TerminalFocusHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoopControl {
    Continue,
    Quit,
}

pub(super) fn handle_stream_event(
    maybe_event: Option<Result<Event, std::io::Error>>,
    focus: &TerminalFocusHost,
) -> LoopControl {
    match maybe_event {
        Some(Ok(Event::Key(key))) => {
            if is_quit_key(key) {
                LoopControl::Quit
            } else {
                LoopControl::Continue
            }
        }
        Some(Ok(event)) => {
            if focus.handle_event(&event) {
                tracing::debug!(focused = focus.is_focused(), "terminal focus changed");
            }
            LoopControl::Continue
        }
        Some(Err(err)) => {
            tracing::warn!(error = %err, "input stream failed");
            LoopControl::Continue
        }
        None => LoopControl::Quit,
    }
}

fn is_quit_key(key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('d') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
