//! Key bindings and mouse → pointer events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pick hand slot 0..3 for keyboard placement.
    Select(usize),
    Left,
    Right,
    Up,
    Down,
    Drop,
    Cancel,
    Pause,
    Restart,
    Quit,
    None,
}

/// Map key event to an action. Arrows and hjkl both move the cursor.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char(c @ '1'..='3') => Action::Select(c as usize - '1' as usize),
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Drop,
        KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

/// Left-button pointer event in terminal cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Press(u16, u16),
    Move(u16, u16),
    Release(u16, u16),
}

pub fn mouse_to_pointer(ev: MouseEvent) -> Option<Pointer> {
    let (col, row) = (ev.column, ev.row);
    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Pointer::Press(col, row)),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(Pointer::Move(col, row))
        }
        MouseEventKind::Up(MouseButton::Left) => Some(Pointer::Release(col, row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_slot_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('1'))), Action::Select(0));
        assert_eq!(key_to_action(key(KeyCode::Char('3'))), Action::Select(2));
        assert_eq!(key_to_action(key(KeyCode::Char('4'))), Action::None);
    }

    #[test]
    fn test_ctrl_c_quits_but_other_ctrl_is_ignored() {
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
        assert_eq!(key_to_action(ctrl('p')), Action::None);
    }

    #[test]
    fn test_mouse_left_button_cycle() {
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Pointer::Press(12, 7))
        );
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some(Pointer::Move(12, 7))
        );
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Up(MouseButton::Left))),
            Some(Pointer::Release(12, 7))
        );
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Down(MouseButton::Right))),
            None
        );
    }
}
