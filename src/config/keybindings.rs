//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to grid actions.
///
/// Provides default vim-style bindings.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&key).copied()
    }

    /// Bind `key` to `action`, replacing any existing binding.
    pub fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let plain = |c: char| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        let shifted = |c: char| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);
        let ctrl = |c: char| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        let key = |code: KeyCode| KeyEvent::new(code, KeyModifiers::NONE);

        let entries = [
            // Vim-style scrolling
            (plain('j'), KeyAction::ScrollDown),
            (plain('k'), KeyAction::ScrollUp),
            (plain('h'), KeyAction::ScrollLeft),
            (plain('l'), KeyAction::ScrollRight),
            (plain('g'), KeyAction::ScrollToTop),
            (shifted('G'), KeyAction::ScrollToBottom),
            // Arrow keys and paging
            (key(KeyCode::Down), KeyAction::ScrollDown),
            (key(KeyCode::Up), KeyAction::ScrollUp),
            (key(KeyCode::Left), KeyAction::ScrollLeft),
            (key(KeyCode::Right), KeyAction::ScrollRight),
            (key(KeyCode::Home), KeyAction::ScrollToTop),
            (key(KeyCode::End), KeyAction::ScrollToBottom),
            (key(KeyCode::PageDown), KeyAction::PageDown),
            (key(KeyCode::PageUp), KeyAction::PageUp),
            (ctrl('d'), KeyAction::PageDown),
            (ctrl('u'), KeyAction::PageUp),
            // Column focus
            (key(KeyCode::Tab), KeyAction::NextColumn),
            (
                KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT),
                KeyAction::PrevColumn,
            ),
            // Column layout
            (plain('['), KeyAction::PinLeft),
            (plain(']'), KeyAction::PinRight),
            (plain('u'), KeyAction::Unpin),
            (plain('+'), KeyAction::Widen),
            (plain('-'), KeyAction::Narrow),
            (plain('='), KeyAction::Autosize),
            (shifted('F'), KeyAction::FitColumns),
            (plain('<'), KeyAction::MoveColumnLeft),
            (shifted('<'), KeyAction::MoveColumnLeft),
            (plain('>'), KeyAction::MoveColumnRight),
            (shifted('>'), KeyAction::MoveColumnRight),
            (plain('x'), KeyAction::HideColumn),
            (shifted('X'), KeyAction::ShowAllColumns),
            // Query
            (plain('s'), KeyAction::ToggleSort),
            (plain('n'), KeyAction::NextPage),
            (plain('p'), KeyAction::PrevPage),
            // Rows
            (plain(' '), KeyAction::ToggleSelect),
            (plain('a'), KeyAction::SelectAll),
            (key(KeyCode::Esc), KeyAction::ClearSelection),
            (key(KeyCode::Enter), KeyAction::ToggleExpand),
            (plain('e'), KeyAction::ExpandAll),
            (plain('c'), KeyAction::CollapseAll),
            // Application controls
            (ctrl('s'), KeyAction::SaveSettings),
            (shifted('R'), KeyAction::ResetSettings),
            (plain('r'), KeyAction::Refresh),
            (plain('q'), KeyAction::Quit),
            (ctrl('c'), KeyAction::Quit),
        ];

        Self {
            bindings: entries.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_pinning() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('['), KeyModifiers::NONE)),
            Some(KeyAction::PinLeft)
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char(']'), KeyModifiers::NONE)),
            Some(KeyAction::PinRight)
        );
    }

    #[test]
    fn angle_brackets_move_columns_with_or_without_shift() {
        let bindings = KeyBindings::default();
        for modifiers in [KeyModifiers::NONE, KeyModifiers::SHIFT] {
            assert_eq!(
                bindings.get(KeyEvent::new(KeyCode::Char('>'), modifiers)),
                Some(KeyAction::MoveColumnRight)
            );
        }
    }

    #[test]
    fn bind_replaces_existing_action() {
        let mut bindings = KeyBindings::default();
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        bindings.bind(q, KeyAction::Refresh);
        assert_eq!(bindings.get(q), Some(KeyAction::Refresh));
    }
}
