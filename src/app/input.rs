use crossterm::event::KeyEvent;

use crate::form::{NavCommand, TextEntry};

/// What a recognised key asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Save,
    Print,
    Back,
    Advance,
    Retreat,
    /// Retreat only from an empty text entry (bare space).
    RetreatIfEmpty,
    /// Retreat only when the caret sits at the start of a text entry.
    RetreatAtStart,
}

impl KeyAction {
    pub fn is_chord(self) -> bool {
        matches!(self, KeyAction::Save | KeyAction::Print | KeyAction::Back)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chord {
    Save,
    Print,
    Back,
}

/// Where a key event goes once the keymap and the focused field have been
/// consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDispatch {
    Chord(Chord),
    Navigate(NavCommand),
    /// Leave the key to the focused widget.
    Input(KeyEvent),
}

#[derive(Debug, Clone, Copy)]
pub struct RetreatRules {
    pub space_retreats: bool,
    pub arrow_left_retreats: bool,
}

pub fn route(
    action: Option<KeyAction>,
    key: &KeyEvent,
    focused: Option<TextEntry>,
    rules: RetreatRules,
) -> KeyDispatch {
    let Some(action) = action else {
        return KeyDispatch::Input(*key);
    };
    match action {
        KeyAction::Save => KeyDispatch::Chord(Chord::Save),
        KeyAction::Print => KeyDispatch::Chord(Chord::Print),
        KeyAction::Back => KeyDispatch::Chord(Chord::Back),
        KeyAction::Advance => KeyDispatch::Navigate(NavCommand::Next),
        KeyAction::Retreat => KeyDispatch::Navigate(NavCommand::Previous),
        KeyAction::RetreatIfEmpty => {
            if rules.space_retreats && focused.is_some_and(|entry| entry.is_empty()) {
                KeyDispatch::Navigate(NavCommand::Previous)
            } else {
                KeyDispatch::Input(*key)
            }
        }
        KeyAction::RetreatAtStart => {
            if rules.arrow_left_retreats && focused.is_some_and(|entry| entry.caret_at_start()) {
                KeyDispatch::Navigate(NavCommand::Previous)
            } else {
                KeyDispatch::Input(*key)
            }
        }
    }
}
