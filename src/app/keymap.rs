use std::{fs, path::Path};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;
use tracing::{trace, warn};

use super::input::KeyAction;
use crate::error::KeymapError;

macro_rules! keymap_source {
    () => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/keymap/default.keymap.json"
        ))
    };
}

/// The bundled keymap document, matching [`Keymap::standard`].
pub const DEFAULT_KEYMAP_JSON: &str = keymap_source!();

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    description: String,
    action: RawAction,
    combos: Vec<String>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum RawAction {
    Save,
    Print,
    Back,
    Advance,
    Retreat,
    RetreatIfEmpty,
    RetreatAtStart,
}

impl RawAction {
    fn into_action(self) -> KeyAction {
        match self {
            RawAction::Save => KeyAction::Save,
            RawAction::Print => KeyAction::Print,
            RawAction::Back => KeyAction::Back,
            RawAction::Advance => KeyAction::Advance,
            RawAction::Retreat => KeyAction::Retreat,
            RawAction::RetreatIfEmpty => KeyAction::RetreatIfEmpty,
            RawAction::RetreatAtStart => KeyAction::RetreatAtStart,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    action: KeyAction,
    combos: Vec<KeyPattern>,
    snippet: String,
}

impl KeyBinding {
    fn new(action: KeyAction, combos: Vec<KeyPattern>, description: &str) -> Self {
        let combos_display = combos
            .iter()
            .map(|pattern| pattern.display.clone())
            .collect::<Vec<_>>()
            .join("/");
        let snippet = format!("{combos_display} -> {description}");
        Self {
            action,
            combos,
            snippet,
        }
    }

    fn from_raw(raw: RawEntry) -> Result<Self, KeymapError> {
        if raw.combos.is_empty() {
            return Err(KeymapError::MissingCombos { id: raw.id });
        }
        let combos = raw
            .combos
            .iter()
            .map(|combo| {
                KeyPattern::parse(combo).map_err(|reason| KeymapError::InvalidCombo {
                    id: raw.id.clone(),
                    combo: combo.clone(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(raw.action.into_action(), combos, &raw.description))
    }

    pub fn action(&self) -> KeyAction {
        self.action
    }

    fn matches(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.combos
            .iter()
            .find(|pattern| pattern.matches(key))
            .map(|_| self.action)
    }
}

#[derive(Debug, Clone)]
struct KeyPattern {
    matcher: CodeMatcher,
    required: KeyModifiers,
    allow_shift: bool,
    display: String,
}

impl KeyPattern {
    fn parse(combo: &str) -> Result<Self, String> {
        let display = combo.trim().to_string();
        if display.is_empty() {
            return Err("combo cannot be empty".into());
        }
        let mut tokens = display
            .split('+')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();
        let Some(key_token) = tokens.pop() else {
            return Err("combo must contain key".into());
        };
        let mut required = KeyModifiers::empty();
        for token in tokens {
            match token.to_lowercase().as_str() {
                "ctrl" | "control" => required |= KeyModifiers::CONTROL,
                "shift" => required |= KeyModifiers::SHIFT,
                "alt" => required |= KeyModifiers::ALT,
                other => {
                    return Err(format!("unsupported modifier '{other}'"));
                }
            }
        }
        let mut matcher = CodeMatcher::from_token(key_token)?;
        // crossterm reports shift+tab as BackTab
        if matcher == CodeMatcher::Literal(KeyCode::Tab) && required.contains(KeyModifiers::SHIFT)
        {
            matcher = CodeMatcher::Literal(KeyCode::BackTab);
            required.remove(KeyModifiers::SHIFT);
        }
        Ok(Self::new(matcher, required, display))
    }

    fn new(matcher: CodeMatcher, required: KeyModifiers, display: impl Into<String>) -> Self {
        let allow_shift = matcher.allows_extra_shift() && !required.contains(KeyModifiers::SHIFT);
        Self {
            matcher,
            required,
            allow_shift,
            display: display.into(),
        }
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        if !self.matcher.matches(&key.code) {
            return false;
        }
        if !key.modifiers.contains(self.required) {
            return false;
        }
        let extra = key.modifiers.difference(self.required);
        if self.allow_shift {
            (extra - KeyModifiers::SHIFT).is_empty()
        } else {
            extra.is_empty()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeMatcher {
    Literal(KeyCode),
    Alpha(char),
}

impl CodeMatcher {
    fn from_token(token: &str) -> Result<Self, String> {
        let normalized = token.to_lowercase();
        let matcher = match normalized.as_str() {
            "tab" => CodeMatcher::Literal(KeyCode::Tab),
            "backtab" => CodeMatcher::Literal(KeyCode::BackTab),
            "enter" | "return" => CodeMatcher::Literal(KeyCode::Enter),
            "esc" | "escape" => CodeMatcher::Literal(KeyCode::Esc),
            "space" => CodeMatcher::Literal(KeyCode::Char(' ')),
            "backspace" => CodeMatcher::Literal(KeyCode::Backspace),
            "left" => CodeMatcher::Literal(KeyCode::Left),
            "right" => CodeMatcher::Literal(KeyCode::Right),
            "up" => CodeMatcher::Literal(KeyCode::Up),
            "down" => CodeMatcher::Literal(KeyCode::Down),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => CodeMatcher::Alpha(ch),
                    _ => return Err(format!("unsupported key '{token}'")),
                }
            }
        };
        Ok(matcher)
    }

    fn matches(&self, code: &KeyCode) -> bool {
        match (self, code) {
            (CodeMatcher::Literal(expected), actual) => actual == expected,
            (CodeMatcher::Alpha(expected), KeyCode::Char(actual)) => {
                actual.to_ascii_lowercase() == *expected
            }
            _ => false,
        }
    }

    fn allows_extra_shift(&self) -> bool {
        matches!(
            self,
            CodeMatcher::Alpha(_) | CodeMatcher::Literal(KeyCode::BackTab)
        )
    }
}

/// Ordered key bindings. The first binding matching a key wins.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::standard()
    }
}

impl Keymap {
    /// Save on Ctrl+S, print on Ctrl+P, back on Esc, advance on Enter/Tab,
    /// retreat on Shift+Tab, Space (empty field) and Left (caret at start).
    pub fn standard() -> Self {
        let ctrl = KeyModifiers::CONTROL;
        let none = KeyModifiers::NONE;
        let bindings = vec![
            KeyBinding::new(
                KeyAction::Save,
                vec![KeyPattern::new(CodeMatcher::Alpha('s'), ctrl, "Ctrl+S")],
                "save",
            ),
            KeyBinding::new(
                KeyAction::Print,
                vec![KeyPattern::new(CodeMatcher::Alpha('p'), ctrl, "Ctrl+P")],
                "print",
            ),
            KeyBinding::new(
                KeyAction::Back,
                vec![KeyPattern::new(
                    CodeMatcher::Literal(KeyCode::Esc),
                    none,
                    "Esc",
                )],
                "back",
            ),
            KeyBinding::new(
                KeyAction::Advance,
                vec![
                    KeyPattern::new(CodeMatcher::Literal(KeyCode::Enter), none, "Enter"),
                    KeyPattern::new(CodeMatcher::Literal(KeyCode::Tab), none, "Tab"),
                ],
                "next field",
            ),
            KeyBinding::new(
                KeyAction::Retreat,
                vec![KeyPattern::new(
                    CodeMatcher::Literal(KeyCode::BackTab),
                    none,
                    "Shift+Tab",
                )],
                "previous field",
            ),
            KeyBinding::new(
                KeyAction::RetreatIfEmpty,
                vec![KeyPattern::new(
                    CodeMatcher::Literal(KeyCode::Char(' ')),
                    none,
                    "Space",
                )],
                "previous field (empty input)",
            ),
            KeyBinding::new(
                KeyAction::RetreatAtStart,
                vec![KeyPattern::new(
                    CodeMatcher::Literal(KeyCode::Left),
                    none,
                    "Left",
                )],
                "previous field (caret at start)",
            ),
        ];
        Self { bindings }
    }

    pub fn from_json(source: &str) -> Result<Self, KeymapError> {
        let raw_entries: Vec<RawEntry> = serde_json::from_str(source)?;
        let bindings = raw_entries
            .into_iter()
            .map(KeyBinding::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        if bindings.is_empty() {
            warn!("keymap document declares no bindings; no keys will be recognised");
        }
        Ok(Self { bindings })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeymapError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| KeymapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source)
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    pub fn classify(&self, key: &KeyEvent) -> Option<KeyAction> {
        let action = self.bindings.iter().find_map(|binding| binding.matches(key));
        trace!(code = ?key.code, modifiers = ?key.modifiers, ?action, "key classified");
        action
    }

    pub fn help_text(&self) -> String {
        self.bindings
            .iter()
            .map(|binding| binding.snippet.as_str())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}
