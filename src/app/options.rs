use std::sync::Arc;

use super::{input::RetreatRules, keymap::Keymap};
use crate::form::CursorSync;

#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub enable_global_shortcuts: bool,
    pub space_retreats: bool,
    pub arrow_left_retreats: bool,
    pub cursor_sync: CursorSync,
    pub initial_focus: Option<String>,
    pub keymap: Arc<Keymap>,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            enable_global_shortcuts: true,
            space_retreats: true,
            arrow_left_retreats: true,
            cursor_sync: CursorSync::default(),
            initial_focus: None,
            keymap: Arc::new(Keymap::standard()),
        }
    }
}

impl NavigatorOptions {
    pub fn with_global_shortcuts(mut self, enabled: bool) -> Self {
        self.enable_global_shortcuts = enabled;
        self
    }

    pub fn with_space_retreat(mut self, enabled: bool) -> Self {
        self.space_retreats = enabled;
        self
    }

    pub fn with_arrow_left_retreat(mut self, enabled: bool) -> Self {
        self.arrow_left_retreats = enabled;
        self
    }

    pub fn with_cursor_sync(mut self, sync: CursorSync) -> Self {
        self.cursor_sync = sync;
        self
    }

    /// Focus this field as soon as the navigator is mounted.
    pub fn with_initial_focus(mut self, id: impl Into<String>) -> Self {
        self.initial_focus = Some(id.into());
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = Arc::new(keymap);
        self
    }

    pub fn with_shared_keymap(mut self, keymap: Arc<Keymap>) -> Self {
        self.keymap = keymap;
        self
    }

    pub(crate) fn retreat_rules(&self) -> RetreatRules {
        RetreatRules {
            space_retreats: self.space_retreats,
            arrow_left_retreats: self.arrow_left_retreats,
        }
    }
}
