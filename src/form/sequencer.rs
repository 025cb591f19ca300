use tracing::debug;

use super::{
    cursor::{Anchor, Cursor, CursorSync},
    descriptor::FieldDescriptor,
    handle::{FieldHandle, Invocation, invoke},
    registry::Registry,
};

/// Result of a navigation call. Unreachable targets are not errors; they
/// simply leave the cursor where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved { id: String, invocation: Invocation },
    /// Cursor moved without invoking the field.
    Synced { id: String },
    Unchanged,
}

impl Navigation {
    pub fn moved(&self) -> bool {
        !matches!(self, Navigation::Unchanged)
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Navigation::Moved { id, .. } | Navigation::Synced { id } => Some(id.as_str()),
            Navigation::Unchanged => None,
        }
    }
}

/// Moves keyboard focus through one form's fields.
///
/// The enabled subsequence is recomputed on every call, so fields that get
/// disabled between two keystrokes silently drop out of the order. Navigation
/// never wraps: advancing past the last field or retreating before the first
/// one is a no-op.
#[derive(Debug)]
pub struct FieldSequencer<H> {
    registry: Registry<H>,
    cursor: Cursor,
    sync: CursorSync,
}

impl<H> Default for FieldSequencer<H> {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
            cursor: Cursor::default(),
            sync: CursorSync::default(),
        }
    }
}

impl<H: FieldHandle> FieldSequencer<H> {
    pub fn new(registry: impl Into<Registry<H>>) -> Self {
        Self {
            registry: registry.into(),
            ..Self::default()
        }
    }

    pub fn with_cursor_sync(mut self, sync: CursorSync) -> Self {
        self.sync = sync;
        self
    }

    pub fn cursor_sync(&self) -> CursorSync {
        self.sync
    }

    pub fn focus_next(&mut self) -> Navigation {
        let enabled = self.registry.enabled_indices();
        let anchor = self.cursor.anchor_in(&self.registry, &enabled);

        if let Anchor::On(position) = anchor
            && let Some(target) = self.override_target(enabled[position], &enabled)
        {
            return self.move_to(target);
        }

        let next = match anchor {
            Anchor::Unset => 0,
            Anchor::On(position) => position + 1,
            Anchor::Between { before } => before,
        };
        match enabled.get(next) {
            Some(index) => self.move_to(*index),
            None => Navigation::Unchanged,
        }
    }

    pub fn focus_previous(&mut self) -> Navigation {
        let enabled = self.registry.enabled_indices();
        let previous = match self.cursor.anchor_in(&self.registry, &enabled) {
            Anchor::Unset => None,
            Anchor::On(position) => position.checked_sub(1),
            Anchor::Between { before } => before.checked_sub(1),
        };
        match previous.and_then(|position| enabled.get(position)) {
            Some(index) => self.move_to(*index),
            None => Navigation::Unchanged,
        }
    }

    /// Jumps to `id` and invokes it. Unknown or disabled ids are ignored.
    pub fn focus_field(&mut self, id: &str) -> Navigation {
        match self.enabled_index_of(id) {
            Some(index) => self.move_to(index),
            None => {
                debug!(id, "focus target not reachable");
                Navigation::Unchanged
            }
        }
    }

    /// Moves the cursor onto `id` without invoking the field, for fields the
    /// user focused directly (mouse click). Returns whether the cursor moved.
    pub fn set_current_field(&mut self, id: &str) -> bool {
        if self.enabled_index_of(id).is_none() {
            debug!(id, "cursor sync target not reachable");
            return false;
        }
        self.cursor.set(id);
        true
    }

    pub fn current_field_id(&self) -> Option<&str> {
        self.cursor.id()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor.position(&self.registry)
    }

    pub fn current_handle(&self) -> Option<&H> {
        self.cursor
            .id()
            .and_then(|id| self.registry.get(id))
            .map(|field| &field.handle)
    }

    /// Installs a rebuilt registry, keeping or resetting the cursor according
    /// to the configured [`CursorSync`].
    pub fn replace_fields(&mut self, registry: impl Into<Registry<H>>) {
        self.registry = registry.into();
        self.cursor.resync(&self.registry, self.sync);
        debug!(
            fields = self.registry.len(),
            current = ?self.cursor.id(),
            "registry replaced"
        );
    }

    pub fn fields(&self) -> &Registry<H> {
        &self.registry
    }

    pub fn fields_mut(&mut self) -> &mut Registry<H> {
        &mut self.registry
    }

    pub fn handle(&self, id: &str) -> Option<&H> {
        self.registry.get(id).map(|field| &field.handle)
    }

    pub fn handle_mut(&mut self, id: &str) -> Option<&mut H> {
        self.registry.get_mut(id).map(|field| &mut field.handle)
    }

    fn override_target(&self, from: usize, enabled: &[usize]) -> Option<usize> {
        let field = self.registry.at(from)?;
        let next_id = field.explicit_next.as_deref()?;
        let target = enabled.iter().copied().find(|index| {
            self.registry
                .at(*index)
                .is_some_and(|candidate| candidate.id == next_id)
        });
        if target.is_none() {
            debug!(from = %field.id, next_id, "explicit successor not reachable; advancing in order");
        }
        target
    }

    fn enabled_index_of(&self, id: &str) -> Option<usize> {
        let index = self.registry.position(id)?;
        self.registry
            .at(index)
            .filter(|field| field.is_enabled())
            .map(|_| index)
    }

    fn move_to(&mut self, index: usize) -> Navigation {
        let Some(field) = self.registry.at_mut(index) else {
            return Navigation::Unchanged;
        };
        let invocation = invoke(&mut field.handle);
        let id = field.id.clone();
        debug!(id = %id, ?invocation, "focus moved");
        self.cursor.set(id.clone());
        Navigation::Moved { id, invocation }
    }
}

impl<H: FieldHandle> From<Vec<FieldDescriptor<H>>> for FieldSequencer<H> {
    fn from(fields: Vec<FieldDescriptor<H>>) -> Self {
        Self::new(fields)
    }
}
