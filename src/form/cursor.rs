use super::registry::Registry;

/// What happens to the cursor when the host installs a rebuilt registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorSync {
    /// Keep the cursor on the same field id if the new registry still has it.
    #[default]
    PreserveById,
    /// Forget the cursor; the next advance starts from the first field.
    Reset,
}

/// Where the cursor sits relative to the enabled subsequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Unset,
    /// On an enabled field, at this index of the filtered list.
    On(usize),
    /// The cursor's field exists but is disabled right now. `before` counts
    /// the enabled fields that precede it in tab order.
    Between { before: usize },
}

/// Tracks the last visited field by id, so positions are always recomputed
/// against the current enabled subsequence instead of going stale.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    current: Option<String>,
}

impl Cursor {
    pub fn id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn set(&mut self, id: impl Into<String>) {
        self.current = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_unset(&self) -> bool {
        self.current.is_none()
    }

    pub fn anchor<H>(&self, registry: &Registry<H>) -> Anchor {
        self.anchor_in(registry, &registry.enabled_indices())
    }

    /// Same as [`Cursor::anchor`] against an already computed enabled view,
    /// so predicates run once per navigation call.
    pub fn anchor_in<H>(&self, registry: &Registry<H>, enabled: &[usize]) -> Anchor {
        let Some(id) = self.current.as_deref() else {
            return Anchor::Unset;
        };
        let Some(full_index) = registry.position(id) else {
            return Anchor::Unset;
        };
        match enabled.iter().position(|index| *index == full_index) {
            Some(position) => Anchor::On(position),
            None => Anchor::Between {
                before: enabled.iter().filter(|index| **index < full_index).count(),
            },
        }
    }

    /// Position in the filtered list, `None` when unset or parked on a
    /// disabled field.
    pub fn position<H>(&self, registry: &Registry<H>) -> Option<usize> {
        match self.anchor(registry) {
            Anchor::On(position) => Some(position),
            _ => None,
        }
    }

    pub fn resync<H>(&mut self, registry: &Registry<H>, policy: CursorSync) {
        match policy {
            CursorSync::Reset => self.clear(),
            CursorSync::PreserveById => {
                let known = self
                    .current
                    .as_deref()
                    .is_some_and(|id| registry.position(id).is_some());
                if !known {
                    self.clear();
                }
            }
        }
    }
}
