use std::fmt;

use anyhow::Result;

use super::input::Chord;

pub type ShortcutCallback = Box<dyn FnMut() -> Result<()>>;

/// Callbacks fired by the save, print and back chords.
///
/// Errors returned by a callback are not caught; they surface from the
/// dispatch call that triggered them.
#[derive(Default)]
pub struct ShortcutHandlers {
    pub on_save: Option<ShortcutCallback>,
    pub on_print: Option<ShortcutCallback>,
    pub on_back: Option<ShortcutCallback>,
}

impl ShortcutHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_save(mut self, callback: impl FnMut() -> Result<()> + 'static) -> Self {
        self.on_save = Some(Box::new(callback));
        self
    }

    pub fn on_print(mut self, callback: impl FnMut() -> Result<()> + 'static) -> Self {
        self.on_print = Some(Box::new(callback));
        self
    }

    pub fn on_back(mut self, callback: impl FnMut() -> Result<()> + 'static) -> Self {
        self.on_back = Some(Box::new(callback));
        self
    }

    fn slot(&mut self, chord: Chord) -> &mut Option<ShortcutCallback> {
        match chord {
            Chord::Save => &mut self.on_save,
            Chord::Print => &mut self.on_print,
            Chord::Back => &mut self.on_back,
        }
    }

    /// Lends the callback out while it runs, so the callback may borrow the
    /// navigator that owns it. A chord fired again from inside its own
    /// callback finds the slot empty.
    pub(crate) fn take(&mut self, chord: Chord) -> Option<ShortcutCallback> {
        self.slot(chord).take()
    }

    pub(crate) fn restore(&mut self, chord: Chord, callback: ShortcutCallback) {
        let slot = self.slot(chord);
        if slot.is_none() {
            *slot = Some(callback);
        }
    }
}

impl fmt::Debug for ShortcutHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutHandlers")
            .field("on_save", &self.on_save.is_some())
            .field("on_print", &self.on_print.is_some())
            .field("on_back", &self.on_back.is_some())
            .finish()
    }
}
