use std::{cell::RefCell, rc::Rc};

use anyhow::Result;
use crossterm::event::KeyEvent;
use tracing::debug;

use super::{
    hub::{KeyFlow, KeyHub, KeyListener, ListenerGuard},
    input::{Chord, KeyDispatch, route},
    options::NavigatorOptions,
    shortcuts::{ShortcutCallback, ShortcutHandlers},
};
use crate::{
    error::NavigatorError,
    form::{FieldHandle, FieldSequencer, Navigation, Registry, apply_command},
};

/// What the navigator did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A chord fired its callback.
    Shortcut(Chord),
    /// Back was pressed with no `on_back` callback; the host should run its
    /// default back navigation (see [`FormNavigator::take_default_back`]).
    DefaultBack,
    Navigated(Navigation),
    /// Not for the navigator; the focused widget should handle it.
    Passed,
}

impl KeyOutcome {
    /// How a hub should treat the key after the navigator saw it.
    pub fn flow(&self) -> KeyFlow {
        match self {
            KeyOutcome::Shortcut(_) | KeyOutcome::DefaultBack => KeyFlow::Consumed,
            KeyOutcome::Navigated(navigation) if navigation.moved() => KeyFlow::Consumed,
            KeyOutcome::Navigated(_) | KeyOutcome::Passed => KeyFlow::Continue,
        }
    }
}

/// Keyboard navigation and global shortcuts for one mounted form.
pub struct FormNavigator<H> {
    sequencer: FieldSequencer<H>,
    handlers: ShortcutHandlers,
    options: NavigatorOptions,
    pending_back: bool,
    firing: Option<Chord>,
}

enum KeyStep {
    Done(KeyOutcome),
    Fire(Chord, ShortcutCallback),
}

impl<H: FieldHandle> FormNavigator<H> {
    pub fn new(
        fields: impl Into<Registry<H>>,
        handlers: ShortcutHandlers,
        options: NavigatorOptions,
    ) -> Self {
        let sequencer = FieldSequencer::new(fields).with_cursor_sync(options.cursor_sync);
        Self {
            sequencer,
            handlers,
            options,
            pending_back: false,
            firing: None,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Result<KeyOutcome> {
        match self.step(key) {
            KeyStep::Done(outcome) => Ok(outcome),
            KeyStep::Fire(chord, mut callback) => {
                let result = callback();
                self.finish_fire(chord, callback);
                result.map(|()| KeyOutcome::Shortcut(chord))
            }
        }
    }

    /// Classifies and applies `key`, lending out the chord callback instead
    /// of running it so the caller can release its borrow first.
    fn step(&mut self, key: &KeyEvent) -> KeyStep {
        let action = self
            .options
            .keymap
            .classify(key)
            .filter(|action| self.options.enable_global_shortcuts || !action.is_chord());
        let focused = self
            .sequencer
            .current_handle()
            .and_then(|handle| handle.text_entry());
        match route(action, key, focused, self.options.retreat_rules()) {
            KeyDispatch::Chord(chord) => self.prepare_fire(chord),
            KeyDispatch::Navigate(command) => KeyStep::Done(KeyOutcome::Navigated(apply_command(
                &mut self.sequencer,
                command,
            ))),
            KeyDispatch::Input(_) => KeyStep::Done(KeyOutcome::Passed),
        }
    }

    fn prepare_fire(&mut self, chord: Chord) -> KeyStep {
        if self.firing == Some(chord) {
            debug!(?chord, "chord pressed from inside its own callback; ignored");
            return KeyStep::Done(KeyOutcome::Passed);
        }
        match self.handlers.take(chord) {
            Some(callback) => {
                debug!(?chord, "shortcut fired");
                self.firing = Some(chord);
                KeyStep::Fire(chord, callback)
            }
            None if chord == Chord::Back => {
                debug!("back pressed without handler; deferring to default back action");
                self.pending_back = true;
                KeyStep::Done(KeyOutcome::DefaultBack)
            }
            None => KeyStep::Done(KeyOutcome::Passed),
        }
    }

    fn finish_fire(&mut self, chord: Chord, callback: ShortcutCallback) {
        self.handlers.restore(chord, callback);
        if self.firing == Some(chord) {
            self.firing = None;
        }
    }

    /// Returns `true` once per unhandled back press.
    pub fn take_default_back(&mut self) -> bool {
        std::mem::take(&mut self.pending_back)
    }

    pub fn focus_next_field(&mut self) -> Navigation {
        self.sequencer.focus_next()
    }

    pub fn focus_previous_field(&mut self) -> Navigation {
        self.sequencer.focus_previous()
    }

    pub fn focus_field(&mut self, id: &str) -> Navigation {
        self.sequencer.focus_field(id)
    }

    pub fn set_current_field(&mut self, id: &str) -> bool {
        self.sequencer.set_current_field(id)
    }

    pub fn current_field_id(&self) -> Option<&str> {
        self.sequencer.current_field_id()
    }

    pub fn replace_fields(&mut self, fields: impl Into<Registry<H>>) {
        self.sequencer.replace_fields(fields);
    }

    pub fn sequencer(&self) -> &FieldSequencer<H> {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut FieldSequencer<H> {
        &mut self.sequencer
    }

    pub fn options(&self) -> &NavigatorOptions {
        &self.options
    }

    pub fn help_text(&self) -> String {
        self.options.keymap.help_text()
    }
}

impl<H: FieldHandle + 'static> FormNavigator<H> {
    /// Attaches the navigator to `hub` and applies the initial focus.
    ///
    /// The listener stays attached until the returned [`MountedForm`] is
    /// dropped. If setup fails after attaching, the listener is detached
    /// before the error is returned.
    pub fn mount(this: &Rc<RefCell<Self>>, hub: &KeyHub) -> Result<MountedForm, NavigatorError> {
        let listening = this.borrow().options.enable_global_shortcuts;
        let guard = if listening {
            let listener = MountedListener {
                navigator: Rc::clone(this),
            };
            Some(hub.attach(Rc::new(RefCell::new(listener))))
        } else {
            None
        };
        let mounted = MountedForm { guard };

        let initial = this.borrow().options.initial_focus.clone();
        if let Some(id) = initial
            && !this.borrow_mut().focus_field(&id).moved()
        {
            return Err(NavigatorError::UnknownInitialFocus { id });
        }
        Ok(mounted)
    }
}

/// What the hub holds for a mounted navigator. Shortcut callbacks run after
/// the navigator borrow is released, so they may call back into it.
struct MountedListener<H> {
    navigator: Rc<RefCell<FormNavigator<H>>>,
}

impl<H: FieldHandle> KeyListener for MountedListener<H> {
    fn on_key(&mut self, key: &KeyEvent) -> Result<KeyFlow> {
        let step = self.navigator.borrow_mut().step(key);
        let outcome = match step {
            KeyStep::Done(outcome) => outcome,
            KeyStep::Fire(chord, mut callback) => {
                let result = callback();
                self.navigator.borrow_mut().finish_fire(chord, callback);
                result?;
                KeyOutcome::Shortcut(chord)
            }
        };
        Ok(outcome.flow())
    }
}

/// Keeps a navigator attached to its hub; dropping it unmounts the form.
#[must_use = "dropping the mount detaches the navigator immediately"]
pub struct MountedForm {
    guard: Option<ListenerGuard>,
}

impl MountedForm {
    pub fn is_listening(&self) -> bool {
        self.guard.is_some()
    }

    pub fn unmount(self) {}
}
