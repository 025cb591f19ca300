#![deny(rust_2018_idioms)]

mod app;
mod error;
mod form;

pub use app::{
    Chord, DEFAULT_KEYMAP_JSON, FormNavigator, KeyAction, KeyBinding, KeyFlow, KeyHub,
    KeyListener, KeyOutcome, Keymap, ListenerGuard, MountedForm, NavigatorOptions, READY_STATUS,
    RequestStatus, RequestTracker, ShortcutCallback, ShortcutHandlers,
};
pub use error::{KeymapError, NavigatorError};
pub use form::{
    Anchor, Cursor, CursorSync, Enablement, FieldDescriptor, FieldHandle, FieldSequencer,
    Invocation, NavCommand, Navigation, Registry, TextEntry, apply_command, invoke,
};

pub mod prelude {
    pub use super::{
        FieldDescriptor, FieldHandle, FormNavigator, KeyHub, NavigatorOptions, ShortcutHandlers,
        TextEntry,
    };
}
