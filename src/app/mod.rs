mod hub;
pub(crate) mod input;
pub(crate) mod keymap;
mod navigator;
mod options;
mod shortcuts;
mod status;

pub use hub::{KeyFlow, KeyHub, KeyListener, ListenerGuard};
pub use input::{Chord, KeyAction};
pub use keymap::{DEFAULT_KEYMAP_JSON, KeyBinding, Keymap};
pub use navigator::{FormNavigator, KeyOutcome, MountedForm};
pub use options::NavigatorOptions;
pub use shortcuts::{ShortcutCallback, ShortcutHandlers};
pub use status::{READY_STATUS, RequestStatus, RequestTracker};
