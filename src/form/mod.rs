mod actions;
mod cursor;
mod descriptor;
mod handle;
mod registry;
mod sequencer;

pub use actions::{NavCommand, apply_command};
pub use cursor::{Anchor, Cursor, CursorSync};
pub use descriptor::{Enablement, FieldDescriptor};
pub use handle::{FieldHandle, Invocation, TextEntry, invoke};
pub use registry::Registry;
pub use sequencer::{FieldSequencer, Navigation};
