use super::{
    handle::FieldHandle,
    sequencer::{FieldSequencer, Navigation},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
    Focus(String),
    Sync(String),
}

pub fn apply_command<H: FieldHandle>(
    sequencer: &mut FieldSequencer<H>,
    command: NavCommand,
) -> Navigation {
    match command {
        NavCommand::Next => sequencer.focus_next(),
        NavCommand::Previous => sequencer.focus_previous(),
        NavCommand::Focus(id) => sequencer.focus_field(&id),
        NavCommand::Sync(id) => {
            if sequencer.set_current_field(&id) {
                Navigation::Synced { id }
            } else {
                Navigation::Unchanged
            }
        }
    }
}
