use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use formnav::{
    CursorSync, FieldDescriptor, FieldHandle, FieldSequencer, Invocation, Navigation, TextEntry,
};

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Clone, Copy)]
enum Kind {
    Input,
    Dropdown,
    Static,
}

struct Recorder {
    id: &'static str,
    kind: Kind,
    log: Log,
}

impl FieldHandle for Recorder {
    fn focus(&mut self) -> bool {
        if matches!(self.kind, Kind::Input) {
            self.log.borrow_mut().push(format!("focus:{}", self.id));
            return true;
        }
        false
    }

    fn activate(&mut self) -> bool {
        if matches!(self.kind, Kind::Dropdown) {
            self.log.borrow_mut().push(format!("activate:{}", self.id));
            return true;
        }
        false
    }

    fn text_entry(&self) -> Option<TextEntry> {
        matches!(self.kind, Kind::Input).then(TextEntry::default)
    }
}

fn field(id: &'static str, log: &Log) -> FieldDescriptor<Recorder> {
    FieldDescriptor::new(
        id,
        Recorder {
            id,
            kind: Kind::Input,
            log: Rc::clone(log),
        },
    )
}

fn sequencer_of(ids: &[&'static str], log: &Log) -> FieldSequencer<Recorder> {
    FieldSequencer::new(ids.iter().map(|id| field(id, log)).collect::<Vec<_>>())
}

fn last(log: &Log) -> Option<String> {
    log.borrow().last().cloned()
}

#[test]
fn next_then_previous_returns_to_start() {
    let log = Log::default();
    let ids = ["order_no", "customer", "product", "qty", "weight"];
    let mut sequencer = sequencer_of(&ids, &log);
    for start in 0..ids.len() - 1 {
        sequencer.focus_field(ids[start]);
        assert!(sequencer.focus_next().moved());
        assert!(sequencer.focus_previous().moved());
        assert_eq!(sequencer.current_index(), Some(start));
        assert_eq!(sequencer.current_field_id(), Some(ids[start]));
    }
}

#[test]
fn advancing_past_the_last_field_is_a_no_op() {
    let log = Log::default();
    let mut sequencer = sequencer_of(&["a", "b"], &log);
    sequencer.focus_field("b");
    let invoked = log.borrow().len();
    assert_eq!(sequencer.focus_next(), Navigation::Unchanged);
    assert_eq!(sequencer.current_field_id(), Some("b"));
    assert_eq!(log.borrow().len(), invoked);
    assert_eq!(last(&log).as_deref(), Some("focus:b"));
}

#[test]
fn retreating_from_unset_or_first_field_is_a_no_op() {
    let log = Log::default();
    let mut sequencer = sequencer_of(&["a", "b"], &log);
    assert_eq!(sequencer.focus_previous(), Navigation::Unchanged);
    assert_eq!(sequencer.current_field_id(), None);
    assert_eq!(sequencer.current_index(), None);

    sequencer.focus_next();
    assert_eq!(sequencer.current_field_id(), Some("a"));
    assert_eq!(sequencer.focus_previous(), Navigation::Unchanged);
    assert_eq!(sequencer.current_field_id(), Some("a"));
    assert_eq!(log.borrow().as_slice(), ["focus:a"]);
}

#[test]
fn fields_disabled_between_calls_drop_out_of_the_order() {
    let log = Log::default();
    let b_enabled = Rc::new(Cell::new(true));
    let flag = Rc::clone(&b_enabled);
    let mut sequencer = FieldSequencer::new(vec![
        field("a", &log),
        field("b", &log).enabled_when(move || flag.get()),
        field("c", &log),
        field("d", &log),
    ]);

    sequencer.focus_field("c");
    assert_eq!(sequencer.current_index(), Some(2));

    b_enabled.set(false);
    assert_eq!(sequencer.current_index(), Some(1));
    assert_eq!(sequencer.focus_previous().target(), Some("a"));
    assert_eq!(sequencer.focus_next().target(), Some("c"));
    assert_eq!(sequencer.focus_next().target(), Some("d"));
}

#[test]
fn disabling_the_current_field_resumes_from_its_neighbours() {
    let log = Log::default();
    let c_enabled = Rc::new(Cell::new(true));
    let flag = Rc::clone(&c_enabled);
    let mut sequencer = FieldSequencer::new(vec![
        field("a", &log),
        field("b", &log),
        field("c", &log).enabled_when(move || flag.get()),
        field("d", &log),
    ]);
    sequencer.focus_field("c");
    c_enabled.set(false);
    assert_eq!(sequencer.current_index(), None);
    assert_eq!(sequencer.focus_next().target(), Some("d"));

    c_enabled.set(true);
    sequencer.focus_field("c");
    c_enabled.set(false);
    assert_eq!(sequencer.focus_previous().target(), Some("b"));
}

#[test]
fn explicit_successor_to_disabled_field_falls_back_to_positional_advance() {
    let log = Log::default();
    let mut sequencer = FieldSequencer::new(vec![
        field("a", &log).next("c"),
        field("b", &log),
        field("c", &log).enabled(false),
    ]);
    sequencer.focus_next();
    assert_eq!(sequencer.focus_next().target(), Some("b"));
}

#[test]
fn explicit_successor_to_unknown_field_falls_back_to_positional_advance() {
    let log = Log::default();
    let mut sequencer =
        FieldSequencer::new(vec![field("a", &log).next("missing"), field("b", &log)]);
    sequencer.focus_next();
    assert_eq!(sequencer.focus_next().target(), Some("b"));
}

#[test]
fn skips_disabled_fields_and_honours_overrides() {
    let log = Log::default();
    let mut sequencer = FieldSequencer::new(vec![
        field("A", &log),
        field("B", &log).enabled(false),
        field("C", &log),
        field("D", &log).next("A"),
    ]);
    sequencer.focus_field("A");
    assert_eq!(sequencer.focus_next().target(), Some("C"));
    assert_eq!(sequencer.focus_next().target(), Some("D"));
    assert_eq!(sequencer.focus_next().target(), Some("A"));
    assert_eq!(
        log.borrow().as_slice(),
        ["focus:A", "focus:C", "focus:D", "focus:A"]
    );
}

#[test]
fn empty_registry_ignores_every_operation() {
    let mut sequencer: FieldSequencer<Recorder> = FieldSequencer::new(Vec::new());
    assert_eq!(sequencer.focus_next(), Navigation::Unchanged);
    assert_eq!(sequencer.focus_previous(), Navigation::Unchanged);
    assert_eq!(sequencer.focus_field("a"), Navigation::Unchanged);
    assert!(!sequencer.set_current_field("a"));
    assert_eq!(sequencer.current_field_id(), None);
    assert!(sequencer.current_handle().is_none());
}

#[test]
fn unknown_and_disabled_targets_are_ignored() {
    let log = Log::default();
    let mut sequencer = FieldSequencer::new(vec![field("a", &log), field("b", &log).enabled(false)]);
    sequencer.focus_field("a");
    assert_eq!(sequencer.focus_field("b"), Navigation::Unchanged);
    assert_eq!(sequencer.focus_field("zzz"), Navigation::Unchanged);
    assert!(!sequencer.set_current_field("b"));
    assert_eq!(sequencer.current_field_id(), Some("a"));
}

#[test]
fn set_current_field_syncs_without_invoking() {
    let log = Log::default();
    let mut sequencer = sequencer_of(&["a", "b", "c"], &log);
    assert!(sequencer.set_current_field("b"));
    assert!(log.borrow().is_empty());
    assert_eq!(sequencer.focus_next().target(), Some("c"));
}

#[test]
fn dropdowns_are_activated_when_they_cannot_take_focus() {
    let log = Log::default();
    let dropdown = FieldDescriptor::new(
        "material_type",
        Recorder {
            id: "material_type",
            kind: Kind::Dropdown,
            log: Rc::clone(&log),
        },
    );
    let label = FieldDescriptor::new(
        "notice",
        Recorder {
            id: "notice",
            kind: Kind::Static,
            log: Rc::clone(&log),
        },
    );
    let mut sequencer = FieldSequencer::new(vec![field("qty", &log), dropdown, label]);
    sequencer.focus_next();
    assert_eq!(
        sequencer.focus_next(),
        Navigation::Moved {
            id: "material_type".into(),
            invocation: Invocation::Activated
        }
    );
    assert_eq!(
        sequencer.focus_next(),
        Navigation::Moved {
            id: "notice".into(),
            invocation: Invocation::Unsupported
        }
    );
    assert_eq!(
        log.borrow().as_slice(),
        ["focus:qty", "activate:material_type"]
    );
}

#[test]
fn replacing_the_registry_preserves_cursor_by_id() {
    let log = Log::default();
    let mut sequencer = sequencer_of(&["type", "customer", "product"], &log);
    sequencer.focus_field("product");
    sequencer.replace_fields(vec![field("type", &log), field("product", &log)]);
    assert_eq!(sequencer.current_field_id(), Some("product"));
    assert_eq!(sequencer.current_index(), Some(1));

    sequencer.replace_fields(vec![field("type", &log), field("batch", &log)]);
    assert_eq!(sequencer.current_field_id(), None);
    assert_eq!(sequencer.focus_next().target(), Some("type"));
}

#[test]
fn reset_policy_forgets_the_cursor_on_replacement() {
    let log = Log::default();
    let mut sequencer =
        sequencer_of(&["type", "customer"], &log).with_cursor_sync(CursorSync::Reset);
    sequencer.focus_field("customer");
    sequencer.replace_fields(vec![field("type", &log), field("customer", &log)]);
    assert_eq!(sequencer.current_field_id(), None);
}
