use std::{
    cell::RefCell,
    rc::Rc,
    sync::mpsc::{self, Receiver},
    time::{Duration, Instant},
};

use anyhow::Context as _;
use color_eyre::eyre::{Result, eyre};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use formnav::{
    FieldHandle, FormNavigator, KeyAction, KeyFlow, KeyHub, Keymap, MountedForm,
    NavigatorOptions, RequestTracker, ShortcutHandlers,
};
use ratatui::layout::{Position, Rect};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    order::{CUSTOMER, Order, OrderForm},
    terminal::TerminalGuard,
    view,
    widgets::{Button, FieldWidget, SelectEvent},
};

const TICK_RATE: Duration = Duration::from_millis(250);

/// A navigator or shortcut callback error, with its cause chain intact.
#[derive(Debug, Error)]
#[error(transparent)]
struct ShortcutFailure(anyhow::Error);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormAction {
    Save,
    Print,
}

pub struct App {
    pub(crate) form: OrderForm,
    pub(crate) navigator: Rc<RefCell<FormNavigator<FieldWidget>>>,
    hub: KeyHub,
    mounted: MountedForm,
    actions: Receiver<FormAction>,
    pub(crate) tracker: RequestTracker,
    saved: Option<Order>,
    pub(crate) dirty: bool,
    exit_armed: bool,
    should_quit: bool,
    stock_layout: bool,
    pub(crate) hit_areas: Vec<(Rect, &'static str)>,
}

impl App {
    pub fn new(keymap: Keymap, shortcuts: bool) -> Result<Self> {
        let form = OrderForm::new();
        let (sender, actions) = mpsc::channel();
        let save = sender.clone();
        let handlers = ShortcutHandlers::new()
            .on_save(move || {
                save.send(FormAction::Save)
                    .context("order form is no longer running")
            })
            .on_print(move || {
                sender
                    .send(FormAction::Print)
                    .context("order form is no longer running")
            });
        let options = NavigatorOptions::default()
            .with_keymap(keymap)
            .with_global_shortcuts(shortcuts)
            .with_initial_focus(CUSTOMER);
        let stock_layout = form.is_stock();
        let navigator = Rc::new(RefCell::new(FormNavigator::new(
            form.descriptors(),
            handlers,
            options,
        )));
        let hub = KeyHub::new();
        let mounted = FormNavigator::mount(&navigator, &hub)?;
        Ok(Self {
            form,
            navigator,
            hub,
            mounted,
            actions,
            tracker: RequestTracker::new(),
            saved: None,
            dirty: false,
            exit_armed: false,
            should_quit: false,
            stock_layout,
            hit_areas: Vec::new(),
        })
    }

    /// Runs the form until the user leaves it. Returns the last stored order.
    pub fn run(&mut self) -> Result<Order> {
        let mut terminal = TerminalGuard::new()?;
        while !self.should_quit {
            terminal.draw(|frame| view::draw(frame, self))?;
            self.tracker.tick(Instant::now());
            if !event::poll(TICK_RATE)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Resize(width, height) => {
                    terminal.resize(width, height)?;
                }
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
        self.saved
            .take()
            .ok_or_else(|| eyre!("user left the order form without saving"))
    }

    pub fn help_text(&self) -> String {
        self.navigator.borrow().help_text()
    }

    pub fn current_field(&self) -> Option<String> {
        self.navigator
            .borrow()
            .current_field_id()
            .map(str::to_string)
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.navigator
            .borrow()
            .sequencer()
            .fields()
            .get(id)
            .is_some_and(|field| field.is_enabled())
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        if self.form.open_select().is_some() && !self.is_save_or_print(&key) {
            self.handle_popup_key(&key);
            return Ok(());
        }

        if self.dispatch(&key)? == KeyFlow::Continue {
            self.handle_widget_key(&key);
        }
        self.drain_actions();
        if self.navigator.borrow_mut().take_default_back() {
            self.on_exit();
        }
        self.sync_layout();
        Ok(())
    }

    fn dispatch(&mut self, key: &KeyEvent) -> Result<KeyFlow> {
        let flow = if self.mounted.is_listening() {
            self.hub.dispatch(key)
        } else {
            self.navigator
                .borrow_mut()
                .handle_key(key)
                .map(|outcome| outcome.flow())
        };
        Ok(flow.map_err(ShortcutFailure)?)
    }

    fn is_save_or_print(&self, key: &KeyEvent) -> bool {
        let navigator = self.navigator.borrow();
        let options = navigator.options();
        options.enable_global_shortcuts
            && matches!(
                options.keymap.classify(key),
                Some(KeyAction::Save | KeyAction::Print)
            )
    }

    fn handle_popup_key(&mut self, key: &KeyEvent) {
        let Some(select) = self.form.open_select() else {
            return;
        };
        let event = select.borrow_mut().handle_key(key);
        if event == SelectEvent::Chosen {
            self.mark_dirty();
            self.sync_layout();
            self.navigator.borrow_mut().focus_next_field();
        }
    }

    fn handle_widget_key(&mut self, key: &KeyEvent) {
        let Some(id) = self.current_field() else {
            return;
        };
        let Some(widget) = self.navigator.borrow().sequencer().handle(&id).cloned() else {
            return;
        };
        match widget {
            FieldWidget::Text(input) => {
                if input.borrow_mut().handle_key(key) {
                    self.mark_dirty();
                }
            }
            FieldWidget::Select(mut select) => {
                if Button::is_press(key) {
                    select.activate();
                }
            }
            FieldWidget::Button(_) => {
                if Button::is_press(key) {
                    self.on_save();
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let position = Position::new(mouse.column, mouse.row);
        let Some(id) = self
            .hit_areas
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, id)| *id)
        else {
            return;
        };
        if let Some(select) = self.form.open_select() {
            select.borrow_mut().handle_key(&KeyEvent::from(KeyCode::Esc));
        }
        if !self.navigator.borrow_mut().set_current_field(id) {
            return;
        }
        debug!(field = id, "pointer focus");
        let widget = self.navigator.borrow().sequencer().handle(id).cloned();
        if let Some(mut widget) = widget {
            formnav::invoke(&mut widget);
        }
    }

    fn drain_actions(&mut self) {
        while let Ok(action) = self.actions.try_recv() {
            match action {
                FormAction::Save => self.on_save(),
                FormAction::Print => self.on_print(),
            }
        }
    }

    /// Rebuilds the registry when the order type switches branch.
    fn sync_layout(&mut self) {
        let stock = self.form.is_stock();
        if stock == self.stock_layout {
            return;
        }
        self.stock_layout = stock;
        self.navigator
            .borrow_mut()
            .replace_fields(self.form.descriptors());
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.exit_armed = false;
    }

    fn on_save(&mut self) {
        self.tracker.start();
        match self.form.to_order() {
            Ok(order) => {
                info!(product = %order.product, quantity = order.quantity, "order stored");
                self.saved = Some(order);
                self.dirty = false;
                self.exit_armed = false;
                self.tracker
                    .succeed("Order saved. Press Esc to leave the form.", Instant::now());
            }
            Err(issue) => {
                warn!(field = issue.field, message = %issue.message, "order rejected");
                self.tracker.fail(issue.message, Instant::now());
                self.navigator.borrow_mut().focus_field(issue.field);
            }
        }
    }

    fn on_print(&mut self) {
        match self.form.to_order() {
            Ok(order) => self.tracker.succeed(order.preview(), Instant::now()),
            Err(issue) => self
                .tracker
                .fail(format!("Cannot print: {}", issue.message), Instant::now()),
        }
    }

    /// Default back action: leave the form, asking once if there are
    /// unsaved edits.
    fn on_exit(&mut self) {
        if self.dirty && !self.exit_armed {
            self.exit_armed = true;
            self.tracker.fail(
                "Unsaved changes. Press Esc again to leave without saving.",
                Instant::now(),
            );
            return;
        }
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use formnav::RequestStatus;

    use super::*;
    use crate::order::{MATERIAL_NAME, MATERIAL_TYPE, NOTES, ORDER_TYPE, PRODUCT, QUANTITY, SUBMIT};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(press(KeyCode::Char(ch))).expect("key");
        }
    }

    fn app() -> App {
        App::new(Keymap::standard(), true).expect("app")
    }

    #[test]
    fn starts_on_customer_with_listener_attached() {
        let app = app();
        assert_eq!(app.current_field().as_deref(), Some(CUSTOMER));
        assert_eq!(app.hub.listener_count(), 1);
    }

    #[test]
    fn typing_then_save_stores_the_order() {
        let mut app = app();
        type_text(&mut app, "ACME");
        app.handle_key(press(KeyCode::Tab)).expect("tab");
        app.handle_key(press(KeyCode::Tab)).expect("tab");
        app.handle_key(press(KeyCode::Tab)).expect("tab");
        assert_eq!(app.current_field().as_deref(), Some(PRODUCT));
        type_text(&mut app, "Cable drum");
        app.navigator.borrow_mut().focus_field(QUANTITY);
        type_text(&mut app, "2");

        app.handle_key(ctrl('s')).expect("save");
        assert!(matches!(app.tracker.status(), RequestStatus::Success(_)));
        assert!(!app.dirty);
        assert_eq!(app.saved.as_ref().map(|order| order.quantity), Some(2));
        assert_eq!(app.current_field().as_deref(), Some(QUANTITY));
    }

    #[test]
    fn failed_save_moves_focus_to_the_offending_field() {
        let mut app = app();
        type_text(&mut app, "ACME");
        app.handle_key(ctrl('s')).expect("save");
        assert_eq!(
            app.tracker.status(),
            &RequestStatus::Error("Product is required".into())
        );
        assert_eq!(app.current_field().as_deref(), Some(PRODUCT));
        assert!(app.saved.is_none());
    }

    #[test]
    fn choosing_stock_reroutes_customer_successor() {
        let mut app = app();
        app.handle_key(key_with_shift_tab()).expect("backtab");
        assert_eq!(app.current_field().as_deref(), Some(ORDER_TYPE));
        assert!(app.form.open_select().is_some());
        app.handle_key(press(KeyCode::Down)).expect("down");
        app.handle_key(press(KeyCode::Enter)).expect("choose");
        assert!(app.form.is_stock());
        assert_eq!(app.current_field().as_deref(), Some(CUSTOMER));

        app.handle_key(press(KeyCode::Enter)).expect("enter");
        assert_eq!(app.current_field().as_deref(), Some(PRODUCT));
    }

    #[test]
    fn material_name_unlocks_after_choosing_material() {
        let mut app = app();
        assert!(!app.is_enabled(MATERIAL_NAME));
        app.navigator.borrow_mut().focus_field(MATERIAL_TYPE);
        app.handle_key(press(KeyCode::Enter)).expect("choose");
        assert!(app.is_enabled(MATERIAL_NAME));
        assert_eq!(app.current_field().as_deref(), Some(MATERIAL_NAME));
    }

    #[test]
    fn escape_closes_an_open_select_before_leaving() {
        let mut app = app();
        app.navigator.borrow_mut().focus_field(MATERIAL_TYPE);
        app.handle_key(press(KeyCode::Esc)).expect("esc");
        assert!(app.form.open_select().is_none());
        assert!(!app.should_quit);
        app.handle_key(press(KeyCode::Esc)).expect("esc");
        assert!(app.should_quit);
    }

    #[test]
    fn escape_with_unsaved_edits_asks_once() {
        let mut app = app();
        type_text(&mut app, "ACME");
        app.handle_key(press(KeyCode::Esc)).expect("esc");
        assert!(!app.should_quit);
        assert!(app.exit_armed);
        app.handle_key(press(KeyCode::Esc)).expect("esc");
        assert!(app.should_quit);
    }

    #[test]
    fn submit_button_saves_on_enter() {
        let mut app = app();
        type_text(&mut app, "ACME");
        app.navigator.borrow_mut().focus_field(PRODUCT);
        type_text(&mut app, "Spool");
        app.navigator.borrow_mut().focus_field(QUANTITY);
        type_text(&mut app, "1");
        app.navigator.borrow_mut().focus_field(NOTES);
        app.handle_key(press(KeyCode::Enter)).expect("enter");
        assert_eq!(app.current_field().as_deref(), Some(SUBMIT));
        app.handle_key(press(KeyCode::Enter)).expect("submit");
        assert!(app.saved.is_some());
    }

    #[test]
    fn print_preview_lands_in_the_status_line() {
        let mut app = app();
        type_text(&mut app, "ACME");
        app.navigator.borrow_mut().focus_field(PRODUCT);
        type_text(&mut app, "Spool");
        app.navigator.borrow_mut().focus_field(QUANTITY);
        type_text(&mut app, "5");
        app.handle_key(ctrl('p')).expect("print");
        assert!(app.tracker.message().starts_with("Print preview: production order"));
        assert!(app.saved.is_none());
    }

    #[test]
    fn without_shortcuts_navigation_still_works() {
        let mut app = App::new(Keymap::standard(), false).expect("app");
        assert_eq!(app.hub.listener_count(), 0);
        app.handle_key(ctrl('s')).expect("ctrl+s");
        assert!(app.saved.is_none());
        assert_eq!(app.tracker.status(), &RequestStatus::Idle);
        app.handle_key(press(KeyCode::Tab)).expect("tab");
        assert_eq!(app.current_field().as_deref(), Some("customer_ref"));
    }

    #[test]
    fn clicking_a_field_moves_the_cursor() {
        let mut app = app();
        app.hit_areas = vec![(Rect::new(0, 4, 40, 1), PRODUCT)];
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.current_field().as_deref(), Some(PRODUCT));
    }

    #[test]
    fn callback_failures_keep_their_cause() {
        let cause = std::io::Error::other("disk full");
        let failure = anyhow::Error::new(cause).context("saving order");
        let report = color_eyre::eyre::Report::new(ShortcutFailure(failure));
        let chain = report.chain().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(chain, ["saving order", "disk full"]);
    }

    fn key_with_shift_tab() -> KeyEvent {
        KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)
    }
}
