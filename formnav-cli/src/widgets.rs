use std::{cell::RefCell, rc::Rc};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use formnav::{FieldHandle, TextEntry};
use unicode_width::UnicodeWidthStr;

/// Single-line text input with a char-indexed caret.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    caret: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let caret = value.chars().count();
        Self { value, caret }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn trimmed(&self) -> Option<String> {
        let trimmed = self.value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Display columns before the caret, for placing the terminal cursor.
    pub fn caret_columns(&self) -> u16 {
        let prefix = &self.value[..self.byte_index()];
        u16::try_from(prefix.width()).unwrap_or(u16::MAX)
    }

    /// Applies an editing key. Returns whether the value changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let len = self.value.chars().count();
        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = self.byte_index();
                self.value.insert(at, ch);
                self.caret += 1;
                true
            }
            KeyCode::Backspace if self.caret > 0 => {
                self.caret -= 1;
                let at = self.byte_index();
                self.value.remove(at);
                true
            }
            KeyCode::Delete if self.caret < len => {
                let at = self.byte_index();
                self.value.remove(at);
                true
            }
            KeyCode::Left => {
                self.caret = self.caret.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.caret = (self.caret + 1).min(len);
                false
            }
            KeyCode::Home => {
                self.caret = 0;
                false
            }
            KeyCode::End => {
                self.caret = len;
                false
            }
            _ => false,
        }
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.caret)
            .map_or(self.value.len(), |(index, _)| index)
    }
}

impl FieldHandle for TextInput {
    fn focus(&mut self) -> bool {
        self.caret = self.value.chars().count();
        true
    }

    fn text_entry(&self) -> Option<TextEntry> {
        Some(TextEntry::new(self.value.chars().count(), self.caret))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectEvent {
    Chosen,
    Cancelled,
    Ignored,
}

/// Dropdown that cannot hold focus itself; reaching it opens the option list.
#[derive(Debug, Clone)]
pub struct Select {
    options: &'static [&'static str],
    selected: Option<usize>,
    highlight: usize,
    open: bool,
}

impl Select {
    pub fn new(options: &'static [&'static str]) -> Self {
        Self {
            options,
            selected: None,
            highlight: 0,
            open: false,
        }
    }

    pub fn with_selected(mut self, value: &str) -> Self {
        self.selected = self.options.iter().position(|option| *option == value);
        self
    }

    pub fn options(&self) -> &'static [&'static str] {
        self.options
    }

    pub fn selected(&self) -> Option<&'static str> {
        self.selected.and_then(|index| self.options.get(index).copied())
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> SelectEvent {
        if !self.open {
            return SelectEvent::Ignored;
        }
        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                self.highlight = self.highlight.saturating_sub(1);
                SelectEvent::Ignored
            }
            KeyCode::Down | KeyCode::Tab => {
                self.highlight = (self.highlight + 1).min(self.options.len().saturating_sub(1));
                SelectEvent::Ignored
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.selected = Some(self.highlight);
                self.open = false;
                SelectEvent::Chosen
            }
            KeyCode::Esc => {
                self.open = false;
                SelectEvent::Cancelled
            }
            _ => SelectEvent::Ignored,
        }
    }
}

impl FieldHandle for Select {
    fn activate(&mut self) -> bool {
        if self.options.is_empty() {
            return false;
        }
        self.highlight = self.selected.unwrap_or(0);
        self.open = true;
        true
    }
}

#[derive(Debug, Clone)]
pub struct Button {
    label: &'static str,
}

impl Button {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_press(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
    }
}

impl FieldHandle for Button {
    fn focus(&mut self) -> bool {
        true
    }
}

/// Registry handle shared between the form (which renders and edits the
/// widget) and the navigator (which moves focus onto it).
#[derive(Debug, Clone)]
pub enum FieldWidget {
    Text(Rc<RefCell<TextInput>>),
    Select(Rc<RefCell<Select>>),
    Button(Rc<RefCell<Button>>),
}

impl FieldHandle for FieldWidget {
    fn focus(&mut self) -> bool {
        match self {
            FieldWidget::Text(input) => input.focus(),
            FieldWidget::Select(select) => select.focus(),
            FieldWidget::Button(button) => button.focus(),
        }
    }

    fn activate(&mut self) -> bool {
        match self {
            FieldWidget::Text(input) => input.activate(),
            FieldWidget::Select(select) => select.activate(),
            FieldWidget::Button(button) => button.activate(),
        }
    }

    fn text_entry(&self) -> Option<TextEntry> {
        match self {
            FieldWidget::Text(input) => input.text_entry(),
            FieldWidget::Select(_) | FieldWidget::Button(_) => None,
        }
    }
}
