use std::{cell::RefCell, rc::Rc};

/// Caret state of a text entry, consulted by the retreat shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextEntry {
    pub len: usize,
    pub caret: usize,
}

impl TextEntry {
    pub fn new(len: usize, caret: usize) -> Self {
        Self {
            len,
            caret: caret.min(len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn caret_at_start(&self) -> bool {
        self.caret == 0
    }
}

/// A focus target owned by the hosting form.
///
/// Every widget that takes part in keyboard navigation implements this. Text
/// inputs usually implement [`FieldHandle::focus`], dropdowns and buttons
/// implement [`FieldHandle::activate`] instead; the sequencer tries `focus`
/// first and falls back to `activate`, so it never needs to know the concrete
/// widget kind.
pub trait FieldHandle {
    /// Moves input focus onto the element. Returns `false` if the element
    /// cannot take focus.
    fn focus(&mut self) -> bool {
        false
    }

    /// Clicks the element (opens a dropdown, presses a button). Returns
    /// `false` if the element cannot be activated.
    fn activate(&mut self) -> bool {
        false
    }

    fn text_entry(&self) -> Option<TextEntry> {
        None
    }
}

impl<T: FieldHandle + ?Sized> FieldHandle for Rc<RefCell<T>> {
    fn focus(&mut self) -> bool {
        self.borrow_mut().focus()
    }

    fn activate(&mut self) -> bool {
        self.borrow_mut().activate()
    }

    fn text_entry(&self) -> Option<TextEntry> {
        self.borrow().text_entry()
    }
}

impl<T: FieldHandle + ?Sized> FieldHandle for Box<T> {
    fn focus(&mut self) -> bool {
        (**self).focus()
    }

    fn activate(&mut self) -> bool {
        (**self).activate()
    }

    fn text_entry(&self) -> Option<TextEntry> {
        (**self).text_entry()
    }
}

/// Which capability handled an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Focused,
    Activated,
    Unsupported,
}

pub fn invoke<H: FieldHandle + ?Sized>(handle: &mut H) -> Invocation {
    if handle.focus() {
        Invocation::Focused
    } else if handle.activate() {
        Invocation::Activated
    } else {
        Invocation::Unsupported
    }
}
