use std::{fmt, rc::Rc};

/// Whether a field currently takes part in navigation.
///
/// Predicates are re-evaluated on every navigation call because enablement
/// usually depends on sibling values (a material name is only editable once a
/// material type is picked).
#[derive(Clone)]
pub enum Enablement {
    Fixed(bool),
    When(Rc<dyn Fn() -> bool>),
}

impl Enablement {
    pub fn is_enabled(&self) -> bool {
        match self {
            Enablement::Fixed(enabled) => *enabled,
            Enablement::When(predicate) => predicate(),
        }
    }
}

impl Default for Enablement {
    fn default() -> Self {
        Enablement::Fixed(true)
    }
}

impl fmt::Debug for Enablement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enablement::Fixed(enabled) => f.debug_tuple("Fixed").field(enabled).finish(),
            Enablement::When(_) => f.write_str("When(<predicate>)"),
        }
    }
}

#[derive(Clone)]
pub struct FieldDescriptor<H> {
    pub id: String,
    pub handle: H,
    pub enabled: Enablement,
    pub explicit_next: Option<String>,
}

impl<H> FieldDescriptor<H> {
    pub fn new(id: impl Into<String>, handle: H) -> Self {
        Self {
            id: id.into(),
            handle,
            enabled: Enablement::default(),
            explicit_next: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Enablement::Fixed(enabled);
        self
    }

    pub fn enabled_when(mut self, predicate: impl Fn() -> bool + 'static) -> Self {
        self.enabled = Enablement::When(Rc::new(predicate));
        self
    }

    /// Jump straight to `id` when advancing from this field.
    pub fn next(mut self, id: impl Into<String>) -> Self {
        self.explicit_next = Some(id.into());
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }
}

impl<H> fmt::Debug for FieldDescriptor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("enabled", &self.enabled)
            .field("explicit_next", &self.explicit_next)
            .finish_non_exhaustive()
    }
}
