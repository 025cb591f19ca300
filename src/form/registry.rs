use std::collections::HashSet;

use tracing::warn;

use super::descriptor::FieldDescriptor;

/// Ordered snapshot of a form's navigable fields. Insertion order is tab
/// order.
#[derive(Debug, Clone)]
pub struct Registry<H> {
    fields: Vec<FieldDescriptor<H>>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<H> Registry<H> {
    pub fn new(fields: Vec<FieldDescriptor<H>>) -> Self {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.id.as_str()) {
                warn!(id = %field.id, "duplicate field id in registry; lookups use the first entry");
            }
        }
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor<H>> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldDescriptor<H>> {
        self.fields.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&FieldDescriptor<H>> {
        self.position(id).map(|index| &self.fields[index])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut FieldDescriptor<H>> {
        let index = self.position(id)?;
        self.fields.get_mut(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.id == id)
    }

    /// Indices into the full list of the fields enabled right now.
    pub fn enabled_indices(&self) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.is_enabled())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn enabled_ids(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.is_enabled())
            .map(|field| field.id.as_str())
            .collect()
    }

    pub fn enabled_position(&self, id: &str) -> Option<usize> {
        self.enabled_ids().iter().position(|candidate| *candidate == id)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut FieldDescriptor<H>> {
        self.fields.get_mut(index)
    }

    pub(crate) fn at(&self, index: usize) -> Option<&FieldDescriptor<H>> {
        self.fields.get(index)
    }
}

impl<H> From<Vec<FieldDescriptor<H>>> for Registry<H> {
    fn from(fields: Vec<FieldDescriptor<H>>) -> Self {
        Self::new(fields)
    }
}

impl<H> FromIterator<FieldDescriptor<H>> for Registry<H> {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor<H>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry<()> {
        Registry::new(vec![
            FieldDescriptor::new("a", ()),
            FieldDescriptor::new("b", ()).enabled(false),
            FieldDescriptor::new("c", ()),
        ])
    }

    #[test]
    fn enabled_view_skips_disabled_fields() {
        let registry = registry();
        assert_eq!(registry.enabled_ids(), vec!["a", "c"]);
        assert_eq!(registry.enabled_indices(), vec![0, 2]);
        assert_eq!(registry.enabled_position("c"), Some(1));
        assert_eq!(registry.enabled_position("b"), None);
        assert_eq!(registry.position("b"), Some(1));
    }

    #[test]
    fn duplicate_ids_resolve_to_first_entry() {
        let registry: Registry<u8> = vec![
            FieldDescriptor::new("x", 1),
            FieldDescriptor::new("x", 2),
        ]
        .into();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("x").map(|field| field.handle), Some(1));
    }
}
