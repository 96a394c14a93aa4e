//! Registry traits - the seams between core logic and the InvenTree server
//!
//! The naming validator and the parameter normalizer never talk HTTP; they
//! consume these traits. Production code backs them with
//! [`crate::core::InvenTreeClient`], tests with [`MemoryRegistry`].

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::entities::{CategoryId, ParameterTemplate, ParameterValue, PartId, SelectionListId, TemplateId};

/// Failure while talking to a backing registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected payload: {0}")]
    Payload(String),
}

/// Read access to selection-list values
pub trait EnumerationSource {
    /// Allowed values for a selection list, in set order
    fn enumeration_values(&self, list: SelectionListId) -> Result<BTreeSet<String>, RegistryError>;
}

/// Read access to a category's parameter templates
pub trait TemplateSource {
    fn templates_for_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ParameterTemplate>, RegistryError>;
}

/// Read/append access to per-part parameter assignments
///
/// The normalizer only ever creates; it relies on `assignments_for_part` to
/// decide what already exists and never overwrites.
pub trait ParameterStore {
    fn assignments_for_part(&self, part: PartId) -> Result<Vec<ParameterValue>, RegistryError>;

    fn create_assignment(
        &self,
        part: PartId,
        template: TemplateId,
        value: &str,
    ) -> Result<(), RegistryError>;
}

/// Per-run memo over an [`EnumerationSource`]
///
/// A category batch hits the same few selection lists once per part; this
/// wrapper makes the batch cost one fetch per distinct list. Lookup failures
/// are memoized too, so an unreachable registry fails fast for the rest of
/// the run instead of re-timing-out per part.
pub struct CachedEnumerations<'a> {
    inner: &'a dyn EnumerationSource,
    memo: RefCell<BTreeMap<SelectionListId, BTreeSet<String>>>,
}

impl<'a> CachedEnumerations<'a> {
    pub fn new(inner: &'a dyn EnumerationSource) -> Self {
        Self {
            inner,
            memo: RefCell::new(BTreeMap::new()),
        }
    }
}

impl EnumerationSource for CachedEnumerations<'_> {
    fn enumeration_values(&self, list: SelectionListId) -> Result<BTreeSet<String>, RegistryError> {
        if let Some(values) = self.memo.borrow().get(&list) {
            return Ok(values.clone());
        }
        // Degrade failures to an empty set here so they memoize like a hit.
        let values = self.inner.enumeration_values(list).unwrap_or_default();
        self.memo.borrow_mut().insert(list, values.clone());
        Ok(values)
    }
}

/// In-memory registry used by unit tests
#[derive(Default)]
pub struct MemoryRegistry {
    enumerations: BTreeMap<SelectionListId, BTreeSet<String>>,
    templates: BTreeMap<CategoryId, Vec<ParameterTemplate>>,
    assignments: RefCell<BTreeMap<PartId, Vec<ParameterValue>>>,
    next_pk: RefCell<i64>,

    /// Parts whose assignment fetch should fail
    pub fail_fetch: BTreeSet<PartId>,
    /// (part, template) pairs whose create should fail
    pub fail_create: BTreeSet<(PartId, TemplateId)>,
    /// When set, every enumeration lookup fails (registry outage)
    pub enumerations_unreachable: bool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            next_pk: RefCell::new(1),
            ..Default::default()
        }
    }

    /// A registry whose every enumeration lookup fails
    pub fn unreachable() -> Self {
        Self {
            enumerations_unreachable: true,
            ..Self::new()
        }
    }

    pub fn with_enumeration<I, S>(mut self, list: SelectionListId, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumerations
            .insert(list, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_templates(mut self, category: CategoryId, templates: Vec<ParameterTemplate>) -> Self {
        self.templates.insert(category, templates);
        self
    }

    pub fn insert_assignment(&self, part: PartId, template: TemplateId, value: &str) {
        let pk = {
            let mut next = self.next_pk.borrow_mut();
            let pk = *next;
            *next += 1;
            pk
        };
        self.assignments.borrow_mut().entry(part).or_default().push(ParameterValue {
            pk,
            part,
            template,
            data: value.to_string(),
        });
    }

    pub fn assignment_count(&self, part: PartId) -> usize {
        self.assignments.borrow().get(&part).map_or(0, |v| v.len())
    }
}

impl EnumerationSource for MemoryRegistry {
    fn enumeration_values(&self, list: SelectionListId) -> Result<BTreeSet<String>, RegistryError> {
        if self.enumerations_unreachable {
            return Err(RegistryError::Transport("registry unreachable".to_string()));
        }
        Ok(self.enumerations.get(&list).cloned().unwrap_or_default())
    }
}

impl TemplateSource for MemoryRegistry {
    fn templates_for_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ParameterTemplate>, RegistryError> {
        Ok(self.templates.get(&category).cloned().unwrap_or_default())
    }
}

impl ParameterStore for MemoryRegistry {
    fn assignments_for_part(&self, part: PartId) -> Result<Vec<ParameterValue>, RegistryError> {
        if self.fail_fetch.contains(&part) {
            return Err(RegistryError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(self.assignments.borrow().get(&part).cloned().unwrap_or_default())
    }

    fn create_assignment(
        &self,
        part: PartId,
        template: TemplateId,
        value: &str,
    ) -> Result<(), RegistryError> {
        if self.fail_create.contains(&(part, template)) {
            return Err(RegistryError::Status {
                status: 400,
                body: "invalid parameter".to_string(),
            });
        }
        self.insert_assignment(part, template, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSource {
        calls: RefCell<usize>,
    }

    impl EnumerationSource for CountingSource {
        fn enumeration_values(
            &self,
            _list: SelectionListId,
        ) -> Result<BTreeSet<String>, RegistryError> {
            *self.calls.borrow_mut() += 1;
            Ok(["MF".to_string()].into_iter().collect())
        }
    }

    #[test]
    fn test_cached_enumerations_fetches_each_list_once() {
        let source = CountingSource {
            calls: RefCell::new(0),
        };
        let cached = CachedEnumerations::new(&source);

        for _ in 0..5 {
            let values = cached.enumeration_values(SelectionListId(15)).unwrap();
            assert!(values.contains("MF"));
        }
        assert_eq!(*source.calls.borrow(), 1);
    }

    #[test]
    fn test_cached_enumerations_memoizes_outage_as_empty() {
        let source = MemoryRegistry::unreachable();
        let cached = CachedEnumerations::new(&source);
        let values = cached.enumeration_values(SelectionListId(15)).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_memory_registry_unknown_enumeration_is_empty() {
        let registry = MemoryRegistry::new();
        let values = registry.enumeration_values(SelectionListId(99)).unwrap();
        assert!(values.is_empty());
    }
}
