use crate::predicate::{AvxPredicate, Predicate, AVX_PREDICATE};
use crate::{Result, SchedulerError};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Ordered set of named predicates
///
/// Built once through [`RegistryBuilder`] and never mutated afterwards, so it
/// can be shared across threads behind an `Arc` without locking. Evaluation
/// order is an explicit list of names, independent of map iteration order.
pub struct PredicateRegistry {
    predicates: HashMap<String, Box<dyn Predicate>>,
    order: Vec<String>,
}

impl PredicateRegistry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Predicate names in evaluation order
    pub fn evaluation_order(&self) -> &[String] {
        &self.order
    }

    /// Look up a predicate by name
    pub fn lookup(&self, name: &str) -> Result<&dyn Predicate> {
        self.predicates
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| SchedulerError::unknown_predicate(name))
    }

    /// Predicates paired with their names, in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Predicate)> {
        self.order.iter().filter_map(|name| {
            self.predicates
                .get(name)
                .map(|p| (name.as_str(), p.as_ref()))
        })
    }

    /// Number of registered predicates
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no predicate is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("order", &self.order)
            .finish()
    }
}

/// Builder for [`PredicateRegistry`]
#[derive(Default)]
pub struct RegistryBuilder {
    predicates: HashMap<String, Box<dyn Predicate>>,
    registered: Vec<String>,
    order: Option<Vec<String>>,
}

impl RegistryBuilder {
    /// Register a predicate under a unique name
    pub fn register(
        mut self,
        name: impl Into<String>,
        predicate: impl Predicate + 'static,
    ) -> Result<Self> {
        let name = name.into();
        if self.predicates.contains_key(&name) {
            return Err(SchedulerError::duplicate_predicate(name));
        }

        self.registered.push(name.clone());
        self.predicates.insert(name, Box::new(predicate));
        Ok(self)
    }

    /// Set the evaluation order
    ///
    /// Without an explicit order predicates run in registration order.
    pub fn order<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Validate the order against the registrations and build the registry
    pub fn build(self) -> Result<PredicateRegistry> {
        let order = self.order.unwrap_or(self.registered);

        let mut seen = HashSet::new();
        for name in &order {
            if !self.predicates.contains_key(name) {
                return Err(SchedulerError::unknown_predicate(name.as_str()));
            }
            if !seen.insert(name.as_str()) {
                return Err(SchedulerError::duplicate_predicate(name.as_str()));
            }
        }

        // Report in a stable order rather than map order
        let mut unordered: Vec<&String> = self
            .predicates
            .keys()
            .filter(|name| !seen.contains(name.as_str()))
            .collect();
        unordered.sort();
        if let Some(name) = unordered.first() {
            return Err(SchedulerError::unordered_predicate(name.as_str()));
        }

        Ok(PredicateRegistry {
            predicates: self.predicates,
            order,
        })
    }
}

/// Registry holding the predicates this extender ships with
pub fn default_registry() -> Result<PredicateRegistry> {
    PredicateRegistry::builder()
        .register(AVX_PREDICATE, AvxPredicate)?
        .order([AVX_PREDICATE])
        .build()
}
