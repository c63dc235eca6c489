//! Solution mappings: a partial function from variable to RDF
//! term, and the finite sequence operators produce and consume.

use sparql_model::{Term, Variable};

use indexmap::IndexMap;

/// A partial function from variable name to RDF term. Backed by an
/// [`IndexMap`] rather than a hash map so that `Project`'s output column
/// order and `Display`-style rendering stay deterministic, mirroring a
/// single solution row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping(IndexMap<Variable, Term>);

impl Mapping {
    /// The empty mapping: binds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Binds `var` to `term`, overwriting any prior binding.
    pub fn bind(&mut self, var: Variable, term: Term) {
        self.0.insert(var, term);
    }

    /// Returns a copy with `var` bound to `term`.
    #[must_use]
    pub fn with_binding(mut self, var: Variable, term: Term) -> Self {
        self.bind(var, term);
        self
    }

    /// The term bound to `var`, if any.
    #[must_use]
    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.0.get(var)
    }

    /// Whether `var` is bound.
    #[must_use]
    pub fn is_bound(&self, var: &Variable) -> bool {
        self.0.contains_key(var)
    }

    /// Iterates over all bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.0.iter()
    }

    /// The number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Two mappings are compatible when every variable bound by both maps
    /// to an equal term.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Mapping) -> bool {
        let (smaller, larger) = if self.0.len() <= other.0.len() { (self, other) } else { (other, self) };
        smaller.0.iter().all(|(var, term)| larger.get(var).map_or(true, |t| t == term))
    }

    /// Whether this mapping and `other` share at least one bound variable
    /// (`MINUS`'s defining condition).
    #[must_use]
    pub fn shares_a_variable_with(&self, other: &Mapping) -> bool {
        self.0.keys().any(|var| other.is_bound(var))
    }

    /// Merges two compatible mappings (their union). Caller must ensure
    /// compatibility; incompatible merges silently prefer `other`'s value,
    /// which callers never reach because they check
    /// [`Mapping::is_compatible_with`] first.
    #[must_use]
    pub fn merge(&self, other: &Mapping) -> Mapping {
        let mut merged = self.clone();
        for (var, term) in other.iter() {
            merged.bind(var.clone(), term.clone());
        }
        merged
    }

    /// Restricts the mapping's domain to `vars`.
    #[must_use]
    pub fn project(&self, vars: &[Variable]) -> Mapping {
        let mut projected = Mapping::new();
        for var in vars {
            if let Some(term) = self.get(var) {
                projected.bind(var.clone(), term.clone());
            }
        }
        projected
    }
}

/// A finite, possibly ordered multiset of [`Mapping`]s. Kept
/// as a plain `Vec`: operators stream mappings one at a time via iterator
/// adapters over this type rather than building intermediate `Solution`
/// values, except where evaluation genuinely needs materialization
/// (hash-join build side, ORDER BY, aggregation groups).
pub type Solution = Vec<Mapping>;
