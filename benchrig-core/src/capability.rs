//! Capability Bindings
//!
//! Environment-dependent operations are addressed by a [`CapabilityId`] and
//! supplied as [`Binding`]s when a runner is constructed. The bindings are
//! resolved once into an immutable [`CapabilityRegistry`].
//!
//! ## Resolution
//!
//! ```text
//! default_bindings()      NOW -> SystemClock
//!        │
//!        ▼
//! BindingList (in order)  [WRITE_FILE -> host, WRITE_FILE -> caller, ...]
//!        │
//!        ▼
//! CapabilityRegistry      last registration per identifier wins
//! ```
//!
//! Lookups never mutate the registry, and repeated lookups return the same
//! `Arc`. Per-sample overrides go through [`CapabilityRegistry::with_overrides`],
//! which builds a new registry and leaves the original untouched.

use crate::clock::{Clock, SystemClock};
use crate::write_file::FileWriter;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Stable symbolic key of a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityId {
    /// Write a named file with the given content (`WRITE_FILE`)
    WriteFile,
    /// Current wall-clock time (`NOW`)
    Now,
}

impl CapabilityId {
    /// Every known capability
    pub const ALL: [CapabilityId; 2] = [CapabilityId::WriteFile, CapabilityId::Now];

    /// Symbolic name, e.g. `WRITE_FILE`
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityId::WriteFile => "WRITE_FILE",
            CapabilityId::Now => "NOW",
        }
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability was requested but nothing was bound for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no binding registered for capability {0}")]
pub struct UnboundCapability(pub CapabilityId);

/// Concrete implementation carried by a [`Binding`]
#[derive(Clone)]
pub enum CapabilityImpl {
    /// Implementation of `WRITE_FILE`
    WriteFile(Arc<dyn FileWriter>),
    /// Implementation of `NOW`
    Now(Arc<dyn Clock>),
}

impl CapabilityImpl {
    /// Identifier this implementation satisfies
    pub fn id(&self) -> CapabilityId {
        match self {
            CapabilityImpl::WriteFile(_) => CapabilityId::WriteFile,
            CapabilityImpl::Now(_) => CapabilityId::Now,
        }
    }
}

impl fmt::Debug for CapabilityImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityImpl({})", self.id())
    }
}

/// Identifier-to-implementation pair.
///
/// The identifier is derived from the implementation, so a binding can never
/// associate `WRITE_FILE` with something that is not a [`FileWriter`].
#[derive(Debug, Clone)]
pub struct Binding {
    implementation: CapabilityImpl,
}

impl Binding {
    /// Bind `WRITE_FILE`
    pub fn write_file(writer: impl FileWriter + 'static) -> Self {
        Self::write_file_arc(Arc::new(writer))
    }

    /// Bind `WRITE_FILE` to an already shared writer
    pub fn write_file_arc(writer: Arc<dyn FileWriter>) -> Self {
        Self {
            implementation: CapabilityImpl::WriteFile(writer),
        }
    }

    /// Bind `NOW`
    pub fn clock(clock: impl Clock + 'static) -> Self {
        Self::clock_arc(Arc::new(clock))
    }

    /// Bind `NOW` to an already shared clock
    pub fn clock_arc(clock: Arc<dyn Clock>) -> Self {
        Self {
            implementation: CapabilityImpl::Now(clock),
        }
    }

    /// Identifier this binding registers
    pub fn id(&self) -> CapabilityId {
        self.implementation.id()
    }

    /// Bound implementation
    pub fn implementation(&self) -> &CapabilityImpl {
        &self.implementation
    }
}

/// Ordered sequence of bindings; later entries shadow earlier ones.
#[derive(Debug, Clone, Default)]
pub struct BindingList {
    bindings: Vec<Binding>,
}

impl BindingList {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding
    pub fn push(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Append a binding, builder style
    pub fn with(mut self, binding: Binding) -> Self {
        self.push(binding);
        self
    }

    /// Append every binding of `other`, preserving its order
    pub fn extend(&mut self, other: BindingList) {
        self.bindings.extend(other.bindings);
    }

    /// Number of bindings, shadowed ones included
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }
}

impl From<Vec<Binding>> for BindingList {
    fn from(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }
}

impl FromIterator<Binding> for BindingList {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BindingList {
    type Item = Binding;
    type IntoIter = std::vec::IntoIter<Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.into_iter()
    }
}

/// Bindings every registry starts from.
///
/// Only `NOW` has a default; `WRITE_FILE` must be supplied by the environment.
pub fn default_bindings() -> BindingList {
    BindingList::new().with(Binding::clock(SystemClock))
}

/// Resolved, immutable capability lookup table
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    entries: FxHashMap<CapabilityId, CapabilityImpl>,
}

impl CapabilityRegistry {
    /// Resolve [`default_bindings`] followed by `bindings`
    pub fn resolve(bindings: &BindingList) -> Self {
        let mut registry = Self {
            entries: FxHashMap::default(),
        };
        registry.register_all(&default_bindings());
        registry.register_all(bindings);
        registry
    }

    /// New registry with `bindings` layered over this one
    pub fn with_overrides(&self, bindings: &BindingList) -> Self {
        let mut registry = self.clone();
        registry.register_all(bindings);
        registry
    }

    fn register_all(&mut self, bindings: &BindingList) {
        for binding in bindings.iter() {
            let id = binding.id();
            if self
                .entries
                .insert(id, binding.implementation().clone())
                .is_some()
            {
                tracing::debug!(capability = %id, "binding shadows an earlier registration");
            } else {
                tracing::debug!(capability = %id, "binding registered");
            }
        }
    }

    /// Whether anything is bound for `id`
    pub fn contains(&self, id: CapabilityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Implementation bound for `id`
    pub fn get(&self, id: CapabilityId) -> Result<&CapabilityImpl, UnboundCapability> {
        self.entries.get(&id).ok_or(UnboundCapability(id))
    }

    /// The `WRITE_FILE` implementation
    pub fn write_file(&self) -> Result<Arc<dyn FileWriter>, UnboundCapability> {
        match self.get(CapabilityId::WriteFile)? {
            CapabilityImpl::WriteFile(writer) => Ok(Arc::clone(writer)),
            CapabilityImpl::Now(_) => Err(UnboundCapability(CapabilityId::WriteFile)),
        }
    }

    /// The `NOW` implementation
    pub fn clock(&self) -> Result<Arc<dyn Clock>, UnboundCapability> {
        match self.get(CapabilityId::Now)? {
            CapabilityImpl::Now(clock) => Ok(Arc::clone(clock)),
            CapabilityImpl::WriteFile(_) => Err(UnboundCapability(CapabilityId::Now)),
        }
    }

    /// Identifiers currently bound, in declaration order
    pub fn bound(&self) -> Vec<CapabilityId> {
        CapabilityId::ALL
            .into_iter()
            .filter(|id| self.contains(*id))
            .collect()
    }
}
