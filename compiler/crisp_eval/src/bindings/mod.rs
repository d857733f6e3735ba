//! Scoped multi-namespace binding store.
//!
//! Frames live in a stack (`Vec`); a frame's parent is simply the frame
//! below it. Lookups walk from the innermost frame outward and return the
//! first match for the requested namespace, so inner bindings shadow outer
//! ones per namespace.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::trace;

use crate::abi::FunctionFragment;
use crate::module::Module;
use crate::value::{Address, Value};

/// Logical partition of the store.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub enum Namespace {
    /// Script variables (`$name`).
    User,
    /// Resolved addresses.
    Addr,
    /// Cached function fragments.
    Abi,
    /// Loaded modules, by name and alias.
    Module,
    /// Pluggable identifier resolvers.
    DataProvider,
    /// Interpreter bookkeeping.
    Other,
}

impl Namespace {
    pub const ALL: [Namespace; 6] = [
        Namespace::User,
        Namespace::Addr,
        Namespace::Abi,
        Namespace::Module,
        Namespace::DataProvider,
        Namespace::Other,
    ];
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::User => "USER",
            Namespace::Addr => "ADDR",
            Namespace::Abi => "ABI",
            Namespace::Module => "MODULE",
            Namespace::DataProvider => "DATA_PROVIDER",
            Namespace::Other => "OTHER",
        })
    }
}

/// Resolves identifiers to addresses, e.g. the apps of a connected DAO.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn resolve(&self, identifier: &str) -> Option<Address>;

    /// Identifiers this provider can resolve, for completion.
    fn identifiers(&self) -> Vec<String>;
}

/// Payload of a binding.
#[derive(Clone)]
pub enum BindingValue {
    Value(Value),
    Abi(Arc<FunctionFragment>),
    Module(Arc<Module>),
    DataProvider(Arc<dyn DataProvider>),
    Text(String),
}

impl BindingValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            BindingValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Arc<Module>> {
        match self {
            BindingValue::Module(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_abi(&self) -> Option<&Arc<FunctionFragment>> {
        match self {
            BindingValue::Abi(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_data_provider(&self) -> Option<&Arc<dyn DataProvider>> {
        match self {
            BindingValue::DataProvider(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindingValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<Value> for BindingValue {
    fn from(v: Value) -> Self {
        BindingValue::Value(v)
    }
}

impl PartialEq for BindingValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BindingValue::Value(a), BindingValue::Value(b)) => a == b,
            (BindingValue::Abi(a), BindingValue::Abi(b)) => a == b,
            (BindingValue::Module(a), BindingValue::Module(b)) => Arc::ptr_eq(a, b),
            (BindingValue::DataProvider(a), BindingValue::DataProvider(b)) => Arc::ptr_eq(a, b),
            (BindingValue::Text(a), BindingValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::Value(v) => write!(f, "Value({v:?})"),
            BindingValue::Abi(a) => write!(f, "Abi({a})"),
            BindingValue::Module(m) => write!(f, "Module({})", m.name),
            BindingValue::DataProvider(p) => write!(f, "DataProvider({})", p.name()),
            BindingValue::Text(t) => write!(f, "Text({t:?})"),
        }
    }
}

/// A named entry in one namespace of one frame.
#[derive(Clone, PartialEq, Debug)]
pub struct Binding {
    pub identifier: String,
    pub namespace: Namespace,
    /// `None` marks a known identifier that is not resolved yet.
    pub value: Option<BindingValue>,
    /// Identifier of the entity this one belongs to, e.g. an app's DAO.
    pub parent: Option<String>,
}

impl Binding {
    pub fn new(
        identifier: impl Into<String>,
        namespace: Namespace,
        value: Option<BindingValue>,
    ) -> Self {
        Binding {
            identifier: identifier.into(),
            namespace,
            value,
            parent: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Which frame a failed write targeted.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FrameKind {
    Global,
    Local,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameKind::Global => "global",
            FrameKind::Local => "local",
        })
    }
}

/// Binding store failure.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum BindingError {
    #[error("{namespace} binding `{name}` already exists in the {frame} scope")]
    AlreadyExists {
        frame: FrameKind,
        namespace: Namespace,
        name: String,
    },
}

/// Options for [`BindingStore::get_all_bindings`].
#[derive(Clone, Debug, Default)]
pub struct BindingFilter {
    /// Only the innermost frame.
    pub only_local: bool,
    /// Restrict to these namespaces; empty means all.
    pub namespaces: Vec<Namespace>,
    /// Skip unresolved bindings.
    pub ignore_nulls: bool,
}

impl BindingFilter {
    pub fn namespace(namespace: Namespace) -> Self {
        BindingFilter {
            namespaces: vec![namespace],
            ..Self::default()
        }
    }

    fn accepts(&self, binding: &Binding) -> bool {
        (self.namespaces.is_empty() || self.namespaces.contains(&binding.namespace))
            && !(self.ignore_nulls && binding.value.is_none())
    }
}

#[derive(Clone, Debug, Default)]
struct Frame {
    /// Module whose commands unqualified names resolve to.
    module: Option<String>,
    /// One binding per namespace an identifier occupies.
    bindings: FxHashMap<String, SmallVec<[Binding; 2]>>,
}

impl Frame {
    fn get(&self, identifier: &str, namespace: Namespace) -> Option<&Binding> {
        self.bindings
            .get(identifier)?
            .iter()
            .find(|b| b.namespace == namespace)
    }

    fn get_mut(&mut self, identifier: &str, namespace: Namespace) -> Option<&mut Binding> {
        self.bindings
            .get_mut(identifier)?
            .iter_mut()
            .find(|b| b.namespace == namespace)
    }
}

/// Stack of binding frames. The root frame is never popped.
#[derive(Clone, Debug)]
pub struct BindingStore {
    frames: Vec<Frame>,
}

impl Default for BindingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingStore {
    pub fn new() -> Self {
        BindingStore {
            frames: vec![Frame::default()],
        }
    }

    /// Number of frames, root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a frame. Its module is `module` or the enclosing frame's.
    pub fn enter_scope(&mut self, module: Option<&str>) {
        let module = module
            .map(str::to_string)
            .or_else(|| self.current_frame().module.clone());
        trace!(depth = self.frames.len() + 1, ?module, "enter scope");
        self.frames.push(Frame {
            module,
            bindings: FxHashMap::default(),
        });
    }

    /// Pop the innermost frame. Returns `false` at the root.
    pub fn exit_scope(&mut self) -> bool {
        if self.frames.len() <= 1 {
            return false;
        }
        self.frames.pop();
        trace!(depth = self.frames.len(), "exit scope");
        true
    }

    pub fn current_module(&self) -> Option<&str> {
        self.current_frame().module.as_deref()
    }

    fn current_frame(&self) -> &Frame {
        // The root frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    pub fn set_binding(
        &mut self,
        identifier: &str,
        value: Option<BindingValue>,
        namespace: Namespace,
        is_global: bool,
        overwrite: bool,
    ) -> Result<(), BindingError> {
        self.set_binding_entry(
            Binding::new(identifier, namespace, value),
            is_global,
            overwrite,
        )
    }

    /// Write `binding` into the current frame, or the root if `is_global`.
    ///
    /// An occupied (identifier, namespace) pair in that frame is an error
    /// unless `overwrite`, which replaces the value in place.
    pub fn set_binding_entry(
        &mut self,
        binding: Binding,
        is_global: bool,
        overwrite: bool,
    ) -> Result<(), BindingError> {
        let (frame_kind, idx) = if is_global {
            (FrameKind::Global, 0)
        } else {
            (FrameKind::Local, self.frames.len() - 1)
        };
        let frame = &mut self.frames[idx];
        if let Some(existing) = frame.get_mut(&binding.identifier, binding.namespace) {
            if !overwrite {
                return Err(BindingError::AlreadyExists {
                    frame: frame_kind,
                    namespace: binding.namespace,
                    name: binding.identifier,
                });
            }
            existing.value = binding.value;
            existing.parent = binding.parent;
            return Ok(());
        }
        trace!(identifier = %binding.identifier, namespace = %binding.namespace, "bind");
        frame
            .bindings
            .entry(binding.identifier.clone())
            .or_default()
            .push(binding);
        Ok(())
    }

    /// Innermost binding of `identifier` in `namespace`.
    pub fn get_binding(&self, identifier: &str, namespace: Namespace) -> Option<&Binding> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.get(identifier, namespace))
    }

    /// Value of the innermost binding, `None` if absent or unresolved.
    pub fn get_binding_value(
        &self,
        identifier: &str,
        namespace: Namespace,
    ) -> Option<&BindingValue> {
        self.get_binding(identifier, namespace)?.value.as_ref()
    }

    pub fn has_binding(&self, identifier: &str, namespace: Namespace) -> bool {
        self.get_binding(identifier, namespace).is_some()
    }

    /// Every visible binding, innermost first, at most one per
    /// (identifier, namespace) pair.
    pub fn get_all_bindings(&self, filter: &BindingFilter) -> Vec<&Binding> {
        let frames = if filter.only_local {
            &self.frames[self.frames.len() - 1..]
        } else {
            &self.frames[..]
        };
        let mut seen: FxHashSet<(&str, Namespace)> = FxHashSet::default();
        let mut out = Vec::new();
        for frame in frames.iter().rev() {
            let mut local: Vec<&Binding> = frame
                .bindings
                .values()
                .flatten()
                .filter(|b| !seen.contains(&(b.identifier.as_str(), b.namespace)))
                .collect();
            local.sort_by(|a, b| {
                (a.identifier.as_str(), a.namespace).cmp(&(b.identifier.as_str(), b.namespace))
            });
            for binding in local {
                seen.insert((binding.identifier.as_str(), binding.namespace));
                if filter.accepts(binding) {
                    out.push(binding);
                }
            }
        }
        out
    }

    /// Drop every binding of `namespace` from all frames.
    pub fn clear_namespace(&mut self, namespace: Namespace) {
        for frame in &mut self.frames {
            frame.bindings.retain(|_, entries| {
                entries.retain(|b| b.namespace != namespace);
                !entries.is_empty()
            });
        }
    }

    /// Every data provider visible from the current frame, innermost first.
    pub fn data_providers(&self) -> Vec<Arc<dyn DataProvider>> {
        self.get_all_bindings(&BindingFilter {
            namespaces: vec![Namespace::DataProvider],
            ignore_nulls: true,
            ..BindingFilter::default()
        })
        .into_iter()
        .filter_map(|b| b.value.as_ref()?.as_data_provider().cloned())
        .collect()
    }
}

/// A binding store shared between the interpreter and running commands.
///
/// Guards are short-lived and never held across an `.await`.
#[derive(Clone, Debug, Default)]
pub struct SharedBindings(Arc<RwLock<BindingStore>>);

impl SharedBindings {
    pub fn new(store: BindingStore) -> Self {
        SharedBindings(Arc::new(RwLock::new(store)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, BindingStore> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, BindingStore> {
        self.0.write()
    }

    /// Copy of the store, for inspection after a run.
    pub fn snapshot(&self) -> BindingStore {
        self.0.read().clone()
    }
}

#[cfg(test)]
mod tests;
