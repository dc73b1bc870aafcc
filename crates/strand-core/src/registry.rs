//! Named string operations and the process-wide registry.
//!
//! All operations, built-in and user-supplied, implement the [`StringOp`]
//! trait and live in an [`OperationRegistry`] keyed by name. The engine
//! consults [`OperationRegistry::global`], a lazily-initialized process-wide
//! instance pre-populated with the built-ins.
//!
//! # Example
//!
//! ```
//! use strand_core::{OperationRegistry, Value};
//!
//! let registry = OperationRegistry::global();
//! registry.register_fn("shout", |inputs, _constants| {
//!     Ok(Value::Single(format!("{}!", inputs.join(" "))))
//! });
//!
//! let op = registry.get("shout").unwrap();
//! let out = op.apply(&["hey"], &[]).unwrap();
//! assert_eq!(out.as_single(), Some("hey!"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::OpError;
use crate::value::Value;

/// A named string operation.
///
/// Operations consume a slice of input strings (upstream node outputs, in
/// reference order) and a slice of constant strings, and produce a
/// [`Value`]. There is no declared arity or output cardinality; operations
/// validate their own arguments and fail with [`OpError`] on mismatch.
///
/// Implementations must be reentrant: the parallel evaluation strategy may
/// invoke an operation concurrently on different nodes. They must not retain
/// references to the argument slices past the call.
pub trait StringOp: Send + Sync {
    /// Name the operation is registered under.
    fn name(&self) -> &str;

    /// Apply the operation.
    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError>;
}

type OpFn = dyn Fn(&[&str], &[&str]) -> Result<Value, OpError> + Send + Sync;

/// Adapter registering a plain closure as a [`StringOp`].
struct FnOp {
    name: String,
    f: Box<OpFn>,
}

impl StringOp for FnOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        (self.f)(inputs, constants)
    }
}

/// Name-keyed table of string operations.
///
/// Registration is additive and last-writer-wins. Lookup hands out a cloned
/// `Arc`, so the internal lock is never held while an operation runs.
#[derive(Default)]
pub struct OperationRegistry {
    ops: RwLock<HashMap<String, Arc<dyn StringOp>>>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use with the built-in
    /// operations already registered.
    pub fn global() -> &'static OperationRegistry {
        static GLOBAL: OnceLock<OperationRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let registry = OperationRegistry::new();
            crate::ops::register_builtins(&registry);
            registry
        })
    }

    /// Registers an operation under its own name, replacing any previous
    /// entry with that name.
    pub fn register<O: StringOp + 'static>(&self, op: O) {
        self.register_arc(Arc::new(op));
    }

    /// Registers a shared operation, replacing any previous entry.
    pub fn register_arc(&self, op: Arc<dyn StringOp>) {
        let mut ops = self.ops.write().unwrap_or_else(|e| e.into_inner());
        ops.insert(op.name().to_string(), op);
    }

    /// Registers a closure as an operation under `name`.
    pub fn register_fn<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&[&str], &[&str]) -> Result<Value, OpError> + Send + Sync + 'static,
    {
        self.register(FnOp {
            name: name.into(),
            f: Box::new(f),
        });
    }

    /// Looks up an operation by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn StringOp>> {
        let ops = self.ops.read().unwrap_or_else(|e| e.into_inner());
        ops.get(name).cloned()
    }

    /// `true` if an operation with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        let ops = self.ops.read().unwrap_or_else(|e| e.into_inner());
        ops.contains_key(name)
    }

    /// Names of all registered operations, unordered.
    pub fn names(&self) -> Vec<String> {
        let ops = self.ops.read().unwrap_or_else(|e| e.into_inner());
        ops.keys().cloned().collect()
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        let ops = self.ops.read().unwrap_or_else(|e| e.into_inner());
        ops.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("ops", &self.names())
            .finish()
    }
}
