//! Reactive bindings
//!
//! Static key extraction decides which bindings a data change touches;
//! descriptors record where each binding writes; `evaluate_bindings`
//! recomputes a batch of them.

pub mod descriptor;
pub mod keys;
pub mod update;

pub use descriptor::{BindingDescriptor, BindingMap, Target, WriteKind};
pub use keys::{extract_keys, KeyCache, KeyMap};
pub use update::{evaluate_bindings, BindingUpdate, UpdateValue};
