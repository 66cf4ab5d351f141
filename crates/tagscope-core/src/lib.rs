//! Scripting-variable scope and synchronization planning for custom template tags
//!
//! A tag invocation may introduce scripting variables into generated code. Each
//! variable has a scope window (`NESTED`, `AT_BEGIN`, `AT_END`) and the tag's
//! handler kind fixes a sequence of lifecycle callbacks. This crate computes, per
//! callback, which variables generated code must declare or re-bind.

pub mod config;
pub mod error;
pub mod handler;
pub mod library;
pub mod resolver;
pub mod sync_table;
pub mod variable;

pub use error::{ScopeError, TranslationError};
pub use handler::{BodyControl, HandlerKind, LifecycleCallback};
pub use library::{Attributes, TagLibrary};
pub use resolver::{
    BodyOutcome, PlanCache, PlanEntry, ScopeResolver, SynchronizationPlan, compute_plan,
};
pub use sync_table::{ScopeSet, SynchronizationTable};
pub use variable::{VariableDescriptor, VariableScope};
