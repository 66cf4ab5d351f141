//! Synchronization plans for one tag invocation
//!
//! [`ScopeResolver::compute_plan`] walks the handler kind's callbacks in lifecycle
//! order and, at each checkpoint, splits the variables the table synchronizes
//! there into fresh declarations and re-assignments. The resulting
//! [`SynchronizationPlan`] is what code emission consumes.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::ScopeError;
use crate::handler::{HandlerKind, LifecycleCallback};
use crate::sync_table::{ScopeSet, SynchronizationTable};
use crate::variable::VariableDescriptor;

/// Variables to bind right after one callback returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub callback: LifecycleCallback,
    /// Emitted as typed local declarations initialized from attribute storage.
    pub declarations: Vec<VariableDescriptor>,
    /// Emitted as assignments to locals declared earlier.
    pub resyncs: Vec<VariableDescriptor>,
}

impl PlanEntry {
    fn new(callback: LifecycleCallback) -> Self {
        Self {
            callback,
            declarations: Vec::new(),
            resyncs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.resyncs.is_empty()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declarations.iter().any(|var| var.name() == name)
    }

    pub fn is_resynced(&self, name: &str) -> bool {
        self.resyncs.iter().any(|var| var.name() == name)
    }
}

/// How a concrete run treated the tag body, for [`SynchronizationPlan::replay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOutcome {
    /// The handler skipped the body at its start callback.
    Skipped,
    /// The body ran `passes` times.
    Evaluated { passes: usize },
    /// The body ran `passes` times straight into the enclosing output. A
    /// buffering handler never reaches `body-init` in this mode.
    Included { passes: usize },
}

/// One entry per lifecycle callback of the handler kind, in lifecycle order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynchronizationPlan {
    kind: HandlerKind,
    entries: Vec<PlanEntry>,
}

impl SynchronizationPlan {
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn entry(&self, callback: LifecycleCallback) -> Option<&PlanEntry> {
        self.entries.iter().find(|entry| entry.callback == callback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn terminal(&self) -> Option<&PlanEntry> {
        self.entries.last()
    }

    /// Checkpoints a concrete run reaches, in the order it reaches them.
    ///
    /// The start and terminal callbacks are always reached, so `AT_BEGIN` and
    /// `AT_END` variables are synchronized even when the body is skipped.
    /// `body-init` runs once before the first buffered pass and `body-reiterate`
    /// once after every pass.
    pub fn replay(&self, outcome: BodyOutcome) -> Vec<&PlanEntry> {
        let (passes, buffered) = match outcome {
            BodyOutcome::Skipped => (0, false),
            BodyOutcome::Evaluated { passes } => (passes, true),
            BodyOutcome::Included { passes } => (passes, false),
        };

        let mut reached = Vec::new();
        for entry in &self.entries {
            match entry.callback {
                LifecycleCallback::BodyInit => {
                    if buffered && passes > 0 {
                        reached.push(entry);
                    }
                }
                LifecycleCallback::BodyReiterate => {
                    reached.extend(std::iter::repeat_n(entry, passes));
                }
                LifecycleCallback::Start | LifecycleCallback::End | LifecycleCallback::Invoke => {
                    reached.push(entry);
                }
            }
        }
        reached
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScopeResolver {
    table: &'static SynchronizationTable,
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeResolver {
    pub fn new() -> Self {
        Self {
            table: SynchronizationTable::global(),
        }
    }

    pub fn table(&self) -> &'static SynchronizationTable {
        self.table
    }

    /// Computes the synchronization plan for one tag invocation.
    ///
    /// A descriptor that introduces a new binding is declared at the first
    /// checkpoint where its scope is synchronized and re-assigned at every later
    /// one. Descriptors rebinding an existing variable are re-assigned everywhere.
    #[instrument(skip_all, fields(kind = %kind, variables = descriptors.len()))]
    pub fn compute_plan(
        &self,
        descriptors: &[VariableDescriptor],
        kind: HandlerKind,
    ) -> Result<SynchronizationPlan, ScopeError> {
        check_duplicates(descriptors)?;

        let mut first_checkpoints = Vec::with_capacity(descriptors.len());
        for var in descriptors {
            if !ScopeSet::ALL.contains(var.scope()) {
                return Err(ScopeError::UnscopedVariable {
                    name: var.name().to_string(),
                });
            }

            let first = self.table.first_checkpoint(kind, var.scope());
            if first.is_none() {
                warn!(
                    variable = var.name(),
                    scope = %var.scope(),
                    "no checkpoint of this handler kind synchronizes the variable"
                );
            }
            first_checkpoints.push(first);
        }

        let entries = self
            .table
            .row(kind)
            .iter()
            .map(|&(callback, scopes)| {
                let mut entry = PlanEntry::new(callback);
                for (var, first) in descriptors.iter().zip(&first_checkpoints) {
                    if !scopes.contains(var.scope()) {
                        continue;
                    }
                    if var.is_new_declaration() && *first == Some(callback) {
                        entry.declarations.push(var.clone());
                    } else {
                        entry.resyncs.push(var.clone());
                    }
                }
                entry
            })
            .collect::<Vec<_>>();

        debug!(checkpoints = entries.len(), "computed synchronization plan");

        Ok(SynchronizationPlan { kind, entries })
    }
}

/// Computes a plan against the shared synchronization table.
pub fn compute_plan(
    descriptors: &[VariableDescriptor],
    kind: HandlerKind,
) -> Result<SynchronizationPlan, ScopeError> {
    ScopeResolver::new().compute_plan(descriptors, kind)
}

fn check_duplicates(descriptors: &[VariableDescriptor]) -> Result<(), ScopeError> {
    let mut seen: HashMap<&str, Vec<&VariableDescriptor>> = HashMap::new();

    for var in descriptors {
        let earlier = seen.entry(var.name()).or_default();
        if let Some(clash) = earlier.iter().find(|prev| prev.scope().overlaps(var.scope())) {
            return Err(ScopeError::DuplicateVariableName {
                name: var.name().to_string(),
                first: clash.scope(),
                second: var.scope(),
            });
        }
        earlier.push(var);
    }

    Ok(())
}

type PlanKey = (HandlerKind, Vec<VariableDescriptor>);

/// Memoized plans keyed by handler kind and descriptor sequence.
///
/// Safe to share between threads compiling independent invocations. Failed
/// resolutions are not cached. Nothing is evicted: entries stay until
/// [`PlanCache::clear`] or until the cache is dropped.
#[derive(Debug, Default)]
pub struct PlanCache {
    resolver: ScopeResolver,
    plans: DashMap<PlanKey, Arc<SynchronizationPlan>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &self,
        descriptors: &[VariableDescriptor],
        kind: HandlerKind,
    ) -> Result<Arc<SynchronizationPlan>, ScopeError> {
        let key = (kind, descriptors.to_vec());
        if let Some(plan) = self.plans.get(&key) {
            debug!(kind = %kind, "plan cache hit");
            return Ok(Arc::clone(plan.value()));
        }

        let plan = Arc::new(self.resolver.compute_plan(descriptors, kind)?);
        let stored = self.plans.entry(key).or_insert(plan);
        Ok(Arc::clone(stored.value()))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn clear(&self) {
        self.plans.clear();
    }
}
