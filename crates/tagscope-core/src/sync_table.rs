//! Variable synchronization points
//!
//! For each handler kind and lifecycle callback, the set of scope windows whose
//! variables must be re-bound to their current runtime value immediately after
//! that callback returns:
//!
//! | Kind           | start            | body-init        | body-reiterate   | end / invoke     |
//! |----------------|------------------|------------------|------------------|------------------|
//! | simple         |                  |                  |                  | AT_BEGIN, AT_END |
//! | classic        | AT_BEGIN, NESTED |                  |                  | AT_BEGIN, AT_END |
//! | iterating      | AT_BEGIN, NESTED |                  | AT_BEGIN, NESTED | AT_BEGIN, AT_END |
//! | body-buffering | AT_BEGIN, NESTED | AT_BEGIN, NESTED | AT_BEGIN, NESTED | AT_BEGIN, AT_END |
//!
//! The table is a process-wide constant; new handler kinds extend it rather than
//! derive it.

use serde::Serialize;
use serde::ser::Serializer;

use crate::handler::{HandlerKind, LifecycleCallback};
use crate::variable::VariableScope;

/// A subset of `{NESTED, AT_BEGIN, AT_END}`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeSet(u8);

impl ScopeSet {
    pub const EMPTY: ScopeSet = ScopeSet(0);
    pub const ALL: ScopeSet = ScopeSet::of(&VariableScope::ALL);

    pub const fn of(scopes: &[VariableScope]) -> ScopeSet {
        let mut bits = 0u8;
        let mut i = 0;
        while i < scopes.len() {
            bits |= 1 << scopes[i] as u8;
            i += 1;
        }
        ScopeSet(bits)
    }

    pub fn contains(&self, scope: VariableScope) -> bool {
        self.0 & (1 << scope as u8) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in protocol code order.
    pub fn iter(&self) -> impl Iterator<Item = VariableScope> + '_ {
        VariableScope::ALL
            .into_iter()
            .filter(move |scope| self.contains(*scope))
    }
}

impl std::fmt::Debug for ScopeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for ScopeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

const BODY: ScopeSet = ScopeSet::of(&[VariableScope::AtBegin, VariableScope::Nested]);
const TERMINAL: ScopeSet = ScopeSet::of(&[VariableScope::AtBegin, VariableScope::AtEnd]);

type Row = &'static [(LifecycleCallback, ScopeSet)];

#[derive(Debug)]
pub struct SynchronizationTable {
    simple: Row,
    classic: Row,
    iterating: Row,
    body_buffering: Row,
}

static TABLE: SynchronizationTable = SynchronizationTable {
    simple: &[(LifecycleCallback::Invoke, TERMINAL)],
    classic: &[
        (LifecycleCallback::Start, BODY),
        (LifecycleCallback::End, TERMINAL),
    ],
    iterating: &[
        (LifecycleCallback::Start, BODY),
        (LifecycleCallback::BodyReiterate, BODY),
        (LifecycleCallback::End, TERMINAL),
    ],
    body_buffering: &[
        (LifecycleCallback::Start, BODY),
        (LifecycleCallback::BodyInit, BODY),
        (LifecycleCallback::BodyReiterate, BODY),
        (LifecycleCallback::End, TERMINAL),
    ],
};

impl SynchronizationTable {
    /// The shared, read-only table.
    pub fn global() -> &'static SynchronizationTable {
        &TABLE
    }

    /// Checkpoints of `kind` in lifecycle order, paired with the scopes synchronized there.
    pub fn row(&self, kind: HandlerKind) -> &'static [(LifecycleCallback, ScopeSet)] {
        match kind {
            HandlerKind::Simple => self.simple,
            HandlerKind::Classic => self.classic,
            HandlerKind::Iterating => self.iterating,
            HandlerKind::BodyBuffering => self.body_buffering,
        }
    }

    /// Scopes to synchronize after `callback` returns. Empty for callbacks the kind
    /// never invokes.
    pub fn lookup(&self, kind: HandlerKind, callback: LifecycleCallback) -> ScopeSet {
        self.row(kind)
            .iter()
            .find(|(cb, _)| *cb == callback)
            .map(|(_, scopes)| *scopes)
            .unwrap_or(ScopeSet::EMPTY)
    }

    pub fn requires_sync(
        &self,
        kind: HandlerKind,
        callback: LifecycleCallback,
        scope: VariableScope,
    ) -> bool {
        self.lookup(kind, callback).contains(scope)
    }

    /// First checkpoint at which variables of `scope` are synchronized, if any.
    pub fn first_checkpoint(
        &self,
        kind: HandlerKind,
        scope: VariableScope,
    ) -> Option<LifecycleCallback> {
        self.row(kind)
            .iter()
            .find(|(_, scopes)| scopes.contains(scope))
            .map(|(callback, _)| *callback)
    }
}
