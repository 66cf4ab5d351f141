//! Tag-handler behavioral kinds and their lifecycle callbacks
//!
//! The set of kinds is closed: each one fixes an ordered callback sequence and a
//! body control-flow shape, and the synchronization table is total over exactly
//! these four.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerKind {
    /// One callback; body handling is the handler's own business.
    Simple,
    /// Start and end callbacks; the start callback decides whether the body is included.
    Classic,
    /// Adds a callback after each body pass that decides whether to iterate again.
    Iterating,
    /// Adds a one-time initialization callback before the first buffered body pass.
    #[serde(alias = "body_buffering")]
    BodyBuffering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleCallback {
    Start,
    BodyInit,
    BodyReiterate,
    End,
    /// Sole callback of a simple handler, combining start and end.
    Invoke,
}

/// How a kind's callbacks steer evaluation of the tag body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyControl {
    SinglePass,
    Conditional,
    LoopUntilDone,
    BufferedLoop,
}

const SIMPLE_CALLBACKS: &[LifecycleCallback] = &[LifecycleCallback::Invoke];
const CLASSIC_CALLBACKS: &[LifecycleCallback] = &[LifecycleCallback::Start, LifecycleCallback::End];
const ITERATING_CALLBACKS: &[LifecycleCallback] = &[
    LifecycleCallback::Start,
    LifecycleCallback::BodyReiterate,
    LifecycleCallback::End,
];
const BODY_BUFFERING_CALLBACKS: &[LifecycleCallback] = &[
    LifecycleCallback::Start,
    LifecycleCallback::BodyInit,
    LifecycleCallback::BodyReiterate,
    LifecycleCallback::End,
];

impl HandlerKind {
    pub const ALL: [HandlerKind; 4] = [
        HandlerKind::Simple,
        HandlerKind::Classic,
        HandlerKind::Iterating,
        HandlerKind::BodyBuffering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Simple => "simple",
            HandlerKind::Classic => "classic",
            HandlerKind::Iterating => "iterating",
            HandlerKind::BodyBuffering => "body-buffering",
        }
    }

    /// Callbacks in lifecycle order.
    pub fn callbacks(&self) -> &'static [LifecycleCallback] {
        match self {
            HandlerKind::Simple => SIMPLE_CALLBACKS,
            HandlerKind::Classic => CLASSIC_CALLBACKS,
            HandlerKind::Iterating => ITERATING_CALLBACKS,
            HandlerKind::BodyBuffering => BODY_BUFFERING_CALLBACKS,
        }
    }

    pub fn terminal_callback(&self) -> LifecycleCallback {
        match self {
            HandlerKind::Simple => LifecycleCallback::Invoke,
            _ => LifecycleCallback::End,
        }
    }

    pub fn body_control(&self) -> BodyControl {
        match self {
            HandlerKind::Simple => BodyControl::SinglePass,
            HandlerKind::Classic => BodyControl::Conditional,
            HandlerKind::Iterating => BodyControl::LoopUntilDone,
            HandlerKind::BodyBuffering => BodyControl::BufferedLoop,
        }
    }

    pub fn supports(&self, callback: LifecycleCallback) -> bool {
        self.callbacks().contains(&callback)
    }

    /// Whether reaching `callback` means the body has been evaluated at least once.
    pub fn implies_body_evaluated(&self, callback: LifecycleCallback) -> bool {
        self.supports(callback) && callback == LifecycleCallback::BodyReiterate
    }

    /// Checkpoints that sit directly before or after a body pass, where
    /// body-scoped variables are live.
    pub fn is_body_adjacent(&self, callback: LifecycleCallback) -> bool {
        self.supports(callback)
            && matches!(
                callback,
                LifecycleCallback::Start
                    | LifecycleCallback::BodyInit
                    | LifecycleCallback::BodyReiterate
            )
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "simple" => Ok(HandlerKind::Simple),
            "classic" => Ok(HandlerKind::Classic),
            "iterating" => Ok(HandlerKind::Iterating),
            "body-buffering" => Ok(HandlerKind::BodyBuffering),
            _ => Err(format!(
                "unknown handler kind '{}', expected simple, classic, iterating or body-buffering",
                s
            )),
        }
    }
}

impl LifecycleCallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleCallback::Start => "start",
            LifecycleCallback::BodyInit => "body-init",
            LifecycleCallback::BodyReiterate => "body-reiterate",
            LifecycleCallback::End => "end",
            LifecycleCallback::Invoke => "invoke",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleCallback::End | LifecycleCallback::Invoke)
    }
}

impl fmt::Display for LifecycleCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
