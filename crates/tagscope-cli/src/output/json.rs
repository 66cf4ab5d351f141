//! JSON output for programmatic consumers such as code-emission backends

use serde::Serialize;
use tagscope_core::{
    BodyControl, HandlerKind, LifecycleCallback, ScopeSet, SynchronizationPlan,
    SynchronizationTable,
};

#[derive(Serialize)]
pub struct JsonPlan<'a> {
    pub version: &'static str,
    pub tag: &'a str,
    pub plan: &'a SynchronizationPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay: Option<Vec<LifecycleCallback>>,
}

#[derive(Serialize)]
pub struct JsonTableRow {
    pub kind: HandlerKind,
    pub body_control: BodyControl,
    pub checkpoints: Vec<JsonCheckpoint>,
}

#[derive(Serialize)]
pub struct JsonCheckpoint {
    pub callback: LifecycleCallback,
    pub synchronize: ScopeSet,
}

pub fn plan_to_json(
    tag: &str,
    plan: &SynchronizationPlan,
    replay: Option<Vec<LifecycleCallback>>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonPlan {
        version: env!("CARGO_PKG_VERSION"),
        tag,
        plan,
        replay,
    })
}

pub fn table_to_json(table: &SynchronizationTable) -> serde_json::Result<String> {
    let rows: Vec<JsonTableRow> = HandlerKind::ALL
        .into_iter()
        .map(|kind| JsonTableRow {
            kind,
            body_control: kind.body_control(),
            checkpoints: table
                .row(kind)
                .iter()
                .map(|&(callback, synchronize)| JsonCheckpoint {
                    callback,
                    synchronize,
                })
                .collect(),
        })
        .collect();

    serde_json::to_string_pretty(&rows)
}
