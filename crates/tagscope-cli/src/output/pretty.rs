//! Pretty formatter for human-readable terminal output

use colored::Colorize;
use tagscope_core::{
    HandlerKind, LifecycleCallback, ScopeSet, SynchronizationPlan, SynchronizationTable,
    VariableDescriptor,
};

const COLUMNS: [LifecycleCallback; 4] = [
    LifecycleCallback::Start,
    LifecycleCallback::BodyInit,
    LifecycleCallback::BodyReiterate,
    LifecycleCallback::End,
];

const KIND_WIDTH: usize = 16;
const CELL_WIDTH: usize = 18;

pub fn format_table(table: &SynchronizationTable) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<KIND_WIDTH$}", "kind").bold().to_string());
    for column in COLUMNS {
        let header = if column == LifecycleCallback::End {
            "end / invoke"
        } else {
            column.as_str()
        };
        output.push_str(&format!("{:<CELL_WIDTH$}", header).bold().to_string());
    }
    output.push('\n');

    for kind in HandlerKind::ALL {
        output.push_str(&format!("{:<KIND_WIDTH$}", kind.as_str()).cyan().to_string());
        for column in COLUMNS {
            // A simple handler's single callback is reported in the terminal column.
            let callback = if column.is_terminal() {
                kind.terminal_callback()
            } else {
                column
            };
            let cell = format_scopes(table.lookup(kind, callback));
            output.push_str(&format!("{:<CELL_WIDTH$}", cell));
        }
        output.push('\n');
    }

    output
}

pub fn format_plan(tag: &str, plan: &SynchronizationPlan) -> String {
    let mut lines = vec![format!(
        "{} ({})",
        tag.bold(),
        plan.kind().to_string().cyan()
    )];

    for entry in plan.entries() {
        lines.push(format!("  after {}", entry.callback.as_str().blue()));
        if entry.is_empty() {
            lines.push(format!("    {}", "nothing to synchronize".dimmed()));
            continue;
        }
        for var in &entry.declarations {
            lines.push(format!("    {} {}", "declare".green(), describe(var)));
        }
        for var in &entry.resyncs {
            lines.push(format!("    {}  {}", "resync".yellow(), describe(var)));
        }
    }

    lines.join("\n") + "\n"
}

pub fn format_replay(reached: &[LifecycleCallback]) -> String {
    let path: Vec<&str> = reached.iter().map(LifecycleCallback::as_str).collect();
    format!("  {} {}\n", "reached:".dimmed(), path.join(" -> "))
}

fn format_scopes(scopes: ScopeSet) -> String {
    if scopes.is_empty() {
        return "-".to_string();
    }
    scopes
        .iter()
        .map(|scope| scope.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(var: &VariableDescriptor) -> String {
    format!("{} {} [{}]", var.type_name(), var.name(), var.scope())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagscope_core::{VariableScope, compute_plan};

    #[test]
    fn table_has_header_and_row_per_kind() {
        let output = format_table(SynchronizationTable::global());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("body-reiterate"));
        assert!(lines[1].contains("simple"));
        assert!(lines[1].contains("AT_BEGIN, AT_END"));
        assert!(lines[4].contains("body-buffering"));
    }

    #[test]
    fn scopes_render_in_code_order() {
        let set = ScopeSet::of(&[VariableScope::AtBegin, VariableScope::Nested]);
        assert_eq!(format_scopes(set), "NESTED, AT_BEGIN");
        assert_eq!(format_scopes(ScopeSet::EMPTY), "-");
    }

    #[test]
    fn plan_lists_declarations_and_resyncs() {
        let vars = [VariableDescriptor::new("item", "Object", true, VariableScope::Nested).unwrap()];
        let plan = compute_plan(&vars, HandlerKind::Iterating).unwrap();

        let output = format_plan("forEach", &plan);

        assert!(output.contains("forEach"));
        assert!(output.contains("Object item [NESTED]"));
        assert!(output.contains("declare"));
        assert!(output.contains("resync"));
        assert!(output.contains("nothing to synchronize"));
    }

    #[test]
    fn replay_joins_callbacks() {
        let output = format_replay(&[LifecycleCallback::Start, LifecycleCallback::End]);
        assert!(output.contains("start -> end"));
    }
}
