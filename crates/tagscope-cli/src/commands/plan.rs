//! Plan command - shows the synchronization plan for one tag invocation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tagscope_core::{Attributes, BodyOutcome, LifecycleCallback};

use crate::commands::{configure_colors, load_library};
use crate::output::{json, pretty};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Name of the registered tag
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Attribute of the invocation, used for variables named by an attribute
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attrs: Vec<(String, String)>,

    /// Path to tagscope.toml (defaults to the nearest one above the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also list the checkpoints a run with this many body passes reaches (0 skips the body)
    #[arg(long, value_name = "N")]
    pub passes: Option<usize>,

    /// With --passes, evaluate the body without buffering it
    #[arg(long, requires = "passes")]
    pub include_body: bool,

    /// Output format (pretty, json)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl PlanArgs {
    pub fn run(&self) -> Result<()> {
        configure_colors(self.no_color);

        let library = load_library(self.config.as_deref())?;
        let attributes: Attributes = self.attrs.iter().cloned().collect();
        let plan = library.plan(&self.tag, &attributes)?;

        let replay: Option<Vec<LifecycleCallback>> = self.passes.map(|passes| {
            plan.replay(body_outcome(passes, self.include_body))
                .iter()
                .map(|entry| entry.callback)
                .collect()
        });

        match self.format.as_str() {
            "json" => println!("{}", json::plan_to_json(&self.tag, &plan, replay)?),
            "pretty" => {
                print!("{}", pretty::format_plan(&self.tag, &plan));
                if let Some(reached) = replay {
                    print!("{}", pretty::format_replay(&reached));
                }
            }
            other => anyhow::bail!("Invalid format '{}'. Valid values: pretty, json", other),
        }

        Ok(())
    }
}

fn body_outcome(passes: usize, include_body: bool) -> BodyOutcome {
    match (passes, include_body) {
        (0, _) => BodyOutcome::Skipped,
        (passes, true) => BodyOutcome::Included { passes },
        (passes, false) => BodyOutcome::Evaluated { passes },
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("attribute name is empty in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
