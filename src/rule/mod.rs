pub mod layer;
pub mod ruleset;

use crate::cli::RulesArgs;
use ruleset::Ruleset;
use tracing::{debug, info};

/// Write the dependency-cruiser configuration to the output file or stdout
pub fn run_rules(args: &RulesArgs) -> anyhow::Result<()> {
    let ruleset = match &args.config {
        Some(path) => {
            debug!("Loading ruleset from {}", path);
            Ruleset::load(path)?
        }
        None => Ruleset::layered(&args.components_root),
    };
    ruleset.validate()?;
    info!("Ruleset has {} forbidden rule(s)", ruleset.forbidden.len());

    let json = ruleset.to_json()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))?;
            info!("Ruleset written to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
