use crate::support::{load_model_or_exit, parse_platform_or_exit, parse_version_or_exit, print_json};
use availgate_kernel::Resolution;
use serde_json::json;

pub fn run(
    declarations: String,
    platform: String,
    version: String,
    config: Option<String>,
    json_output: bool,
) {
    let platform = parse_platform_or_exit(&platform);
    let runtime = parse_version_or_exit(&version);
    let loaded = load_model_or_exit(&declarations, config.as_deref());
    let model = &loaded.model;

    if !model.platforms.contains(&platform) {
        eprintln!("error: {platform} is not a configured platform");
        std::process::exit(1);
    }
    if let Some(baseline) = model.baseline.get(platform)
        && runtime.is_lower_than(baseline)
    {
        eprintln!("error: {platform} {runtime} is below the deployment baseline {baseline}");
        std::process::exit(1);
    }

    let Some(decision) = model.decision(platform) else {
        if json_output {
            print_json(&json!({
                "platform": platform,
                "version": runtime,
                "outcome": "no_decision",
                "symbols": [],
            }));
        } else {
            println!("availgate lookup {platform} {runtime}");
            println!("  Outcome: no decision (no symbol is available on {platform})");
        }
        return;
    };

    match decision.resolve(&runtime) {
        Resolution::Branch { index, branch } => {
            if json_output {
                print_json(&json!({
                    "platform": platform,
                    "version": runtime,
                    "outcome": "branch",
                    "branch_index": index,
                    "guard": branch.guard.to_string(),
                    "symbols": branch.symbols,
                }));
                return;
            }
            println!("availgate lookup {platform} {runtime}");
            println!("  Branch: #{index} ({})", branch.guard);
            println!("  Symbols: {}", branch.symbols.len());
            for symbol in &branch.symbols {
                println!("    {} = {}", symbol.case_name, symbol.raw_name);
            }
        }
        Resolution::Trap => {
            if json_output {
                print_json(&json!({
                    "platform": platform,
                    "version": runtime,
                    "outcome": "trap",
                    "symbols": [],
                }));
                return;
            }
            println!("availgate lookup {platform} {runtime}");
            println!("  Outcome: trap (below every branch bound)");
        }
    }
}
