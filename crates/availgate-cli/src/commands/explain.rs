use crate::support::{guard_lines, load_model_or_exit, print_json, yes_no};
use availgate_kernel::{PlatformState, ResolvedModel};
use serde_json::json;

pub fn run(declarations: String, symbol: String, config: Option<String>, json_output: bool) {
    let loaded = load_model_or_exit(&declarations, config.as_deref());
    let model = &loaded.model;

    let Some(found) = model.symbol(&symbol) else {
        let excluded: Vec<&str> = model
            .excluded(&symbol)
            .into_iter()
            .map(|i| i.description.as_str())
            .collect();
        if excluded.is_empty() {
            eprintln!("error: unknown symbol: {symbol}");
        } else {
            eprintln!("error: {symbol} was excluded: {}", excluded.join("; "));
        }
        std::process::exit(1);
    };

    let branches = branch_membership(model, found.canonical_name());

    if json_output {
        let membership: serde_json::Map<String, serde_json::Value> = branches
            .iter()
            .map(|(platform, guards)| (platform.clone(), json!(guards)))
            .collect();
        let payload = json!({
            "symbol": found,
            "branches": membership,
        });
        print_json(&payload);
        return;
    }

    println!("availgate explain {}", found.case_name);
    println!("  Legacy name: {}", found.raw_name);
    println!("  Escaped: {}", yes_no(found.case_name.escaped));
    println!("  Platforms:");
    for resolution in &found.platforms {
        println!("    {}: {}", resolution.platform, describe_state(&resolution.state));
    }
    println!("  Guards:");
    for line in guard_lines(&found.guards) {
        println!("    {line}");
    }
    println!("  Branches:");
    for (platform, guards) in &branches {
        if guards.is_empty() {
            println!("    {platform}: (none)");
        } else {
            println!("    {platform}: {}", guards.join(", "));
        }
    }
}

fn describe_state(state: &PlatformState) -> String {
    match state {
        PlatformState::Unrestricted => "unrestricted".to_string(),
        PlatformState::Restricted { facts } => facts
            .iter()
            .map(|f| f.availability.to_string())
            .collect::<Vec<_>>()
            .join(" | "),
        PlatformState::Unavailable { synthesized: true } => "unavailable (completed)".to_string(),
        PlatformState::Unavailable { synthesized: false } => "unavailable".to_string(),
    }
}

/// Per decided platform, the guards of the branches listing `case_name`.
fn branch_membership(model: &ResolvedModel, case_name: &str) -> Vec<(String, Vec<String>)> {
    model
        .decisions
        .iter()
        .map(|decision| {
            let guards = decision
                .branches
                .iter()
                .filter(|b| b.contains(case_name))
                .map(|b| b.guard.to_string())
                .collect();
            (decision.platform.to_string(), guards)
        })
        .collect()
}
