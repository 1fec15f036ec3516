use crate::support::{guard_lines, load_model_or_exit, print_json, write_if_changed};
use availgate_kernel::{Fallback, backend};
use serde_json::json;
use std::path::PathBuf;

pub fn run(
    declarations: String,
    config: Option<String>,
    output: Option<String>,
    backend_name: String,
    json_output: bool,
) {
    let loaded = load_model_or_exit(&declarations, config.as_deref());
    let model = &loaded.model;

    let digest = model.digest().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let written = output.map(|output| {
        if !model.is_consistent() {
            eprintln!(
                "error: refusing to write {output}: {} inconsistency(ies); run `availgate check`",
                model.inconsistencies.len()
            );
            std::process::exit(1);
        }
        let Some(emitter) = backend(&backend_name) else {
            eprintln!("error: unknown backend: {backend_name}");
            std::process::exit(1);
        };
        let rendered = emitter.emit(model).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        });
        let path = PathBuf::from(&output);
        let outcome = write_if_changed(&path, &rendered).unwrap_or_else(|e| {
            eprintln!("error: failed to write {output}: {e}");
            std::process::exit(1);
        });
        (path, emitter.name(), outcome)
    });

    if json_output {
        let output_json = written.as_ref().map(|(path, name, outcome)| {
            json!({
                "path": path.display().to_string(),
                "backend": name,
                "digest": outcome.digest,
                "written": outcome.written,
            })
        });
        let payload = json!({
            "declarations_path": loaded.declarations_path.display().to_string(),
            "config_source": loaded.config_source.to_string(),
            "report": loaded.report,
            "digest": digest,
            "model": model,
            "output": output_json,
        });
        print_json(&payload);
        return;
    }

    println!("availgate resolve {}", loaded.declarations_path.display());
    println!("  Config: {}", loaded.config_source);
    println!("  Gap policy: {}", loaded.config.gap_policy);
    println!(
        "  Declarations: {} ({} skipped, {} attribute(s) dropped)",
        loaded.report.declarations,
        loaded.report.skipped_declarations,
        loaded.report.dropped_attributes
    );
    println!("  Symbols: {}", model.symbols.len());
    println!("  Digest: {digest}");

    println!();
    println!("Guards:");
    for symbol in &model.symbols {
        println!("  {} ({})", symbol.case_name, symbol.raw_name);
        for line in guard_lines(&symbol.guards) {
            println!("    {line}");
        }
    }

    println!();
    println!("Branches:");
    for decision in &model.decisions {
        println!("  {} (baseline {})", decision.platform, decision.baseline);
        for branch in &decision.branches {
            let names: Vec<String> = branch
                .symbols
                .iter()
                .map(|s| s.case_name.rendered())
                .collect();
            println!("    {}: {}", branch.guard, names.join(", "));
        }
        if decision.fallback == Fallback::Trap {
            println!("    otherwise: trap");
        }
    }

    if !model.is_consistent() {
        println!();
        println!("Inconsistencies:");
        for inconsistency in &model.inconsistencies {
            println!("  [{}] {}", inconsistency.class, inconsistency.description);
        }
    }

    if let Some((path, name, outcome)) = written {
        println!();
        println!(
            "{} {} ({name})",
            if outcome.written { "Wrote" } else { "Unchanged" },
            path.display()
        );
    }
}
