use crate::support::{load_model_or_exit, print_json, print_sample_block, yes_no};
use serde_json::json;

pub fn run(declarations: String, config: Option<String>, json_output: bool) {
    let loaded = load_model_or_exit(&declarations, config.as_deref());
    let model = &loaded.model;
    let consistent = model.is_consistent();

    if json_output {
        let payload = json!({
            "declarations_path": loaded.declarations_path.display().to_string(),
            "config_source": loaded.config_source.to_string(),
            "report": loaded.report,
            "symbol_count": model.symbols.len(),
            "consistent": consistent,
            "inconsistencies": model.inconsistencies,
        });
        print_json(&payload);
    } else {
        println!("availgate check {}", loaded.declarations_path.display());
        println!("  Config: {}", loaded.config_source);
        println!("  Symbols: {}", model.symbols.len());
        println!("  Dropped attributes: {}", loaded.report.dropped_attributes);
        println!("  Consistent: {}", yes_no(consistent));
        let described: Vec<String> = model
            .inconsistencies
            .iter()
            .map(|i| format!("[{}] {}", i.class, i.description))
            .collect();
        print_sample_block("Inconsistencies", &described);
    }

    if !consistent {
        std::process::exit(1);
    }
}
