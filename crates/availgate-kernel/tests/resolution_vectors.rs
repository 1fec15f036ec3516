//! Integration tests: resolve fixture symbol sets end to end.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: an engine config and a list of symbol entries (in
//!   discovery order, duplicates included)
//! - expect.json: guards per symbol, branch lists per platform, and the
//!   reported inconsistencies

use availgate_kernel::{EngineConfig, ResolvedModel, SymbolEntry, SymbolTableBuilder, resolve};
use serde_json::{Value, json};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &PathBuf) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

/// The parts of a model the fixtures pin down.
fn project(model: &ResolvedModel) -> Value {
    let guards: serde_json::Map<String, Value> = model
        .symbols
        .iter()
        .map(|s| {
            (
                s.canonical_name().to_string(),
                serde_json::to_value(&s.guards).unwrap(),
            )
        })
        .collect();
    let decisions: serde_json::Map<String, Value> = model
        .decisions
        .iter()
        .map(|d| {
            let branches: Vec<Value> = d
                .branches
                .iter()
                .map(|b| {
                    let names: Vec<&str> = b.symbols.iter().map(|s| s.case_name.as_str()).collect();
                    json!([b.guard.to_string(), names])
                })
                .collect();
            (
                d.platform.to_string(),
                json!({ "fallback": d.fallback, "branches": branches }),
            )
        })
        .collect();
    let inconsistencies: Vec<Value> = model
        .inconsistencies
        .iter()
        .map(|i| json!({ "class": i.class, "symbol": i.symbol }))
        .collect();
    json!({
        "guards": guards,
        "decisions": decisions,
        "inconsistencies": inconsistencies,
    })
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let expected = read_json(&dir.join("expect.json"));

    let config: EngineConfig =
        serde_json::from_value(case["config"].clone()).expect("fixture config");
    config.validate().expect("fixture config must be valid");
    let entries: Vec<SymbolEntry> =
        serde_json::from_value(case["entries"].clone()).expect("fixture entries");

    let table = SymbolTableBuilder::from_iter(entries).close();
    let model = resolve(&table, &config).expect("resolution");
    let got = project(&model);

    assert_eq!(
        got,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&got).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn keychain_core() {
    run_fixture("keychain_core");
}

#[test]
fn trap_gap() {
    run_fixture("trap_gap");
}

#[test]
fn inconsistent_inputs() {
    run_fixture("inconsistent_inputs");
}
