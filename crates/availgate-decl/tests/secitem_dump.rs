//! Integration tests: a SecItem.h-shaped dump through ingest and resolve.

use availgate_decl::{Ingestor, read_declarations_from_path};
use availgate_kernel::{
    BranchGuard, EngineConfig, GuardClause, GuardSet, Platform, PlatformState, ResolvedModel,
    resolve,
};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn resolved() -> (ResolvedModel, availgate_decl::IngestReport) {
    let config = EngineConfig::default();
    let declarations = read_declarations_from_path(fixture("secitem.jsonl")).expect("fixture");
    let ingested = Ingestor::from_config(&config)
        .expect("default config")
        .ingest(&declarations);
    let model = resolve(&ingested.table, &config).expect("resolution");
    (model, ingested.report)
}

fn branch_names(model: &ResolvedModel, platform: Platform) -> Vec<(String, Vec<String>)> {
    model
        .decision(platform)
        .unwrap_or_else(|| panic!("no decision for {platform}"))
        .branches
        .iter()
        .map(|b| {
            (
                b.guard.to_string(),
                b.symbols.iter().map(|s| s.case_name.name.clone()).collect(),
            )
        })
        .collect()
}

#[test]
fn report_counts_dropped_attributes() {
    let (_, report) = resolved();
    assert_eq!(report.declarations, 10);
    assert_eq!(report.dropped_attributes, 2);
    assert_eq!(report.skipped_declarations, 0);
}

#[test]
fn symbols_are_sorted_and_consistent() {
    let (model, _) = resolved();
    assert!(model.is_consistent());
    let names: Vec<&str> = model.symbols.iter().map(|s| s.canonical_name()).collect();
    assert_eq!(
        names,
        vec![
            "attributeAccessGroup",
            "attributeAccessibleAfterFirstUnlock",
            "attributeAccessibleAlways",
            "attributeSharingGroup",
            "attributeSynchronizable",
            "class",
            "useAuthenticationUI",
            "useDataProtectionKeychain",
            "valueReference",
        ]
    );
    assert!(model.symbol("class").unwrap().case_name.escaped);
}

#[test]
fn baseline_availability_collapses() {
    let (model, _) = resolved();
    assert_eq!(
        model.symbol("kSecClass").unwrap().guards,
        GuardSet::Compact {
            platforms: vec![Platform::Ios, Platform::MacOs],
            unavailable: vec![Platform::WatchOs, Platform::TvOs, Platform::VisionOs],
        }
    );
    assert_eq!(
        model.symbol("valueReference").unwrap().guards,
        GuardSet::Compact {
            platforms: vec![Platform::Ios, Platform::MacOs, Platform::WatchOs],
            unavailable: vec![Platform::TvOs, Platform::VisionOs],
        }
    );
}

#[test]
fn deprecations_survive_with_rewritten_messages() {
    let (model, _) = resolved();
    let GuardSet::Explicit { clauses } = &model.symbol("attributeAccessibleAlways").unwrap().guards
    else {
        panic!("expected explicit guards");
    };
    assert_eq!(clauses.len(), 5);
    match &clauses[0] {
        GuardClause::Available {
            platform,
            deprecated,
            message,
        } => {
            assert_eq!(*platform, Platform::Ios);
            assert_eq!(deprecated.as_ref().map(ToString::to_string).as_deref(), Some("12.0"));
            assert!(
                message
                    .as_deref()
                    .unwrap()
                    .ends_with("such as attributeAccessibleAfterFirstUnlock")
            );
        }
        other => panic!("expected available clause, got {other:?}"),
    }
    assert_eq!(clauses[4], GuardClause::Unavailable { platform: Platform::VisionOs });
}

#[test]
fn explicit_unavailability_is_kept() {
    let (model, _) = resolved();
    let sync = model.symbol("attributeSynchronizable").unwrap();
    assert_eq!(
        sync.state(Platform::WatchOs),
        Some(&PlatformState::Unavailable { synthesized: false })
    );
    assert_eq!(
        sync.guards,
        GuardSet::Explicit {
            clauses: vec![
                GuardClause::Unavailable { platform: Platform::WatchOs },
                GuardClause::Unavailable { platform: Platform::TvOs },
                GuardClause::Unavailable { platform: Platform::VisionOs },
            ]
        }
    );
}

#[test]
fn decisions_per_platform() {
    let (model, _) = resolved();
    let platforms: Vec<Platform> = model.decisions.iter().map(|d| d.platform).collect();
    assert_eq!(platforms, Platform::ALL.to_vec());

    let ios = branch_names(&model, Platform::Ios);
    assert_eq!(ios.len(), 2);
    assert_eq!(ios[0].0, "since 17.0");
    assert_eq!(ios[0].1.len(), 8);
    assert_eq!(ios[1].0, "otherwise");
    assert!(!ios[1].1.contains(&"attributeSharingGroup".to_string()));
    assert!(!ios[0].1.contains(&"useDataProtectionKeychain".to_string()));

    assert_eq!(
        branch_names(&model, Platform::WatchOs),
        vec![
            (
                "since 10.0".to_string(),
                vec!["attributeSharingGroup".to_string(), "valueReference".to_string()]
            ),
            ("otherwise".to_string(), vec!["valueReference".to_string()]),
        ]
    );

    let tvos = model.decision(Platform::TvOs).unwrap();
    assert_eq!(tvos.branches.last().unwrap().guard, BranchGuard::Otherwise);
    assert!(tvos.branches.last().unwrap().symbols.is_empty());

    assert_eq!(
        branch_names(&model, Platform::VisionOs),
        vec![("otherwise".to_string(), vec!["attributeSharingGroup".to_string()])]
    );
}
