use availgate_decl::{IngestReport, Ingestor, read_declarations_from_path};
use availgate_kernel::{
    DEFAULT_CONFIG_FILE, EngineConfig, GuardSet, Platform, ResolvedModel, Version, content_digest,
    resolve,
};
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AVAILGATE_LOG";

/// Install the stderr subscriber. `--log` wins over `AVAILGATE_LOG`.
pub fn init_tracing(directives: Option<&str>, verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("error: invalid --log directives: {e}");
            std::process::exit(1);
        }),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Where the engine config came from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(f, "(defaults)"),
        }
    }
}

pub fn load_config_or_exit(config_arg: Option<&str>) -> (EngineConfig, ConfigSource) {
    let path = match config_arg {
        Some(path) => PathBuf::from(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return (EngineConfig::default(), ConfigSource::Defaults);
            }
            default
        }
    };
    let config = EngineConfig::load(&path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    (config, ConfigSource::File(path))
}

/// Everything a command needs after loading and resolving.
pub struct Loaded {
    pub config: EngineConfig,
    pub config_source: ConfigSource,
    pub declarations_path: PathBuf,
    pub report: IngestReport,
    pub model: ResolvedModel,
}

pub fn load_model_or_exit(declarations_arg: &str, config_arg: Option<&str>) -> Loaded {
    let (config, config_source) = load_config_or_exit(config_arg);
    let declarations_path = PathBuf::from(declarations_arg);
    let declarations = read_declarations_from_path(&declarations_path).unwrap_or_else(|e| {
        eprintln!(
            "error: failed to load {}: {e}",
            declarations_path.display()
        );
        std::process::exit(1);
    });
    let ingestor = Ingestor::from_config(&config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let ingested = ingestor.ingest(&declarations);
    let model = resolve(&ingested.table, &config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    for inconsistency in &model.inconsistencies {
        tracing::warn!(class = %inconsistency.class, "{}", inconsistency.description);
    }
    Loaded {
        config,
        config_source,
        declarations_path,
        report: ingested.report,
        model,
    }
}

pub fn parse_platform_or_exit(platform: &str) -> Platform {
    platform.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn parse_version_or_exit(version: &str) -> Version {
    version.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn print_json(payload: &impl Serialize) {
    match serde_json::to_string_pretty(payload) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            eprintln!("error: failed to render json: {e}");
            std::process::exit(1);
        }
    }
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

/// One line per guard, as a declaration would carry them.
pub fn guard_lines(guards: &GuardSet) -> Vec<String> {
    match guards {
        GuardSet::Unconditional => vec!["(none)".to_string()],
        GuardSet::Compact {
            platforms,
            unavailable,
        } => {
            let mut lines = vec![
                platforms
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ];
            lines.extend(unavailable.iter().map(|p| format!("{p}, unavailable")));
            lines
        }
        GuardSet::Explicit { clauses } => clauses.iter().map(ToString::to_string).collect(),
    }
}

pub fn print_sample_block(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {title}:");
    for item in items {
        println!("    - {item}");
    }
}

/// Result of a write-if-changed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub digest: String,
    pub written: bool,
}

/// Replace `path` with `contents` unless the file already holds exactly
/// those bytes. The replacement goes through a synced temp file and a rename.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<WriteOutcome, String> {
    let digest = content_digest(contents.as_bytes());
    if let Ok(existing) = fs::read(path)
        && content_digest(&existing) == digest
    {
        tracing::debug!(path = %path.display(), "output unchanged");
        return Ok(WriteOutcome {
            digest,
            written: false,
        });
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), String> {
        let mut file =
            File::create(&tmp_path).map_err(|e| format!("{}: {e}", tmp_path.display()))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| format!("{}: {e}", tmp_path.display()))?;
        file.sync_all()
            .map_err(|e| format!("{}: {e}", tmp_path.display()))
    })();
    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        format!("{} -> {}: {e}", tmp_path.display(), path.display())
    })?;
    tracing::debug!(path = %path.display(), digest = %digest, "output written");
    Ok(WriteOutcome {
        digest,
        written: true,
    })
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}
