use availgate_kernel::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "availgate",
    about = "availgate: availability guards and runtime branches for platform constant enumerations",
    version
)]
pub struct Cli {
    /// Tracing filter directives (overrides AVAILGATE_LOG)
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Log at debug level when no directives are given
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a declaration dump into guards and per-platform branches
    Resolve {
        /// Declaration dump (JSONL or a JSON array)
        declarations: String,

        /// Engine config (defaults to ./availgate.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Write the emitted artifact here; unchanged content is not rewritten
        #[arg(long)]
        output: Option<String>,

        /// Emission backend used for --output
        #[arg(long, default_value = "json-model")]
        backend: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how one symbol resolves on every platform
    Explain {
        /// Declaration dump (JSONL or a JSON array)
        declarations: String,

        /// Case name or legacy constant name
        symbol: String,

        /// Engine config (defaults to ./availgate.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a platform's branches at one runtime version
    Lookup {
        /// Declaration dump (JSONL or a JSON array)
        declarations: String,

        /// Platform token, e.g. iOS or macOS
        #[arg(long)]
        platform: String,

        /// Runtime OS version, e.g. 17.2
        #[arg(long)]
        version: String,

        /// Engine config (defaults to ./availgate.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report inconsistencies; exits non-zero when any exist
    Check {
        /// Declaration dump (JSONL or a JSON array)
        declarations: String,

        /// Engine config (defaults to ./availgate.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default engine config
    InitConfig {
        /// Destination path
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
