//! permgate CLI - resolve which declared resources an actor may access
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`PERMGATE_*`)
//! 3. Project config (`.permgate/config.toml` in the project root)
//! 4. Global config (`~/.permgate/config.toml`, or `--config`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `PERMGATE_DEBUG`: Enable debug logging (`true`/`false`)
//! - `PERMGATE_GRANTED`: Granted permissions, comma-separated
//! - `PERMGATE_LOG_LEVEL`: Log filter used when `RUST_LOG` is unset
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Resolved |
//! | 1 | Runtime error (config, no granted permissions, predicate failure) |
//! | 2 | Invalid declarations |

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use permgate_runtime::config::{ConfigError, ConfigLoader, GateConfig};
use permgate_runtime::{evaluate_declarations, PredicateRegistry, StaticAuthority};
use permgate_types::{ErrorCode, PermissionValue, ResolveContext};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Exit code for invalid declarations.
const EXIT_INVALID_DECLARATIONS: i32 = 2;

/// permgate - resolve which declared resources an actor may access
#[derive(Parser, Debug)]
#[command(name = "permgate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Global config file (defaults to ~/.permgate/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Granted permission; repeat or comma-separate for several (overrides config)
    #[arg(short, long, value_name = "PERM", value_delimiter = ',')]
    granted: Vec<String>,

    /// Resource identifier passed to predicates
    #[arg(long, value_name = "NAME")]
    resource: Option<String>,

    /// Record passed to predicates, as JSON
    #[arg(long, value_name = "JSON")]
    record: Option<String>,

    /// Print every declaration's per-branch outcome instead of the survivors
    #[arg(long)]
    explain: bool,

    /// Emit JSON
    #[arg(long)]
    json: bool,
}

/// CLI-based configuration resolver.
///
/// Merges file/env config via [`ConfigLoader`] and applies CLI argument
/// overrides as the highest-priority layer.
struct CliConfigResolver {
    project_root: PathBuf,
    global_config: Option<PathBuf>,
    debug: bool,
    granted: Vec<String>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                eprintln!("warning: failed to get current directory, using '.': {e}");
                PathBuf::from(".")
            })
        });

        Self {
            project_root,
            global_config: args.config.clone(),
            debug: args.debug,
            granted: args.granted.clone(),
        }
    }

    fn resolve(&self) -> Result<GateConfig, ConfigError> {
        let mut loader = ConfigLoader::new().with_project_root(&self.project_root);
        if let Some(path) = &self.global_config {
            loader = loader.with_global_config(path);
        }

        let mut config = loader.load()?;

        // CLI overrides (highest priority)
        if self.debug {
            config.debug = true;
        }
        if !self.granted.is_empty() {
            config.granted = Some(PermissionValue::from_names(self.granted.clone()));
        }

        Ok(config)
    }
}

/// Terminal filter: --debug > --verbose > RUST_LOG env > config > default "warn".
fn terminal_filter(args: &Args, config: &GateConfig) -> EnvFilter {
    if config.debug {
        return EnvFilter::new("debug");
    }
    if args.verbose {
        return EnvFilter::new("info");
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    config
        .logging
        .level
        .as_deref()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn resolve_context(args: &Args) -> Result<ResolveContext> {
    let mut ctx = ResolveContext::new();
    if let Some(resource) = &args.resource {
        ctx = ctx.with_resource(resource.as_str());
    }
    if let Some(raw) = &args.record {
        let record: serde_json::Value =
            serde_json::from_str(raw).context("--record is not valid JSON")?;
        ctx = ctx.with_record(record);
    }
    Ok(ctx)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver
        .resolve()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    // Logs go to stderr so stdout stays machine-readable
    let terminal_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(terminal_layer.with_filter(terminal_filter(&args, &config)))
        .init();

    info!(
        path = %resolver.project_root.display(),
        declarations = config.declarations.len(),
        "Project root"
    );

    let registry = PredicateRegistry::with_builtins();
    let errors = config.validate_declarations(&registry);
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("error[{}]: {err}", err.code());
        }
        eprintln!("{} invalid declaration(s)", errors.len());
        std::process::exit(EXIT_INVALID_DECLARATIONS);
    }

    let declarations = config.build_declarations(&registry)?;
    let granted = config.granted.clone().context(
        "no granted permissions configured \
         (use --granted, PERMGATE_GRANTED or `granted` in config.toml)",
    )?;
    let ctx = resolve_context(&args)?;

    info!(granted = %granted, resource = ctx.resource(), "Resolving declarations");
    let authority = StaticAuthority::new(granted);

    if args.explain {
        let reports = report::explain(&declarations, &authority, &ctx).await?;
        report::print_explanations(&reports, args.json)?;
    } else {
        let verdicts = evaluate_declarations(&declarations, &authority, &ctx).await?;
        report::print_verdicts(&verdicts, args.json)?;
    }

    Ok(())
}
