//! restcheck CLI - contract checks for the GoRest users/posts/todos API

mod telemetry;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use restcheck_core::config::{SEED_VAR, TOKEN_VAR, parse_seed};
use restcheck_core::{Config, Environment, OutcomeStatus, RunReport, SchemaStore, SchemaValidator};
use restcheck_runner::{Fabricator, RestClient, SuiteRunner, scenarios};

const CONFIG_FILE: &str = ".restcheck.toml";
const RESOURCE_SCHEMAS: &[&str] = &["user", "post", "todo"];

#[derive(Parser)]
#[command(name = "restcheck")]
#[command(about = "Contract checks for the GoRest users/posts/todos API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose output (full instances in schema diagnostics, info logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run contract scenarios
    Run {
        /// Config file (default: .restcheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only run scenarios whose id contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Stop at the first scenario that does not pass
        #[arg(long)]
        stop_on_failure: bool,

        /// Dump all request/response pairs to JSONL files
        #[arg(long)]
        dump: bool,

        /// Directory for dump files (default: .restcheck/dumps)
        #[arg(long)]
        dump_dir: Option<PathBuf>,
    },

    /// List scenario ids without sending requests
    List {
        /// Only list scenarios whose id contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Check config, schema files and environment
    Doctor,

    /// Initialize config file
    Init,

    /// Export JSON Schema for the run report
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing(if cli.verbose { "info" } else { "warn" });

    let result = run(cli);
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
    }
    ExitCode::from(exit_status(&result))
}

/// Report codes pass through (0 or 1); tool and config errors are 3.
fn exit_status(result: &Result<i32>) -> u8 {
    match result {
        Ok(code) => u8::try_from(*code).unwrap_or(1),
        Err(_) => 3,
    }
}

/// What `run` resolves before it builds a client or sends anything.
struct RunSetup {
    cfg: Config,
    env: Environment,
}

/// Load the config, then the environment secrets.
///
/// `token` and `seed` are the raw `API_TOKEN` / `FAKER_SEED` values.
fn load_run_setup(
    config: Option<&Path>,
    token: Option<String>,
    seed: Option<String>,
) -> Result<RunSetup> {
    let cfg = match config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    tracing::info!(base_url = %cfg.base_url, schemas = %cfg.schemas_dir.display(), "config loaded");
    let env = Environment::from_vars(token, seed)?;
    Ok(RunSetup { cfg, env })
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            config,
            filter,
            stop_on_failure,
            dump,
            dump_dir,
        } => {
            // Secrets are checked before anything touches the network.
            let RunSetup { cfg, env } = load_run_setup(
                config.as_deref(),
                std::env::var(TOKEN_VAR).ok(),
                std::env::var(SEED_VAR).ok(),
            )?;

            let should_dump = dump || cfg.dump;
            let client = RestClient::new(&cfg.base_url, env.token)?.with_recording(should_dump);
            let schemas = SchemaStore::new(&cfg.schemas_dir);
            let runner = SuiteRunner::new(&client, &schemas)
                .with_validator(SchemaValidator::new(cli.verbose, cfg.truncate_at))
                .with_filter(filter)
                .with_stop_on_failure(stop_on_failure);

            let plan = runner.plan();
            if plan.is_empty() {
                eprintln!("Error: no scenario matches the filter.");
                return Ok(3);
            }
            if cli.output == OutputFormat::Terminal {
                eprintln!("Config:");
                eprintln!("  base_url: {}", cfg.base_url);
                eprintln!("  schemas:  {}", cfg.schemas_dir.display());
                match env.seed {
                    Some(seed) => eprintln!("  seed:     {seed}"),
                    None => eprintln!("  seed:     (random)"),
                }
                eprintln!();
            }

            let mut fake = Fabricator::new(env.seed);
            let report = runner.run_scenarios(&plan, &mut fake);

            match cli.output {
                OutputFormat::Terminal => print_terminal(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Silent => {}
            }

            if should_dump {
                let dump_path = dump_dir.unwrap_or_else(|| cfg.dump_dir_or_default());
                match restcheck_core::dump::write_dump(&client.take_exchanges(), &dump_path) {
                    Ok(index) => {
                        if cli.output != OutputFormat::Silent {
                            eprintln!(
                                "Dump: {} exchanges → {} ({})",
                                index.total,
                                dump_path.display(),
                                index
                                    .operations
                                    .iter()
                                    .map(|e| e.file.as_str())
                                    .collect::<Vec<_>>()
                                    .join(", "),
                            );
                        }
                    }
                    Err(e) => eprintln!("Warning: failed to write dump: {e}"),
                }
            }

            Ok(report.exit_code())
        }

        Commands::List { filter } => {
            let ids: Vec<String> = scenarios::select(filter.as_deref())
                .into_iter()
                .map(|s| s.id)
                .collect();
            match cli.output {
                OutputFormat::Terminal => {
                    for id in &ids {
                        println!("{id}");
                    }
                    eprintln!("\n{} scenarios", ids.len());
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ids)?),
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Doctor => doctor(),

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(1);
            }

            std::fs::write(CONFIG_FILE, Config::example())
                .with_context(|| format!("cannot write {CONFIG_FILE}"))?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: API under test");
            println!("  - schemas_dir: directory with user.json, post.json, todo.json");
            println!("\nThen export {TOKEN_VAR} (and optionally {SEED_VAR}).");
            Ok(0)
        }

        Commands::Schema => {
            let schema = restcheck_core::outcome::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}

fn print_terminal(report: &RunReport) {
    for outcome in &report.outcomes {
        println!("[{}] {} ({} ms)", outcome.status, outcome.id, outcome.elapsed_ms);
    }

    let problems: Vec<_> = report.problems().collect();
    if !problems.is_empty() {
        println!("\nProblems ({}):", problems.len());
        for outcome in problems {
            let kind = match outcome.status {
                OutcomeStatus::Errored => "error",
                _ => "failure",
            };
            println!("\n--- {} ({kind})", outcome.id);
            if let Some(message) = &outcome.message {
                println!("{}", message.trim_end());
            }
        }
    }

    if report.stopped_early {
        println!("\nStopped early: failure detected (--stop-on-failure)");
    }
    println!("\n{}", report.verdict_line());
    println!("  Exit code: {}", report.exit_code());
}

fn doctor() -> Result<i32> {
    println!("restcheck doctor");
    println!("================\n");

    let mut ok = true;

    let cfg = match Config::load_default() {
        Ok(cfg) => {
            let found = [".restcheck.toml", ".restcheck.json", "restcheck.toml"]
                .iter()
                .any(|p| Path::new(p).exists());
            println!(
                "[{}] Config file ({CONFIG_FILE})",
                if found { "OK" } else { "--" }
            );
            cfg
        }
        Err(e) => {
            println!("[NG] Config file: {e}");
            ok = false;
            Config::default()
        }
    };

    let schemas = SchemaStore::new(&cfg.schemas_dir);
    for name in RESOURCE_SCHEMAS {
        match schemas.get(name) {
            Ok(_) => println!("[OK] Schema {}", schemas.path_for(name).display()),
            Err(e) => {
                println!("[NG] {e}");
                ok = false;
            }
        }
    }

    match std::env::var(TOKEN_VAR) {
        Ok(token) if !token.is_empty() => println!("[OK] {TOKEN_VAR} is set"),
        _ => {
            println!("[NG] {TOKEN_VAR} is not set");
            ok = false;
        }
    }

    match parse_seed(std::env::var(SEED_VAR).ok().as_deref()) {
        Ok(Some(seed)) => println!("[OK] {SEED_VAR}={seed}"),
        Ok(None) => println!("[--] {SEED_VAR} not set (random data each run)"),
        Err(e) => {
            println!("[NG] {e}");
            ok = false;
        }
    }

    if ok {
        println!("\nReady to run: restcheck run");
        Ok(0)
    } else {
        println!("\nFix the [NG] items above, or create a config with: restcheck init");
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restcheck_core::ConfigError;

    fn config_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".restcheck.toml");
        std::fs::write(&path, Config::example()).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_token_stops_run_with_exit_3() {
        let (_dir, path) = config_file();
        let result = load_run_setup(Some(path.as_path()), None, Some("42".into())).map(|_| 0);

        let err = result.as_ref().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingToken)
        ));
        assert_eq!(exit_status(&result), 3);
    }

    #[test]
    fn non_numeric_seed_stops_run_with_exit_3() {
        let (_dir, path) = config_file();
        let result =
            load_run_setup(Some(path.as_path()), Some("t".into()), Some("abc".into())).map(|_| 0);
        assert_eq!(exit_status(&result), 3);
    }

    #[test]
    fn unreadable_config_is_reported_before_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = load_run_setup(Some(missing.as_path()), None, None).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(..))
        ));
    }

    #[test]
    fn valid_setup_carries_seed_and_config() {
        let (_dir, path) = config_file();
        let long_seed = "123456789012345678901234567890".to_string();
        let setup = load_run_setup(Some(path.as_path()), Some("secret".into()), Some(long_seed))
            .unwrap();
        assert_eq!(setup.cfg.base_url, restcheck_core::config::DEFAULT_BASE_URL);
        assert!(setup.env.seed.is_some());
        assert_eq!(setup.env.token.expose(), "secret");
    }

    #[test]
    fn report_codes_pass_through() {
        assert_eq!(exit_status(&Ok(0)), 0);
        assert_eq!(exit_status(&Ok(1)), 1);
        assert_eq!(exit_status(&Ok(-1)), 1);
    }
}
