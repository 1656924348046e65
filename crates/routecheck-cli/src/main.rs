//! routecheck CLI - End-to-end contract suite for routing and places APIs

mod storage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use routecheck_core::config::API_KEY_ENV;
use routecheck_core::{Config, ScenarioReport, SchemaDocument, VerdictStatus};
use routecheck_runner::scenarios::catalogue;
use routecheck_runner::{HttpClient, ScenarioContext, Selection, Suite, SuiteRunner};

#[derive(Parser)]
#[command(name = "routecheck")]
#[command(about = "End-to-end contract suite for routing and places APIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the contract scenarios
    Run {
        /// Only run scenarios of this suite
        #[arg(short, long)]
        suite: Option<SuiteArg>,

        /// Only run scenarios whose id contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Config file (default: .routecheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report directory (default: from config, else .routecheck/reports)
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Do not write report artifacts
        #[arg(long)]
        no_report: bool,
    },

    /// List scenarios without running them
    List {
        /// Only list scenarios of this suite
        #[arg(short, long)]
        suite: Option<SuiteArg>,

        /// Config file (default: .routecheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Print the routing response schema, or the report index schema with --report
    Schema {
        #[arg(long)]
        report: bool,
    },

    /// Check configuration, credentials and schema
    Doctor {
        /// Config file (default: .routecheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SuiteArg {
    Routing,
    Catalog,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Routing => Suite::Routing,
            SuiteArg::Catalog => Suite::Catalog,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.output);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool, output: OutputFormat) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        let fallback = if output == OutputFormat::Silent {
            "error"
        } else {
            "info"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => Config::load_default()?,
    };
    Ok(config.with_env_overrides())
}

fn print_scenario(report: &ScenarioReport) {
    let status = if report.passed() { "PASS" } else { "FAIL" };
    println!("  {status} {} ({} ms)", report.id, report.duration_ms);
    if let Some(failure) = &report.failure {
        println!("       [{}] {}: {}", failure.kind, failure.step, failure.message);
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            suite,
            filter,
            config,
            report_dir,
            no_report,
        } => {
            let cfg = load_config(config.as_deref())?;
            let schema = SchemaDocument::routing_or_file(cfg.schema.as_deref())?;
            let client = HttpClient::from_config(&cfg)?;

            if cfg.api_key.is_empty() {
                tracing::warn!("no API key configured; set {API_KEY_ENV} or api_key in the config file");
            }

            let ctx = ScenarioContext {
                config: &cfg,
                schema: &schema,
                transport: &client,
            };
            let scenarios = catalogue(&cfg);
            let suite: Option<Suite> = suite.map(Into::into);
            let runner = SuiteRunner::new(ctx).with_selection(Selection {
                suite,
                filter: filter.clone(),
            });

            if cli.output == OutputFormat::Terminal {
                eprintln!("Config:");
                eprintln!("  routing_url: {}", cfg.routing_url);
                eprintln!("  places_url:  {}", cfg.places_url);
                eprintln!("  timeout:     {}s", cfg.timeout_secs);
                eprintln!("  schema:      {}", schema.name());
                eprintln!();
            }

            let terminal = cli.output == OutputFormat::Terminal;
            let summary = runner.run_with(&scenarios, |report| {
                if terminal {
                    print_scenario(report);
                }
            });
            let verdict = summary.verdict();

            match cli.output {
                OutputFormat::Terminal => {
                    let icon = if verdict.status == VerdictStatus::Pass {
                        "PASS"
                    } else {
                        "FAIL"
                    };
                    println!("\n{icon}: {}", verdict.reason);
                    println!(
                        "  Scenarios: {} total, {} passed, {} failed ({} ms)",
                        summary.total, summary.passed, summary.failed, summary.duration_ms
                    );
                    println!("  Exit code: {}", verdict.exit_code);
                }
                OutputFormat::Json => {
                    let scenarios: Vec<_> = summary
                        .reports
                        .iter()
                        .map(|r| {
                            serde_json::json!({
                                "id": r.id,
                                "suite": r.suite,
                                "outcome": r.outcome,
                                "duration_ms": r.duration_ms,
                                "failure": r.failure,
                            })
                        })
                        .collect();
                    let json_output = serde_json::json!({
                        "verdict": {
                            "status": verdict.status.to_string(),
                            "exit_code": verdict.exit_code,
                            "reason": verdict.reason,
                        },
                        "stats": {
                            "total": summary.total,
                            "passed": summary.passed,
                            "failed": summary.failed,
                            "duration_ms": summary.duration_ms,
                        },
                        "scenarios": scenarios,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            if !no_report && summary.total > 0 {
                let base = report_dir.unwrap_or_else(|| cfg.report_dir());
                let data = storage::RunData {
                    config: &cfg,
                    summary: &summary,
                    verdict: &verdict,
                    selection: suite.map_or("all", Suite::as_str),
                    filter: filter.as_deref(),
                };
                match storage::save_run(&base, &data) {
                    Ok(path) => {
                        if cli.output != OutputFormat::Silent {
                            eprintln!("Report saved: {}", path.display());
                        }
                    }
                    Err(e) => eprintln!("Warning: failed to save report: {e:#}"),
                }
            }

            Ok(verdict.exit_code)
        }

        Commands::List { suite, config } => {
            let cfg = load_config(config.as_deref())?;
            let suite: Option<Suite> = suite.map(Into::into);
            let scenarios: Vec<_> = catalogue(&cfg)
                .into_iter()
                .filter(|s| suite.is_none_or(|wanted| wanted == s.suite))
                .collect();

            match cli.output {
                OutputFormat::Terminal => {
                    for s in &scenarios {
                        println!("{:<8} {:<32} {}", s.suite, s.id, s.title);
                    }
                }
                OutputFormat::Json => {
                    let list: Vec<_> = scenarios
                        .iter()
                        .map(|s| {
                            serde_json::json!({
                                "id": s.id,
                                "suite": s.suite.as_str(),
                                "title": s.title,
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&list)?);
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Init => {
            let config_path = ".routecheck.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - routing_url / places_url: endpoints under test");
            println!("  - api_key: or set {API_KEY_ENV}");
            println!("  - points: named point sets for route scenarios");
            Ok(0)
        }

        Commands::Schema { report } => {
            if report {
                println!("{}", routecheck_core::report::generate_schema());
            } else {
                print!("{}", routecheck_core::schema::ROUTING_SCHEMA);
            }
            Ok(0)
        }

        Commands::Doctor { config } => {
            println!("routecheck doctor");
            println!("=================\n");

            let cfg = match load_config(config.as_deref()) {
                Ok(cfg) => {
                    println!("[OK] Config loaded");
                    cfg
                }
                Err(e) => {
                    println!("[NG] Config: {e:#}");
                    return Ok(1);
                }
            };

            let key_ok = !cfg.api_key.is_empty();
            println!(
                "[{}] API key ({})",
                if key_ok { "OK" } else { "NG" },
                if key_ok { "set" } else { API_KEY_ENV }
            );

            let schema_ok = match SchemaDocument::routing_or_file(cfg.schema.as_deref()) {
                Ok(schema) => {
                    println!("[OK] Schema compiles ({})", schema.name());
                    true
                }
                Err(e) => {
                    println!("[NG] Schema: {e}");
                    false
                }
            };

            println!(
                "[{}] Point sets: {}",
                if cfg.points.is_empty() { "--" } else { "OK" },
                cfg.points.keys().cloned().collect::<Vec<_>>().join(", ")
            );
            println!("[OK] Report dir: {}", cfg.report_dir().display());

            if !key_ok || !schema_ok {
                println!("\nCreate config file:");
                println!("  routecheck init");
                return Ok(1);
            }

            println!("\nReady to run!");
            Ok(0)
        }
    }
}
