//! Metadrift CLI
//!
//! Command-line interface for reconciling local model manifests against a
//! canonical schema catalog.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use metadrift::{
    CatalogSnapshot, ModelCluster, ModelType, Reconciler, Report, ReportMode, SchemaCatalog,
    SnapshotCatalog,
};

#[derive(Parser)]
#[command(name = "metadrift")]
#[command(about = "Reconcile local data-model manifests against a canonical schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a model manifest against a catalog snapshot or a live server
    Check {
        /// Model manifest file (JSON cluster produced by the client)
        manifest: PathBuf,

        /// Catalog snapshot file (output of `metadrift pull`)
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        catalog: Option<PathBuf>,

        /// Base URL of a live metadata endpoint
        #[arg(long)]
        url: Option<String>,

        /// Bearer token for the metadata endpoint
        #[arg(long, requires = "url")]
        token: Option<String>,

        /// Strict mode: every canonical field must have a local property
        /// (default: only mandatory fields must)
        #[arg(long)]
        strict: bool,

        /// Stop each type at its first violation
        #[arg(long)]
        fail_fast: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Only show drifted types
        #[arg(long, short)]
        quiet: bool,
    },

    /// Download the catalog from a live server into a snapshot file
    Pull {
        /// Base URL of the metadata endpoint
        #[arg(long)]
        url: String,

        /// Bearer token for the metadata endpoint
        #[arg(long)]
        token: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Lint a model manifest offline (name grammar, missing descriptions)
    Lint {
        /// Model manifest file
        manifest: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            manifest,
            catalog,
            url,
            token,
            strict,
            fail_fast,
            json,
            quiet,
        } => run_check(CheckArgs {
            manifest,
            catalog,
            url,
            token,
            strict,
            fail_fast,
            json_output: json,
            quiet,
        }),

        Commands::Pull {
            url,
            token,
            output,
            pretty,
        } => run_pull(&url, token, output, pretty),

        Commands::Lint { manifest, json } => run_lint(&manifest, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

struct CheckArgs {
    manifest: PathBuf,
    catalog: Option<PathBuf>,
    url: Option<String>,
    token: Option<String>,
    strict: bool,
    fail_fast: bool,
    json_output: bool,
    quiet: bool,
}

fn run_check(args: CheckArgs) -> Result<(), u8> {
    let cluster = load_cluster(&args.manifest)?;

    let reports = match (&args.catalog, &args.url) {
        (Some(path), _) => {
            let catalog = SnapshotCatalog::from_file(path).map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
            check_cluster(catalog, &cluster, args.strict, args.fail_fast)?
        }
        (None, Some(url)) => {
            let catalog = remote_catalog(url, args.token.clone())?;
            check_cluster(catalog, &cluster, args.strict, args.fail_fast)?
        }
        // clap guarantees one of the two is present
        (None, None) => unreachable!(),
    };

    if args.json_output {
        println!("{}", serde_json::to_string_pretty(&reports).unwrap());
    } else {
        print_reports(&reports, args.quiet);
    }

    if reports.iter().all(Report::is_clean) {
        Ok(())
    } else {
        Err(1)
    }
}

fn check_cluster<C: SchemaCatalog>(
    catalog: C,
    cluster: &ModelCluster,
    strict: bool,
    fail_fast: bool,
) -> Result<Vec<Report>, u8> {
    let mode = if fail_fast {
        ReportMode::FailFast
    } else {
        ReportMode::CollectAll
    };
    Reconciler::new(catalog)
        .mode(mode)
        .reconcile_cluster(cluster, strict)
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })
}

fn print_reports(reports: &[Report], quiet: bool) {
    for report in reports {
        if report.is_clean() {
            if !quiet {
                println!(
                    "  \x1b[32m✓\x1b[0m {} ({})",
                    report.subject, report.remote_name
                );
            }
        } else {
            println!(
                "  \x1b[31m✗\x1b[0m {} ({})",
                report.subject, report.remote_name
            );
            for violation in &report.violations {
                println!("    \x1b[31mdrift\x1b[0m: {}", violation);
            }
        }
    }

    let drifted = reports.iter().filter(|r| !r.is_clean()).count();
    let violations: usize = reports.iter().map(|r| r.violations.len()).sum();
    println!();
    if drifted == 0 {
        println!(
            "\x1b[32m✓ {} types checked, all reconciled\x1b[0m",
            reports.len()
        );
    } else {
        println!(
            "\x1b[31m✗ {} types checked: {} clean, {} drifted ({} violations)\x1b[0m",
            reports.len(),
            reports.len() - drifted,
            drifted,
            violations
        );
    }
}

fn run_pull(
    url: &str,
    token: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let catalog = remote_catalog(url, token)?;
    let snapshot = CatalogSnapshot {
        entities: catalog.list_entity_types().map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?,
        enums: catalog.list_enum_types().map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?,
    };

    let json_output = if pretty {
        serde_json::to_string_pretty(&snapshot)
    } else {
        serde_json::to_string(&snapshot)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

#[cfg(feature = "remote")]
fn remote_catalog(url: &str, token: Option<String>) -> Result<metadrift::HttpCatalog, u8> {
    metadrift::HttpCatalog::new(url, token).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

#[cfg(not(feature = "remote"))]
fn remote_catalog(_url: &str, _token: Option<String>) -> Result<SnapshotCatalog, u8> {
    eprintln!("Error: this binary was built without the \"remote\" feature");
    Err(2)
}

fn run_lint(manifest: &Path, json_output: bool) -> Result<(), u8> {
    use metadrift::{validate_entity_name, validate_enum_name};

    let cluster = load_cluster(manifest)?;

    // Offline findings: malformed canonical bindings and undocumented
    // properties. Everything else needs the catalog.
    let mut findings: Vec<(String, String)> = Vec::new();
    for model in &cluster.types {
        let Some(remote_name) = model.remote_name() else {
            continue;
        };
        let named = match model {
            ModelType::Entity(_) => validate_entity_name(remote_name),
            ModelType::Enum(_) => validate_enum_name(remote_name),
        };
        if let Err(e) = named {
            findings.push((model.name().to_string(), e.to_string()));
        }

        if let ModelType::Entity(entity) = model {
            for property in &entity.properties {
                if property.description.is_none() {
                    findings.push((
                        model.name().to_string(),
                        format!("{}.{} has no description", entity.name, property.name),
                    ));
                }
            }
        }
    }

    if json_output {
        let output = serde_json::json!({
            "manifest": manifest.display().to_string(),
            "findings": findings
                .iter()
                .map(|(subject, message)| {
                    serde_json::json!({ "subject": subject, "message": message })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        for (subject, message) in &findings {
            println!("  \x1b[31m✗\x1b[0m {}: {}", subject, message);
        }
        println!();
        if findings.is_empty() {
            println!(
                "\x1b[32m✓ {} types linted, all passed\x1b[0m",
                cluster.types.len()
            );
        } else {
            println!(
                "\x1b[31m✗ {} types linted: {} findings\x1b[0m",
                cluster.types.len(),
                findings.len()
            );
        }
    }

    if findings.is_empty() {
        Ok(())
    } else {
        Err(1)
    }
}

fn load_cluster(path: &Path) -> Result<ModelCluster, u8> {
    ModelCluster::from_file(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}
