use clap::{Arg, ArgAction, Command};
use okg_content::TemplateModel;
use okg_core::{GenerationConfig, Pipeline, PipelineError};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Command::new("okg")
        .version(okg_core::VERSION)
        .about("Synthetic organizational knowledge graph generator")
        .subcommand_required(true)
        .subcommand(
            Command::new("generate")
                .about("Run the full generation pipeline")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .default_value("configs/single_team_fintech.yaml")
                        .help("Path to the YAML run configuration"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .default_value("out")
                        .help("Output directory for artifacts"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Validate config and run org + planning only"),
                )
                .arg(
                    Arg::new("verbose")
                        .long("verbose")
                        .short('v')
                        .action(ArgAction::SetTrue)
                        .help("Enable debug logging"),
                ),
        )
        .subcommand(
            Command::new("clear")
                .about("Remove previously generated artifacts")
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .default_value("out")
                        .help("Output directory to clear"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("generate", args)) => {
            let verbose = args.get_flag("verbose");
            init_tracing(verbose);

            let config_path = args.get_one::<String>("config").map(String::as_str).unwrap_or_default();
            let out_dir = args.get_one::<String>("out").map(String::as_str).unwrap_or("out");
            let dry_run = args.get_flag("dry-run");

            let config = match GenerationConfig::load(Path::new(config_path)) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            };

            // The deterministic template capability stands in for a live
            // provider client, which sits outside this binary.
            let pipeline = Pipeline::new(config, TemplateModel::shared());
            match pipeline.run(Path::new(out_dir), dry_run).await {
                Ok(summary) => {
                    println!("Persons:  {}", summary.stats.persons);
                    println!("Tickets:  {}", summary.stats.tickets);
                    println!("Messages: {}", summary.stats.mail_messages);
                    if let Some(manifest) = &summary.manifest {
                        println!("Artifacts: {} (see {out_dir}/manifest.json)", manifest.artifacts.len());
                    }
                    if !summary.report.passed() {
                        println!();
                        println!("{}", summary.report.generate_text());
                    }
                }
                Err(PipelineError::AuditBlocked { report }) => {
                    eprintln!("{}", report.generate_text());
                    eprintln!("error: audit blocked export");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(("clear", args)) => {
            init_tracing(false);
            let out_dir = args.get_one::<String>("out").map(String::as_str).unwrap_or("out");
            match okg_export::clear_output(Path::new(out_dir)) {
                Ok(removed) => println!("Removed {removed} artifacts from {out_dir}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        _ => unreachable!("subcommand required"),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
