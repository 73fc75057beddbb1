//! `vigil` operator CLI
//!
//! Runs the seed and legacy-field migration jobs against a JSON snapshot of
//! the document store. The snapshot is written back after every seed or
//! migrate job, failed or not, so writes committed before a failure are kept.
//! `inspect` only reads.

mod jobs;
mod logging;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use jobs::{JobOutput, Workspace};
use logging::LogFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use vigil_seed::{SeedTarget, VigilConfig};

fn cli() -> Command {
    Command::new("vigil")
        .version(vigil_seed::VERSION)
        .about("Seed and migration jobs for the Vigil content store")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value("vigil.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (defaults apply if it does not exist)"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Store snapshot, overriding store_path from the config"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print the job report as JSON"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(value_parser!(LogFormat))
                .help("Log line format: text or json"),
        )
        .subcommand(
            Command::new("seed")
                .about("Insert missing canonical entries and refresh managed fields")
                .arg(
                    Arg::new("target")
                        .required(true)
                        .value_parser(["communes", "services", "solutions"])
                        .help("Collection to seed"),
                )
                .arg(
                    Arg::new("entries")
                        .long("entries")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON or YAML entry file replacing the built-in catalog"),
                ),
        )
        .subcommand(
            Command::new("migrate")
                .about("Clear legacy fields")
                .arg(
                    Arg::new("which")
                        .required(true)
                        .value_parser(["industries", "solutions", "site-config", "all"])
                        .help("Collection to migrate, or all in standard order"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("List the documents of a collection")
                .arg(
                    Arg::new("collection")
                        .required(true)
                        .help("Collection name"),
                ),
        )
}

async fn run(matches: &ArgMatches) -> Result<JobOutput> {
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("vigil.toml"));
    let config = VigilConfig::load(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let workspace = Workspace::open(config, matches.get_one::<PathBuf>("store").cloned())?;

    let outcome = dispatch(&workspace, matches).await;
    if matches.subcommand_name() == Some("inspect") {
        return outcome;
    }

    finish(outcome, workspace.persist())
}

/// Job outcome after the snapshot save; a failed save never hides the job error
fn finish(outcome: Result<JobOutput>, saved: Result<()>) -> Result<JobOutput> {
    match (outcome, saved) {
        (outcome, Ok(())) => outcome,
        (Ok(_), Err(save)) => Err(save),
        (Err(job), Err(save)) => Err(job.context(format!("snapshot not saved: {save:#}"))),
    }
}

async fn dispatch(workspace: &Workspace, matches: &ArgMatches) -> Result<JobOutput> {
    match matches.subcommand() {
        Some(("seed", args)) => {
            let target: SeedTarget = required(args, "target")?
                .parse()
                .map_err(anyhow::Error::msg)?;
            let entries = args.get_one::<PathBuf>("entries");
            workspace.seed(target, entries.map(PathBuf::as_path)).await
        }
        Some(("migrate", args)) => workspace.migrate(required(args, "which")?).await,
        Some(("inspect", args)) => workspace.inspect(required(args, "collection")?).await,
        _ => anyhow::bail!("no command given, see --help"),
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{name}>"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    let log_format = matches
        .get_one::<LogFormat>("log-format")
        .copied()
        .unwrap_or_default();
    logging::init(log_format);

    match run(&matches).await {
        Ok(output) => {
            if matches.get_flag("json") {
                match serde_json::to_string_pretty(&output.to_json()) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{}", output.to_text());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "job failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_store::{DocumentStore, InMemoryStore};

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["vigil", "migrate", "all", "--json", "--store", "s.json"])
            .unwrap();
        assert!(matches.get_flag("json"));
        assert_eq!(
            matches.get_one::<PathBuf>("store"),
            Some(&PathBuf::from("s.json"))
        );
    }

    #[test]
    fn rejects_unknown_targets() {
        assert!(cli()
            .try_get_matches_from(["vigil", "seed", "industries"])
            .is_err());
        assert!(cli()
            .try_get_matches_from(["vigil", "migrate", "site_config"])
            .is_err());
    }

    #[tokio::test]
    async fn failed_job_keeps_writes_made_before_the_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let entries = dir.path().join("partial.json");
        std::fs::write(&entries, r#"[{"slug": "a"}, {"slug": "b", "_x": 1}]"#).unwrap();

        let matches = cli()
            .try_get_matches_from([
                "vigil",
                "seed",
                "communes",
                "--config",
                dir.path().join("absent.toml").to_str().unwrap(),
                "--store",
                store.to_str().unwrap(),
                "--entries",
                entries.to_str().unwrap(),
            ])
            .unwrap();

        let err = run(&matches).await.unwrap_err();
        assert!(format!("{err:#}").contains("reserved"));

        let saved = InMemoryStore::load(&store).unwrap();
        let slugs: Vec<String> = saved
            .collect("communes")
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.slug().map(str::to_string))
            .collect();
        assert_eq!(slugs, vec!["a"]);
    }

    #[tokio::test]
    async fn inspect_does_not_write_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let config = dir.path().join("absent.toml");

        let matches = cli()
            .try_get_matches_from([
                "vigil",
                "inspect",
                "communes",
                "--store",
                store.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .unwrap();
        run(&matches).await.unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn save_failure_is_reported_alongside_job_error() {
        let job = Err(anyhow::anyhow!("seeding communes"));
        let saved = Err(anyhow::anyhow!("disk full"));

        let message = format!("{:#}", finish(job, saved).unwrap_err());
        assert!(message.contains("seeding communes"), "{message}");
        assert!(message.contains("disk full"), "{message}");

        let report = JobOutput::Inspect {
            collection: "faqs".to_string(),
            records: Vec::new(),
        };
        let message = format!("{:#}", finish(Ok(report), Err(anyhow::anyhow!("disk full"))).unwrap_err());
        assert!(message.contains("disk full"));
    }

    #[tokio::test]
    async fn seed_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let store_arg = store.to_str().unwrap();
        let config_arg = dir.path().join("absent.toml");
        let config_arg = config_arg.to_str().unwrap();

        let seed = cli()
            .try_get_matches_from(["vigil", "seed", "services", "--store", store_arg, "--config", config_arg])
            .unwrap();
        run(&seed).await.unwrap();
        assert!(store.exists());

        let inspect = cli()
            .try_get_matches_from(["vigil", "inspect", "services", "--store", store_arg, "--config", config_arg])
            .unwrap();
        let JobOutput::Inspect { records, .. } = run(&inspect).await.unwrap() else {
            panic!("expected inspect output");
        };
        assert_eq!(records.len(), 6);
    }
}
