use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::prune::DateErrorPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Sync {
        config: Option<PathBuf>,
    },
    Prune {
        config: Option<PathBuf>,
        today: Option<NaiveDate>,
        policy: DateErrorPolicy,
    },
    Help,
}

/// Parse the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some((subcommand, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match subcommand.as_str() {
        "sync" => {
            let mut config = None;
            let mut i = 0;
            while i < rest.len() {
                match rest[i].as_str() {
                    "-c" | "--config" => {
                        config = Some(PathBuf::from(flag_value(rest, &mut i)?));
                    }
                    other => bail!("Unknown option for sync: {other}"),
                }
                i += 1;
            }
            Ok(Command::Sync { config })
        }
        "prune" => {
            let mut config = None;
            let mut today = None;
            let mut policy = DateErrorPolicy::FailFast;
            let mut i = 0;
            while i < rest.len() {
                match rest[i].as_str() {
                    "-c" | "--config" => {
                        config = Some(PathBuf::from(flag_value(rest, &mut i)?));
                    }
                    "--today" => {
                        let value = flag_value(rest, &mut i)?;
                        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(
                            || format!("Invalid --today date {value:?}, expected YYYY-MM-DD"),
                        )?;
                        today = Some(date);
                    }
                    "--lenient-dates" => policy = DateErrorPolicy::Report,
                    other => bail!("Unknown option for prune: {other}"),
                }
                i += 1;
            }
            Ok(Command::Prune {
                config,
                today,
                policy,
            })
        }
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command: {other}\n\nRun `shutdown-exclusions help` for usage."),
    }
}

fn flag_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.as_str()),
        None => bail!("Missing value for {flag}"),
    }
}

pub fn print_help() {
    println!("shutdown-exclusions - maintain the auto-shutdown exclusion dataset\n");
    println!("USAGE:");
    println!("  shutdown-exclusions sync   Fetch exclusion requests and merge them into the dataset");
    println!("  shutdown-exclusions prune  Remove entries whose end date has passed");
    println!();
    println!("OPTIONS:");
    println!("  -c, --config <path>   Config file (default: ./shutdown-exclusions.toml)");
    println!("  --today <YYYY-MM-DD>  prune: reference date (default: today)");
    println!("  --lenient-dates       prune: keep entries with unreadable end dates instead of failing");
    println!();
    println!("ENVIRONMENT:");
    println!("  GH_TOKEN    GitHub token used for API requests");
    println!("  GITHUB_ENV  prune appends JSON_FILE_EXISTS=<bool> to this file");
    println!("  RUST_LOG    log filter (default: info)");
}
