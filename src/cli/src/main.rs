//! CLI for ghspec.
//!
//! Writes, verifies and applies declarative specifications for GitHub
//! repositories, and prints, writes, verifies and fixes their licenses.

use chrono::{Datelike, Local, Utc};
use clap::{Parser, Subcommand};
use ghspec::config::{load_settings, Settings};
use ghspec::definition::{load_definitions, DefinitionSet};
use ghspec::runner::{parse_yes_no, prompt_text};
use ghspec::summary::pluralize;
use ghspec::{
    AlwaysConfirm, Confirm, LicenseListing, LicenseMode, RunSummary, Runner, RunnerConfig,
    RunnerError,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ghspec - Write, verify and apply declarative specifications for GitHub repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file [default: ghspec.toml].
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub token for API calls.
    #[arg(
        long,
        global = true,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        visible_alias = "github-token"
    )]
    token: Option<String>,

    /// GitHub organization whose repositories are processed.
    #[arg(long, global = true)]
    organization: Option<String>,

    /// GitHub user whose repositories are processed.
    #[arg(long, global = true)]
    user: Option<String>,

    /// Copyright holder used in licenses that require one.
    #[arg(long, global = true)]
    author: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the rate limit for the authenticated user.
    RateLimit,

    /// Create a specification from the current state of the repositories.
    Create {
        /// File to which the specification is written.
        output: PathBuf,

        /// Repositories to describe. All repositories when omitted.
        repositories: Vec<String>,
    },

    /// Verify repositories against a specification.
    Verify {
        /// Repository specification file.
        spec: PathBuf,

        /// Repositories to verify. All repositories when omitted.
        repositories: Vec<String>,
    },

    /// Open pull requests that make repositories match a specification.
    Apply {
        /// Repository specification file.
        spec: PathBuf,

        /// Repositories to fix. All repositories when omitted.
        repositories: Vec<String>,

        /// Fix without asking for confirmation.
        #[arg(long)]
        no_prompt: bool,
    },

    /// Print, write, verify and fix licenses.
    #[command(subcommand)]
    License(LicenseCommand),
}

#[derive(Subcommand, Debug)]
enum LicenseCommand {
    /// List all available licenses.
    List {
        /// Omit the header row.
        #[arg(long)]
        no_header: bool,

        /// Omit the aliases column.
        #[arg(long)]
        no_aliases: bool,
    },

    /// Print the content of a license.
    Print {
        /// License id or alias.
        license: String,
    },

    /// Write the content of a license to a file.
    Write {
        /// License id or alias.
        license: String,

        /// File to which the license is written.
        #[arg(long, default_value = "LICENSE")]
        output: PathBuf,
    },

    /// Verify the license files of repositories.
    Verify {
        /// Repositories to verify. All repositories when omitted.
        repositories: Vec<String>,
    },

    /// Open pull requests replacing incorrect license files.
    Fix {
        /// Repositories to fix. All repositories when omitted.
        repositories: Vec<String>,

        /// Fix without asking for confirmation.
        #[arg(long)]
        no_prompt: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(Some(summary)) if summary.has_failures() => ExitCode::from(1),
        Ok(_) => ExitCode::from(0),
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with a compact format, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Reads answers from standard input.
struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&mut self, question: &str, out: &mut (dyn Write + Send)) -> io::Result<bool> {
        out.write_all(prompt_text(question).as_bytes())?;
        out.flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(parse_yes_no(&answer))
    }
}

fn confirmation(no_prompt: bool) -> Box<dyn Confirm> {
    if no_prompt {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(StdinPrompt)
    }
}

/// Loads settings and applies command-line overrides.
fn settings(args: &Args) -> Result<Settings, RunnerError> {
    let mut settings = load_settings(args.config.as_deref())?;
    settings.override_scope(args.organization.clone(), args.user.clone());
    if let Some(author) = &args.author {
        settings.author = Some(author.clone());
    }
    Ok(settings)
}

/// Main execution logic. Returns the summary of commands that produce one.
async fn run(args: Args) -> Result<Option<RunSummary>, RunnerError> {
    let settings = settings(&args)?;
    let config = RunnerConfig::from_settings(&settings, args.token.clone());
    let mut out = io::stdout();

    match args.command {
        Command::RateLimit => {
            let runner = Runner::new(config)?;
            let info = runner.rate_limit().await?;
            println!("Remaining requests: {}/{}", info.remaining, info.limit);
            if let Some(reset) = info.reset_at() {
                println!(
                    "Rate limit resets:  {} (in {} minutes)",
                    reset
                        .with_timezone(&Local)
                        .format("%H:%M:%S %Z %a %b %-d %Y"),
                    info.minutes_until_reset(Utc::now())
                );
            }
            Ok(None)
        }
        Command::Create {
            output,
            repositories,
        } => {
            let runner = Runner::new(config.with_scope(settings.scope()?))?;
            runner
                .create_spec(&repositories, &output, &mut out)
                .await?;
            Ok(None)
        }
        Command::Verify { spec, repositories } => {
            let definitions = read_definitions(&spec)?;
            let runner = Runner::new(config.with_scope(settings.scope()?))?;
            let summary = runner.verify(&definitions, &repositories, &mut out).await?;
            print_verify_summary(&summary);
            Ok(Some(summary))
        }
        Command::Apply {
            spec,
            repositories,
            no_prompt,
        } => {
            let definitions = read_definitions(&spec)?;
            let runner = Runner::new(config.with_scope(settings.scope()?))?;
            let mut confirm = confirmation(no_prompt);
            let summary = runner
                .apply(&definitions, &repositories, confirm.as_mut(), &mut out)
                .await?;
            print_apply_summary(&summary);
            Ok(Some(summary))
        }
        Command::License(command) => run_license(command, &settings, config, &mut out).await,
    }
}

async fn run_license(
    command: LicenseCommand,
    settings: &Settings,
    config: RunnerConfig,
    out: &mut (dyn Write + Send),
) -> Result<Option<RunSummary>, RunnerError> {
    let year = Local::now().year();

    match command {
        LicenseCommand::List {
            no_header,
            no_aliases,
        } => {
            let runner = Runner::new(config)?;
            let listings = runner.list_licenses().await?;
            print!("{}", license_table(&listings, !no_header, !no_aliases));
            Ok(None)
        }
        LicenseCommand::Print { license } => {
            let runner = Runner::new(config)?;
            print!("{}", runner.render_license(&license, year).await?);
            Ok(None)
        }
        LicenseCommand::Write { license, output } => {
            let runner = Runner::new(config)?;
            let text = runner.render_license(&license, year).await?;
            std::fs::write(&output, text)?;
            Ok(None)
        }
        LicenseCommand::Verify { repositories } => {
            let runner = Runner::new(config.with_scope(settings.scope()?))?;
            let summary = runner
                .check_licenses(LicenseMode::Verify, &repositories, &mut AlwaysConfirm, out)
                .await?;
            print_license_summary(&summary, LicenseMode::Verify);
            Ok(Some(summary))
        }
        LicenseCommand::Fix {
            repositories,
            no_prompt,
        } => {
            let runner = Runner::new(config.with_scope(settings.scope()?))?;
            let mut confirm = confirmation(no_prompt);
            let summary = runner
                .check_licenses(LicenseMode::Fix, &repositories, confirm.as_mut(), out)
                .await?;
            print_license_summary(&summary, LicenseMode::Fix);
            Ok(Some(summary))
        }
    }
}

fn read_definitions(path: &Path) -> Result<DefinitionSet, RunnerError> {
    Ok(DefinitionSet::new(load_definitions(path)?)?)
}

fn repositories(count: usize) -> String {
    pluralize(count, "repository", "repositories")
}

/// `message` followed by one tab-indented line per repository.
fn repo_message<S: AsRef<str>>(message: &str, repos: &[S]) -> String {
    if repos.is_empty() {
        return message.to_string();
    }
    let mut text = format!("{message}:");
    for repo in repos {
        text.push_str("\n\t");
        text.push_str(repo.as_ref());
    }
    text
}

fn with_reasons(entries: &[(String, String)]) -> Vec<String> {
    entries
        .iter()
        .map(|(repo, reason)| format!("{repo}: {reason}"))
        .collect()
}

fn print_verify_summary(summary: &RunSummary) {
    if !summary.ok.is_empty() {
        println!(
            "{}",
            repo_message(&format!("{} OK", repositories(summary.ok.len())), &summary.ok)
        );
    }
    if !summary.unexpected.is_empty() {
        println!(
            "{}",
            repo_message(
                &format!("{} without definitions", repositories(summary.unexpected.len())),
                &summary.unexpected
            )
        );
    }
    if !summary.missing.is_empty() {
        println!(
            "{}",
            repo_message(
                &format!("{} missing", repositories(summary.missing.len())),
                &summary.missing
            )
        );
    }
    if !summary.differing.is_empty() {
        println!(
            "{} differed from definition:",
            repositories(summary.differing.len())
        );
        for (repo, diffs) in &summary.differing {
            println!("\t{repo}");
            for diff in diffs {
                println!("\t{}", diff.replace('\n', "\n\t"));
            }
        }
    }
    if !summary.failed.is_empty() {
        println!(
            "{}",
            repo_message(
                &format!("Failed to verify {}", repositories(summary.failed.len())),
                &with_reasons(&summary.failed)
            )
        );
    }
}

fn print_apply_summary(summary: &RunSummary) {
    if !summary.ok.is_empty() {
        println!(
            "{}",
            repo_message(&format!("{} OK", repositories(summary.ok.len())), &summary.ok)
        );
    }
    if !summary.fixed.is_empty() {
        println!(
            "{}",
            repo_message(
                &format!("{} fixed", repositories(summary.fixed.len())),
                &summary.fixed
            )
        );
    }

    let mut failures = with_reasons(&summary.failed);
    failures.extend(summary.missing.iter().map(|repo| {
        format!("{repo}: repository not present (creating repositories not implemented)")
    }));
    failures.sort_by_key(|line| line.to_lowercase());
    if !failures.is_empty() {
        println!(
            "{}",
            repo_message(
                &format!("Failed to fix {}", repositories(failures.len())),
                &failures
            )
        );
    }
}

fn print_license_summary(summary: &RunSummary, mode: LicenseMode) {
    if mode == LicenseMode::Verify {
        let incorrect: Vec<&str> = summary.differing.iter().map(|(r, _)| r.as_str()).collect();
        let undetermined: Vec<&str> = summary.undetermined.iter().map(|(r, _)| r.as_str()).collect();
        println!(
            "{}",
            repo_message(
                &format!("{} had correct license files", repositories(summary.ok.len())),
                &summary.ok
            )
        );
        println!(
            "{}",
            repo_message(
                &format!("{} had incorrect license files", repositories(incorrect.len())),
                &incorrect
            )
        );
        println!(
            "{}",
            repo_message(
                &format!(
                    "Unable to determine license type for {}",
                    repositories(undetermined.len())
                ),
                &undetermined
            )
        );
    } else {
        println!(
            "Examined {} and opened {}.",
            repositories(summary.examined()),
            pluralize(summary.prs_opened, "pull request", "pull requests")
        );
        if !summary.skipped.is_empty() {
            println!(
                "{}",
                repo_message(
                    &format!("Skipped {}", repositories(summary.skipped.len())),
                    &with_reasons(&summary.skipped)
                )
            );
        }
    }
    if !summary.failed.is_empty() {
        println!(
            "{}",
            repo_message(
                &format!("Failed to process {}", repositories(summary.failed.len())),
                &with_reasons(&summary.failed)
            )
        );
    }
}

/// Formats license ids as a table padded to aligned columns.
///
/// Without header and aliases, ids are printed one per line.
fn license_table(listings: &[LicenseListing], header: bool, aliases: bool) -> String {
    if !header && !aliases {
        return listings.iter().map(|l| format!("{}\n", l.id)).collect();
    }

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(listings.len() + 1);
    if header {
        let mut titles = vec!["ID".to_string()];
        if aliases {
            titles.push("ALIASES".to_string());
        }
        rows.push(titles);
    }
    for listing in listings {
        let mut row = vec![listing.id.clone()];
        if aliases && !listing.aliases.is_empty() {
            row.push(listing.aliases.join(", "));
        }
        rows.push(row);
    }

    let mut widths: Vec<usize> = Vec::new();
    for row in &rows {
        for (column, cell) in row.iter().enumerate() {
            match widths.get_mut(column) {
                Some(width) => *width = (*width).max(cell.len()),
                None => widths.push(cell.len()),
            }
        }
    }

    let mut table = String::new();
    for row in &rows {
        for (cell, width) in row.iter().zip(&widths) {
            table.push_str(&format!("{cell:<pad$}", pad = width + 4));
        }
        table.push('\n');
    }
    table
}
