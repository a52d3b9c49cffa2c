//! repo-dump CLI
//!
//! Dump a repository into a single text file, restore it, or list a dump.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use repo_dump::dump::DEFAULT_OUTPUT_FILE;
use repo_dump::restore::DEFAULT_RESTORE_DIR;
use repo_dump::{dump_repo, restore_repo, Decoder, DumpOptions, RestoreOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "repo-dump")]
#[command(version)]
#[command(about = "Dump a repository's structure and contents to a single text file, or restore it")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump repository structure and content to a text file
    Dump {
        /// Path to the repository directory to dump
        repo: PathBuf,

        /// Output text file path
        #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// Glob to include even if .gitignore excludes it (repeatable)
        #[arg(short = 'i', long = "include", value_name = "GLOB")]
        include: Vec<String>,

        /// Glob to always exclude (repeatable)
        #[arg(short = 'e', long = "exclude", value_name = "GLOB")]
        exclude: Vec<String>,
    },

    /// Restore a repository from a text dump file
    Restore {
        /// Input text dump file path
        input: PathBuf,

        /// Destination directory to restore the repository into
        #[arg(short = 'd', long, default_value = DEFAULT_RESTORE_DIR)]
        dest: PathBuf,

        /// Replace an existing destination without asking
        #[arg(short = 'y', long)]
        yes: bool,

        /// Create empty files for binary placeholders
        #[arg(long)]
        touch_binary: bool,
    },

    /// List the files contained in a dump
    List {
        /// Input text dump file path
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Dump { repo, output, include, exclude } => {
            let options = DumpOptions {
                repo,
                output,
                include,
                exclude,
            };
            let report = dump_repo(&options)
                .with_context(|| format!("Failed to dump {}", options.repo.display()))?;
            println!(
                "Dumped {} text and {} binary files to {} ({} warnings)",
                report.text_files,
                report.binary_files,
                options.output.display(),
                report.diagnostics.len()
            );
        }
        Commands::Restore { input, dest, yes, touch_binary } => {
            let options = RestoreOptions {
                input,
                dest,
                touch_binary_placeholders: touch_binary,
            };
            let report = restore_repo(&options, |dest| confirm_overwrite(dest, yes))
                .with_context(|| format!("Failed to restore {}", options.input.display()))?;
            println!(
                "Restored {} files into {} ({} binary skipped, {} failed, {} warnings)",
                report.written,
                options.dest.display(),
                report.binary_placeholders,
                report.failed,
                report.diagnostics.len()
            );
        }
        Commands::List { input } => {
            list_dump(&input, cli.verbose > 0)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn confirm_overwrite(dest: &Path, yes: bool) -> repo_dump::Result<bool> {
    if yes {
        return Ok(true);
    }
    use dialoguer::Confirm;
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Destination '{}' exists. Remove it and restore into a fresh directory?",
            dest.display()
        ))
        .default(false)
        .interact()
        .map_err(|e| repo_dump::Error::io(dest, std::io::Error::other(e)))?;
    Ok(confirmed)
}

fn list_dump(input: &Path, verbose: bool) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;

    let (entries, _diagnostics) = Decoder::new().list(&text);
    for entry in &entries {
        if verbose {
            let kind = if entry.is_binary { "binary" } else { "text" };
            println!("{}  {}  {}", entry.path, kind, entry.size);
        } else {
            println!("{}", entry.path);
        }
    }

    Ok(())
}
