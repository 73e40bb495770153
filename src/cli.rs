//! Command-line interface module for dataset-tidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading
//! - Dispatching to the organizer and cleaner
//! - Rendering reports as text or JSON

use crate::cleaner::{ClearOptions, ClearOutcome, Cleaner};
use crate::config::{DatasetRules, TidyConfig};
use crate::confirm::{Confirmation, PromptConfirmation};
use crate::file_organizer::organize_dataset;
use crate::layout::DatasetRoot;
use crate::output::{OutputFormatter, render_clear_report, render_organize_report};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default dataset root, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "datasets";

#[derive(Debug, Parser)]
#[command(
    name = "dataset-tidy",
    version,
    about = "Organiza e limpa datasets YOLO nas pastas 'images' e 'labels'."
)]
pub struct Cli {
    /// TOML configuration file (default: .datasettidy.toml or ~/.config/dataset-tidy/config.toml).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: DatasetCommand,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum DatasetCommand {
    /// Move loose images and labels of each split into 'images' and 'labels'.
    Organize {
        /// Dataset root containing the split directories.
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        path: PathBuf,
    },
    /// Delete images, labels and cache files from every split.
    Clear {
        /// Dataset root containing the split directories.
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        path: PathBuf,

        /// Simulate the deletion without removing any file.
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// How a report is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// Runs the CLI application with parsed arguments.
///
/// Loads the configuration, then executes the command with an interactive
/// confirmation prompt bound to stdin/stderr, so `--json` output on stdout
/// stays clean.
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let config = TidyConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Erro ao carregar a configuração: {}", e))?;
    let rules = config.compile().map_err(|e| e.to_string())?;

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut prompt = PromptConfirmation::stdio();
    run_command(&cli.command, &rules, &mut prompt, mode)
}

/// Executes one command against the given rules.
///
/// Fatal conditions (invalid dataset root) are returned as an error message.
/// A declined confirmation is a successful no-op.
pub fn run_command(
    command: &DatasetCommand,
    rules: &DatasetRules,
    confirmation: &mut dyn Confirmation,
    mode: OutputMode,
) -> Result<(), String> {
    match command {
        DatasetCommand::Organize { path } => organize(path, rules, mode),
        DatasetCommand::Clear { path, dry_run, yes } => {
            let options = ClearOptions {
                simulate: *dry_run,
                skip_confirmation: *yes,
            };
            clear(path, options, rules, confirmation, mode)
        }
    }
}

fn organize(path: &Path, rules: &DatasetRules, mode: OutputMode) -> Result<(), String> {
    let root = DatasetRoot::open(path).map_err(|e| e.to_string())?;

    let report = if mode == OutputMode::Text {
        let spinner = OutputFormatter::create_spinner(&format!(
            "Organizando {}...",
            root.resolved().display()
        ));
        let report = organize_dataset(&root, rules);
        spinner.finish_and_clear();
        report
    } else {
        organize_dataset(&root, rules)
    };

    match mode {
        OutputMode::Json => print_json(&report),
        OutputMode::Text => {
            render_organize_report(&report);
            Ok(())
        }
    }
}

fn clear(
    path: &Path,
    options: ClearOptions,
    rules: &DatasetRules,
    confirmation: &mut dyn Confirmation,
    mode: OutputMode,
) -> Result<(), String> {
    if options.simulate && mode == OutputMode::Text {
        OutputFormatter::dry_run_notice("MODO DRY RUN ATIVADO (NENHUM ARQUIVO SERÁ DELETADO)");
    }

    let outcome =
        Cleaner::clear_dataset(path, options, rules, confirmation).map_err(|e| e.to_string())?;

    match (mode, &outcome) {
        (OutputMode::Json, _) => print_json(&outcome),
        (OutputMode::Text, ClearOutcome::Cancelled) => {
            OutputFormatter::warning("Operação cancelada.");
            Ok(())
        }
        (OutputMode::Text, ClearOutcome::Completed(report)) => {
            render_clear_report(report);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Falha ao serializar o relatório: {}", e))?;
    println!("{}", json);
    Ok(())
}
