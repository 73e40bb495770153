//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored
//! messages, the organizing spinner and the per-split summary tables. The core
//! operations return reports; everything the operator sees is printed here.

use crate::cleaner::{ClearReport, RoleClearReport};
use crate::file_organizer::{DatasetOrganizeReport, SplitOrganizeOutcome};
use crate::layout::Role;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a spinner shown while a long-running step executes.
    ///
    /// The spinner draws to stderr and stays hidden when it is not a terminal.
    pub fn create_spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Prints a table of counts per split and role, followed by a total row.
    pub fn summary_table(rows: &[(String, usize, usize)], total_files: usize) {
        Self::header("RESUMO");

        let width = rows
            .iter()
            .map(|(name, _, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(5);

        println!(
            "{:<width$} | {:>7} | {:>7}",
            "Split".bold(),
            "Imagens".bold(),
            "Labels".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 22));
        for (name, images, labels) in rows {
            println!(
                "{:<width$} | {:>7} | {:>7}",
                name,
                images.to_string().green(),
                labels.to_string().green(),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 22));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files, "arquivo", "arquivos"),
            width = width
        );
    }
}

pub(crate) fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Prints the human-readable form of an organize run.
pub fn render_organize_report(report: &DatasetOrganizeReport) {
    let mut rows = Vec::new();

    for entry in &report.splits {
        match &entry.outcome {
            SplitOrganizeOutcome::Missing => {
                OutputFormatter::warning(&format!(
                    "Aviso: Pasta '{}' não encontrada, pulando.",
                    entry.path.display()
                ));
            }
            SplitOrganizeOutcome::Failed { reason } => {
                OutputFormatter::error(&format!(
                    "Erro ao processar '{}': {}",
                    entry.path.display(),
                    reason
                ));
            }
            SplitOrganizeOutcome::Organized(split_report) => {
                OutputFormatter::info(&format!(
                    "Processando pasta: {}",
                    entry.path.display()
                ));
                for failure in &split_report.failures {
                    OutputFormatter::error(&format!(
                        "Erro ao mover {}: {}",
                        failure.path.display(),
                        failure.reason
                    ));
                }
                for name in &split_report.excluded {
                    OutputFormatter::plain(&format!("  - {} ignorado pelos filtros", name));
                }
                OutputFormatter::plain(&format!(
                    "Movidos: {} imagens, {} labels.",
                    split_report.images_moved(),
                    split_report.labels_moved()
                ));
                rows.push((
                    entry.split.to_string(),
                    split_report.images_moved(),
                    split_report.labels_moved(),
                ));
            }
        }
    }

    let images = report.total_moved(Role::Images);
    let labels = report.total_moved(Role::Labels);
    OutputFormatter::summary_table(&rows, images + labels);

    let failures = report.failure_count();
    if failures > 0 {
        OutputFormatter::warning(&format!(
            "{} {} não puderam ser movidos. Verifique os erros acima.",
            failures,
            plural(failures, "arquivo", "arquivos")
        ));
    }
    OutputFormatter::success("Estrutura do dataset organizada!");
}

fn render_role(report: &RoleClearReport, role: Role, simulate: bool) {
    OutputFormatter::plain(&format!("Limpando {}...", report.directory.display()));
    if report.missing {
        OutputFormatter::warning(&format!(
            "Aviso: Diretório '{}' não encontrado, pulando.",
            report.directory.display()
        ));
    }
    for name in &report.matched {
        OutputFormatter::plain(&format!("  - Deletando {}", name));
    }
    for failure in &report.failures {
        OutputFormatter::error(&format!(
            "Erro ao deletar {}: {}",
            failure.path.display(),
            failure.reason
        ));
    }
    let noun = match role {
        Role::Images => "imagens",
        Role::Labels => "labels",
    };
    let verb = if simulate { "seriam deletados" } else { "deletados" };
    OutputFormatter::plain(&format!("{} {} {}.", report.count(), noun, verb));
}

/// Prints the human-readable form of a completed clear run.
pub fn render_clear_report(report: &ClearReport) {
    let mut rows = Vec::new();

    for split in &report.splits {
        OutputFormatter::header(&format!("--- Limpando '{}' ---", split.split));
        for role in Role::ALL {
            render_role(split.role(role), role, report.simulate);
        }
        rows.push((
            split.split.to_string(),
            split.images.count(),
            split.labels.count(),
        ));
    }

    OutputFormatter::header(&format!(
        "--- Procurando por caches em '{}' ---",
        report.caches.root.display()
    ));
    if report.caches.matched.is_empty() {
        OutputFormatter::plain("Nenhum arquivo de cache encontrado.");
    }
    for path in &report.caches.matched {
        OutputFormatter::plain(&format!("  - Deletando cache: {}", path.display()));
    }
    for failure in &report.caches.failures {
        OutputFormatter::error(&format!(
            "Erro ao deletar {}: {}",
            failure.path.display(),
            failure.reason
        ));
    }

    let total = report.total();
    OutputFormatter::summary_table(&rows, total);
    OutputFormatter::plain(&format!("Caches: {}", report.caches.count()));

    let failures = report.failure_count();
    if failures > 0 {
        OutputFormatter::warning(&format!(
            "{} {} não puderam ser deletados.",
            failures,
            plural(failures, "arquivo", "arquivos")
        ));
    }

    OutputFormatter::plain(&"=".repeat(30));
    if report.simulate {
        OutputFormatter::success(&format!(
            "DRY RUN concluído. {} {} teriam sido deletados.",
            total,
            plural(total, "arquivo", "arquivos")
        ));
    } else {
        OutputFormatter::success(&format!(
            "Limpeza concluída. {} {} foram deletados.",
            total,
            plural(total, "arquivo", "arquivos")
        ));
    }
}
