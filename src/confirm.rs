//! Confirmation of destructive operations.
//!
//! The cleaner asks a [`Confirmation`] provider before deleting anything.
//! The CLI binds it to an interactive prompt; tests and `--yes` use a fixed
//! answer.

use colored::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Decides whether a destructive run over `root` may proceed.
pub trait Confirmation {
    /// Presents the warning for `root` and returns true only on an explicit
    /// affirmative answer.
    fn confirm(&mut self, root: &Path) -> bool;
}

/// Returns true for the answers accepted as "yes".
///
/// ```
/// use dataset_tidy::confirm::is_affirmative;
///
/// assert!(is_affirmative("s"));
/// assert!(is_affirmative(" Sim\n"));
/// assert!(!is_affirmative(""));
/// assert!(!is_affirmative("n"));
/// ```
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    )
}

/// Interactive prompt reading one line of input.
pub struct PromptConfirmation<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirmation<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, root: &Path) -> io::Result<String> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", "⚠ ATENÇÃO! ⚠".yellow().bold())?;
        writeln!(
            self.output,
            "Isso deletará permanentemente imagens, labels e caches dentro de:"
        )?;
        writeln!(self.output, "{}", root.display())?;
        write!(
            self.output,
            "Você tem certeza que deseja continuar? (s/N): "
        )?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer)
    }
}

impl PromptConfirmation<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, reading the answer from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirmation for PromptConfirmation<R, W> {
    fn confirm(&mut self, root: &Path) -> bool {
        match self.ask(root) {
            Ok(answer) => is_affirmative(&answer),
            Err(e) => {
                log::warn!("could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Answers every confirmation with the same value.
#[derive(Debug, Default)]
pub struct FixedConfirmation {
    answer: bool,
    asked: Vec<PathBuf>,
}

impl FixedConfirmation {
    pub fn accept() -> Self {
        Self {
            answer: true,
            asked: Vec::new(),
        }
    }

    pub fn decline() -> Self {
        Self::default()
    }

    /// Roots this provider was asked about, in order.
    pub fn asked(&self) -> &[PathBuf] {
        &self.asked
    }
}

impl Confirmation for FixedConfirmation {
    fn confirm(&mut self, root: &Path) -> bool {
        self.asked.push(root.to_path_buf());
        self.answer
    }
}
