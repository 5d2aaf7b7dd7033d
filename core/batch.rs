//! Runs the configured command(s) over a candidate list, one document at a
//! time, in candidate order.
//!
//! Per-item problems never abort the batch. Each document ends up
//! succeeded, failed or skipped, and the counts are the only aggregate
//! signal.

use log;
use serde::Serialize;
use thiserror::Error;

/// Separators accepted between commands in a command list.
pub const COMMAND_SEPARATORS: [char; 2] = [';', '\n'];

/// Expected outcomes that stop work on one document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Not applicable to this document, e.g. not a text file.
    #[error("skipped: {0}")]
    Skipped(String),

    #[error("{0}")]
    Failed(String),
}

/// Host-side document operations the batch needs.
pub trait DocumentHost {
    type Document;

    fn display_name(&self, document: &Self::Document) -> String;

    fn is_open(&self, document: &Self::Document) -> bool;

    fn open(&mut self, document: &Self::Document) -> Result<(), ExecutionError>;

    fn activate(&mut self, document: &Self::Document) -> Result<(), ExecutionError>;

    fn execute(&mut self, document: &Self::Document, command: &str)
    -> Result<(), ExecutionError>;

    fn save(&mut self, document: &Self::Document) -> Result<(), ExecutionError>;

    fn close(&mut self, document: &Self::Document, save: bool) -> Result<(), ExecutionError>;
}

/// Receives progress while a batch runs. Indices are 1-based.
pub trait ProgressSink {
    fn begin(&mut self, _total: usize) {}

    fn item(&mut self, index: usize, total: usize, name: &str);

    fn command_failed(&mut self, _name: &str, _command: &str, _error: &ExecutionError) {}

    fn finish(&mut self, _summary: &BatchSummary) {}
}

/// Writes progress through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn begin(&mut self, total: usize) {
        log::info!("Processing {} file(s)...", total);
    }

    fn item(&mut self, index: usize, total: usize, name: &str) {
        log::info!("[{}/{}] {}", index, total, name);
    }

    fn command_failed(&mut self, name: &str, command: &str, error: &ExecutionError) {
        log::warn!("'{}' failed on {}: {}", command, name, error);
    }

    fn finish(&mut self, summary: &BatchSummary) {
        log::info!(
            "Finished: {} succeeded, {} failed, {} skipped.",
            summary.succeeded,
            summary.failed,
            summary.skipped
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded,
    Failed { errors: Vec<String> },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub name: String,
    /// Whether the document was already open before the batch touched it.
    pub was_open: bool,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub items: Vec<ItemReport>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    fn record(&mut self, report: ItemReport) {
        match report.outcome {
            ItemOutcome::Succeeded => self.succeeded += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.items.push(report);
    }
}

/// Splits a configured command into its individual commands.
pub fn parse_commands(command: &str) -> Vec<String> {
    command
        .split(COMMAND_SEPARATORS)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRunner {
    commands: Vec<String>,
}

impl BatchRunner {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    pub fn from_command_list(command: &str) -> Self {
        Self::new(parse_commands(command))
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn run<H: DocumentHost>(
        &self,
        host: &mut H,
        candidates: &[H::Document],
        progress: &mut dyn ProgressSink,
    ) -> BatchSummary {
        let total = candidates.len();
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        if self.commands.is_empty() {
            log::warn!("No command configured; documents will only be opened and saved.");
        }

        progress.begin(total);
        for (i, document) in candidates.iter().enumerate() {
            let name = host.display_name(document);
            progress.item(i + 1, total, &name);
            let report = self.run_one(host, document, name, progress);
            log::debug!("{} -> {:?}", report.name, report.outcome);
            summary.record(report);
        }
        progress.finish(&summary);
        summary
    }

    fn run_one<H: DocumentHost>(
        &self,
        host: &mut H,
        document: &H::Document,
        name: String,
        progress: &mut dyn ProgressSink,
    ) -> ItemReport {
        let was_open = host.is_open(document);
        let report = |outcome| ItemReport {
            name: name.clone(),
            was_open,
            outcome,
        };

        if !was_open {
            match host.open(document) {
                Ok(()) => {}
                Err(ExecutionError::Skipped(reason)) => {
                    return report(ItemOutcome::Skipped { reason });
                }
                Err(e) => {
                    return report(ItemOutcome::Failed {
                        errors: vec![e.to_string()],
                    });
                }
            }
        }

        let mut errors = Vec::new();
        let mut skipped = Vec::new();
        match host.activate(document) {
            Ok(()) => {
                for command in &self.commands {
                    match host.execute(document, command) {
                        Ok(()) => {}
                        Err(ExecutionError::Skipped(reason)) => {
                            log::debug!("'{}' not applicable to {}: {}", command, name, reason);
                            skipped.push(reason);
                        }
                        Err(e) => {
                            progress.command_failed(&name, command, &e);
                            errors.push(format!("{}: {}", command, e));
                        }
                    }
                }
            }
            Err(e) => errors.push(format!("activate: {}", e)),
        }

        let finished = if was_open {
            host.save(document)
        } else {
            host.close(document, true)
        };
        if let Err(e) = finished {
            errors.push(format!("save: {}", e));
        }

        if !errors.is_empty() {
            report(ItemOutcome::Failed { errors })
        } else if !self.commands.is_empty() && skipped.len() == self.commands.len() {
            report(ItemOutcome::Skipped {
                reason: skipped.join("; "),
            })
        } else {
            report(ItemOutcome::Succeeded)
        }
    }
}
