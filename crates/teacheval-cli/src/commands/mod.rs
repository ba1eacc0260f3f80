//! Subcommand implementations and the helpers they share.

pub mod can_evaluate;
pub mod init;
pub mod login;
pub mod logout;
pub mod notices;
pub mod records;
pub mod scope;
pub mod summary;
pub mod whoami;

use anyhow::{bail, Result};
use clap::ValueEnum;
use comfy_table::{Cell, Table};

use teacheval_core::aggregate::TeacherSummary;
use teacheval_core::config::Settings;
use teacheval_core::model::{AssessmentRecord, Config, Scoreable};
use teacheval_core::persistence::FileAdapter;
use teacheval_core::RecordStore;
use teacheval_report::markdown::author_label;

/// Rendering of command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Markdown,
    Json,
}

impl Format {
    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "markdown" | "md" => Ok(Format::Markdown),
            "json" => Ok(Format::Json),
            other => bail!("unknown output format in settings: {other}"),
        }
    }
}

/// State shared by every command.
pub struct Context {
    pub settings: Settings,
}

impl Context {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Hydrate the record store from the data directory.
    pub fn open_store(&self) -> RecordStore<FileAdapter> {
        tracing::debug!(data_dir = %self.settings.data_dir.display(), "opening record store");
        RecordStore::hydrate(FileAdapter::new(&self.settings.data_dir))
    }

    /// The explicit format, else the configured default.
    pub fn format(&self, explicit: Option<Format>) -> Result<Format> {
        match explicit {
            Some(format) => Ok(format),
            None => Format::parse(&self.settings.default_format),
        }
    }
}

pub fn ranking_table(summaries: &[TeacherSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Rank", "Teacher", "Records", "Total", "Average"]);
    for s in summaries {
        table.add_row(vec![
            Cell::new(s.rank),
            Cell::new(&s.teacher_name),
            Cell::new(s.count),
            Cell::new(format!("{:.1}", s.total_score)),
            Cell::new(format!("{:.2}", s.average_score)),
        ]);
    }
    table
}

pub fn record_table(records: &[AssessmentRecord], config: &Config) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Course", "Teacher", "Author", "Total", "Level", "Date"]);
    for record in records {
        let body = record.body();
        table.add_row(vec![
            Cell::new(record.kind()),
            Cell::new(&body.course_name),
            Cell::new(&body.teacher_name),
            Cell::new(author_label(record, config)),
            Cell::new(
                record
                    .total_score()
                    .map(|t| format!("{t:.1}"))
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(
                record
                    .level()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(
                body.created_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }
    table
}
