//! The `teacheval summary` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use teacheval_core::aggregate::summarize_for_supervisor;
use teacheval_core::session::Capability;
use teacheval_core::EntityId;
use teacheval_report::markdown;
use teacheval_report::SummaryReport;

use super::{ranking_table, Context, Format};

pub fn execute(
    ctx: &Context,
    supervisor: Option<String>,
    format: Option<Format>,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = ctx.format(format)?;
    let mut store = ctx.open_store();

    store
        .authenticate()
        .context("not logged in; run `teacheval login`")?;

    let supervisor_id = match supervisor {
        Some(id) => {
            let id = EntityId::new(id);
            store.require_supervisor_view(&id)?;
            id
        }
        None => {
            store
                .require(Capability::Supervise)
                .context("summary without --supervisor needs a supervisor session")?
                .id
        }
    };

    let entries = summarize_for_supervisor(store.snapshot(), &supervisor_id);
    tracing::info!(supervisor_id = %supervisor_id, teachers = entries.len(), "summary computed");

    let report = SummaryReport::new(supervisor_id, entries, &store.snapshot().config);
    let rendered = match format {
        Format::Json => report.to_json()?,
        Format::Markdown => markdown::ranking_table(&report.entries),
        Format::Text if report.entries.is_empty() => "No scored records in scope.".to_string(),
        Format::Text => ranking_table(&report.entries).to_string(),
    };

    match output {
        Some(path) if format == Format::Json => {
            report.save_json(&path)?;
            println!("Report written to {}", path.display());
        }
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
