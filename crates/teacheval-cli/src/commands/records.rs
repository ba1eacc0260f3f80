//! The `teacheval records` command.

use anyhow::{Context as _, Result};

use teacheval_core::aggregate::{summarize_for_college, summarize_for_teacher};
use teacheval_core::session::Capability;
use teacheval_core::EntityId;
use teacheval_report::{markdown, masked_records};

use super::{record_table, Context, Format};

/// College lists need `ViewCollege`. Teachers may list their own records;
/// anyone else needs `ViewCollege`.
pub fn execute(
    ctx: &Context,
    college: Option<String>,
    teacher: Option<String>,
    format: Option<Format>,
) -> Result<()> {
    let format = ctx.format(format)?;
    let mut store = ctx.open_store();

    let profile = store
        .authenticate()
        .context("not logged in; run `teacheval login`")?
        .current_user
        .clone();

    let records = match (college, teacher) {
        (Some(college), _) => {
            store.require(Capability::ViewCollege)?;
            summarize_for_college(store.snapshot(), &college)
        }
        (None, Some(teacher)) => {
            let teacher_id = EntityId::new(teacher);
            if teacher_id != profile.id {
                store.require(Capability::ViewCollege)?;
            }
            summarize_for_teacher(store.snapshot(), &teacher_id)
        }
        (None, None) => anyhow::bail!("pass --college or --teacher"),
    };

    let config = &store.snapshot().config;
    match format {
        Format::Json => {
            let masked = masked_records(&records, config);
            println!("{}", serde_json::to_string_pretty(&masked)?);
        }
        Format::Markdown => print!("{}", markdown::record_list(&records, config)),
        Format::Text if records.is_empty() => println!("No records."),
        Format::Text => println!("{}", record_table(&records, config)),
    }

    Ok(())
}
