//! The `teacheval notices` command.

use anyhow::{Context as _, Result};

use teacheval_core::visibility::notices_for_college;

use super::Context;

pub fn execute(ctx: &Context, college: Option<String>) -> Result<()> {
    let mut store = ctx.open_store();

    let college = match college {
        Some(college) => college,
        None => store
            .authenticate()
            .context("pass --college or log in")?
            .current_user
            .college
            .clone(),
    };

    let notices = notices_for_college(store.snapshot(), &college);
    if notices.is_empty() {
        println!("No notices for {college}.");
        return Ok(());
    }

    for notice in notices {
        let date = notice
            .created_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let marker = if notice.is_read { " " } else { "*" };
        println!("{marker} [{date}] {} ({})", notice.title, notice.sender);
        if !notice.content.is_empty() {
            println!("    {}", notice.content);
        }
    }

    Ok(())
}
