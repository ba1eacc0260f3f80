//! The `teacheval init` command.

use anyhow::Result;

use teacheval_core::persistence::{FileAdapter, PersistenceAdapter, StorageKey};

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let data_dir = &ctx.settings.data_dir;

    // Hydration writes migrated users back, so check before opening the store.
    if FileAdapter::new(data_dir).get(StorageKey::Users.as_str())?.is_some() {
        println!("{} already initialized, skipping.", data_dir.display());
        return Ok(());
    }

    let mut store = ctx.open_store();
    store.persist_all();
    let root = store.adapter().root();
    if store.adapter().get(StorageKey::Users.as_str())?.is_none() {
        anyhow::bail!("could not write to data directory {}", root.display());
    }

    let snap = store.snapshot();
    println!("Initialized {}", root.display());
    println!(
        "  {} users, {} colleges, {} courses, {} evaluations, {} observations, {} notices",
        snap.users.len(),
        snap.colleges.len(),
        snap.courses.len(),
        snap.evaluations.len(),
        snap.observations.len(),
        snap.notices.len()
    );

    println!("\nNext steps:");
    println!("  1. Run: teacheval login --username supervisor1 --password <password>");
    println!("  2. Run: teacheval summary");

    Ok(())
}
