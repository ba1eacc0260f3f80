//! The `teacheval can-evaluate` command.

use anyhow::Result;

use teacheval_core::EntityId;

use super::Context;

pub fn execute(ctx: &Context, user: &str) -> Result<()> {
    let store = ctx.open_store();
    let id = EntityId::new(user);

    let allowed = store.can_evaluate(&id);
    match store.snapshot().user(&id) {
        Some(u) => println!(
            "{} ({}, {}) {} evaluate",
            u.display_name,
            u.id,
            u.role,
            if allowed { "can" } else { "cannot" }
        ),
        None => println!("user {id} not found; cannot evaluate"),
    }

    Ok(())
}
