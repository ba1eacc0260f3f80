//! The `teacheval whoami` command.

use anyhow::{Context as _, Result};

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store();
    let session = store
        .authenticate()
        .context("not logged in; run `teacheval login`")?;

    let user = &session.current_user;
    println!("{} ({})", user.display_name, user.username);
    println!("  id:      {}", user.id);
    println!("  role:    {}", user.role);
    if !user.college.is_empty() {
        println!("  college: {}", user.college);
    }
    if let Some(at) = session.token.expires_at() {
        println!("  expires: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}
