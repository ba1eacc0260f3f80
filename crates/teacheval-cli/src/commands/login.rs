//! The `teacheval login` command.

use anyhow::Result;

use super::Context;

pub fn execute(ctx: &Context, username: &str, password: &str) -> Result<()> {
    let mut store = ctx.open_store();
    let session = store.login(username, password)?;

    let user = &session.current_user;
    print!("Logged in as {} ({}, {})", user.display_name, user.username, user.role);
    match session.token.expires_at() {
        Some(at) => println!("; session expires {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!(),
    }

    Ok(())
}
