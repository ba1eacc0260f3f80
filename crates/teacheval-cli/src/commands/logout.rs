//! The `teacheval logout` command.

use anyhow::Result;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store();
    match store.session() {
        Some(session) => println!("Logged out {}", session.current_user.username),
        None => println!("No active session."),
    }
    store.logout();
    Ok(())
}
