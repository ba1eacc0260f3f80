//! The `teacheval scope` command.

use anyhow::{Context as _, Result};
use comfy_table::Table;

use teacheval_core::model::Role;
use teacheval_core::scope::{supervisor_courses, supervisor_teachers};
use teacheval_core::EntityId;

use super::Context;

pub fn execute(ctx: &Context, supervisor: &str) -> Result<()> {
    let mut store = ctx.open_store();
    let id = EntityId::new(supervisor);
    store
        .authenticate()
        .context("not logged in; run `teacheval login`")?;
    store.require_supervisor_view(&id)?;

    let snap = store.snapshot();

    match snap.user(&id) {
        Some(u) if u.role == Role::Supervisor => {}
        Some(u) => anyhow::bail!("user {id} is a {}, not a supervisor", u.role),
        None => anyhow::bail!("user {id} not found"),
    }

    let teachers = supervisor_teachers(snap, &id);
    let courses = supervisor_courses(snap, &id);

    if teachers.is_empty() {
        println!("No teachers in scope.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Id", "Teacher", "College"]);
        for t in &teachers {
            table.add_row(vec![t.id.to_string(), t.display_name.clone(), t.college.clone()]);
        }
        println!("Teachers:\n{table}");
    }

    if courses.is_empty() {
        println!("No courses in scope.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Id", "Course", "Teacher", "College", "Semester"]);
        for c in &courses {
            table.add_row(vec![
                c.id.to_string(),
                c.name.clone(),
                c.teacher_name.clone(),
                c.college.clone(),
                c.semester.clone(),
            ]);
        }
        println!("Courses:\n{table}");
    }

    Ok(())
}
