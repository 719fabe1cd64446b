use taskweave_core::ListRole;

use crate::context::{CliResult, Context};

fn describe(role: ListRole) -> &'static str {
    match role {
        ListRole::Inbox { schedulable: true } => "inbox (schedulable)",
        ListRole::Inbox { schedulable: false } => "inbox",
        ListRole::Target => "target",
        ListRole::Unmanaged => "unmanaged",
    }
}

pub fn run(ctx: &Context) -> CliResult {
    let engine = ctx.engine()?;
    let resolved = engine.resolve_lists()?;
    if resolved.inbox().is_none() {
        eprintln!(
            "warning: no list named {:?}",
            engine.config().lists.inbox_name
        );
    }
    for (list, role) in &resolved.lists {
        println!("{:<20} {}  [{}]", describe(*role), list.title, list.id);
    }
    Ok(())
}
