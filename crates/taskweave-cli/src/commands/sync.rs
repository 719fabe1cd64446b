use chrono::Local;
use clap::Subcommand;

use crate::context::{CliResult, Context};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Mirror upcoming calendar events into the inbox list
    Calendar,
    /// Move inbox tasks into the list the analyzer picks
    Inbox,
}

pub fn run(ctx: &Context, action: SyncAction) -> CliResult {
    let mut engine = ctx.engine()?;
    let lists = engine.resolve_lists()?;
    let report = match action {
        SyncAction::Calendar => engine.sync_calendar(&lists, Local::now().naive_local())?,
        SyncAction::Inbox => engine.organize_inbox(&lists)?,
    };
    println!("{report}");
    Ok(())
}
