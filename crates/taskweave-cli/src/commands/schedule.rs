use chrono::Local;

use crate::context::{CliResult, Context};

pub fn run(ctx: &Context, dry_run: bool) -> CliResult {
    let mut engine = ctx.engine()?;
    let lists = engine.resolve_lists()?;
    let now = Local::now().naive_local();

    if !dry_run {
        let report = engine.schedule(&lists, now)?;
        println!("{report}");
        return Ok(());
    }

    let plan = engine.plan_schedule(&lists, now)?;
    if plan.placements.is_empty() && plan.unplaced.is_empty() {
        println!("nothing to schedule");
    }
    for placement in &plan.placements {
        println!(
            "{} - {}  {} ({} min)",
            placement.slot.start.format("%Y-%m-%d %H:%M"),
            placement.slot.end.format("%H:%M"),
            placement.task.title,
            placement.duration_minutes
        );
    }
    for task in &plan.unplaced {
        println!("no slot              {}", task.title);
    }
    Ok(())
}
