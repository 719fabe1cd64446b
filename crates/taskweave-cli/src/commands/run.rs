use chrono::Local;

use crate::context::{CliResult, Context};

pub fn run(ctx: &Context) -> CliResult {
    let mut engine = ctx.engine()?;
    let reports = engine.run_all(Local::now().naive_local())?;
    for report in reports {
        println!("{report}");
    }
    Ok(())
}
