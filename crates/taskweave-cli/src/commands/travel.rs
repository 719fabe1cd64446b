use taskweave_core::analysis::travel_minutes_or_default;

use crate::context::{CliResult, Context};

pub fn run(ctx: &Context, from: &str, to: &str) -> CliResult {
    let config = ctx.load_config()?;
    let analyzer = ctx.analyzer(&config)?;
    let minutes = travel_minutes_or_default(
        analyzer.as_ref(),
        from,
        to,
        config.analysis.default_travel_minutes,
    );
    println!("{minutes}");
    Ok(())
}
