use clap::Subcommand;
use taskweave_core::ConfigError;

use crate::context::{CliResult, Context};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the whole configuration
    Show,
    /// Get a config value
    Get {
        /// Dotted key (e.g. "schedule.work_start_hour", "lists.inbox_name")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file location
    Path,
}

pub fn run(ctx: &Context, action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let config = ctx.load_config()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = ctx.load_config()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = ctx.load_config()?;
            config.set(&key, &value)?;
            config.save_to(&ctx.config_path())?;
            println!("ok");
        }
        ConfigAction::Path => println!("{}", ctx.config_path().display()),
    }
    Ok(())
}
