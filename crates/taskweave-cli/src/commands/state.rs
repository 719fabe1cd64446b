use clap::Subcommand;

use crate::context::{CliResult, Context};

#[derive(Subcommand)]
pub enum StateAction {
    /// List every task -> event link
    List {
        /// Print as a JSON object
        #[arg(long)]
        json: bool,
    },
    /// Show the event linked to a task
    Get {
        /// Task ID
        task_id: String,
    },
    /// Forget the link of a task so the flows treat it as unlinked
    Unlink {
        /// Task ID
        task_id: String,
    },
}

pub fn run(ctx: &Context, action: StateAction) -> CliResult {
    let mut state = ctx.load_state();
    match action {
        StateAction::List { json } => {
            if json {
                let map: serde_json::Map<String, serde_json::Value> = state
                    .entries()
                    .map(|(task, event)| (task.to_string(), event.into()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else if state.is_empty() {
                println!("no links");
            } else {
                for (task, event) in state.entries() {
                    println!("{task} -> {event}");
                }
            }
        }
        StateAction::Get { task_id } => match state.get(&task_id) {
            Some(event) => println!("{event}"),
            None => return Err(format!("no link for task {task_id}").into()),
        },
        StateAction::Unlink { task_id } => match state.remove(&task_id)? {
            Some(event) => println!("unlinked {task_id} (was {event})"),
            None => println!("no link for task {task_id}"),
        },
    }
    Ok(())
}
