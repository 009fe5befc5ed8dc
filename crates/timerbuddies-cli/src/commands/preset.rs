use clap::Subcommand;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List presets, newest first
    List,
    /// Save a new preset
    Save {
        /// Preset name
        name: String,
        /// Duration in seconds
        #[arg(long)]
        seconds: u64,
        /// Reward image reference
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a preset
    Delete {
        /// Preset ID
        id: String,
    },
}

pub fn run(action: PresetAction) -> CliResult {
    let app = open_app()?;
    let presets = app.presets();

    match action {
        PresetAction::List => {
            print_json(&presets.list())?;
        }
        PresetAction::Save { name, seconds, image } => {
            let preset = presets.save(&name, seconds, image)?;
            print_json(&preset)?;
        }
        PresetAction::Delete { id } => {
            if presets.delete(&id)? {
                println!("deleted {id}");
            } else {
                eprintln!("no preset with id {id}");
            }
        }
    }
    Ok(())
}
