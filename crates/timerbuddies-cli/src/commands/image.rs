use clap::Subcommand;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum ImageAction {
    /// List saved images, most recent first
    List,
    /// Save an image reference
    Add {
        /// Image URL or URI
        image: String,
    },
    /// Remove an image reference
    Remove {
        /// Image URL or URI
        image: String,
    },
}

pub fn run(action: ImageAction) -> CliResult {
    let app = open_app()?;
    let images = app.images();

    match action {
        ImageAction::List => {
            print_json(&images.list())?;
        }
        ImageAction::Add { image } => {
            if images.add(&image)? {
                println!("saved");
            } else {
                println!("already saved");
            }
        }
        ImageAction::Remove { image } => {
            if images.remove(&image)? {
                println!("removed");
            } else {
                eprintln!("not saved: {image}");
            }
        }
    }
    Ok(())
}
