use clap::Subcommand;
use timerbuddies_core::prompt::validate_prompt;

use super::CliResult;

#[derive(Subcommand)]
pub enum PromptAction {
    /// Check that a reward-image prompt is kid-friendly
    Check {
        /// Prompt text
        text: String,
    },
}

pub fn run(action: PromptAction) -> CliResult {
    match action {
        PromptAction::Check { text } => {
            let prompt = validate_prompt(&text)?;
            println!("ok: {prompt}");
        }
    }
    Ok(())
}
