use clap::{ArgGroup, Subcommand};
use timerbuddies_core::duration::{custom_duration, format_duration, QUICK_PICKS};
use timerbuddies_core::{Config, TimerBuddies};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::{open_app, print_json, print_json_line, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a countdown, printing the latest snapshot as a JSON line on each change.
    ///
    /// While running, type `start`, `pause`, `reset`, `back` or `quit` on stdin.
    #[command(group(ArgGroup::new("duration").required(true).args(["seconds", "minutes", "preset"])))]
    Run {
        /// Duration in seconds
        #[arg(long)]
        seconds: Option<u64>,
        /// Duration in minutes
        #[arg(long)]
        minutes: Option<u64>,
        /// Use a saved preset's duration and image
        #[arg(long)]
        preset: Option<String>,
        /// Reward image reference (ignored with --preset)
        #[arg(long)]
        image: Option<String>,
        /// Configure without starting the countdown
        #[arg(long)]
        paused: bool,
    },
    /// List the suggested durations
    QuickPicks,
    /// Format a duration for display
    Format {
        seconds: u64,
    },
    /// Validate a custom minutes/seconds entry and print the total seconds
    Custom {
        minutes: u32,
        seconds: u32,
    },
}

pub async fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Run {
            seconds,
            minutes,
            preset,
            image,
            paused,
        } => {
            let app = open_app()?;
            let engine = app.engine();
            match (seconds, minutes, preset) {
                (Some(seconds), _, _) => {
                    engine.configure(seconds, image)?;
                }
                (_, Some(minutes), _) => {
                    engine.configure_minutes(minutes, image)?;
                }
                (_, _, Some(id)) => {
                    app.select_preset(&id)?;
                }
                _ => return Err("one of --seconds, --minutes or --preset is required".into()),
            }
            if !paused {
                engine.start();
            }
            drive(&app).await?;
        }
        TimerAction::QuickPicks => {
            let config = Config::load_or_default();
            let picks: Vec<_> = config
                .timer
                .quick_picks
                .iter()
                .map(|&seconds| {
                    let label = QUICK_PICKS
                        .iter()
                        .find(|p| p.seconds == seconds)
                        .map(|p| p.label.to_string())
                        .unwrap_or_else(|| format_duration(seconds));
                    serde_json::json!({ "seconds": seconds, "label": label })
                })
                .collect();
            print_json(&picks)?;
        }
        TimerAction::Format { seconds } => {
            println!("{}", format_duration(seconds));
        }
        TimerAction::Custom { minutes, seconds } => {
            println!("{}", custom_duration(minutes, seconds)?);
        }
    }
    Ok(())
}

/// Print the latest snapshot on each change until completion, `back`/`quit`, or Ctrl-C.
///
/// A slow reader may skip intermediate snapshots; the final one is always printed.
async fn drive(app: &TimerBuddies) -> CliResult {
    let engine = app.engine();
    let mut snapshots = engine.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    print_json_line(&*snapshots.borrow_and_update())?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                print_json_line(&snap)?;
                if snap.is_complete() || !snap.is_configured() {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(cmd) => match cmd.trim() {
                        "start" | "s" => { engine.start(); }
                        "pause" | "p" => { engine.pause(); }
                        "reset" | "r" => { engine.reset(); }
                        "back" | "b" => { engine.back_to_selection(); }
                        "quit" | "q" => break,
                        "" => {}
                        other => warn!(command = other, "unknown command"),
                    },
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    engine.shutdown();
    Ok(())
}
