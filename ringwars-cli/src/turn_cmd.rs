//! Turn command - answer one step of the file-exchange protocol

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ringwars_core::{play_turn, AgentKind, AgentSession};

#[derive(Args)]
pub struct TurnArgs {
    /// Step number; the state is read from <dir>/<step>.txt
    pub step: u32,

    /// Agent working directory
    pub dir: PathBuf,

    /// Troops granted this turn
    pub new_soldiers: u32,

    /// Agent to play
    #[arg(long, default_value = "StrategicAgent")]
    pub agent: AgentKind,
}

/// A failed read or decision still writes an empty move file
pub fn run(args: TurnArgs) -> Result<()> {
    let mut session = AgentSession::new(args.dir.display().to_string(), u64::from(args.step));
    let orders = play_turn(args.agent, &args.dir, args.step, args.new_soldiers, &mut session)
        .with_context(|| format!("Failed to write move file in {}", args.dir.display()))?;
    tracing::info!("{} step {}: {} orders", args.agent, args.step, orders.len());
    Ok(())
}
