pub mod admin;
pub mod board;
pub mod group;
pub mod score;

pub use admin::{handle_admin_command, AdminCommands};
pub use board::{handle_board_command, BoardCommands};
pub use group::{handle_group_command, GroupCommands};
pub use score::{handle_score_command, ScoreCommands};

use squares_core::{Group, GroupEngine, Result, SquaresError};

pub struct CliContext {
    pub engine: GroupEngine,
    pub wallet: Option<String>,
}

impl CliContext {
    pub fn require_wallet(&self) -> Result<&str> {
        self.wallet
            .as_deref()
            .ok_or_else(|| SquaresError::validation("this command needs --wallet <address>"))
    }
}

/// Admin operations are creator-only by contract; the engine leaves the
/// identity check to its caller, so every admin handler goes through
/// here first.
pub fn require_creator(group: &Group, wallet: &str) -> Result<()> {
    if group.is_creator(wallet) {
        Ok(())
    } else {
        Err(SquaresError::validation(format!(
            "only the creator ({}) can manage group '{}'",
            group.creator_display, group.name
        )))
    }
}
