use super::{require_creator, CliContext};
use clap::Subcommand;
use dialoguer::Confirm;
use squares_core::{Quarter, Result, SquaresError};

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Lock the pool and draw numbers
    Lock {
        /// Group id
        id: String,
    },
    /// Re-roll the numbers of a locked pool
    Relock {
        /// Group id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Record a quarter's final score
    Record {
        /// Group id
        id: String,
        /// Quarter (1-4)
        quarter: u8,
        /// Row team score
        team1_score: u32,
        /// Column team score
        team2_score: u32,
    },
    /// Mark a quarter's prize as paid out
    Payout {
        /// Group id
        id: String,
        /// Quarter (1-4)
        quarter: u8,
        /// Transaction signature or reference
        #[arg(short, long)]
        tx: String,
    },
}

pub async fn handle_admin_command(cmd: AdminCommands, ctx: &CliContext) -> Result<()> {
    match cmd {
        AdminCommands::Lock { id } => {
            let wallet = ctx.require_wallet()?;
            let group = ctx.engine.get_group(&id).await?;
            require_creator(&group, wallet)?;

            let locked = ctx.engine.lock_group(&id).await?;
            println!("Locked '{}'. Numbers are drawn; sales are closed.", locked.name);
        }

        AdminCommands::Relock { id, force } => {
            let wallet = ctx.require_wallet()?;
            let group = ctx.engine.get_group(&id).await?;
            require_creator(&group, wallet)?;

            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Re-roll the numbers for '{}'? Buyers have already seen the current draw.",
                        group.name
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| SquaresError::internal(e.to_string()))?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            ctx.engine.relock_group(&id).await?;
            println!("Numbers re-rolled for '{}'.", group.name);
        }

        AdminCommands::Record {
            id,
            quarter,
            team1_score,
            team2_score,
        } => {
            let wallet = ctx.require_wallet()?;
            let group = ctx.engine.get_group(&id).await?;
            require_creator(&group, wallet)?;

            let quarter = Quarter::try_from(quarter)?;
            let snapshot = ctx
                .engine
                .record_quarter_result(&id, quarter, team1_score, team2_score)
                .await?;

            let result = snapshot
                .quarter_result(quarter)
                .ok_or_else(|| SquaresError::internal("recorded result missing from snapshot"))?;

            println!(
                "{}: {} {} - {} {}",
                quarter, snapshot.team1, team1_score, snapshot.team2, team2_score
            );
            match (&result.winning_square_index, &result.winner_wallet) {
                (Some(index), Some(winner)) => println!(
                    "Square #{} wins {:.4} {} ({})",
                    index,
                    result.prize_amount,
                    snapshot.currency,
                    squares_core::shorten_wallet(winner, 4)
                ),
                (Some(index), None) => println!(
                    "Square #{} wins {:.4} {}, but nobody owns it",
                    index, result.prize_amount, snapshot.currency
                ),
                _ => println!("No winning square could be resolved"),
            }
            println!("Status: {}", snapshot.status);
        }

        AdminCommands::Payout { id, quarter, tx } => {
            let wallet = ctx.require_wallet()?;
            let group = ctx.engine.get_group(&id).await?;
            require_creator(&group, wallet)?;

            let quarter = Quarter::try_from(quarter)?;
            let snapshot = ctx.engine.mark_paid_out(&id, quarter, &tx).await?;

            match snapshot.quarter_result(quarter) {
                Some(result) if result.paid_out => {
                    println!("Marked {} paid out ({})", quarter, tx);
                }
                _ => println!("No recorded result for {}; nothing marked", quarter),
            }
        }
    }

    Ok(())
}
