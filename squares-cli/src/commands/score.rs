use clap::Subcommand;
use squares_core::{Result, ScoreFeed, DEFAULT_TEAM1, DEFAULT_TEAM2};

#[derive(Subcommand)]
pub enum ScoreCommands {
    /// Fetch the live score for a matchup
    Fetch {
        /// Row team name
        #[arg(long, default_value = DEFAULT_TEAM1)]
        team1: String,
        /// Column team name
        #[arg(long, default_value = DEFAULT_TEAM2)]
        team2: String,
    },
}

pub async fn handle_score_command(cmd: ScoreCommands) -> Result<()> {
    match cmd {
        ScoreCommands::Fetch { team1, team2 } => {
            let feed = ScoreFeed::new();

            match feed.fetch_score(&team1, &team2).await? {
                Some(score) => {
                    println!("{} {} - {} {}", team1, score.team1, team2, score.team2);
                    match score.quarter {
                        0 => println!("Not started"),
                        5 => println!("Final"),
                        q => println!(
                            "Q{} {} {}",
                            q,
                            score.time_remaining,
                            if score.is_live { "(live)" } else { "" }
                        ),
                    }
                }
                None => {
                    println!("No game found for {} vs {}", team1, team2);
                }
            }
        }
    }

    Ok(())
}
