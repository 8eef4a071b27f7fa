use super::{require_creator, CliContext};
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use squares_core::{
    CreateGroupInput, Currency, GridSize, Group, NumberRandomization, PayoutSettings, Result,
    SquaresError, Visibility,
};

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a new pool
    Create {
        /// Group name
        name: String,
        /// Price per square
        #[arg(short, long)]
        price: f64,
        /// Currency (sol, usdc)
        #[arg(short, long, default_value = "sol")]
        currency: String,
        /// Grid size (10x10, 5x5)
        #[arg(short, long, default_value = "10x10")]
        grid: String,
        /// Visibility (public, private)
        #[arg(long, default_value = "public")]
        visibility: String,
        /// Number randomization (fixed, per-half, per-quarter)
        #[arg(short, long, default_value = "fixed")]
        randomization: String,
        /// Quarter payout percentages as q1,q2,q3,q4
        #[arg(long, default_value = "20,20,20,30")]
        quarters: String,
        /// Creator fee percentage (0-15)
        #[arg(long, default_value_t = 10.0)]
        creator_fee: f64,
        /// Row team name
        #[arg(long)]
        team1: Option<String>,
        /// Column team name
        #[arg(long)]
        team2: Option<String>,
        /// Display name for the creator
        #[arg(long)]
        creator_name: Option<String>,
    },
    /// List public pools
    List,
    /// Show a pool's settings and prize breakdown
    Info {
        /// Group id
        id: String,
    },
    /// Look up a private pool by invite code
    Join {
        /// Invite code
        code: String,
    },
    /// Delete a pool (creator only)
    Delete {
        /// Group id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn handle_group_command(cmd: GroupCommands, ctx: &CliContext) -> Result<()> {
    match cmd {
        GroupCommands::Create {
            name,
            price,
            currency,
            grid,
            visibility,
            randomization,
            quarters,
            creator_fee,
            team1,
            team2,
            creator_name,
        } => {
            let wallet = ctx.require_wallet()?;
            let (q1, q2, q3, q4) = parse_quarters(&quarters)?;

            let input = CreateGroupInput {
                name,
                team1,
                team2,
                price_per_square: price,
                currency: parse_currency(&currency)?,
                visibility: parse_visibility(&visibility)?,
                payouts: PayoutSettings {
                    q1,
                    q2,
                    q3,
                    q4,
                    creator_fee,
                },
                number_randomization: parse_randomization(&randomization)?,
                grid_size: parse_grid(&grid)?,
                creator_name,
            };

            let group = ctx.engine.create_group(input, wallet).await?;

            println!("Created group '{}'", group.name);
            println!("  Id: {}", group.id);
            println!(
                "  {} squares at {} {} each",
                group.grid_size.total_squares(),
                group.price_per_square,
                group.currency
            );
            if let Some(code) = &group.invite_code {
                println!("  Invite code: {}", code);
                println!("  Share this code; the pool is not listed publicly.");
            }
        }

        GroupCommands::List => {
            let groups = ctx.engine.list_public().await?;

            if groups.is_empty() {
                println!("No open public pools.");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Id", "Name", "Grid", "Price", "Filled", "Status"]);

            for group in groups {
                table.add_row(vec![
                    group.id.clone(),
                    group.name.clone(),
                    group.grid_size.label().to_string(),
                    format!("{} {}", group.price_per_square, group.currency),
                    format!(
                        "{}/{}",
                        group.filled_count(),
                        group.grid_size.total_squares()
                    ),
                    group.status.to_string(),
                ]);
            }

            println!("{}", table);
        }

        GroupCommands::Info { id } => {
            let group = ctx.engine.get_group(&id).await?;
            print_group_info(&group, ctx.wallet.as_deref());
        }

        GroupCommands::Join { code } => {
            let group = ctx.engine.find_by_invite_code(&code).await?;

            println!("Found group '{}'", group.name);
            println!("  Id: {}", group.id);
            println!("  {} vs {}", group.team1, group.team2);
            println!(
                "  {}/{} squares taken at {} {} each",
                group.filled_count(),
                group.grid_size.total_squares(),
                group.price_per_square,
                group.currency
            );
            println!("Buy with: squares board buy {} <indices>", group.id);
        }

        GroupCommands::Delete { id, force } => {
            let wallet = ctx.require_wallet()?;
            let group = ctx.engine.get_group(&id).await?;
            require_creator(&group, wallet)?;

            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Delete group '{}' and all of its records?",
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

            ctx.engine.delete_group(&id).await?;
            println!("Deleted group '{}'.", group.name);
        }
    }

    Ok(())
}

fn print_group_info(group: &Group, wallet: Option<&str>) {
    println!("Group '{}' ({})", group.name, group.id);
    println!("  Teams: {} (rows) vs {} (columns)", group.team1, group.team2);
    println!("  Status: {}", group.status);
    println!("  Visibility: {}", group.visibility);
    println!("  Created by: {} ({})", group.creator_name, group.creator_display);
    println!(
        "  Created: {}",
        group.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  Squares: {}/{} at {} {}",
        group.filled_count(),
        group.grid_size.total_squares(),
        group.price_per_square,
        group.currency
    );

    if let Some(code) = &group.invite_code {
        if wallet.is_some_and(|w| group.is_creator(w)) {
            println!("  Invite code: {}", code);
        }
    }

    let breakdown = group.prize_breakdown();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Pool", "Platform fee", "Creator fee", "Q1", "Q2", "Q3", "Q4"]);
    table.add_row(vec![
        format!("{:.4}", breakdown.total),
        format!("{:.4}", breakdown.platform_fee),
        format!("{:.4}", breakdown.creator_fee),
        format!("{:.4}", breakdown.q1),
        format!("{:.4}", breakdown.q2),
        format!("{:.4}", breakdown.q3),
        format!("{:.4}", breakdown.q4),
    ]);
    println!("{}", table);

    if !group.quarter_results.is_empty() {
        let mut results = Table::new();
        results.load_preset(UTF8_FULL);
        results.set_header(vec!["Quarter", "Score", "Square", "Winner", "Prize", "Paid"]);

        for result in &group.quarter_results {
            results.add_row(vec![
                result.quarter.to_string(),
                format!("{}-{}", result.team1_score, result.team2_score),
                result
                    .winning_square_index
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                result
                    .winner_wallet
                    .clone()
                    .map(|w| squares_core::shorten_wallet(&w, 4))
                    .unwrap_or_else(|| "unclaimed".to_string()),
                format!("{:.4} {}", result.prize_amount, group.currency),
                if result.paid_out { "yes" } else { "no" }.to_string(),
            ]);
        }
        println!("{}", results);
    }
}

fn parse_currency(s: &str) -> Result<Currency> {
    match s.to_lowercase().as_str() {
        "sol" => Ok(Currency::Sol),
        "usdc" => Ok(Currency::Usdc),
        _ => Err(SquaresError::validation(format!(
            "unknown currency '{}' (expected sol or usdc)",
            s
        ))),
    }
}

fn parse_grid(s: &str) -> Result<GridSize> {
    match s {
        "10x10" => Ok(GridSize::Standard),
        "5x5" => Ok(GridSize::Reduced),
        _ => Err(SquaresError::validation(format!(
            "unknown grid size '{}' (expected 10x10 or 5x5)",
            s
        ))),
    }
}

fn parse_visibility(s: &str) -> Result<Visibility> {
    match s.to_lowercase().as_str() {
        "public" => Ok(Visibility::Public),
        "private" => Ok(Visibility::Private),
        _ => Err(SquaresError::validation(format!(
            "unknown visibility '{}' (expected public or private)",
            s
        ))),
    }
}

fn parse_randomization(s: &str) -> Result<NumberRandomization> {
    match s.to_lowercase().as_str() {
        "fixed" => Ok(NumberRandomization::Fixed),
        "per-half" => Ok(NumberRandomization::PerHalf),
        "per-quarter" => Ok(NumberRandomization::PerQuarter),
        _ => Err(SquaresError::validation(format!(
            "unknown randomization '{}' (expected fixed, per-half or per-quarter)",
            s
        ))),
    }
}

fn parse_quarters(s: &str) -> Result<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| {
            SquaresError::validation(format!("could not parse quarter percentages '{}'", s))
        })?;

    if parts.len() != 4 {
        return Err(SquaresError::validation(
            "quarter percentages must be four comma-separated numbers",
        ));
    }
    Ok((parts[0], parts[1], parts[2], parts[3]))
}
