use super::CliContext;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use squares_core::{GridSize, Result};

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Buy squares by index
    Buy {
        /// Group id
        id: String,
        /// Square indices
        #[arg(required = true)]
        squares: Vec<usize>,
    },
    /// Render the board
    Grid {
        /// Group id
        id: String,
    },
}

pub async fn handle_board_command(cmd: BoardCommands, ctx: &CliContext) -> Result<()> {
    match cmd {
        BoardCommands::Buy { id, squares } => {
            let wallet = ctx.require_wallet()?;
            let group = ctx.engine.purchase_squares(&id, &squares, wallet).await?;

            let owned = group
                .squares
                .iter()
                .filter(|s| s.owner.as_deref() == Some(wallet))
                .count();

            println!(
                "You own {} square(s) in '{}' ({}/{} filled, status {})",
                owned,
                group.name,
                group.filled_count(),
                group.grid_size.total_squares(),
                group.status
            );
            println!(
                "Total committed: {} {}",
                owned as f64 * group.price_per_square,
                group.currency
            );
        }

        BoardCommands::Grid { id } => {
            let group = ctx.engine.get_group(&id).await?;
            let width = group.grid_size.width();
            let numbers = group.numbers.current.as_ref();

            let col_labels = axis_labels(
                numbers.map(|n| n.col_numbers.as_slice()),
                group.grid_size,
            );
            let row_labels = axis_labels(
                numbers.map(|n| n.row_numbers.as_slice()),
                group.grid_size,
            );

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);

            let mut header = vec![format!("{} \\ {}", group.team1, group.team2)];
            header.extend(col_labels);
            table.set_header(header);

            for row in 0..width {
                let mut cells = vec![row_labels[row].clone()];
                for col in 0..width {
                    let square = &group.squares[row * width + col];
                    cells.push(match &square.owner_display {
                        Some(display) => display.clone(),
                        None => format!("#{}", square.index),
                    });
                }
                table.add_row(cells);
            }

            println!("{}", table);
            if numbers.is_none() {
                println!("Numbers are drawn when the creator locks the group.");
            }
        }
    }

    Ok(())
}

/// Row/column digit labels. Before locking every line is unknown; on the
/// reduced grid each line covers a digit pair.
fn axis_labels(digits: Option<&[u8]>, grid: GridSize) -> Vec<String> {
    match digits {
        Some(digits) if digits.len() == 10 => {
            if grid.uses_digit_pairs() {
                digits
                    .chunks(2)
                    .map(|pair| format!("{}/{}", pair[0], pair[1]))
                    .collect()
            } else {
                digits.iter().map(|d| d.to_string()).collect()
            }
        }
        _ => vec!["?".to_string(); grid.width()],
    }
}
