use crate::numbers::NumberAssignment;
use serde::{Deserialize, Serialize};

/// Digit pairs used by the reduced grid. Each grid line covers two
/// consecutive digits.
pub const DIGIT_PAIRS: [[u8; 2]; 5] = [[0, 1], [2, 3], [4, 5], [6, 7], [8, 9]];

/// Board geometry. The standard grid maps one digit per line; the
/// reduced grid groups digits into the five canonical pairs so 25
/// squares still cover every score combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSize {
    #[default]
    #[serde(rename = "10x10")]
    Standard,
    #[serde(rename = "5x5")]
    Reduced,
}

impl GridSize {
    pub fn width(&self) -> usize {
        match self {
            GridSize::Standard => 10,
            GridSize::Reduced => 5,
        }
    }

    pub fn total_squares(&self) -> usize {
        self.width() * self.width()
    }

    pub fn uses_digit_pairs(&self) -> bool {
        matches!(self, GridSize::Reduced)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GridSize::Standard => "10x10",
            GridSize::Reduced => "5x5",
        }
    }
}

/// Digit-to-grid-line table, built once per assignment.
///
/// Positions in the flattened permutation resolve to lines directly on
/// the standard grid and by halving on the reduced grid (two digits per
/// line).
#[derive(Debug, Clone)]
pub struct DigitLookup {
    width: usize,
    row_line: [usize; 10],
    col_line: [usize; 10],
}

impl DigitLookup {
    /// Returns `None` when the assignment is not a full digit
    /// permutation, in which case no winning square can be resolved.
    pub fn build(grid: GridSize, numbers: &NumberAssignment) -> Option<Self> {
        Some(Self {
            width: grid.width(),
            row_line: line_table(grid, &numbers.row_numbers)?,
            col_line: line_table(grid, &numbers.col_numbers)?,
        })
    }

    /// Square index for a pair of winning digits: row line follows the
    /// first team, column line the second.
    pub fn winning_index(&self, row_digit: u8, col_digit: u8) -> usize {
        self.row_line[row_digit as usize] * self.width + self.col_line[col_digit as usize]
    }
}

fn line_table(grid: GridSize, digits: &[u8]) -> Option<[usize; 10]> {
    if digits.len() != 10 {
        return None;
    }

    let mut table = [usize::MAX; 10];
    for (position, &digit) in digits.iter().enumerate() {
        let line = if grid.uses_digit_pairs() {
            position / 2
        } else {
            position
        };
        *table.get_mut(digit as usize)? = line;
    }

    // Every digit 0-9 must appear exactly once.
    if table.contains(&usize::MAX) {
        return None;
    }
    Some(table)
}
