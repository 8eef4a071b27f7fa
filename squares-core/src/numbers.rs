use crate::grid::{GridSize, DIGIT_PAIRS};
use crate::group::Quarter;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One draw of row and column digits for a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberAssignment {
    pub row_numbers: Vec<u8>,
    pub col_numbers: Vec<u8>,
    pub assigned_at: DateTime<Utc>,
}

impl NumberAssignment {
    /// Draw fresh digits for both axes, independently and uniformly.
    pub fn generate(grid: GridSize) -> Self {
        Self {
            row_numbers: shuffled_digits(grid),
            col_numbers: shuffled_digits(grid),
            assigned_at: Utc::now(),
        }
    }
}

fn shuffled_digits(grid: GridSize) -> Vec<u8> {
    let mut rng = rand::thread_rng();

    if grid.uses_digit_pairs() {
        // Permute the five pairs, keeping each pair intact, then flatten
        // back to a 10-digit sequence.
        let mut pairs = DIGIT_PAIRS;
        pairs.shuffle(&mut rng);
        pairs.iter().flatten().copied().collect()
    } else {
        let mut digits: Vec<u8> = (0..10).collect();
        digits.shuffle(&mut rng);
        digits
    }
}

/// Assignment slots per scoring period. All empty until the pool locks;
/// from then on `current` always mirrors one of the quarter slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterNumbers {
    pub current: Option<NumberAssignment>,
    pub q1: Option<NumberAssignment>,
    pub q2: Option<NumberAssignment>,
    pub q3: Option<NumberAssignment>,
    pub q4: Option<NumberAssignment>,
}

impl QuarterNumbers {
    pub fn for_quarter(&self, quarter: Quarter) -> Option<&NumberAssignment> {
        match quarter {
            Quarter::Q1 => self.q1.as_ref(),
            Quarter::Q2 => self.q2.as_ref(),
            Quarter::Q3 => self.q3.as_ref(),
            Quarter::Q4 => self.q4.as_ref(),
        }
    }

    pub fn assigned(&self) -> bool {
        self.current.is_some()
    }
}
