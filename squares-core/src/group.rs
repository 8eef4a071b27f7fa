use crate::error::{Result, SquaresError};
use crate::grid::{DigitLookup, GridSize};
use crate::numbers::{NumberAssignment, QuarterNumbers};
use crate::payout::{PayoutSettings, PrizeBreakdown};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default matchup when the creator does not name the teams.
pub const DEFAULT_TEAM1: &str = "Kansas City Chiefs";
pub const DEFAULT_TEAM2: &str = "Philadelphia Eagles";

const INVITE_CODE_LEN: usize = 6;
const INVITE_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Sol,
    Usdc,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Sol => write!(f, "SOL"),
            Currency::Usdc => write!(f, "USDC"),
        }
    }
}

/// How often fresh numbers are drawn over the course of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberRandomization {
    Fixed,
    PerHalf,
    PerQuarter,
}

/// Pool lifecycle label, always derived from the underlying facts (fill
/// count, lock timestamp, recorded results). Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Open,
    Full,
    Locked,
    Live,
    Completed,
}

impl GroupStatus {
    /// `full` is a display hint; saturation itself stops assignments.
    /// Only an explicit lock (and everything after) closes the board.
    pub fn accepts_purchases(&self) -> bool {
        matches!(self, GroupStatus::Open | GroupStatus::Full)
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GroupStatus::Open => "open",
            GroupStatus::Full => "full",
            GroupStatus::Locked => "locked",
            GroupStatus::Live => "live",
            GroupStatus::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}

/// A scoring period. Serialized as its number, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Quarter {
    Q1 = 1,
    Q2 = 2,
    Q3 = 3,
    Q4 = 4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn next(&self) -> Option<Quarter> {
        match self {
            Quarter::Q1 => Some(Quarter::Q2),
            Quarter::Q2 => Some(Quarter::Q3),
            Quarter::Q3 => Some(Quarter::Q4),
            Quarter::Q4 => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Quarter::Q4)
    }
}

impl From<Quarter> for u8 {
    fn from(quarter: Quarter) -> u8 {
        quarter as u8
    }
}

impl TryFrom<u8> for Quarter {
    type Error = SquaresError;

    fn try_from(value: u8) -> Result<Quarter> {
        match value {
            1 => Ok(Quarter::Q1),
            2 => Ok(Quarter::Q2),
            3 => Ok(Quarter::Q3),
            4 => Ok(Quarter::Q4),
            other => Err(SquaresError::InvalidQuarter(other)),
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// One grid cell. An owner, once set, is never cleared or reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub index: usize,
    pub owner: Option<String>,
    pub owner_display: Option<String>,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl Square {
    fn empty(index: usize) -> Self {
        Self {
            index,
            owner: None,
            owner_display: None,
            purchased_at: None,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

/// Settled score for one quarter. The winning index stays populated even
/// when the square is unowned; only the wallet is absent then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterResult {
    pub quarter: Quarter,
    pub team1_score: u32,
    pub team2_score: u32,
    pub team1_digit: u8,
    pub team2_digit: u8,
    pub winning_square_index: Option<usize>,
    pub winner_wallet: Option<String>,
    pub prize_amount: f64,
    pub paid_out: bool,
    pub paid_out_at: Option<DateTime<Utc>>,
    pub tx_signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupInput {
    pub name: String,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub price_per_square: f64,
    pub currency: Currency,
    pub visibility: Visibility,
    pub payouts: PayoutSettings,
    pub number_randomization: NumberRandomization,
    pub grid_size: GridSize,
    pub creator_name: Option<String>,
}

/// One pool: grid, pricing, participants, number draws, and results.
///
/// Every mutation funnels through the methods here; the engine persists
/// the whole record after each one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub team1: String,
    pub team2: String,
    pub price_per_square: f64,
    pub currency: Currency,
    pub visibility: Visibility,
    pub invite_code: Option<String>,
    pub payouts: PayoutSettings,
    pub number_randomization: NumberRandomization,
    pub grid_size: GridSize,
    pub creator: String,
    pub creator_name: String,
    pub creator_display: String,
    pub created_at: DateTime<Utc>,
    pub squares: Vec<Square>,
    pub numbers: QuarterNumbers,
    pub quarter_results: Vec<QuarterResult>,
    pub status: GroupStatus,
    pub locked_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn new(input: CreateGroupInput, creator: &str) -> Result<Self> {
        if input.name.trim().is_empty() {
            return Err(SquaresError::validation("group name cannot be empty"));
        }
        if input.price_per_square <= 0.0 {
            return Err(SquaresError::validation(
                "price per square must be positive",
            ));
        }
        input.payouts.validate()?;

        let invite_code = match input.visibility {
            Visibility::Private => Some(generate_invite_code()),
            Visibility::Public => None,
        };
        let squares = (0..input.grid_size.total_squares())
            .map(Square::empty)
            .collect();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            team1: input.team1.unwrap_or_else(|| DEFAULT_TEAM1.to_string()),
            team2: input.team2.unwrap_or_else(|| DEFAULT_TEAM2.to_string()),
            price_per_square: input.price_per_square,
            currency: input.currency,
            visibility: input.visibility,
            invite_code,
            payouts: input.payouts,
            number_randomization: input.number_randomization,
            grid_size: input.grid_size,
            creator: creator.to_string(),
            creator_name: input
                .creator_name
                .unwrap_or_else(|| "Anonymous".to_string()),
            creator_display: shorten_wallet(creator, 4),
            created_at: Utc::now(),
            squares,
            numbers: QuarterNumbers::default(),
            quarter_results: Vec::new(),
            status: GroupStatus::Open,
            locked_at: None,
        })
    }

    /// Best-effort batch purchase: each in-range, unowned index gets the
    /// buyer; owned or out-of-range indices are skipped silently. The
    /// batch is not transactional: each index is an independent
    /// first-write-wins assignment. Returns how many squares were newly
    /// taken.
    pub fn purchase(&mut self, indices: &[usize], buyer: &str, now: DateTime<Utc>) -> usize {
        let display = shorten_wallet(buyer, 4);
        let mut assigned = 0;

        for &index in indices {
            if let Some(square) = self.squares.get_mut(index) {
                if square.owner.is_none() {
                    square.owner = Some(buyer.to_string());
                    square.owner_display = Some(display.clone());
                    square.purchased_at = Some(now);
                    assigned += 1;
                }
            }
        }

        self.refresh_status();
        assigned
    }

    /// Draw numbers for every quarter slot according to the
    /// randomization mode and stamp the lock time. Calling this on a
    /// locked group re-rolls everything; the engine keeps that behind an
    /// explicit relock operation.
    pub fn assign_numbers(&mut self, now: DateTime<Utc>) {
        let grid = self.grid_size;
        let first = NumberAssignment::generate(grid);

        self.numbers = match self.number_randomization {
            NumberRandomization::Fixed => QuarterNumbers {
                current: Some(first.clone()),
                q1: Some(first.clone()),
                q2: Some(first.clone()),
                q3: Some(first.clone()),
                q4: Some(first),
            },
            NumberRandomization::PerHalf => {
                let second_half = NumberAssignment::generate(grid);
                QuarterNumbers {
                    current: Some(first.clone()),
                    q1: Some(first.clone()),
                    q2: Some(first),
                    q3: Some(second_half.clone()),
                    q4: Some(second_half),
                }
            }
            NumberRandomization::PerQuarter => QuarterNumbers {
                current: Some(first.clone()),
                q1: Some(first),
                q2: Some(NumberAssignment::generate(grid)),
                q3: Some(NumberAssignment::generate(grid)),
                q4: Some(NumberAssignment::generate(grid)),
            },
        };

        self.locked_at = Some(now);
        self.refresh_status();
    }

    /// Settle one quarter: resolve the winning square from the score
    /// digits and this quarter's numbers, price the prize from the
    /// currently collected pool, and upsert the result (re-recording a
    /// quarter overwrites it). Fails without effect when this quarter's
    /// numbers were never drawn.
    pub fn record_result(
        &mut self,
        quarter: Quarter,
        team1_score: u32,
        team2_score: u32,
    ) -> Result<QuarterResult> {
        let numbers = self
            .numbers
            .for_quarter(quarter)
            .ok_or(SquaresError::NumbersNotAssigned {
                quarter: quarter.number(),
            })?;

        let team1_digit = (team1_score % 10) as u8;
        let team2_digit = (team2_score % 10) as u8;

        // Rows follow team1, columns team2.
        let winning_square_index = DigitLookup::build(self.grid_size, numbers)
            .map(|lookup| lookup.winning_index(team1_digit, team2_digit));
        let winner_wallet = winning_square_index
            .and_then(|index| self.squares.get(index))
            .and_then(|square| square.owner.clone());

        let prize_amount = self.prize_breakdown().for_quarter(quarter);

        let result = QuarterResult {
            quarter,
            team1_score,
            team2_score,
            team1_digit,
            team2_digit,
            winning_square_index,
            winner_wallet,
            prize_amount,
            paid_out: false,
            paid_out_at: None,
            tx_signature: None,
        };

        match self
            .quarter_results
            .iter_mut()
            .find(|r| r.quarter == quarter)
        {
            Some(existing) => *existing = result.clone(),
            None => self.quarter_results.push(result.clone()),
        }

        // Pre-reveal the next period's numbers once this one settles.
        if self.number_randomization != NumberRandomization::Fixed {
            if let Some(next) = quarter.next() {
                let next_numbers = self.numbers.for_quarter(next).cloned();
                self.numbers.current = next_numbers;
            }
        }

        self.refresh_status();
        Ok(result)
    }

    /// Stamp a quarter's prize as paid. Returns `false` (and mutates
    /// nothing) when the quarter has no recorded result yet.
    pub fn mark_paid_out(
        &mut self,
        quarter: Quarter,
        tx_signature: &str,
        now: DateTime<Utc>,
    ) -> bool {
        match self
            .quarter_results
            .iter_mut()
            .find(|r| r.quarter == quarter)
        {
            Some(result) => {
                result.paid_out = true;
                result.paid_out_at = Some(now);
                result.tx_signature = Some(tx_signature.to_string());
                true
            }
            None => false,
        }
    }

    pub fn filled_count(&self) -> usize {
        self.squares.iter().filter(|s| s.is_owned()).count()
    }

    pub fn is_full(&self) -> bool {
        self.filled_count() == self.grid_size.total_squares()
    }

    pub fn is_locked(&self) -> bool {
        self.locked_at.is_some()
    }

    /// Collected pool over the squares actually sold.
    pub fn total_pool(&self) -> f64 {
        self.filled_count() as f64 * self.price_per_square
    }

    pub fn prize_breakdown(&self) -> PrizeBreakdown {
        PrizeBreakdown::calculate(self.total_pool(), &self.payouts)
    }

    pub fn quarter_result(&self, quarter: Quarter) -> Option<&QuarterResult> {
        self.quarter_results.iter().find(|r| r.quarter == quarter)
    }

    /// Admin operations are creator-only by contract; collaborators call
    /// this before invoking them.
    pub fn is_creator(&self, wallet: &str) -> bool {
        self.creator == wallet
    }

    /// Recompute the lifecycle label from the facts. A final-quarter
    /// result wins over everything, so `completed` is sticky even if an
    /// earlier quarter gets corrected afterwards.
    pub fn derived_status(&self) -> GroupStatus {
        if self.quarter_result(Quarter::Q4).is_some() {
            GroupStatus::Completed
        } else if !self.quarter_results.is_empty() {
            GroupStatus::Live
        } else if self.locked_at.is_some() {
            GroupStatus::Locked
        } else if self.is_full() {
            GroupStatus::Full
        } else {
            GroupStatus::Open
        }
    }

    pub(crate) fn refresh_status(&mut self) {
        self.status = self.derived_status();
    }
}

/// Shortened wallet form for display, e.g. `6yKH...kDvq`.
pub fn shorten_wallet(wallet: &str, chars: usize) -> String {
    if wallet.len() <= chars * 2 {
        wallet.to_string()
    } else {
        format!("{}...{}", &wallet[..chars], &wallet[wallet.len() - chars..])
    }
}

/// Six uppercase characters, matched case-insensitively at lookup.
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_CHARS[rng.gen_range(0..INVITE_CODE_CHARS.len())] as char)
        .collect()
}
