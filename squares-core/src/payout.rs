use crate::error::{Result, SquaresError};
use crate::group::Quarter;
use serde::{Deserialize, Serialize};

/// Fixed cut taken by the platform, off the top of the collected pool.
pub const PLATFORM_FEE_PERCENT: f64 = 5.0;

/// Per-quarter prize percentages plus the creator's cut.
///
/// Quarter percentages are relative weights, not shares of 100; the
/// breakdown normalizes them against their own sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutSettings {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub q4: f64,
    pub creator_fee: f64,
}

impl Default for PayoutSettings {
    fn default() -> Self {
        Self {
            q1: 20.0,
            q2: 20.0,
            q3: 20.0,
            q4: 30.0,
            creator_fee: 10.0,
        }
    }
}

impl PayoutSettings {
    pub fn quarter_total(&self) -> f64 {
        self.q1 + self.q2 + self.q3 + self.q4
    }

    /// Reject settings the breakdown cannot be evaluated against. A zero
    /// quarter total would divide by zero at settlement time, so it must
    /// never make it into a stored group.
    pub fn validate(&self) -> Result<()> {
        if self.creator_fee < 0.0 || self.creator_fee > 15.0 {
            return Err(SquaresError::validation(
                "creator fee must be between 0% and 15%",
            ));
        }
        if self.q1 < 0.0 || self.q2 < 0.0 || self.q3 < 0.0 || self.q4 < 0.0 {
            return Err(SquaresError::validation(
                "prize percentages cannot be negative",
            ));
        }
        if self.quarter_total() <= 0.0 {
            return Err(SquaresError::validation(
                "prize distribution cannot be zero",
            ));
        }
        Ok(())
    }
}

/// How a collected pool splits into fees and per-quarter prizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrizeBreakdown {
    pub total: f64,
    pub platform_fee: f64,
    pub creator_fee: f64,
    pub prize_pool: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub q4: f64,
}

impl PrizeBreakdown {
    /// Platform fee comes off the top, the creator fee off the
    /// remainder, and the quarters split what is left in proportion to
    /// their weights. No rounding here; formatting is a display concern.
    pub fn calculate(total_pool: f64, payouts: &PayoutSettings) -> Self {
        let platform_fee = total_pool * PLATFORM_FEE_PERCENT / 100.0;
        let after_platform = total_pool - platform_fee;
        let creator_fee = after_platform * payouts.creator_fee / 100.0;
        let prize_pool = after_platform - creator_fee;
        let quarter_total = payouts.quarter_total();

        Self {
            total: total_pool,
            platform_fee,
            creator_fee,
            prize_pool,
            q1: prize_pool * payouts.q1 / quarter_total,
            q2: prize_pool * payouts.q2 / quarter_total,
            q3: prize_pool * payouts.q3 / quarter_total,
            q4: prize_pool * payouts.q4 / quarter_total,
        }
    }

    pub fn for_quarter(&self, quarter: Quarter) -> f64 {
        match quarter {
            Quarter::Q1 => self.q1,
            Quarter::Q2 => self.q2,
            Quarter::Q3 => self.q3,
            Quarter::Q4 => self.q4,
        }
    }
}
