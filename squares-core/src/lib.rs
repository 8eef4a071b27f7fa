//! Core engine for football squares pools: group lifecycle, square
//! purchases, number draws, and quarter-by-quarter prize settlement
//! against a pluggable store.
//!
//! The engine is a plain library; wallet connectivity, payment rails,
//! and rendering live in the consuming layer (see `squares-cli`).

pub mod engine;
pub mod error;
pub mod grid;
pub mod group;
pub mod numbers;
pub mod payout;
pub mod scores;
pub mod store;

pub use engine::GroupEngine;
pub use error::{Result, SquaresError};
pub use grid::{DigitLookup, GridSize};
pub use group::{
    generate_invite_code, shorten_wallet, CreateGroupInput, Currency, Group, GroupStatus,
    NumberRandomization, Quarter, QuarterResult, Square, Visibility, DEFAULT_TEAM1, DEFAULT_TEAM2,
};
pub use numbers::{NumberAssignment, QuarterNumbers};
pub use payout::{PayoutSettings, PrizeBreakdown, PLATFORM_FEE_PERCENT};
pub use scores::{GameScore, ScoreFeed};
pub use store::{GroupStore, MemoryStore, SqliteStore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pool_smoke() {
        let engine = GroupEngine::new(Arc::new(MemoryStore::new()));

        let group = engine
            .create_group(
                CreateGroupInput {
                    name: "smoke".to_string(),
                    team1: None,
                    team2: None,
                    price_per_square: 1.0,
                    currency: Currency::Sol,
                    visibility: Visibility::Public,
                    payouts: PayoutSettings::default(),
                    number_randomization: NumberRandomization::Fixed,
                    grid_size: GridSize::Standard,
                    creator_name: None,
                },
                "CreatorWalletAddress1111",
            )
            .await
            .unwrap();

        assert_eq!(group.status, GroupStatus::Open);
        assert_eq!(group.squares.len(), 100);
        assert_eq!(group.team1, DEFAULT_TEAM1);
    }
}
