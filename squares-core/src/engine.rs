use crate::error::{Result, SquaresError};
use crate::group::{generate_invite_code, CreateGroupInput, Group, Quarter};
use crate::store::GroupStore;
use chrono::Utc;
use std::sync::Arc;

/// Orchestrates pool state transitions against an injected store.
///
/// Every operation is a full read of the record, an in-memory mutation
/// through the aggregate, and a whole-record write-back; the returned
/// snapshot is the persisted state.
///
/// Admin operations (`lock_group`, `relock_group`,
/// `record_quarter_result`, `mark_paid_out`, `delete_group`) are
/// creator-only by contract: callers check `Group::is_creator` before
/// invoking them. The engine does not verify identities itself.
pub struct GroupEngine {
    store: Arc<dyn GroupStore>,
}

impl GroupEngine {
    pub fn new(store: Arc<dyn GroupStore>) -> Self {
        Self { store }
    }

    pub async fn create_group(&self, input: CreateGroupInput, creator: &str) -> Result<Group> {
        let mut group = Group::new(input, creator)?;

        // Invite codes must be unique among stored groups.
        while let Some(code) = &group.invite_code {
            if self.store.find_by_invite_code(code).await?.is_none() {
                break;
            }
            group.invite_code = Some(generate_invite_code());
        }

        self.store.put(&group).await?;

        tracing::info!("Created group '{}' ({})", group.name, group.id);
        Ok(group)
    }

    pub async fn get_group(&self, id: &str) -> Result<Group> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| SquaresError::GroupNotFound { id: id.to_string() })
    }

    pub async fn find_by_invite_code(&self, code: &str) -> Result<Group> {
        self.store
            .find_by_invite_code(code)
            .await?
            .ok_or_else(|| SquaresError::InviteCodeNotFound {
                code: code.to_uppercase(),
            })
    }

    pub async fn list_public(&self) -> Result<Vec<Group>> {
        self.store.list_public_active().await
    }

    /// Assign the requested squares to the buyer, best-effort per index
    /// (owned and out-of-range indices are skipped, not errors). Once
    /// the board is locked no purchase gets through, whatever the fill
    /// count.
    pub async fn purchase_squares(
        &self,
        id: &str,
        indices: &[usize],
        buyer: &str,
    ) -> Result<Group> {
        let mut group = self.get_group(id).await?;

        if !group.status.accepts_purchases() {
            return Err(SquaresError::PurchasesClosed {
                id: group.id,
                status: group.status,
            });
        }

        let assigned = group.purchase(indices, buyer, Utc::now());
        self.store.put(&group).await?;

        tracing::info!(
            "Buyer {} took {} square(s) in group {} ({}/{} filled)",
            buyer,
            assigned,
            group.id,
            group.filled_count(),
            group.grid_size.total_squares()
        );
        Ok(group)
    }

    /// Draw numbers per the group's randomization mode and close the
    /// board. Locking twice is refused; re-rolling is `relock_group`.
    pub async fn lock_group(&self, id: &str) -> Result<Group> {
        let mut group = self.get_group(id).await?;

        if group.is_locked() {
            return Err(SquaresError::AlreadyLocked { id: group.id });
        }

        group.assign_numbers(Utc::now());
        self.store.put(&group).await?;

        tracing::info!("Locked group {} with {:?} numbers", group.id, group.number_randomization);
        Ok(group)
    }

    /// Re-roll the numbers of an already-locked pool. A separate
    /// operation from `lock_group` on purpose: re-rolling after squares
    /// were sold changes what buyers signed up for, so callers must opt
    /// in explicitly (the CLI additionally prompts for confirmation).
    pub async fn relock_group(&self, id: &str) -> Result<Group> {
        let mut group = self.get_group(id).await?;

        group.assign_numbers(Utc::now());
        self.store.put(&group).await?;

        tracing::warn!("Re-rolled numbers for group {}", group.id);
        Ok(group)
    }

    /// Settle a quarter from its final score. Refused without effect
    /// when that quarter's numbers were never drawn; otherwise an
    /// upsert, so a corrected score simply replaces the entry.
    pub async fn record_quarter_result(
        &self,
        id: &str,
        quarter: Quarter,
        team1_score: u32,
        team2_score: u32,
    ) -> Result<Group> {
        let mut group = self.get_group(id).await?;

        let result = group.record_result(quarter, team1_score, team2_score)?;
        self.store.put(&group).await?;

        tracing::info!(
            "Recorded {} for group {}: {}-{}, square {:?}, prize {}",
            quarter,
            group.id,
            team1_score,
            team2_score,
            result.winning_square_index,
            result.prize_amount
        );
        Ok(group)
    }

    /// Stamp a settled quarter as paid. A missing result is a warned
    /// no-op, not an error; nothing is written in that case.
    pub async fn mark_paid_out(
        &self,
        id: &str,
        quarter: Quarter,
        tx_reference: &str,
    ) -> Result<Group> {
        let mut group = self.get_group(id).await?;

        if group.mark_paid_out(quarter, tx_reference, Utc::now()) {
            self.store.put(&group).await?;
            tracing::info!("Marked {} paid out for group {} ({})", quarter, group.id, tx_reference);
        } else {
            tracing::warn!("No {} result to mark paid out for group {}", quarter, group.id);
        }

        Ok(group)
    }

    /// Remove the record entirely. Returns whether anything existed.
    /// Irreversible.
    pub async fn delete_group(&self, id: &str) -> Result<bool> {
        let removed = self.store.remove(id).await?;

        if removed {
            tracing::info!("Deleted group {}", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;
    use crate::group::{Currency, GroupStatus, NumberRandomization, Visibility};
    use crate::payout::PayoutSettings;
    use crate::store::MemoryStore;

    fn engine() -> GroupEngine {
        GroupEngine::new(Arc::new(MemoryStore::new()))
    }

    fn sample_input(grid_size: GridSize, randomization: NumberRandomization) -> CreateGroupInput {
        CreateGroupInput {
            name: "Sunday pool".to_string(),
            team1: None,
            team2: None,
            price_per_square: 0.5,
            currency: Currency::Sol,
            visibility: Visibility::Public,
            payouts: PayoutSettings::default(),
            number_randomization: randomization,
            grid_size,
            creator_name: None,
        }
    }

    const CREATOR: &str = "CreatorWalletAddress1111";
    const BUYER: &str = "BuyerWalletAddress000001";

    #[tokio::test]
    async fn test_create_persists_and_validates() {
        let engine = engine();

        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();
        assert_eq!(engine.get_group(&group.id).await.unwrap(), group);

        let mut bad = sample_input(GridSize::Standard, NumberRandomization::Fixed);
        bad.payouts.q1 = -1.0;
        assert!(matches!(
            engine.create_group(bad, CREATOR).await,
            Err(SquaresError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_group_signals_not_found() {
        let engine = engine();

        assert!(matches!(
            engine.get_group("nope").await,
            Err(SquaresError::GroupNotFound { .. })
        ));
        assert!(matches!(
            engine.purchase_squares("nope", &[0], BUYER).await,
            Err(SquaresError::GroupNotFound { .. })
        ));
        assert!(matches!(
            engine.lock_group("nope").await,
            Err(SquaresError::GroupNotFound { .. })
        ));
        assert!(!engine.delete_group("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_purchase_rejected_after_lock() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();

        engine.purchase_squares(&group.id, &[0, 1], BUYER).await.unwrap();
        engine.lock_group(&group.id).await.unwrap();

        let err = engine
            .purchase_squares(&group.id, &[2], BUYER)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SquaresError::PurchasesClosed {
                status: GroupStatus::Locked,
                ..
            }
        ));

        // The stored record is untouched by the rejected purchase.
        let stored = engine.get_group(&group.id).await.unwrap();
        assert_eq!(stored.filled_count(), 2);
    }

    #[tokio::test]
    async fn test_purchase_fills_to_full() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Reduced, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();

        let almost: Vec<usize> = (0..24).collect();
        let snapshot = engine.purchase_squares(&group.id, &almost, BUYER).await.unwrap();
        assert_eq!(snapshot.status, GroupStatus::Open);

        let snapshot = engine.purchase_squares(&group.id, &[24], BUYER).await.unwrap();
        assert_eq!(snapshot.status, GroupStatus::Full);

        // Saturated but not locked: further purchases are accepted and
        // simply find nothing unowned.
        let snapshot = engine
            .purchase_squares(&group.id, &[0, 24], "OtherBuyerWallet00000002")
            .await
            .unwrap();
        assert!(snapshot.squares.iter().all(|s| s.owner.as_deref() == Some(BUYER)));
    }

    #[tokio::test]
    async fn test_lock_fixed_reuses_one_assignment() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();

        let locked = engine.lock_group(&group.id).await.unwrap();

        assert_eq!(locked.status, GroupStatus::Locked);
        assert!(locked.locked_at.is_some());
        let numbers = &locked.numbers;
        assert_eq!(numbers.current, numbers.q1);
        assert_eq!(numbers.q1, numbers.q2);
        assert_eq!(numbers.q2, numbers.q3);
        assert_eq!(numbers.q3, numbers.q4);
    }

    #[tokio::test]
    async fn test_lock_per_half_pairs_assignments() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::PerHalf),
                CREATOR,
            )
            .await
            .unwrap();

        let locked = engine.lock_group(&group.id).await.unwrap();
        let numbers = &locked.numbers;

        assert_eq!(numbers.current, numbers.q1);
        assert_eq!(numbers.q1, numbers.q2);
        assert_eq!(numbers.q3, numbers.q4);
        assert_ne!(numbers.q2, numbers.q3);
    }

    #[tokio::test]
    async fn test_lock_per_quarter_draws_four() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::PerQuarter),
                CREATOR,
            )
            .await
            .unwrap();

        let locked = engine.lock_group(&group.id).await.unwrap();
        let numbers = &locked.numbers;

        assert_eq!(numbers.current, numbers.q1);
        // Independent draws of 10! orderings; collisions would point at
        // a broken shuffle.
        assert_ne!(numbers.q1, numbers.q2);
        assert_ne!(numbers.q2, numbers.q3);
        assert_ne!(numbers.q3, numbers.q4);
    }

    #[tokio::test]
    async fn test_double_lock_refused_but_relock_rerolls() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();

        let locked = engine.lock_group(&group.id).await.unwrap();
        assert!(matches!(
            engine.lock_group(&group.id).await,
            Err(SquaresError::AlreadyLocked { .. })
        ));

        let relocked = engine.relock_group(&group.id).await.unwrap();
        assert_ne!(relocked.numbers.q1, locked.numbers.q1);
        assert_eq!(relocked.status, GroupStatus::Locked);
    }

    #[tokio::test]
    async fn test_record_requires_lock() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();

        let err = engine
            .record_quarter_result(&group.id, Quarter::Q1, 7, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, SquaresError::NumbersNotAssigned { quarter: 1 }));

        // No partial effect reached the store.
        let stored = engine.get_group(&group.id).await.unwrap();
        assert!(stored.quarter_results.is_empty());
        assert_eq!(stored.status, GroupStatus::Open);
    }

    #[tokio::test]
    async fn test_record_settles_quarter_and_prize() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();

        let all: Vec<usize> = (0..100).collect();
        engine.purchase_squares(&group.id, &all, BUYER).await.unwrap();
        let locked = engine.lock_group(&group.id).await.unwrap();

        let snapshot = engine
            .record_quarter_result(&group.id, Quarter::Q1, 17, 23)
            .await
            .unwrap();
        assert_eq!(snapshot.status, GroupStatus::Live);

        let result = snapshot.quarter_result(Quarter::Q1).unwrap();
        assert_eq!(result.team1_digit, 7);
        assert_eq!(result.team2_digit, 3);
        // Full board, so whatever square wins, it is owned.
        assert_eq!(result.winner_wallet.as_deref(), Some(BUYER));

        // 100 squares at 0.5 = 50 collected; default payouts put 20/90
        // of the 42.75 prize pool on Q1.
        let expected = locked.prize_breakdown().q1;
        assert!((result.prize_amount - expected).abs() < 1e-9);
        assert!((expected - 42.75 * 20.0 / 90.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_record_final_quarter_completes() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();
        engine.lock_group(&group.id).await.unwrap();

        let snapshot = engine
            .record_quarter_result(&group.id, Quarter::Q4, 31, 28)
            .await
            .unwrap();
        assert_eq!(snapshot.status, GroupStatus::Completed);

        // Completed pools disappear from the public listing.
        assert!(engine.list_public().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_paid_out_flow() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();
        engine.lock_group(&group.id).await.unwrap();

        // No result yet: returns the snapshot unchanged.
        let snapshot = engine
            .mark_paid_out(&group.id, Quarter::Q1, "sig111")
            .await
            .unwrap();
        assert!(snapshot.quarter_result(Quarter::Q1).is_none());

        engine
            .record_quarter_result(&group.id, Quarter::Q1, 7, 3)
            .await
            .unwrap();
        let snapshot = engine
            .mark_paid_out(&group.id, Quarter::Q1, "sig111")
            .await
            .unwrap();

        let result = snapshot.quarter_result(Quarter::Q1).unwrap();
        assert!(result.paid_out);
        assert_eq!(result.tx_signature.as_deref(), Some("sig111"));
    }

    #[tokio::test]
    async fn test_delete_group() {
        let engine = engine();
        let group = engine
            .create_group(
                sample_input(GridSize::Standard, NumberRandomization::Fixed),
                CREATOR,
            )
            .await
            .unwrap();

        assert!(engine.delete_group(&group.id).await.unwrap());
        assert!(matches!(
            engine.get_group(&group.id).await,
            Err(SquaresError::GroupNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invite_code_flow() {
        let engine = engine();
        let mut input = sample_input(GridSize::Standard, NumberRandomization::Fixed);
        input.visibility = Visibility::Private;
        let group = engine.create_group(input, CREATOR).await.unwrap();

        let code = group.invite_code.clone().unwrap();
        let found = engine.find_by_invite_code(&code.to_lowercase()).await.unwrap();
        assert_eq!(found.id, group.id);

        assert!(matches!(
            engine.find_by_invite_code("ZZZZZZ").await,
            Err(SquaresError::InviteCodeNotFound { .. })
        ));

        // Private pools never show in the public listing.
        assert!(engine.list_public().await.unwrap().is_empty());
    }
}
