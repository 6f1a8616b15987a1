//! Voucher ledger access and milestone math.
//!
//! Each customer has exactly one ledger row tracking lifetime spend, the
//! one-time percentage voucher flags, and the milestone voucher balance.
//! The arithmetic that moves a ledger forward after a checkout lives here
//! as pure functions so the checkout transaction can apply it with an
//! optimistic version check and the tests can cover it without a database.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::voucher_ledger;
use crate::errors::ServiceError;
use crate::services::pricing::{self, VoucherKind};

/// Lifetime spend at which milestone vouchers start accruing.
pub const MILESTONE_SPEND_THRESHOLD: Decimal = dec!(20_000);
/// Spend per milestone voucher past the threshold.
pub const MILESTONE_BLOCK_SIZE: Decimal = dec!(5_000);

/// Total milestone blocks a lifetime spend has ever earned.
///
/// Blocks are cumulative over the whole spend history, which is what makes
/// crediting idempotent: a ledger that already recorded `n` earned blocks
/// only receives blocks beyond `n`.
pub fn milestone_blocks(total_spent: Decimal) -> i32 {
    if total_spent <= MILESTONE_SPEND_THRESHOLD {
        return 0;
    }
    ((total_spent - MILESTONE_SPEND_THRESHOLD) / MILESTONE_BLOCK_SIZE)
        .floor()
        .to_i32()
        .unwrap_or(0)
}

/// The new ledger field values after a checkout settles.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerUpdate {
    pub total_spent: Decimal,
    pub five_pct_used: bool,
    pub ten_pct_used: bool,
    pub twenty_pct_used: bool,
    pub extra_voucher_balance: i32,
    pub extra_vouchers_earned: i32,
    /// Milestone vouchers credited by this settlement, for event emission.
    pub credited_blocks: i32,
}

/// Advance a ledger past a completed checkout.
///
/// Consumes the applied voucher first, then records the fee-inclusive
/// charge, then credits any newly crossed milestone blocks. The applied
/// kind must come from [`pricing::eligible_kind`] against this same
/// ledger snapshot.
pub fn settle(
    ledger: &voucher_ledger::Model,
    applied: Option<VoucherKind>,
    final_total: Decimal,
) -> LedgerUpdate {
    let mut update = LedgerUpdate {
        total_spent: ledger.total_spent,
        five_pct_used: ledger.five_pct_used,
        ten_pct_used: ledger.ten_pct_used,
        twenty_pct_used: ledger.twenty_pct_used,
        extra_voucher_balance: ledger.extra_voucher_balance,
        extra_vouchers_earned: ledger.extra_vouchers_earned,
        credited_blocks: 0,
    };

    match applied {
        Some(VoucherKind::FivePct) => update.five_pct_used = true,
        Some(VoucherKind::TenPct) => update.ten_pct_used = true,
        Some(VoucherKind::TwentyPct) => update.twenty_pct_used = true,
        Some(VoucherKind::FlatP250) => {
            update.extra_voucher_balance = (update.extra_voucher_balance - 1).max(0)
        }
        None => {}
    }

    update.total_spent += final_total;

    let total_blocks = milestone_blocks(update.total_spent);
    let new_blocks = total_blocks - update.extra_vouchers_earned;
    if new_blocks > 0 {
        update.extra_voucher_balance += new_blocks;
        update.extra_vouchers_earned = total_blocks;
        update.credited_blocks = new_blocks;
    }

    update
}

/// A voucher the customer can apply right now.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoucherOption {
    pub code: String,
    pub label: String,
}

/// List the codes currently usable against a ledger, in ascending value
/// order with the flat voucher last.
pub fn available_vouchers(ledger: &voucher_ledger::Model) -> Vec<VoucherOption> {
    let mut options = Vec::new();
    for kind in [
        VoucherKind::FivePct,
        VoucherKind::TenPct,
        VoucherKind::TwentyPct,
        VoucherKind::FlatP250,
    ] {
        if pricing::eligible_kind(kind.code(), ledger).is_none() {
            continue;
        }
        let label = match kind {
            VoucherKind::FivePct => "5% off (one-time after ₱5,000 spent)".to_string(),
            VoucherKind::TenPct => "10% off (one-time after ₱10,000 spent)".to_string(),
            VoucherKind::TwentyPct => "20% off (one-time after ₱20,000 spent)".to_string(),
            VoucherKind::FlatP250 => {
                format!("₱250 off ({} available)", ledger.extra_voucher_balance)
            }
        };
        options.push(VoucherOption {
            code: kind.code().to_string(),
            label,
        });
    }
    options
}

/// Read side of the voucher ledger.
#[derive(Clone)]
pub struct VoucherLedgerService {
    db: Arc<DatabaseConnection>,
}

impl VoucherLedgerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Fetch a customer's ledger, creating the zeroed row on first use.
    #[instrument(skip(self))]
    pub async fn get_or_create_ledger(
        &self,
        account_id: Uuid,
    ) -> Result<voucher_ledger::Model, ServiceError> {
        if let Some(ledger) = voucher_ledger::Entity::find()
            .filter(voucher_ledger::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await?
        {
            return Ok(ledger);
        }

        let fresh = voucher_ledger::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            total_spent: Set(Decimal::ZERO),
            five_pct_used: Set(false),
            ten_pct_used: Set(false),
            twenty_pct_used: Set(false),
            extra_voucher_balance: Set(0),
            extra_vouchers_earned: Set(0),
            version: Set(0),
            updated_at: Set(Utc::now()),
        };
        let ledger = fresh.insert(&*self.db).await?;
        info!(%account_id, "Created voucher ledger");
        Ok(ledger)
    }

    /// The vouchers a customer can use at checkout right now.
    #[instrument(skip(self))]
    pub async fn list_available(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<VoucherOption>, ServiceError> {
        let ledger = self.get_or_create_ledger(account_id).await?;
        Ok(available_vouchers(&ledger))
    }
}
