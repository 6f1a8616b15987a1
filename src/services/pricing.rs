//! Checkout pricing: voucher eligibility, discount, convenience fee, and
//! the final payable amount.
//!
//! The quote computation is pure. The preview endpoint and the checkout
//! commit both call [`quote`] with the same inputs, so the numbers a
//! customer sees before paying are exactly the numbers charged. Ledger
//! mutations (consuming a one-time flag, decrementing the milestone
//! balance) happen only inside the checkout transaction.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::voucher_ledger;

/// Convenience fee charged on the post-discount total.
pub const CONVENIENCE_FEE_RATE: Decimal = dec!(0.05);
/// Flat discount value of one milestone voucher.
pub const MILESTONE_VOUCHER_VALUE: Decimal = dec!(250);

/// The voucher codes accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    FivePct,
    TenPct,
    TwentyPct,
    FlatP250,
}

impl VoucherKind {
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "5PCT" => Some(VoucherKind::FivePct),
            "10PCT" => Some(VoucherKind::TenPct),
            "20PCT" => Some(VoucherKind::TwentyPct),
            "P250" => Some(VoucherKind::FlatP250),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            VoucherKind::FivePct => "5PCT",
            VoucherKind::TenPct => "10PCT",
            VoucherKind::TwentyPct => "20PCT",
            VoucherKind::FlatP250 => "P250",
        }
    }

    /// Lifetime spend required before the one-time percentage vouchers
    /// unlock. The flat voucher is gated on balance instead.
    pub fn spend_threshold(&self) -> Option<Decimal> {
        match self {
            VoucherKind::FivePct => Some(dec!(5_000)),
            VoucherKind::TenPct => Some(dec!(10_000)),
            VoucherKind::TwentyPct => Some(dec!(20_000)),
            VoucherKind::FlatP250 => None,
        }
    }

    pub fn discount_rate(&self) -> Option<Decimal> {
        match self {
            VoucherKind::FivePct => Some(dec!(0.05)),
            VoucherKind::TenPct => Some(dec!(0.10)),
            VoucherKind::TwentyPct => Some(dec!(0.20)),
            VoucherKind::FlatP250 => None,
        }
    }
}

/// Priced checkout breakdown returned by both preview and commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricingQuote {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub discounted_total: Decimal,
    pub convenience_fee: Decimal,
    pub final_total: Decimal,
    /// The applied code, emptied when the requested code was not usable.
    pub voucher_code: String,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<VoucherKind>,
}

/// Round to centavos with banker's rounding, matching currency math
/// everywhere else in the pricing flow.
pub fn round_centavos(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Determine whether `code` is currently usable against the ledger.
///
/// Eligibility is measured against the ledger as it stands before the
/// current order is recorded; each percentage tier is independent of the
/// others and usable exactly once.
pub fn eligible_kind(code: &str, ledger: &voucher_ledger::Model) -> Option<VoucherKind> {
    let kind = VoucherKind::parse(code)?;
    let usable = match kind {
        VoucherKind::FivePct => ledger.total_spent >= dec!(5_000) && !ledger.five_pct_used,
        VoucherKind::TenPct => ledger.total_spent >= dec!(10_000) && !ledger.ten_pct_used,
        VoucherKind::TwentyPct => ledger.total_spent >= dec!(20_000) && !ledger.twenty_pct_used,
        VoucherKind::FlatP250 => ledger.extra_voucher_balance > 0,
    };
    usable.then_some(kind)
}

/// Price a cart subtotal against a requested voucher code.
///
/// An unknown or ineligible code is not an error: the discount is zero and
/// the code is cleared from the quote, surfaced to the customer as "no
/// discount applied".
pub fn quote(subtotal: Decimal, voucher_code: &str, ledger: &voucher_ledger::Model) -> PricingQuote {
    let applied = eligible_kind(voucher_code, ledger);

    let discount = match applied {
        Some(kind) => match kind.discount_rate() {
            Some(rate) => round_centavos(subtotal * rate),
            // Flat voucher is intentionally not clamped to the subtotal;
            // the discounted-total floor below caps its effect.
            None => MILESTONE_VOUCHER_VALUE,
        },
        None => Decimal::ZERO,
    };

    let discounted_total = (subtotal - discount).max(Decimal::ZERO);
    let convenience_fee = round_centavos(discounted_total * CONVENIENCE_FEE_RATE);
    let final_total = discounted_total + convenience_fee;

    PricingQuote {
        subtotal,
        discount,
        discounted_total,
        convenience_fee,
        final_total,
        voucher_code: applied.map(|k| k.code().to_string()).unwrap_or_default(),
        eligible: applied.is_some(),
        applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn ledger(total_spent: Decimal) -> voucher_ledger::Model {
        voucher_ledger::Model {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            total_spent,
            five_pct_used: false,
            ten_pct_used: false,
            twenty_pct_used: false,
            extra_voucher_balance: 0,
            extra_vouchers_earned: 0,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn below_threshold_is_ineligible() {
        let q = quote(dec!(1000), "5PCT", &ledger(dec!(4999)));
        assert!(!q.eligible);
        assert_eq!(q.discount, dec!(0));
        assert_eq!(q.convenience_fee, dec!(50.00));
        assert_eq!(q.final_total, dec!(1050.00));
        assert_eq!(q.voucher_code, "");
    }

    #[test]
    fn five_pct_at_threshold() {
        let q = quote(dec!(1000), "5PCT", &ledger(dec!(5000)));
        assert!(q.eligible);
        assert_eq!(q.discount, dec!(50.00));
        assert_eq!(q.discounted_total, dec!(950.00));
        assert_eq!(q.convenience_fee, dec!(47.50));
        assert_eq!(q.final_total, dec!(997.50));
        assert_eq!(q.voucher_code, "5PCT");
    }

    #[test]
    fn used_flag_blocks_reuse() {
        let mut l = ledger(dec!(50_000));
        l.ten_pct_used = true;
        let q = quote(dec!(2000), "10PCT", &l);
        assert!(!q.eligible);
        assert_eq!(q.discount, dec!(0));
    }

    #[test]
    fn tiers_are_independent() {
        // Qualifying for 20% without ever using 5% is allowed.
        let l = ledger(dec!(25_000));
        assert_eq!(
            eligible_kind("20PCT", &l),
            Some(VoucherKind::TwentyPct)
        );
        assert_eq!(eligible_kind("5PCT", &l), Some(VoucherKind::FivePct));
    }

    #[test]
    fn flat_voucher_needs_balance() {
        let mut l = ledger(dec!(30_000));
        assert_eq!(eligible_kind("P250", &l), None);
        l.extra_voucher_balance = 2;
        assert_eq!(eligible_kind("P250", &l), Some(VoucherKind::FlatP250));
    }

    #[test]
    fn flat_voucher_floors_at_zero() {
        let mut l = ledger(dec!(30_000));
        l.extra_voucher_balance = 1;
        let q = quote(dec!(200), "P250", &l);
        assert_eq!(q.discount, dec!(250));
        assert_eq!(q.discounted_total, dec!(0));
        assert_eq!(q.convenience_fee, dec!(0.00));
        assert_eq!(q.final_total, dec!(0.00));
    }

    #[test]
    fn unknown_code_clears_and_charges_fee_only() {
        let q = quote(dec!(800), "HELLO", &ledger(dec!(90_000)));
        assert!(!q.eligible);
        assert_eq!(q.voucher_code, "");
        assert_eq!(q.final_total, dec!(840.00));
    }

    #[test]
    fn fee_rounds_to_centavos() {
        // 999.99 * 0.05 = 49.9995 -> 50.00
        let q = quote(dec!(999.99), "", &ledger(dec!(0)));
        assert_eq!(q.convenience_fee, dec!(50.00));
        assert_eq!(q.final_total, dec!(1049.99));
    }

    #[test]
    fn preview_and_apply_share_the_same_numbers() {
        let l = ledger(dec!(12_000));
        let first = quote(dec!(3500), "10PCT", &l);
        let second = quote(dec!(3500), "10PCT", &l);
        assert_eq!(first, second);
    }
}
