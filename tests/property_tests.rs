//! Property-based tests for the pricing, ledger, badge, and cart rules.
//!
//! These use proptest to verify the invariants the checkout flow relies on
//! across a wide range of inputs, helping to catch edge cases the
//! example-based unit tests might miss.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use partshub_api::entities::{product, voucher_ledger};
use partshub_api::services::badges::{self, BadgeLevel};
use partshub_api::services::carts::Cart;
use partshub_api::services::pricing::{self, VoucherKind, CONVENIENCE_FEE_RATE};
use partshub_api::services::vouchers::{milestone_blocks, settle};

// Strategies for generating test data

fn money_strategy() -> impl Strategy<Value = Decimal> {
    // Up to one million pesos at centavo precision.
    (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("5PCT".to_string()),
        Just("10PCT".to_string()),
        Just("20PCT".to_string()),
        Just("P250".to_string()),
        Just(String::new()),
        "[A-Z]{3,8}",
    ]
}

fn ledger_strategy() -> impl Strategy<Value = voucher_ledger::Model> {
    (
        money_strategy(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        0i32..10,
    )
        .prop_map(|(total_spent, five, ten, twenty, balance)| {
            // Earned blocks follow the spend; the balance is whatever part
            // of them the customer has not yet used.
            let earned = milestone_blocks(total_spent);
            voucher_ledger::Model {
                id: Uuid::new_v4(),
                account_id: Uuid::new_v4(),
                total_spent,
                five_pct_used: five,
                ten_pct_used: ten,
                twenty_pct_used: twenty,
                extra_voucher_balance: balance.min(earned),
                extra_vouchers_earned: earned,
                version: 0,
                updated_at: Utc::now(),
            }
        })
}

fn applied_strategy() -> impl Strategy<Value = Option<VoucherKind>> {
    prop_oneof![
        Just(None),
        Just(Some(VoucherKind::FivePct)),
        Just(Some(VoucherKind::TenPct)),
        Just(Some(VoucherKind::TwentyPct)),
        Just(Some(VoucherKind::FlatP250)),
    ]
}

fn part(price: Decimal, stock: i32) -> product::Model {
    product::Model {
        id: Uuid::new_v4(),
        seller_id: Uuid::new_v4(),
        name: "Brake pads".to_string(),
        brand: "Toyota".to_string(),
        model: "Vios".to_string(),
        compatible_years: "2018,2019".to_string(),
        price,
        stock,
        version: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// Property: a quote's parts always reconcile with each other
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn quote_totals_always_reconcile(
        subtotal in money_strategy(),
        code in code_strategy(),
        ledger in ledger_strategy(),
    ) {
        let q = pricing::quote(subtotal, &code, &ledger);
        prop_assert_eq!(q.subtotal, subtotal);
        prop_assert!(q.discounted_total >= Decimal::ZERO);
        prop_assert_eq!(q.discounted_total, (subtotal - q.discount).max(Decimal::ZERO));
        prop_assert_eq!(
            q.convenience_fee,
            pricing::round_centavos(q.discounted_total * CONVENIENCE_FEE_RATE)
        );
        prop_assert_eq!(q.final_total, q.discounted_total + q.convenience_fee);
    }

    #[test]
    fn quote_clears_the_code_exactly_when_ineligible(
        subtotal in money_strategy(),
        code in code_strategy(),
        ledger in ledger_strategy(),
    ) {
        let q = pricing::quote(subtotal, &code, &ledger);
        prop_assert_eq!(q.eligible, !q.voucher_code.is_empty());
        prop_assert_eq!(q.eligible, q.applied.is_some());
        if !q.eligible {
            prop_assert_eq!(q.discount, Decimal::ZERO);
        }
    }

    #[test]
    fn percentage_discounts_stay_within_a_fifth(
        subtotal in money_strategy(),
        ledger in ledger_strategy(),
    ) {
        for code in ["5PCT", "10PCT", "20PCT"] {
            let q = pricing::quote(subtotal, code, &ledger);
            prop_assert!(q.discount <= pricing::round_centavos(subtotal * dec!(0.20)));
        }
    }

    #[test]
    fn quote_is_deterministic(
        subtotal in money_strategy(),
        code in code_strategy(),
        ledger in ledger_strategy(),
    ) {
        prop_assert_eq!(
            pricing::quote(subtotal, &code, &ledger),
            pricing::quote(subtotal, &code, &ledger)
        );
    }
}

// Property: settling a checkout only ever moves the ledger forward
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn settle_moves_the_ledger_forward(
        ledger in ledger_strategy(),
        applied in applied_strategy(),
        final_total in money_strategy(),
    ) {
        let u = settle(&ledger, applied, final_total);
        prop_assert_eq!(u.total_spent, ledger.total_spent + final_total);
        prop_assert!(u.extra_voucher_balance >= 0);
        prop_assert!(u.extra_vouchers_earned >= ledger.extra_vouchers_earned);
        prop_assert_eq!(
            u.extra_vouchers_earned,
            ledger.extra_vouchers_earned.max(milestone_blocks(u.total_spent))
        );
        prop_assert_eq!(
            u.credited_blocks,
            (milestone_blocks(u.total_spent) - ledger.extra_vouchers_earned).max(0)
        );
    }

    #[test]
    fn settle_consumes_only_the_applied_voucher(
        ledger in ledger_strategy(),
        final_total in money_strategy(),
    ) {
        let u = settle(&ledger, Some(VoucherKind::TenPct), final_total);
        prop_assert!(u.ten_pct_used);
        prop_assert_eq!(u.five_pct_used, ledger.five_pct_used);
        prop_assert_eq!(u.twenty_pct_used, ledger.twenty_pct_used);
        prop_assert_eq!(
            u.extra_voucher_balance,
            ledger.extra_voucher_balance + u.credited_blocks
        );
    }

    #[test]
    fn flat_voucher_spends_exactly_one_unit(
        ledger in ledger_strategy(),
        final_total in money_strategy(),
    ) {
        let u = settle(&ledger, Some(VoucherKind::FlatP250), final_total);
        let spent = i32::from(ledger.extra_voucher_balance > 0);
        prop_assert_eq!(
            u.extra_voucher_balance,
            ledger.extra_voucher_balance - spent + u.credited_blocks
        );
        prop_assert_eq!(u.five_pct_used, ledger.five_pct_used);
        prop_assert_eq!(u.ten_pct_used, ledger.ten_pct_used);
        prop_assert_eq!(u.twenty_pct_used, ledger.twenty_pct_used);
    }
}

// Property: milestone accrual never goes backward or double-credits
proptest! {
    #[test]
    fn milestone_blocks_are_monotone(a in money_strategy(), b in money_strategy()) {
        prop_assert!(milestone_blocks(a) >= 0);
        prop_assert!(milestone_blocks(a + b) >= milestone_blocks(a));
    }

    #[test]
    fn no_blocks_at_or_below_the_threshold(cents in 0i64..=2_000_000) {
        prop_assert_eq!(milestone_blocks(Decimal::new(cents, 2)), 0);
    }
}

// Property: badge evaluation always lands in a sensible state
proptest! {
    #[test]
    fn badge_progress_stays_in_percent_range(revenue in money_strategy()) {
        let badge = badges::evaluate(revenue);
        prop_assert!((0..=100).contains(&badge.progress_pct));
        prop_assert_eq!(badge.label, badge.level.label());
        match badge.amount_to_next {
            Some(amount) => prop_assert!(amount > Decimal::ZERO),
            None => prop_assert_eq!(badge.level, BadgeLevel::Top),
        }
    }
}

// Property: cart quantities always stay within [1, stock]
proptest! {
    #[test]
    fn cart_quantity_stays_within_stock(
        price in money_strategy(),
        stock in 1i32..50,
        requests in proptest::collection::vec(-100i32..1_000, 1..6),
    ) {
        let p = part(price, stock);
        let mut cart = Cart::default();
        for q in requests {
            cart.add(&p, q).unwrap();
            prop_assert_eq!(cart.lines.len(), 1);
            let quantity = cart.lines[0].quantity;
            prop_assert!((1..=stock).contains(&quantity));
        }
    }

    #[test]
    fn out_of_stock_add_is_rejected(
        price in money_strategy(),
        stock in -5i32..=0,
        quantity in -100i32..100,
    ) {
        let p = part(price, stock);
        let mut cart = Cart::default();
        prop_assert!(cart.add(&p, quantity).is_err());
        prop_assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_clamps_to_the_stock_window(
        price in money_strategy(),
        stock in 1i32..50,
        quantity in -100i32..200,
    ) {
        let p = part(price, stock);
        let mut cart = Cart::default();
        cart.add(&p, 1).unwrap();
        cart.set_quantity(p.id, quantity, p.stock).unwrap();
        let q = cart.lines[0].quantity;
        prop_assert!((1..=stock).contains(&q));
    }
}
