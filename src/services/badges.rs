//! Revenue badge tiers for sellers.
//!
//! The same thresholds back both the seller dashboard and the per-listing
//! badge shown on the storefront, so a seller's badge is consistent
//! everywhere it appears.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifetime revenue required for the verified tier.
pub const VERIFIED_THRESHOLD: Decimal = dec!(10_000);
/// Lifetime revenue required for the top tier.
pub const TOP_THRESHOLD: Decimal = dec!(100_000);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BadgeLevel {
    None,
    Verified,
    Top,
}

impl BadgeLevel {
    /// Storefront label, absent for unbadged sellers.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            BadgeLevel::None => None,
            BadgeLevel::Verified => Some("Verified Seller"),
            BadgeLevel::Top => Some("Top Seller"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BadgeInfo {
    pub level: BadgeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    /// Progress toward the next tier, truncated percent clamped to 100.
    pub progress_pct: i32,
    /// Revenue still needed to reach the next tier, absent at the top.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_to_next: Option<Decimal>,
}

/// Classify a seller's lifetime revenue into a badge tier.
pub fn evaluate(lifetime_revenue: Decimal) -> BadgeInfo {
    if lifetime_revenue >= TOP_THRESHOLD {
        return BadgeInfo {
            level: BadgeLevel::Top,
            label: BadgeLevel::Top.label(),
            progress_pct: 100,
            amount_to_next: None,
        };
    }

    let (level, band_start, band_size, next_at) = if lifetime_revenue >= VERIFIED_THRESHOLD {
        (
            BadgeLevel::Verified,
            VERIFIED_THRESHOLD,
            TOP_THRESHOLD - VERIFIED_THRESHOLD,
            TOP_THRESHOLD,
        )
    } else {
        (
            BadgeLevel::None,
            Decimal::ZERO,
            VERIFIED_THRESHOLD,
            VERIFIED_THRESHOLD,
        )
    };

    let raw = (lifetime_revenue - band_start) / band_size * dec!(100);
    let progress_pct = raw.min(dec!(100)).floor().to_i32().unwrap_or(0);

    BadgeInfo {
        level,
        label: level.label(),
        progress_pct,
        amount_to_next: Some(next_at - lifetime_revenue),
    }
}
