//! Freshness math derived from a product's timestamps.
//!
//! Every derivation takes the clock reading as a parameter; a request
//! captures `now` once and threads it through all of them.

use rand::Rng;
use serde::Serialize;
use std::fmt;
use time::{Duration, OffsetDateTime};

use super::repo::Product;

/// Products expiring within this many days show up in the overview warning.
pub const DEFAULT_EXPIRY_HORIZON_DAYS: i64 = 3;

impl Product {
    /// A product is expired once `now` is strictly past its expiry date.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now > self.expiry_date
    }

    /// Whole days until expiry, truncated toward zero. A product that
    /// expired earlier today still reports 0; the count turns negative
    /// once a full day has elapsed, so expired-yesterday reports -1.
    pub fn days_until_expiry(&self, now: OffsetDateTime) -> i64 {
        (self.expiry_date - now).whole_days()
    }

    /// Whole days since the product was added.
    pub fn days_in_fridge(&self, now: OffsetDateTime) -> i64 {
        (now - self.date_added).whole_days()
    }

    pub fn rank(&self, now: OffsetDateTime) -> FridgeRank {
        FridgeRank::from_days(self.days_in_fridge(now))
    }
}

/// Seniority tier a product earns by sitting in the fridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FridgeRank {
    Veteran,
    Seasoned,
    Resident,
    Newcomer,
    Rookie,
}

impl FridgeRank {
    /// Tier thresholds are strict: day 30 is still Seasoned, day 31 is a
    /// Veteran.
    pub fn from_days(days: i64) -> FridgeRank {
        if days > 30 {
            FridgeRank::Veteran
        } else if days > 20 {
            FridgeRank::Seasoned
        } else if days > 10 {
            FridgeRank::Resident
        } else if days > 5 {
            FridgeRank::Newcomer
        } else {
            FridgeRank::Rookie
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FridgeRank::Veteran => "Veteran",
            FridgeRank::Seasoned => "Seasoned",
            FridgeRank::Resident => "Resident",
            FridgeRank::Newcomer => "Newcomer",
            FridgeRank::Rookie => "Rookie",
        }
    }
}

impl fmt::Display for FridgeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Products still good now but expiring within `horizon_days`. The window
/// is half-open: an item expiring at this very instant is already out,
/// one expiring exactly `horizon_days` from now is in.
pub fn expiring_soon(
    products: &[Product],
    now: OffsetDateTime,
    horizon_days: i64,
) -> Vec<&Product> {
    let horizon = now + Duration::days(horizon_days);
    products
        .iter()
        .filter(|p| now < p.expiry_date && p.expiry_date <= horizon)
        .collect()
}

const EXPIRED_MESSAGES: &[&str] = &[
    "The {name} has gone off. Time to say goodbye.",
    "{name} is past its prime. Toss it before it tosses you.",
    "That {name} expired. The bin awaits.",
    "{name} has seen better days. Out it goes.",
    "Your {name} is no longer edible. Farewell, old friend.",
    "The {name} gave up. Let it rest.",
    "{name} crossed the expiry line. Don't risk it.",
    "Science experiment detected: {name} is expired.",
    "The {name} is done for. Clear the shelf.",
    "{name} expired quietly in the back of the fridge.",
];

/// Pick a throwaway line for an expired product.
pub fn expired_message<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    let template = EXPIRED_MESSAGES[rng.gen_range(0..EXPIRED_MESSAGES.len())];
    template.replace("{name}", name)
}
