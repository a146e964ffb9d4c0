//! Catalog record types and filter results.
//!
//! Products are immutable snapshots loaded from a catalog document. Enumerated
//! columns use the catalog's upper-case spellings on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::term::matches_term;

/// Loan insurance / guarantee category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Program {
    Conv,
    Va,
    Fha,
    Usda,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Conv => "CONV",
            Program::Va => "VA",
            Program::Fha => "FHA",
            Program::Usda => "USDA",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eligibility bucket. ELITE products require a higher credit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Elite,
    Standard,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Elite => f.write_str("ELITE"),
            Tier::Standard => f.write_str("STANDARD"),
        }
    }
}

/// Interest rate behaviour over the life of the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RateType {
    Fixed,
    Arm,
}

impl RateType {
    /// Map a user-facing rate preference onto a rate type.
    ///
    /// `"fix"` (any case) selects [`RateType::Fixed`]; every other value
    /// selects [`RateType::Arm`].
    pub fn from_preference(value: &str) -> Self {
        if value.to_lowercase() == "fix" {
            RateType::Fixed
        } else {
            RateType::Arm
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateType::Fixed => f.write_str("FIXED"),
            RateType::Arm => f.write_str("ARM"),
        }
    }
}

/// Loan amount classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceBucket {
    Standard,
    HighBalance,
    Jumbo,
}

/// Construction type the product finances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstructionType {
    Existing,
    OtcOneTimeClose,
}

/// Number of days a quoted price is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockPeriod {
    Days15,
    Days30,
    Days45,
}

impl LockPeriod {
    pub fn days(&self) -> u32 {
        match self {
            LockPeriod::Days15 => 15,
            LockPeriod::Days30 => 30,
            LockPeriod::Days45 => 45,
        }
    }
}

/// A single mortgage product from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanProduct {
    /// Display name
    pub name: String,

    /// Insurance / guarantee program
    pub program: Program,

    /// Eligibility tier
    pub tier: Tier,

    /// Loan amount bucket
    pub balance_bucket: BalanceBucket,

    /// Construction type
    pub construction_type: ConstructionType,

    /// Fixed or adjustable rate
    pub arm_or_fixed: RateType,

    /// Quoted rate, in percent
    pub rate: f64,

    /// Price for a 15-day lock
    pub price_15_day: f64,

    /// Price for a 30-day lock
    pub price_30_day: f64,

    /// Price for a 45-day lock
    pub price_45_day: f64,

    /// Term specification: `"30"`, `"21-30"` or ARM notation `"5/6"`
    pub term: String,

    /// Originating lender
    pub lender: String,
}

impl LoanProduct {
    /// Whether this product's term specification covers `years`.
    pub fn matches_term(&self, years: i64) -> bool {
        matches_term(&self.term, years)
    }

    /// Price quoted for the given lock period.
    pub fn lock_price(&self, period: LockPeriod) -> f64 {
        match period {
            LockPeriod::Days15 => self.price_15_day,
            LockPeriod::Days30 => self.price_30_day,
            LockPeriod::Days45 => self.price_45_day,
        }
    }
}

/// Filter result envelope: `{ "total": n, "products": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductListing {
    pub total: usize,
    pub products: Vec<LoanProduct>,
}

impl From<Vec<LoanProduct>> for ProductListing {
    fn from(products: Vec<LoanProduct>) -> Self {
        Self {
            total: products.len(),
            products,
        }
    }
}
