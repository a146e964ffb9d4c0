//! Loan term matching.
//!
//! A product's term specification takes one of three shapes, checked in
//! this order:
//!
//! 1. **Range** `"21-30"`: matches any requested term within the inclusive bounds.
//! 2. **ARM** `"5/6"` (initial/total): matches a request of 30 years or more,
//!    or a request equal to the initial fixed period.
//! 3. **Exact** `"15"`: matches only that year count.
//!
//! Matching is total. A specification that cannot be parsed never matches;
//! a malformed range never falls through to the ARM or exact rules.

use std::fmt;

/// Requests at or above this many years are satisfied by any ARM product.
pub const ARM_LONG_TERM_YEARS: i64 = 30;

/// A parsed term specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSpec {
    /// Inclusive year range
    Range { min: i64, max: i64 },

    /// Adjustable-rate notation `initial/total`; only the initial fixed
    /// period takes part in matching
    Arm { initial: i64, total: Option<i64> },

    /// Exact year count
    Exact(i64),
}

impl TermSpec {
    /// Parse a term specification. Returns `None` for malformed input.
    pub fn parse(spec: &str) -> Option<Self> {
        if spec.contains('-') {
            let mut parts = spec.split('-');
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(min), Some(max), None) => Some(TermSpec::Range {
                    min: parse_years(min)?,
                    max: parse_years(max)?,
                }),
                _ => None,
            };
        }

        if spec.contains('/') {
            let mut parts = spec.split('/');
            let initial = parts.next().unwrap_or_default();
            return Some(TermSpec::Arm {
                initial: parse_years(initial)?,
                total: parts.next().and_then(parse_years),
            });
        }

        parse_years(spec).map(TermSpec::Exact)
    }

    /// Whether this specification covers a request for `years`.
    pub fn matches(&self, years: i64) -> bool {
        match *self {
            TermSpec::Range { min, max } => min <= years && years <= max,
            TermSpec::Arm { initial, .. } => years >= ARM_LONG_TERM_YEARS || years == initial,
            TermSpec::Exact(exact) => exact == years,
        }
    }
}

impl fmt::Display for TermSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSpec::Range { min, max } => write!(f, "{}-{}", min, max),
            TermSpec::Arm { initial, total: Some(total) } => write!(f, "{}/{}", initial, total),
            TermSpec::Arm { initial, total: None } => write!(f, "{}/", initial),
            TermSpec::Exact(years) => write!(f, "{}", years),
        }
    }
}

/// Decide whether a product term specification matches a requested term.
///
/// Never fails: garbage specifications simply do not match.
pub fn matches_term(product_term: &str, requested_years: i64) -> bool {
    TermSpec::parse(product_term).is_some_and(|spec| spec.matches(requested_years))
}

fn parse_years(token: &str) -> Option<i64> {
    token.trim().parse::<i64>().ok()
}
