//! Premium entitlement evaluation.
//!
//! Validity is always re-derived from the stored flag and expiry timestamp,
//! never cached as a standalone boolean. Every place that gates behavior on
//! premium status goes through these predicates so backend gating and
//! presentation gating cannot drift apart.

use chrono::{DateTime, Duration, Utc};

use crate::plan::Plan;

/// Window before expiry in which a subscription counts as "expiring soon".
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// A subscription is valid strictly before its expiry instant. At the exact
/// expiry instant it is already expired.
pub fn is_valid_premium(
    is_premium: bool,
    premium_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match premium_expires_at {
        Some(expires_at) => is_premium && expires_at > now,
        None => false,
    }
}

pub fn is_expired(
    is_premium: bool,
    premium_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match premium_expires_at {
        Some(expires_at) => is_premium && expires_at <= now,
        None => false,
    }
}

pub fn is_expiring_soon(
    is_premium: bool,
    premium_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    is_valid_premium(is_premium, premium_expires_at, now)
        && premium_expires_at
            .is_some_and(|expires_at| expires_at <= now + Duration::days(EXPIRY_WARNING_DAYS))
}

/// Expiry timestamp for a purchase made at `now`.
pub fn expiry_for(plan: Plan, now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(plan.duration_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn valid_before_expiry() {
        let now = utc(2024, 1, 1);
        let expires = Some(utc(2024, 2, 1));
        assert!(is_valid_premium(true, expires, now));
        assert!(!is_expired(true, expires, now));
    }

    #[test]
    fn invalid_without_flag_or_expiry() {
        let now = utc(2024, 1, 1);
        assert!(!is_valid_premium(false, Some(utc(2024, 2, 1)), now));
        assert!(!is_valid_premium(true, None, now));
        assert!(!is_expired(true, None, now));
    }

    #[test]
    fn expiry_instant_is_exclusive() {
        // at the exact expiry instant the subscription is expired, not valid
        let now = utc(2024, 1, 1);
        assert!(!is_valid_premium(true, Some(now), now));
        assert!(is_expired(true, Some(now), now));
    }

    #[test]
    fn expired_one_day_after_expiry() {
        let expires = Some(utc(2024, 1, 1));
        let now = utc(2024, 1, 2);
        assert!(is_expired(true, expires, now));
        assert!(!is_valid_premium(true, expires, now));
    }

    #[test]
    fn expiring_soon_within_seven_days() {
        let now = utc(2024, 1, 1);
        assert!(is_expiring_soon(true, Some(utc(2024, 1, 5)), now));
        assert!(is_expiring_soon(true, Some(utc(2024, 1, 8)), now));
        assert!(!is_expiring_soon(true, Some(utc(2024, 1, 9)), now));
        // already expired is not "expiring soon"
        assert!(!is_expiring_soon(true, Some(utc(2023, 12, 31)), now));
    }

    #[test]
    fn monthly_expiry_from_jan_first() {
        let now = utc(2024, 1, 1);
        assert_eq!(expiry_for(Plan::Monthly, now), utc(2024, 1, 31));
    }

    #[test]
    fn quarterly_expiry_is_ninety_days_out() {
        let now = utc(2024, 1, 1);
        assert_eq!(expiry_for(Plan::Quarterly, now), now + Duration::days(90));
    }
}
