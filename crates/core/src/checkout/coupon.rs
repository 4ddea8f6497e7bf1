//! Coupon eligibility rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::CouponCode;

/// A discount coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: CouponCode,
    pub description: String,
    /// Percentage off, in `(0, 100]`.
    pub discount: Decimal,
    pub is_public: bool,
    pub for_new_user: bool,
    pub for_member: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// A coupon is usable only strictly before its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Apply the percentage discount to an amount, without rounding.
    #[must_use]
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount - amount * self.discount / Decimal::ONE_HUNDRED
    }
}

/// What the coupon rules need to know about an authenticated customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CustomerStanding {
    /// Orders of any status the customer has placed before.
    pub prior_orders: i64,
    /// Whether the identity provider grants the member entitlement.
    pub is_member: bool,
}

/// Why a coupon may not be used.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    #[error("Invalid or expired coupon")]
    NotFound,
    #[error("Invalid or expired coupon")]
    Expired,
    #[error("Login required to use this coupon")]
    LoginRequired,
    #[error("Coupon valid for new users only")]
    NotEligibleNewUser,
    #[error("Coupon valid for members only")]
    MembersOnly,
}

/// Decide whether `customer` may use `coupon` at `now`.
///
/// `coupon` is the result of looking the code up; `None` means no such code.
/// `customer` is `None` for anonymous callers. Checks run in a fixed order and
/// the first failure wins:
///
/// 1. the coupon exists and has not expired;
/// 2. public coupons are accepted for anyone;
/// 3. otherwise the caller must be signed in;
/// 4. new-user coupons require zero prior orders;
/// 5. member coupons require the member entitlement.
///
/// # Errors
///
/// Returns the first [`CouponRejection`] that applies.
pub fn evaluate_coupon<'c>(
    coupon: Option<&'c Coupon>,
    customer: Option<&CustomerStanding>,
    now: DateTime<Utc>,
) -> Result<&'c Coupon, CouponRejection> {
    let coupon = coupon.ok_or(CouponRejection::NotFound)?;
    if coupon.is_expired(now) {
        return Err(CouponRejection::Expired);
    }
    if coupon.is_public {
        return Ok(coupon);
    }

    let customer = customer.ok_or(CouponRejection::LoginRequired)?;
    if coupon.for_new_user && customer.prior_orders > 0 {
        return Err(CouponRejection::NotEligibleNewUser);
    }
    if coupon.for_member && !customer.is_member {
        return Err(CouponRejection::MembersOnly);
    }

    Ok(coupon)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn coupon(is_public: bool, for_new_user: bool, for_member: bool) -> Coupon {
        let now = Utc::now();
        Coupon {
            code: CouponCode::parse("SAVE10").unwrap(),
            description: "10% off".to_owned(),
            discount: Decimal::TEN,
            is_public,
            for_new_user,
            for_member,
            expires_at: now + Duration::days(7),
            created_at: now,
        }
    }

    const NEWCOMER: CustomerStanding = CustomerStanding {
        prior_orders: 0,
        is_member: false,
    };

    #[test]
    fn test_missing_coupon_rejected() {
        assert_eq!(
            evaluate_coupon(None, Some(&NEWCOMER), Utc::now()),
            Err(CouponRejection::NotFound)
        );
    }

    #[test]
    fn test_expired_coupon_always_rejected() {
        let mut c = coupon(true, false, false);
        let now = Utc::now();
        c.expires_at = now - Duration::seconds(1);
        assert_eq!(evaluate_coupon(Some(&c), Some(&NEWCOMER), now), Err(CouponRejection::Expired));
        assert_eq!(evaluate_coupon(Some(&c), None, now), Err(CouponRejection::Expired));
    }

    #[test]
    fn test_expiry_instant_is_exclusive() {
        let c = coupon(true, false, false);
        assert_eq!(
            evaluate_coupon(Some(&c), None, c.expires_at),
            Err(CouponRejection::Expired)
        );
    }

    #[test]
    fn test_public_coupon_needs_no_login() {
        let c = coupon(true, true, true);
        assert!(evaluate_coupon(Some(&c), None, Utc::now()).is_ok());
    }

    #[test]
    fn test_private_coupon_requires_login() {
        let c = coupon(false, false, false);
        assert_eq!(
            evaluate_coupon(Some(&c), None, Utc::now()),
            Err(CouponRejection::LoginRequired)
        );
        assert!(evaluate_coupon(Some(&c), Some(&NEWCOMER), Utc::now()).is_ok());
    }

    #[test]
    fn test_new_user_coupon_counts_prior_orders() {
        let c = coupon(false, true, false);
        let returning = CustomerStanding {
            prior_orders: 1,
            is_member: false,
        };
        assert!(evaluate_coupon(Some(&c), Some(&NEWCOMER), Utc::now()).is_ok());
        assert_eq!(
            evaluate_coupon(Some(&c), Some(&returning), Utc::now()),
            Err(CouponRejection::NotEligibleNewUser)
        );
    }

    #[test]
    fn test_member_coupon_requires_entitlement() {
        let c = coupon(false, false, true);
        let member = CustomerStanding {
            prior_orders: 3,
            is_member: true,
        };
        assert_eq!(
            evaluate_coupon(Some(&c), Some(&NEWCOMER), Utc::now()),
            Err(CouponRejection::MembersOnly)
        );
        assert!(evaluate_coupon(Some(&c), Some(&member), Utc::now()).is_ok());
    }

    #[test]
    fn test_new_user_check_runs_before_member_check() {
        let c = coupon(false, true, true);
        let veteran = CustomerStanding {
            prior_orders: 2,
            is_member: false,
        };
        assert_eq!(
            evaluate_coupon(Some(&c), Some(&veteran), Utc::now()),
            Err(CouponRejection::NotEligibleNewUser)
        );
    }

    #[test]
    fn test_apply_discount() {
        let c = coupon(true, false, false);
        assert_eq!(c.apply(Decimal::new(2000, 2)), Decimal::new(1800, 2));
    }
}
