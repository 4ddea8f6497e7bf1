//! Coupon management command.
//!
//! # Usage
//!
//! ```bash
//! gocart coupon create --code NEW20 --discount 20 --expires-in-days 30 --new-user
//! ```

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use gocart_core::checkout::Coupon;
use gocart_core::{CouponCode, validate_percentage};
use gocart_storefront::db::CouponRepository;

use super::{CommandError, connect};

/// Coupon flags collected from the command line.
#[derive(Debug, Clone)]
pub struct CouponArgs {
    pub code: String,
    pub description: String,
    pub discount: Decimal,
    pub expires_in_days: u32,
    pub is_public: bool,
    pub for_new_user: bool,
    pub for_member: bool,
}

impl CouponArgs {
    /// Validate into a coupon expiring `expires_in_days` from now.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidArgument` for a bad code, percentage or
    /// expiry.
    pub fn into_coupon(self) -> Result<Coupon, CommandError> {
        let code = CouponCode::parse(&self.code)
            .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
        let discount = validate_percentage(self.discount)
            .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
        if self.expires_in_days == 0 {
            return Err(CommandError::InvalidArgument(
                "expires-in-days must be at least 1".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Coupon {
            code,
            description: self.description,
            discount,
            is_public: self.is_public,
            for_new_user: self.for_new_user,
            for_member: self.for_member,
            expires_at: now + Duration::days(i64::from(self.expires_in_days)),
            created_at: now,
        })
    }
}

/// Create a coupon.
///
/// # Errors
///
/// Returns `CommandError` if validation fails or the code already exists.
pub async fn create(args: CouponArgs) -> Result<(), CommandError> {
    let coupon = args.into_coupon()?;
    let pool = connect().await?;

    let created = CouponRepository::new(&pool).create(&coupon).await?;
    tracing::info!(
        code = %created.code,
        discount = %created.discount,
        expires_at = %created.expires_at,
        "Coupon created"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args() -> CouponArgs {
        CouponArgs {
            code: "welcome".into(),
            description: "Welcome offer".into(),
            discount: Decimal::from(15),
            expires_in_days: 7,
            is_public: false,
            for_new_user: true,
            for_member: false,
        }
    }

    #[test]
    fn test_code_uppercased() {
        let coupon = args().into_coupon().unwrap();
        assert_eq!(coupon.code.as_str(), "WELCOME");
        assert!(coupon.expires_at > coupon.created_at);
    }

    #[test]
    fn test_discount_bounds() {
        let mut bad = args();
        bad.discount = Decimal::from(101);
        assert!(bad.into_coupon().is_err());

        let mut bad = args();
        bad.discount = Decimal::ZERO;
        assert!(bad.into_coupon().is_err());
    }

    #[test]
    fn test_expiry_required() {
        let mut bad = args();
        bad.expires_in_days = 0;
        assert!(bad.into_coupon().is_err());
    }
}
