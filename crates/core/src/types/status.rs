//! Status enums for orders, stores and payments.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// Orders are created as [`OrderStatus::OrderPlaced`] and advanced by the
/// seller. Payment state is tracked separately on the order (`is_paid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    OrderPlaced,
    Processing,
    Shipped,
    Delivered,
}

/// How a customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash on delivery: orders are final immediately, paid on receipt.
    Cod,
    /// Hosted Stripe checkout: orders are paid once the webhook confirms.
    Stripe,
}

impl PaymentMethod {
    /// Whether orders with this method wait for an asynchronous payment
    /// confirmation before they count as placed.
    #[must_use]
    pub const fn awaits_confirmation(self) -> bool {
        matches!(self, Self::Stripe)
    }
}

/// Review status of a seller's store application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "store_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for StoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid store status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
        let parsed: PaymentMethod = serde_json::from_str("\"STRIPE\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Stripe);
        assert!(serde_json::from_str::<PaymentMethod>("\"cod\"").is_err());
    }

    #[test]
    fn test_only_stripe_awaits_confirmation() {
        assert!(PaymentMethod::Stripe.awaits_confirmation());
        assert!(!PaymentMethod::Cod.awaits_confirmation());
    }

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OrderPlaced).unwrap(),
            "\"ORDER_PLACED\""
        );
        assert_eq!(OrderStatus::default(), OrderStatus::OrderPlaced);
    }

    #[test]
    fn test_store_status_parse_and_display() {
        for status in [StoreStatus::Pending, StoreStatus::Approved, StoreStatus::Rejected] {
            assert_eq!(status.to_string().parse::<StoreStatus>().unwrap(), status);
        }
        assert!("active".parse::<StoreStatus>().is_err());
    }
}
