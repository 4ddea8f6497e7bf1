//! Stripe request and webhook payload types.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use gocart_core::{OrderId, UserId};

use super::StripeError;

/// Stripe rejects metadata values longer than this.
const METADATA_VALUE_LIMIT: usize = 500;

/// Metadata key of the first order id chunk. Later chunks append their index
/// (`orderIds1`, `orderIds2`, ...).
const ORDER_IDS_KEY: &str = "orderIds";

/// A hosted checkout session, as returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Everything needed to open a hosted checkout session for a set of orders.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest<'a> {
    /// Amount in minor currency units.
    pub amount_minor: i64,
    pub order_ids: &'a [OrderId],
    pub user_id: &'a UserId,
    pub success_url: Url,
    pub cancel_url: Url,
    /// Unix timestamp after which the session expires.
    pub expires_at: i64,
}

impl CheckoutSessionRequest<'_> {
    /// Encode as Stripe's bracketed form fields.
    pub(crate) fn to_form(&self, currency: &str, app_id: &str) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = [
            ("mode", "payment".to_owned()),
            ("line_items[0][quantity]", "1".to_owned()),
            ("line_items[0][price_data][currency]", currency.to_owned()),
            ("line_items[0][price_data][product_data][name]", "Order".to_owned()),
            ("line_items[0][price_data][unit_amount]", self.amount_minor.to_string()),
            ("success_url", self.success_url.to_string()),
            ("cancel_url", self.cancel_url.to_string()),
            ("expires_at", self.expires_at.to_string()),
            ("metadata[userId]", self.user_id.to_string()),
            ("metadata[appId]", app_id.to_owned()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

        for (index, chunk) in order_id_chunks(self.order_ids).into_iter().enumerate() {
            let key = if index == 0 {
                format!("metadata[{ORDER_IDS_KEY}]")
            } else {
                format!("metadata[{ORDER_IDS_KEY}{index}]")
            };
            form.push((key, chunk));
        }
        form
    }
}

/// Join order ids with commas, starting a new value whenever the next id
/// would push the current one past Stripe's metadata length limit.
fn order_id_chunks(order_ids: &[OrderId]) -> Vec<String> {
    let mut chunks = vec![String::new()];
    for id in order_ids {
        let id = id.to_string();
        let Some(current) = chunks.last_mut() else {
            break;
        };
        if current.is_empty() {
            current.push_str(&id);
        } else if current.len() + 1 + id.len() <= METADATA_VALUE_LIMIT {
            current.push(',');
            current.push_str(&id);
        } else {
            chunks.push(id);
        }
    }
    chunks
}

/// A webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

/// The object an event is about.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Metadata we attach to checkout sessions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub app_id: String,
    /// Every other key; order ids live in `orderIds`, `orderIds1`, ...
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SessionMetadata {
    /// Collect the order ids from every `orderIds*` chunk, in chunk order.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Parse` if any id is not a UUID.
    pub fn order_ids(&self) -> Result<Vec<OrderId>, StripeError> {
        let mut chunks: BTreeMap<usize, &str> = BTreeMap::new();
        for (key, value) in &self.extra {
            let Some(suffix) = key.strip_prefix(ORDER_IDS_KEY) else {
                continue;
            };
            let index = if suffix.is_empty() {
                0
            } else if let Ok(index) = suffix.parse::<usize>() {
                index
            } else {
                continue;
            };
            chunks.insert(index, value);
        }

        chunks
            .values()
            .flat_map(|chunk| chunk.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|e| StripeError::Parse(format!("bad order id {s:?}: {e}")))
            })
            .collect()
    }
}

/// The parts of a checkout session object we read from webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl Event {
    /// Interpret the event object as a checkout session.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Parse` if the object is not shaped like one.
    pub fn session(&self) -> Result<SessionObject, StripeError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_form_carries_metadata() {
        let (first, second) = (OrderId::generate(), OrderId::generate());
        let ids = [first, second];
        let user = UserId::new("user_1");
        let request = CheckoutSessionRequest {
            amount_minor: 2500,
            order_ids: &ids,
            user_id: &user,
            success_url: "https://shop.test/loading?nextUrl=orders".parse().unwrap(),
            cancel_url: "https://shop.test/cart".parse().unwrap(),
            expires_at: 1_700_000_000,
        };
        let form = request.to_form("usd", "gocart");
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("line_items[0][price_data][unit_amount]"), "2500");
        assert_eq!(get("line_items[0][price_data][currency]"), "usd");
        assert_eq!(get("metadata[orderIds]"), format!("{first},{second}"));
        assert_eq!(get("metadata[appId]"), "gocart");
        assert_eq!(get("cancel_url"), "https://shop.test/cart");
    }

    fn metadata(pairs: &[(&str, String)]) -> SessionMetadata {
        SessionMetadata {
            extra: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
            ..SessionMetadata::default()
        }
    }

    #[test]
    fn test_metadata_order_ids() {
        let id = OrderId::generate();
        let meta = metadata(&[("orderIds", format!("{id}, "))]);
        assert_eq!(meta.order_ids().unwrap(), vec![id]);

        let bad = metadata(&[("orderIds", "nope".to_owned())]);
        assert!(bad.order_ids().is_err());
    }

    #[test]
    fn test_metadata_chunks_read_in_index_order() {
        let ids: Vec<OrderId> = (0..3).map(|_| OrderId::generate()).collect();
        let meta = metadata(&[
            ("orderIds10", ids[2].to_string()),
            ("orderIds", ids[0].to_string()),
            ("orderIds2", ids[1].to_string()),
            ("orderIdsX", "ignored".to_owned()),
        ]);
        assert_eq!(meta.order_ids().unwrap(), ids);
    }

    #[test]
    fn test_many_orders_fit_metadata_limits() {
        let ids: Vec<OrderId> = (0..40).map(|_| OrderId::generate()).collect();
        let user = UserId::new("user_1");
        let request = CheckoutSessionRequest {
            amount_minor: 12_000,
            order_ids: &ids,
            user_id: &user,
            success_url: "https://shop.test/loading?nextUrl=orders".parse().unwrap(),
            cancel_url: "https://shop.test/cart".parse().unwrap(),
            expires_at: 1_700_000_000,
        };
        let form = request.to_form("usd", "gocart");

        let chunks: Vec<(String, String)> = form
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix("metadata[")
                    .and_then(|k| k.strip_suffix(']'))
                    .filter(|k| k.starts_with("orderIds"))
                    .map(|k| (k.to_owned(), v.clone()))
            })
            .collect();

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|(_, v)| v.len() <= METADATA_VALUE_LIMIT));

        let pairs: Vec<(&str, String)> =
            chunks.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        assert_eq!(metadata(&pairs).order_ids().unwrap(), ids);
    }

    #[test]
    fn test_event_session_parses() {
        let event: Event = serde_json::from_str(
            r#"{
                "id": "evt_1",
                "type": "checkout.session.completed",
                "data": { "object": {
                    "id": "cs_test_1",
                    "metadata": { "orderIds": "", "userId": "user_1", "appId": "gocart" }
                } }
            }"#,
        )
        .unwrap();
        assert_eq!(event.kind, "checkout.session.completed");
        let session = event.session().unwrap();
        assert_eq!(session.metadata.user_id, "user_1");
        assert_eq!(session.metadata.app_id, "gocart");
        assert!(session.metadata.order_ids().unwrap().is_empty());
    }
}
