use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{next_timestamp_id, CartItem, CartSnapshot, RecordId, User};

pub const DELIVERY_MINUTES: i64 = 30;
pub const FALLBACK_ADDRESS: &str = "123 Main Street, City";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Paypal,
    #[serde(rename = "googlepay")]
    GooglePay,
    Cash,
    /// Any method this client does not offer, kept so the record still loads.
    #[serde(other)]
    Unknown,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Card,
        PaymentMethod::Paypal,
        PaymentMethod::GooglePay,
        PaymentMethod::Cash,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::GooglePay => "googlepay",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::GooglePay => "Google Pay",
            PaymentMethod::Cash => "Cash on Delivery",
            PaymentMethod::Unknown => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Pay securely with your card",
            PaymentMethod::Paypal => "Pay with your PayPal account",
            PaymentMethod::GooglePay => "Fast payment with Google Pay",
            PaymentMethod::Cash => "Pay when you receive your order",
            PaymentMethod::Unknown => "",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.code() == s)
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Delivery steps, in order. `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Preparing,
    OnTheWay,
    Arriving,
    Delivered,
    /// Written by some other client; shown as a plain placed order.
    #[serde(other)]
    Unknown,
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Preparing => "Preparing your order",
            DeliveryStatus::OnTheWay => "On the way",
            DeliveryStatus::Arriving => "Arriving soon",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Unknown => "Order placed",
        }
    }

    /// The coarse order `status` that goes with this delivery step.
    pub fn order_status(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            _ => "preparing",
        }
    }
}

/// A placed order. Items are a snapshot taken at checkout, so later menu
/// changes never alter what was ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: RecordId,
    #[serde(default)]
    pub user_id: RecordId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub order_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Older records carry `date` instead of `createdAt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub delivery_address: String,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Order {
    /// Builds the order for a checkout. The total comes from the snapshot
    /// lines, never from a fresh cart or catalog read.
    pub fn from_snapshot(
        snapshot: &CartSnapshot,
        user: Option<&User>,
        payment_method: PaymentMethod,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let user_id = user
            .map(|u| u.id.clone())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| RecordId::from(1u64));
        let delivery_address = user
            .map(|u| u.address.trim())
            .filter(|address| !address.is_empty())
            .unwrap_or(FALLBACK_ADDRESS)
            .to_string();

        Self {
            id: next_timestamp_id(),
            user_id,
            items: snapshot.items.clone(),
            total: snapshot.computed_total(),
            payment_method: Some(payment_method),
            status: DeliveryStatus::Preparing.order_status().to_string(),
            order_notes: notes.to_string(),
            created_at: Some(timestamp(now)),
            date: None,
            estimated_delivery: Some(timestamp(now + Duration::minutes(DELIVERY_MINUTES))),
            delivery_status: DeliveryStatus::Preparing,
            delivery_address,
        }
    }

    /// Stand-in shown by the tracking view when the real order cannot be
    /// loaded.
    pub fn placeholder(id: RecordId, now: DateTime<Utc>) -> Self {
        let items = vec![CartItem {
            menu_id: RecordId::from(1u64),
            quantity: 2,
            price: 12.99,
            name: "Margherita Pizza".to_string(),
        }];
        Self {
            id,
            user_id: RecordId::from(1u64),
            total: CartSnapshot::new(items.clone()).total,
            items,
            payment_method: Some(PaymentMethod::Card),
            status: DeliveryStatus::Preparing.order_status().to_string(),
            order_notes: String::new(),
            created_at: None,
            date: Some(timestamp(now)),
            estimated_delivery: Some(timestamp(now + Duration::minutes(DELIVERY_MINUTES))),
            delivery_status: DeliveryStatus::Preparing,
            delivery_address: FALLBACK_ADDRESS.to_string(),
        }
    }
}
