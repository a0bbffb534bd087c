use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::options::OrderOptions;
use super::order::UploadedFile;

/// Prefix the dummy gateway uses for the order ids it hands out.
pub const DUMMY_ORDER_PREFIX: &str = "dummy_ord_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// No gateway credentials: payments are simulated.
    Dummy,
    /// Payments are confirmed by a gateway signature.
    Live,
}

/// Pending order kept in the customer's session between checkout and
/// payment confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutContext {
    pub options: OrderOptions,
    #[serde(flatten)]
    pub file: UploadedFile,
    pub final_amount: Decimal,
    pub phone: String,
}

/// What the customer's browser needs to start a gateway payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Set in dummy mode only; live gateway orders are opened by the gateway client.
    pub order_id: Option<String>,
    /// Amount in minor currency units.
    pub amount: i64,
    pub mode: PaymentMode,
}

impl PaymentRequest {
    pub fn minor_units(amount: Decimal) -> i64 {
        amount
            .saturating_mul(Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub context: CheckoutContext,
    pub request: PaymentRequest,
}

/// Callback data the gateway sends once the customer has paid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(rename = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(rename = "razorpay_payment_id", default)]
    pub payment_id: String,
    #[serde(rename = "razorpay_signature", default)]
    pub signature: String,
}
