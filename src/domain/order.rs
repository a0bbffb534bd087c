use crate::error::ShopError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use super::options::{OrderOptions, PrintType};

/// First pickup number handed out by an empty shop.
pub const FIRST_TOKEN_NUMBER: u64 = 101;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Hands out order ids derived from the creation time in milliseconds.
///
/// Ids are strictly increasing: two orders created within the same
/// millisecond get consecutive values instead of colliding.
#[derive(Debug, Default)]
pub struct OrderIdGenerator {
    last: AtomicI64,
}

impl OrderIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues after the highest numeric id already on record.
    pub fn resume<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let last = orders
            .into_iter()
            .filter_map(|order| order.id.0.parse::<i64>().ok())
            .max()
            .unwrap_or_default();
        Self {
            last: AtomicI64::new(last),
        }
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> OrderId {
        let candidate = now.timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return OrderId(next.to_string()),
                Err(actual) => last = actual,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPrefix {
    Photo,
    Color,
    BlackAndWhite,
    Generic,
}

impl TokenPrefix {
    pub fn for_options(options: &OrderOptions) -> Self {
        match options {
            OrderOptions::Photo(_) => TokenPrefix::Photo,
            OrderOptions::Document(doc) => match doc.print_type {
                PrintType::Color => TokenPrefix::Color,
                PrintType::Bw => TokenPrefix::BlackAndWhite,
                PrintType::Unspecified => TokenPrefix::Generic,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPrefix::Photo => "P",
            TokenPrefix::Color => "C",
            TokenPrefix::BlackAndWhite => "B",
            TokenPrefix::Generic => "ORD",
        }
    }
}

impl FromStr for TokenPrefix {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(TokenPrefix::Photo),
            "C" => Ok(TokenPrefix::Color),
            "B" => Ok(TokenPrefix::BlackAndWhite),
            "ORD" => Ok(TokenPrefix::Generic),
            other => Err(ShopError::InternalError(
                format!("Unknown token prefix: {other}").into(),
            )),
        }
    }
}

/// Human-facing pickup token, rendered as `<prefix>-<number>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub prefix: TokenPrefix,
    pub number: u64,
}

impl Token {
    pub fn new(prefix: TokenPrefix, number: u64) -> Self {
        Self { prefix, number }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix.as_str(), self.number)
    }
}

impl FromStr for Token {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, number) = s.split_once('-').ok_or_else(|| {
            ShopError::InternalError(format!("Malformed token: {s}").into())
        })?;
        let number = number
            .parse()
            .map_err(|_| ShopError::InternalError(format!("Malformed token: {s}").into()))?;
        Ok(Self::new(prefix.parse()?, number))
    }
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Issues pickup numbers.
///
/// The counter is shared by every creation path of a store, so concurrent
/// creations always receive distinct, increasing numbers.
#[derive(Debug)]
pub struct TokenSequence {
    next: AtomicU64,
}

impl Default for TokenSequence {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(FIRST_TOKEN_NUMBER),
        }
    }
}

impl TokenSequence {
    /// Continues numbering after the orders already on record.
    pub fn resume<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut count = 0u64;
        let mut highest = None;
        for order in orders {
            count += 1;
            highest = highest.max(Some(order.token_id.number));
        }
        let by_count = FIRST_TOKEN_NUMBER + count;
        let next = highest.map_or(by_count, |h| by_count.max(h + 1));
        Self {
            next: AtomicU64::new(next),
        }
    }

    pub fn next_number(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Processing,
    Ready,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
        }
    }

    /// The following fulfillment step, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            OrderStatus::New => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Ready),
            OrderStatus::Ready => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "processing" => Ok(OrderStatus::Processing),
            "ready" => Ok(OrderStatus::Ready),
            other => Err(ShopError::InvalidStatus(other.to_string())),
        }
    }
}

/// How strictly admin status changes are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransitionPolicy {
    /// Any known status may be set, in any order.
    #[default]
    Lenient,
    /// Only the single forward step `new -> processing -> ready`.
    Strict,
}

impl TransitionPolicy {
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), ShopError> {
        match self {
            TransitionPolicy::Lenient => Ok(()),
            TransitionPolicy::Strict if from.next() == Some(to) => Ok(()),
            TransitionPolicy::Strict => Err(ShopError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

/// Reference to a customer upload held by the file storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_path: String,
    pub file_name: String,
}

impl UploadedFile {
    pub fn new(file_path: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            file_name: file_name.into(),
        }
    }
}

/// A paid order as persisted by the order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub token_id: Token,
    pub timestamp: DateTime<Utc>,
    pub details: String,
    pub phone: String,
    #[serde(flatten)]
    pub file: UploadedFile,
    pub status: OrderStatus,
    pub price: Decimal,
}

/// An order whose payment was confirmed but which has no identity yet.
///
/// The order store turns it into an [`Order`] by assigning the id and the
/// pickup number in the same step as the insert.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub prefix: TokenPrefix,
    pub timestamp: DateTime<Utc>,
    pub details: String,
    pub phone: String,
    pub file: UploadedFile,
    pub price: Decimal,
}

impl PendingOrder {
    /// Every new order starts in [`OrderStatus::New`].
    pub fn into_order(self, id: OrderId, number: u64) -> Order {
        Order {
            id,
            token_id: Token::new(self.prefix, number),
            timestamp: self.timestamp,
            details: self.details,
            phone: self.phone,
            file: self.file,
            status: OrderStatus::New,
            price: self.price,
        }
    }
}
