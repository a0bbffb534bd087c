use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use std::fmt;

use super::rate_card::RateKey;

/// A page or copy count that is always at least one.
///
/// Deserialization never fails: integers, floats (truncated), numeric strings
/// (leading integer) and anything else are accepted, and whatever does not
/// yield a value of one or more becomes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Count(u32);

impl Count {
    pub const ONE: Self = Self(1);

    pub fn new(value: i64) -> Self {
        if value < 1 {
            Self::ONE
        } else {
            Self(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Count {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<u32> for Count {
    fn from(value: u32) -> Self {
        Self::new(i64::from(value))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Int(i64),
    Float(f64),
    Text(String),
    #[allow(dead_code)]
    Other(serde::de::IgnoredAny),
}

/// Reads the leading signed integer of a string, ignoring what follows.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let count = match RawCount::deserialize(deserializer)? {
            RawCount::Int(n) => Count::new(n),
            RawCount::Float(f) if f.is_finite() => Count::new(f.trunc() as i64),
            RawCount::Text(s) => leading_integer(&s).map(Count::new).unwrap_or_default(),
            _ => Count::ONE,
        };
        Ok(count)
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrintType {
    #[default]
    #[serde(rename = "bw")]
    Bw,
    #[serde(rename = "color")]
    Color,
    #[serde(other, rename = "unspecified")]
    Unspecified,
}

impl PrintType {
    pub fn rate_key(&self) -> Option<RateKey> {
        match self {
            PrintType::Bw => Some(RateKey::BlackAndWhitePage),
            PrintType::Color => Some(RateKey::ColorPage),
            PrintType::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    #[serde(rename = "singleSided")]
    SingleSided,
    #[serde(rename = "doubleSided")]
    DoubleSided,
    #[serde(other, rename = "unspecified")]
    Unspecified,
}

impl Layout {
    pub fn rate_key(&self) -> Option<RateKey> {
        match self {
            Layout::SingleSided => Some(RateKey::SingleSided),
            Layout::DoubleSided => Some(RateKey::DoubleSided),
            Layout::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Spiral,
    #[default]
    #[serde(other)]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoService {
    #[serde(rename = "photo_4x6")]
    Photo4x6,
    #[serde(rename = "passport")]
    Passport,
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl PhotoService {
    pub fn rate_key(&self) -> Option<RateKey> {
        match self {
            PhotoService::Photo4x6 => Some(RateKey::Photo4x6),
            PhotoService::Passport => Some(RateKey::Passport),
            PhotoService::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOptions {
    #[serde(default)]
    pub pages: Count,
    #[serde(default)]
    pub copies: Count,
    #[serde(default)]
    pub print_type: PrintType,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub binding: Binding,
    #[serde(default)]
    pub first_page_color: bool,
    #[serde(default)]
    pub rush: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            pages: Count::ONE,
            copies: Count::ONE,
            print_type: PrintType::Bw,
            layout: Layout::SingleSided,
            binding: Binding::None,
            first_page_color: false,
            rush: false,
        }
    }
}

impl DocumentOptions {
    /// The first-page colour surcharge only applies to black-and-white jobs.
    pub fn wants_first_page_color(&self) -> bool {
        self.first_page_color && self.print_type == PrintType::Bw
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoOptions {
    pub service: PhotoService,
    #[serde(default)]
    pub copies: Count,
    #[serde(default)]
    pub rush: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    Document,
    Photo,
}

/// Print options submitted by a customer.
///
/// On the wire a truthy `service` field (a non-empty string, a non-zero
/// number, `true`, an array or an object) selects a photo order; everything
/// else is a document order. A truthy service that is not a string is read
/// as an unknown service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrderOptions {
    Photo(PhotoOptions),
    Document(DocumentOptions),
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl<'de> Deserialize<'de> for OrderOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = Value::deserialize(deserializer)?;
        let photo = value.get("service").is_some_and(is_truthy);

        let options = if photo {
            if let Some(service) = value.get_mut("service").filter(|s| !s.is_string()) {
                *service = Value::from("unknown");
            }
            PhotoOptions::deserialize(value).map(OrderOptions::Photo)
        } else {
            DocumentOptions::deserialize(value).map(OrderOptions::Document)
        };
        options.map_err(de::Error::custom)
    }
}

impl OrderOptions {
    pub fn kind(&self) -> ProductKind {
        match self {
            OrderOptions::Photo(_) => ProductKind::Photo,
            OrderOptions::Document(_) => ProductKind::Document,
        }
    }

    pub fn copies(&self) -> Count {
        match self {
            OrderOptions::Photo(photo) => photo.copies,
            OrderOptions::Document(doc) => doc.copies,
        }
    }

    pub fn rush(&self) -> bool {
        match self {
            OrderOptions::Photo(photo) => photo.rush,
            OrderOptions::Document(doc) => doc.rush,
        }
    }
}

/// Renders the human-readable order summary stored on the order.
impl fmt::Display for OrderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderOptions::Photo(photo) => match photo.service {
                PhotoService::Passport => write!(f, "Passport Photos")?,
                _ => write!(f, "4x6 Print")?,
            },
            OrderOptions::Document(doc) => {
                write!(f, "{} pages, ", doc.pages)?;
                if doc.wants_first_page_color() {
                    write!(f, "B&W (First Page Color), ")?;
                } else {
                    match doc.print_type {
                        PrintType::Bw => write!(f, "BW, ")?,
                        PrintType::Color => write!(f, "COLOR, ")?,
                        PrintType::Unspecified => {}
                    }
                }
                match doc.layout {
                    Layout::DoubleSided => write!(f, "Double-Sided")?,
                    _ => write!(f, "Single-Sided")?,
                }
                if doc.binding == Binding::Spiral {
                    write!(f, ", Spiral Binding")?;
                }
            }
        }

        let copies = self.copies().get();
        let noun = if copies > 1 { "copies" } else { "copy" };
        write!(f, " ({copies} {noun})")?;
        if self.rush() {
            write!(f, ", RUSH ORDER")?;
        }
        Ok(())
    }
}
