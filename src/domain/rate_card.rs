use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Identifies one chargeable dimension of the rate card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateKey {
    BlackAndWhitePage,
    ColorPage,
    FirstPageColor,
    SingleSided,
    DoubleSided,
    Spiral,
    Photo4x6,
    Passport,
    Rush,
}

/// The shop's current price-per-unit table.
///
/// Every key is a named field, so a lookup can never miss. Keys absent from
/// a submitted card fall back to the shop defaults. Layout rates may be
/// negative (double-sided printing is a discount); the price calculator
/// clamps the final amount instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateCard {
    pub bw: Decimal,
    pub color: Decimal,
    pub first_page_color: Decimal,
    pub single_sided: Decimal,
    pub double_sided: Decimal,
    pub spiral: Decimal,
    #[serde(rename = "photo_4x6")]
    pub photo_4x6: Decimal,
    pub passport: Decimal,
    pub rush: Decimal,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            bw: dec!(2),
            color: dec!(10),
            first_page_color: dec!(8),
            single_sided: dec!(0),
            double_sided: dec!(-0.5),
            spiral: dec!(30),
            photo_4x6: dec!(15),
            passport: dec!(50),
            rush: dec!(20),
        }
    }
}

impl RateCard {
    pub fn rate(&self, key: RateKey) -> Decimal {
        match key {
            RateKey::BlackAndWhitePage => self.bw,
            RateKey::ColorPage => self.color,
            RateKey::FirstPageColor => self.first_page_color,
            RateKey::SingleSided => self.single_sided,
            RateKey::DoubleSided => self.double_sided,
            RateKey::Spiral => self.spiral,
            RateKey::Photo4x6 => self.photo_4x6,
            RateKey::Passport => self.passport,
            RateKey::Rush => self.rush,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_card_uses_stored_keys() {
        let json = serde_json::to_value(RateCard::default()).unwrap();
        for key in [
            "bw",
            "color",
            "firstPageColor",
            "singleSided",
            "doubleSided",
            "spiral",
            "photo_4x6",
            "passport",
            "rush",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_partial_card_falls_back_to_defaults() {
        let card: RateCard = serde_json::from_str(r#"{"bw": 3, "passport": "45.5"}"#).unwrap();
        assert_eq!(card.bw, dec!(3));
        assert_eq!(card.passport, dec!(45.5));
        assert_eq!(card.spiral, dec!(30));
        assert_eq!(card.double_sided, dec!(-0.5));
    }

    #[test]
    fn test_rate_lookup() {
        let card = RateCard::default();
        assert_eq!(card.rate(RateKey::ColorPage), dec!(10));
        assert_eq!(card.rate(RateKey::Rush), dec!(20));
    }
}
