use rust_decimal::Decimal;

use super::options::{Binding, OrderOptions};
use super::rate_card::{RateCard, RateKey};

/// Computes the total price of an order against a rate card.
///
/// Pricing never fails and never goes negative. Per-copy price is built
/// first (pages, surcharges, spiral binding and rush all count once per
/// copy), clamped at zero and then multiplied by the number of copies.
/// Arithmetic saturates at the bounds of [`Decimal`].
pub fn compute_price(options: &OrderOptions, rates: &RateCard) -> Decimal {
    let rate = |key: Option<RateKey>| key.map(|k| rates.rate(k)).unwrap_or(Decimal::ZERO);

    let mut copy_price = match options {
        OrderOptions::Photo(photo) => rate(photo.service.rate_key()),
        OrderOptions::Document(doc) => {
            let pages = Decimal::from(doc.pages.get());
            let page_cost =
                rate(doc.print_type.rate_key()).saturating_add(rate(doc.layout.rate_key()));
            let mut price = pages.saturating_mul(page_cost);
            if doc.wants_first_page_color() {
                price = price.saturating_add(rates.rate(RateKey::FirstPageColor));
            }
            if doc.binding == Binding::Spiral {
                price = price.saturating_add(rates.rate(RateKey::Spiral));
            }
            price
        }
    };

    if options.rush() {
        copy_price = copy_price.saturating_add(rates.rate(RateKey::Rush));
    }

    copy_price
        .max(Decimal::ZERO)
        .saturating_mul(Decimal::from(options.copies().get()))
}
