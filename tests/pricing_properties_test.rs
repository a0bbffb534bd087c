use printdesk::domain::options::{Count, OrderOptions};
use printdesk::domain::pricing::compute_price;
use printdesk::domain::rate_card::RateCard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

mod common;

fn random_card(rng: &mut impl Rng) -> RateCard {
    let mut rate = |low: i64, high: i64| Decimal::new(rng.gen_range(low..=high), 1);
    RateCard {
        bw: rate(0, 50),
        color: rate(0, 200),
        first_page_color: rate(0, 100),
        single_sided: rate(-20, 20),
        double_sided: rate(-50, 10),
        spiral: rate(0, 500),
        photo_4x6: rate(0, 300),
        passport: rate(0, 800),
        rush: rate(0, 300),
    }
}

#[test]
fn test_price_never_negative() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2_000 {
        let card = random_card(&mut rng);
        let options = common::random_options(&mut rng);
        let price = compute_price(&options, &card);
        assert!(price >= Decimal::ZERO, "{options:?} priced {price} with {card:?}");
    }
}

#[test]
fn test_price_monotonic_in_copies() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1_000 {
        let card = random_card(&mut rng);
        let options = common::random_options(&mut rng);
        let more = match options.clone() {
            OrderOptions::Photo(mut photo) => {
                photo.copies = Count::from(photo.copies.get() + 1);
                OrderOptions::Photo(photo)
            }
            OrderOptions::Document(mut doc) => {
                doc.copies = Count::from(doc.copies.get() + 1);
                OrderOptions::Document(doc)
            }
        };
        assert!(compute_price(&more, &card) >= compute_price(&options, &card));
    }
}

#[test]
fn test_price_monotonic_in_pages_with_non_negative_rates() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..1_000 {
        let card = RateCard {
            single_sided: Decimal::ZERO,
            double_sided: Decimal::ZERO,
            ..random_card(&mut rng)
        };
        let doc = common::random_document(&mut rng);
        let more = printdesk::domain::options::DocumentOptions {
            pages: Count::from(doc.pages.get() + rng.gen_range(1..=10)),
            ..doc.clone()
        };
        assert!(
            compute_price(&OrderOptions::Document(more), &card)
                >= compute_price(&OrderOptions::Document(doc), &card)
        );
    }
}

#[test]
fn test_copies_scale_price_linearly() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..500 {
        let card = random_card(&mut rng);
        let mut doc = common::random_document(&mut rng);
        doc.copies = Count::ONE;
        let single = compute_price(&OrderOptions::Document(doc.clone()), &card);

        let n = rng.gen_range(2..=12u32);
        doc.copies = Count::from(n);
        let many = compute_price(&OrderOptions::Document(doc), &card);
        assert_eq!(many, single * Decimal::from(n));
    }
}
