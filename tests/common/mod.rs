#![allow(dead_code)]

use assert_cmd::cargo_bin;
use printdesk::domain::options::{
    Binding, Count, DocumentOptions, Layout, OrderOptions, PhotoOptions, PhotoService, PrintType,
};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A `printdesk` invocation isolated to `dir`: its own database and upload
/// folder, dummy payments and lenient transitions.
pub fn printdesk(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("printdesk"));
    cmd.env("PRINTDESK_DATA", dir.join("db.json"))
        .env("PRINTDESK_UPLOADS", dir.join("uploads").join("orders"))
        .env_remove("PRINTDESK_DB_PATH")
        .env_remove("PRINTDESK_PAYMENT_SECRET")
        .env_remove("PRINTDESK_TRANSITIONS")
        .env("RUST_LOG", "info");
    cmd
}

/// Writes a small stand-in document to print.
pub fn sample_upload(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\n%sample\n").expect("Failed to write sample upload");
    path
}

/// Pulls the `tokenId` out of an order printed as JSON.
pub fn token_of(stdout: &[u8]) -> String {
    let order: serde_json::Value = serde_json::from_slice(stdout).expect("order JSON on stdout");
    order["tokenId"].as_str().unwrap_or_default().to_string()
}

pub fn id_of(stdout: &[u8]) -> String {
    let order: serde_json::Value = serde_json::from_slice(stdout).expect("order JSON on stdout");
    order["id"].as_str().unwrap_or_default().to_string()
}

/// Random, well-formed document options.
pub fn random_document(rng: &mut impl Rng) -> DocumentOptions {
    DocumentOptions {
        pages: Count::from(rng.gen_range(1..=200)),
        copies: Count::from(rng.gen_range(1..=20)),
        print_type: if rng.gen_bool(0.5) {
            PrintType::Bw
        } else {
            PrintType::Color
        },
        layout: if rng.gen_bool(0.5) {
            Layout::SingleSided
        } else {
            Layout::DoubleSided
        },
        binding: if rng.gen_bool(0.3) {
            Binding::Spiral
        } else {
            Binding::None
        },
        first_page_color: rng.gen_bool(0.3),
        rush: rng.gen_bool(0.2),
    }
}

pub fn random_options(rng: &mut impl Rng) -> OrderOptions {
    if rng.gen_bool(0.25) {
        OrderOptions::Photo(PhotoOptions {
            service: if rng.gen_bool(0.5) {
                PhotoService::Passport
            } else {
                PhotoService::Photo4x6
            },
            copies: Count::from(rng.gen_range(1..=20)),
            rush: rng.gen_bool(0.2),
        })
    } else {
        OrderOptions::Document(random_document(rng))
    }
}
