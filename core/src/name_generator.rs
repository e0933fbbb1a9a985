//! Deterministic company and contact profiles for demo customers.
//!
//! Same RNG stream in, same profiles out.

use crate::rng::DeskRng;

pub struct NameGenerator;

impl NameGenerator {
    /// "Given Family", always exactly two words.
    pub fn contact_name(rng: &mut DeskRng) -> String {
        format!("{} {}", rng.pick(GIVEN_NAMES), rng.pick(FAMILY_NAMES))
    }

    /// "Northwind Analytics Ltd" style company name.
    pub fn company_name(rng: &mut DeskRng) -> String {
        format!("{} {} {}", rng.pick(COMPANY_STEMS), rng.pick(COMPANY_TRADES), rng.pick(COMPANY_FORMS))
    }

    /// given.family@stem-trade.example, lower-cased.
    pub fn email(contact_name: &str, company_name: &str) -> String {
        let local = contact_name.split_whitespace().collect::<Vec<_>>().join(".");
        let domain = company_name
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join("-");
        format!("{local}@{domain}.example").to_lowercase()
    }

    pub fn phone(rng: &mut DeskRng) -> String {
        format!(
            "+1 {:03} {:03} {:04}",
            200 + rng.next_u64_below(800),
            rng.next_u64_below(1000),
            rng.next_u64_below(10_000),
        )
    }

    pub fn billing_address(rng: &mut DeskRng) -> String {
        format!(
            "{} {}, {}",
            1 + rng.next_u64_below(999),
            rng.pick(STREETS),
            rng.pick(CITIES),
        )
    }
}

const GIVEN_NAMES: &[&str] = &[
    "Amara", "Bruno", "Chen", "Dalia", "Elliot", "Farah", "Gustav", "Hana", "Idris", "Jonas",
    "Keiko", "Luca", "Maya", "Nikolai", "Olga", "Priya", "Quentin", "Rosa", "Santiago", "Tara",
    "Umar", "Vera", "Wei", "Ximena", "Yusuf", "Zoe",
];

const FAMILY_NAMES: &[&str] = &[
    "Abara", "Bergström", "Castillo", "Dubois", "Eriksen", "Fischer", "Gallagher", "Haddad",
    "Ito", "Jovanovic", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov",
    "Quinn", "Rossi", "Schneider", "Tanaka", "Unger", "Varga", "Whitfield", "Yilmaz", "Zhou",
];

const COMPANY_STEMS: &[&str] = &[
    "Northwind", "Bluepeak", "Ironleaf", "Silverline", "Brightwater", "Redwood", "Cobalt",
    "Harbor", "Summit", "Kestrel", "Meridian", "Lumen", "Orchard", "Granite", "Tidewell",
];

const COMPANY_TRADES: &[&str] = &[
    "Analytics", "Logistics", "Studios", "Health", "Robotics", "Foods", "Energy", "Software",
    "Media", "Labs", "Freight", "Outfitters",
];

const COMPANY_FORMS: &[&str] = &["Inc", "Ltd", "LLC", "GmbH", "Group", "Co"];

const STREETS: &[&str] = &[
    "Market Street", "Elm Avenue", "Harbour Road", "King's Way", "Station Lane", "Mill Road",
    "Bridge Street", "Park Terrace",
];

const CITIES: &[&str] = &[
    "Portland", "Leeds", "Lyon", "Osaka", "Toronto", "Hamburg", "Austin", "Dublin",
];
