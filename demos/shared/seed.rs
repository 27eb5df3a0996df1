//! Demo catalog shared by the demo binaries

use catalog::prelude::*;

const TITLES: &[&str] = &[
    "Portal",
    "Half-Life 2",
    "Hades",
    "Celeste",
    "Stardew Valley",
    "Factorio",
    "Outer Wilds",
    "Baba Is You",
    "Hollow Knight",
    "Into the Breach",
    "Slay the Spire",
    "Disco Elysium",
];

/// A few dozen games and DLCs with varied prices and discounts
pub fn demo_catalog() -> Vec<Product> {
    let mut products = Vec::new();
    let mut id = 1;

    for (i, title) in TITLES.iter().enumerate() {
        let price = 4.99 + (i as f64) * 2.5;
        let discount = if i % 3 == 0 { 20 } else { 0 };
        products.push(Product::new(id, *title, "game", price, discount));
        id += 1;

        for dlc in ["Soundtrack", "Artbook"] {
            products.push(Product::new(id, format!("{} {}", title, dlc), "dlc", 2.99, 0));
            id += 1;
        }
    }

    products
}
