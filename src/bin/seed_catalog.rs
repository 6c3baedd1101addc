//! Price catalog seeder
//!
//! Populates the price catalog with the full item set: Island buildings and
//! resources, Britain goods with their dynamic-price parameters, ships,
//! gears and standing fees. Run with `--clear` to wipe the catalog first.
//!
//! Usage: cargo run --bin seed_catalog [-- --clear]

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use colony_ledger::store::{CatalogEntry, CatalogRepository, Category};
use colony_ledger::{BuildingKind, Config};

struct Item {
    name: &'static str,
    category: Category,
    base_price: i64,
    pmax: Option<i64>,
    n_for_drop: Option<i32>,
    t_recovery_secs: Option<i32>,
    building_kind: Option<BuildingKind>,
    income_per_minute: Option<i64>,
    description: &'static str,
}

const fn item(name: &'static str, category: Category, base_price: i64, description: &'static str) -> Item {
    Item {
        name,
        category,
        base_price,
        pmax: None,
        n_for_drop: None,
        t_recovery_secs: None,
        building_kind: None,
        income_per_minute: None,
        description,
    }
}

const fn good(
    name: &'static str,
    pmax: i64,
    n_for_drop: i32,
    t_recovery_secs: i32,
    description: &'static str,
) -> Item {
    Item {
        name,
        category: Category::Goods,
        base_price: pmax,
        pmax: Some(pmax),
        n_for_drop: Some(n_for_drop),
        t_recovery_secs: Some(t_recovery_secs),
        building_kind: None,
        income_per_minute: None,
        description,
    }
}

const fn building(
    name: &'static str,
    base_price: i64,
    kind: BuildingKind,
    income_per_minute: i64,
    description: &'static str,
) -> Item {
    Item {
        name,
        category: Category::Building,
        base_price,
        pmax: None,
        n_for_drop: None,
        t_recovery_secs: None,
        building_kind: Some(kind),
        income_per_minute: Some(income_per_minute),
        description,
    }
}

fn catalog() -> Vec<Item> {
    use BuildingKind::{Business, Factory, Other, Residential};

    vec![
        // Island factories
        building("Small factory", 500, Factory, 0, "Small production floor for processing resources."),
        building("Medium factory", 1000, Factory, 0, "Mid-sized production floor, faster processing."),
        building("Large factory", 2000, Factory, 0, "Large production complex, high throughput."),
        building("Giant factory", 5000, Factory, 0, "Huge industrial complex, maximum throughput."),
        // Island businesses with passive income per minute
        building("Small shop", 300, Business, 2, "A modest trading stall. Earns 2 per minute."),
        building("Restaurant", 800, Business, 5, "A cosy place with good food. Earns 5 per minute."),
        building("Tavern", 600, Business, 4, "A favourite haunt of sailors. Earns 4 per minute."),
        building("Hotel", 1200, Business, 8, "Comfortable rooms for travellers. Earns 8 per minute."),
        building("Market hall", 1500, Business, 10, "The centre of trade. Earns 10 per minute."),
        // Housing
        building("Small house", 200, Residential, 0, "A single-family home. Houses 5."),
        building("Large house", 400, Residential, 0, "A roomy multi-family house. Houses 10."),
        building("Mansion", 1000, Residential, 0, "A luxurious estate for the gentry. Houses 25."),
        building("Tenement", 600, Residential, 0, "A multi-apartment block. Houses 15."),
        // Storage
        building("Small warehouse", 250, Other, 0, "A small store. +100 capacity."),
        building("Large warehouse", 600, Other, 0, "A roomy store. +250 capacity."),
        building("Port warehouse", 1200, Other, 0, "An enormous dockside store. +500 capacity."),
        // Farms
        building("Small farm", 400, Factory, 0, "Produces 5 units of food per hour."),
        building("Plantation", 900, Factory, 0, "Produces 12 units of produce per hour."),
        building("Livestock farm", 700, Factory, 0, "Produces 8 units of meat per hour."),
        // Island resources
        item("Coffee beans", Category::Resource, 10, "Aromatic beans for brewing coffee."),
        item("Cocoa beans", Category::Resource, 12, "Raw material for chocolate."),
        item("Tobacco", Category::Resource, 15, "Leaf tobacco for cigar making."),
        item("Sugar cane", Category::Resource, 8, "Sweet cane for sugar and rum."),
        item("Timber", Category::Resource, 5, "Construction lumber."),
        item("Stone", Category::Resource, 7, "Durable building material."),
        item("Iron ore", Category::Resource, 20, "Raw material for metalwork."),
        item("Coal", Category::Resource, 15, "Fuel for factories and steam engines."),
        item("Cotton", Category::Resource, 6, "Raw material for cloth."),
        // Britain goods with dynamic prices
        good("Cloth", 20, 5, 300, "Quality cloth for tailoring."),
        good("Rum", 15, 5, 300, "A strong drink, beloved by sailors."),
        good("Tools", 25, 5, 300, "Quality tools for every trade."),
        good("Weapons", 30, 5, 300, "Reliable arms for defence and offence."),
        good("Luxury goods", 50, 3, 600, "Expensive wares for the gentry."),
        good("Spices", 40, 4, 450, "Exotic spices from the colonies."),
        // Ships
        item("Schooner", Category::Ship, 500, "A small, fast trading vessel."),
        item("Brig", Category::Ship, 1000, "A mid-sized merchant ship."),
        item("Frigate", Category::Ship, 2000, "A warship with a good turn of speed."),
        item("Battleship", Category::Ship, 5000, "A powerful ship of the line."),
        item("Steam frigate", Category::Ship, 8000, "A modern steam-driven warship."),
        item("Merchantman", Category::Ship, 3000, "A large cargo vessel."),
        // Factory gears
        item("Gear", Category::Gear, 2, "A part for machines and factories."),
        item("Heavy gear", Category::Gear, 5, "A reinforced gear for heavy machinery."),
        // Fees and fines
        item("Privateer fee", Category::Other, 50, "The recurring fee for a privateer license."),
        item("Violation fine", Category::Fine, 100, "The standard fine for breaking the rules."),
        item("Court fee", Category::Fine, 50, "The fee for a court hearing."),
        item("Resource processing", Category::Processing, 5, "The cost of processing one unit at a factory."),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_catalog=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;

    if std::env::args().any(|arg| arg == "--clear") {
        tracing::warn!("Clearing existing catalog entries...");
        sqlx::query("DELETE FROM price_catalog").execute(&pool).await?;
    }

    let repo = CatalogRepository::new(pool.clone());
    let items = catalog();
    let total = items.len();

    for item in items {
        let entry = CatalogEntry {
            name: item.name.to_string(),
            category: item.category,
            base_price: Decimal::from(item.base_price),
            pmax: item.pmax.map(Decimal::from),
            n_for_drop: item.n_for_drop,
            t_recovery_secs: item.t_recovery_secs,
            building_kind: item.building_kind,
            income_per_minute: item.income_per_minute.map(Decimal::from),
            description: item.description.to_string(),
        };
        repo.upsert(&entry).await?;
        tracing::info!(name = item.name, category = item.category.as_str(), "Seeded");
    }

    tracing::info!("Catalog seeding complete: {} entries", total);
    pool.close().await;

    Ok(())
}
