//! Price catalog repository
//!
//! Named price entries by category: static base prices for resources, ships,
//! gears, fees and fines, the dynamic-price parameters for Britain goods,
//! and the explicit kind/income data for constructible buildings.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::engine::BuildingKind;

use super::StoreError;

/// Catalog entry categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Resource,
    Building,
    Processing,
    Goods,
    Ship,
    Gear,
    Fine,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Resource => "resource",
            Category::Building => "building",
            Category::Processing => "processing",
            Category::Goods => "goods",
            Category::Ship => "ship",
            Category::Gear => "gear",
            Category::Fine => "fine",
            Category::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resource" => Some(Category::Resource),
            "building" => Some(Category::Building),
            "processing" => Some(Category::Processing),
            "goods" => Some(Category::Goods),
            "ship" => Some(Category::Ship),
            "gear" => Some(Category::Gear),
            "fine" => Some(Category::Fine),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

/// One priced item.
///
/// `pmax`/`n_for_drop`/`t_recovery_secs` are set only for goods;
/// `building_kind`/`income_per_minute` only for buildings.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub category: Category,
    pub base_price: Decimal,
    pub pmax: Option<Decimal>,
    pub n_for_drop: Option<i32>,
    pub t_recovery_secs: Option<i32>,
    pub building_kind: Option<BuildingKind>,
    pub income_per_minute: Option<Decimal>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

type CatalogRow = (
    String,
    String,
    Decimal,
    Option<Decimal>,
    Option<i32>,
    Option<i32>,
    Option<String>,
    Option<Decimal>,
    String,
);

fn entry_from_row(row: CatalogRow) -> Result<CatalogEntry, StoreError> {
    let (name, category, base_price, pmax, n_for_drop, t_recovery_secs, kind, income, description) =
        row;

    let category = Category::parse(&category)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown catalog category {category}")))?;
    let building_kind = kind
        .map(|k| {
            BuildingKind::parse(&k)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown building kind {k}")))
        })
        .transpose()?;

    Ok(CatalogEntry {
        name,
        category,
        base_price,
        pmax,
        n_for_drop,
        t_recovery_secs,
        building_kind,
        income_per_minute: income,
        description,
    })
}

const SELECT_COLS: &str = "name, category, base_price, pmax, n_for_drop, t_recovery_secs, \
                           building_kind, income_per_minute, description";

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Exact lookup by name.
    pub async fn get(&self, name: &str) -> Result<Option<CatalogEntry>, StoreError> {
        let row: Option<CatalogRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM price_catalog WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(entry_from_row).transpose()
    }

    /// Lookup by name within one category.
    pub async fn get_in_category(
        &self,
        name: &str,
        category: Category,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        let row: Option<CatalogRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM price_catalog WHERE name = $1 AND category = $2"
        ))
        .bind(name)
        .bind(category.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(entry_from_row).transpose()
    }

    /// All entries of one category, alphabetical.
    pub async fn list_category(&self, category: Category) -> Result<Vec<CatalogEntry>, StoreError> {
        let rows: Vec<CatalogRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM price_catalog WHERE category = $1 ORDER BY name"
        ))
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(entry_from_row).collect()
    }

    /// Insert or refresh one entry. Used by the seeding binary.
    pub async fn upsert(&self, entry: &CatalogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO price_catalog (
                name, category, base_price, pmax, n_for_drop, t_recovery_secs,
                building_kind, income_per_minute, description, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (name) DO UPDATE SET
                category = EXCLUDED.category,
                base_price = EXCLUDED.base_price,
                pmax = EXCLUDED.pmax,
                n_for_drop = EXCLUDED.n_for_drop,
                t_recovery_secs = EXCLUDED.t_recovery_secs,
                building_kind = EXCLUDED.building_kind,
                income_per_minute = EXCLUDED.income_per_minute,
                description = EXCLUDED.description,
                updated_at = NOW()
            "#,
        )
        .bind(&entry.name)
        .bind(entry.category.as_str())
        .bind(entry.base_price)
        .bind(entry.pmax)
        .bind(entry.n_for_drop)
        .bind(entry.t_recovery_secs)
        .bind(entry.building_kind.map(|k| k.as_str()))
        .bind(entry.income_per_minute)
        .bind(&entry.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for c in [
            Category::Resource,
            Category::Building,
            Category::Processing,
            Category::Goods,
            Category::Ship,
            Category::Gear,
            Category::Fine,
            Category::Other,
        ] {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        assert_eq!(Category::parse("weapon"), None);
    }
}
