//! Building Handler
//!
//! Island construction, profit collection against the Accrual Engine, and
//! demolition. Building kind and income rate come from the catalog entry at
//! construction time.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{ActionKind, ActionLogBuilder, ActionLogService};
use crate::domain::ModeratorContext;
use crate::engine::{Building, BuildingKind};
use crate::error::AppError;
use crate::store::{BuildingRepository, CatalogRepository, Category};

use super::{
    CollectProfitCommand, ConstructCommand, ConstructResult, DemolishCommand, DemolitionResult,
    ProfitResult,
};

/// Handler for building construction, profit and demolition
pub struct BuildingHandler {
    buildings: BuildingRepository,
    catalog: CatalogRepository,
    log: ActionLogService,
}

impl BuildingHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            buildings: BuildingRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            log: ActionLogService::new(pool),
        }
    }

    /// Construct a catalog building for a player.
    pub async fn construct(
        &self,
        command: ConstructCommand,
        context: &ModeratorContext,
    ) -> Result<ConstructResult, AppError> {
        let entry = self
            .catalog
            .get_in_category(&command.building, Category::Building)
            .await?
            .ok_or_else(|| AppError::CatalogNotFound(command.building.clone()))?;

        let kind = entry.building_kind.unwrap_or(BuildingKind::Other);
        let income_per_minute = entry.income_per_minute.unwrap_or(Decimal::ZERO);

        let building = Building::construct(
            Uuid::new_v4(),
            &entry.name,
            kind,
            &command.player_id,
            &context.author,
            entry.base_price,
            income_per_minute,
            Utc::now(),
        );
        self.buildings.insert(&building).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::Building)
                    .player(&command.player_id)
                    .detail("building", &building.building_name)
                    .detail("kind", kind.as_str())
                    .detail("cost", building.cost),
                context,
            )
            .await?;

        Ok(ConstructResult {
            building_id: building.id,
            building_name: building.building_name,
            kind: kind.as_str().to_string(),
            player_id: command.player_id,
            cost: building.cost,
            income_per_minute,
        })
    }

    /// Collect accrued profit. Zero accrual is reported, not logged.
    pub async fn collect(
        &self,
        command: CollectProfitCommand,
        context: &ModeratorContext,
    ) -> Result<ProfitResult, AppError> {
        let mut building = self
            .buildings
            .get(command.building_id)
            .await?
            .ok_or_else(|| AppError::BuildingNotFound(command.building_id.to_string()))?;

        let profit = building.collect(Utc::now());
        let collected = profit > Decimal::ZERO;

        if collected {
            self.buildings.save_profit_timer(&building).await?;

            self.log
                .log(
                    ActionLogBuilder::new(ActionKind::Profit)
                        .player(&building.owner_id)
                        .detail("business", &building.building_name)
                        .detail("business_id", building.id)
                        .detail("profit", profit)
                        .detail("income_per_minute", building.income_per_minute),
                    context,
                )
                .await?;
        }

        Ok(ProfitResult {
            building_id: building.id,
            building_name: building.building_name,
            owner_id: building.owner_id,
            profit,
            income_per_minute: building.income_per_minute,
            collected,
        })
    }

    /// Read-only accrual query for display polling.
    pub async fn accrued(&self, building_id: Uuid) -> Result<ProfitResult, AppError> {
        let building = self
            .buildings
            .get(building_id)
            .await?
            .ok_or_else(|| AppError::BuildingNotFound(building_id.to_string()))?;

        let profit = building.accrued_profit(Utc::now());

        Ok(ProfitResult {
            building_id: building.id,
            building_name: building.building_name,
            owner_id: building.owner_id,
            profit,
            income_per_minute: building.income_per_minute,
            collected: false,
        })
    }

    /// Demolish a building, reporting any uncollected profit.
    pub async fn demolish(
        &self,
        command: DemolishCommand,
        context: &ModeratorContext,
    ) -> Result<DemolitionResult, AppError> {
        let building = self
            .buildings
            .get(command.building_id)
            .await?
            .ok_or_else(|| AppError::BuildingNotFound(command.building_id.to_string()))?;

        let accrued = building.accrued_profit(Utc::now());
        self.buildings.delete(building.id).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::Demolition)
                    .player(&command.demolisher_id)
                    .detail("building", &building.building_name)
                    .detail("building_kind", building.kind.as_str())
                    .detail("owner", &building.owner_id)
                    .detail("accrued_profit", accrued),
                context,
            )
            .await?;

        Ok(DemolitionResult {
            building_name: building.building_name,
            kind: building.kind.as_str().to_string(),
            owner_id: building.owner_id,
            accrued_profit: accrued,
        })
    }

    /// Businesses with their current accrual, for the collection screen.
    pub async fn list_businesses(&self) -> Result<Vec<ProfitResult>, AppError> {
        let now = Utc::now();
        let businesses = self.buildings.list_businesses().await?;

        Ok(businesses
            .into_iter()
            .map(|b| ProfitResult {
                building_id: b.id,
                profit: b.accrued_profit(now),
                building_name: b.building_name,
                owner_id: b.owner_id,
                income_per_minute: b.income_per_minute,
                collected: false,
            })
            .collect())
    }
}
