//! Counter Handler
//!
//! Fixed-price actions settled over the table: resource purchases, factory
//! processing, gear work, ship deals, coal, and free-form deals. Each one
//! computes a total from the catalog, requires the payment to cover it, and
//! reports the change.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::audit::{ActionKind, ActionLogBuilder, ActionLogService};
use crate::domain::{DomainError, ModeratorContext, Money};
use crate::error::AppError;
use crate::store::{BuildingRepository, CatalogRepository, Category};

use super::{
    CoalPurchaseCommand, CounterResult, DealCommand, FactoryWorkCommand, ProcessingCommand,
    ResourcePurchaseCommand, ShipDealCommand, ShipDealSide,
};

/// Catalog fallbacks for entries a game master forgot to seed
const DEFAULT_RESOURCE_PRICE: i64 = 10;
const DEFAULT_PROCESSING_FEE: i64 = 5;
const DEFAULT_GEAR_PRICE: i64 = 2;
const DEFAULT_SHIP_PRICE: i64 = 1000;

const PROCESSING_CATALOG_NAME: &str = "Resource processing";

/// Handler for fixed-price counter actions
pub struct CounterHandler {
    catalog: CatalogRepository,
    buildings: BuildingRepository,
    log: ActionLogService,
}

impl CounterHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogRepository::new(pool.clone()),
            buildings: BuildingRepository::new(pool.clone()),
            log: ActionLogService::new(pool),
        }
    }

    /// Record a free-form deal between two players. Log only.
    pub async fn deal(
        &self,
        command: DealCommand,
        context: &ModeratorContext,
    ) -> Result<(), AppError> {
        self.log
            .log(
                ActionLogBuilder::new(ActionKind::Deal)
                    .player(&command.player_a)
                    .detail("player_a", &command.player_a)
                    .detail("player_b", &command.player_b)
                    .detail("description", &command.description),
                context,
            )
            .await?;

        Ok(())
    }

    /// Island resource purchase at the catalog price.
    pub async fn purchase_resource(
        &self,
        command: ResourcePurchaseCommand,
        context: &ModeratorContext,
    ) -> Result<CounterResult, AppError> {
        let price_per_unit = self
            .category_price(&command.resource, Category::Resource, DEFAULT_RESOURCE_PRICE)
            .await?;

        self.settle(
            ActionKind::Purchase,
            &command.player_id,
            &command.resource,
            command.quantity,
            price_per_unit,
            &command.payment,
            context,
        )
        .await
    }

    /// Per-unit processing fee at a factory.
    pub async fn process_resource(
        &self,
        command: ProcessingCommand,
        context: &ModeratorContext,
    ) -> Result<CounterResult, AppError> {
        let factory = self
            .buildings
            .get(command.factory_id)
            .await?
            .ok_or_else(|| AppError::BuildingNotFound(command.factory_id.to_string()))?;

        let fee = self
            .category_price(
                PROCESSING_CATALOG_NAME,
                Category::Processing,
                DEFAULT_PROCESSING_FEE,
            )
            .await?;

        self.settle(
            ActionKind::Processing,
            &factory.owner_id,
            &factory.building_name,
            command.quantity,
            fee,
            &command.payment,
            context,
        )
        .await
    }

    /// Gear payment for factory work on the Britain table.
    pub async fn factory_work(
        &self,
        command: FactoryWorkCommand,
        context: &ModeratorContext,
    ) -> Result<CounterResult, AppError> {
        let gear_price = self
            .first_in_category_price(Category::Gear, DEFAULT_GEAR_PRICE)
            .await?;

        self.settle(
            ActionKind::FactoryWork,
            &command.player_id,
            "gear",
            command.quantity,
            gear_price,
            &command.payment,
            context,
        )
        .await
    }

    /// Ship purchase (full catalog price, change due) or sale (half price
    /// paid out, no money taken).
    pub async fn ship_deal(
        &self,
        command: ShipDealCommand,
        context: &ModeratorContext,
    ) -> Result<CounterResult, AppError> {
        let price = self
            .category_price(&command.ship, Category::Ship, DEFAULT_SHIP_PRICE)
            .await?;

        match command.side {
            ShipDealSide::Buy => {
                let payment = command.payment.as_deref().ok_or_else(|| {
                    AppError::InvalidRequest("payment is required when buying".to_string())
                })?;

                self.settle(
                    ActionKind::ShipDeal,
                    &command.player_id,
                    &command.ship,
                    1,
                    price,
                    payment,
                    context,
                )
                .await
            }
            ShipDealSide::Sell => {
                let payout = price * Decimal::new(5, 1);

                self.log
                    .log(
                        ActionLogBuilder::new(ActionKind::ShipDeal)
                            .player(&command.player_id)
                            .detail("ship", &command.ship)
                            .detail("side", "sell")
                            .detail("price", payout),
                        context,
                    )
                    .await?;

                Ok(CounterResult {
                    player_id: command.player_id,
                    subject: command.ship,
                    quantity: 1,
                    price_per_unit: payout,
                    total: payout,
                    change: Decimal::ZERO,
                })
            }
        }
    }

    /// Coal purchase: the sum is free-form, the payment must cover it.
    pub async fn purchase_coal(
        &self,
        command: CoalPurchaseCommand,
        context: &ModeratorContext,
    ) -> Result<CounterResult, AppError> {
        let amount: Money = command
            .amount
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {e}")))?;
        let payment: Money = command
            .payment
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid payment: {e}")))?;

        if !payment.covers(amount.value()) {
            return Err(DomainError::insufficient_funds(amount.value(), payment.value()).into());
        }

        let change = payment.value() - amount.value();

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::CoalPurchase)
                    .player(&command.player_id)
                    .detail("amount", amount.value())
                    .detail("payment", payment.value())
                    .detail("change", change),
                context,
            )
            .await?;

        Ok(CounterResult {
            player_id: command.player_id,
            subject: "coal".to_string(),
            quantity: 1,
            price_per_unit: amount.value(),
            total: amount.value(),
            change,
        })
    }

    /// Shared settle path: total, funds check, log, change.
    #[allow(clippy::too_many_arguments)]
    async fn settle(
        &self,
        kind: ActionKind,
        player_id: &str,
        subject: &str,
        quantity: i32,
        price_per_unit: Decimal,
        payment: &str,
        context: &ModeratorContext,
    ) -> Result<CounterResult, AppError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity(quantity).into());
        }

        let payment: Money = payment
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid payment: {e}")))?;

        let total = price_per_unit * Decimal::from(quantity);
        if !payment.covers(total) {
            return Err(DomainError::insufficient_funds(total, payment.value()).into());
        }

        let change = payment.value() - total;

        self.log
            .log(
                ActionLogBuilder::new(kind)
                    .player(player_id)
                    .detail("subject", subject)
                    .detail("quantity", quantity)
                    .detail("price_per_unit", price_per_unit)
                    .detail("total", total)
                    .detail("payment", payment.value())
                    .detail("change", change),
                context,
            )
            .await?;

        Ok(CounterResult {
            player_id: player_id.to_string(),
            subject: subject.to_string(),
            quantity,
            price_per_unit,
            total,
            change,
        })
    }

    async fn category_price(
        &self,
        name: &str,
        category: Category,
        fallback: i64,
    ) -> Result<Decimal, AppError> {
        Ok(self
            .catalog
            .get_in_category(name, category)
            .await?
            .map(|entry| entry.base_price)
            .unwrap_or_else(|| Decimal::from(fallback)))
    }

    async fn first_in_category_price(
        &self,
        category: Category,
        fallback: i64,
    ) -> Result<Decimal, AppError> {
        Ok(self
            .catalog
            .list_category(category)
            .await?
            .into_iter()
            .next()
            .map(|entry| entry.base_price)
            .unwrap_or_else(|| Decimal::from(fallback)))
    }
}
