//! Sale Handler
//!
//! Britain goods sale against the Dynamic Price Engine, and the read-only
//! price lookup. Recovery is checked before every quote so a stale price is
//! never shown or charged.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::audit::{ActionKind, ActionLogBuilder, ActionLogService};
use crate::domain::{DomainError, ModeratorContext, Money};
use crate::engine::PriceDefaults;
use crate::error::AppError;
use crate::store::{CatalogRepository, Category, GoodPriceRepository};

use super::{QuoteResult, SaleCommand, SaleResult};

/// Handler for dynamic-price goods sales
pub struct SaleHandler {
    prices: GoodPriceRepository,
    catalog: CatalogRepository,
    log: ActionLogService,
    defaults: PriceDefaults,
}

impl SaleHandler {
    pub fn new(pool: PgPool, defaults: PriceDefaults) -> Self {
        Self {
            prices: GoodPriceRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            log: ActionLogService::new(pool),
            defaults,
        }
    }

    /// Defaults for a lazily created price record: the catalog's per-good
    /// parameters when seeded, the configured fallbacks otherwise.
    async fn defaults_for(&self, good: &str) -> Result<PriceDefaults, AppError> {
        let entry = self.catalog.get_in_category(good, Category::Goods).await?;

        Ok(match entry {
            Some(entry) => PriceDefaults {
                pmax: entry.pmax.unwrap_or(self.defaults.pmax),
                n_for_drop: entry.n_for_drop.unwrap_or(self.defaults.n_for_drop),
                t_recovery_secs: entry
                    .t_recovery_secs
                    .map(i64::from)
                    .unwrap_or(self.defaults.t_recovery_secs),
            },
            None => self.defaults,
        })
    }

    /// Execute the sale: recover, quote, check funds, record, log.
    pub async fn execute(
        &self,
        command: SaleCommand,
        context: &ModeratorContext,
    ) -> Result<SaleResult, AppError> {
        if command.quantity < 1 {
            return Err(DomainError::InvalidQuantity(command.quantity).into());
        }

        let payment: Money = command
            .payment
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid payment: {e}")))?;

        let now = chrono::Utc::now();
        let defaults = self.defaults_for(&command.good).await?;
        let mut price = self
            .prices
            .get_or_create(&command.good, defaults, now)
            .await?;

        price.check_recovery(now);
        let price_per_unit = price.quote();
        let total = price_per_unit * Decimal::from(command.quantity);

        // Reject before any mutation is persisted
        if !payment.covers(total) {
            return Err(DomainError::insufficient_funds(total, payment.value()).into());
        }

        price.record_sale(command.quantity, now)?;
        self.prices.save(&price).await?;

        let change = payment.value() - total;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::Sale)
                    .player(&command.player_id)
                    .detail("good", &command.good)
                    .detail("quantity", command.quantity)
                    .detail("price_per_unit", price_per_unit)
                    .detail("total", total)
                    .detail("payment", payment.value())
                    .detail("change", change),
                context,
            )
            .await?;

        tracing::info!(
            good = %command.good,
            quantity = command.quantity,
            total = %total,
            new_price = %price.current_price,
            "Goods sale recorded"
        );

        Ok(SaleResult {
            good: command.good,
            player_id: command.player_id,
            quantity: command.quantity,
            price_per_unit,
            total,
            payment: payment.value(),
            change,
        })
    }

    /// Read-only price lookup. Still runs (and persists) recovery so the
    /// reported price is never stale.
    pub async fn quote(&self, good: &str) -> Result<QuoteResult, AppError> {
        let now = chrono::Utc::now();
        let defaults = self.defaults_for(good).await?;
        let mut price = self.prices.get_or_create(good, defaults, now).await?;

        let recovered = price.check_recovery(now);
        if recovered {
            self.prices.save(&price).await?;
        }

        Ok(QuoteResult {
            good: price.good_name.clone(),
            price: price.quote(),
            pmax: price.pmax,
            sales_count: price.sales_count,
            recovered,
        })
    }
}
