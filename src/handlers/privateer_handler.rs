//! Privateer Handler
//!
//! License lifecycle and tenure bookkeeping against the Tenure Tracker.
//! Uniqueness on player identity: re-issuing a license to a dismissed
//! privateer reactivates the existing record.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::audit::{ActionKind, ActionLogBuilder, ActionLogService};
use crate::domain::{DomainError, ModeratorContext, Money};
use crate::engine::{Privateer, ShipKind};
use crate::error::AppError;
use crate::store::{CatalogRepository, PrivateerRepository};

use super::{
    PrivateerComplaintCommand, PrivateerLicenseCommand, PrivateerPaymentResult, PrivateerStatus,
    QuestAcceptCommand,
};

/// Catalog entry holding the license fee
const FEE_CATALOG_NAME: &str = "Privateer fee";

/// Handler for privateer license management
pub struct PrivateerHandler {
    privateers: PrivateerRepository,
    catalog: CatalogRepository,
    log: ActionLogService,
    fee_fallback: Decimal,
}

impl PrivateerHandler {
    pub fn new(pool: PgPool, fee_fallback: Decimal) -> Self {
        Self {
            privateers: PrivateerRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            log: ActionLogService::new(pool),
            fee_fallback,
        }
    }

    /// Issue a license, reactivating an existing record if the player ever
    /// held one.
    pub async fn license(
        &self,
        command: PrivateerLicenseCommand,
        context: &ModeratorContext,
    ) -> Result<PrivateerStatus, AppError> {
        let ship = parse_ship(&command.ship)?;
        let now = Utc::now();

        let privateer = match self.privateers.get_by_player(&command.player_id).await? {
            Some(mut existing) => {
                existing.reissue(ship, &context.author, now);
                self.privateers.update(&existing).await?;
                existing
            }
            None => {
                let fresh = Privateer::license(&command.player_id, ship, &context.author, now);
                self.privateers.insert(&fresh).await?;
                fresh
            }
        };

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::PrivateerLicense)
                    .player(&privateer.player_id)
                    .detail("action", "issue")
                    .detail("ship", privateer.ship.as_str()),
                context,
            )
            .await?;

        Ok(status(privateer, now))
    }

    /// Dismiss a privateer. The record stays for a later re-issue.
    pub async fn dismiss(
        &self,
        player_id: &str,
        context: &ModeratorContext,
    ) -> Result<(), AppError> {
        let mut privateer = self.load(player_id).await?;

        privateer.set_active(false);
        self.privateers.update(&privateer).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::PrivateerLicense)
                    .player(player_id)
                    .detail("action", "dismiss"),
                context,
            )
            .await?;

        Ok(())
    }

    /// Swap the licensed ship class.
    pub async fn change_ship(
        &self,
        command: PrivateerLicenseCommand,
        context: &ModeratorContext,
    ) -> Result<PrivateerStatus, AppError> {
        let new_ship = parse_ship(&command.ship)?;
        let mut privateer = self.load(&command.player_id).await?;

        let old_ship = privateer.change_ship(new_ship);
        self.privateers.update(&privateer).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::PrivateerShip)
                    .player(&privateer.player_id)
                    .detail("old_ship", old_ship.as_str())
                    .detail("new_ship", new_ship.as_str()),
                context,
            )
            .await?;

        Ok(status(privateer, Utc::now()))
    }

    /// Register a complaint (or retraction) against a privateer.
    pub async fn complaint(
        &self,
        command: PrivateerComplaintCommand,
        context: &ModeratorContext,
    ) -> Result<PrivateerStatus, AppError> {
        let mut privateer = self.load(&command.player_id).await?;

        privateer.add_complaint(command.delta);
        self.privateers.update(&privateer).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::PrivateerComplaint)
                    .player(&privateer.player_id)
                    .detail("value", command.delta)
                    .detail("new_total", privateer.complaints),
                context,
            )
            .await?;

        Ok(status(privateer, Utc::now()))
    }

    /// Accept a license payment; the fee comes from the catalog.
    pub async fn pay(
        &self,
        player_id: &str,
        context: &ModeratorContext,
    ) -> Result<PrivateerPaymentResult, AppError> {
        let mut privateer = self.load(player_id).await?;

        let fee = match self.catalog.get(FEE_CATALOG_NAME).await? {
            Some(entry) => entry.base_price,
            None => self.fee_fallback,
        };

        privateer.make_payment(Utc::now());
        self.privateers.update(&privateer).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::PrivateerPayment)
                    .player(player_id)
                    .detail("amount", fee),
                context,
            )
            .await?;

        Ok(PrivateerPaymentResult {
            player_id: privateer.player_id,
            fee,
        })
    }

    /// Record quest acceptance by an active privateer. Log only.
    pub async fn accept_quest(
        &self,
        command: QuestAcceptCommand,
        context: &ModeratorContext,
    ) -> Result<(), AppError> {
        let reward: Money = command
            .reward
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid reward: {e}")))?;

        // Only active privateers take quests
        self.load(&command.player_id).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::QuestAccept)
                    .player(&command.player_id)
                    .detail("reward", reward.value())
                    .detail("description", &command.description),
                context,
            )
            .await?;

        Ok(())
    }

    /// All active licenses with their tenure.
    pub async fn list_active(&self) -> Result<Vec<PrivateerStatus>, AppError> {
        let now = Utc::now();
        let privateers = self.privateers.list_active().await?;
        Ok(privateers.into_iter().map(|p| status(p, now)).collect())
    }

    /// Load a player's license, distinguishing missing from dismissed.
    async fn load(&self, player_id: &str) -> Result<Privateer, AppError> {
        let privateer = self
            .privateers
            .get_by_player(player_id)
            .await?
            .ok_or_else(|| AppError::PrivateerNotFound(player_id.to_string()))?;

        if !privateer.is_active {
            return Err(DomainError::InactivePrivateer(player_id.to_string()).into());
        }

        Ok(privateer)
    }
}

fn parse_ship(s: &str) -> Result<ShipKind, AppError> {
    ShipKind::parse(s).ok_or_else(|| AppError::InvalidRequest(format!("Unknown ship kind: {s}")))
}

fn status(privateer: Privateer, now: chrono::DateTime<Utc>) -> PrivateerStatus {
    let tenure_secs = privateer.tenure(now).num_seconds();
    PrivateerStatus {
        player_id: privateer.player_id,
        ship: privateer.ship.as_str().to_string(),
        complaints: privateer.complaints,
        licensed_by: privateer.licensed_by,
        licensed_at: privateer.licensed_at,
        tenure_secs,
    }
}
