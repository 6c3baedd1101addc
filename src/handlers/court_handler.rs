//! Court Handler
//!
//! Island sentencing and release. Time served is computed against the
//! sentencing timestamp at release or on query.

use chrono::Utc;
use sqlx::PgPool;

use crate::audit::{ActionKind, ActionLogBuilder, ActionLogService};
use crate::domain::{ModeratorContext, Money};
use crate::error::AppError;
use crate::store::{Convict, ConvictRepository};

use super::{CourtCommand, ReleaseCommand, ReleaseResult, SentenceResult};

/// Allowed sentence range in game years
const SENTENCE_YEARS: std::ops::RangeInclusive<i32> = 1..=5;

/// Handler for sentencing and release
pub struct CourtHandler {
    convicts: ConvictRepository,
    log: ActionLogService,
}

impl CourtHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            convicts: ConvictRepository::new(pool.clone()),
            log: ActionLogService::new(pool),
        }
    }

    /// Sentence a player; one conviction per player at a time.
    pub async fn sentence(
        &self,
        command: CourtCommand,
        context: &ModeratorContext,
    ) -> Result<SentenceResult, AppError> {
        if !SENTENCE_YEARS.contains(&command.sentence_years) {
            return Err(AppError::InvalidRequest(format!(
                "sentence_years must be within {:?}, got {}",
                SENTENCE_YEARS, command.sentence_years
            )));
        }

        let fine: Money = command
            .fine_amount
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid fine: {e}")))?;

        if self
            .convicts
            .get_by_player(&command.player_id)
            .await?
            .is_some()
        {
            return Err(AppError::InvalidRequest(format!(
                "player {} is already serving a sentence",
                command.player_id
            )));
        }

        let convict = Convict {
            player_id: command.player_id.clone(),
            player_name: command.player_name,
            crime_description: command.crime_description,
            fine_amount: fine.value(),
            confiscation: command.confiscation,
            sentence_years: command.sentence_years,
            sentenced_by: context.author.clone(),
            sentenced_at: Utc::now(),
        };
        self.convicts.insert(&convict).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::Court)
                    .player(&convict.player_id)
                    .detail("crime", &convict.crime_description)
                    .detail("fine", convict.fine_amount)
                    .detail("confiscation", convict.confiscation)
                    .detail("sentence", convict.sentence_years),
                context,
            )
            .await?;

        Ok(SentenceResult {
            player_id: convict.player_id,
            fine_amount: convict.fine_amount,
            confiscation: convict.confiscation,
            sentence_years: convict.sentence_years,
        })
    }

    /// Release a convict, reporting time served, and drop the record.
    pub async fn release(
        &self,
        command: ReleaseCommand,
        context: &ModeratorContext,
    ) -> Result<ReleaseResult, AppError> {
        let convict = self
            .convicts
            .get_by_player(&command.player_id)
            .await?
            .ok_or_else(|| AppError::ConvictNotFound(command.player_id.clone()))?;

        let time_served_secs = convict.time_served(Utc::now()).num_seconds();
        self.convicts.delete(&convict.player_id).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::Release)
                    .player(&convict.player_id)
                    .detail("early_release", command.early_release)
                    .detail("time_served_seconds", time_served_secs),
                context,
            )
            .await?;

        Ok(ReleaseResult {
            player_id: convict.player_id,
            early_release: command.early_release,
            time_served_secs,
        })
    }

    /// Read-only time-served query for display polling.
    pub async fn time_served(&self, player_id: &str) -> Result<ReleaseResult, AppError> {
        let convict = self
            .convicts
            .get_by_player(player_id)
            .await?
            .ok_or_else(|| AppError::ConvictNotFound(player_id.to_string()))?;

        Ok(ReleaseResult {
            player_id: convict.player_id.clone(),
            early_release: false,
            time_served_secs: convict.time_served(Utc::now()).num_seconds(),
        })
    }
}
