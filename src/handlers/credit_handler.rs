//! Credit Handler
//!
//! Credit issuance and payments against the Obligation Tracker. A closed
//! credit is deleted; the action log keeps the trail.

use chrono::Utc;
use sqlx::PgPool;

use crate::audit::{ActionKind, ActionLogBuilder, ActionLogService};
use crate::domain::{ModeratorContext, Money};
use crate::engine::Credit;
use crate::error::AppError;
use crate::store::CreditRepository;

use super::{
    CreditIssueCommand, CreditIssueResult, CreditPaymentCommand, CreditPaymentResult, CreditStatus,
};

/// Handler for credit issuance and payments
pub struct CreditHandler {
    credits: CreditRepository,
    log: ActionLogService,
    overdue_after_secs: i64,
}

impl CreditHandler {
    pub fn new(pool: PgPool, overdue_after_secs: i64) -> Self {
        Self {
            credits: CreditRepository::new(pool.clone()),
            log: ActionLogService::new(pool),
            overdue_after_secs,
        }
    }

    /// Issue a credit. One active credit per debtor.
    pub async fn issue(
        &self,
        command: CreditIssueCommand,
        context: &ModeratorContext,
    ) -> Result<CreditIssueResult, AppError> {
        let amount: Money = command
            .amount
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {e}")))?;

        if self
            .credits
            .get_by_player(&command.player_id)
            .await?
            .is_some()
        {
            return Err(AppError::CreditExists(command.player_id));
        }

        let credit = Credit::issue(
            &command.player_id,
            amount.value(),
            command.term_months,
            &context.author,
            Utc::now(),
        )?;
        self.credits.insert(&credit).await?;

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::CreditIssue)
                    .player(&credit.player_id)
                    .detail("amount", credit.credit_amount)
                    .detail("term", credit.term_months)
                    .detail("monthly", credit.monthly_payment),
                context,
            )
            .await?;

        Ok(CreditIssueResult {
            player_id: credit.player_id,
            credit_amount: credit.credit_amount,
            term_months: credit.term_months,
            monthly_payment: credit.monthly_payment,
        })
    }

    /// Apply a payment; deletes the row when the credit closes.
    pub async fn pay(
        &self,
        command: CreditPaymentCommand,
        context: &ModeratorContext,
    ) -> Result<CreditPaymentResult, AppError> {
        let amount: Money = command
            .amount
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {e}")))?;

        let mut credit = self
            .credits
            .get_by_player(&command.player_id)
            .await?
            .ok_or_else(|| AppError::CreditNotFound(command.player_id.clone()))?;

        let closed = credit.make_payment(amount.value(), Utc::now())?;

        if closed {
            self.credits.delete(&credit.player_id).await?;
        } else {
            self.credits.update(&credit).await?;
        }

        self.log
            .log(
                ActionLogBuilder::new(ActionKind::CreditPayment)
                    .player(&credit.player_id)
                    .detail("amount", amount.value())
                    .detail("remaining", credit.remaining_payments)
                    .detail("closed", closed),
                context,
            )
            .await?;

        tracing::info!(
            player_id = %credit.player_id,
            amount = %amount,
            remaining = credit.remaining_payments,
            closed,
            "Credit payment applied"
        );

        Ok(CreditPaymentResult {
            player_id: credit.player_id,
            amount: amount.value(),
            remaining_payments: credit.remaining_payments,
            closed,
        })
    }

    /// Open credits with overdue flags, for the listing view.
    pub async fn list(&self) -> Result<Vec<CreditStatus>, AppError> {
        let now = Utc::now();
        let credits = self.credits.list().await?;

        Ok(credits.into_iter().map(|c| self.status(c, now)).collect())
    }

    /// One debtor's credit, if any.
    pub async fn for_player(&self, player_id: &str) -> Result<Option<CreditStatus>, AppError> {
        let now = Utc::now();
        Ok(self
            .credits
            .get_by_player(player_id)
            .await?
            .map(|c| self.status(c, now)))
    }

    fn status(&self, credit: Credit, now: chrono::DateTime<Utc>) -> CreditStatus {
        let seconds_since_payment = credit.time_since_last_payment(now).num_seconds();
        let overdue = credit.is_overdue_after(now, self.overdue_after_secs);
        CreditStatus {
            player_id: credit.player_id,
            credit_amount: credit.credit_amount,
            term_months: credit.term_months,
            monthly_payment: credit.monthly_payment,
            remaining_payments: credit.remaining_payments,
            total_paid: credit.total_paid,
            last_payment_at: credit.last_payment_at,
            seconds_since_payment,
            overdue,
        }
    }
}
