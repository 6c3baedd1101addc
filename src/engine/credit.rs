//! Obligation Tracker
//!
//! Britain credits are decaying-installment loans: the monthly payment is
//! fixed at issuance, overpayment absorbs extra installments at a discount,
//! and a credit with no payment inside the overdue window is flagged. A
//! credit with zero remaining payments is closed and its row deleted by the
//! caller.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::DomainError;

/// Seconds without a payment after which a credit counts as overdue.
pub const DEFAULT_OVERDUE_AFTER_SECS: i64 = 600;

/// Each extra installment costs this fraction of the monthly payment.
const EXTRA_INSTALLMENT_RATE: Decimal = Decimal::from_parts(66, 0, 0, false, 2);

/// Surcharge multiplier applied to the plain per-installment split.
const ISSUE_MARKUP: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// An active credit owed by one player. Unique per debtor.
#[derive(Debug, Clone, PartialEq)]
pub struct Credit {
    pub player_id: String,
    pub credit_amount: Decimal,
    pub term_months: i32,
    pub monthly_payment: Decimal,
    pub remaining_payments: i32,
    pub total_paid: Decimal,
    pub issued_by: String,
    pub issued_at: DateTime<Utc>,
    pub last_payment_at: DateTime<Utc>,
}

impl Credit {
    /// Issue a new credit. The monthly payment is fixed here:
    /// `(credit_amount / term) * 1.5`.
    pub fn issue(
        player_id: impl Into<String>,
        credit_amount: Decimal,
        term_months: i32,
        issued_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !(2..=6).contains(&term_months) {
            return Err(DomainError::InvalidTerm(term_months));
        }
        if credit_amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount(credit_amount));
        }

        let monthly_payment = (credit_amount / Decimal::from(term_months)) * ISSUE_MARKUP;

        Ok(Self {
            player_id: player_id.into(),
            credit_amount,
            term_months,
            monthly_payment,
            remaining_payments: term_months,
            total_paid: Decimal::ZERO,
            issued_by: issued_by.into(),
            issued_at: now,
            last_payment_at: now,
        })
    }

    /// Apply a payment. Returns whether the credit is now closed.
    ///
    /// One installment is always covered; every further
    /// `monthly_payment * 0.66` of overpayment covers one more. A payment
    /// below the monthly payment is rejected with no mutation.
    pub fn make_payment(
        &mut self,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        if amount < Decimal::ZERO {
            return Err(DomainError::InvalidAmount(amount));
        }
        if amount < self.monthly_payment {
            return Err(DomainError::insufficient_funds(self.monthly_payment, amount));
        }

        let extra = amount - self.monthly_payment;
        let extra_step = self.monthly_payment * EXTRA_INSTALLMENT_RATE;
        let extra_payments = if extra_step > Decimal::ZERO {
            (extra / extra_step).floor().to_i32().unwrap_or(i32::MAX)
        } else {
            0
        };
        let covered = extra_payments.saturating_add(1);

        self.remaining_payments = self.remaining_payments.saturating_sub(covered).max(0);
        self.total_paid += amount;
        self.last_payment_at = now;

        Ok(self.is_closed())
    }

    /// A closed credit has no installments left; the caller deletes the row.
    pub fn is_closed(&self) -> bool {
        self.remaining_payments == 0
    }

    /// Time since the last payment (issuance counts as the first).
    pub fn time_since_last_payment(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_payment_at).max(Duration::zero())
    }

    /// Overdue once strictly more than `overdue_after_secs` have elapsed
    /// since the last payment.
    pub fn is_overdue_after(&self, now: DateTime<Utc>, overdue_after_secs: i64) -> bool {
        self.time_since_last_payment(now).num_seconds() > overdue_after_secs
    }

    /// Overdue with the standard ten-minute window.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_overdue_after(now, DEFAULT_OVERDUE_AFTER_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn credit_300_over_3() -> Credit {
        Credit::issue("7105", dec!(300), 3, "alice", t0()).unwrap()
    }

    #[test]
    fn test_issue_fixes_monthly_payment() {
        let c = credit_300_over_3();
        assert_eq!(c.monthly_payment, dec!(150));
        assert_eq!(c.remaining_payments, 3);
        assert_eq!(c.total_paid, Decimal::ZERO);
        assert!(!c.is_closed());
    }

    #[test]
    fn test_issue_rejects_bad_term() {
        assert!(matches!(
            Credit::issue("1", dec!(300), 1, "alice", t0()),
            Err(DomainError::InvalidTerm(1))
        ));
        assert!(matches!(
            Credit::issue("1", dec!(300), 7, "alice", t0()),
            Err(DomainError::InvalidTerm(7))
        ));
    }

    #[test]
    fn test_issue_rejects_nonpositive_amount() {
        assert!(matches!(
            Credit::issue("1", dec!(0), 3, "alice", t0()),
            Err(DomainError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_exact_payment_covers_one_installment() {
        let mut c = credit_300_over_3();
        let closed = c.make_payment(dec!(150), t0()).unwrap();
        assert!(!closed);
        assert_eq!(c.remaining_payments, 2);
        assert_eq!(c.total_paid, dec!(150));
    }

    #[test]
    fn test_overpayment_absorbs_extra_installments() {
        // extra 99 = monthly * 0.66 exactly -> 2 installments covered
        let mut c = credit_300_over_3();
        let closed = c.make_payment(dec!(249), t0()).unwrap();
        assert!(!closed);
        assert_eq!(c.remaining_payments, 1);

        // One cent short of the step covers only the mandatory installment
        let mut c = credit_300_over_3();
        c.make_payment(dec!(248.99), t0()).unwrap();
        assert_eq!(c.remaining_payments, 2);
    }

    #[test]
    fn test_underpayment_rejected_without_mutation() {
        let mut c = credit_300_over_3();
        let before = c.clone();

        let err = c.make_payment(dec!(149.99), t0()).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientFunds { .. }));
        assert_eq!(err.shortfall(), Some(dec!(0.01)));
        assert_eq!(c, before);
    }

    #[test]
    fn test_negative_payment_rejected() {
        let mut c = credit_300_over_3();
        assert!(matches!(
            c.make_payment(dec!(-1), t0()),
            Err(DomainError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_repeated_payments_close_at_exactly_zero() {
        let mut c = credit_300_over_3();
        assert!(!c.make_payment(dec!(150), t0()).unwrap());
        assert!(!c.make_payment(dec!(150), t0()).unwrap());
        assert!(c.make_payment(dec!(150), t0()).unwrap());
        assert_eq!(c.remaining_payments, 0);
        assert!(c.is_closed());

        // A huge overpayment never drives the counter negative
        let mut c = credit_300_over_3();
        assert!(c.make_payment(dec!(10000), t0()).unwrap());
        assert_eq!(c.remaining_payments, 0);
    }

    #[test]
    fn test_payment_updates_timer_and_total() {
        let mut c = credit_300_over_3();
        let later = t0() + Duration::minutes(5);
        c.make_payment(dec!(150), later).unwrap();
        assert_eq!(c.last_payment_at, later);
        assert_eq!(c.total_paid, dec!(150));

        c.make_payment(dec!(200), later).unwrap();
        assert_eq!(c.total_paid, dec!(350));
    }

    #[test]
    fn test_overdue_boundary_at_600_seconds() {
        let c = credit_300_over_3();
        assert!(!c.is_overdue(t0() + Duration::seconds(599)));
        assert!(!c.is_overdue(t0() + Duration::seconds(600)));
        assert!(c.is_overdue(t0() + Duration::seconds(601)));
    }

    #[test]
    fn test_no_cent_drift_across_uneven_payments() {
        // 100 over 3: monthly = 50.0 (exact decimal, no binary float)
        let mut c = Credit::issue("9", dec!(100), 3, "bob", t0()).unwrap();
        assert_eq!(c.monthly_payment, dec!(50));

        c.make_payment(dec!(50.01), t0()).unwrap();
        c.make_payment(dec!(50.02), t0()).unwrap();
        assert_eq!(c.total_paid, dec!(100.03));
    }
}
