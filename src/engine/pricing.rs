//! Dynamic Price Engine
//!
//! Britain goods have demand-sensitive prices: each `n_for_drop` cumulative
//! units sold knock one unit off the price, and an idle window of
//! `t_recovery` seconds restores the price to its ceiling. Stored state is a
//! checkpoint (price, sales counter, timestamp); recovery is evaluated lazily
//! on the next read, never by a timer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::DomainError;

/// Defaults applied when a good is sold for the first time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDefaults {
    pub pmax: Decimal,
    pub n_for_drop: i32,
    pub t_recovery_secs: i64,
}

impl Default for PriceDefaults {
    fn default() -> Self {
        Self {
            pmax: Decimal::from(100),
            n_for_drop: 10,
            t_recovery_secs: 300,
        }
    }
}

/// Current price state of one good.
///
/// # Invariants
/// - `0 <= current_price <= pmax`
/// - `sales_count` counts units sold since the last recovery and resets to
///   zero exactly when a recovery fires
#[derive(Debug, Clone, PartialEq)]
pub struct GoodPrice {
    pub good_name: String,
    pub current_price: Decimal,
    pub pmax: Decimal,
    pub n_for_drop: i32,
    pub t_recovery_secs: i64,
    pub sales_count: i32,
    pub last_update: DateTime<Utc>,
}

impl GoodPrice {
    /// Fresh record for a good that has never been sold: price starts at the
    /// ceiling.
    pub fn new(good_name: impl Into<String>, defaults: PriceDefaults, now: DateTime<Utc>) -> Self {
        Self {
            good_name: good_name.into(),
            current_price: defaults.pmax,
            pmax: defaults.pmax,
            n_for_drop: defaults.n_for_drop,
            t_recovery_secs: defaults.t_recovery_secs,
            sales_count: 0,
            last_update: now,
        }
    }

    /// Restore the price to `pmax` if the good has been idle for the full
    /// recovery window. Returns whether a recovery fired.
    ///
    /// Must run before any quote so stale prices never leak.
    pub fn check_recovery(&mut self, now: DateTime<Utc>) -> bool {
        let idle_secs = (now - self.last_update).num_seconds();
        if idle_secs >= self.t_recovery_secs && self.current_price < self.pmax {
            self.current_price = self.pmax;
            self.sales_count = 0;
            self.last_update = now;
            true
        } else {
            false
        }
    }

    /// Current unit price. No mutation.
    pub fn quote(&self) -> Decimal {
        self.current_price
    }

    /// Register `quantity` units sold and recompute the price.
    ///
    /// The drop is a floor function of cumulative sales since the last
    /// recovery, so batching does not matter: selling 3 then 4 lands on the
    /// same price as selling 7 at once. Returns the new unit price.
    pub fn record_sale(
        &mut self,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> Result<Decimal, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity(quantity));
        }

        self.sales_count += quantity;
        if self.n_for_drop > 0 {
            let drop = self.sales_count / self.n_for_drop;
            self.current_price = (self.pmax - Decimal::from(drop)).max(Decimal::ZERO);
        }
        self.last_update = now;
        Ok(self.current_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn good(now: DateTime<Utc>) -> GoodPrice {
        GoodPrice::new("cloth", PriceDefaults::default(), now)
    }

    #[test]
    fn test_new_starts_at_ceiling() {
        let g = good(t0());
        assert_eq!(g.current_price, dec!(100));
        assert_eq!(g.sales_count, 0);
        assert_eq!(g.quote(), g.pmax);
    }

    #[test]
    fn test_record_sale_drops_by_cumulative_floor() {
        let mut g = good(t0());
        g.n_for_drop = 5;

        // 7 units: 7 / 5 = 1 drop
        g.record_sale(7, t0()).unwrap();
        assert_eq!(g.current_price, dec!(99));

        // 4 more units: cumulative 11, 11 / 5 = 2 drops total
        g.record_sale(4, t0()).unwrap();
        assert_eq!(g.current_price, dec!(98));
        assert_eq!(g.sales_count, 11);
    }

    #[test]
    fn test_drop_independent_of_batching() {
        let now = t0();
        let mut split = good(now);
        split.n_for_drop = 5;
        split.record_sale(3, now).unwrap();
        split.record_sale(4, now).unwrap();

        let mut bulk = good(now);
        bulk.n_for_drop = 5;
        bulk.record_sale(7, now).unwrap();

        assert_eq!(split.current_price, bulk.current_price);
        assert_eq!(split.sales_count, bulk.sales_count);
    }

    #[test]
    fn test_price_floors_at_zero() {
        let mut g = good(t0());
        g.n_for_drop = 1;
        let price = g.record_sale(500, t0()).unwrap();
        assert_eq!(price, Decimal::ZERO);
        assert!(g.current_price >= Decimal::ZERO);
        assert!(g.current_price <= g.pmax);
    }

    #[test]
    fn test_invalid_quantity_rejected_without_mutation() {
        let mut g = good(t0());
        let before = g.clone();

        assert!(matches!(
            g.record_sale(0, t0()),
            Err(DomainError::InvalidQuantity(0))
        ));
        assert!(matches!(
            g.record_sale(-3, t0()),
            Err(DomainError::InvalidQuantity(-3))
        ));
        assert_eq!(g, before);
    }

    #[test]
    fn test_recovery_boundary() {
        let now = t0();
        let mut g = good(now);
        g.record_sale(20, now).unwrap();
        assert_eq!(g.current_price, dec!(98));

        // One second short of the window: no reset
        let mut early = g.clone();
        assert!(!early.check_recovery(now + Duration::seconds(299)));
        assert_eq!(early.current_price, dec!(98));
        assert_eq!(early.sales_count, 20);

        // Exactly at the window: full reset
        let fired = g.check_recovery(now + Duration::seconds(300));
        assert!(fired);
        assert_eq!(g.current_price, dec!(100));
        assert_eq!(g.sales_count, 0);
        assert_eq!(g.last_update, now + Duration::seconds(300));
    }

    #[test]
    fn test_recovery_idempotent() {
        let now = t0();
        let mut g = good(now);
        g.record_sale(10, now).unwrap();

        let later = now + Duration::seconds(300);
        assert!(g.check_recovery(later));
        let after_first = g.clone();

        // Second call with no elapsed time is a no-op
        assert!(!g.check_recovery(later));
        assert_eq!(g, after_first);
    }

    #[test]
    fn test_recovery_noop_at_ceiling() {
        let now = t0();
        let mut g = good(now);
        // Never sold below pmax: idle window elapses but nothing changes
        assert!(!g.check_recovery(now + Duration::seconds(10_000)));
        assert_eq!(g.last_update, now);
    }

    #[test]
    fn test_invariant_holds_across_mixed_history() {
        let mut now = t0();
        let mut g = good(now);
        g.n_for_drop = 3;

        for step in 0..50 {
            now += Duration::seconds(37 * (step % 11));
            if step % 7 == 0 {
                g.check_recovery(now);
            } else {
                g.record_sale(1 + (step % 4) as i32, now).unwrap();
            }
            assert!(g.current_price >= Decimal::ZERO);
            assert!(g.current_price <= g.pmax);
        }
    }

    #[test]
    fn test_quote_does_not_mutate() {
        let g = good(t0());
        let before = g.clone();
        let _ = g.quote();
        assert_eq!(g, before);
    }
}
