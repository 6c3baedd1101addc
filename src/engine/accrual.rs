//! Accrual Engine
//!
//! Business buildings earn passive income proportional to wall-clock time
//! since the last collection. The stored state is just a timestamp; the
//! accrued amount is a pure function of elapsed time, evaluated on demand.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// What a constructed building is for. Only businesses accrue income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingKind {
    Factory,
    Business,
    Residential,
    Other,
}

impl BuildingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingKind::Factory => "factory",
            BuildingKind::Business => "business",
            BuildingKind::Residential => "residential",
            BuildingKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "factory" => Some(BuildingKind::Factory),
            "business" => Some(BuildingKind::Business),
            "residential" => Some(BuildingKind::Residential),
            "other" => Some(BuildingKind::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A constructed building on the Island table.
///
/// The kind and income rate are explicit fields fixed at construction from
/// the price catalog; `income_per_minute` is meaningful only for businesses.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: Uuid,
    pub building_name: String,
    pub kind: BuildingKind,
    pub owner_id: String,
    pub built_by: String,
    pub built_at: DateTime<Utc>,
    pub cost: Decimal,
    pub income_per_minute: Decimal,
    pub last_profit_collected: DateTime<Utc>,
}

impl Building {
    /// Construct a building; the profit timer starts at construction time.
    #[allow(clippy::too_many_arguments)]
    pub fn construct(
        id: Uuid,
        building_name: impl Into<String>,
        kind: BuildingKind,
        owner_id: impl Into<String>,
        built_by: impl Into<String>,
        cost: Decimal,
        income_per_minute: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            building_name: building_name.into(),
            kind,
            owner_id: owner_id.into(),
            built_by: built_by.into(),
            built_at: now,
            cost,
            income_per_minute,
            last_profit_collected: now,
        }
    }

    /// Profit accumulated since the last collection, rounded to cents.
    ///
    /// Zero for anything that is not a business. Pure: safe to call
    /// repeatedly for display polling.
    pub fn accrued_profit(&self, now: DateTime<Utc>) -> Decimal {
        if self.kind != BuildingKind::Business {
            return Decimal::ZERO;
        }

        let elapsed_secs = (now - self.last_profit_collected).num_seconds();
        if elapsed_secs <= 0 {
            return Decimal::ZERO;
        }

        let minutes = Decimal::from(elapsed_secs) / Decimal::from(60);
        (minutes * self.income_per_minute)
            .round_dp(2)
            .max(Decimal::ZERO)
    }

    /// Collect the accrued profit, resetting the timer.
    ///
    /// A zero accrual (wrong kind, or no time elapsed) leaves the record
    /// untouched; the caller reports it as nothing-to-collect.
    pub fn collect(&mut self, now: DateTime<Utc>) -> Decimal {
        let profit = self.accrued_profit(now);
        if profit > Decimal::ZERO {
            self.last_profit_collected = now;
        }
        profit
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

    fn business(income: Decimal, now: DateTime<Utc>) -> Building {
        Building::construct(
            Uuid::new_v4(),
            "Tavern",
            BuildingKind::Business,
            "4217",
            "alice",
            dec!(600),
            income,
            now,
        )
    }

    #[test]
    fn test_accrual_is_linear_in_elapsed_minutes() {
        let b = business(dec!(4), t0());
        assert_eq!(b.accrued_profit(t0() + Duration::minutes(10)), dec!(40));
        assert_eq!(b.accrued_profit(t0() + Duration::seconds(90)), dec!(6));
    }

    #[test]
    fn test_accrual_rounds_to_cents() {
        let b = business(dec!(1), t0());
        // 100 seconds at 1/min = 1.666... -> 1.67
        assert_eq!(b.accrued_profit(t0() + Duration::seconds(100)), dec!(1.67));
    }

    #[test]
    fn test_non_business_accrues_nothing() {
        for kind in [
            BuildingKind::Factory,
            BuildingKind::Residential,
            BuildingKind::Other,
        ] {
            let mut b = business(dec!(5), t0());
            b.kind = kind;
            assert_eq!(b.accrued_profit(t0() + Duration::hours(3)), Decimal::ZERO);
        }
    }

    #[test]
    fn test_accrued_profit_is_pure() {
        let b = business(dec!(5), t0());
        let later = t0() + Duration::minutes(7);
        let first = b.accrued_profit(later);
        let second = b.accrued_profit(later);
        assert_eq!(first, second);
        assert_eq!(b.last_profit_collected, t0());
    }

    #[test]
    fn test_collect_resets_timer() {
        let mut b = business(dec!(2), t0());
        let later = t0() + Duration::minutes(30);

        let collected = b.collect(later);
        assert_eq!(collected, dec!(60));
        assert_eq!(b.last_profit_collected, later);

        // Nothing further accrued at the same instant
        assert_eq!(b.accrued_profit(later), Decimal::ZERO);
    }

    #[test]
    fn test_collect_zero_is_a_noop() {
        let mut b = business(dec!(2), t0());
        b.kind = BuildingKind::Factory;
        let later = t0() + Duration::minutes(30);

        assert_eq!(b.collect(later), Decimal::ZERO);
        assert_eq!(b.last_profit_collected, t0());
    }

    #[test]
    fn test_clock_skew_clamps_to_zero() {
        let b = business(dec!(5), t0());
        assert_eq!(b.accrued_profit(t0() - Duration::minutes(5)), Decimal::ZERO);
    }

    #[test]
    fn test_repeated_collection_cycles() {
        let mut b = business(dec!(3), t0());
        let mut now = t0();
        let mut total = Decimal::ZERO;

        for _ in 0..5 {
            now += Duration::minutes(10);
            total += b.collect(now);
        }
        assert_eq!(total, dec!(150));
        assert_eq!(b.last_profit_collected, now);
    }
}
