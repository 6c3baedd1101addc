//! Tenure Tracker
//!
//! A privateer license tracks time served since the last license payment and
//! a signed complaint counter. Dismissal is a soft delete: the record stays
//! so a re-issued license reactivates it instead of duplicating the player.

use chrono::{DateTime, Duration, Utc};

/// Licensed ship classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipKind {
    Frigate,
    Battleship,
    SteamFrigate,
}

impl ShipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipKind::Frigate => "frigate",
            ShipKind::Battleship => "battleship",
            ShipKind::SteamFrigate => "steam_frigate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "frigate" => Some(ShipKind::Frigate),
            "battleship" => Some(ShipKind::Battleship),
            "steam_frigate" => Some(ShipKind::SteamFrigate),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One player's privateer license. Unique per player.
#[derive(Debug, Clone, PartialEq)]
pub struct Privateer {
    pub player_id: String,
    pub ship: ShipKind,
    pub last_payment_at: DateTime<Utc>,
    pub complaints: i32,
    pub licensed_by: String,
    pub licensed_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Privateer {
    /// Issue a fresh license; the tenure clock starts now.
    pub fn license(
        player_id: impl Into<String>,
        ship: ShipKind,
        licensed_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            ship,
            last_payment_at: now,
            complaints: 0,
            licensed_by: licensed_by.into(),
            licensed_at: now,
            is_active: true,
        }
    }

    /// Time since the last license payment. Never negative.
    pub fn tenure(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_payment_at).max(Duration::zero())
    }

    /// Register a license payment; the fee itself lives in the price catalog
    /// and is recorded only in the action log.
    pub fn make_payment(&mut self, now: DateTime<Utc>) {
        self.last_payment_at = now;
    }

    /// Adjust the complaint counter. A negative delta retracts complaints;
    /// the counter has no floor.
    pub fn add_complaint(&mut self, delta: i32) {
        self.complaints += delta;
    }

    /// Activate or dismiss the license.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Re-issue a license on an existing record: reactivates it and updates
    /// the ship class rather than creating a duplicate.
    pub fn reissue(&mut self, ship: ShipKind, licensed_by: impl Into<String>, now: DateTime<Utc>) {
        self.ship = ship;
        self.licensed_by = licensed_by.into();
        self.licensed_at = now;
        self.is_active = true;
    }

    /// Swap the licensed ship; returns the previous class for the log.
    pub fn change_ship(&mut self, ship: ShipKind) -> ShipKind {
        std::mem::replace(&mut self.ship, ship)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_license_starts_clean() {
        let p = Privateer::license("3042", ShipKind::Frigate, "alice", t0());
        assert!(p.is_active);
        assert_eq!(p.complaints, 0);
        assert_eq!(p.tenure(t0()), Duration::zero());
    }

    #[test]
    fn test_tenure_grows_and_payment_resets_it() {
        let mut p = Privateer::license("3042", ShipKind::Frigate, "alice", t0());
        let later = t0() + Duration::minutes(42);
        assert_eq!(p.tenure(later), Duration::minutes(42));

        p.make_payment(later);
        assert_eq!(p.tenure(later), Duration::zero());
        assert_eq!(p.tenure(later + Duration::seconds(30)), Duration::seconds(30));
    }

    #[test]
    fn test_tenure_never_negative() {
        let p = Privateer::license("3042", ShipKind::Frigate, "alice", t0());
        assert_eq!(p.tenure(t0() - Duration::minutes(1)), Duration::zero());
    }

    #[test]
    fn test_complaints_are_signed_with_no_floor() {
        let mut p = Privateer::license("3042", ShipKind::Battleship, "bob", t0());
        p.add_complaint(3);
        assert_eq!(p.complaints, 3);
        p.add_complaint(-5);
        assert_eq!(p.complaints, -2);
    }

    #[test]
    fn test_dismissal_is_soft() {
        let mut p = Privateer::license("3042", ShipKind::Frigate, "alice", t0());
        p.set_active(false);
        assert!(!p.is_active);
        // Record is retained: complaints and timestamps survive
        assert_eq!(p.player_id, "3042");
    }

    #[test]
    fn test_reissue_reactivates_and_updates_ship() {
        let mut p = Privateer::license("3042", ShipKind::Frigate, "alice", t0());
        p.add_complaint(2);
        p.set_active(false);

        let later = t0() + Duration::hours(1);
        p.reissue(ShipKind::SteamFrigate, "carol", later);

        assert!(p.is_active);
        assert_eq!(p.ship, ShipKind::SteamFrigate);
        assert_eq!(p.licensed_by, "carol");
        assert_eq!(p.licensed_at, later);
        // Complaint history is not wiped by re-issuance
        assert_eq!(p.complaints, 2);
    }

    #[test]
    fn test_change_ship_returns_previous() {
        let mut p = Privateer::license("3042", ShipKind::Frigate, "alice", t0());
        let old = p.change_ship(ShipKind::Battleship);
        assert_eq!(old, ShipKind::Frigate);
        assert_eq!(p.ship, ShipKind::Battleship);
    }
}
