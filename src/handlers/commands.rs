//! Command definitions
//!
//! Commands represent moderator intentions; results are what the surrounding
//! layer logs and displays. Money travels as strings until validated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =========================================================================
// Britain: goods sale
// =========================================================================

/// Sell goods to the crown at the current dynamic price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCommand {
    pub good: String,
    pub player_id: String,
    pub quantity: i32,
    /// Money handed over (as string for precise decimal)
    pub payment: String,
}

impl SaleCommand {
    pub fn new(
        good: impl Into<String>,
        player_id: impl Into<String>,
        quantity: i32,
        payment: impl Into<String>,
    ) -> Self {
        Self {
            good: good.into(),
            player_id: player_id.into(),
            quantity,
            payment: payment.into(),
        }
    }
}

/// Result of a completed goods sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleResult {
    pub good: String,
    pub player_id: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub total: Decimal,
    pub payment: Decimal,
    pub change: Decimal,
}

/// Current dynamic price of one good
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResult {
    pub good: String,
    pub price: Decimal,
    pub pmax: Decimal,
    pub sales_count: i32,
    pub recovered: bool,
}

// =========================================================================
// Island: buildings
// =========================================================================

/// Construct a building from the catalog for a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructCommand {
    pub building: String,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructResult {
    pub building_id: Uuid,
    pub building_name: String,
    pub kind: String,
    pub player_id: String,
    pub cost: Decimal,
    pub income_per_minute: Decimal,
}

/// Collect accrued profit from a business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectProfitCommand {
    pub building_id: Uuid,
}

/// Outcome of a collection attempt. `collected == false` means nothing had
/// accrued (or the building is not a business) - a warning, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitResult {
    pub building_id: Uuid,
    pub building_name: String,
    pub owner_id: String,
    pub profit: Decimal,
    pub income_per_minute: Decimal,
    pub collected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemolishCommand {
    pub building_id: Uuid,
    pub demolisher_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemolitionResult {
    pub building_name: String,
    pub kind: String,
    pub owner_id: String,
    /// Profit that was still uncollected at demolition time
    pub accrued_profit: Decimal,
}

// =========================================================================
// Britain: credits
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditIssueCommand {
    pub player_id: String,
    /// Principal (as string for precise decimal)
    pub amount: String,
    pub term_months: i32,
}

impl CreditIssueCommand {
    pub fn new(player_id: impl Into<String>, amount: impl Into<String>, term_months: i32) -> Self {
        Self {
            player_id: player_id.into(),
            amount: amount.into(),
            term_months,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditIssueResult {
    pub player_id: String,
    pub credit_amount: Decimal,
    pub term_months: i32,
    pub monthly_payment: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPaymentCommand {
    pub player_id: String,
    pub amount: String,
}

impl CreditPaymentCommand {
    pub fn new(player_id: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPaymentResult {
    pub player_id: String,
    pub amount: Decimal,
    pub remaining_payments: i32,
    pub closed: bool,
}

/// One row of the credit-listing view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditStatus {
    pub player_id: String,
    pub credit_amount: Decimal,
    pub term_months: i32,
    pub monthly_payment: Decimal,
    pub remaining_payments: i32,
    pub total_paid: Decimal,
    pub last_payment_at: DateTime<Utc>,
    pub seconds_since_payment: i64,
    pub overdue: bool,
}

// =========================================================================
// Britain: privateers
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateerLicenseCommand {
    pub player_id: String,
    pub ship: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateerComplaintCommand {
    pub player_id: String,
    /// Signed: negative retracts complaints
    pub delta: i32,
}

/// One row of the privateer-listing view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateerStatus {
    pub player_id: String,
    pub ship: String,
    pub complaints: i32,
    pub licensed_by: String,
    pub licensed_at: DateTime<Utc>,
    pub tenure_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateerPaymentResult {
    pub player_id: String,
    pub fee: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestAcceptCommand {
    pub player_id: String,
    pub reward: String,
    pub description: String,
}

// =========================================================================
// Counter actions: fixed-price payments over the table
// =========================================================================

/// Player-to-player deal; bookkeeping only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealCommand {
    pub player_a: String,
    pub player_b: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePurchaseCommand {
    pub resource: String,
    pub player_id: String,
    pub quantity: i32,
    pub payment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingCommand {
    pub factory_id: Uuid,
    pub quantity: i32,
    pub payment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryWorkCommand {
    pub player_id: String,
    pub quantity: i32,
    pub payment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipDealSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipDealCommand {
    pub ship: String,
    pub side: ShipDealSide,
    pub player_id: String,
    /// Required when buying; ignored when selling
    #[serde(default)]
    pub payment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalPurchaseCommand {
    pub player_id: String,
    pub amount: String,
    pub payment: String,
}

/// Shared result shape for every over-the-counter payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterResult {
    pub player_id: String,
    pub subject: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub total: Decimal,
    pub change: Decimal,
}

// =========================================================================
// Island: court
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtCommand {
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    pub crime_description: String,
    pub fine_amount: String,
    pub confiscation: bool,
    pub sentence_years: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceResult {
    pub player_id: String,
    pub fine_amount: Decimal,
    pub confiscation: bool,
    pub sentence_years: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseCommand {
    pub player_id: String,
    pub early_release: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResult {
    pub player_id: String,
    pub early_release: bool,
    pub time_served_secs: i64,
}
