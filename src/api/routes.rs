//! API Routes
//!
//! HTTP endpoint definitions for both tables plus the shared log, player
//! and statistics queries.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{ActionLogEntry, ActionLogService, ChainVerificationResult, LogFilter};
use crate::domain::{ModeratorContext, Table};
use crate::engine::PriceDefaults;
use crate::error::AppError;
use crate::handlers::{
    BuildingHandler, CoalPurchaseCommand, CollectProfitCommand, ConstructCommand,
    ConstructResult, CounterHandler, CounterResult, CourtCommand, CourtHandler,
    CreditHandler, CreditIssueCommand, CreditIssueResult, CreditPaymentCommand,
    CreditPaymentResult, CreditStatus, DealCommand, DemolishCommand, DemolitionResult,
    FactoryWorkCommand, PrivateerComplaintCommand, PrivateerHandler, PrivateerLicenseCommand,
    PrivateerPaymentResult, PrivateerStatus, ProcessingCommand, ProfitResult, QuestAcceptCommand,
    QuoteResult, ReleaseCommand, ReleaseResult, ResourcePurchaseCommand, SaleCommand, SaleResult,
    SentenceResult, ShipDealCommand,
};
use crate::store::SessionRepository;

/// Shared state for all routes
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub price_defaults: PriceDefaults,
    pub credit_overdue_secs: i64,
    pub privateer_fee_fallback: rust_decimal::Decimal,
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub table: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_id: Uuid,
    pub username: String,
    pub table: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRef {
    pub player_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default = "default_stats_days")]
    pub days: i64,
}

fn default_stats_days() -> i64 {
    30
}

#[derive(Debug, Serialize)]
pub struct ActionCount {
    pub action: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyCount {
    pub day: chrono::NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub table: String,
    pub days: i64,
    pub total_count: i64,
    pub actions: Vec<ActionCount>,
    pub daily: Vec<DailyCount>,
    pub island: IslandStats,
    pub britain: BritainStats,
}

#[derive(Debug, Serialize)]
pub struct IslandStats {
    pub buildings: usize,
    pub convicts: usize,
}

#[derive(Debug, Serialize)]
pub struct BritainStats {
    pub credits: usize,
    pub privateers: usize,
}

#[derive(Debug, Serialize)]
pub struct PlayerSummary {
    pub player_id: String,
    pub transactions_count: usize,
    pub recent: Vec<ActionLogEntry>,
    pub convict: Option<ReleaseResult>,
    pub buildings: usize,
    pub credit: Option<CreditStatus>,
    pub privateer: Option<PrivateerStatus>,
}

// =========================================================================
// API Router
// =========================================================================

/// Routes that require an active session.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        // Island table
        .route("/island/deal", post(island_deal))
        .route("/island/court", post(island_court))
        .route("/island/release", post(island_release))
        .route("/island/purchase", post(island_purchase))
        .route("/island/build", post(island_build))
        .route("/island/process", post(island_process))
        .route("/island/profit", post(island_profit))
        .route("/island/demolish", post(island_demolish))
        .route("/island/businesses", get(island_businesses))
        .route("/island/buildings/:building_id/profit", get(building_profit))
        .route("/island/convicts/:player_id/time", get(convict_time))
        // Britain table
        .route("/britain/sale", post(britain_sale))
        .route("/britain/prices/:good", get(britain_price))
        .route("/britain/ship-deal", post(britain_ship_deal))
        .route("/britain/factory-work", post(britain_factory_work))
        .route("/britain/coal", post(britain_coal))
        .route("/britain/credits", get(britain_credits).post(britain_credit_issue))
        .route("/britain/credits/payment", post(britain_credit_payment))
        .route("/britain/privateers", get(britain_privateers))
        .route("/britain/privateers/license", post(privateer_license))
        .route("/britain/privateers/dismiss", post(privateer_dismiss))
        .route("/britain/privateers/ship", post(privateer_ship))
        .route("/britain/privateers/complaint", post(privateer_complaint))
        .route("/britain/privateers/payment", post(privateer_payment))
        .route("/britain/quest", post(britain_quest))
        // Shared queries
        .route("/log", get(log_list))
        .route("/log/verify", get(log_verify))
        .route("/log/:id", get(log_detail))
        .route("/players/:player_id", get(player_summary))
        .route("/stats", get(stats))
}

// =========================================================================
// Session endpoints
// =========================================================================

/// Log in with a display name and a table; no password by design.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidRequest("username must not be empty".into()));
    }

    let table = Table::parse(&request.table)
        .ok_or_else(|| AppError::InvalidRequest(format!("unknown table: {}", request.table)))?;

    let session = SessionRepository::new(state.pool.clone())
        .create(username, table)
        .await?;

    tracing::info!(username, table = %table, session_id = %session.session_id, "Moderator logged in");

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            session_id: session.session_id,
            username: session.username,
            table: session.table.as_str().to_string(),
        }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
) -> Result<StatusCode, AppError> {
    SessionRepository::new(state.pool.clone())
        .deactivate(context.session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Island table
// =========================================================================

async fn island_deal(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<DealCommand>,
) -> Result<StatusCode, AppError> {
    CounterHandler::new(state.pool.clone())
        .deal(command, &context)
        .await?;
    Ok(StatusCode::CREATED)
}

async fn island_court(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<CourtCommand>,
) -> Result<(StatusCode, Json<SentenceResult>), AppError> {
    let result = CourtHandler::new(state.pool.clone())
        .sentence(command, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn island_release(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<ReleaseCommand>,
) -> Result<Json<ReleaseResult>, AppError> {
    let result = CourtHandler::new(state.pool.clone())
        .release(command, &context)
        .await?;
    Ok(Json(result))
}

async fn island_purchase(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<ResourcePurchaseCommand>,
) -> Result<Json<CounterResult>, AppError> {
    let result = CounterHandler::new(state.pool.clone())
        .purchase_resource(command, &context)
        .await?;
    Ok(Json(result))
}

async fn island_build(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<ConstructCommand>,
) -> Result<(StatusCode, Json<ConstructResult>), AppError> {
    let result = BuildingHandler::new(state.pool.clone())
        .construct(command, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn island_process(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<ProcessingCommand>,
) -> Result<Json<CounterResult>, AppError> {
    let result = CounterHandler::new(state.pool.clone())
        .process_resource(command, &context)
        .await?;
    Ok(Json(result))
}

async fn island_profit(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<CollectProfitCommand>,
) -> Result<Json<ProfitResult>, AppError> {
    let result = BuildingHandler::new(state.pool.clone())
        .collect(command, &context)
        .await?;
    Ok(Json(result))
}

async fn island_demolish(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<DemolishCommand>,
) -> Result<Json<DemolitionResult>, AppError> {
    let result = BuildingHandler::new(state.pool.clone())
        .demolish(command, &context)
        .await?;
    Ok(Json(result))
}

async fn island_businesses(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfitResult>>, AppError> {
    let result = BuildingHandler::new(state.pool.clone())
        .list_businesses()
        .await?;
    Ok(Json(result))
}

async fn building_profit(
    State(state): State<AppState>,
    Path(building_id): Path<Uuid>,
) -> Result<Json<ProfitResult>, AppError> {
    let result = BuildingHandler::new(state.pool.clone())
        .accrued(building_id)
        .await?;
    Ok(Json(result))
}

async fn convict_time(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ReleaseResult>, AppError> {
    let result = CourtHandler::new(state.pool.clone())
        .time_served(&player_id)
        .await?;
    Ok(Json(result))
}

// =========================================================================
// Britain table
// =========================================================================

async fn britain_sale(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<SaleCommand>,
) -> Result<Json<SaleResult>, AppError> {
    let result = sale_handler(&state).execute(command, &context).await?;
    Ok(Json(result))
}

async fn britain_price(
    State(state): State<AppState>,
    Path(good): Path<String>,
) -> Result<Json<QuoteResult>, AppError> {
    let result = sale_handler(&state).quote(&good).await?;
    Ok(Json(result))
}

async fn britain_ship_deal(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<ShipDealCommand>,
) -> Result<Json<CounterResult>, AppError> {
    let result = CounterHandler::new(state.pool.clone())
        .ship_deal(command, &context)
        .await?;
    Ok(Json(result))
}

async fn britain_factory_work(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<FactoryWorkCommand>,
) -> Result<Json<CounterResult>, AppError> {
    let result = CounterHandler::new(state.pool.clone())
        .factory_work(command, &context)
        .await?;
    Ok(Json(result))
}

async fn britain_coal(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<CoalPurchaseCommand>,
) -> Result<Json<CounterResult>, AppError> {
    let result = CounterHandler::new(state.pool.clone())
        .purchase_coal(command, &context)
        .await?;
    Ok(Json(result))
}

async fn britain_credits(
    State(state): State<AppState>,
) -> Result<Json<Vec<CreditStatus>>, AppError> {
    let result = CreditHandler::new(state.pool.clone(), state.credit_overdue_secs)
        .list()
        .await?;
    Ok(Json(result))
}

async fn britain_credit_issue(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<CreditIssueCommand>,
) -> Result<(StatusCode, Json<CreditIssueResult>), AppError> {
    let result = CreditHandler::new(state.pool.clone(), state.credit_overdue_secs)
        .issue(command, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn britain_credit_payment(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<CreditPaymentCommand>,
) -> Result<Json<CreditPaymentResult>, AppError> {
    let result = CreditHandler::new(state.pool.clone(), state.credit_overdue_secs)
        .pay(command, &context)
        .await?;
    Ok(Json(result))
}

async fn britain_privateers(
    State(state): State<AppState>,
) -> Result<Json<Vec<PrivateerStatus>>, AppError> {
    let result = privateer_handler(&state).list_active().await?;
    Ok(Json(result))
}

async fn privateer_license(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<PrivateerLicenseCommand>,
) -> Result<(StatusCode, Json<PrivateerStatus>), AppError> {
    let result = privateer_handler(&state).license(command, &context).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn privateer_dismiss(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(request): Json<PlayerRef>,
) -> Result<StatusCode, AppError> {
    privateer_handler(&state)
        .dismiss(&request.player_id, &context)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn privateer_ship(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<PrivateerLicenseCommand>,
) -> Result<Json<PrivateerStatus>, AppError> {
    let result = privateer_handler(&state)
        .change_ship(command, &context)
        .await?;
    Ok(Json(result))
}

async fn privateer_complaint(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<PrivateerComplaintCommand>,
) -> Result<Json<PrivateerStatus>, AppError> {
    let result = privateer_handler(&state)
        .complaint(command, &context)
        .await?;
    Ok(Json(result))
}

async fn privateer_payment(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(request): Json<PlayerRef>,
) -> Result<Json<PrivateerPaymentResult>, AppError> {
    let result = privateer_handler(&state)
        .pay(&request.player_id, &context)
        .await?;
    Ok(Json(result))
}

async fn britain_quest(
    State(state): State<AppState>,
    Extension(context): Extension<ModeratorContext>,
    Json(command): Json<QuestAcceptCommand>,
) -> Result<StatusCode, AppError> {
    privateer_handler(&state)
        .accept_quest(command, &context)
        .await?;
    Ok(StatusCode::CREATED)
}

// =========================================================================
// Shared queries
// =========================================================================

async fn log_list(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<ActionLogEntry>>, AppError> {
    let table = query
        .table
        .as_deref()
        .map(|t| {
            Table::parse(t).ok_or_else(|| AppError::InvalidRequest(format!("unknown table: {t}")))
        })
        .transpose()?;

    let filter = LogFilter {
        table,
        action: query.action,
        player_id: query.player_id,
        date_from: query.date_from,
        date_to: query.date_to,
        limit: query.limit,
        offset: query.offset,
    };

    let entries = ActionLogService::new(state.pool.clone()).query(&filter).await?;
    Ok(Json(entries))
}

async fn log_verify(
    State(state): State<AppState>,
) -> Result<Json<ChainVerificationResult>, AppError> {
    let result = ActionLogService::new(state.pool.clone())
        .verify_hash_chain(None)
        .await?;
    Ok(Json(result))
}

async fn log_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionLogEntry>, AppError> {
    let entry = ActionLogService::new(state.pool.clone())
        .get(id)
        .await?
        .ok_or(AppError::LogEntryNotFound(id))?;
    Ok(Json(entry))
}

async fn player_summary(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerSummary>, AppError> {
    let log = ActionLogService::new(state.pool.clone());
    let entries = log.get_by_player(&player_id, 100).await?;

    let court = CourtHandler::new(state.pool.clone());
    let convict = match court.time_served(&player_id).await {
        Ok(result) => Some(result),
        Err(AppError::ConvictNotFound(_)) => None,
        Err(e) => return Err(e),
    };

    let buildings = crate::store::BuildingRepository::new(state.pool.clone())
        .list_by_owner(&player_id)
        .await?;

    let credit = CreditHandler::new(state.pool.clone(), state.credit_overdue_secs)
        .for_player(&player_id)
        .await?;

    let privateer = privateer_handler(&state)
        .list_active()
        .await?
        .into_iter()
        .find(|p| p.player_id == player_id);

    Ok(Json(PlayerSummary {
        player_id,
        transactions_count: entries.len(),
        recent: entries,
        convict,
        buildings: buildings.len(),
        credit,
        privateer,
    }))
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let table = query
        .table
        .as_deref()
        .map(|t| {
            Table::parse(t).ok_or_else(|| AppError::InvalidRequest(format!("unknown table: {t}")))
        })
        .transpose()?;

    let days = query.days.clamp(1, 365);
    let since = Utc::now() - Duration::days(days);

    let log = ActionLogService::new(state.pool.clone());
    let actions = log.count_by_action(table, since).await?;
    let daily = log.count_by_day(table, since).await?;
    let total_count = actions.iter().map(|(_, c)| c).sum();

    let island = IslandStats {
        buildings: crate::store::BuildingRepository::new(state.pool.clone())
            .list()
            .await?
            .len(),
        convicts: crate::store::ConvictRepository::new(state.pool.clone())
            .list()
            .await?
            .len(),
    };
    let britain = BritainStats {
        credits: crate::store::CreditRepository::new(state.pool.clone())
            .list()
            .await?
            .len(),
        privateers: privateer_handler(&state).list_active().await?.len(),
    };

    Ok(Json(StatsResponse {
        table: table.map(|t| t.as_str().to_string()).unwrap_or_else(|| "all".to_string()),
        days,
        total_count,
        actions: actions
            .into_iter()
            .map(|(action, count)| ActionCount { action, count })
            .collect(),
        daily: daily
            .into_iter()
            .map(|(day, count)| DailyCount { day, count })
            .collect(),
        island,
        britain,
    }))
}

// =========================================================================
// Handler construction helpers
// =========================================================================

fn sale_handler(state: &AppState) -> crate::handlers::SaleHandler {
    crate::handlers::SaleHandler::new(state.pool.clone(), state.price_defaults)
}

fn privateer_handler(state: &AppState) -> PrivateerHandler {
    PrivateerHandler::new(state.pool.clone(), state.privateer_fee_fallback)
}
