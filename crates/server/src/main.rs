// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path as AxumPath, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use carbid::SessionTracker;
use carbid_api::{
    ApiError, ApproveRequest, ArrivalRequest, BatchStoreResponse, BidDetailResponse,
    BidStatusResponse, BidSummary, ChecklistAnswerRequest, ClaimBidRequest, ClaimBidResponse,
    CompleteStageRequest, ConsultRequest, ConsultResolveRequest, ConsultResolveResponse,
    CreateBidRequest, CreateBidResponse, DeclineRequest, PrecheckRequest, ReworkRequest,
    StoredFileResponse, SubmitRequest, WizardStepResponse,
};
use carbid_domain::{OperatorId, StagePlan, validate_stage_plan};
use carbid_files::StageStore;
use carbid_notify::{
    NotificationSink, NotifyError, Outbound, ReminderConfig, ReminderScheduler, RoleDirectory,
};
use carbid_persistence::Persistence;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// CarBid Server - vehicle-inspection bid dispatch over HTTP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Directory inspection files are stored under
    #[arg(short, long, default_value = "storage")]
    storage_root: String,

    /// Path to a JSON stage plan; the built-in single-stage plan is
    /// used when omitted
    #[arg(long)]
    stage_plan: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    db: Arc<Mutex<Persistence>>,
    /// In-flight wizard sessions, one per operator.
    sessions: Arc<Mutex<SessionTracker>>,
    /// Stage file storage.
    store: Arc<StageStore>,
    /// The stage plan every wizard walks.
    plan: Arc<StagePlan>,
    /// Where produced notifications go.
    sink: Arc<dyn NotificationSink>,
}

/// A sink that logs deliveries instead of talking to a chat transport.
///
/// The transport integration terminates here; everything upstream only
/// ever sees the [`NotificationSink`] trait.
struct TracingSink;

#[async_trait::async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, outbound: &Outbound) -> Result<(), NotifyError> {
        info!(recipient = ?outbound.recipient, text = %outbound.text, "notification");
        Ok(())
    }
}

/// Delivers an operation's notifications, logging failures per
/// recipient.
async fn deliver_all(sink: &Arc<dyn NotificationSink>, outbounds: Vec<Outbound>) {
    for outbound in outbounds {
        if let Err(err) = sink.deliver(&outbound).await {
            warn!(recipient = ?outbound.recipient, error = %err, "delivery failed");
        }
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// One file in a JSON batch upload.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct BatchFile {
    /// The original file name.
    file_name: String,
    /// Raw file bytes.
    bytes: Vec<u8>,
}

/// Request body for a JSON batch upload.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct BatchStoreApiRequest {
    /// The operator uploading.
    operator_id: OperatorId,
    /// The files, attempted independently.
    files: Vec<BatchFile>,
}

/// Handler for POST `/bids`: intake of a new bid.
async fn handle_create_bid(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<CreateBidRequest>,
) -> Result<Json<CreateBidResponse>, HttpError> {
    let (response, outbounds) = {
        let mut db = state.db.lock().await;
        carbid_api::create_bid(&mut db, request)?
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Handler for POST `/bids/{bid_id}/open`: open a parked bid.
async fn handle_open_bid(
    AxumState(state): AxumState<AppState>,
    AxumPath(bid_id): AxumPath<i64>,
) -> Result<Json<BidStatusResponse>, HttpError> {
    let (response, outbounds) = {
        let mut db = state.db.lock().await;
        carbid_api::open_bid(&mut db, bid_id)?
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Handler for GET `/bids/open`: the open pool.
async fn handle_open_pool(
    AxumState(state): AxumState<AppState>,
) -> Result<Json<Vec<BidSummary>>, HttpError> {
    let mut db = state.db.lock().await;
    Ok(Json(carbid_api::open_pool(&mut db)?))
}

/// Handler for GET `/bids/{bid_id}`: full bid detail.
async fn handle_bid_detail(
    AxumState(state): AxumState<AppState>,
    AxumPath(bid_id): AxumPath<i64>,
) -> Result<Json<BidDetailResponse>, HttpError> {
    let mut db = state.db.lock().await;
    Ok(Json(carbid_api::bid_detail(&mut db, bid_id)?))
}

/// Query parameters for the company bid listing.
#[derive(Debug, Clone, Deserialize)]
struct CompanyBidsParams {
    /// The operator asking; their own in-flight bids are included.
    operator_id: OperatorId,
}

/// Handler for GET `/companies/{company_id}/bids`: the company's open,
/// unclaimed bids plus what the asking operator already holds there.
async fn handle_company_bids(
    AxumState(state): AxumState<AppState>,
    AxumPath(company_id): AxumPath<i64>,
    Query(params): Query<CompanyBidsParams>,
) -> Result<Json<Vec<BidSummary>>, HttpError> {
    let mut db = state.db.lock().await;
    Ok(Json(carbid_api::available_for_company(
        &mut db,
        company_id,
        params.operator_id,
    )?))
}

/// Handler for GET `/operators/{operator_id}/bid`: the bid an operator
/// holds, if any.
async fn handle_held_bid(
    AxumState(state): AxumState<AppState>,
    AxumPath(operator_id): AxumPath<i64>,
) -> Result<Json<Option<BidSummary>>, HttpError> {
    let mut db = state.db.lock().await;
    Ok(Json(carbid_api::held_bid(&mut db, operator_id)?))
}

/// Handler for POST `/bids/{bid_id}/claim`: take a bid from the pool.
async fn handle_claim(
    AxumState(state): AxumState<AppState>,
    AxumPath(bid_id): AxumPath<i64>,
    Json(request): Json<ClaimBidRequest>,
) -> Result<Json<ClaimBidResponse>, HttpError> {
    let (response, outbounds) = {
        let mut db = state.db.lock().await;
        let mut sessions = state.sessions.lock().await;
        carbid_api::claim_bid(&mut db, &mut sessions, bid_id, &request)?
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Handler for POST `/wizard/precheck`.
async fn handle_precheck(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<PrecheckRequest>,
) -> Result<Json<WizardStepResponse>, HttpError> {
    let mut db = state.db.lock().await;
    let mut sessions = state.sessions.lock().await;
    Ok(Json(carbid_api::precheck(&mut db, &mut sessions, &request)?))
}

/// Handler for POST `/wizard/consult`: park the wizard behind a
/// consultation.
async fn handle_request_consult(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<ConsultRequest>,
) -> Result<Json<WizardStepResponse>, HttpError> {
    let mut sessions = state.sessions.lock().await;
    Ok(Json(carbid_api::request_consult(&mut sessions, &request)?))
}

/// Handler for POST `/bids/{bid_id}/consult/resolve`: reviewer answers
/// a pending consultation.
async fn handle_resolve_consult(
    AxumState(state): AxumState<AppState>,
    AxumPath(bid_id): AxumPath<i64>,
    Json(request): Json<ConsultResolveRequest>,
) -> Result<Json<ConsultResolveResponse>, HttpError> {
    let (response, outbounds) = {
        let mut sessions = state.sessions.lock().await;
        carbid_api::resolve_consult(&mut sessions, bid_id, &request)
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Handler for POST `/wizard/arrival`.
async fn handle_arrival(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<ArrivalRequest>,
) -> Result<Json<WizardStepResponse>, HttpError> {
    let mut db = state.db.lock().await;
    let mut sessions = state.sessions.lock().await;
    Ok(Json(carbid_api::record_arrival(
        &mut db,
        &mut sessions,
        &request,
    )?))
}

/// Handler for POST `/wizard/{operator_id}/files/{file_name}`: one raw
/// file body into the current stage.
async fn handle_store_file(
    AxumState(state): AxumState<AppState>,
    AxumPath((operator_id, file_name)): AxumPath<(i64, String)>,
    body: Bytes,
) -> Result<Json<StoredFileResponse>, HttpError> {
    let mut db = state.db.lock().await;
    let sessions = state.sessions.lock().await;
    Ok(Json(
        carbid_api::store_file(
            &mut db,
            &sessions,
            &state.store,
            &state.plan,
            operator_id,
            &file_name,
            &body,
        )
        .await?,
    ))
}

/// Handler for POST `/wizard/files`: a JSON batch into the current
/// stage.
async fn handle_store_batch(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<BatchStoreApiRequest>,
) -> Result<Json<BatchStoreResponse>, HttpError> {
    let files: Vec<(String, Vec<u8>)> = request
        .files
        .into_iter()
        .map(|f| (f.file_name, f.bytes))
        .collect();
    let mut db = state.db.lock().await;
    let sessions = state.sessions.lock().await;
    Ok(Json(
        carbid_api::store_batch(
            &mut db,
            &sessions,
            &state.store,
            &state.plan,
            request.operator_id,
            files,
        )
        .await?,
    ))
}

/// Handler for POST `/wizard/stage/complete`.
async fn handle_complete_stage(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<CompleteStageRequest>,
) -> Result<Json<WizardStepResponse>, HttpError> {
    let mut sessions = state.sessions.lock().await;
    Ok(Json(
        carbid_api::complete_stage(&mut sessions, &state.store, &state.plan, &request).await?,
    ))
}

/// Handler for POST `/wizard/checklist`.
async fn handle_checklist(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<ChecklistAnswerRequest>,
) -> Result<Json<WizardStepResponse>, HttpError> {
    let mut db = state.db.lock().await;
    let mut sessions = state.sessions.lock().await;
    Ok(Json(carbid_api::answer_checklist(
        &mut db,
        &mut sessions,
        &request,
    )?))
}

/// Handler for POST `/wizard/submit`.
async fn handle_submit(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<BidStatusResponse>, HttpError> {
    let (response, outbounds) = {
        let mut db = state.db.lock().await;
        let mut sessions = state.sessions.lock().await;
        carbid_api::submit(&mut db, &mut sessions, &request)?
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Handler for POST `/wizard/decline`: give the held bid back.
async fn handle_decline(
    AxumState(state): AxumState<AppState>,
    Json(request): Json<DeclineRequest>,
) -> Result<Json<BidStatusResponse>, HttpError> {
    let (response, outbounds) = {
        let mut db = state.db.lock().await;
        let mut sessions = state.sessions.lock().await;
        carbid_api::decline(&mut db, &mut sessions, &request)?
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Handler for POST `/bids/{bid_id}/approve`.
async fn handle_approve(
    AxumState(state): AxumState<AppState>,
    AxumPath(bid_id): AxumPath<i64>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<BidStatusResponse>, HttpError> {
    let (response, outbounds) = {
        let mut db = state.db.lock().await;
        carbid_api::approve(&mut db, bid_id, &request)?
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Handler for POST `/bids/{bid_id}/rework`.
async fn handle_rework(
    AxumState(state): AxumState<AppState>,
    AxumPath(bid_id): AxumPath<i64>,
    Json(request): Json<ReworkRequest>,
) -> Result<Json<BidStatusResponse>, HttpError> {
    let (response, outbounds) = {
        let mut db = state.db.lock().await;
        let mut sessions = state.sessions.lock().await;
        carbid_api::request_rework(&mut db, &mut sessions, bid_id, &request)?
    };
    deliver_all(&state.sink, outbounds).await;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/bids", post(handle_create_bid))
        .route("/bids/open", get(handle_open_pool))
        .route("/bids/{bid_id}", get(handle_bid_detail))
        .route("/bids/{bid_id}/open", post(handle_open_bid))
        .route("/bids/{bid_id}/claim", post(handle_claim))
        .route("/bids/{bid_id}/approve", post(handle_approve))
        .route("/bids/{bid_id}/rework", post(handle_rework))
        .route(
            "/bids/{bid_id}/consult/resolve",
            post(handle_resolve_consult),
        )
        .route("/companies/{company_id}/bids", get(handle_company_bids))
        .route("/operators/{operator_id}/bid", get(handle_held_bid))
        .route("/wizard/precheck", post(handle_precheck))
        .route("/wizard/consult", post(handle_request_consult))
        .route("/wizard/arrival", post(handle_arrival))
        .route("/wizard/files", post(handle_store_batch))
        .route(
            "/wizard/{operator_id}/files/{file_name}",
            post(handle_store_file),
        )
        .route("/wizard/stage/complete", post(handle_complete_stage))
        .route("/wizard/checklist", post(handle_checklist))
        .route("/wizard/submit", post(handle_submit))
        .route("/wizard/decline", post(handle_decline))
        .with_state(app_state)
}

/// Loads the stage plan from a JSON file, or falls back to the
/// built-in single-stage plan.
fn load_plan(path: Option<&str>) -> Result<StagePlan, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(StagePlan::standard());
    };
    let text: String = std::fs::read_to_string(path)?;
    let stages = serde_json::from_str(&text)?;
    let plan: StagePlan = StagePlan::new(stages)?;
    validate_stage_plan(&plan)?;
    Ok(plan)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CarBid Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    let plan: StagePlan = load_plan(args.stage_plan.as_deref())?;

    let db: Arc<Mutex<Persistence>> = Arc::new(Mutex::new(persistence));
    let sink: Arc<dyn NotificationSink> = Arc::new(TracingSink);
    let app_state: AppState = AppState {
        db: Arc::clone(&db),
        sessions: Arc::new(Mutex::new(SessionTracker::new())),
        store: Arc::new(StageStore::new(args.storage_root.clone())),
        plan: Arc::new(plan),
        sink: Arc::clone(&sink),
    };

    let roles: Arc<RoleDirectory> = Arc::new(RoleDirectory::new(Arc::clone(&db)));
    let scheduler: ReminderScheduler =
        ReminderScheduler::new(db, roles, sink, ReminderConfig::default());
    tokio::spawn(scheduler.run());

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
