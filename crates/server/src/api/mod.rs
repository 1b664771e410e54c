//! # Draft API
//!
//! JSON endpoints over one shared drafting session, plus an SSE stream
//! of session events.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use futures::stream::{self, Stream};
use pokedraft_core::{DraftError, DraftEvent, DraftSession, TeamSlot};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc},
};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Application state
pub struct AppState {
    pub session: Arc<DraftSession>,
    pub event_tx: broadcast::Sender<DraftEvent>,
}

pub type SharedState = Arc<AppState>;

// === API Types ===

#[derive(Serialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub index_loaded: bool,
    pub index_entries: usize,
    pub members: usize,
    pub capacity: usize,
    pub suggestions: Vec<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct SuggestionQuery {
    /// Partial name typed so far
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize, ToSchema)]
pub struct SuggestionsResponse {
    pub query: String,
    pub suggestions: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectRequest {
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct SelectResponse {
    pub selected: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddSlotRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct SlotResponse {
    pub name: String,
    pub image: String,
}

impl From<&TeamSlot> for SlotResponse {
    fn from(slot: &TeamSlot) -> Self {
        Self {
            name: slot.name.clone(),
            image: slot.image.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TeamResponse {
    pub members: Vec<SlotResponse>,
    pub capacity: usize,
}

#[derive(Serialize, ToSchema)]
pub struct FinishResponse {
    pub success: bool,
    pub team: Vec<SlotResponse>,
}

/// `DraftError` as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub DraftError);

impl From<DraftError> for ApiError {
    fn from(e: DraftError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            DraftError::NotFound { .. } => StatusCode::NOT_FOUND,
            DraftError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            DraftError::EmptyTeam => StatusCode::UNPROCESSABLE_ENTITY,
            DraftError::IndexNotReady => StatusCode::SERVICE_UNAVAILABLE,
            DraftError::Catalog(_) | DraftError::Submission(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ApiResponse {
            success: false,
            message: self.0.alert(),
        };
        (status, Json(body)).into_response()
    }
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pokedraft API",
        version = "1.0.0",
        description = "Search the Pokemon catalog and draft a team of six"
    ),
    paths(
        get_status,
        get_suggestions,
        select_suggestion,
        get_team,
        add_slot,
        finish_team
    ),
    components(schemas(
        ApiResponse,
        StatusResponse,
        SuggestionsResponse,
        SelectRequest,
        SelectResponse,
        AddSlotRequest,
        SlotResponse,
        TeamResponse,
        FinishResponse
    )),
    tags(
        (name = "search", description = "Name suggestions"),
        (name = "team", description = "Team drafting and submission")
    )
)]
struct ApiDoc;

// === API Handlers ===

/// Get session status
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "team",
    responses(
        (status = 200, description = "Current session status", body = StatusResponse)
    )
)]
async fn get_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let status = state.session.status().await;
    Json(StatusResponse {
        index_loaded: status.index_loaded,
        index_entries: status.index_entries,
        members: status.members,
        capacity: status.capacity,
        suggestions: status.suggestions,
    })
}

/// Suggest names containing the query
#[utoipa::path(
    get,
    path = "/api/v1/suggestions",
    tag = "search",
    params(SuggestionQuery),
    responses(
        (status = 200, description = "Matching names in catalog order", body = SuggestionsResponse)
    )
)]
async fn get_suggestions(
    State(state): State<SharedState>,
    Query(query): Query<SuggestionQuery>,
) -> Json<SuggestionsResponse> {
    let suggestions = state.session.search(&query.q).await;
    Json(SuggestionsResponse {
        query: query.q,
        suggestions,
    })
}

/// Pick a displayed suggestion
#[utoipa::path(
    post,
    path = "/api/v1/suggestions/select",
    tag = "search",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Selected text, null if it was not displayed", body = SelectResponse)
    )
)]
async fn select_suggestion(
    State(state): State<SharedState>,
    Json(req): Json<SelectRequest>,
) -> Json<SelectResponse> {
    Json(SelectResponse {
        selected: state.session.select_suggestion(&req.text).await,
    })
}

/// Get the provisional team
#[utoipa::path(
    get,
    path = "/api/v1/team",
    tag = "team",
    responses(
        (status = 200, description = "Members in the order they were added", body = TeamResponse)
    )
)]
async fn get_team(State(state): State<SharedState>) -> Json<TeamResponse> {
    let team = state.session.team().await;
    Json(TeamResponse {
        members: team.slots().iter().map(SlotResponse::from).collect(),
        capacity: pokedraft_core::TEAM_SIZE,
    })
}

/// Add a member by exact name
#[utoipa::path(
    post,
    path = "/api/v1/team/slots",
    tag = "team",
    request_body = AddSlotRequest,
    responses(
        (status = 200, description = "Member added", body = SlotResponse),
        (status = 404, description = "Name not in the catalog", body = ApiResponse),
        (status = 409, description = "Team already has six members", body = ApiResponse),
        (status = 502, description = "Catalog unreachable", body = ApiResponse)
    )
)]
async fn add_slot(
    State(state): State<SharedState>,
    Json(req): Json<AddSlotRequest>,
) -> Result<Json<SlotResponse>, ApiError> {
    let slot = state.session.add(&req.name).await?;
    Ok(Json(SlotResponse::from(&slot)))
}

/// Pad the team to six, submit it and start a new one
#[utoipa::path(
    post,
    path = "/api/v1/team/finish",
    tag = "team",
    responses(
        (status = 200, description = "Team submitted", body = FinishResponse),
        (status = 422, description = "Team has no members", body = ApiResponse),
        (status = 502, description = "Backend unreachable", body = ApiResponse)
    )
)]
async fn finish_team(State(state): State<SharedState>) -> Result<Json<FinishResponse>, ApiError> {
    let padded = state.session.finish().await?;
    Ok(Json(FinishResponse {
        success: true,
        team: padded.slots().iter().map(SlotResponse::from).collect(),
    }))
}

/// SSE endpoint for session events with heartbeat
async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_tx.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        let timeout = tokio::time::timeout(std::time::Duration::from_secs(15), rx.recv()).await;

        match timeout {
            Ok(Ok(event)) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            // Slow subscriber; keep going from the oldest retained event
            Ok(Err(broadcast::error::RecvError::Lagged(_))) => {
                Some((Ok(Event::default().comment("lagged")), rx))
            }
            Ok(Err(broadcast::error::RecvError::Closed)) => None,
            Err(_) => Some((Ok(Event::default().comment("heartbeat")), rx)),
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn serve_openapi() -> impl IntoResponse {
    let spec = ApiDoc::openapi().to_json().unwrap_or_default();
    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(spec))
        .unwrap_or_default()
}

pub fn router(state: SharedState) -> Router {
    let team_routes = Router::new()
        .route("/", get(get_team))
        .route("/slots", post(add_slot))
        .route("/finish", post(finish_team));

    let suggestion_routes = Router::new()
        .route("/", get(get_suggestions))
        .route("/select", post(select_suggestion));

    Router::new()
        .nest("/api/v1/team", team_routes)
        .nest("/api/v1/suggestions", suggestion_routes)
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/events", get(events))
        .route("/api/v1/openapi.json", get(serve_openapi))
        .with_state(state)
}

// === Server Entry ===

/// Forward session events to every SSE subscriber
pub fn bridge_events(
    mut event_rx: mpsc::Receiver<DraftEvent>,
    broadcast_tx: broadcast::Sender<DraftEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let _ = broadcast_tx.send(event);
        }
    })
}

pub async fn run_server(
    session: Arc<DraftSession>,
    event_tx: broadcast::Sender<DraftEvent>,
    port: u16,
) -> anyhow::Result<()> {
    let state: SharedState = Arc::new(AppState { session, event_tx });
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Pokedraft API listening on http://{}", addr);
    println!("🚀 Pokedraft running at http://{}", addr);
    println!("   Search:  GET  /api/v1/suggestions?q=");
    println!("   Team:    GET  /api/v1/team, POST /slots, POST /finish");
    println!("   Events:  GET  /api/v1/events (SSE)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
