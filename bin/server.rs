// Team Builder - Web Server
// JSON API over the catalog client and a single shared team

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use team_builder::{
    init_tracing, CatalogClient, Config, NamedResource, Pokemon, PokemonKey, Status, Team,
    TeamStats, TeamStore, DEFAULT_SEARCH_LIMIT,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: TeamStore,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(data: T, error: Option<String>) -> Self {
        Self {
            success: false,
            data,
            error,
        }
    }
}

/// Team response: slots, coverage, stats and the shared status
#[derive(Serialize)]
struct TeamResponse {
    team: Team,
    stats: TeamStats,
    status: Status,
}

impl TeamResponse {
    fn from_store(store: &TeamStore) -> Self {
        Self {
            team: store.team(),
            stats: store.stats(),
            status: store.status().snapshot(),
        }
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct PlaceRequest {
    pokemon: String,
}

fn parse_key(raw: String) -> PokemonKey {
    match raw.parse::<u32>() {
        Ok(id) => id.into(),
        Err(_) => raw.into(),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/pokemon - All names in catalog order
async fn list_names(State(state): State<AppState>) -> impl IntoResponse {
    let names = state.store.catalog().list_all_names().await;
    Json(ApiResponse::ok(names))
}

/// GET /api/pokemon/:key - One Pokemon by name or id
async fn get_pokemon(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let catalog = state.store.catalog();

    match catalog.fetch_by_name_or_id(parse_key(key)).await {
        Some(pokemon) => (StatusCode::OK, Json(ApiResponse::ok(Some(pokemon)))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Option<Pokemon>>::failed(None, catalog.status().error())),
        )
            .into_response(),
    }
}

/// GET /api/search?q=&limit= - Substring search over names
async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let found: Vec<NamedResource> = state.store.catalog().search(&params.q, limit).await;
    Json(ApiResponse::ok(found))
}

/// GET /api/team - Current team
async fn get_team(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(TeamResponse::from_store(&state.store)))
}

/// GET /api/stats - Team statistics only
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.store.stats()))
}

/// PUT /api/team/:slot - Place a Pokemon into a slot
async fn place_pokemon(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
    Json(request): Json<PlaceRequest>,
) -> Response {
    let store = &state.store;

    match store.place(parse_key(request.pokemon), slot).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(TeamResponse::from_store(store)))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failed(TeamResponse::from_store(store), store.status().error())),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failed(TeamResponse::from_store(store), Some(e.to_string()))),
        )
            .into_response(),
    }
}

/// DELETE /api/team/:slot - Empty a slot
async fn remove_pokemon(State(state): State<AppState>, Path(slot): Path<usize>) -> Response {
    let store = &state.store;

    match store.remove(slot) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(TeamResponse::from_store(store)))).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failed(TeamResponse::from_store(store), Some(e.to_string()))),
        )
            .into_response(),
    }
}

/// DELETE /api/team - Clear every slot
async fn clear_team(State(state): State<AppState>) -> impl IntoResponse {
    state.store.clear();
    Json(ApiResponse::ok(TeamResponse::from_store(&state.store)))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/pokemon", get(list_names))
        .route("/pokemon/:key", get(get_pokemon))
        .route("/search", get(search))
        .route("/stats", get(get_stats))
        .route("/team", get(get_team).delete(clear_team))
        .route("/team/:slot", axum::routing::put(place_pokemon).delete(remove_pokemon))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info,tower_http=debug", false);

    let config = Config::from_env().context("loading configuration")?;
    info!(base_url = %config.base_url, "using catalog");

    let client = CatalogClient::new(&config);
    let state = AppState {
        store: TeamStore::new(client, config.type_universe),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "team-server listening");
    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/team", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn router_with_catalog() -> (Router, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/pikachu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 25,
                "name": "pikachu",
                "types": [{ "slot": 1, "type": { "name": "electric", "url": "https://pokeapi.co/api/v2/type/13/" } }],
                "sprites": { "front_default": "https://img.example/25.png" }
            })))
            .mount(&server)
            .await;

        let config = Config {
            base_url: server.uri(),
            ..Config::default()
        };
        let state = AppState {
            store: TeamStore::new(CatalogClient::new(&config), config.type_universe),
        };
        (build_router(state), server)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn put_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_place_and_read_team() {
        let (router, _server) = router_with_catalog().await;

        let (status, body) = send(&router, put_json("/api/team/0", json!({ "pokemon": "Pikachu" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stats"]["type_coverage"], 6);

        let request = Request::builder().uri("/api/team").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["team"]["slots"][0]["name"], "pikachu");
        assert_eq!(body["data"]["team"]["covered_types"], json!(["electric"]));
    }

    #[tokio::test]
    async fn test_invalid_slot_is_bad_request() {
        let (router, _server) = router_with_catalog().await;

        let (status, body) = send(&router, put_json("/api/team/7", json!({ "pokemon": "pikachu" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid team position");
    }

    #[tokio::test]
    async fn test_unknown_pokemon_is_not_found() {
        let (router, _server) = router_with_catalog().await;

        let request = Request::builder().uri("/api/pokemon/bad-name-xyz").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Pokemon not found");
    }

    #[tokio::test]
    async fn test_clear_team() {
        let (router, _server) = router_with_catalog().await;
        send(&router, put_json("/api/team/2", json!({ "pokemon": "pikachu" }))).await;

        let request = Request::builder().method("DELETE").uri("/api/team").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stats"]["filled_slots"], 0);
        assert_eq!(body["data"]["team"]["covered_types"], json!([]));
    }
}
