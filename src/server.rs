//! HTTP API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/health` | Status, version, and record counts |
//! | `POST` | `/api/chat` | Intent-routed analysis of a query |
//! | `POST` | `/api/search/companies` | Ranked companies for `{query, limit?, explain?}` |
//! | `POST` | `/api/search/news` | Ranked articles for `{query, limit?, explain?}` |
//! | `POST` | `/api/classify` | Intent classification and keyword scores |
//! | `GET`  | `/api/companies` | Every stored company |
//! | `GET`  | `/api/latest-news` | Newest articles, one per title |
//! | `GET`  | `/api/dashboard/companies` | Companies matching query-string filters |
//! | `GET`  | `/api/dashboard/filters` | Distinct filter values |
//! | `POST` | `/api/dashboard/add-company` | Validate and insert one company |
//! | `POST` | `/api/debug/query-breakdown` | Every processing step for a query |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `conflict` (409),
//! `store_unavailable` (503), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use msme_core::dashboard::{filter_options, latest_articles, CompanyFilter, FilterOptions};
use msme_core::intent::{classify_intent, intent_scores, IntentScores};
use msme_core::models::{Article, Company, Scored};
use msme_core::rank::{is_generic_query, RankOptions};
use msme_core::store::{DuplicateCompany, StoreCounts};
use msme_core::text::extract_keywords;

use crate::chat::{run_chat, ChatResponse};
use crate::config::Config;
use crate::ingest::prepare_company;
use crate::search::{classify_query, search_companies, search_news, Classification};
use crate::state::AppState;

/// Articles returned by `/api/latest-news` when no limit is given.
const LATEST_NEWS_DEFAULT: usize = 10;

/// Build the API router over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .route("/api/search/companies", post(handle_search_companies))
        .route("/api/search/news", post(handle_search_news))
        .route("/api/classify", post(handle_classify))
        .route("/api/companies", get(handle_companies))
        .route("/api/latest-news", get(handle_latest_news))
        .route("/api/dashboard/companies", get(handle_dashboard_companies))
        .route("/api/dashboard/filters", get(handle_dashboard_filters))
        .route("/api/dashboard/add-company", post(handle_add_company))
        .route("/api/debug/query-breakdown", post(handle_query_breakdown))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::new(config.clone()).await?;
    tracing::info!(
        narrative = state.narrator.name(),
        locations = state.gazetteer.locations().len(),
        sectors = state.gazetteer.sectors().len(),
        "state ready"
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "HTTP server listening");
    println!("MSME Insight API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn conflict(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::CONFLICT,
        code: "conflict",
        message: message.into(),
    }
}

fn store_unavailable(err: anyhow::Error) -> AppError {
    tracing::warn!(error = %format!("{:#}", err), "store unavailable");
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "store_unavailable",
        message: format!("{:#}", err),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    tracing::error!(error = %format!("{:#}", err), "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: format!("{:#}", err),
    }
}

fn require_query(query: &str) -> Result<&str, AppError> {
    let query = query.trim();
    if query.is_empty() {
        Err(bad_request("query must not be empty"))
    } else {
        Ok(query)
    }
}

// ============ Request bodies ============

#[derive(Deserialize)]
struct QueryRequest {
    #[serde(default, alias = "message")]
    query: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    explain: bool,
}

#[derive(Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

async fn handle_not_found(uri: axum::http::Uri) -> AppError {
    not_found(format!("no route for {}", uri.path()))
}

// ============ GET /api/health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    narrative_provider: String,
    counts: StoreCounts,
}

async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let counts = state.store.counts().await.map_err(store_unavailable)?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        narrative_provider: state.narrator.name().to_string(),
        counts,
    }))
}

// ============ POST /api/chat ============

async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let query = require_query(&req.query)?;
    let response = run_chat(&state, query).await.map_err(internal)?;
    Ok(Json(response))
}

// ============ POST /api/search/* ============

#[derive(Serialize)]
struct SearchResponse<T: Serialize> {
    query: String,
    total: usize,
    results: Vec<Scored<T>>,
}

fn rank_options(state: &AppState, req: &SearchRequest, default_limit: usize) -> RankOptions {
    let mut opts = RankOptions::new(state.config.retrieval.clamp(req.limit, default_limit));
    opts.explain = req.explain;
    opts
}

async fn handle_search_companies(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse<Company>>, AppError> {
    let query = require_query(&req.query)?;
    let opts = rank_options(&state, &req, state.config.retrieval.company_limit);
    let results = search_companies(&state, query, opts)
        .await
        .map_err(store_unavailable)?;
    Ok(Json(SearchResponse {
        query: query.to_string(),
        total: results.len(),
        results,
    }))
}

async fn handle_search_news(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse<Article>>, AppError> {
    let query = require_query(&req.query)?;
    let opts = rank_options(&state, &req, state.config.retrieval.news_limit);
    let results = search_news(&state, query, opts)
        .await
        .map_err(store_unavailable)?;
    Ok(Json(SearchResponse {
        query: query.to_string(),
        total: results.len(),
        results,
    }))
}

// ============ POST /api/classify ============

async fn handle_classify(Json(req): Json<QueryRequest>) -> Result<Json<Classification>, AppError> {
    let query = require_query(&req.query)?;
    Ok(Json(classify_query(query)))
}

// ============ Listings ============

#[derive(Serialize)]
struct CompanyList {
    total: usize,
    companies: Vec<Company>,
}

async fn handle_companies(State(state): State<AppState>) -> Result<Json<CompanyList>, AppError> {
    let companies = state.store.find_companies().await.map_err(store_unavailable)?;
    Ok(Json(CompanyList {
        total: companies.len(),
        companies,
    }))
}

#[derive(Serialize)]
struct ArticleList {
    total: usize,
    articles: Vec<Article>,
}

async fn handle_latest_news(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<ArticleList>, AppError> {
    let articles = state.store.find_articles().await.map_err(store_unavailable)?;
    let limit = state.config.retrieval.clamp(params.limit, LATEST_NEWS_DEFAULT);
    let articles = latest_articles(&articles, limit);
    Ok(Json(ArticleList {
        total: articles.len(),
        articles,
    }))
}

async fn handle_dashboard_companies(
    State(state): State<AppState>,
    Query(filter): Query<CompanyFilter>,
) -> Result<Json<CompanyList>, AppError> {
    let all = state.store.find_companies().await.map_err(store_unavailable)?;
    let companies: Vec<Company> = filter.apply(&all).into_iter().cloned().collect();
    Ok(Json(CompanyList {
        total: companies.len(),
        companies,
    }))
}

async fn handle_dashboard_filters(
    State(state): State<AppState>,
) -> Result<Json<FilterOptions>, AppError> {
    let all = state.store.find_companies().await.map_err(store_unavailable)?;
    Ok(Json(filter_options(&all)))
}

// ============ POST /api/dashboard/add-company ============

#[derive(Serialize)]
struct AddCompanyResponse {
    success: bool,
    message: String,
    company: Company,
}

async fn handle_add_company(
    State(state): State<AppState>,
    Json(company): Json<Company>,
) -> Result<(StatusCode, Json<AddCompanyResponse>), AppError> {
    let company = prepare_company(company);

    let required = [
        ("name", &company.name),
        ("sector", &company.sector),
        ("location", &company.location),
        ("primary_products", &company.primary_products),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(bad_request(format!("missing required field: {}", field)));
    }

    if let Err(e) = state.store.insert_company(&company).await {
        if let Some(dup) = e.downcast_ref::<DuplicateCompany>() {
            return Err(conflict(dup.to_string()));
        }
        return Err(store_unavailable(e));
    }

    tracing::info!(name = %company.name, id = %company.id, "company added");
    Ok((
        StatusCode::CREATED,
        Json(AddCompanyResponse {
            success: true,
            message: format!("Company {} added successfully", company.name),
            company,
        }),
    ))
}

// ============ POST /api/debug/query-breakdown ============

#[derive(Serialize)]
struct QueryAnalysis {
    lowercase_query: String,
    locations: Vec<String>,
    sectors: Vec<String>,
    keywords: Vec<String>,
    query_length: usize,
    word_count: usize,
    generic: bool,
}

#[derive(Serialize)]
struct IntentBreakdown {
    scores: IntentScores,
    primary_intent: &'static str,
    /// Highest keyword count divided by the word count.
    confidence: f64,
    workflows: Vec<&'static str>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum StoreState {
    Ok { counts: StoreCounts },
    Unavailable { error: String },
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SearchState {
    Ok { results_count: usize },
    Failed { error: String },
}

#[derive(Serialize)]
struct SearchExecution {
    companies: SearchState,
    news: SearchState,
}

#[derive(Serialize)]
struct QueryBreakdown {
    query: String,
    timestamp: String,
    analysis: QueryAnalysis,
    intent: IntentBreakdown,
    store: StoreState,
    search: SearchExecution,
}

fn search_state<T>(result: anyhow::Result<Vec<T>>) -> SearchState {
    match result {
        Ok(results) => SearchState::Ok {
            results_count: results.len(),
        },
        Err(e) => SearchState::Failed {
            error: format!("{:#}", e),
        },
    }
}

async fn handle_query_breakdown(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryBreakdown>, AppError> {
    let query = require_query(&req.query)?;
    let tags = state.gazetteer.tag(query);
    let word_count = query.split_whitespace().count();

    let scores = intent_scores(query);
    let intents = classify_intent(query);

    let store = match state.store.counts().await {
        Ok(counts) => StoreState::Ok { counts },
        Err(e) => StoreState::Unavailable {
            error: format!("{:#}", e),
        },
    };

    let retrieval = &state.config.retrieval;
    let companies = search_companies(&state, query, RankOptions::new(retrieval.company_limit)).await;
    let news = search_news(&state, query, RankOptions::new(retrieval.news_limit)).await;

    Ok(Json(QueryBreakdown {
        query: query.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        analysis: QueryAnalysis {
            lowercase_query: query.to_lowercase(),
            locations: tags.locations,
            sectors: tags.sectors,
            keywords: extract_keywords(query),
            query_length: query.chars().count(),
            word_count,
            generic: is_generic_query(query),
        },
        intent: IntentBreakdown {
            primary_intent: scores.primary(),
            confidence: if word_count == 0 {
                0.0
            } else {
                scores.max() as f64 / word_count as f64
            },
            workflows: intents.iter().map(|i| i.workflow()).collect(),
            scores,
        },
        store,
        search: SearchExecution {
            companies: search_state(companies),
            news: search_state(news),
        },
    }))
}
