use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use msme_core::models::{Article, Company};
use msme_core::narrative::TemplateProvider;
use msme_core::store::memory::InMemoryStore;
use msme_insight::config::parse_config;
use msme_insight::ingest::{prepare_article, prepare_company};
use msme_insight::server::router;
use msme_insight::state::AppState;

fn company(name: &str, sector: &str, location: &str, products: &str) -> Company {
    prepare_company(Company {
        name: name.to_string(),
        sector: sector.to_string(),
        location: location.to_string(),
        primary_products: products.to_string(),
        ..Default::default()
    })
}

fn article(title: &str, description: &str, published_at: &str) -> Article {
    prepare_article(Article {
        title: title.to_string(),
        description: description.to_string(),
        source: "ET".to_string(),
        published_at: published_at.to_string(),
        ..Default::default()
    })
}

fn test_app() -> Router {
    let config = parse_config(
        r#"
[db]
path = "unused.sqlite"

[retrieval]
company_limit = 5
news_limit = 10
max_limit = 20
"#,
    )
    .unwrap();

    let mut shakti = company("Shakti Looms", "Textiles", "Surat, Gujarat", "Silk sarees");
    shakti.export_markets = "USA, UAE".to_string();
    shakti.revenue = Some(200.0);
    shakti.profit = Some(30.0);
    shakti.performance_rating = Some("Strong".to_string());

    let companies = vec![
        shakti,
        company("Kaveri Spinning", "Textile", "Coimbatore, Tamil Nadu", "Cotton yarn"),
        company("Deccan Pharma", "Pharmaceutical", "Hyderabad, Telangana", "Generic tablets"),
    ];
    let articles = vec![
        article("Monsoon update", "Rainfall outlook for farmers", "2024-06-01T08:00:00Z"),
        article(
            "Textile exports rise",
            "Surat textile exporters report strong orders",
            "2024-05-20T08:00:00Z",
        ),
        article("Undated note", "No publication date", ""),
    ];

    let state = AppState::with_parts(
        config,
        Arc::new(InMemoryStore::with_records(companies, articles)),
        Arc::new(TemplateProvider),
    );
    router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_reports_counts() {
    let (status, body) = get(test_app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["narrative_provider"], "template");
    assert_eq!(body["counts"]["companies"], 3);
    assert_eq!(body["counts"]["articles"], 3);
}

#[tokio::test]
async fn test_chat_routes_intents() {
    let (status, body) = post(
        test_app(),
        "/api/chat",
        json!({"query": "What is the latest growth strategy news for textile MSMEs?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agents_used"], json!(["news_analyst", "growth_strategist"]));
    assert_eq!(body["structured_data"]["summary"]["confidence_score"], 50);
    assert_eq!(
        body["structured_data"]["growth_recommendations"]["sector"],
        "textile"
    );
    assert!(body["structured_data"].get("financial_reports").is_none());
    assert!(body["response"].as_str().unwrap().contains("Growth Recommendations"));
}

#[tokio::test]
async fn test_chat_accepts_message_alias() {
    let (status, body) = post(test_app(), "/api/chat", json!({"message": "hello"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agents_used"], json!(["basic_search"]));
    assert_eq!(body["intent_detection"]["fallback"], true);
}

#[tokio::test]
async fn test_chat_rejects_empty_query() {
    let (status, body) = post(test_app(), "/api/chat", json!({"query": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_search_companies_with_explain() {
    let (status, body) = post(
        test_app(),
        "/api/search/companies",
        json!({"query": "textile manufacturers in surat", "explain": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let top = &body["results"][0];
    assert_eq!(top["name"], "Shakti Looms");
    assert_eq!(top["explain"]["location_bonus"], 0.2);
    assert_eq!(top["explain"]["sector_bonus"], 0.15);
}

#[tokio::test]
async fn test_search_companies_rejects_empty_query() {
    let (status, body) = post(test_app(), "/api/search/companies", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "query must not be empty");
}

#[tokio::test]
async fn test_search_news() {
    let (status, body) = post(
        test_app(),
        "/api/search/news",
        json!({"query": "textile exports", "limit": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["title"], "Textile exports rise");
    assert!(body["results"][0].get("explain").is_none());
}

#[tokio::test]
async fn test_classify() {
    let (status, body) = post(
        test_app(),
        "/api/classify",
        json!({"query": "revenue growth plan"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intents"], json!(["financial", "growth"]));
    assert_eq!(body["scores"]["growth"], 2);
}

#[tokio::test]
async fn test_dashboard_companies_filters() {
    let (status, body) = get(test_app(), "/api/dashboard/companies?sector=textile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, body) = get(test_app(), "/api/dashboard/companies?export_market=uae&min_score=60").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["companies"][0]["name"], "Shakti Looms");
}

#[tokio::test]
async fn test_dashboard_filters() {
    let (status, body) = get(test_app(), "/api/dashboard/filters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sectors"], json!(["Pharmaceutical", "Textile", "Textiles"]));
    assert_eq!(body["export_markets"], json!(["UAE", "USA"]));
}

#[tokio::test]
async fn test_add_company_lifecycle() {
    let app = test_app();
    let payload = json!({
        "Company_Name": "Malabar Spices",
        "Sector": "Food Processing",
        "Location": "Kochi, Kerala",
        "Primary_Products": "Pepper, cardamom"
    });

    let (status, body) = post(app.clone(), "/api/dashboard/add-company", payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(!body["company"]["id"].as_str().unwrap().is_empty());
    assert!(!body["company"]["keywords"].as_array().unwrap().is_empty());

    let (_, body) = get(app.clone(), "/api/companies").await;
    assert_eq!(body["total"], 4);

    let duplicate = json!({
        "name": "shakti looms",
        "sector": "Textiles",
        "location": "Surat",
        "primary_products": "Sarees"
    });
    let (status, body) = post(app.clone(), "/api/dashboard/add-company", duplicate).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let incomplete = json!({"name": "Nameless Works", "sector": "Textiles"});
    let (status, body) = post(app, "/api/dashboard/add-company", incomplete).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "missing required field: location");
}

#[tokio::test]
async fn test_latest_news_orders_by_date() {
    let (status, body) = get(test_app(), "/api/latest-news?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["articles"][0]["title"], "Monsoon update");
    assert_eq!(body["articles"][1]["title"], "Textile exports rise");
}

#[tokio::test]
async fn test_query_breakdown() {
    let (status, body) = post(
        test_app(),
        "/api/debug/query-breakdown",
        json!({"query": "Textile firms in Surat"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["locations"], json!(["surat"]));
    assert_eq!(body["analysis"]["sectors"], json!(["textile"]));
    assert_eq!(body["analysis"]["word_count"], 4);
    assert_eq!(body["intent"]["primary_intent"], "general");
    assert_eq!(body["store"]["status"], "ok");
    assert_eq!(body["search"]["companies"]["results_count"], 1);
}

#[tokio::test]
async fn test_unknown_route_returns_error_body() {
    let (status, body) = get(test_app(), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "no route for /api/nope");
}
