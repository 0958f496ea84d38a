use chrono::{Datelike, Duration as ChronoDuration, Utc};

use assetdesk_auth::JwtClaims;
use assetdesk_core::UserId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = assetdesk_api::app::build_app(jwt_secret.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, name: Option<&str>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        name: name.map(str::to_string),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn current_year_tag() -> String {
    format!("{:02}", Utc::now().year().rem_euclid(100))
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn("test-secret").await;

    let res = reqwest::get(format!("{}/health", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/items", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        name: None,
        issued_at: now - ChronoDuration::minutes(20),
        expires_at: now - ChronoDuration::minutes(10),
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .unwrap();

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/items", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_echoes_the_token_identity() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, Some("Ada"));

    let client = reqwest::Client::new();
    let body: serde_json::Value = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["name"], "Ada");
    assert!(body["user_id"].as_str().is_some());
}

#[tokio::test]
async fn item_lifecycle_create_update_delete_with_audit_trail() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, None);
    let client = reqwest::Client::new();

    // Create: first identifier of the current year.
    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Laptop", "serial_no": "SN-100" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();

    let item_no = created["item"]["item_no"].as_str().unwrap().to_string();
    assert_eq!(item_no, format!("ITM-{}-00001", current_year_tag()));
    assert_eq!(created["audit_recorded"], true);
    // The in-memory backend seeds the default status catalog.
    assert_eq!(created["item"]["status_name"], "Issued");
    assert_eq!(created["item"]["dept_name"], "N/A");
    assert!(created["item"]["sticker"]
        .as_str()
        .unwrap()
        .starts_with("data:image/svg+xml;base64,"));

    // Update: omitted fields keep their values, null clears.
    let res = client
        .put(format!("{}/items/{}", srv.base_url, item_no))
        .bearer_auth(&token)
        .json(&json!({ "name": "Laptop X", "serial_no": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["item"]["name"], "Laptop X");
    assert_eq!(updated["item"]["serial_no"], serde_json::Value::Null);

    // Delete, then the item reads as absent.
    let res = client
        .delete(format!("{}/items/{}", srv.base_url, item_no))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/items/{}", srv.base_url, item_no))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The audit trail survives deletion, newest first.
    let trail: serde_json::Value = client
        .get(format!("{}/items/{}/ledger", srv.base_url, item_no))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let activities: Vec<&str> = trail
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["activity"].as_str().unwrap())
        .collect();
    assert_eq!(activities, vec!["delete", "update", "create"]);
}

#[tokio::test]
async fn deleted_identifiers_are_not_reissued() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, None);
    let client = reqwest::Client::new();

    let first: serde_json::Value = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Laptop" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first_no = first["item"]["item_no"].as_str().unwrap().to_string();

    client
        .delete(format!("{}/items/{}", srv.base_url, first_no))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let second: serde_json::Value = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Printer" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second_no = second["item"]["item_no"].as_str().unwrap();
    assert_ne!(second_no, first_no);
    assert_eq!(second_no, format!("ITM-{}-00002", current_year_tag()));
}

#[tokio::test]
async fn listing_supports_filter_and_pagination() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, None);
    let client = reqwest::Client::new();

    for name in ["Laptop", "Printer", "Scanner"] {
        let res = client
            .post(format!("{}/items", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let page: serde_json::Value = client
        .get(format!("{}/items?page=1&page_size=2", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total_items"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    // Past the end: empty page, not an error.
    let past: serde_json::Value = client
        .get(format!("{}/items?page=9&page_size=2", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(past["items"].as_array().unwrap().is_empty());

    // Case-insensitive substring filter.
    let filtered: serde_json::Value = client
        .get(format!("{}/items?q=lap", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(filtered["total_items"], 1);
    assert_eq!(filtered["items"][0]["name"], "Laptop");
}

#[tokio::test]
async fn blank_name_and_bad_identifier_are_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, None);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/items/not-an-id", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalogs_support_inline_add_and_resolve_in_views() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, None);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/catalogs/departments", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Finance" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let dept: serde_json::Value = res.json().await.unwrap();
    let dept_id = dept["id"].as_str().unwrap();

    let created: serde_json::Value = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Laptop", "dept_id": dept_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["item"]["dept_name"], "Finance");

    let departments: serde_json::Value = client
        .get(format!("{}/catalogs/departments", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(departments.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn linked_purchase_orders_follow_active_items() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, None);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/catalogs/purchase-orders", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "po_no": "PO-77",
            "supplier": "Acme",
            "total_amount_cents": 125000,
            "order_date": "2025-03-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let linked: serde_json::Value = client
        .get(format!("{}/catalogs/purchase-orders/linked", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(linked.as_array().unwrap().is_empty());

    client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Laptop", "po_no": "PO-77" }))
        .send()
        .await
        .unwrap();

    let linked: serde_json::Value = client
        .get(format!("{}/catalogs/purchase-orders/linked", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(linked.as_array().unwrap().len(), 1);
    assert_eq!(linked[0]["supplier"], "Acme");
}
