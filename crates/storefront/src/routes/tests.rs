//! Router tests over in-memory doubles.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use coronda_platform::identity::MemoryIdentity;
use coronda_platform::store::{MemoryDocumentStore, collections};

use crate::build_app;
use crate::config::StorefrontConfig;
use crate::config::tests::test_config;
use crate::payments::webhook::tests::signature_for;
use crate::services::checkout::tests::{StubGateway, customer};
use crate::state::AppState;

struct TestApp {
    app: Router,
    store: Arc<MemoryDocumentStore>,
    identity: Arc<MemoryIdentity>,
    gateway: Arc<StubGateway>,
    cookie: Option<String>,
}

impl TestApp {
    fn new() -> Self {
        Self::with(test_config(), StubGateway::default())
    }

    fn with(config: StorefrontConfig, gateway: StubGateway) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let identity = Arc::new(MemoryIdentity::new());
        let gateway = Arc::new(gateway);
        let state = AppState::new(config, store.clone(), identity.clone(), gateway.clone());
        Self {
            app: build_app(state, MemoryStore::default(), false),
            store,
            identity,
            gateway,
            cookie: None,
        }
    }

    async fn seed_product(&self, id: &str, name: &str, price: i64) {
        self.store
            .seed(
                collections::PRODUCTS,
                id,
                json!({
                    "name": name, "description": "Hecho a mano", "price": price,
                    "imageUrl": format!("https://img.test/{id}.jpg"),
                    "category": "Mates", "stock": 4
                }),
            )
            .await;
    }

    async fn send_with(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, json) = self.send_with(method, uri, body, &[]).await;
        (status, json)
    }
}

fn checkout_body() -> Value {
    json!({ "customerInfo": customer() })
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_products_filter_and_detail() {
    let mut app = TestApp::new();
    app.seed_product("p1", "Mate imperial", 12000).await;
    app.seed_product("p2", "Bombilla de alpaca", 4500).await;

    let (status, body) = app.send(Method::GET, "/api/products?search=mate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "p1");

    let (status, body) = app.send(Method::GET, "/api/products/p2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bombilla de alpaca");
    assert_eq!(body["inStock"], true);

    let (status, body) = app.send(Method::GET, "/api/products/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Producto no encontrado.");
}

#[tokio::test]
async fn test_shipping_and_about_defaults() {
    let mut app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/shipping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cost"], 1500);

    let (status, body) = app.send(Method::GET, "/api/about", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_object());
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let mut app = TestApp::new();
    let (_, headers, _) = app
        .send_with(Method::GET, "/api/categories", None, &[("x-request-id", "req-42")])
        .await;
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-request-id").unwrap(), "req-42");
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_add_update_remove() {
    let mut app = TestApp::new();
    app.seed_product("p1", "Mate imperial", 12000).await;
    app.seed_product("p2", "Bombilla de alpaca", 4500).await;

    app.send(Method::POST, "/api/cart/items", Some(json!({"productId": "p1"}))).await;
    app.send(Method::POST, "/api/cart/items", Some(json!({"productId": "p1"}))).await;
    let (status, body) = app
        .send(Method::POST, "/api/cart/items", Some(json!({"productId": "p2"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["subtotal"], 28500);

    let (status, body) = app
        .send(Method::PATCH, "/api/cart/items/p1", Some(json!({"quantity": 5})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 6);

    let (_, body) = app.send(Method::DELETE, "/api/cart/items/p2", None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (_, body) = app.send(Method::GET, "/api/cart", None).await;
    assert_eq!(body["subtotal"], 60000);
}

#[tokio::test]
async fn test_cart_rejects_unknown_ids() {
    let mut app = TestApp::new();

    let (status, _) = app
        .send(Method::POST, "/api/cart/items", Some(json!({"productId": "ghost"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::PATCH, "/api/cart/items/ghost", Some(json!({"quantity": 2})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "El producto no está en el carrito.");
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_guest_checkout_records_sale_and_clears_cart() {
    let mut app = TestApp::new();
    app.seed_product("p1", "Mate imperial", 12000).await;
    app.send(Method::POST, "/api/cart/items", Some(json!({"productId": "p1"}))).await;

    let (status, body) = app.send(Method::POST, "/api/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preferenceId"], "pref-123");
    assert_eq!(body["publicKey"], "TEST-public-key");
    assert_eq!(body["total"], 13500);

    let sale_id = body["saleId"].as_str().unwrap();
    let sale = app.store.raw(collections::SALES, sale_id).await.unwrap();
    assert_eq!(sale["status"], "Procesando");

    let (_, cart) = app.send(Method::GET, "/api/cart", None).await;
    assert_eq!(cart["count"], 0);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let mut app = TestApp::new();
    let (status, body) = app.send(Method::POST, "/api/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "El carrito está vacío.");
    assert_eq!(app.store.count(collections::SALES).await, 0);
}

#[tokio::test]
async fn test_checkout_payment_failure_keeps_cart() {
    let mut app = TestApp::with(test_config(), StubGateway::failing());
    app.seed_product("p1", "Mate imperial", 12000).await;
    app.send(Method::POST, "/api/cart/items", Some(json!({"productId": "p1"}))).await;

    let (status, body) = app.send(Method::POST, "/api/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "No se pudo crear la preferencia de pago.");

    let (_, cart) = app.send(Method::GET, "/api/cart", None).await;
    assert_eq!(cart["count"], 1);
    assert_eq!(app.store.count(collections::SALES).await, 1);
}

#[tokio::test]
async fn test_create_payment_validation() {
    let mut app = TestApp::new();
    let item = json!({
        "id": "p1", "name": "Mate imperial", "price": 12000,
        "imageUrl": "", "category": "Mates", "quantity": 1
    });

    let (status, _) = app
        .send(Method::POST, "/api/create-payment", Some(json!({"cartItems": []})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut info = customer();
    info.phone = String::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/create-payment",
            Some(json!({"cartItems": [item], "shippingCost": 1500, "customerInfo": info})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Falta información del cliente, incluyendo el teléfono."
    );

    let (status, body) = app
        .send(
            Method::POST,
            "/api/create-payment",
            Some(json!({"cartItems": [item], "shippingCost": 1500, "customerInfo": customer()})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "pref-123");

    let requests = app.gateway.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].sale_id.is_none());
}

#[tokio::test]
async fn test_webhook_acknowledges_without_secret() {
    let mut app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/webhook",
            Some(json!({"type": "payment", "action": "payment.created", "data": {"id": 987}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_webhook_checks_signature_when_configured() {
    let mut config = test_config();
    config.mercado_pago.webhook_secret = Some(SecretString::from("mp-webhook-key"));
    let mut app = TestApp::with(config, StubGateway::default());
    let notification = json!({"type": "payment", "data": {"id": "ABC123"}});
    let uri = "/api/webhook?data.id=ABC123&type=payment";

    let (status, _, _) = app
        .send_with(
            Method::POST,
            uri,
            Some(notification.clone()),
            &[("x-signature", "ts=1,v1=deadbeef"), ("x-request-id", "req-1")],
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let signature = signature_for("mp-webhook-key", "abc123", "req-1", "1704908010");
    let (status, _, _) = app
        .send_with(
            Method::POST,
            uri,
            Some(notification.clone()),
            &[("x-signature", signature.as_str()), ("x-request-id", "req-1")],
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The signed id comes from the query string, not the body.
    let (status, _, _) = app
        .send_with(
            Method::POST,
            "/api/webhook?data.id=999999&type=payment",
            Some(notification),
            &[("x-signature", signature.as_str()), ("x-request-id", "req-1")],
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Auth & account
// =============================================================================

#[tokio::test]
async fn test_register_verify_login_flow() {
    let mut app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            Some(json!({"name": "Lucía", "email": "lucia@example.com", "password": "secreto1"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "lucia@example.com");
    assert_eq!(
        app.identity.verification_emails().await,
        vec!["lucia@example.com".to_string()]
    );

    let login = json!({"email": "lucia@example.com", "password": "secreto1"});
    let (status, _) = app.send(Method::POST, "/api/auth/login", Some(login.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.identity.verify_email("lucia@example.com").await;
    let (status, body) = app.send(Method::POST, "/api/auth/login", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Lucía");

    let (_, body) = app.send(Method::GET, "/api/auth/session", None).await;
    assert_eq!(body["user"]["email"], "lucia@example.com");
    assert_eq!(body["user"]["isVerified"], true);

    let (status, body) = app.send(Method::GET, "/api/account/sales", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    app.send(Method::POST, "/api/auth/logout", None).await;
    let (_, body) = app.send(Method::GET, "/api/auth/session", None).await;
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn test_session_survives_id_token_expiry() {
    let mut app = TestApp::new();
    app.identity
        .add_account("uid-9", "marta@example.com", "secreto1", true)
        .await;
    app.store
        .seed(
            collections::USERS,
            "uid-9",
            json!({"name": "Marta", "email": "marta@example.com", "isAdmin": false}),
        )
        .await;
    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "marta@example.com", "password": "secreto1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.identity.expire_tokens();

    let (_, body) = app.send(Method::GET, "/api/auth/session", None).await;
    assert_eq!(body["user"]["email"], "marta@example.com");
    assert_eq!(app.identity.refresh_count(), 1);

    // The refreshed tokens were stored back into the session.
    let (_, body) = app.send(Method::GET, "/api/auth/session", None).await;
    assert_eq!(body["user"]["email"], "marta@example.com");
    assert_eq!(app.identity.refresh_count(), 1);
}

#[tokio::test]
async fn test_signed_in_checkout_links_sale_to_user() {
    let mut app = TestApp::new();
    app.identity
        .add_account("uid-7", "tomas@example.com", "secreto1", true)
        .await;
    app.store
        .seed(
            collections::USERS,
            "uid-7",
            json!({"name": "Tomás", "email": "tomas@example.com", "isAdmin": false}),
        )
        .await;
    app.seed_product("p1", "Mate imperial", 12000).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "tomas@example.com", "password": "secreto1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.send(Method::POST, "/api/cart/items", Some(json!({"productId": "p1"}))).await;
    let (status, body) = app.send(Method::POST, "/api/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, sales) = app.send(Method::GET, "/api/account/sales", None).await;
    assert_eq!(sales[0]["id"], body["saleId"]);
    assert_eq!(sales[0]["customerInfo"]["userId"], "uid-7");
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let mut app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/account", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Debes iniciar sesión.");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let mut app = TestApp::new();
    app.identity
        .add_account("uid-1", "ana@example.com", "secreto1", true)
        .await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": "ana@example.com", "password": "otra-clave"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "La contraseña o el email son incorrectos.");
}

// =============================================================================
// Contact
// =============================================================================

#[tokio::test]
async fn test_contact_requires_all_fields() {
    let mut app = TestApp::new();

    let (status, _) = app
        .send(Method::POST, "/api/contact", Some(json!({"name": "Ana", "email": "ana@example.com"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/contact",
            Some(json!({"name": "Ana", "email": "ana@example.com", "message": "¿Hacen envíos a Salta?"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
