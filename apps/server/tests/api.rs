//! End-to-end tests against the full router with an in-memory database.
//!
//! Each test builds a fresh app, drives it with `oneshot`, and follows
//! the session cookie the way a browser would.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use souk_db::{Database, DbConfig};
use souk_server::config::ServerConfig;
use souk_server::notify::LogMailer;
use souk_server::routes::router;
use souk_server::state::AppState;

// =============================================================================
// Harness
// =============================================================================

async fn test_app() -> (Router, Arc<AppState>) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ServerConfig {
        http_port: 0,
        database_path: ":memory:".to_string(),
        media_dir: std::env::temp_dir()
            .join(format!("souk-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        session_cookie: "sid".to_string(),
    };
    let state = Arc::new(AppState::new(db, Arc::new(LogMailer), config));
    (router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("expected Set-Cookie")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("expected Location")
        .to_str()
        .unwrap()
}

fn form_post(uri: &str, cookie: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

fn bare_post(uri: &str, cookie: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Registers an account through the HTTP surface; returns its session cookie.
async fn register(app: &Router, username: &str, role: &str) -> String {
    let body = format!(
        "username={username}&email={username}%40example.com&password=hunter2hunter2&role={role}"
    );
    let response = send(app, form_post("/accounts/register", None, body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "registration failed");
    session_cookie(&response)
}

/// Creates a listing over multipart and returns its id (via the catalog).
async fn create_listing(app: &Router, cookie: &str, title: &str, price: &str) -> String {
    let boundary = "SoukTestBoundary";
    let mut body = String::new();
    for (name, value) in [
        ("title", title),
        ("description", "A fine serviced plot"),
        ("price", price),
        ("category", "land"),
        ("listing_type", "sale"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    let request = Request::post("/listings")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "listing create failed");

    let catalog = body_json(send(app, get("/listings", None)).await).await;
    catalog["listings"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["title"] == title)
        .expect("created listing not in catalog")["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn checkout_body() -> String {
    "first_name=Awa&last_name=Diop&phone=%2B2250712345&neighborhood=Plateau&city=Abidjan"
        .to_string()
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn register_lands_by_role() {
    let (app, _) = test_app().await;

    let buyer_body =
        "username=awa&email=awa%40example.com&password=hunter2hunter2&role=buyer".to_string();
    let response = send(&app, form_post("/accounts/register", None, buyer_body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/listings");

    let seller_body =
        "username=moussa&email=m%40example.com&password=hunter2hunter2&role=seller".to_string();
    let response = send(&app, form_post("/accounts/register", None, seller_body)).await;
    assert_eq!(location(&response), "/dashboard/seller");
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_flash() {
    let (app, _) = test_app().await;
    register(&app, "awa", "buyer").await;

    let response = send(
        &app,
        form_post(
            "/accounts/login",
            None,
            "username=awa&password=wrong-password".to_string(),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login");

    let cookie = session_cookie(&response);
    let page = body_json(send(&app, get("/accounts/login", Some(&cookie))).await).await;
    let flashes = page["flashes"].as_array().unwrap();
    assert_eq!(flashes.len(), 1);
    assert_eq!(flashes[0]["level"], "error");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (app, _) = test_app().await;
    register(&app, "awa", "buyer").await;

    let response = send(
        &app,
        form_post(
            "/accounts/register",
            None,
            "username=awa&email=other%40example.com&password=hunter2hunter2&role=buyer".to_string(),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/register");
}

#[tokio::test]
async fn anonymous_writes_redirect_to_login() {
    let (app, _) = test_app().await;

    // First request creates a session but no login
    let response = send(&app, get("/listings", None)).await;
    let cookie = session_cookie(&response);

    let response = send(&app, bare_post("/cart/add/some-listing", &cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login");
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn malformed_filters_degrade_gracefully() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    create_listing(&app, &seller, "Plot A", "1500").await;

    let response = send(
        &app,
        get("/listings?min_price=banana&category=land", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    // valid category filter applied, bad price dropped with a notice
    assert_eq!(body["listings"].as_array().unwrap().len(), 1);
    let flashes = body["flashes"].as_array().unwrap();
    assert_eq!(flashes.len(), 1);
    assert_eq!(flashes[0]["level"], "info");
}

#[tokio::test]
async fn deleted_listing_disappears_from_catalog() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    let response = send(
        &app,
        bare_post(&format!("/listings/{listing_id}/delete"), &seller),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let catalog = body_json(send(&app, get("/listings", None)).await).await;
    assert!(catalog["listings"].as_array().unwrap().is_empty());

    let detail = send(&app, get(&format!("/listings/{listing_id}"), None)).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_owner_can_edit_a_listing() {
    let (app, _) = test_app().await;
    let owner = register(&app, "moussa", "seller").await;
    let intruder = register(&app, "fatou", "seller").await;
    let listing_id = create_listing(&app, &owner, "Plot A", "1500").await;

    let edit = "title=Hijacked&description=x&price=1&category=land&listing_type=sale".to_string();
    let response = send(
        &app,
        form_post(&format!("/listings/{listing_id}/edit"), Some(&intruder), edit),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let detail = body_json(send(&app, get(&format!("/listings/{listing_id}"), None)).await).await;
    assert_eq!(detail["listing"]["title"], "Plot A");
}

#[tokio::test]
async fn multipart_image_upload_is_stored() {
    let (app, state) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;

    let boundary = "SoukTestBoundary";
    let mut body = String::new();
    for (name, value) in [
        ("title", "Plot with photo"),
        ("description", "Pictured"),
        ("price", "1500"),
        ("category", "land"),
        ("listing_type", "sale"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"front.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\nnot-really-a-jpeg\r\n--{boundary}--\r\n"
    ));

    let request = Request::post("/listings")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, &seller)
        .body(Body::from(body))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let catalog = body_json(send(&app, get("/listings", None)).await).await;
    let listing_id = catalog["listings"][0]["id"].as_str().unwrap();

    let images = state.db.listings().images_for(listing_id).await.unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0].path.ends_with("front.jpg"));
}

// =============================================================================
// Cart & Checkout
// =============================================================================

#[tokio::test]
async fn checkout_freezes_the_cart_price() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    // Buyer adds at 1500
    let response = send(&app, bare_post(&format!("/cart/add/{listing_id}"), &buyer)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    // Seller raises the price before checkout
    let edit =
        "title=Plot+A&description=A+fine+serviced+plot&price=2000&category=land&listing_type=sale"
            .to_string();
    send(
        &app,
        form_post(&format!("/listings/{listing_id}/edit"), Some(&seller), edit),
    )
    .await;

    // Buyer pays the snapshotted price
    let response = send(&app, form_post("/cart/checkout", Some(&buyer), checkout_body())).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/buyer");

    let dashboard = body_json(send(&app, get("/dashboard/buyer", Some(&buyer))).await).await;
    let orders = dashboard["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["amount_cents"], 150_000);
    assert_eq!(orders[0]["status"], "pending");

    // The cart emptied only after the order stuck
    let cart = body_json(send(&app, get("/cart", Some(&buyer))).await).await;
    assert!(cart["entry"].is_null());
}

#[tokio::test]
async fn seller_cannot_buy_their_own_listing() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    let response = send(&app, bare_post(&format!("/cart/add/{listing_id}"), &seller)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    // denied: sellers do not hold the buyer role
    assert_eq!(location(&response), format!("/listings/{listing_id}"));

    let cart = body_json(send(&app, get("/cart", Some(&seller))).await).await;
    assert!(cart["entry"].is_null());
}

#[tokio::test]
async fn checkout_with_empty_cart_is_flashed_back() {
    let (app, _) = test_app().await;
    let buyer = register(&app, "awa", "buyer").await;

    let response = send(&app, form_post("/cart/checkout", Some(&buyer), checkout_body())).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    let cart = body_json(send(&app, get("/cart", Some(&buyer))).await).await;
    let flashes = cart["flashes"].as_array().unwrap();
    assert_eq!(flashes.len(), 1);
    assert_eq!(flashes[0]["level"], "error");
}

#[tokio::test]
async fn checkout_rejects_invalid_contact_and_keeps_cart() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;
    send(&app, bare_post(&format!("/cart/add/{listing_id}"), &buyer)).await;

    let bad_contact =
        "first_name=Awa2&last_name=Diop&phone=%2B2250712345&neighborhood=Plateau&city=Abidjan"
            .to_string();
    let response = send(&app, form_post("/cart/checkout", Some(&buyer), bad_contact)).await;
    assert_eq!(location(&response), "/cart");

    // Nothing was ordered, the cart still holds the entry
    let cart = body_json(send(&app, get("/cart", Some(&buyer))).await).await;
    assert_eq!(cart["entry"]["listing_id"], listing_id.as_str());
}

#[tokio::test]
async fn checkout_fails_when_the_listing_was_removed() {
    let (app, state) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    send(&app, bare_post(&format!("/cart/add/{listing_id}"), &buyer)).await;
    send(&app, bare_post(&format!("/listings/{listing_id}/delete"), &seller)).await;

    let response = send(&app, form_post("/cart/checkout", Some(&buyer), checkout_body())).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    assert!(state.db.orders().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn adding_a_second_listing_replaces_the_first() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let first = create_listing(&app, &seller, "Plot A", "1500").await;
    let second = create_listing(&app, &seller, "Plot B", "2500").await;

    send(&app, bare_post(&format!("/cart/add/{first}"), &buyer)).await;
    send(&app, bare_post(&format!("/cart/add/{second}"), &buyer)).await;

    let cart = body_json(send(&app, get("/cart", Some(&buyer))).await).await;
    assert_eq!(cart["entry"]["listing_id"], second.as_str());
    assert_eq!(cart["entry"]["price_cents"], 250_000);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn only_the_listing_seller_confirms_an_order() {
    let (app, state) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let other_seller = register(&app, "fatou", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    send(&app, bare_post(&format!("/cart/add/{listing_id}"), &buyer)).await;
    send(&app, form_post("/cart/checkout", Some(&buyer), checkout_body())).await;

    let order_id = state.db.orders().list_all().await.unwrap()[0].id.clone();

    // Wrong seller: flashed back, order untouched
    let response = send(
        &app,
        bare_post(&format!("/orders/{order_id}/confirm"), &other_seller),
    )
    .await;
    assert_eq!(location(&response), "/dashboard/seller");
    let order = state.db.orders().get_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, souk_core::OrderStatus::Pending);

    // Right seller: confirmed
    send(&app, bare_post(&format!("/orders/{order_id}/confirm"), &seller)).await;
    let order = state.db.orders().get_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, souk_core::OrderStatus::Confirmed);

    // Confirming twice degrades to a flash, not a second transition
    let response = send(&app, bare_post(&format!("/orders/{order_id}/confirm"), &seller)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let order = state.db.orders().get_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, souk_core::OrderStatus::Confirmed);
}

#[tokio::test]
async fn buyer_cannot_reach_seller_dashboard() {
    let (app, _) = test_app().await;
    let buyer = register(&app, "awa", "buyer").await;

    let response = send(&app, get("/dashboard/seller", Some(&buyer))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/listings");
}

#[tokio::test]
async fn admin_dashboard_shows_orders_and_traffic() {
    let (app, state) = test_app().await;

    // Admin accounts are provisioned directly, never via registration
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(b"hunter2hunter2", &salt)
        .unwrap()
        .to_string();
    state
        .db
        .users()
        .create_with_profile("admin", "admin@example.com", &hash, souk_core::Role::Admin, None)
        .await
        .unwrap();

    let response = send(
        &app,
        form_post(
            "/accounts/login",
            None,
            "username=admin&password=hunter2hunter2".to_string(),
        ),
    )
    .await;
    assert_eq!(location(&response), "/dashboard/admin");
    let admin = session_cookie(&response);

    let dashboard = body_json(send(&app, get("/dashboard/admin", Some(&admin))).await).await;
    assert!(dashboard["orders"].as_array().unwrap().is_empty());
    // At least the admin's own requests were counted
    assert!(dashboard["traffic"]["total_page_views"].as_i64().unwrap() >= 1);
    assert!(dashboard["traffic"]["total_visitors"].as_i64().unwrap() >= 1);
}

// =============================================================================
// Engagement
// =============================================================================

#[tokio::test]
async fn message_thread_round_trip() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    let response = send(
        &app,
        form_post(
            &format!("/listings/{listing_id}/messages"),
            Some(&buyer),
            "content=Is+this+still+available%3F".to_string(),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let thread = body_json(
        send(&app, get(&format!("/listings/{listing_id}/messages"), Some(&seller))).await,
    )
    .await;
    let messages = thread["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Is this still available?");
}

#[tokio::test]
async fn short_message_content_is_rejected() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    let response = send(
        &app,
        form_post(
            &format!("/listings/{listing_id}/messages"),
            Some(&buyer),
            "content=hi".to_string(),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let thread = body_json(
        send(&app, get(&format!("/listings/{listing_id}/messages"), Some(&buyer))).await,
    )
    .await;
    assert!(thread["messages"].as_array().unwrap().is_empty());
    let flashes = thread["flashes"].as_array().unwrap();
    assert_eq!(flashes[0]["level"], "error");
}

#[tokio::test]
async fn comments_and_average_rating() {
    let (app, _) = test_app().await;
    let seller = register(&app, "moussa", "seller").await;
    let buyer = register(&app, "awa", "buyer").await;
    let listing_id = create_listing(&app, &seller, "Plot A", "1500").await;

    // Out-of-range rating bounces
    let response = send(
        &app,
        form_post(
            &format!("/listings/{listing_id}/comments"),
            Some(&buyer),
            "content=Way+too+good&rating=6".to_string(),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    for (content, rating) in [("Great+location", 5), ("Decent+enough", 3)] {
        send(
            &app,
            form_post(
                &format!("/listings/{listing_id}/comments"),
                Some(&buyer),
                format!("content={content}&rating={rating}"),
            ),
        )
        .await;
    }

    let detail = body_json(send(&app, get(&format!("/listings/{listing_id}"), None)).await).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 2);
    assert_eq!(detail["average_rating"], 4.0);
}
