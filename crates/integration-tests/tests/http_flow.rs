//! End-to-end checks over HTTP against a running, freshly seeded server.
//!
//! ```bash
//! bs-cli seed --reset
//! BOOKSTORE_BASE_URL=http://localhost:5000 \
//!     cargo test -p bookstore-integration-tests --test http_flow -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, redirect::Policy};

use bookstore_integration_tests::base_url;

/// A client with its own cookie jar that does not follow redirects, so the
/// tests can assert on where each response points.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn login(client: &Client, path: &str, username: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}{path}", base_url()))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_home_and_unknown_page() {
    let client = client();
    let home = client.get(base_url()).send().await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.headers().contains_key("x-request-id"));

    let missing = client
        .get(format!("{}/no-such-page", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_cart_requires_login() {
    let resp = client()
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_shopper_login_and_add_to_cart() {
    let client = client();

    let resp = login(&client, "/login", "john_doe", "password123").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = client
        .post(format!("{}/cart/add", base_url()))
        .form(&[("book_id", "1"), ("quantity", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/books/1");

    let cart = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(cart.status(), StatusCode::OK);
    assert!(cart.text().await.unwrap().contains("The Great Gatsby"));

    // Shoppers never reach the back-office.
    let admin = client
        .get(format!("{}/admin", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&admin), "/admin/login");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_admin_login_is_separate() {
    let client = client();

    let resp = login(&client, "/login", "admin", "admin123").await;
    assert_eq!(location(&resp), "/login");

    let resp = login(&client, "/admin/login", "john_doe", "password123").await;
    assert_eq!(location(&resp), "/admin/login");

    let resp = login(&client, "/admin/login", "admin", "admin123").await;
    assert_eq!(location(&resp), "/admin");

    let dashboard = client
        .get(format!("{}/admin", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);

    // Admin mode cannot shop until it switches.
    let cart = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(cart.status(), StatusCode::SEE_OTHER);

    let switched = client
        .get(format!("{}/session/switch-to-user", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&switched), "/");

    let cart = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(cart.status(), StatusCode::OK);
}
