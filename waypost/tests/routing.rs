//! Integration tests for routing functionality.

use http::{Method, StatusCode};
use waypost::prelude::*;
use waypost::testing::TestClient;

#[tokio::test]
async fn test_basic_get_route() {
    let app = Waypost::new()
        .router(Router::new().route(Method::GET, "/", |_, _, _| async { "Hello, World!" }));

    let client = TestClient::new(app).await;
    let response = client.get("/").send().await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "Hello, World!");
}

#[tokio::test]
async fn test_verb_routes() {
    let app = Waypost::new().router(
        Router::new()
            .post("/users", |_, _, _| async { StatusCode::CREATED })
            .put("/users/:id", |_, _, _| async { StatusCode::OK })
            .patch("/users/:id", |_, _, _| async { StatusCode::ACCEPTED })
            .delete("/users/:id", |_, _, _| async { StatusCode::NO_CONTENT }),
    );

    let client = TestClient::new(app).await;

    assert_eq!(client.post("/users").send().await.status(), StatusCode::CREATED);
    assert_eq!(client.put("/users/1").send().await.status(), StatusCode::OK);
    assert_eq!(client.patch("/users/1").send().await.status(), StatusCode::ACCEPTED);
    assert_eq!(client.delete("/users/1").send().await.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_method_mismatch_is_not_found() {
    let app = Waypost::new().router(Router::new().get("/users", |_, _, _| async { "list" }));

    let client = TestClient::new(app).await;
    let response = client.post("/users").send().await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_path_params_in_mounted_router() {
    let order = Router::new().get("/:order_id", |_, params: PathParams, _| async move {
        let id: u64 = param(&params, "order_id")?;
        Ok::<_, Error>(format!("order {}", id))
    });
    let app = Waypost::new().router(Router::new().mount("/product/order", order));

    let client = TestClient::new(app).await;

    let response = client.get("/product/order/17").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "order 17");

    let response = client.get("/product/order/abc").send().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_first_registered_route_wins() {
    let app = Waypost::new().router(
        Router::new()
            .get("/users/me", |_, _, _| async { "me" })
            .get("/users/:id", |_, _, _| async { "by id" }),
    );

    let client = TestClient::new(app).await;

    assert_eq!(client.get("/users/me").send().await.text(), "me");
    assert_eq!(client.get("/users/7").send().await.text(), "by id");
}

#[tokio::test]
async fn test_handlers_read_app_state() {
    struct Greeting(&'static str);

    let app = Waypost::new()
        .state(Greeting("hello from state"))
        .router(Router::new().get("/", |_, _, state: std::sync::Arc<AppState>| async move {
            state
                .get::<Greeting>()
                .map(|greeting| greeting.0)
                .unwrap_or("missing")
        }));

    let client = TestClient::new(app).await;
    assert_eq!(client.get("/").send().await.text(), "hello from state");
}

#[tokio::test]
async fn test_json_response() {
    let app = Waypost::new().router(Router::new().get("/info", |_, _, _| async {
        Json(serde_json::json!({"name": "waypost"}))
    }));

    let client = TestClient::new(app).await;
    let response = client.get("/info").send().await;

    assert_eq!(response.header("content-type"), Some("application/json"));
    let json: serde_json::Value = response.json();
    assert_eq!(json["name"], "waypost");
}
