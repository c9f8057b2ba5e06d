//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    category::fetch_category_totals_endpoint,
    endpoints,
    log_in::post_log_in,
    logging::logging_middleware,
    register_user::register_user,
    transaction::append_transactions_endpoint,
};

/// Return a router with all the app's routes.
///
/// Requests from any origin are allowed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::NEW_USER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::FETCH_DATA, get(fetch_category_totals_endpoint))
        .route(endpoints::SHEETS, post(append_transactions_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::http::{HeaderValue, StatusCode, header::ORIGIN};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{AppState, CategoryTotal, build_router, sheets::InMemorySheet};

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, Arc::new(InMemorySheet::new()))
            .expect("Could not create app state")
            .with_password_cost(4);

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn register_log_in_push_and_fetch() {
        let server = get_test_server();

        server
            .post("/newUser")
            .json(&json!({
                "name": "alice",
                "password": "correcthorsebatterystaple",
                "sheetName": "alice",
                "sheetCreated": false
            }))
            .await
            .assert_status_ok();

        server
            .post("/login")
            .json(&json!({"userId": "alice", "password": "correcthorsebatterystaple"}))
            .await
            .assert_status_ok();

        server
            .post("/sheets/alice")
            .json(&json!([
                {"date": "1/1", "transactionDetail": "Lunch", "category": "Food", "amount": "50", "debitCredit": "Debit"},
                {"date": "1/2", "transactionDetail": "Refund", "category": "Food", "amount": "20", "debitCredit": "Credit"},
                {"date": "1/3", "transactionDetail": "March", "category": "Rent", "amount": 300, "debitCredit": "Debit"},
                {"date": "1/4", "transactionDetail": "Nothing", "category": "Misc", "amount": 0, "debitCredit": "Debit"},
                {"date": "1/5", "transactionDetail": "Odd", "category": "Other", "amount": 10, "debitCredit": "Transfer"}
            ]))
            .await
            .assert_json(&json!({"message": "Data added successfully"}));

        let totals = server
            .get("/fetch-data/alice")
            .await
            .json::<Vec<CategoryTotal>>();

        let expected = [("Food", 30.0), ("Rent", 300.0), ("Other", 0.0)];
        assert_eq!(totals.len(), expected.len(), "got {totals:?}");
        for (total, (category, amount)) in totals.iter().zip(expected) {
            assert_eq!(total.category, category);
            assert_eq!(total.amount, amount);
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does-not-exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_headers_are_set() {
        let server = get_test_server();

        let response = server
            .post("/login")
            .add_header(ORIGIN, HeaderValue::from_static("http://localhost:3000"))
            .json(&json!({"userId": "nobody", "password": "x"}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }
}
