//! Defines the endpoint for appending a batch of transactions to a user's sheet.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::SheetState,
    sheets::{Row, Sheet, a1_range},
    transaction::TransactionRecord,
};

/// The columns that hold a transaction row.
const TRANSACTION_COLUMNS: &str = "A:E";

/// The body of a successful append response.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AppendResponse {
    /// A human readable confirmation.
    pub message: String,
}

/// Append `transactions` to the sheet named `username`, in the order they were given.
///
/// # Errors
///
/// Returns [Error::AppendFailed] if the body is not an array of transactions or the spreadsheet
/// service rejects the rows.
pub async fn append_transactions_endpoint(
    State(state): State<SheetState>,
    Path(username): Path<String>,
    transactions: Result<Json<Vec<TransactionRecord>>, JsonRejection>,
) -> Result<Json<AppendResponse>, Error> {
    let result = match transactions {
        Ok(Json(transactions)) => {
            append_transactions(state.sheet.as_ref(), &username, transactions).await
        }
        Err(rejection) => Err(rejection.into()),
    };

    result
        .map(|()| {
            Json(AppendResponse {
                message: "Data added successfully".to_owned(),
            })
        })
        .map_err(|error| {
            tracing::error!("Error adding data for user {username}: {error}");
            Error::AppendFailed(Box::new(error))
        })
}

async fn append_transactions(
    sheet: &dyn Sheet,
    username: &str,
    transactions: Vec<TransactionRecord>,
) -> Result<(), Error> {
    tracing::info!(
        "Pushing {} transactions for user: {username}",
        transactions.len()
    );

    let rows: Vec<Row> = transactions
        .into_iter()
        .map(TransactionRecord::into_row)
        .collect();
    tracing::debug!("Formatted rows for pushing: {rows:?}");

    if !rows.is_empty() {
        let range = a1_range(username, TRANSACTION_COLUMNS);
        sheet.append_rows(&range, &rows).await?;
    }

    tracing::info!("Data successfully added for user: {username}");

    Ok(())
}

#[cfg(test)]
mod append_transactions_tests {
    use std::sync::Arc;

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        app_state::SheetState,
        sheets::{InMemorySheet, Sheet},
        transaction::append_transactions_endpoint,
    };

    use super::AppendResponse;

    async fn get_test_server() -> (TestServer, Arc<InMemorySheet>) {
        let sheet = Arc::new(InMemorySheet::new());
        sheet.create_sheet("alice").await.unwrap();

        let app = Router::new()
            .route("/sheets/{username}", post(append_transactions_endpoint))
            .with_state(SheetState {
                sheet: sheet.clone(),
            });

        let server = TestServer::try_new(app).expect("Could not create test server.");

        (server, sheet)
    }

    #[tokio::test]
    async fn appends_rows_in_order() {
        let (server, sheet) = get_test_server().await;

        let response = server
            .post("/sheets/alice")
            .json(&json!([
                {
                    "date": "2024-03-01",
                    "transactionDetail": "Rent for March",
                    "category": "Rent",
                    "amount": "300",
                    "debitCredit": "Debit"
                },
                {
                    "date": "2024-03-02",
                    "transactionDetail": "Pay",
                    "category": "Income",
                    "amount": 1200.5,
                    "debitCredit": "Credit"
                }
            ]))
            .await;

        response.assert_status_ok();
        response.assert_json(&AppendResponse {
            message: "Data added successfully".to_owned(),
        });

        let rows = sheet.rows("alice").unwrap();
        assert_eq!(
            rows,
            vec![
                vec![
                    json!("2024-03-01"),
                    json!("Rent for March"),
                    json!("Rent"),
                    json!(300.0),
                    json!("Debit")
                ],
                vec![
                    json!("2024-03-02"),
                    json!("Pay"),
                    json!("Income"),
                    json!(1200.5),
                    json!("Credit")
                ],
            ]
        );
    }

    #[tokio::test]
    async fn empty_batch_succeeds_without_writing() {
        let (server, sheet) = get_test_server().await;

        server
            .post("/sheets/alice")
            .json(&json!([]))
            .await
            .assert_status_ok();

        assert_eq!(sheet.rows("alice"), Some(vec![]));
    }

    #[tokio::test]
    async fn missing_sheet_is_internal_server_error() {
        let (server, _) = get_test_server().await;

        let response = server
            .post("/sheets/bob")
            .json(&json!([{"category": "Food", "amount": 1, "debitCredit": "Debit"}]))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>(),
            json!({"error": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn non_array_body_is_internal_server_error() {
        let (server, sheet) = get_test_server().await;

        let response = server
            .post("/sheets/alice")
            .json(&json!({"category": "Food", "amount": 1, "debitCredit": "Debit"}))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>(),
            json!({"error": "Internal server error"})
        );
        assert_eq!(sheet.rows("alice"), Some(vec![]));
    }
}
