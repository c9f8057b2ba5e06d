//! Defines the endpoint that reports a user's net totals per category.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    app_state::SheetState,
    category::{CategoryTotal, aggregate_category_totals},
    sheets::a1_range,
};

/// The category, amount and type columns, below the header row.
const CATEGORY_COLUMN: &str = "C2:C";
const AMOUNT_COLUMN: &str = "D2:D";
const TYPE_COLUMN: &str = "E2:E";

/// Read the sheet named `username` and return the net total of each category.
///
/// # Errors
///
/// Returns [Error::Sheets] if any of the columns could not be read.
pub async fn fetch_category_totals_endpoint(
    State(state): State<SheetState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    tracing::info!("Fetching data for user: {username}");

    let category_range = a1_range(&username, CATEGORY_COLUMN);
    let amount_range = a1_range(&username, AMOUNT_COLUMN);
    let type_range = a1_range(&username, TYPE_COLUMN);

    let (categories, amounts, types) = tokio::try_join!(
        state.sheet.read_column(&category_range),
        state.sheet.read_column(&amount_range),
        state.sheet.read_column(&type_range),
    )
    .inspect_err(|error| tracing::error!("Error fetching data for user {username}: {error}"))?;

    let totals = aggregate_category_totals(&categories, &amounts, &types);
    tracing::info!(
        "Fetched {} category totals for user: {username}",
        totals.len()
    );

    Ok(Json(totals))
}

#[cfg(test)]
mod fetch_category_totals_tests {
    use std::sync::Arc;

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        app_state::SheetState,
        category::{CategoryTotal, fetch_category_totals_endpoint},
        sheets::{InMemorySheet, Sheet, text_row},
        transaction::HEADER_ROW,
    };

    async fn get_test_server(rows: &[Vec<Value>]) -> TestServer {
        let sheet = Arc::new(InMemorySheet::new());
        sheet.create_sheet("alice").await.unwrap();
        sheet
            .append_rows("'alice'!A:E", &[text_row(&HEADER_ROW)])
            .await
            .unwrap();
        sheet.append_rows("'alice'!A:E", rows).await.unwrap();

        let app = Router::new()
            .route("/fetch-data/{username}", get(fetch_category_totals_endpoint))
            .with_state(SheetState { sheet });

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn returns_net_totals_per_category() {
        let server = get_test_server(&[
            vec![json!("1/1"), json!("Lunch"), json!("Food"), json!(50), json!("Debit")],
            vec![json!("1/2"), json!("Refund"), json!("Food"), json!(20), json!("Credit")],
            vec![json!("1/3"), json!("March"), json!("Rent"), json!(300), json!("Debit")],
        ])
        .await;

        let response = server.get("/fetch-data/alice").await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Vec<CategoryTotal>>(),
            vec![
                CategoryTotal {
                    category: "Food".to_owned(),
                    amount: 30.0
                },
                CategoryTotal {
                    category: "Rent".to_owned(),
                    amount: 300.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn header_row_and_blank_rows_are_ignored() {
        let server = get_test_server(&[
            vec![json!("1/1"), json!("Nothing"), json!("Food"), json!(0), json!("Debit")],
            vec![json!("1/2"), json!("Missing category"), json!(""), json!(5), json!("Debit")],
        ])
        .await;

        let response = server.get("/fetch-data/alice").await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
    }

    #[tokio::test]
    async fn missing_sheet_is_internal_server_error() {
        let server = get_test_server(&[]).await;

        let response = server.get("/fetch-data/bob").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({"error": "Internal Server Error"}));
    }
}
