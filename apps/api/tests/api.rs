//! End-to-end tests for the REST surface.
//!
//! Each test builds the full router over a fresh in-memory database and
//! drives it with `tower::ServiceExt::oneshot`, asserting on the JSON
//! envelope the web and mobile clients consume.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use avemaria_api::app;
use avemaria_db::{Database, DbConfig};

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    app(db)
}

/// Sends one request and returns (status, parsed JSON body).
async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

/// Creates a product and returns its id.
async fn create_product(app: &Router, reference: &str, stock: i64) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/products",
        Some(json!({
            "ref": reference,
            "name": format!("Producto {}", reference),
            "category": "CANDONGAS",
            "wholesalePrice": 22000,
            "retailPrice": 60000,
            "stock": stock,
            "minStock": 3
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn product_stock(app: &Router, id: &str) -> i64 {
    let (status, body) = request(app, "GET", &format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["stock"].as_i64().unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;

    let (status, body) = request(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
    assert_eq!(body["data"]["name"], json!("Mi Negocio AVEMARÍA API"));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn product_crud_lifecycle() {
    let app = test_app().await;

    // Validation rejected before any store interaction
    let (status, body) = request(
        &app,
        "POST",
        "/api/products",
        Some(json!({
            "ref": "",
            "name": "Sin referencia",
            "category": "OTRO",
            "wholesalePrice": 1000,
            "retailPrice": 2000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let id = create_product(&app, "CAN-001", 10).await;

    // Listed in the catalog with meta
    let (status, body) = request(&app, "GET", "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], json!(1));
    assert_eq!(body["data"][0]["ref"], json!("CAN-001"));

    // Detail view carries movement history (empty so far)
    let (status, body) = request(&app, "GET", &format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recentPurchases"], json!([]));
    assert_eq!(body["data"]["recentSales"], json!([]));

    // Partial update
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/products/{}", id),
        Some(json!({ "retailPrice": 65000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["retailPrice"], json!(65000));
    assert_eq!(body["data"]["wholesalePrice"], json!(22000));

    // Soft delete hides it from reads
    let (status, _) = request(&app, "DELETE", &format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&app, "GET", &format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "GET", "/api/products/desconocido", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_stats_and_low_stock() {
    let app = test_app().await;
    create_product(&app, "CAN-001", 2).await;

    let (status, body) = request(&app, "GET", "/api/products/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalUnits"], json!(2));
    assert_eq!(body["data"]["totalCostValue"], json!(44000));
    assert_eq!(body["data"]["totalRetailValue"], json!(120000));

    // stock 2 <= minStock 3
    let (status, body) = request(&app, "GET", "/api/products/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn sale_flow_records_cancels_and_conflicts() {
    let app = test_app().await;
    let product_id = create_product(&app, "CAN-001", 10).await;

    // Record: 4 units at $60.000 against $22.000 wholesale
    let (status, body) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "channel": "WHATSAPP",
            "paymentMethod": "NEQUI",
            "items": [{ "productId": product_id, "quantity": 4, "unitRevenue": 60000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    assert_eq!(body["data"]["folio"], json!(1));
    assert_eq!(body["data"]["totalRevenue"], json!(240000));
    assert_eq!(body["data"]["totalCost"], json!(88000));
    assert_eq!(body["data"]["netProfit"], json!(152000));
    assert_eq!(body["data"]["status"], json!("COMPLETED"));
    assert_eq!(body["data"]["items"][0]["unitProfit"], json!(38000));
    let sale_id = body["data"]["id"].as_str().unwrap().to_string();

    assert_eq!(product_stock(&app, &product_id).await, 6);

    // Over-stock request is a conflict, and nothing moves
    let (status, body) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "channel": "INSTAGRAM",
            "paymentMethod": "EFECTIVO",
            "items": [{ "productId": product_id, "quantity": 100, "unitRevenue": 60000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("CAN-001"), "message: {}", message);
    assert!(message.contains("available 6"), "message: {}", message);
    assert!(message.contains("requested 100"), "message: {}", message);
    assert_eq!(product_stock(&app, &product_id).await, 6);

    // Cancellation restores stock and zeroes the ledger entry
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/sales/{}/status", sale_id),
        Some(json!({ "status": "CANCELLED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("CANCELLED"));
    // Totals are a frozen snapshot, not rewritten
    assert_eq!(body["data"]["totalRevenue"], json!(240000));
    assert_eq!(product_stock(&app, &product_id).await, 10);

    let (status, body) = request(&app, "GET", "/api/accounting/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["amount"], json!(0));
    assert!(entries[0]["description"]
        .as_str()
        .unwrap()
        .starts_with("[CANCELADA] Venta #1"));
}

#[tokio::test]
async fn sale_validation_and_not_found() {
    let app = test_app().await;

    // Empty item list never reaches the store
    let (status, _) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "channel": "WHATSAPP",
            "paymentMethod": "NEQUI",
            "items": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown product
    let (status, _) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "channel": "WHATSAPP",
            "paymentMethod": "NEQUI",
            "items": [{
                "productId": "550e8400-e29b-41d4-a716-446655440000",
                "quantity": 1,
                "unitRevenue": 60000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "GET", "/api/sales/desconocida", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sale_status_change_without_stock_effects() {
    let app = test_app().await;
    let product_id = create_product(&app, "CAN-001", 10).await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "channel": "PRESENCIAL",
            "paymentMethod": "CONTRA_ENTREGA",
            "items": [{ "productId": product_id, "quantity": 2, "unitRevenue": 60000 }]
        })),
    )
    .await;
    let sale_id = body["data"]["id"].as_str().unwrap().to_string();

    for status_name in ["PENDING_PAYMENT", "COMPLETED"] {
        let (status, body) = request(
            &app,
            "PATCH",
            &format!("/api/sales/{}/status", sale_id),
            Some(json!({ "status": status_name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], json!(status_name));
        // A non-cancelling transition never touches stock
        assert_eq!(product_stock(&app, &product_id).await, 8);
    }
}

#[tokio::test]
async fn sales_summary_and_listing() {
    let app = test_app().await;
    let product_id = create_product(&app, "CAN-001", 20).await;

    for _ in 0..2 {
        let (status, _) = request(
            &app,
            "POST",
            "/api/sales",
            Some(json!({
                "channel": "WHATSAPP",
                "paymentMethod": "NEQUI",
                "items": [{ "productId": product_id, "quantity": 2, "unitRevenue": 60000 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request(&app, "GET", "/api/sales?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], json!(2));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = request(&app, "GET", "/api/sales/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRevenue"], json!(240000));
    assert_eq!(body["data"]["byChannel"]["WHATSAPP"], json!(240000));
    assert_eq!(body["data"]["byChannel"]["INSTAGRAM"], json!(0));

    let (status, body) = request(&app, "GET", "/api/sales/by-product", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["totalQuantity"], json!(4));
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn purchase_flow_and_summary() {
    let app = test_app().await;
    let product_id = create_product(&app, "CAN-001", 10).await;

    // 20 units at $50.000 plus $20.000 shipping = $1.020.000
    let (status, body) = request(
        &app,
        "POST",
        "/api/purchases",
        Some(json!({
            "orderNumber": "PED-42",
            "paymentMethod": "TRANSFERENCIA",
            "shippingCost": 20000,
            "items": [{ "productId": product_id, "quantity": 20, "unitCost": 50000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    assert_eq!(body["data"]["totalCost"], json!(1020000));
    let purchase_id = body["data"]["id"].as_str().unwrap().to_string();

    assert_eq!(product_stock(&app, &product_id).await, 30);

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/purchases/{}", purchase_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["product"]["ref"], json!("CAN-001"));

    let (status, body) = request(&app, "GET", "/api/purchases/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalInvested"], json!(1020000));
    assert_eq!(body["data"]["totalUnits"], json!(20));

    // The matching EXPENSE entry landed in the ledger
    let (status, body) = request(
        &app,
        "GET",
        "/api/accounting/transactions?type=EXPENSE",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["amount"], json!(1020000));
    assert_eq!(body["data"][0]["category"], json!("COMPRA_AVEMARIA"));

    // Validation: non-positive unit cost
    let (status, _) = request(
        &app,
        "POST",
        "/api/purchases",
        Some(json!({
            "paymentMethod": "NEQUI",
            "items": [{ "productId": product_id, "quantity": 5, "unitCost": 0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn customer_crud_and_levels() {
    let app = test_app().await;

    // Name too short
    let (status, _) = request(
        &app,
        "POST",
        "/api/customers",
        Some(json!({ "name": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        "POST",
        "/api/customers",
        Some(json!({ "name": "Ana María", "instagram": "@anamaria" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let customer_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(&app, "GET", "/api/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["level"], json!("Regular"));
    assert_eq!(body["data"][0]["totalSpent"], json!(0));

    // A sale attached to the customer shows up in the detail
    let product_id = create_product(&app, "CAN-001", 10).await;
    let (status, _) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "customerId": customer_id,
            "channel": "INSTAGRAM",
            "paymentMethod": "DAVIPLATA",
            "items": [{ "productId": product_id, "quantity": 1, "unitRevenue": 60000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/customers/{}", customer_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalSpent"], json!(60000));
    assert_eq!(body["data"]["totalPurchases"], json!(1));
    assert_eq!(body["data"]["sales"].as_array().unwrap().len(), 1);

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/customers/{}", customer_id),
        Some(json!({ "phone": "3001234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], json!("3001234567"));
}

// =============================================================================
// Accounting & Dashboard
// =============================================================================

#[tokio::test]
async fn accounting_reports() {
    let app = test_app().await;
    let product_id = create_product(&app, "CAN-001", 10).await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "channel": "WHATSAPP",
            "paymentMethod": "NEQUI",
            "items": [{ "productId": product_id, "quantity": 4, "unitRevenue": 60000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Manual expense
    let (status, body) = request(
        &app,
        "POST",
        "/api/accounting/transactions",
        Some(json!({
            "amount": 40000,
            "category": "PUBLICIDAD",
            "description": "Pauta Instagram"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], json!("EXPENSE"));

    let (status, body) = request(&app, "GET", "/api/accounting/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalIncome"], json!(240000));
    assert_eq!(body["data"]["totalExpense"], json!(40000));
    assert_eq!(body["data"]["netProfit"], json!(200000));

    let (status, body) = request(&app, "GET", "/api/accounting/by-month", None).await;
    assert_eq!(status, StatusCode::OK);
    let months = body["data"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[11]["income"], json!(240000));

    let (status, body) = request(&app, "GET", "/api/accounting/per-peso", None).await;
    assert_eq!(status, StatusCode::OK);
    let lines = body["data"]["perHundred"].as_array().unwrap();
    let last = lines.last().unwrap();
    assert_eq!(last["category"], json!("GANANCIA"));
    assert_eq!(last["amount"], json!(200000));

    // Malformed date filters are a validation failure
    let (status, _) = request(
        &app,
        "GET",
        "/api/accounting/summary?startDate=ayer",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_aggregates() {
    let app = test_app().await;
    let product_id = create_product(&app, "CAN-001", 10).await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/sales",
        Some(json!({
            "channel": "INSTAGRAM",
            "paymentMethod": "NEQUI",
            "items": [{ "productId": product_id, "quantity": 4, "unitRevenue": 60000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["data"]["totalRevenue"], json!(240000));
    assert_eq!(body["data"]["totalProfit"], json!(152000));
    assert_eq!(body["data"]["unitsSold"], json!(4));
    assert_eq!(body["data"]["revenueByChannel"]["instagram"], json!(240000));
    assert_eq!(body["data"]["monthlyRevenue"].as_array().unwrap().len(), 6);
    assert!(body["data"]["recentActivity"][0]["description"]
        .as_str()
        .unwrap()
        .starts_with("Venta #1"));
}
