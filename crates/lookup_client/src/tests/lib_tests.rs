use super::*;
use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use shared::{
    domain::{FieldId, LookupKind},
    error::ErrorKind,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct RegistryState {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn handle_tax_id(
    State(state): State<RegistryState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let tax_id = params.get("tax_id").cloned().unwrap_or_default();
    state.queries.lock().await.push(params);
    if tax_id == "11222333000181" {
        Json(json!({
            "full_name": "Acme Furniture Ltda",
            "preferred_name": "Acme",
            "state_registration": "110042490114",
            "zip_code": "01310-100",
            "street": "Avenida Paulista",
            "number": "1000",
            "city": "Sao Paulo",
            "state": "SP"
        }))
    } else {
        Json(json!({ "error": "tax id not found" }))
    }
}

async fn handle_zip_code(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("zip_code").map(String::as_str) {
        Some("50030230") => Json(json!({
            "street": "Rua da Aurora",
            "neighborhood": "Boa Vista",
            "city": "Recife",
            "state": "PE"
        }))
        .into_response(),
        _ => (StatusCode::BAD_GATEWAY, "upstream registry down").into_response(),
    }
}

async fn handle_html() -> impl IntoResponse {
    "<html><body>login required</body></html>"
}

async fn spawn_registry_server() -> Result<(String, RegistryState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = RegistryState::default();
    let app = Router::new()
        .route("/lookup/tax-id", get(handle_tax_id))
        .route("/lookup/zip-code", get(handle_zip_code))
        .route("/lookup/html", get(handle_html))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn request(kind: LookupKind, query: &str, endpoint: String) -> LookupRequest {
    LookupRequest {
        kind,
        query: query.to_string(),
        endpoint,
    }
}

#[tokio::test]
async fn tax_id_lookup_sends_digits_as_query_param() {
    let (base, state) = spawn_registry_server().await.expect("spawn server");
    let transport = HttpLookupTransport::new();

    let fields = transport
        .lookup(&request(
            LookupKind::TaxId,
            "11222333000181",
            format!("{base}/lookup/tax-id"),
        ))
        .await
        .expect("lookup");

    assert_eq!(fields.get(FieldId::FullName), Some("Acme Furniture Ltda"));
    assert_eq!(fields.get(FieldId::TaxRegistrationState), Some("110042490114"));
    assert_eq!(fields.get(FieldId::ZipCode), Some("01310-100"));
    assert_eq!(fields.get(FieldId::Complement), None);

    let queries = state.queries.lock().await.clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("tax_id").map(String::as_str), Some("11222333000181"));
}

#[tokio::test]
async fn error_payload_maps_to_application_error() {
    let (base, _state) = spawn_registry_server().await.expect("spawn server");
    let transport = HttpLookupTransport::new();

    let err = transport
        .lookup(&request(
            LookupKind::TaxId,
            "99999999999999",
            format!("{base}/lookup/tax-id"),
        ))
        .await
        .expect_err("not found");

    assert_eq!(err.error_kind(), ErrorKind::Application);
    assert_eq!(err.user_message(), "Error: tax id not found");
}

#[tokio::test]
async fn zip_code_lookup_returns_address_fields() {
    let (base, _state) = spawn_registry_server().await.expect("spawn server");
    let transport = HttpLookupTransport::with_timeout(Duration::from_secs(5)).expect("client");

    let fields = transport
        .lookup(&request(
            LookupKind::ZipCode,
            "50030230",
            format!("{base}/lookup/zip-code"),
        ))
        .await
        .expect("lookup");

    assert_eq!(fields.get(FieldId::Street), Some("Rua da Aurora"));
    assert_eq!(fields.get(FieldId::State), Some("PE"));
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let (base, _state) = spawn_registry_server().await.expect("spawn server");
    let transport = HttpLookupTransport::new();

    let err = transport
        .lookup(&request(
            LookupKind::ZipCode,
            "00000000",
            format!("{base}/lookup/zip-code"),
        ))
        .await
        .expect_err("bad gateway");

    assert_eq!(err.error_kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("502"), "unexpected detail: {err}");
}

#[tokio::test]
async fn non_json_body_is_transport_error() {
    let (base, _state) = spawn_registry_server().await.expect("spawn server");
    let transport = HttpLookupTransport::new();

    let err = transport
        .lookup(&request(
            LookupKind::TaxId,
            "11222333000181",
            format!("{base}/lookup/html"),
        ))
        .await
        .expect_err("html body");

    assert_eq!(err.error_kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = HttpLookupTransport::new()
        .lookup(&request(
            LookupKind::ZipCode,
            "50030230",
            format!("http://{addr}/lookup/zip-code"),
        ))
        .await
        .expect_err("connection refused");

    assert_eq!(err.error_kind(), ErrorKind::Transport);
    assert_eq!(err.lookup_kind(), LookupKind::ZipCode);
}

#[tokio::test]
async fn unavailable_transport_always_fails() {
    let err = UnavailableLookupTransport
        .lookup(&request(LookupKind::TaxId, "11222333000181", "/lookup".into()))
        .await
        .expect_err("unavailable");
    assert_eq!(err.error_kind(), ErrorKind::Transport);
}
