//! Axum route handlers for the Sheets API.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::sheets::error::SheetError;
use crate::sheets::grid::PartialSheet;
use crate::sheets::packer::{pack_sheets, PackStats};
use crate::sheets::pdf::PdfDocument;
use crate::sheets::render::export_document;
use crate::sheets::template::{SheetKind, SheetTemplate};
use crate::state::AppState;

const EXPORT_ID_HEADER: &str = "x-export-id";
const REMAINING_PARTIALS_HEADER: &str = "x-remaining-partials";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub label: SheetTemplate,
    pub companion: SheetTemplate,
}

#[derive(Debug, Deserialize)]
pub struct PackRequest {
    pub kind: SheetKind,
    pub labels: Vec<String>,
    #[serde(default)]
    pub partials: Vec<PartialSheet>,
}

#[derive(Debug, Serialize)]
pub struct PackResponse {
    /// Row-major label grids, one per sheet.
    pub sheets: Vec<Vec<Vec<String>>>,
    pub remaining_partials: Vec<PartialSheet>,
    pub stats: PackStats,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub kind: SheetKind,
    pub labels: Vec<String>,
    #[serde(default)]
    pub partials: Vec<PartialSheet>,
    pub file_name: Option<String>,
    /// Draws cell outlines; falls back to the `SHOW_BORDERS` setting.
    pub show_border: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation helpers
// ────────────────────────────────────────────────────────────────────────────

fn check_request_size(
    labels: &[String],
    partials: &[PartialSheet],
    config: &Config,
) -> Result<(), AppError> {
    if labels.len() > config.max_labels {
        return Err(AppError::Validation(format!(
            "Too many labels: {} (limit {})",
            labels.len(),
            config.max_labels
        )));
    }
    if partials.len() > config.max_partials {
        return Err(AppError::Validation(format!(
            "Too many partial sheets: {} (limit {})",
            partials.len(),
            config.max_partials
        )));
    }
    Ok(())
}

fn default_file_name(kind: SheetKind) -> &'static str {
    match kind {
        SheetKind::Label => "labels.pdf",
        SheetKind::Companion => "companion.pdf",
    }
}

/// Accepts plain file names only and makes sure they end in `.pdf`.
pub(crate) fn sanitize_file_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(AppError::Validation(format!(
            "Invalid file name \"{name}\": use letters, digits, '.', '_' or '-'"
        )));
    }
    if name.to_ascii_lowercase().ends_with(".pdf") {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}.pdf"))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid header value: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        label: state.templates.template(SheetKind::Label).as_ref().clone(),
        companion: state.templates.template(SheetKind::Companion).as_ref().clone(),
    })
}

/// GET /api/v1/templates/:kind/blank-partial
///
/// An all-free partial sheet sized to the template, the starting point for
/// marking cells that were already used.
pub async fn handle_blank_partial(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<PartialSheet>, AppError> {
    let kind: SheetKind = kind.parse().map_err(AppError::NotFound)?;
    let template = state.templates.template(kind);
    Ok(Json(PartialSheet::blank(template.num_rows, template.num_cols)))
}

/// POST /api/v1/sheets/pack
///
/// Distributes labels over partial and blank sheets without rendering.
pub async fn handle_pack(
    State(state): State<AppState>,
    Json(request): Json<PackRequest>,
) -> Result<Json<PackResponse>, AppError> {
    check_request_size(&request.labels, &request.partials, &state.config)?;

    let factory = state.templates.factory(request.kind);
    let outcome = tokio::task::spawn_blocking(move || {
        pack_sheets(&request.labels, &factory, &request.partials)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pack: {e}")))??;

    Ok(Json(PackResponse {
        stats: outcome.stats,
        sheets: outcome
            .sheets
            .into_iter()
            .map(|sheet| sheet.into_cells())
            .collect(),
        remaining_partials: outcome.remaining_partials,
    }))
}

/// POST /api/v1/sheets/export
///
/// Packs and renders the labels into a PDF attachment. The leftover partial
/// sheets travel back as JSON in the `x-remaining-partials` header so the
/// caller can offer them on the next export.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    check_request_size(&request.labels, &request.partials, &state.config)?;

    let file_name = match request.file_name.as_deref() {
        Some(name) => sanitize_file_name(name)?,
        None => default_file_name(request.kind).to_string(),
    };
    let show_border = request.show_border.unwrap_or(state.config.show_borders);
    let export_id = Uuid::new_v4();
    let kind = request.kind;
    let factory = state.templates.factory(kind);

    let (bytes, remaining, stats) = tokio::task::spawn_blocking(move || {
        let outcome = pack_sheets(&request.labels, &factory, &request.partials)?;
        let mut doc = PdfDocument::new();
        export_document(&mut doc, &outcome.sheets, show_border)?;
        Ok::<_, SheetError>((doc.finish(), outcome.remaining_partials, outcome.stats))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))??;

    info!(
        %export_id,
        ?kind,
        labels = stats.labels_placed,
        partials_resumed = stats.partials_resumed,
        blank_sheets = stats.blank_sheets_started,
        bytes = bytes.len(),
        "Exported sheets"
    );

    let remaining_json =
        serde_json::to_string(&remaining).map_err(|e| AppError::Internal(e.into()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&format!("attachment; filename=\"{file_name}\""))?,
    );
    headers.insert(
        HeaderName::from_static(EXPORT_ID_HEADER),
        header_value(&export_id.to_string())?,
    );
    headers.insert(
        HeaderName::from_static(REMAINING_PARTIALS_HEADER),
        header_value(&remaining_json)?,
    );

    Ok((headers, bytes).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::build_router;
    use crate::sheets::template::TemplateCatalog;

    fn test_app() -> Router {
        let state = AppState {
            config: Config {
                port: 0,
                rust_log: "info".to_string(),
                show_borders: false,
                max_labels: 50,
                max_partials: 3,
            },
            templates: Arc::new(TemplateCatalog::standard().unwrap()),
        };
        build_router(state)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("labels").unwrap(), "labels.pdf");
        assert_eq!(sanitize_file_name("shelf-3.PDF").unwrap(), "shelf-3.PDF");
        assert!(sanitize_file_name("../etc/passwd").is_err());
        assert!(sanitize_file_name("a b.pdf").is_err());
        assert!(sanitize_file_name("").is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let response = get(test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_templates() {
        let response = get(test_app(), "/api/v1/templates").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["label"]["name"], "Avery 5412");
        assert_eq!(body["companion"]["font"]["align"], "left");
    }

    #[tokio::test]
    async fn test_blank_partial() {
        let response = get(test_app(), "/api/v1/templates/label/blank-partial").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], json!(["free", "free", "free", "free", "free"]));
    }

    #[tokio::test]
    async fn test_blank_partial_unknown_kind() {
        let response = get(test_app(), "/api/v1/templates/poster/blank-partial").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pack_returns_sheets_and_leftover() {
        let response = post_json(
            test_app(),
            "/api/v1/sheets/pack",
            json!({ "kind": "label", "labels": ["A", "B", "C"] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["sheets"].as_array().unwrap().len(), 1);
        assert_eq!(body["sheets"][0][0], json!(["A", "B", "C", "", ""]));
        assert_eq!(body["remaining_partials"].as_array().unwrap().len(), 1);
        assert_eq!(body["remaining_partials"][0][0], json!(["occupied", "occupied", "occupied", "free", "free"]));
        assert_eq!(body["stats"]["labels_placed"], 3);
    }

    #[tokio::test]
    async fn test_pack_rejects_mismatched_partial() {
        let response = post_json(
            test_app(),
            "/api/v1/sheets/pack",
            json!({ "kind": "label", "labels": ["A"], "partials": [[["free"]]] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_pack_rejects_too_many_labels() {
        let labels: Vec<String> = (0..51).map(|i| i.to_string()).collect();
        let response = post_json(
            test_app(),
            "/api/v1/sheets/pack",
            json!({ "kind": "companion", "labels": labels }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pack_rejects_too_many_partials() {
        let partials: Vec<PartialSheet> = (0..4).map(|_| PartialSheet::blank(4, 5)).collect();
        let response = post_json(
            test_app(),
            "/api/v1/sheets/pack",
            json!({ "kind": "label", "labels": ["A"], "partials": partials }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Too many partial sheets"));
    }

    #[tokio::test]
    async fn test_export_remaining_partials_header_is_bounded() {
        let partials: Vec<PartialSheet> = (0..3).map(|_| PartialSheet::blank(4, 5)).collect();
        let response = post_json(
            test_app(),
            "/api/v1/sheets/export",
            json!({ "kind": "label", "labels": ["A"], "partials": partials }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let remaining: Vec<PartialSheet> =
            serde_json::from_str(response.headers()[REMAINING_PARTIALS_HEADER].to_str().unwrap())
                .unwrap();
        assert_eq!(remaining.len(), 3);

        let too_many: Vec<PartialSheet> = (0..4).map(|_| PartialSheet::blank(4, 5)).collect();
        let response = post_json(
            test_app(),
            "/api/v1/sheets/export",
            json!({ "kind": "label", "labels": ["A"], "partials": too_many }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_returns_pdf_attachment() {
        let response = post_json(
            test_app(),
            "/api/v1/sheets/export",
            json!({ "kind": "label", "labels": ["FIC SMI", "598.2 PET"], "file_name": "shelf" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers().clone();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"shelf.pdf\""
        );
        assert!(headers.contains_key(EXPORT_ID_HEADER));
        let remaining: Vec<PartialSheet> =
            serde_json::from_str(headers[REMAINING_PARTIALS_HEADER].to_str().unwrap()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].free_count(), 18);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_export_default_file_name_per_kind() {
        let response = post_json(
            test_app(),
            "/api/v1/sheets/export",
            json!({ "kind": "companion", "labels": ["Charlotte's Web\nE.B. White"] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"companion.pdf\""
        );
    }

    #[tokio::test]
    async fn test_export_overflowing_label_is_unprocessable() {
        let response = post_json(
            test_app(),
            "/api/v1/sheets/export",
            json!({ "kind": "label", "labels": ["one two three four five six seven eight nine ten"] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "TEXT_OVERFLOW");
    }

    #[tokio::test]
    async fn test_export_without_labels_is_rejected() {
        let response = post_json(
            test_app(),
            "/api/v1/sheets/export",
            json!({ "kind": "label", "labels": [] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
