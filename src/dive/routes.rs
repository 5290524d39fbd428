//! HTTP route handlers for dive log import and label validation.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
    routing::{get, post},
    Router,
};

use crate::error::Result;
use crate::AppState;

use super::import::{self, ImportError};
use super::models::{ImportResponse, LabelRequest, LabelResponse};
use super::validator;

/// Multipart field carrying the dive log.
const UPLOAD_FIELD: &str = "file";

/// Create the dive router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/label", post(label))
        .route("/import-subsurface", post(import_subsurface))
}

/// Health check for the dive engine.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "dive-label",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Validate a stop schedule and render its label.
async fn label(body: Bytes) -> Result<Json<LabelResponse>> {
    let request: LabelRequest = serde_json::from_slice(&body)?;
    let input_json = String::from_utf8_lossy(&body);

    let response = validator::validate(&request, &input_json)?;
    Ok(Json(response))
}

/// Derive a stop schedule from an uploaded dive log.
async fn import_subsurface(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>> {
    let mut multipart = multipart.map_err(|_| ImportError::NoUpload)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            upload = Some(field.text().await?);
            break;
        }
    }
    let xml = upload.ok_or(ImportError::NoUpload)?;

    let response = import::import_dive_log(&xml, &state.config.import)?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;

    const BOUNDARY: &str = "divelogboundary";

    fn app() -> Router {
        router().with_state(AppState {
            config: Arc::new(Config::default()),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_post(field: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"dive.xml\"\r\n\
             Content-Type: application/xml\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/import-subsurface")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn label_body() -> serde_json::Value {
        serde_json::json!({
            "maxDepthM": 45,
            "gasesCarried": ["Tx18/45", "50", "O2"],
            "ppo2": { "working": 1.4, "deco": 1.6 },
            "sac": { "workingLMin": 20, "decoLMin": 15 },
            "gradientFactors": { "low": 30, "high": 70 },
            "schedule": [
                { "depthM": 6, "stopMin": 5, "trtMin": 32, "gas": "O2" },
                { "depthM": 21, "stopMin": 1, "trtMin": 26, "gas": "50" }
            ],
            "notes": "Deco on the line"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_label() {
        let (status, body) = send(json_post("/label", label_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["errors"], serde_json::json!([]));
        assert_eq!(body["computed"]["totalRuntimeMin"], 32);
        assert_eq!(body["computed"]["ppo2ByStop"][0]["depthM"], 21.0);
        assert!(body["computed"]["modByGasM"]["100"].is_number());
        assert!(body["computed"]["gasUsedLitresByGas"]["50"].is_number());
        let label = body["labelText"].as_str().unwrap();
        assert!(label.starts_with("MAX 45m | RT 32m | GF 30/70"));
        assert!(label.contains("NOTES: Deco on the line"));
        assert!(body["inputHash"].as_str().unwrap().starts_with("sha256:"));
    }

    #[tokio::test]
    async fn test_label_findings_do_not_fail_request() {
        let mut body = label_body();
        body["schedule"][0]["depthM"] = serde_json::json!(9);
        let (status, body) = send(json_post("/label", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["errors"].as_array().unwrap().len(), 2);
        assert!(body["labelText"].as_str().unwrap().starts_with("*** ERRORS PRESENT ***"));
    }

    #[tokio::test]
    async fn test_label_unknown_mixture_is_reported() {
        let mut body = label_body();
        body["gasesCarried"] = serde_json::json!(["Tx18/45", "50", "O2", "EAN50"]);
        body["schedule"][0]["gas"] = serde_json::json!("EAN50");
        let (status, body) = send(json_post("/label", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["checks"]["errors"],
            serde_json::json!([
                "Carried gas \"EAN50\" is not a recognised mixture.",
                "Row 2: gas \"EAN50\" is not a recognised mixture."
            ])
        );
        assert!(body["computed"]["modByGasM"].get("EAN50").is_none());
        assert!(body["computed"]["gasUsedLitresByGas"]["EAN50"].is_number());
    }

    #[tokio::test]
    async fn test_label_schema_error() {
        let mut body = label_body();
        body["schedule"] = serde_json::json!([]);
        let (status, body) = send(json_post("/label", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "schedule must contain at least one row");
    }

    #[tokio::test]
    async fn test_label_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/label")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"maxDepthM\": "))
            .unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_import() {
        let xml = "<divelog><dives><dive>\
                   <cylinder o2='32.0%'/>\
                   <divecomputer>\
                   <sample time='0:00 min' depth='18.0 m'/>\
                   <sample time='10:00 min' depth='18.0 m'/>\
                   <sample time='12:00 min' depth='5.0 m'/>\
                   <sample time='15:00 min' depth='5.0 m'/>\
                   </divecomputer></dive></dives></divelog>";
        let (status, body) = send(multipart_post("file", xml)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["maxDepthM"], 18);
        assert_eq!(body["gasesCarried"], serde_json::json!(["32"]));
        assert_eq!(body["meta"]["samplesFound"], 4);
        assert_eq!(
            body["schedule"],
            serde_json::json!([
                { "depthM": 18.0, "stopMin": 10, "trtMin": 10, "gas": "32" },
                { "depthM": 5.0, "stopMin": 5, "trtMin": 15, "gas": "32" }
            ])
        );
    }

    #[tokio::test]
    async fn test_import_without_file_field() {
        let (status, body) = send(multipart_post("other", "<divelog/>")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_import_not_multipart() {
        let (status, body) = send(json_post("/import-subsurface", serde_json::json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_import_without_dives() {
        let (status, body) = send(multipart_post("file", "<divelog><settings/></divelog>")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Could not find any dives in file.");
    }
}
