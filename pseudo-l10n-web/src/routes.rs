use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pseudo_l10n::{Format, Origin, Pipeline, PseudoError, PseudoType};

#[derive(Serialize, Deserialize)]
pub struct PseudoRequest {
    pub format: String,
    pub content: String,
    pub pseudo_type: String,
    /// Set when `content` is a translation whose strings should be transformed
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct PseudoResponse {
    pub content: String,
    pub mimetype: String,
}

#[derive(Serialize, Deserialize)]
pub struct PseudoTypeInfo {
    pub name: String,
    pub description: String,
    pub example: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build the API router with its middleware
pub fn app(state: AppState, max_body: usize) -> Router {
    Router::new()
        .route("/api/pseudo-types", get(list_pseudo_types))
        .route("/api/pseudo", post(pseudo_translate))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(err: PseudoError) -> ApiError {
    let status = match err {
        PseudoError::UnsupportedStrategy(_)
        | PseudoError::UnsupportedFormat(_)
        | PseudoError::Parse { .. } => StatusCode::BAD_REQUEST,
        PseudoError::Compilation(_) | PseudoError::Decoding(_) | PseudoError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    warn!("Rejected request ({}): {}", status, err);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

async fn list_pseudo_types() -> Json<Vec<PseudoTypeInfo>> {
    Json(
        PseudoType::ALL
            .iter()
            .map(|kind| PseudoTypeInfo {
                name: kind.name().to_string(),
                description: kind.description().to_string(),
                example: kind.example(),
            })
            .collect(),
    )
}

async fn pseudo_translate(
    State(state): State<AppState>,
    Json(request): Json<PseudoRequest>,
) -> Result<Json<PseudoResponse>, ApiError> {
    let format: Format = request.format.parse().map_err(error_response)?;
    let kind: PseudoType = request.pseudo_type.parse().map_err(error_response)?;
    let origin = match request.language {
        Some(language) => Origin::Translation { language },
        None => Origin::Source,
    };

    info!(
        "Pseudo-translating {} bytes of {} with {}",
        request.content.len(),
        format,
        kind
    );

    let document = state
        .pipeline
        .parse(format, &request.content, &origin)
        .map_err(error_response)?;
    let content = state
        .pipeline
        .compile_to_string(&document, kind)
        .map_err(error_response)?;

    Ok(Json(PseudoResponse {
        content,
        mimetype: format.mimetype().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(
            AppState {
                pipeline: Arc::new(Pipeline::default()),
            },
            64 * 1024,
        )
    }

    async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/pseudo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Expected snippet per pseudo type, in `PseudoType::ALL` order
    const FIXTURES: [(&str, &str, [&str; 4]); 4] = [
        (
            "PO",
            include_str!("../../pseudo-l10n/testdata/tests.pot"),
            [
                "msgstr \"xxxLocationsxxx\"",
                "msgstr \"[Locations]\"",
                "msgstr \"Ŀǿƈȧŧīǿƞş\"",
                "msgstr \"Lôקôcåקåtïôקïôns\"",
            ],
        ),
        (
            "QT",
            include_str!("../../pseudo-l10n/testdata/en-untranslated.ts"),
            [
                "<translation>xxxSTARTxxx</translation>",
                "<translation>[START]</translation>",
                "<translation>ŞŦȦŘŦ</translation>",
                "<translation>STÅקÅRT</translation>",
            ],
        ),
        (
            "PROPERTIES",
            include_str!("../../pseudo-l10n/testdata/complex.properties"),
            [
                "Key00:xxxValue00xxx",
                "Key00:[Value00]",
                "Key00:Ṽȧŀŭḗ00",
                "Key00:Våקålüéקüé00",
            ],
        ),
        (
            "INI",
            include_str!("../../pseudo-l10n/testdata/example1.6.ini"),
            [
                "KEY1=\"xxxTranslationxxx\"",
                "KEY1=\"[Translation]\"",
                "KEY1=\"Ŧřȧƞşŀȧŧīǿƞ\"",
                "KEY1=\"Tråקånslåקåtïôקïôn\"",
            ],
        ),
    ];

    #[tokio::test]
    async fn test_pseudo_every_format_and_type() {
        for (format, content, expected) in FIXTURES {
            for (kind, expected) in PseudoType::ALL.into_iter().zip(expected) {
                let (status, body) = post_json(
                    test_app(),
                    serde_json::json!({
                        "format": format,
                        "content": content,
                        "pseudo_type": kind.name(),
                    }),
                )
                .await;
                assert_eq!(status, StatusCode::OK, "{} / {}: {}", format, kind, body);
                let output = body["content"].as_str().unwrap();
                assert!(
                    output.contains(expected),
                    "{} / {}: expected {:?} in\n{}",
                    format,
                    kind,
                    expected,
                    output
                );
            }
        }
    }

    #[tokio::test]
    async fn test_response_carries_mimetype() {
        let (status, body) = post_json(
            test_app(),
            serde_json::json!({
                "format": "po",
                "content": "msgid \"Locations\"\nmsgstr \"\"\n",
                "pseudo_type": "brackets",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mimetype"], Format::Po.mimetype());
    }

    #[tokio::test]
    async fn test_translation_language() {
        let (status, body) = post_json(
            test_app(),
            serde_json::json!({
                "format": "INI",
                "content": "KEY1=\"Traduction\"\n",
                "pseudo_type": "XXX",
                "language": "fr",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "KEY1=\"xxxTraductionxxx\"\n");
    }

    #[tokio::test]
    async fn test_unknown_pseudo_type_is_bad_request() {
        let (status, body) = post_json(
            test_app(),
            serde_json::json!({
                "format": "INI",
                "content": "KEY1=\"Translation\"\n",
                "pseudo_type": "ROT13",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unsupported pseudo type 'ROT13'");
        assert!(body.get("content").is_none());
    }

    #[tokio::test]
    async fn test_unknown_format_and_syntax_errors() {
        let (status, _) = post_json(
            test_app(),
            serde_json::json!({
                "format": "XLIFF",
                "content": "<xliff/>",
                "pseudo_type": "XXX",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_json(
            test_app(),
            serde_json::json!({
                "format": "INI",
                "content": "not a pair\n",
                "pseudo_type": "XXX",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("line 1"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let app = app(
            AppState {
                pipeline: Arc::new(Pipeline::default()),
            },
            16,
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/pseudo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({
                    "format": "INI",
                    "content": "KEY1=\"Translation\"\n",
                    "pseudo_type": "XXX",
                })
                .to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_list_pseudo_types() {
        let request = Request::builder()
            .uri("/api/pseudo-types")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let types: Vec<PseudoTypeInfo> = serde_json::from_slice(&bytes).unwrap();
        let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["XXX", "BRACKETS", "UNICODE", "PLANGUAGE"]);
        assert_eq!(types[1].example, "[Translation]");
    }
}
