use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::client::ApiKey;
use super::context::TracingProgress;
use super::service::{ExtractionService, HarvestConnector};
use super::ExtractionError;
use crate::error::AppError;

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Error extracting data. Try rerunning (re-enter your Harvest API Key if necessary)";

const MISSING_KEY_MESSAGE: &str = "Enter your Harvest API Key to extract data.";
const REPORT_FILENAME: &str = "Results.csv";

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractForm {
    #[serde(default)]
    api_key: String,
}

/// Router exposing the extraction form, the CSV download, and the run status.
pub fn extraction_router<C>(service: Arc<ExtractionService<C>>) -> Router
where
    C: HarvestConnector + 'static,
{
    Router::new()
        .route("/", get(form_handler))
        .route("/extract", post(extract_handler::<C>))
        .route("/api/v1/extract/status", get(status_handler::<C>))
        .with_state(service)
}

pub(crate) async fn form_handler() -> Html<String> {
    Html(render_form(None))
}

pub(crate) async fn extract_handler<C>(
    State(service): State<Arc<ExtractionService<C>>>,
    Form(form): Form<ExtractForm>,
) -> Response
where
    C: HarvestConnector + 'static,
{
    let Some(api_key) = ApiKey::new(&form.api_key) else {
        warn!("extraction requested without an API key");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render_form(Some(MISSING_KEY_MESSAGE))),
        )
            .into_response();
    };

    let worker = Arc::clone(&service);
    let result = tokio::task::spawn_blocking(move || {
        let mut context = worker.context();
        let report = worker.extract(&mut context, &api_key, &TracingProgress)?;
        Ok::<_, ExtractionError>(report.to_csv_bytes()?)
    })
    .await
    .map_err(ExtractionError::from)
    .and_then(|outcome| outcome);

    match result {
        Ok(csv) => {
            info!(bytes = csv.len(), "serving extracted report");
            (
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{REPORT_FILENAME}\""),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(err) => {
            let err = AppError::from(err);
            error!(error = %err, "extraction request failed");
            (
                err.status_code(),
                Html(render_form(Some(GENERIC_FAILURE_MESSAGE))),
            )
                .into_response()
        }
    }
}

pub(crate) async fn status_handler<C>(
    State(service): State<Arc<ExtractionService<C>>>,
) -> Response
where
    C: HarvestConnector + 'static,
{
    (StatusCode::OK, Json(service.status())).into_response()
}

fn render_form(message: Option<&str>) -> String {
    let notice = message
        .map(|text| format!("<p class=\"notice\">{text}</p>\n"))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Greenhouse Recruiting Data</title>
</head>
<body>
<h1>Extract Greenhouse Recruiting Data</h1>
{notice}<form method="post" action="/extract">
<label for="api_key">Harvest API Key</label>
<input type="password" id="api_key" name="api_key" autocomplete="off">
<button type="submit">Extract Data</button>
</form>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{FixtureConnector, FixtureSource};
    use super::*;
    use crate::config::HarvestConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router(source: FixtureSource) -> Router {
        let service = ExtractionService::new(FixtureConnector(source), HarvestConfig::default());
        extraction_router(Arc::new(service))
    }

    fn submit(api_key: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/extract")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!("api_key={api_key}")))
            .expect("request")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf-8")
    }

    #[tokio::test]
    async fn form_has_password_input_and_submit_button() {
        let response = router(FixtureSource::recruiting())
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Extract Greenhouse Recruiting Data"));
        assert!(html.contains("type=\"password\""));
        assert!(html.contains("Extract Data</button>"));
    }

    #[tokio::test]
    async fn empty_key_rerenders_form_without_fetching() {
        let source = FixtureSource::recruiting();
        let response = router(source.clone())
            .oneshot(submit(""))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains(MISSING_KEY_MESSAGE));
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn valid_key_downloads_csv_report() {
        let response = router(FixtureSource::recruiting())
            .oneshot(submit("secret"))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Results.csv\""
        );

        let csv = body_text(response).await;
        let mut lines = csv.lines();
        assert!(lines
            .next()
            .expect("header")
            .starts_with("application_id,candidate_id,updated_app"));
        let row = lines.next().expect("one report row");
        assert!(row.starts_with("11,5,2026-09-01 09:00:00,1,active,Referral,Stage 1,CHI,"));
        assert!(row.contains("Ada Lovelace"));
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn upstream_failure_shows_generic_message() {
        let response = router(FixtureSource::rejecting(401))
            .oneshot(submit("wrong"))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(response).await;
        assert!(html.contains(GENERIC_FAILURE_MESSAGE));
        assert!(!html.contains("401"));
    }

    #[tokio::test]
    async fn status_reports_last_attempt() {
        let app = router(FixtureSource::recruiting());
        app.clone()
            .oneshot(submit("secret"))
            .await
            .expect("router dispatch");

        let response = app
            .oneshot(
                Request::get("/api/v1/extract/status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let payload: Value = serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(payload["attempts"], 1);
        assert_eq!(payload["last_run"]["percent"], 100);
        assert_eq!(payload["last_run"]["stage"], "report_prepared");
        assert_eq!(payload["last_run"]["outcome"]["state"], "succeeded");
        assert_eq!(payload["last_run"]["outcome"]["rows"], 1);
    }
}
