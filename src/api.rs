//! HTTP surface for Rusty RAG.
//!
//! The router exposes the document question-answering workflow:
//!
//! - `POST /upload-pdf/` – Multipart upload; every file part is staged, parsed, chunked, embedded,
//!   and indexed. Files without a `.pdf` suffix are reported in `invalid_files`.
//! - `POST /upload-status` – Progress of the most recent upload batch.
//! - `POST /ask-question/` – Form field `question` (urlencoded or multipart); answers from the
//!   live index and returns the full session history.
//! - `GET /history` – Session history without asking anything.
//! - `GET /metrics` – Ingestion and question counters.
//! - `GET /` and `/static/*` – The bundled web client.
//!
//! Ingestion and generation run on spawned tasks so a client disconnect does not abandon work
//! that has already started.

use crate::config::Config;
use crate::metrics::MetricsSnapshot;
use crate::processing::{
    AnswerError, HistoryEntry, IngestError, ProcessingStatus, RagApi, UploadedFile,
};
use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

const UPLOAD_SUCCESS_MESSAGE: &str = "PDFs uploaded and processed successfully!";
const UPLOAD_PARTIAL_MESSAGE: &str = "Some files were not PDFs and were skipped.";

/// Router settings that do not belong to the processing service.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// HTML page served at `/`.
    pub index_html: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
}

impl HttpSettings {
    /// Settings derived from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            index_html: config.index_html_path.clone(),
            static_dir: config.static_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Build the HTTP router exposing the upload and question API surface.
pub fn create_router<S>(service: Arc<S>, settings: HttpSettings) -> Router
where
    S: RagApi + 'static,
{
    Router::new()
        .route("/upload-pdf/", post(upload_pdfs::<S>))
        .route("/upload-status", post(upload_status::<S>))
        .route("/ask-question/", post(ask_question::<S>))
        .route("/history", get(get_history::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route_service("/", ServeFile::new(settings.index_html))
        .nest_service("/static", ServeDir::new(settings.static_dir))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .with_state(service)
}

/// Success response for `POST /upload-pdf/`.
#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    /// Wall-clock duration formatted as `"<seconds> seconds"`.
    processing_time: String,
    /// Number of chunks in the new index.
    documents_processed: usize,
}

/// Response for a batch in which some files were rejected by the suffix check.
#[derive(Serialize)]
struct RejectedFilesResponse {
    message: &'static str,
    invalid_files: Vec<String>,
}

/// Stage and index every file part of a multipart upload.
///
/// The valid files of a mixed batch are still indexed; the response then reports the rejected
/// names with a 400 status.
async fn upload_pdfs<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Response, AppError>
where
    S: RagApi + 'static,
{
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(AppError::multipart)? {
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let bytes = field.bytes().await.map_err(AppError::multipart)?;
        files.push(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    tracing::info!(files = files.len(), "Upload request received");

    let outcome = tokio::spawn(async move { service.ingest_uploads(files).await })
        .await
        .map_err(|error| AppError::internal(format!("Background task failed: {error}")))??;

    if !outcome.invalid_files.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(RejectedFilesResponse {
                message: UPLOAD_PARTIAL_MESSAGE,
                invalid_files: outcome.invalid_files,
            }),
        )
            .into_response());
    }

    Ok(Json(UploadResponse {
        message: UPLOAD_SUCCESS_MESSAGE,
        processing_time: format!("{:.2} seconds", outcome.elapsed.as_secs_f64()),
        documents_processed: outcome.documents_processed,
    })
    .into_response())
}

/// Report progress of the most recent upload batch.
async fn upload_status<S>(State(service): State<Arc<S>>) -> Json<ProcessingStatus>
where
    S: RagApi,
{
    Json(service.status_snapshot())
}

/// Fields accepted by `POST /ask-question/`.
#[derive(Deserialize)]
struct QuestionFields {
    question: String,
}

/// Question extracted from either an urlencoded or a multipart form.
struct QuestionForm {
    question: String,
}

#[axum::async_trait]
impl<S> FromRequest<S> for QuestionForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(fields) = Form::<QuestionFields>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
            return Ok(Self {
                question: fields.question,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        while let Some(field) = multipart.next_field().await.map_err(AppError::multipart)? {
            if field.name() == Some("question") {
                let question = field.text().await.map_err(AppError::multipart)?;
                return Ok(Self { question });
            }
        }
        Err(AppError::bad_request("Missing form field `question`."))
    }
}

/// Response body for `POST /ask-question/`.
#[derive(Serialize)]
struct AnswerResponse {
    response: String,
    response_time: f64,
    history: Vec<HistoryEntry>,
}

/// Answer a question from the current index.
async fn ask_question<S>(
    State(service): State<Arc<S>>,
    form: QuestionForm,
) -> Result<Json<AnswerResponse>, AppError>
where
    S: RagApi + 'static,
{
    let outcome = tokio::spawn(async move { service.answer_question(form.question).await })
        .await
        .map_err(|error| AppError::internal(format!("Background task failed: {error}")))??;

    Ok(Json(AnswerResponse {
        response: outcome.answer,
        response_time: outcome.response_time,
        history: outcome.history,
    }))
}

/// Response body for `GET /history`.
#[derive(Serialize)]
struct HistoryResponse {
    history: Vec<HistoryEntry>,
}

async fn get_history<S>(State(service): State<Arc<S>>) -> Json<HistoryResponse>
where
    S: RagApi,
{
    Json(HistoryResponse {
        history: service.history(),
    })
}

/// Return a snapshot of ingestion and question counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: RagApi,
{
    Json(service.metrics_snapshot())
}

/// JSON error response with an explicit status code.
struct AppError {
    status: StatusCode,
    body: Value,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": message.into() }),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "error": message.into() }),
        }
    }

    fn multipart(error: MultipartError) -> Self {
        Self {
            status: error.status(),
            body: json!({ "error": error.body_text() }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::NoFiles => Self::bad_request(error.to_string()),
            IngestError::NoValidFiles { invalid_files } => Self {
                status: StatusCode::BAD_REQUEST,
                body: json!({
                    "message": UPLOAD_PARTIAL_MESSAGE,
                    "invalid_files": invalid_files,
                }),
            },
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<AnswerError> for AppError {
    fn from(error: AnswerError) -> Self {
        if error.is_client_error() {
            Self::bad_request(error.to_string())
        } else {
            Self::internal(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpSettings, create_router};
    use crate::generation::GenerationClientError;
    use crate::metrics::MetricsSnapshot;
    use crate::processing::{
        AnswerError, AnswerOutcome, HistoryEntry, IngestError, IngestOutcome, ProcessingStatus,
        RagApi, RetrievalError, UploadState, UploadedFile,
    };
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "rusty-rag-boundary";

    type IngestFn = fn(&[UploadedFile]) -> Result<IngestOutcome, IngestError>;
    type AnswerFn = fn(&str) -> Result<AnswerOutcome, AnswerError>;

    struct StubRagService {
        ingest: IngestFn,
        answer: AnswerFn,
        uploads: Mutex<Vec<Vec<UploadedFile>>>,
        questions: Mutex<Vec<String>>,
        status: ProcessingStatus,
    }

    impl StubRagService {
        fn new(ingest: IngestFn, answer: AnswerFn) -> Self {
            Self {
                ingest,
                answer,
                uploads: Mutex::new(Vec::new()),
                questions: Mutex::new(Vec::new()),
                status: ProcessingStatus::default(),
            }
        }
    }

    #[async_trait]
    impl RagApi for StubRagService {
        async fn ingest_uploads(
            &self,
            files: Vec<UploadedFile>,
        ) -> Result<IngestOutcome, IngestError> {
            let result = (self.ingest)(&files);
            self.uploads.lock().unwrap().push(files);
            result
        }

        async fn answer_question(&self, question: String) -> Result<AnswerOutcome, AnswerError> {
            let result = (self.answer)(&question);
            self.questions.lock().unwrap().push(question);
            result
        }

        fn status_snapshot(&self) -> ProcessingStatus {
            self.status.clone()
        }

        fn history(&self) -> Vec<HistoryEntry> {
            vec![sample_entry()]
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                batches_ingested: 1,
                batches_failed: 0,
                chunks_indexed: 4,
                questions_answered: 2,
                questions_failed: 0,
            }
        }
    }

    fn sample_entry() -> HistoryEntry {
        HistoryEntry {
            question: "What is Rust?".into(),
            answer: "A systems language.".into(),
            response_time: 0.5,
        }
    }

    fn ingest_ok(files: &[UploadedFile]) -> Result<IngestOutcome, IngestError> {
        Ok(IngestOutcome {
            documents_processed: 3,
            files_processed: files.len(),
            pages_loaded: 2,
            invalid_files: Vec::new(),
            elapsed: Duration::from_millis(1250),
        })
    }

    fn ingest_with_rejections(files: &[UploadedFile]) -> Result<IngestOutcome, IngestError> {
        Ok(IngestOutcome {
            documents_processed: 1,
            files_processed: 1,
            pages_loaded: 1,
            invalid_files: files
                .iter()
                .filter(|file| !file.filename.ends_with(".pdf"))
                .map(|file| file.filename.clone())
                .collect(),
            elapsed: Duration::from_millis(10),
        })
    }

    fn ingest_fails(_files: &[UploadedFile]) -> Result<IngestOutcome, IngestError> {
        Err(IngestError::Worker("parser crashed".into()))
    }

    fn ingest_no_files(files: &[UploadedFile]) -> Result<IngestOutcome, IngestError> {
        assert!(files.is_empty());
        Err(IngestError::NoFiles)
    }

    fn answer_ok(question: &str) -> Result<AnswerOutcome, AnswerError> {
        Ok(AnswerOutcome {
            answer: format!("answer to {question}"),
            response_time: 0.1234,
            history: vec![sample_entry()],
        })
    }

    fn answer_not_ready(_question: &str) -> Result<AnswerOutcome, AnswerError> {
        Err(AnswerError::Retrieval(RetrievalError::NotReady))
    }

    fn answer_generation_fails(_question: &str) -> Result<AnswerOutcome, AnswerError> {
        Err(AnswerError::Generation(
            GenerationClientError::GenerationFailed("model offline".into()),
        ))
    }

    fn router(service: Arc<StubRagService>, assets: &std::path::Path) -> Router {
        create_router(
            service,
            HttpSettings {
                index_html: assets.join("index.html"),
                static_dir: assets.join("static"),
                max_upload_bytes: 1024 * 1024,
            },
        )
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Body {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart_body(parts))
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn upload_reports_processing_summary() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_ok));
        let app = router(service.clone(), assets.path());

        let response = app
            .oneshot(multipart_request(
                "/upload-pdf/",
                &[
                    ("files", Some("a.pdf"), b"%PDF-a"),
                    ("files", Some("b.pdf"), b"%PDF-b"),
                ],
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["message"], "PDFs uploaded and processed successfully!");
        assert_eq!(json["processing_time"], "1.25 seconds");
        assert_eq!(json["documents_processed"], 3);

        let uploads = service.uploads.lock().unwrap();
        let names: Vec<_> = uploads[0].iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert_eq!(uploads[0][1].bytes, b"%PDF-b");
    }

    #[tokio::test]
    async fn upload_with_rejected_files_returns_bad_request() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_with_rejections, answer_ok));
        let app = router(service, assets.path());

        let response = app
            .oneshot(multipart_request(
                "/upload-pdf/",
                &[
                    ("files", Some("good.pdf"), b"%PDF"),
                    ("files", Some("notes.txt"), b"plain"),
                ],
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["invalid_files"], serde_json::json!(["notes.txt"]));
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn upload_without_file_parts_is_rejected() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_no_files, answer_ok));
        let app = router(service, assets.path());

        let response = app
            .oneshot(multipart_request(
                "/upload-pdf/",
                &[("note", None, b"not a file"), ("files", Some(""), b"")],
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "No files were uploaded.");
    }

    #[tokio::test]
    async fn upload_failure_maps_to_internal_error() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_fails, answer_ok));
        let app = router(service, assets.path());

        let response = app
            .oneshot(multipart_request(
                "/upload-pdf/",
                &[("files", Some("a.pdf"), b"%PDF")],
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|message| message.contains("parser crashed"))
        );
    }

    #[tokio::test]
    async fn ask_question_accepts_urlencoded_form() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_ok));
        let app = router(service.clone(), assets.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ask-question/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("question=What+is+Rust%3F"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["response"], "answer to What is Rust?");
        assert_eq!(json["response_time"], 0.1234);
        assert_eq!(json["history"][0]["question"], "What is Rust?");
        assert_eq!(json["history"][0]["answer"], "A systems language.");
        assert_eq!(
            service.questions.lock().unwrap().as_slice(),
            ["What is Rust?".to_string()]
        );
    }

    #[tokio::test]
    async fn ask_question_accepts_multipart_form() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_ok));
        let app = router(service.clone(), assets.path());

        let response = app
            .oneshot(multipart_request(
                "/ask-question/",
                &[("question", None, b"Who wrote it?")],
            ))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            service.questions.lock().unwrap().as_slice(),
            ["Who wrote it?".to_string()]
        );
    }

    #[tokio::test]
    async fn ask_question_without_field_is_rejected() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_ok));
        let app = router(service.clone(), assets.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ask-question/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("query=hello"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
        assert!(service.questions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ask_question_before_upload_returns_bad_request() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_not_ready));
        let app = router(service, assets.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ask-question/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("question=anything"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Please upload PDFs first.");
    }

    #[tokio::test]
    async fn generation_failure_maps_to_internal_error() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_generation_fails));
        let app = router(service, assets.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ask-question/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("question=anything"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|message| message.contains("model offline"))
        );
    }

    #[tokio::test]
    async fn upload_status_omits_error_message_when_idle() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_ok));
        let app = router(service, assets.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/upload-status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "idle");
        assert_eq!(json["total_files"], 0);
        assert!(json.get("error_message").is_none());
    }

    #[tokio::test]
    async fn upload_status_reports_error_message() {
        let assets = tempfile::tempdir().expect("tempdir");
        let mut stub = StubRagService::new(ingest_ok, answer_ok);
        stub.status = ProcessingStatus {
            current_file: "broken.pdf".into(),
            total_files: 2,
            processed_files: 1,
            status: UploadState::Error,
            error_message: Some("bad xref".into()),
        };
        let app = router(Arc::new(stub), assets.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/upload-status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        let json = json_body(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["current_file"], "broken.pdf");
        assert_eq!(json["error_message"], "bad xref");
    }

    #[tokio::test]
    async fn history_and_metrics_are_exposed() {
        let assets = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_ok));
        let app = router(service, assets.path());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/history")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        let json = json_body(response).await;
        assert_eq!(json["history"][0]["response_time"], 0.5);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        let json = json_body(response).await;
        assert_eq!(json["chunks_indexed"], 4);
        assert_eq!(json["questions_answered"], 2);
    }

    #[tokio::test]
    async fn serves_index_page_and_static_assets() {
        let assets = tempfile::tempdir().expect("tempdir");
        std::fs::write(assets.path().join("index.html"), "<h1>Ask your PDFs</h1>")
            .expect("index");
        std::fs::create_dir(assets.path().join("static")).expect("static dir");
        std::fs::write(assets.path().join("static/script.js"), "console.log('hi');")
            .expect("script");
        let service = Arc::new(StubRagService::new(ingest_ok, answer_ok));
        let app = router(service, assets.path());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&body[..], b"<h1>Ask your PDFs</h1>");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/static/script.js")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/missing.js")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
