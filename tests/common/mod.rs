/*!
 * Common test utilities for the qrayti test suite
 */

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use qrayti::api::ApiState;
use qrayti::generation::GenerationService;
use qrayti::providers::mock::MockProvider;

/// Boundary used by `multipart_upload`
pub const BOUNDARY: &str = "qrayti-test-boundary";

/// A paragraph of French course material, comfortably above the minimum length
pub const COURSE_TEXT: &str = "Le contrat est un accord de volontes entre deux ou plusieurs personnes \
destine a creer des obligations. Sa formation suppose le consentement des parties, \
leur capacite, un contenu licite et certain.";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given bytes in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Builds an in-memory PDF with one page per entry; each page holds the given lines
pub fn build_pdf(pages: &[Vec<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 780.into()]),
        ];
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content stream should encode"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("pdf should serialize");
    buffer
}

/// A two-page course PDF with enough text to pass extraction
pub fn course_pdf() -> Vec<u8> {
    build_pdf(&[
        vec![
            "Chapitre 1 : Formation du contrat",
            "Le contrat est un accord de volontes destine a creer des obligations.",
        ],
        vec![
            "Chapitre 2 : Effets du contrat",
            "Le contrat legalement forme tient lieu de loi a ceux qui l ont fait.",
        ],
    ])
}

/// Handler state whose model loaded successfully
pub async fn ready_state(provider: MockProvider) -> ApiState {
    let service = GenerationService::new(Arc::new(provider), "local (mock)");
    service
        .load_model()
        .await
        .expect("mock model should load");
    ApiState::new(Arc::new(service))
}

/// Handler state whose model never loaded
pub fn unready_state(provider: MockProvider) -> ApiState {
    ApiState::new(Arc::new(GenerationService::new(
        Arc::new(provider),
        "local (mock)",
    )))
}

/// JSON POST request
pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Plain GET request
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

/// Multipart upload of a single `file` field
pub fn multipart_upload(file_name: &str, data: &[u8]) -> Request<Body> {
    multipart_field("file", file_name, data)
}

/// Multipart upload of a single field with an arbitrary name
pub fn multipart_field(field_name: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload-pdf")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .expect("request should build")
}

/// CORS preflight for a POST from `origin`
pub fn preflight_request(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .expect("request should build")
}

/// Raw POST with a JSON content type and an arbitrary body
pub fn raw_json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Collect a response body as JSON
pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
