use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tower::ServiceExt;

use certissue::api::{create_router, AppState};
use certissue::blob::{BlobStore, MemoryBlobStore, Visibility};
use certissue::engine::{DocumentEngine, EngineInstance, PdfOptions};
use certissue::record::{CertificateRecord, MemoryRecordStore, RecordStore};
use certissue::service::{IssuanceService, IssueRequest, PublishPolicy, PublishStatus, VerificationService};
use certissue::template::{CertificateAssets, PlaceholderReplacer};
use certissue::{CertError, Result};

const BASE: &str = "https://bucket.example.com";

/// Record store counting writes
#[derive(Default)]
struct CountingRecordStore {
    inner: MemoryRecordStore,
    puts: AtomicUsize,
}

#[async_trait]
impl RecordStore for CountingRecordStore {
    async fn query(&self, id: &str) -> Result<Vec<CertificateRecord>> {
        self.inner.query(id).await
    }

    async fn put(&self, record: CertificateRecord) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(record).await
    }
}

struct BrokenRecordStore;

#[async_trait]
impl RecordStore for BrokenRecordStore {
    async fn query(&self, _id: &str) -> Result<Vec<CertificateRecord>> {
        Err(CertError::RecordStore("connection lost".to_string()))
    }

    async fn put(&self, _record: CertificateRecord) -> Result<()> {
        Err(CertError::RecordStore("connection lost".to_string()))
    }
}

struct BrokenBlobStore;

#[async_trait]
impl BlobStore for BrokenBlobStore {
    async fn put_object(&self, key: &str, _: Vec<u8>, _: Visibility, _: &str) -> Result<()> {
        Err(CertError::BlobStore(format!("access denied for {}", key)))
    }
}

/// What the fake engine saw
#[derive(Default)]
struct EngineProbe {
    launched: AtomicUsize,
    closed: AtomicUsize,
    rendered: Mutex<Vec<String>>,
    options: Mutex<Vec<PdfOptions>>,
}

struct FakeEngine {
    probe: Arc<EngineProbe>,
    fail_render: bool,
}

struct FakeInstance {
    probe: Arc<EngineProbe>,
    fail_render: bool,
}

#[async_trait]
impl DocumentEngine for FakeEngine {
    async fn launch(&self) -> Result<Box<dyn EngineInstance>> {
        self.probe.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeInstance {
            probe: self.probe.clone(),
            fail_render: self.fail_render,
        }))
    }
}

#[async_trait]
impl EngineInstance for FakeInstance {
    async fn render_to_pdf(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>> {
        self.probe.options.lock().unwrap().push(options.clone());
        if self.fail_render {
            return Err(CertError::Engine("page crashed".to_string()));
        }
        self.probe.rendered.lock().unwrap().push(html.to_string());
        Ok(format!("%PDF-{}", html).into_bytes())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    records: Arc<CountingRecordStore>,
    blobs: Arc<MemoryBlobStore>,
    probe: Arc<EngineProbe>,
    issuance: IssuanceService,
    verification: VerificationService,
}

fn write_assets(dir: &TempDir) -> CertificateAssets {
    let template = dir.path().join("certificate.html");
    let seal = dir.path().join("seal.png");
    std::fs::write(&template, "{{id}}|{{ name }}|{{grade}}|{{date}}|{{{medal}}}").unwrap();
    std::fs::write(&seal, b"seal").unwrap();
    CertificateAssets::new(template, seal)
}

fn harness(fail_render: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let assets = write_assets(&dir);
    let records = Arc::new(CountingRecordStore::default());
    let blobs = Arc::new(MemoryBlobStore::new());
    let probe = Arc::new(EngineProbe::default());

    let issuance = IssuanceService::new(
        records.clone(),
        blobs.clone(),
        Arc::new(PlaceholderReplacer::new()),
        Arc::new(FakeEngine {
            probe: probe.clone(),
            fail_render,
        }),
        assets,
        BASE,
    );
    let verification = VerificationService::new(records.clone(), BASE);

    Harness {
        _dir: dir,
        records,
        blobs,
        probe,
        issuance,
        verification,
    }
}

async fn call(router: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn issue_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generateCertificate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn verify_request(id: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/verifyCertificate/{}", id))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_issue_publishes_pdf() {
    let h = harness(false);

    let outcome = h.issuance.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();

    assert_eq!(outcome.url, "https://bucket.example.com/u1.pdf");
    assert!(outcome.created);
    assert_eq!(outcome.published, PublishStatus::Published);

    let object = h.blobs.get("u1.pdf").await.unwrap();
    assert_eq!(object.content_type, "application/pdf");
    assert_eq!(object.visibility, Visibility::PublicRead);
    assert!(object.bytes.starts_with(b"%PDF-u1|Jane Doe|A|"));

    let options = h.probe.options.lock().unwrap().clone();
    assert_eq!(options, vec![PdfOptions::certificate()]);
    assert_eq!(h.probe.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_issuance_keeps_record_of_first() {
    let h = harness(false);

    let first = h.issuance.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();
    let second = h.issuance.issue(IssueRequest::new("u1", "John Roe", "B")).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.record, first.record);

    let stored = h.records.query("u1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Jane Doe");
    assert_eq!(stored[0].grade, "A");
    assert_eq!(stored[0].issued_at, first.record.issued_at);

    // the re-rendered document uses the new values but the original date
    let date = first.record.issued_at.format("%d/%m/%Y").to_string();
    let rendered = h.probe.rendered.lock().unwrap().clone();
    assert_eq!(rendered.len(), 2);
    assert!(rendered[1].starts_with(&format!("u1|John Roe|B|{}|", date)));
}

#[tokio::test]
async fn test_single_write_per_identifier() {
    let h = harness(false);

    for _ in 0..5 {
        h.issuance.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();
    }

    assert_eq!(h.records.puts.load(Ordering::SeqCst), 1);
    assert_eq!(h.probe.launched.load(Ordering::SeqCst), 5);
    assert_eq!(h.probe.closed.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_existing_record_date_is_printed() {
    let h = harness(false);
    let issued_at = Utc.with_ymd_and_hms(2021, 3, 7, 10, 0, 0).unwrap();
    h.records
        .inner
        .put(CertificateRecord::new("u1".into(), "Jane Doe".into(), "A".into(), issued_at))
        .await
        .unwrap();

    h.issuance.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();

    let rendered = h.probe.rendered.lock().unwrap().clone();
    assert_eq!(rendered[0], "u1|Jane Doe|A|07/03/2021|c2VhbA==");
    assert_eq!(h.records.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_verify_matches_issuance() {
    let h = harness(false);

    let issued = h.issuance.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();
    let verified = h.verification.verify("u1").await.unwrap().unwrap();

    assert_eq!(verified.url, issued.url);
    assert_eq!(verified.url, "https://bucket.example.com/u1.pdf");
    assert_eq!(verified.record, issued.record);
}

#[tokio::test]
async fn test_verify_unknown_identifier() {
    let h = harness(false);
    assert!(h.verification.verify("nonexistent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_render_failure_still_releases_engine() {
    let h = harness(true);

    let outcome = h.issuance.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();

    assert_eq!(outcome.url, "https://bucket.example.com/u1.pdf");
    assert!(matches!(outcome.published, PublishStatus::Failed(_)));
    assert_eq!(h.probe.launched.load(Ordering::SeqCst), 1);
    assert_eq!(h.probe.closed.load(Ordering::SeqCst), 1);
    assert!(h.blobs.is_empty().await);
    assert_eq!(h.records.puts.load(Ordering::SeqCst), 1);
    assert_eq!(h.records.query("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_blob_failure_is_best_effort() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Arc::new(EngineProbe::default());
    let records = Arc::new(MemoryRecordStore::new());
    let service = IssuanceService::new(
        records.clone(),
        Arc::new(BrokenBlobStore),
        Arc::new(PlaceholderReplacer::new()),
        Arc::new(FakeEngine {
            probe: probe.clone(),
            fail_render: false,
        }),
        write_assets(&dir),
        BASE,
    );

    let outcome = service.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();

    match outcome.published {
        PublishStatus::Failed(reason) => assert!(reason.contains("access denied")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(probe.closed.load(Ordering::SeqCst), 1);
    assert_eq!(records.len().await, 1);
}

#[tokio::test]
async fn test_strict_policy_propagates_render_failure() {
    let h = harness(true);
    let service = h.issuance.with_policy(PublishPolicy::Strict);

    let err = service
        .issue(IssueRequest::new("u1", "Jane Doe", "A"))
        .await
        .unwrap_err();

    assert!(matches!(err, CertError::Engine(_)));
    assert_eq!(h.probe.closed.load(Ordering::SeqCst), 1);
    assert_eq!(h.records.puts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_template_skips_engine() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Arc::new(EngineProbe::default());
    let service = IssuanceService::new(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(PlaceholderReplacer::new()),
        Arc::new(FakeEngine {
            probe: probe.clone(),
            fail_render: false,
        }),
        CertificateAssets::new(dir.path().join("missing.html"), dir.path().join("missing.png")),
        BASE,
    );

    let outcome = service.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();

    assert!(matches!(outcome.published, PublishStatus::Failed(_)));
    assert_eq!(probe.launched.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_offline_mode_requests_local_copy() {
    let h = harness(false);
    let service = h.issuance.with_local_copy(Some(PathBuf::from("./certificate.pdf")));

    service.issue(IssueRequest::new("u1", "Jane Doe", "A")).await.unwrap();

    let options = h.probe.options.lock().unwrap().clone();
    assert_eq!(options[0].path, Some(PathBuf::from("./certificate.pdf")));
}

#[tokio::test]
async fn test_record_store_failure_is_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Arc::new(EngineProbe::default());
    let service = IssuanceService::new(
        Arc::new(BrokenRecordStore),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(PlaceholderReplacer::new()),
        Arc::new(FakeEngine {
            probe: probe.clone(),
            fail_render: false,
        }),
        write_assets(&dir),
        BASE,
    );

    let err = service
        .issue(IssueRequest::new("u1", "Jane Doe", "A"))
        .await
        .unwrap_err();

    assert!(matches!(err, CertError::RecordStore(_)));
    assert_eq!(probe.launched.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_http_forced_render_fault_returns_success() {
    let h = harness(true);
    let router = create_router(Arc::new(AppState::new(h.issuance, h.verification)));

    let (status, json) = call(
        router,
        issue_request(r#"{"id":"u1","name":"Jane Doe","grade":"A"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["url"], "https://bucket.example.com/u1.pdf");
    assert_eq!(h.probe.closed.load(Ordering::SeqCst), 1);
    assert_eq!(h.records.puts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_http_verify_round_trip() {
    let h = harness(false);
    let records = h.records.clone();
    let router = create_router(Arc::new(AppState::new(h.issuance, h.verification)));

    let (status, _) = call(
        router.clone(),
        issue_request(r#"{"id":"u1","name":"Jane Doe","grade":"A"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = call(router.clone(), verify_request("u1")).await;
    let stored = records.query("u1").await.unwrap().remove(0);

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Valid certificate");
    assert_eq!(json["data"]["url"], "https://bucket.example.com/u1.pdf");
    assert_eq!(json["data"]["userCertificate"]["name"], "Jane Doe");
    assert_eq!(json["data"]["userCertificate"]["grade"], "A");
    assert_eq!(
        json["data"]["userCertificate"]["created_at"],
        serde_json::to_value(stored.issued_at).unwrap()
    );

    let (status, json) = call(router, verify_request("nonexistent")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        serde_json::json!({ "success": false, "message": "Invalid certificate" })
    );
}

#[tokio::test]
async fn test_http_malformed_body() {
    let h = harness(false);
    let router = create_router(Arc::new(AppState::new(h.issuance, h.verification)));

    let (status, json) = call(router.clone(), issue_request("{\"id\":")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, _) = call(router, issue_request(r#"{"id":"","name":"Jane","grade":"A"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.records.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_http_record_store_failure() {
    let dir = tempfile::tempdir().unwrap();
    let records: Arc<dyn RecordStore> = Arc::new(BrokenRecordStore);
    let issuance = IssuanceService::new(
        records.clone(),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(PlaceholderReplacer::new()),
        Arc::new(FakeEngine {
            probe: Arc::new(EngineProbe::default()),
            fail_render: false,
        }),
        write_assets(&dir),
        BASE,
    );
    let verification = VerificationService::new(records, BASE);
    let router = create_router(Arc::new(AppState::new(issuance, verification)));

    let (status, json) = call(
        router.clone(),
        issue_request(r#"{"id":"u1","name":"Jane Doe","grade":"A"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);

    let (status, _) = call(router, verify_request("u1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
