// tests/verify_inputs.rs
// Modality selection and validation of the verification engine: precedence,
// invalid URL short-circuit, and the no-input case. None of these touch the
// network.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use news_veracity_analyzer::ai::{AiError, AiRuntime, GenerativeBackend};
use news_veracity_analyzer::rate_limit::RateLimiter;
use news_veracity_analyzer::verify::{VerificationEngine, VerificationInput, Verdict};

struct CountingBackend {
    calls: AtomicUsize,
    reply: String,
}

impl CountingBackend {
    fn fixed(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
        })
    }
}

impl GenerativeBackend for CountingBackend {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.clone();
        Box::pin(async move { Ok(reply) })
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

fn engine(backend: Arc<CountingBackend>) -> VerificationEngine {
    VerificationEngine::new(Arc::new(AiRuntime::new(
        backend,
        Arc::new(RateLimiter::per_minute(10)),
    )))
}

#[tokio::test]
async fn no_input_is_invalid_without_any_io() {
    let backend = CountingBackend::fixed("unused");
    let result = engine(backend.clone())
        .verify(&VerificationInput::default())
        .await;

    assert_eq!(result.verdict, Verdict::Invalid);
    assert_eq!(result.confidence, 0);
    assert_eq!(result.explanation, "no input provided");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_text_counts_as_absent() {
    let backend = CountingBackend::fixed("unused");
    let result = engine(backend)
        .verify(&VerificationInput::text("   "))
        .await;
    assert_eq!(result.verdict, Verdict::Invalid);
}

#[tokio::test]
async fn malformed_url_is_invalid_with_zero_network_calls() {
    let backend = CountingBackend::fixed("unused");
    let result = engine(backend.clone())
        .verify(&VerificationInput::url("not-a-url"))
        .await;

    assert_eq!(result.verdict, Verdict::Invalid);
    assert_eq!(result.confidence, 0);
    assert_eq!(result.source_info, "invalid URL");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn text_takes_precedence_over_url() {
    let backend = CountingBackend::fixed("RESULT: True\nCONFIDENCE: 90\nEXPLANATION: ok");
    // The URL is unroutable; if the engine tried to fetch it the result
    // would be Error, not the backend verdict.
    let input = VerificationInput {
        text: Some("The claim under test".to_string()),
        url: Some("https://host.invalid/article".to_string()),
        ..Default::default()
    };
    let result = engine(backend.clone()).verify(&input).await;

    assert_eq!(result.verdict, Verdict::True);
    assert_eq!(result.source_info, "direct text input");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn document_takes_precedence_over_url() {
    let backend = CountingBackend::fixed("unused");
    // Corrupt bytes: the document path must be chosen (Error from the PDF
    // extractor), not the URL path.
    let input = VerificationInput {
        document: Some(b"not a pdf".to_vec()),
        document_name: Some("claims.pdf".to_string()),
        url: Some("https://host.invalid/article".to_string()),
        ..Default::default()
    };
    let result = engine(backend.clone()).verify(&input).await;

    assert_eq!(result.verdict, Verdict::Error);
    assert_eq!(result.source_info, "PDF file: claims.pdf");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn corrupt_document_reports_the_extraction_error() {
    let backend = CountingBackend::fixed("unused");
    let result = engine(backend)
        .verify(&VerificationInput::document(b"garbage".to_vec(), None))
        .await;

    assert_eq!(result.verdict, Verdict::Error);
    assert!(result.explanation.contains("Error processing PDF"));
    assert_eq!(result.source_info, "PDF file: uploaded document");
}

#[tokio::test]
async fn rate_limited_verification_is_synthesized_without_a_backend_call() {
    let backend = CountingBackend::fixed("unused");
    let engine = VerificationEngine::new(Arc::new(AiRuntime::new(
        backend.clone(),
        Arc::new(RateLimiter::per_minute(0)),
    )));

    let result = engine
        .verify(&VerificationInput::text("Some claim"))
        .await;

    assert_eq!(result.verdict, Verdict::RateLimited);
    assert_eq!(result.confidence, 0);
    assert!(result.explanation.contains("Retry in"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}
