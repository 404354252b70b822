use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use vela::config::ExternalServiceConfig;
use vela::error::{Result, VelaError};
use vela::mixer::{AudioBuffer, AudioMixer};
use vela::orchestrator::RequestOrchestrator;
use vela::persist::{AssetPersister, FilesystemPersister};
use vela::pipeline::{IdentityPolicy, MeditationPipeline};
use vela::script::ScriptProvider;
use vela::synthesis::SpeechSynthesizer;
use vela::types::{
    Delivery, DurationMinutes, GenerationRequest, Profile, RitualKind, RitualParams, UserRef,
    Voice,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Script provider returning a fixed script and recording the requested
/// word counts.
struct FixedScriptProvider {
    script: String,
    word_counts: Mutex<Vec<String>>,
}

impl FixedScriptProvider {
    fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            word_counts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScriptProvider for FixedScriptProvider {
    async fn generate_script(&self, _profile: &Profile, word_count: &str) -> Result<String> {
        self.word_counts
            .lock()
            .unwrap()
            .push(word_count.to_string());
        Ok(self.script.clone())
    }
}

/// Synthesizer returning fixed audio and recording every call.
struct RecordingSynthesizer {
    output: Vec<u8>,
    calls: Mutex<Vec<(String, Voice)>>,
}

impl RecordingSynthesizer {
    fn wav() -> Self {
        let output = AudioBuffer::silence(1_500, 44_100, 1)
            .to_wav_bytes()
            .unwrap();
        Self {
            output,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push((text.to_string(), voice));
        Ok(self.output.clone())
    }
}

fn background_wav() -> Vec<u8> {
    AudioBuffer::silence(500, 44_100, 1).to_wav_bytes().unwrap()
}

fn request(kind: RitualKind, duration: DurationMinutes) -> GenerationRequest {
    GenerationRequest {
        user: Some(UserRef("user-7".into())),
        kind,
        profile: Profile {
            name: "Aria".into(),
            goals: "Learn the cello".into(),
            dream_life: "A cottage by the sea".into(),
            activities: "Walking in the rain".into(),
            age_range: None,
            gender: None,
        },
        params: RitualParams {
            duration,
            ..RitualParams::default()
        },
    }
}

fn remote_config(base_url: &str) -> ExternalServiceConfig {
    ExternalServiceConfig {
        base_url: base_url.to_string(),
        retry_delay: Duration::from_millis(1),
        ..ExternalServiceConfig::default()
    }
}

fn pipeline(
    script: Arc<dyn ScriptProvider>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    external: ExternalServiceConfig,
    persister: Arc<dyn AssetPersister>,
) -> MeditationPipeline {
    MeditationPipeline::new(
        script,
        synthesizer,
        AudioMixer::new(background_wav()),
        RequestOrchestrator::new(external),
        persister,
    )
}

fn disabled_external() -> ExternalServiceConfig {
    ExternalServiceConfig {
        enabled: false,
        ..ExternalServiceConfig::default()
    }
}

#[tokio::test]
async fn local_five_minute_request_flows_through_pacing_and_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    let script = Arc::new(FixedScriptProvider::new(
        "Close your eyes. Feel your breath. Sleep well, Aria.",
    ));
    let synthesizer = Arc::new(RecordingSynthesizer::wav());
    let pipeline = pipeline(
        script.clone(),
        synthesizer.clone(),
        disabled_external(),
        Arc::new(FilesystemPersister::new(dir.path())),
    );

    let outcome = pipeline
        .generate_local(&request(RitualKind::Sleep, DurationMinutes::Five))
        .await
        .expect("local generation should succeed");

    assert_eq!(outcome.delivery, Delivery::Generated);
    assert!(!outcome.is_degraded());
    assert!(outcome.asset.id.starts_with("meditation_sleep_manifestation_"));

    // Five minutes maps to the 600-word target.
    assert_eq!(*script.word_counts.lock().unwrap(), vec!["600".to_string()]);

    // The synthesizer saw the annotated script: a pacing marker after
    // each internal boundary except the one before the final sentence,
    // and the default female voice.
    let calls = synthesizer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (text, voice) = &calls[0];
    assert_eq!(
        text,
        "Close your eyes. --- Feel your breath. Sleep well, Aria."
    );
    assert!(!text.ends_with(" --- "));
    assert_eq!(*voice, Voice::Female);

    // The stored asset is resolvable and non-empty.
    let found = pipeline
        .asset_reference(&outcome.asset.id)
        .await
        .expect("stored asset should resolve");
    assert_eq!(found.id, outcome.asset.id);
    let stored = std::fs::read(&found.url).unwrap();
    assert!(!stored.is_empty());
}

#[tokio::test]
async fn remote_audio_success_is_persisted_as_generated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(b"ID3remote-meditation".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(
        Arc::new(FixedScriptProvider::new("unused.")),
        Arc::new(RecordingSynthesizer::wav()),
        remote_config(&server.uri()),
        Arc::new(FilesystemPersister::new(dir.path())),
    );

    let outcome = pipeline
        .generate_remote(&request(RitualKind::Calm, DurationMinutes::Two))
        .await
        .expect("remote generation should succeed");

    assert_eq!(outcome.delivery, Delivery::Generated);
    let found = pipeline.asset_reference(&outcome.asset.id).await.unwrap();
    let stored = std::fs::read(&found.url).unwrap();
    assert_eq!(stored, b"ID3remote-meditation".to_vec());
}

#[tokio::test]
async fn persistent_remote_failure_delivers_the_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(
        Arc::new(FixedScriptProvider::new("unused.")),
        Arc::new(RecordingSynthesizer::wav()),
        remote_config(&server.uri()),
        Arc::new(FilesystemPersister::new(dir.path())),
    );

    let outcome = pipeline
        .generate_remote(&request(RitualKind::Dream, DurationMinutes::Ten))
        .await
        .expect("fallback must not surface as an error");

    assert_eq!(outcome.delivery, Delivery::Placeholder);
    assert!(outcome.is_degraded());

    // The placeholder is a real, non-empty stored asset.
    let found = pipeline.asset_reference(&outcome.asset.id).await.unwrap();
    let stored = std::fs::read(&found.url).unwrap();
    assert!(!stored.is_empty());
}

#[tokio::test]
async fn disabled_remote_path_goes_straight_to_the_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(
        Arc::new(FixedScriptProvider::new("unused.")),
        Arc::new(RecordingSynthesizer::wav()),
        disabled_external(),
        Arc::new(FilesystemPersister::new(dir.path())),
    );

    let outcome = pipeline
        .generate_remote(&request(RitualKind::Spark, DurationMinutes::Two))
        .await
        .unwrap();
    assert!(outcome.is_degraded());
}

#[tokio::test]
async fn missing_identity_is_rejected_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let script = Arc::new(FixedScriptProvider::new("unused."));
    let pipeline = pipeline(
        script.clone(),
        Arc::new(RecordingSynthesizer::wav()),
        disabled_external(),
        Arc::new(FilesystemPersister::new(dir.path())),
    );

    let mut anonymous = request(RitualKind::Sleep, DurationMinutes::Two);
    anonymous.user = None;

    let err = pipeline.generate_local(&anonymous).await.unwrap_err();
    assert!(matches!(err, VelaError::InvalidArgument(_)));
    let err = pipeline.generate_remote(&anonymous).await.unwrap_err();
    assert!(matches!(err, VelaError::InvalidArgument(_)));

    // Rejection happens before any provider work.
    assert!(script.word_counts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_requests_proceed_under_the_permissive_policy() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(
        Arc::new(FixedScriptProvider::new("unused.")),
        Arc::new(RecordingSynthesizer::wav()),
        disabled_external(),
        Arc::new(FilesystemPersister::new(dir.path())),
    )
    .with_identity_policy(IdentityPolicy::AllowAnonymous);

    let mut anonymous = request(RitualKind::Sleep, DurationMinutes::Two);
    anonymous.user = None;

    let outcome = pipeline.generate_remote(&anonymous).await.unwrap();
    assert_eq!(outcome.delivery, Delivery::Placeholder);
}
