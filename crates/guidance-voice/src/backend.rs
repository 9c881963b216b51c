//! Speech backends - the remote synthesis service and the on-device
//! fallback voice, each behind a capability trait.
//!
//! The remote path is a two-step HTTP exchange: request a signed URL for the
//! synthesized audio, then download the bytes. The local path is the
//! platform's own TTS engine; as far as this engine is concerned it always
//! succeeds, so it is the terminal fallback for every remote failure.

use crate::error::{GuidanceError, GuidanceResult, SynthesisError};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Minimum and default speech rates of the on-device voice, in the
/// platform's 0.0–1.0 rate scale.
pub const LOCAL_RATE_MINIMUM: f32 = 0.0;
pub const LOCAL_RATE_DEFAULT: f32 = 0.5;

/// Reduced rate applied on legacy platforms for legibility: minimum rate
/// plus a fifth of the default.
pub fn reduced_speech_rate() -> f32 {
    LOCAL_RATE_MINIMUM + LOCAL_RATE_DEFAULT / 5.0
}

/// Wrap escaped instruction text in the SSML document the remote backend
/// expects. `volume` and `rate` are SSML prosody values (e.g. "default",
/// "1.08").
pub fn build_ssml(escaped_text: &str, volume: &str, rate: &str) -> String {
    format!(
        "<speak><prosody volume='{}' rate='{}'>{}</prosody></speak>",
        volume, rate, escaped_text
    )
}

/// Remote synthesis capability: marked-up text plus a resolved voice id in,
/// compressed audio bytes out.
#[async_trait]
pub trait RemoteSynthesizer: Send + Sync {
    async fn synthesize(&self, markup: &str, voice: &str) -> Result<Vec<u8>, SynthesisError>;
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(default)]
    url: String,
}

/// Production remote backend: requests a signed playable-audio URL from the
/// synthesis service, then downloads the compressed audio.
#[derive(Debug, Clone)]
pub struct HttpRemoteSynthesizer {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Service region forwarded with each request.
    pub region: String,
    /// Output format requested from the service.
    pub output_format: String,
    client: reqwest::Client,
}

impl HttpRemoteSynthesizer {
    /// Build from environment: GUIDANCE_TTS_API_URL, GUIDANCE_TTS_API_KEY,
    /// GUIDANCE_TTS_REGION. A missing key means the remote backend is
    /// disabled and the engine runs local-only.
    pub fn from_env(timeout: Duration) -> GuidanceResult<Self> {
        let base_url = std::env::var("GUIDANCE_TTS_API_URL")
            .unwrap_or_else(|_| "https://speech.example.com/v1".to_string());
        let api_key = std::env::var("GUIDANCE_TTS_API_KEY").map_err(|_| {
            GuidanceError::Config("Remote synthesis requires GUIDANCE_TTS_API_KEY".to_string())
        })?;
        let region = std::env::var("GUIDANCE_TTS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        Self::new(base_url, api_key, region, timeout)
    }

    /// Create with explicit config (e.g. for tests or non-env wiring).
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        region: impl Into<String>,
        timeout: Duration,
    ) -> GuidanceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GuidanceError::Config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            region: region.into(),
            output_format: "mp3".to_string(),
            client,
        })
    }
}

#[async_trait]
impl RemoteSynthesizer for HttpRemoteSynthesizer {
    async fn synthesize(&self, markup: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/speech", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "text": markup,
            "text_type": "ssml",
            "voice": voice,
            "output_format": self.output_format,
            "region": self.region,
        });
        debug!(voice, "Requesting signed audio URL");
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SynthesisError::RequestFailed(format!(
                "synthesis API error {}: {}",
                status, body
            )));
        }
        let signed: SignedUrlResponse = res
            .json()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;
        if signed.url.trim().is_empty() {
            return Err(SynthesisError::NoResult);
        }

        let audio = self
            .client
            .get(&signed.url)
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;
        if !audio.status().is_success() {
            return Err(SynthesisError::RequestFailed(format!(
                "audio download error {}",
                audio.status()
            )));
        }
        let bytes = audio
            .bytes()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;
        if bytes.is_empty() {
            return Err(SynthesisError::NoResult);
        }
        Ok(bytes.to_vec())
    }
}

/// Handle to one in-flight local utterance; `done` resolves when the device
/// finishes speaking (or is dropped on cancellation).
pub struct LocalUtterance {
    pub done: oneshot::Receiver<()>,
}

/// On-device TTS capability. Device synthesis failure is outside this
/// engine's failure model, so `speak` only fails on wiring errors.
pub trait LocalSpeech: Send + Sync {
    /// Start speaking `text` at `rate` (platform 0.0–1.0 scale). Returns a
    /// completion handle for the utterance.
    fn speak(&self, text: &str, rate: f32) -> GuidanceResult<LocalUtterance>;

    /// Stop the current utterance immediately, if any.
    fn stop(&self);
}

/// Placeholder local voice: records spoken text and completes after an
/// optional simulated speaking delay. Used by tests and the demo.
#[derive(Default)]
pub struct PlaceholderLocalSpeech {
    /// Simulated utterance duration; zero completes immediately.
    pub speak_delay: Duration,
    spoken: Mutex<Vec<String>>,
    active: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl PlaceholderLocalSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            speak_delay: delay,
            ..Self::default()
        }
    }

    /// Everything spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    /// Whether a simulated utterance is still in progress.
    pub fn speaking(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }
}

impl LocalSpeech for PlaceholderLocalSpeech {
    fn speak(&self, text: &str, _rate: f32) -> GuidanceResult<LocalUtterance> {
        self.spoken.lock().unwrap().push(text.to_string());
        let (tx, rx) = oneshot::channel();
        if self.speak_delay.is_zero() {
            let _ = tx.send(());
        } else {
            *self.active.lock().unwrap() = Some(tx);
            let active = Arc::clone(&self.active);
            let delay = self.speak_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(sender) = active.lock().unwrap().take() {
                    let _ = sender.send(());
                }
            });
        }
        Ok(LocalUtterance { done: rx })
    }

    fn stop(&self) {
        // Dropping the sender resolves the receiver with an error, which the
        // orchestrator treats as a cancelled utterance.
        *self.active.lock().unwrap() = None;
    }
}
