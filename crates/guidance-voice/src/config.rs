//! Configuration for the voice guidance engine.
//!
//! Remote credentials are optional: when absent the engine runs in
//! local-fallback-only mode and never dials out.

use crate::distance::MeasurementUnits;
use std::time::Duration;

/// Credentials and region for the remote synthesis service.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Service region forwarded with each request.
    pub region: String,
}

impl RemoteConfig {
    /// Build from environment: GUIDANCE_TTS_API_URL, GUIDANCE_TTS_API_KEY,
    /// GUIDANCE_TTS_REGION. Returns None when no key is configured.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GUIDANCE_TTS_API_KEY").ok()?;
        let base_url = std::env::var("GUIDANCE_TTS_API_URL")
            .unwrap_or_else(|_| "https://speech.example.com/v1".to_string());
        let region =
            std::env::var("GUIDANCE_TTS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        Some(Self {
            base_url,
            api_key,
            region,
        })
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct GuidanceConfig {
    /// Remote synthesis service. None disables the remote path entirely.
    pub remote: Option<RemoteConfig>,
    /// Bound on the remote synthesis round trip; elapsing falls back to the
    /// local voice.
    pub remote_timeout: Duration,
    /// SSML prosody rate sent to the remote backend.
    pub speech_rate: String,
    /// SSML prosody volume sent to the remote backend.
    pub speech_volume: String,
    /// Playback volume for remote audio, 0.0–1.0.
    pub volume: f32,
    /// Explicit voice id; wins over the locale mapping.
    pub voice_override: Option<String>,
    /// Locale used to derive the remote voice (e.g. "en-GB").
    pub locale: String,
    /// Measurement system for spoken distances.
    pub units: MeasurementUnits,
    /// Whether a reroute clears the de-duplication key, allowing the same
    /// step to be announced again.
    pub reannounce_after_reroute: bool,
    /// Apply the reduced local speech rate required on legacy platforms.
    pub legacy_rate: bool,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            remote: None,
            remote_timeout: Duration::from_secs(5),
            speech_rate: "1.08".to_string(),
            speech_volume: "default".to_string(),
            volume: 1.0,
            voice_override: None,
            locale: "en".to_string(),
            units: MeasurementUnits::Metric,
            reannounce_after_reroute: false,
            legacy_rate: false,
        }
    }
}

impl GuidanceConfig {
    /// Build from environment; remote stays disabled unless credentials are
    /// present. GUIDANCE_LOCALE and GUIDANCE_VOICE select the remote voice.
    pub fn from_env() -> Self {
        let mut config = Self {
            remote: RemoteConfig::from_env(),
            ..Self::default()
        };
        if let Ok(locale) = std::env::var("GUIDANCE_LOCALE") {
            config.locale = locale;
        }
        if let Ok(voice) = std::env::var("GUIDANCE_VOICE") {
            config.voice_override = Some(voice);
        }
        if let Ok(units) = std::env::var("GUIDANCE_UNITS") {
            if units.eq_ignore_ascii_case("imperial") {
                config.units = MeasurementUnits::Imperial;
            }
        }
        if let Ok(ms) = std::env::var("GUIDANCE_REMOTE_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                config.remote_timeout = Duration::from_millis(ms);
            }
        }
        config
    }
}
