//! Error types for the voice guidance engine

use thiserror::Error;

/// Result type alias for guidance operations
pub type GuidanceResult<T> = Result<T, GuidanceError>;

/// Errors that can occur in the voice guidance engine
#[derive(Error, Debug)]
pub enum GuidanceError {
    /// Wrapper for [`SynthesisError`], for callers folding backend failures
    /// into the unified error type with `?`.
    #[error("Speech synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Audio playback error: {0}")]
    Playback(String),

    /// Raised by platform `AudioSession` implementations when switching the
    /// shared audio output in or out of ducking mode fails.
    #[error("Audio session error: {0}")]
    AudioSession(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel send error: {0}")]
    ChannelSend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures from the remote speech-synthesis backend. All variants are
/// non-fatal: the orchestrator falls back to local speech exactly once
/// per announcement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Network, auth, service or timeout failure on the synthesis request.
    #[error("Remote synthesis request failed: {0}")]
    RequestFailed(String),

    /// The backend answered but returned no usable audio resource.
    #[error("Remote synthesis returned no result")]
    NoResult,
}
