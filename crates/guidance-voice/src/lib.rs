//! # Guidance Voice - Turn-by-Turn Announcement Engine
//!
//! This crate decides *whether* a route-progress update is spoken, *what*
//! the instruction text is, and *how* it is synthesized: a remote
//! high-quality backend with an on-device fallback, coordinated with the
//! platform's shared audio output so announcements duck other audio and
//! never repeat or overlap.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Guidance Orchestrator                       │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
//! │  │   Progress   │→ │  Selector +  │→ │ Remote Synth │       │
//! │  │   Updates    │  │  Formatter   │  │  (HTTP/SSML) │       │
//! │  └──────────────┘  └──────────────┘  └──────┬───────┘       │
//! │                           │ fallback text    │ audio         │
//! │                           ↓                  ↓               │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
//! │  │ Session Gate │← │ Local Voice  │← │   Playback   │       │
//! │  │ (duck/unduck)│  │  (fallback)  │  │   (rodio)    │       │
//! │  └──────────────┘  └──────────────┘  └──────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one utterance is active at any instant; dispatching a new
//! announcement supersedes and silences the previous one.

pub mod backend;
pub mod config;
pub mod distance;
pub mod error;
pub mod formatter;
pub mod orchestrator;
pub mod playback;
pub mod route;
pub mod selector;
pub mod session;
pub mod voice;

pub use backend::{
    build_ssml, reduced_speech_rate, HttpRemoteSynthesizer, LocalSpeech, LocalUtterance,
    PlaceholderLocalSpeech, RemoteSynthesizer,
};
pub use config::{GuidanceConfig, RemoteConfig};
pub use distance::{DistanceFormatter, MeasurementUnits};
pub use error::{GuidanceError, GuidanceResult, SynthesisError};
pub use formatter::{escape_for_markup, format_road_description, format_step};
pub use orchestrator::{GuidanceEvent, GuidanceHandle, GuidanceOrchestrator};
pub use playback::{PlaybackSink, RodioPlayback};
pub use route::{AlertLevel, ManeuverType, RouteProgress, RouteStep, StepId};
pub use selector::{Announcement, AnnouncementSelector, HIGH_ALERT_THRESHOLD, LONG_STEP_DISTANCE};
pub use session::{AudioSession, AudioSessionGate, AudioSessionState};
pub use voice::{VoiceSelection, DEFAULT_VOICE};
