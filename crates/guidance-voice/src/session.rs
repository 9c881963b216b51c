//! Audio session gate - duck/un-duck arbitration over the platform's shared
//! audio output.
//!
//! The gate guarantees idempotence (repeated duck/unduck requests are
//! no-ops) and refuses to deactivate while an utterance is still speaking,
//! which would otherwise cut a local utterance that started right after a
//! remote one finished. Activation errors are logged and surfaced but never
//! block playback.

use crate::error::GuidanceResult;
use std::sync::Arc;
use tracing::{debug, warn};

/// Platform capability: switch the shared audio output in and out of the
/// mixing/ducking mode announcements play in.
pub trait AudioSession: Send + Sync {
    fn activate_ducking(&self) -> GuidanceResult<()>;
    fn deactivate(&self) -> GuidanceResult<()>;
}

/// Audio session mode as tracked by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSessionState {
    Idle,
    Ducking,
}

/// Thin state guard over an [`AudioSession`]. Only the orchestrator mutates
/// it, on its serialized event loop.
pub struct AudioSessionGate {
    session: Arc<dyn AudioSession>,
    state: AudioSessionState,
}

impl AudioSessionGate {
    pub fn new(session: Arc<dyn AudioSession>) -> Self {
        Self {
            session,
            state: AudioSessionState::Idle,
        }
    }

    pub fn state(&self) -> AudioSessionState {
        self.state
    }

    /// Request ducking mode. Idempotent: a no-op when already ducking.
    /// The platform's activation error is surfaced but not retried.
    pub fn duck(&mut self) -> GuidanceResult<()> {
        if self.state == AudioSessionState::Ducking {
            return Ok(());
        }
        match self.session.activate_ducking() {
            Ok(()) => {
                debug!("Audio session ducking activated");
                self.state = AudioSessionState::Ducking;
                Ok(())
            }
            Err(e) => {
                warn!("Audio session activation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Release ducking mode, but only when no utterance is active at call
    /// time. Idempotent: a no-op when already idle.
    pub fn unduck(&mut self, utterance_active: bool) -> GuidanceResult<()> {
        if self.state == AudioSessionState::Idle {
            return Ok(());
        }
        if utterance_active {
            debug!("Un-duck deferred: an utterance is still speaking");
            return Ok(());
        }
        match self.session.deactivate() {
            Ok(()) => {
                debug!("Audio session ducking released");
                self.state = AudioSessionState::Idle;
                Ok(())
            }
            Err(e) => {
                warn!("Audio session deactivation failed: {}", e);
                Err(e)
            }
        }
    }
}
