//! Synthesis/playback orchestration - the engine's main coordination layer.
//!
//! One tokio task owns all mutable state (playback state machine, session
//! gate, de-duplication key). Commands from the host and completion events
//! from spawned workers arrive over channels and are handled one at a time,
//! so no locking is needed. Every dispatched announcement gets a generation
//! number; completion events carrying a stale generation are dropped, which
//! is what makes supersession safe: a late-arriving remote result can never
//! play over a newer instruction.

use crate::backend::{build_ssml, reduced_speech_rate, LocalSpeech, RemoteSynthesizer, LOCAL_RATE_DEFAULT};
use crate::config::GuidanceConfig;
use crate::distance::DistanceFormatter;
use crate::error::{GuidanceError, GuidanceResult, SynthesisError};
use crate::playback::PlaybackSink;
use crate::route::RouteProgress;
use crate::selector::{Announcement, AnnouncementSelector};
use crate::session::{AudioSession, AudioSessionGate};
use crate::voice::VoiceSelection;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Observability events emitted by the orchestrator.
#[derive(Debug, Clone)]
pub enum GuidanceEvent {
    /// A new announcement was decided and dispatched to synthesis.
    AnnouncementStarted {
        timestamp: DateTime<Utc>,
        text: String,
    },

    /// The remote backend failed; the local fallback will speak instead.
    RemoteSynthesisFailed {
        timestamp: DateTime<Utc>,
        error: SynthesisError,
    },

    /// The local voice started speaking (fallback or local-only mode).
    LocalSpeechStarted {
        timestamp: DateTime<Utc>,
        text: String,
        fallback: bool,
    },

    /// Remote playback started.
    PlaybackStarted { timestamp: DateTime<Utc> },

    /// The active utterance finished and the audio session was released.
    PlaybackFinished { timestamp: DateTime<Utc> },

    /// A still-active announcement was cancelled by a newer one.
    Superseded { timestamp: DateTime<Utc> },

    /// Speech was silenced by a stop or reroute.
    Stopped { timestamp: DateTime<Utc> },
}

/// Commands accepted by the orchestrator task.
enum Command {
    Progress {
        progress: RouteProgress,
        distance_to_maneuver: f64,
    },
    Stop,
    Reroute,
    SetVolume(f32),
}

/// Completion events posted back by spawned workers, tagged with the
/// generation they belong to.
enum Internal {
    RemoteReady { generation: u64, audio: Vec<u8> },
    RemoteFailed { generation: u64, error: SynthesisError },
    RemotePlaybackDone { generation: u64 },
    LocalDone { generation: u64 },
}

/// Playback session state. At most one of remote playback / local utterance
/// is ever active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackState {
    Idle,
    RemoteLoading,
    RemotePlaying,
    LocalSpeaking,
}

/// Host-facing handle to a running orchestrator.
#[derive(Clone)]
pub struct GuidanceHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl GuidanceHandle {
    /// Feed a route-progress update. Whether anything is spoken is decided
    /// by the announcement policy.
    pub fn announce(
        &self,
        progress: RouteProgress,
        distance_to_maneuver: f64,
    ) -> GuidanceResult<()> {
        self.send(Command::Progress {
            progress,
            distance_to_maneuver,
        })
    }

    /// Silence any current speech immediately.
    pub fn stop(&self) -> GuidanceResult<()> {
        self.send(Command::Stop)
    }

    /// A reroute happened: cancel in-flight speech. Whether the current step
    /// may be re-announced is controlled by `reannounce_after_reroute`.
    pub fn reroute(&self) -> GuidanceResult<()> {
        self.send(Command::Reroute)
    }

    /// Playback volume for remote audio, 0.0–1.0.
    pub fn set_volume(&self, volume: f32) -> GuidanceResult<()> {
        self.send(Command::SetVolume(volume))
    }

    fn send(&self, cmd: Command) -> GuidanceResult<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| GuidanceError::ChannelSend("orchestrator task gone".to_string()))
    }
}

/// The orchestrator actor. Construct with [`GuidanceOrchestrator::spawn`].
pub struct GuidanceOrchestrator {
    config: GuidanceConfig,
    selector: AnnouncementSelector,
    voice: VoiceSelection,
    gate: AudioSessionGate,

    remote: Option<Arc<dyn RemoteSynthesizer>>,
    local: Arc<dyn LocalSpeech>,
    sink: Arc<dyn PlaybackSink>,

    state: PlaybackState,
    generation: u64,
    /// Plain rendering of the current announcement, retained so a failed
    /// remote attempt can still be spoken locally.
    fallback_text: String,
    fallback_used: bool,

    cmd_rx: mpsc::UnboundedReceiver<Command>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    event_tx: mpsc::UnboundedSender<GuidanceEvent>,
}

impl GuidanceOrchestrator {
    /// Spawn the orchestrator task. Returns the host handle and the
    /// observability event stream.
    pub fn spawn(
        config: GuidanceConfig,
        remote: Option<Arc<dyn RemoteSynthesizer>>,
        local: Arc<dyn LocalSpeech>,
        sink: Arc<dyn PlaybackSink>,
        session: Arc<dyn AudioSession>,
    ) -> (GuidanceHandle, mpsc::UnboundedReceiver<GuidanceEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let selector =
            AnnouncementSelector::new(DistanceFormatter::new(config.units));
        let mut voice = VoiceSelection::new(config.locale.clone());
        if let Some(ref v) = config.voice_override {
            voice = voice.with_override(v.clone());
        }
        sink.set_volume(config.volume);

        if remote.is_none() {
            info!("No remote synthesis configured; running local-only");
        }

        let orchestrator = Self {
            config,
            selector,
            voice,
            gate: AudioSessionGate::new(session),
            remote,
            local,
            sink,
            state: PlaybackState::Idle,
            generation: 0,
            fallback_text: String::new(),
            fallback_used: false,
            cmd_rx,
            internal_tx,
            internal_rx,
            event_tx,
        };
        tokio::spawn(orchestrator.run());

        (GuidanceHandle { cmd_tx }, event_rx)
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                // Never yields None: we hold a sender for worker tasks.
                Some(event) = self.internal_rx.recv() => self.handle_internal(event),
            }
        }
        debug!("Guidance orchestrator task ended");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Progress {
                progress,
                distance_to_maneuver,
            } => {
                if let Some(announcement) = self.selector.select(&progress, distance_to_maneuver) {
                    self.dispatch(announcement);
                }
            }
            Command::Stop => {
                self.silence();
                self.emit(GuidanceEvent::Stopped {
                    timestamp: Utc::now(),
                });
            }
            Command::Reroute => {
                self.silence();
                if self.config.reannounce_after_reroute {
                    self.selector.clear_announced();
                }
                self.emit(GuidanceEvent::Stopped {
                    timestamp: Utc::now(),
                });
            }
            Command::SetVolume(volume) => self.sink.set_volume(volume),
        }
    }

    /// Start a new playback session for a decided announcement, superseding
    /// whatever is active.
    fn dispatch(&mut self, announcement: Announcement) {
        if self.state != PlaybackState::Idle {
            self.silence();
            self.emit(GuidanceEvent::Superseded {
                timestamp: Utc::now(),
            });
        } else {
            self.generation = self.generation.wrapping_add(1);
        }
        self.fallback_text = announcement.plain.clone();
        self.fallback_used = false;

        info!(text = %announcement.plain, "Dispatching announcement");
        self.emit(GuidanceEvent::AnnouncementStarted {
            timestamp: Utc::now(),
            text: announcement.plain.clone(),
        });

        match self.remote.clone() {
            Some(remote) => {
                self.state = PlaybackState::RemoteLoading;
                let generation = self.generation;
                let markup = build_ssml(
                    &announcement.markup,
                    &self.config.speech_volume,
                    &self.config.speech_rate,
                );
                let voice = self.voice.resolve();
                let timeout = self.config.remote_timeout;
                let internal_tx = self.internal_tx.clone();
                tokio::spawn(async move {
                    let result =
                        tokio::time::timeout(timeout, remote.synthesize(&markup, &voice)).await;
                    let event = match result {
                        Ok(Ok(audio)) => Internal::RemoteReady { generation, audio },
                        Ok(Err(error)) => Internal::RemoteFailed { generation, error },
                        Err(_) => Internal::RemoteFailed {
                            generation,
                            error: SynthesisError::RequestFailed(
                                "synthesis round trip timed out".to_string(),
                            ),
                        },
                    };
                    let _ = internal_tx.send(event);
                });
            }
            None => self.start_local(false),
        }
    }

    fn handle_internal(&mut self, event: Internal) {
        match event {
            Internal::RemoteReady { generation, audio } => {
                if generation != self.generation || self.state != PlaybackState::RemoteLoading {
                    debug!("Dropping stale remote synthesis result");
                    return;
                }
                // Activation failure is logged inside the gate and does not
                // block the playback attempt.
                let _ = self.gate.duck();
                if let Err(e) = self.sink.play(audio) {
                    warn!("Remote audio failed at playback readiness: {}", e);
                    self.emit(GuidanceEvent::RemoteSynthesisFailed {
                        timestamp: Utc::now(),
                        error: SynthesisError::RequestFailed(e.to_string()),
                    });
                    self.start_local(true);
                    return;
                }
                self.state = PlaybackState::RemotePlaying;
                self.emit(GuidanceEvent::PlaybackStarted {
                    timestamp: Utc::now(),
                });

                let generation = self.generation;
                let sink = Arc::clone(&self.sink);
                let internal_tx = self.internal_tx.clone();
                tokio::task::spawn_blocking(move || {
                    sink.wait_until_done();
                    let _ = internal_tx.send(Internal::RemotePlaybackDone { generation });
                });
            }
            Internal::RemoteFailed { generation, error } => {
                if generation != self.generation || self.state != PlaybackState::RemoteLoading {
                    debug!("Dropping stale remote synthesis failure");
                    return;
                }
                warn!("Remote synthesis failed, falling back to local voice: {}", error);
                self.emit(GuidanceEvent::RemoteSynthesisFailed {
                    timestamp: Utc::now(),
                    error,
                });
                self.start_local(true);
            }
            Internal::RemotePlaybackDone { generation } => {
                if generation != self.generation || self.state != PlaybackState::RemotePlaying {
                    return;
                }
                self.finish_utterance();
            }
            Internal::LocalDone { generation } => {
                if generation != self.generation || self.state != PlaybackState::LocalSpeaking {
                    return;
                }
                self.finish_utterance();
            }
        }
    }

    /// Speak the retained plain text on the device voice. Fallback happens
    /// at most once per announcement.
    fn start_local(&mut self, fallback: bool) {
        if fallback {
            if self.fallback_used {
                warn!("Local fallback already used for this announcement");
                self.finish_utterance();
                return;
            }
            self.fallback_used = true;
        }

        let rate = if self.config.legacy_rate {
            reduced_speech_rate()
        } else {
            LOCAL_RATE_DEFAULT
        };
        let text = self.fallback_text.clone();
        match self.local.speak(&text, rate) {
            Ok(utterance) => {
                self.state = PlaybackState::LocalSpeaking;
                self.emit(GuidanceEvent::LocalSpeechStarted {
                    timestamp: Utc::now(),
                    text,
                    fallback,
                });
                let generation = self.generation;
                let internal_tx = self.internal_tx.clone();
                tokio::spawn(async move {
                    // A dropped sender means the utterance was cancelled;
                    // the generation check discards it either way.
                    let _ = utterance.done.await;
                    let _ = internal_tx.send(Internal::LocalDone { generation });
                });
            }
            Err(e) => {
                warn!("Local speech failed to start: {}", e);
                self.finish_utterance();
            }
        }
    }

    /// The announcement's utterance completed or could not start: release
    /// the session, go idle, and close the announcement on the event stream.
    fn finish_utterance(&mut self) {
        self.state = PlaybackState::Idle;
        let _ = self.gate.unduck(self.utterance_active());
        self.emit(GuidanceEvent::PlaybackFinished {
            timestamp: Utc::now(),
        });
    }

    /// Cancel the active session: stop audio, invalidate outstanding
    /// workers, release the session. AnnouncedStep is not touched here.
    fn silence(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        match self.state {
            PlaybackState::RemoteLoading | PlaybackState::RemotePlaying => self.sink.stop(),
            PlaybackState::LocalSpeaking => self.local.stop(),
            PlaybackState::Idle => {}
        }
        self.state = PlaybackState::Idle;
        let _ = self.gate.unduck(self.utterance_active());
    }

    fn utterance_active(&self) -> bool {
        match self.state {
            PlaybackState::RemotePlaying => self.sink.is_active(),
            PlaybackState::LocalSpeaking => true,
            _ => false,
        }
    }

    fn emit(&self, event: GuidanceEvent) {
        let _ = self.event_tx.send(event);
    }
}
