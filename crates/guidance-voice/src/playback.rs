//! Playback of remote-synthesized announcement audio.
//!
//! `PlaybackSink` is the shared audio-output player capability: load the
//! synthesized bytes, play, report activity, and block until done. The
//! production implementation wraps a `rodio::Sink`; tests substitute fakes.

use crate::error::{GuidanceError, GuidanceResult};
use rodio::{OutputStream, Sink, Source};
use std::io::Cursor;
use std::sync::Arc;
use tracing::info;

/// Shared audio-output player capability for remote announcement audio.
pub trait PlaybackSink: Send + Sync {
    /// Queue decoded audio for playback. Empty input is a no-op.
    fn play(&self, bytes: Vec<u8>) -> GuidanceResult<()>;

    /// Stop playback immediately and clear anything queued.
    fn stop(&self);

    /// Whether audio is currently playing or queued.
    fn is_active(&self) -> bool;

    /// Block until all queued audio has finished. Called from a blocking
    /// task by the orchestrator's completion watcher.
    fn wait_until_done(&self);

    /// Playback volume, 0.0–1.0. Affects only remote-backend playback.
    fn set_volume(&self, volume: f32);
}

/// Production sink on the default output device.
///
/// The rodio `OutputStream` is not `Send`, so it lives on a dedicated
/// thread for the life of the process; only the `Sink` (Send + Sync) is
/// shared out.
pub struct RodioPlayback {
    sink: Arc<Sink>,
}

impl RodioPlayback {
    pub fn new() -> GuidanceResult<Self> {
        let (tx, rx) = std::sync::mpsc::channel::<Result<Arc<Sink>, String>>();
        std::thread::Builder::new()
            .name("guidance-playback".to_string())
            .spawn(move || {
                let built = OutputStream::try_default()
                    .map_err(|e| e.to_string())
                    .and_then(|(stream, handle)| {
                        Sink::try_new(&handle)
                            .map(|sink| (stream, Arc::new(sink)))
                            .map_err(|e| e.to_string())
                    });
                match built {
                    Ok((_stream, sink)) => {
                        let _ = tx.send(Ok(Arc::clone(&sink)));
                        // Keep the output stream alive.
                        loop {
                            std::thread::park();
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                    }
                }
            })
            .map_err(GuidanceError::Io)?;

        let sink = rx
            .recv()
            .map_err(|_| GuidanceError::Playback("playback thread died".to_string()))?
            .map_err(GuidanceError::Playback)?;
        info!("RodioPlayback: sink ready for announcement audio");
        Ok(Self { sink })
    }
}

impl PlaybackSink for RodioPlayback {
    fn play(&self, bytes: Vec<u8>) -> GuidanceResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let source = rodio::Decoder::new(Cursor::new(bytes))
            .map_err(|e| GuidanceError::Playback(format!("Decode failed: {}", e)))?;
        self.sink.append(source.convert_samples::<f32>());
        Ok(())
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn is_active(&self) -> bool {
        !self.sink.empty()
    }

    fn wait_until_done(&self) {
        self.sink.sleep_until_end();
    }

    fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }
}
