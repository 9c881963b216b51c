//! Guidance Demo - walks a scripted route and prints every announcement
//! decision and playback event.
//!
//! Runs local-only with the placeholder voice unless remote synthesis
//! credentials are set in `.env` (GUIDANCE_TTS_API_URL / GUIDANCE_TTS_API_KEY).

use guidance_voice::{
    AlertLevel, GuidanceConfig, GuidanceEvent, GuidanceOrchestrator, HttpRemoteSynthesizer,
    LocalSpeech, ManeuverType, PlaceholderLocalSpeech, PlaybackSink, RemoteSynthesizer,
    RouteProgress, RouteStep,
};
use guidance_voice::{AudioSession, GuidanceResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Demo session: just logs the mode switches.
struct LoggingSession;

impl AudioSession for LoggingSession {
    fn activate_ducking(&self) -> GuidanceResult<()> {
        info!("[audio session] ducking other audio");
        Ok(())
    }

    fn deactivate(&self) -> GuidanceResult<()> {
        info!("[audio session] restored");
        Ok(())
    }
}

/// Demo sink: discards audio immediately so remote bytes "play" instantly.
#[derive(Default)]
struct DiscardSink;

impl PlaybackSink for DiscardSink {
    fn play(&self, bytes: Vec<u8>) -> GuidanceResult<()> {
        info!("[playback] {} bytes of remote audio", bytes.len());
        Ok(())
    }

    fn stop(&self) {}

    fn is_active(&self) -> bool {
        false
    }

    fn wait_until_done(&self) {}

    fn set_volume(&self, _volume: f32) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = GuidanceConfig::from_env();

    let remote: Option<Arc<dyn RemoteSynthesizer>> = if config.remote.is_some() {
        match HttpRemoteSynthesizer::from_env(config.remote_timeout) {
            Ok(r) => {
                info!("Remote synthesis enabled");
                Some(Arc::new(r))
            }
            Err(e) => {
                info!("Remote synthesis unavailable ({}), running local-only", e);
                None
            }
        }
    } else {
        info!("No remote credentials set, running local-only");
        None
    };

    let local = Arc::new(PlaceholderLocalSpeech::new());
    let (handle, mut events) = GuidanceOrchestrator::spawn(
        config,
        remote,
        local.clone() as Arc<dyn LocalSpeech>,
        Arc::new(DiscardSink),
        Arc::new(LoggingSession),
    );

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                GuidanceEvent::AnnouncementStarted { text, .. } => {
                    info!("announce: {}", text)
                }
                GuidanceEvent::LocalSpeechStarted { text, fallback, .. } => {
                    info!("local voice (fallback={}): {}", fallback, text)
                }
                other => info!("event: {:?}", other),
            }
        }
    });

    // A short scripted leg: depart, approach, turn, arrive.
    let depart = RouteStep::new(1, "Head south on Fifth Avenue")
        .with_road(Some("Fifth Avenue"), None)
        .with_distance(900.0)
        .with_maneuver(ManeuverType::Depart);
    let turn = RouteStep::new(2, "Turn right onto Canal Street").with_distance(250.0);
    let arrive = RouteStep::new(3, "You have arrived at your destination");

    let updates = vec![
        (
            RouteProgress::new(
                depart.clone(),
                Some(turn.clone()),
                Some(arrive.clone()),
                AlertLevel::Depart,
            ),
            900.0,
        ),
        (
            RouteProgress::new(
                turn.clone(),
                Some(arrive.clone()),
                None,
                AlertLevel::Medium,
            ),
            250.0,
        ),
        (
            RouteProgress::new(arrive.clone(), None, None, AlertLevel::Arrive),
            10.0,
        ),
    ];

    for (progress, distance) in updates {
        handle.announce(progress, distance)?;
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    handle.stop()?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    info!("Spoken locally: {:#?}", local.spoken());
    Ok(())
}
