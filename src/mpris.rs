//! MPRIS (D-Bus) integration so media keys and `playerctl` can drive the
//! deck.
//!
//! The service runs on its own thread. It only reads a mirrored copy of
//! the transport state and forwards requests as `ControlCmd`s; the event
//! loop applies them to the controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use tracing::{info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::library::{Track, TrackId};
use crate::transport::{Snapshot, TransportState};

const BUS_NAME: &str = "org.mpris.MediaPlayer2.sampledeck";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    SetLoop(bool),
    SetVolume(f32),
}

#[derive(Debug, Default)]
struct SharedState {
    state: TransportState,
    looping: bool,
    volume: f32,
    track_id: Option<TrackId>,
    title: Option<String>,
    author: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    /// Mirror the controller snapshot and its track.
    pub fn update(&self, snapshot: &Snapshot, track: Option<&Track>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        s.state = snapshot.state;
        s.looping = snapshot.is_looping;
        s.volume = snapshot.volume;
        s.track_id = track.map(|t| t.id);
        s.title = track.map(|t| t.title.clone());
        s.author = track.and_then(|t| t.author.clone());
        s.url = track.map(|t| t.source.to_string());
        // The decoded length once known, the catalog's hint before that.
        s.length_micros = if snapshot.duration > 0.0 {
            Some((snapshot.duration * 1_000_000.0) as i64)
        } else {
            track
                .and_then(|t| t.declared_length)
                .map(|d| d.as_micros().min(i64::MAX as u128) as i64)
        };
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "sampledeck"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string(), "http".to_string(), "https".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.state {
            TransportState::Empty => "Stopped",
            TransportState::Loading | TransportState::Paused => "Paused",
            TransportState::Playing => "Playing",
        }
    }

    /// Only whole-track looping exists, so `Playlist` maps to `Track`.
    #[zbus(property)]
    fn loop_status(&self) -> &str {
        match self.state.lock() {
            Ok(s) if s.looping => "Track",
            _ => "None",
        }
    }

    #[zbus(property)]
    fn set_loop_status(&mut self, value: String) {
        let _ = self.tx.send(ControlCmd::SetLoop(value != "None"));
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume as f64).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        let _ = self.tx.send(ControlCmd::SetVolume(value as f32));
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(id) = s.track_id {
            let path = format!("{OBJECT_PATH}/track/{id}");
            if let Ok(p) = ObjectPath::try_from(path.as_str()) {
                put("mpris:trackid", Value::from(p));
            }
        }
        put("xesam:title", Value::from(s.title.clone().unwrap_or_default()));
        if let Some(author) = &s.author {
            put("xesam:artist", Value::from(vec![author.clone()]));
        }
        if let Some(url) = &s.url {
            put("xesam:url", Value::from(url.clone()));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", Value::from(len));
        }
        map
    }
}

/// Start the MPRIS service on a background thread. Failing to reach the
/// session bus only disables media-key support.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                .await
            {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }
            info!(name = BUS_NAME, "MPRIS service registered");

            // Keep the connection alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
