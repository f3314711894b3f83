use super::*;
use crate::library::SourceLocator;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    Track {
        id: 7,
        title: "Amen Break".to_string(),
        author: Some("The Winstons".to_string()),
        source: SourceLocator::Url("http://localhost:8055/assets/abc".to_string()),
        declared_length: Some(Duration::from_millis(1_500)),
        loop_default: true,
        key: None,
        bpm: Some("136".to_string()),
        waveform: None,
        display: "The Winstons - Amen Break".to_string(),
    }
}

fn iface() -> (PlayerIface, Arc<Mutex<SharedState>>, mpsc::Receiver<ControlCmd>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel();
    (
        PlayerIface {
            tx,
            state: state.clone(),
        },
        state,
        rx,
    )
}

#[test]
fn update_mirrors_snapshot_and_track() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };
    let track = make_track();

    let loading = Snapshot {
        state: TransportState::Loading,
        track_id: Some(7),
        is_loading: true,
        volume: 0.8,
        ..Snapshot::default()
    };
    handle.update(&loading, Some(&track));
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Amen Break"));
        assert_eq!(s.author.as_deref(), Some("The Winstons"));
        assert_eq!(s.url.as_deref(), Some("http://localhost:8055/assets/abc"));
        // Catalog hint until the buffer is decoded.
        assert_eq!(s.length_micros, Some(1_500_000));
        assert_eq!(s.volume, 0.8);
    }

    let loaded = Snapshot {
        state: TransportState::Paused,
        duration: 2.0,
        is_looping: true,
        ..loading
    };
    handle.update(&loaded, Some(&track));
    {
        let s = state.lock().unwrap();
        assert_eq!(s.length_micros, Some(2_000_000));
        assert!(s.looping);
    }

    handle.update(&Snapshot::default(), None);
    let s = state.lock().unwrap();
    assert_eq!(s.title, None);
    assert_eq!(s.track_id, None);
    assert_eq!(s.length_micros, None);
}

#[test]
fn playback_status_maps_transport_state() {
    let (iface, state, _rx) = iface();
    for (ts, expected) in [
        (TransportState::Empty, "Stopped"),
        (TransportState::Loading, "Paused"),
        (TransportState::Paused, "Paused"),
        (TransportState::Playing, "Playing"),
    ] {
        state.lock().unwrap().state = ts;
        assert_eq!(iface.playback_status(), expected);
    }
}

#[test]
fn loop_and_volume_properties_round_trip_through_commands() {
    let (mut iface, state, rx) = iface();
    assert_eq!(iface.loop_status(), "None");
    state.lock().unwrap().looping = true;
    assert_eq!(iface.loop_status(), "Track");

    iface.set_loop_status("Playlist".to_string());
    iface.set_loop_status("None".to_string());
    iface.set_volume(0.25);
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            ControlCmd::SetLoop(true),
            ControlCmd::SetLoop(false),
            ControlCmd::SetVolume(0.25)
        ]
    );
}

#[test]
fn player_methods_forward_commands() {
    let (iface, _state, rx) = iface();
    iface.play();
    iface.pause();
    iface.play_pause();
    iface.stop();
    iface.next();
    iface.previous();
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            ControlCmd::Play,
            ControlCmd::Pause,
            ControlCmd::PlayPause,
            ControlCmd::Stop,
            ControlCmd::Next,
            ControlCmd::Prev
        ]
    );
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (iface, state, _rx) = iface();
    let handle = MprisHandle {
        state: state.clone(),
    };
    let loaded = Snapshot {
        state: TransportState::Playing,
        track_id: Some(7),
        duration: 1.5,
        ..Snapshot::default()
    };
    handle.update(&loaded, Some(&make_track()));

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }

    handle.update(&Snapshot::default(), None);
    let map = iface.metadata();
    assert!(!map.contains_key("mpris:trackid"));
    assert!(map.contains_key("xesam:title"));
}
