use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::time::{Duration, Instant};

use super::clock::{FrameClock, PlaybackClock};
use super::sink::{BufferSource, GainGate};
use super::*;
use crate::library::{SourceLocator, Track};

fn stereo_ramp(frames: usize, rate: u32) -> DecodedBuffer {
    let samples = (0..frames)
        .flat_map(|i| {
            let v = i as f32 / frames as f32;
            [v, -v]
        })
        .collect();
    DecodedBuffer::new(samples, 2, rate)
}

/// Minimal 16-bit PCM mono WAV file.
fn wav_bytes(rate: u32, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&rate.to_le_bytes());
    out.extend_from_slice(&(rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

#[test]
fn buffer_duration_comes_from_frames_and_rate() {
    let buf = stereo_ramp(22_050, 44_100);
    assert_eq!(buf.channels(), 2);
    assert_eq!(buf.frames(), 22_050);
    assert_eq!(buf.duration_secs(), 0.5);
    assert_eq!(buf.duration(), Duration::from_millis(500));
}

#[test]
fn buffer_drops_trailing_partial_frame() {
    let buf = DecodedBuffer::new(vec![0.1, 0.2, 0.3, 0.4, 0.5], 2, 10);
    assert_eq!(buf.frames(), 2);
    assert_eq!(buf.samples().len(), 4);
}

#[test]
fn sample_index_is_frame_aligned_and_clamped() {
    let buf = stereo_ramp(100, 100);
    assert_eq!(buf.sample_index_at(0.5), 100);
    assert_eq!(buf.sample_index_at(-3.0), 0);
    assert_eq!(buf.sample_index_at(f64::INFINITY), 0);
    assert_eq!(buf.sample_index_at(7.0), 200);
}

#[test]
fn peaks_cover_the_whole_buffer() {
    let buf = DecodedBuffer::new(vec![0.1, -0.9, 0.2, 0.3, -0.4, 0.0], 1, 6);
    assert_eq!(buf.peaks(3), vec![0.9, 0.3, 0.4]);
    assert!(buf.peaks(0).is_empty());
    assert!(DecodedBuffer::new(Vec::new(), 1, 6).peaks(4).is_empty());
}

#[test]
fn buffer_source_starts_at_offset_and_reports_end_once() {
    let buf = DecodedBuffer::new(vec![0.0, 0.25, 0.5, 0.75], 1, 4);
    let (tx, rx) = mpsc::channel();
    let src = BufferSource::new(&buf, 0.5, false, GainGate::new(1.0), Some((SourceId(7), tx)));

    let out: Vec<f32> = src.collect();
    assert_eq!(out, vec![0.5, 0.75]);
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![EngineEvent::Ended(SourceId(7))]);
}

#[test]
fn looping_buffer_source_wraps_to_the_start() {
    let buf = DecodedBuffer::new(vec![1.0, 2.0, 3.0], 1, 1);
    let (tx, rx) = mpsc::channel();
    let src = BufferSource::new(&buf, 2.0, true, GainGate::new(1.0), Some((SourceId(1), tx)));

    let out: Vec<f32> = src.take(7).collect();
    assert_eq!(out, vec![3.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    assert!(rx.try_recv().is_err());
}

#[test]
fn gain_gate_scales_live_sources() {
    let buf = DecodedBuffer::new(vec![1.0; 4], 1, 4);
    let gate = GainGate::new(0.5);
    let mut src = BufferSource::new(&buf, 0.0, false, gate.clone(), None);

    assert_eq!(src.next(), Some(0.5));
    gate.set(0.25);
    assert_eq!(src.next(), Some(0.25));
    gate.set(4.0);
    assert_eq!(gate.get(), 1.0);
    gate.set(-1.0);
    assert_eq!(src.next(), Some(0.0));
}

#[test]
fn clock_advances_only_as_frames_are_pulled() {
    let clock = FrameClock::new(1_000);
    assert_eq!(clock.now(), 0.0);

    let ticker = clock.ticker();
    assert!(ticker.take(250).all(|s| s == 0.0));
    assert_eq!(clock.now(), 0.25);
}

#[test]
fn decodes_pcm_wav_payload() {
    let pcm: Vec<i16> = (0..800).map(|i| ((i % 40) * 800) as i16).collect();
    let buf = decode_bytes(wav_bytes(8_000, &pcm)).unwrap();

    assert_eq!(buf.channels(), 1);
    assert_eq!(buf.sample_rate(), 8_000);
    assert!((buf.duration_secs() - 0.1).abs() < 1e-6);
}

#[test]
fn rejects_empty_and_garbage_payloads() {
    assert!(decode_bytes(Vec::new()).is_err());
    assert!(decode_bytes(b"definitely not audio".to_vec()).is_err());
}

#[test]
fn source_fetcher_reports_missing_files_as_fetch_errors() {
    let fetcher = SourceFetcher::new(&crate::config::AudioSettings::default()).unwrap();
    let track = test_track(SourceLocator::Path("/nonexistent/kick.wav".into()));

    match fetcher.load(&track) {
        Err(LoadError::Fetch { locator, .. }) => assert_eq!(locator, "/nonexistent/kick.wav"),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[test]
fn source_fetcher_reads_and_decodes_local_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blip.wav");
    std::fs::write(&path, wav_bytes(4_000, &[0, 1000, 2000, 3000].repeat(100))).unwrap();

    let fetcher = SourceFetcher::new(&crate::config::AudioSettings::default()).unwrap();
    let buf = fetcher.load(&test_track(SourceLocator::Path(path))).unwrap();
    assert_eq!(buf.frames(), 400);
}

struct EchoFetcher;

impl Fetcher for EchoFetcher {
    fn load(&self, track: &Track) -> Result<DecodedBuffer, LoadError> {
        Ok(DecodedBuffer::new(vec![0.0; track.id as usize], 1, 1))
    }
}

#[test]
fn loader_delivers_outcomes_tagged_with_their_ticket() {
    let loader = Loader::new(EchoFetcher);
    let mut track = test_track(SourceLocator::Url("http://localhost/a".into()));
    track.id = 3;
    loader.request(LoadTicket(1), track);

    let deadline = Instant::now() + Duration::from_secs(5);
    let outcome = loop {
        if let Some(o) = loader.try_recv() {
            break o;
        }
        assert!(Instant::now() < deadline, "loader never answered");
        std::thread::sleep(Duration::from_millis(5));
    };

    assert_eq!(outcome.ticket, LoadTicket(1));
    assert_eq!(outcome.track_id, 3);
    assert_eq!(outcome.result.unwrap().frames(), 3);
}

/// Blocks every fetch until the gate opens, recording which tracks were
/// fetched and how many fetches ran at once.
#[derive(Clone, Default)]
struct GatedFetcher {
    open: Arc<(Mutex<bool>, Condvar)>,
    fetched: Arc<Mutex<Vec<u64>>>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl GatedFetcher {
    fn release(&self) {
        let (lock, cv) = &*self.open;
        *lock.lock().unwrap() = true;
        cv.notify_all();
    }

    fn started(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

impl Fetcher for GatedFetcher {
    fn load(&self, track: &Track) -> Result<DecodedBuffer, LoadError> {
        self.fetched.lock().unwrap().push(track.id);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let (lock, cv) = &*self.open;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cv.wait(open).unwrap();
        }
        drop(open);

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(DecodedBuffer::new(vec![0.0; 4], 1, 4))
    }
}

fn wait_for(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn busy_loader_keeps_only_the_newest_waiting_request() {
    let fetcher = GatedFetcher::default();
    let loader = Loader::with_limit(fetcher.clone(), 2);
    let track = |id| {
        let mut t = test_track(SourceLocator::Url(format!("http://localhost/{id}")));
        t.id = id;
        t
    };

    loader.request(LoadTicket(1), track(1));
    wait_for("first fetch", || fetcher.started() == 1);
    loader.request(LoadTicket(2), track(2));
    wait_for("second fetch", || fetcher.started() == 2);

    // Both workers are stuck; these wait, and only the last one survives.
    for id in 3..=5 {
        loader.request(LoadTicket(id), track(id));
    }
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(fetcher.started(), 2);

    fetcher.release();
    let mut tickets = Vec::new();
    wait_for("newest outcome", || {
        while let Some(o) = loader.try_recv() {
            tickets.push(o.ticket.0);
        }
        tickets.contains(&5)
    });

    let mut fetched = fetcher.fetched.lock().unwrap().clone();
    fetched.sort_unstable();
    assert_eq!(fetched, vec![1, 2, 5]);
    assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
}

fn test_track(source: SourceLocator) -> Track {
    Track {
        id: 1,
        title: "blip".into(),
        author: None,
        source,
        declared_length: None,
        loop_default: false,
        key: None,
        bpm: None,
        waveform: None,
        display: "blip".into(),
    }
}
