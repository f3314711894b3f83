//! UI rendering for the terminal interface.
//!
//! Everything here draws from `App` with `ratatui`; nothing mutates state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Sparkline, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "load selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next track");
    // H/L is filled in from config.
    map.insert("r", "loop");
    map.insert("+/-", "volume");
    map.insert("0", "rewind");
    map.insert("K", "metadata");
    map.insert("q", "quit");
    map
});

fn controls_text(seek_seconds: f64) -> String {
    let order = [
        "j/k", "enter", "space/p", "h/l", "H/L", "0", "r", "+/-", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{seek_seconds}s"))
            } else {
                CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `M:SS`, truncating partial seconds.
pub fn format_clock(secs: f64) -> String {
    let secs = if secs.is_finite() && secs > 0.0 {
        secs as u64
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Squash peak data into `width` bars scaled to `0..=100`.
fn waveform_bars(peaks: &[f32], width: usize) -> Vec<u64> {
    if peaks.is_empty() || width == 0 {
        return Vec::new();
    }
    let max = peaks.iter().fold(0.0f32, |m, p| m.max(p.abs()));
    if max <= 0.0 {
        return vec![0; width];
    }

    (0..width)
        .map(|col| {
            let lo = col * peaks.len() / width;
            let hi = ((col + 1) * peaks.len() / width).max(lo + 1).min(peaks.len());
            let peak = peaks[lo..hi].iter().fold(0.0f32, |m, p| m.max(p.abs()));
            ((peak / max) * 100.0).round() as u64
        })
        .collect()
}

fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the whole UI.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, controls: &ControlsSettings) {
    let transport_height = if ui_settings.show_waveform { 7 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(transport_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" sampledeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(app.status_line())
        .block(Block::bordered().padding(left_pad()).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    draw_track_list(frame, app, chunks[2]);
    draw_transport(frame, app, ui_settings, chunks[3]);

    if app.metadata_window {
        draw_metadata(frame, app, chunks[2]);
    }

    let footer = Paragraph::new(controls_text(controls.seek_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn draw_track_list(frame: &mut Frame, app: &App, area: Rect) {
    // Only build items for the visible window, keeping the cursor centred.
    let total = app.tracks.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = if total <= height || height == 0 {
        (0, total)
    } else {
        let half = height / 2;
        let start = app.selected.saturating_sub(half).min(total - height);
        (start, start + height)
    };

    let items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if app.now_playing == Some(start + i) {
                "♪ "
            } else {
                "  "
            };
            let looped = if t.loop_default { " ⟲" } else { "" };
            ListItem::new(format!("{marker}{}{looped}", t.display))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(app.selected - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_transport(frame: &mut Frame, app: &App, ui_settings: &UiSettings, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" transport ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let s = &app.snapshot;
    let label = if s.is_loading {
        "loading…".to_string()
    } else {
        format!("{} / {}", format_clock(app.position), format_clock(s.duration))
    };
    let gauge = Gauge::default()
        .ratio(app.progress())
        .label(label)
        .gauge_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(gauge, rows[0]);

    if ui_settings.show_waveform && rows[1].height > 0 {
        let bars = app
            .waveform()
            .map(|w| waveform_bars(w, rows[1].width as usize))
            .unwrap_or_default();
        frame.render_widget(Sparkline::default().data(bars).max(100), rows[1]);
    }
}

fn draw_metadata(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect_sized(64, 10, area);
    frame.render_widget(Clear, popup);

    let text = match app.selected_track() {
        Some(t) => {
            let declared = t
                .declared_length
                .map(|d| format_clock(d.as_secs_f64()))
                .unwrap_or_else(|| "-".to_string());
            format!(
                "Title: {}\nAuthor: {}\nBPM: {}\nKey: {}\nLength: {}\nLoops by default: {}\nSource: {}",
                t.title,
                t.author.as_deref().unwrap_or("-"),
                t.bpm.as_deref().unwrap_or("-"),
                t.key.as_deref().unwrap_or("-"),
                declared,
                if t.loop_default { "yes" } else { "no" },
                t.source,
            )
        }
        None => "No track selected".to_string(),
    };

    let par = Paragraph::new(text)
        .block(
            Block::default()
                .padding(left_pad())
                .borders(Borders::ALL)
                .title(" metadata (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(par, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_minutes_and_zero_padded_seconds() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.99), "0:09");
        assert_eq!(format_clock(75.0), "1:15");
        assert_eq!(format_clock(3600.0), "60:00");
        assert_eq!(format_clock(-3.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn waveform_bars_fill_the_requested_width() {
        let peaks = [0.0, 0.5, 1.0, 0.25];
        assert_eq!(waveform_bars(&peaks, 2), vec![50, 100]);
        assert_eq!(waveform_bars(&peaks, 8).len(), 8);
        assert!(waveform_bars(&[], 8).is_empty());
        assert_eq!(waveform_bars(&[0.0, 0.0], 3), vec![0, 0, 0]);
    }

    #[test]
    fn controls_text_includes_seek_step() {
        let text = controls_text(2.5);
        assert!(text.contains("[H/L] seek -/+2.5s"));
        assert!(text.starts_with("[j/k] up/down"));
        assert!(text.ends_with("[q] quit"));
    }
}
