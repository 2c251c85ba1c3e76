// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure rendering logic: sort/filter, sparkline mapping, summary text, and
//! ratatui widget composition for the main view, summary panel, status box,
//! and overlays. The renderer never mutates application state; it takes a
//! snapshot of everything it needs and returns widgets/lines.

use crate::controller::{FilterMode, MainView, SortMode, SummaryMode};
use crate::ring::{RingState, SlotStatus, StatsCounters};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use std::collections::HashMap;

pub const SPARKLINE_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn status_color(status: SlotStatus) -> Color {
    match status {
        SlotStatus::Success => Color::White,
        SlotStatus::Slow => Color::Yellow,
        SlotStatus::Fail => Color::Red,
        SlotStatus::Pending => Color::DarkGray,
    }
}

pub fn status_glyph(status: SlotStatus) -> char {
    match status {
        SlotStatus::Success => '.',
        SlotStatus::Slow => '!',
        SlotStatus::Fail => 'x',
        SlotStatus::Pending => '-',
    }
}

/// One entry describing a host as the main view will render it: its stable
/// id, display label, and the data needed to sort/filter on.
#[derive(Debug, Clone)]
pub struct HostEntry {
    pub host_id: usize,
    pub label: String,
    pub fail_count: u64,
    pub fail_streak: usize,
    pub latest_rtt: Option<f64>,
}

/// Filter hosts per `mode`, then sort per `sort`. Mirrors
/// `original/main.py::build_display_entries`.
pub fn build_display_entries(
    mut entries: Vec<HostEntry>,
    sort: SortMode,
    filter: FilterMode,
    slow_threshold: f64,
) -> Vec<HostEntry> {
    entries.retain(|e| match filter {
        FilterMode::All => true,
        FilterMode::Failures => e.fail_count > 0,
        FilterMode::Latency => e.latest_rtt.map(|r| r >= slow_threshold).unwrap_or(false),
    });

    match sort {
        SortMode::Config => {}
        SortMode::Failures => entries.sort_by(|a, b| {
            b.fail_count
                .cmp(&a.fail_count)
                .then_with(|| b.label.cmp(&a.label))
        }),
        SortMode::Streak => entries.sort_by(|a, b| {
            b.fail_streak
                .cmp(&a.fail_streak)
                .then_with(|| b.label.cmp(&a.label))
        }),
        SortMode::Latency => entries.sort_by(|a, b| {
            let ra = a.latest_rtt.unwrap_or(-1.0);
            let rb = b.latest_rtt.unwrap_or(-1.0);
            rb.partial_cmp(&ra)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.label.cmp(&a.label))
        }),
        SortMode::Host => entries.sort_by(|a, b| a.label.cmp(&b.label)),
    }

    entries
}

/// Map non-`None` RTT values onto 8-level sparkline block indices scaled by
/// `(value - min) / span`. Fail slots render at baseline; if there are no
/// numeric values at all, every slot renders at baseline too.
pub fn build_sparkline(rtt_values: &[Option<f64>]) -> String {
    let numeric: Vec<f64> = rtt_values.iter().filter_map(|v| *v).collect();
    if numeric.is_empty() {
        return SPARKLINE_BLOCKS[0].to_string().repeat(rtt_values.len());
    }

    let min = numeric.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = numeric.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);

    rtt_values
        .iter()
        .map(|v| match v {
            Some(value) => {
                let scaled = ((value - min) / span * (SPARKLINE_BLOCKS.len() - 1) as f64).round();
                SPARKLINE_BLOCKS[scaled.clamp(0.0, (SPARKLINE_BLOCKS.len() - 1) as f64) as usize]
            }
            None => SPARKLINE_BLOCKS[0],
        })
        .collect()
}

/// `F<n>` for a fail streak, `S<n>` for a success streak, `-` if neither.
pub fn build_streak_label(ring: &RingState) -> String {
    let fail = ring.fail_streak();
    if fail > 0 {
        return format!("F{fail}");
    }
    let success = ring.success_streak();
    if success > 0 {
        return format!("S{success}");
    }
    "-".to_string()
}

/// Per-summary-mode suffix text for one host's summary row.
pub fn build_summary_suffix(mode: SummaryMode, ring: &RingState, stats: &StatsCounters) -> String {
    match mode {
        SummaryMode::Rates => format!(
            "ok {:.1}% / loss {:.1}%",
            stats.success_rate().unwrap_or(0.0),
            stats.loss_rate().unwrap_or(0.0),
        ),
        SummaryMode::Rtt => {
            let mean = stats.mean_rtt().unwrap_or(0.0) * 1000.0;
            let stddev = stats.stddev_rtt().unwrap_or(0.0) * 1000.0;
            let jitter = jitter_ms(ring);
            format!("avg {mean:.1}ms / jitter {jitter:.1}ms / stddev {stddev:.1}ms")
        }
        SummaryMode::Ttl => match ring.latest_ttl() {
            Some(ttl) => format!("ttl {ttl}"),
            None => "ttl -".to_string(),
        },
        SummaryMode::Streak => build_streak_label(ring),
    }
}

/// Mean of absolute differences between consecutive non-`None` rtt samples.
fn jitter_ms(ring: &RingState) -> f64 {
    let samples: Vec<f64> = ring.rtt().iter().filter_map(|v| *v).map(|v| v * 1000.0).collect();
    if samples.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = samples.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    diffs.iter().sum::<f64>() / diffs.len() as f64
}

/// All four summary fields pipe-joined, used when the panel is wide enough
/// to show everything at once.
pub fn build_summary_all_suffix(ring: &RingState, stats: &StatsCounters) -> String {
    [
        build_summary_suffix(SummaryMode::Rates, ring, stats),
        build_summary_suffix(SummaryMode::Rtt, ring, stats),
        build_summary_suffix(SummaryMode::Ttl, ring, stats),
        build_summary_suffix(SummaryMode::Streak, ring, stats),
    ]
    .join(" | ")
}

/// One status-bar line describing current sort/filter/pause/status-message.
pub fn build_status_line(
    sort: SortMode,
    filter: FilterMode,
    paused: bool,
    status_message: Option<&str>,
) -> String {
    let mut line = format!("Sort: {} | Filter: {}", sort.label(), filter.label());
    if paused {
        line.push_str(" | PAUSED");
    }
    if let Some(msg) = status_message {
        line.push_str(" | ");
        line.push_str(msg);
    }
    line
}

/// `label + " | " + glyphs`, left-justified label, right-justified to
/// `label_width`.
pub fn format_status_line(label: &str, glyphs: &str, label_width: usize) -> String {
    format!("{label:<label_width$} | {glyphs}")
}

/// Render one host's timeline row as a styled `Line`.
pub fn render_timeline_row(
    ring: &RingState,
    label: &str,
    label_width: usize,
    use_color: bool,
) -> Line<'static> {
    let mut spans = vec![Span::raw(format!("{label:<label_width$} | "))];
    for status in ring.timeline() {
        let glyph = status_glyph(*status).to_string();
        spans.push(if use_color {
            Span::styled(glyph, Style::default().fg(status_color(*status)))
        } else {
            Span::raw(glyph)
        });
    }
    Line::from(spans)
}

/// Render one host's sparkline row as a styled `Line`.
pub fn render_sparkline_row(
    ring: &RingState,
    label: &str,
    label_width: usize,
    use_color: bool,
) -> Line<'static> {
    let rtts: Vec<Option<f64>> = ring.rtt().iter().copied().collect();
    let glyphs = build_sparkline(&rtts);
    let mut spans = vec![Span::raw(format!("{label:<label_width$} | "))];
    for (ch, status) in glyphs.chars().zip(ring.timeline().iter()) {
        spans.push(if use_color {
            Span::styled(ch.to_string(), Style::default().fg(status_color(*status)))
        } else {
            Span::raw(ch.to_string())
        });
    }
    Line::from(spans)
}

/// Render one host's square-grid row: solid block for success/slow, space
/// for fail, dash for pending.
pub fn render_square_row(
    ring: &RingState,
    label: &str,
    label_width: usize,
    use_color: bool,
) -> Line<'static> {
    let mut spans = vec![Span::raw(format!("{label:<label_width$} | "))];
    for status in ring.timeline() {
        let glyph = match status {
            SlotStatus::Success | SlotStatus::Slow => '■',
            SlotStatus::Fail => ' ',
            SlotStatus::Pending => '-',
        };
        spans.push(if use_color {
            Span::styled(glyph.to_string(), Style::default().fg(status_color(*status)))
        } else {
            Span::raw(glyph.to_string())
        });
    }
    Line::from(spans)
}

pub fn render_main_row(
    view: MainView,
    ring: &RingState,
    label: &str,
    label_width: usize,
    use_color: bool,
) -> Line<'static> {
    match view {
        MainView::Timeline => render_timeline_row(ring, label, label_width, use_color),
        MainView::Sparkline => render_sparkline_row(ring, label, label_width, use_color),
        MainView::Square => render_square_row(ring, label, label_width, use_color),
    }
}

/// Header line: `MultiPing - {LIVE/PAUSED} results [{mode} | {view}] {timestamp}`.
pub fn render_header(paused: bool, sort_label: &str, view: MainView, timestamp: &str) -> String {
    let state = if paused { "PAUSED" } else { "LIVE" };
    let view_label = match view {
        MainView::Timeline => "timeline",
        MainView::Sparkline => "sparkline",
        MainView::Square => "square",
    };
    format!("MultiPing - {state} results [{sort_label} | {view_label}] {timestamp}")
}

/// Append a "not shown" footer when the host list was truncated to fit.
pub fn truncation_note(shown: usize, total: usize) -> Option<String> {
    (total > shown).then(|| format!("... ({} host(s) not shown)", total - shown))
}

/// Truncate/left-justify each line to `width`, padding missing lines with
/// blanks, so the renderer's output exactly fills `width x height`.
pub fn pad_lines(mut lines: Vec<String>, width: usize, height: usize) -> Vec<String> {
    lines.truncate(height);
    for line in &mut lines {
        if line.chars().count() > width {
            *line = line.chars().take(width).collect();
        } else {
            *line = format!("{line:<width$}");
        }
    }
    while lines.len() < height {
        lines.push(" ".repeat(width));
    }
    lines
}

/// 8 Hz bouncing activity indicator. Width is `expanded_width` if paused,
/// else `width`.
pub fn activity_indicator(elapsed: std::time::Duration, width: usize, expanded_width: usize, paused: bool) -> String {
    let w = if paused { expanded_width } else { width };
    if w < 3 {
        return "*".repeat(w);
    }
    let period = w.saturating_sub(1).max(1);
    let hz = 8.0;
    let phase = (elapsed.as_secs_f64() * hz) as usize % (period * 2).max(1);
    let pos = if phase <= period { phase } else { period * 2 - phase };
    let mut bar = vec![' '; w];
    bar[pos.min(w - 1)] = '*';
    bar.into_iter().collect()
}

/// All host ids and rings known to the render call, indexed the same way
/// `HashMap<usize, _>` is elsewhere.
pub type RingMap<'a> = &'a HashMap<usize, RingState>;
pub type StatsMap<'a> = &'a HashMap<usize, StatsCounters>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PingStatus;

    fn entry(id: usize, label: &str, fails: u64, streak: usize, rtt: Option<f64>) -> HostEntry {
        HostEntry {
            host_id: id,
            label: label.to_string(),
            fail_count: fails,
            fail_streak: streak,
            latest_rtt: rtt,
        }
    }

    #[test]
    fn sorts_by_failures_desc_then_label() {
        let entries = vec![entry(0, "a", 1, 0, None), entry(1, "b", 3, 0, None), entry(2, "c", 3, 0, None)];
        let sorted = build_display_entries(entries, SortMode::Failures, FilterMode::All, 1.0);
        assert_eq!(sorted[0].label, "c");
        assert_eq!(sorted[1].label, "b");
        assert_eq!(sorted[2].label, "a");
    }

    #[test]
    fn filters_failures_only() {
        let entries = vec![entry(0, "a", 0, 0, None), entry(1, "b", 2, 0, None)];
        let filtered = build_display_entries(entries, SortMode::Config, FilterMode::Failures, 1.0);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].label, "b");
    }

    #[test]
    fn filters_high_latency() {
        let entries = vec![entry(0, "a", 0, 0, Some(0.5)), entry(1, "b", 0, 0, Some(2.0))];
        let filtered = build_display_entries(entries, SortMode::Config, FilterMode::Latency, 1.0);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].label, "b");
    }

    #[test]
    fn sparkline_maps_to_block_range() {
        let values = vec![Some(0.0), Some(5.0), Some(10.0)];
        let s = build_sparkline(&values);
        assert_eq!(s.chars().next().unwrap(), SPARKLINE_BLOCKS[0]);
        assert_eq!(s.chars().last().unwrap(), SPARKLINE_BLOCKS[7]);
    }

    #[test]
    fn sparkline_all_none_is_baseline() {
        let values = vec![None, None, None];
        let s = build_sparkline(&values);
        assert_eq!(s, SPARKLINE_BLOCKS[0].to_string().repeat(3));
    }

    #[test]
    fn streak_label_formats() {
        let mut r = RingState::new(8);
        r.record_final(1, PingStatus::Fail, None, None, 0.0);
        r.record_final(2, PingStatus::Fail, None, None, 1.0);
        assert_eq!(build_streak_label(&r), "F2");
    }

    #[test]
    fn streak_label_dash_when_empty() {
        let r = RingState::new(8);
        assert_eq!(build_streak_label(&r), "-");
    }

    #[test]
    fn status_line_format() {
        let s = format_status_line("host1", "...x.", 10);
        assert_eq!(s, "host1      | ...x.");
    }

    #[test]
    fn pad_lines_fills_and_truncates() {
        let lines = vec!["abc".to_string(), "de".to_string()];
        let padded = pad_lines(lines, 5, 3);
        assert_eq!(padded.len(), 3);
        assert_eq!(padded[0], "abc  ");
        assert_eq!(padded[2], "     ");
    }

    #[test]
    fn truncation_note_present_only_when_hidden() {
        assert_eq!(truncation_note(5, 5), None);
        assert_eq!(truncation_note(5, 7), Some("... (2 host(s) not shown)".to_string()));
    }
}
