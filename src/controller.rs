// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mode state machine and key-to-action mapping. Pure logic: no terminal
//! I/O here (see `src/app.rs` for the raw-mode read loop that feeds this).

use crate::escape::ResolvedKey;
use crate::layout::PanelPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    Help,
    HostSelect,
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayNameMode {
    Ip,
    Rdns,
    Alias,
}

impl DisplayNameMode {
    pub fn cycle(self) -> Self {
        match self {
            DisplayNameMode::Ip => DisplayNameMode::Rdns,
            DisplayNameMode::Rdns => DisplayNameMode::Alias,
            DisplayNameMode::Alias => DisplayNameMode::Ip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainView {
    Timeline,
    Sparkline,
    Square,
}

impl MainView {
    pub fn cycle(self) -> Self {
        match self {
            MainView::Timeline => MainView::Sparkline,
            MainView::Sparkline => MainView::Square,
            MainView::Square => MainView::Timeline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    Rates,
    Rtt,
    Ttl,
    Streak,
}

impl SummaryMode {
    pub fn cycle(self) -> Self {
        match self {
            SummaryMode::Rates => SummaryMode::Rtt,
            SummaryMode::Rtt => SummaryMode::Ttl,
            SummaryMode::Ttl => SummaryMode::Streak,
            SummaryMode::Streak => SummaryMode::Rates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Config,
    Failures,
    Streak,
    Latency,
    Host,
}

impl SortMode {
    pub fn cycle(self) -> Self {
        match self {
            SortMode::Config => SortMode::Failures,
            SortMode::Failures => SortMode::Streak,
            SortMode::Streak => SortMode::Latency,
            SortMode::Latency => SortMode::Host,
            SortMode::Host => SortMode::Config,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Config => "Config Order",
            SortMode::Failures => "Failure Count",
            SortMode::Streak => "Failure Streak",
            SortMode::Latency => "Latest Latency",
            SortMode::Host => "Host Name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Failures,
    Latency,
    All,
}

impl FilterMode {
    pub fn cycle(self) -> Self {
        match self {
            FilterMode::Failures => FilterMode::Latency,
            FilterMode::Latency => FilterMode::All,
            FilterMode::All => FilterMode::Failures,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::Failures => "Failures Only",
            FilterMode::Latency => "High Latency Only",
            FilterMode::All => "All Items",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseMode {
    Display,
    Ping,
}

/// Everything the controller mutates in response to input. Owned by the
/// orchestration layer (`app.rs`), which also holds the things the
/// controller doesn't touch directly (scheduler, ring state, etc.).
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub mode: Mode,
    pub display_name_mode: DisplayNameMode,
    pub main_view: MainView,
    pub summary_mode: SummaryMode,
    pub sort_mode: SortMode,
    pub filter_mode: FilterMode,
    pub show_help: bool,
    pub summary_fullscreen: bool,
    pub paused: bool,
    pub pause_mode: PauseMode,
    pub use_color: bool,
    pub color_supported: bool,
    pub flash_on_fail: bool,
    pub bell_on_fail: bool,
    pub show_asn: bool,
    pub panel_visible: bool,
    pub panel_position: PanelPosition,
    pub host_select_index: usize,
    pub host_scroll_offset: usize,
    pub graph_host_id: Option<usize>,
    pub status_message: Option<String>,
}

impl ControllerState {
    pub fn new(color_supported: bool, pause_mode: PauseMode) -> Self {
        Self {
            mode: Mode::Live,
            display_name_mode: DisplayNameMode::Alias,
            main_view: MainView::Timeline,
            summary_mode: SummaryMode::Rates,
            sort_mode: SortMode::Config,
            filter_mode: FilterMode::All,
            show_help: false,
            summary_fullscreen: false,
            paused: false,
            pause_mode,
            use_color: color_supported,
            color_supported,
            flash_on_fail: false,
            bell_on_fail: false,
            show_asn: true,
            panel_visible: true,
            panel_position: PanelPosition::Right,
            host_select_index: 0,
            host_scroll_offset: 0,
            graph_host_id: None,
            status_message: None,
        }
    }
}

/// Outcome of dispatching one key, telling the orchestration layer what
/// side effects (beyond mutating `ControllerState`) are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    InvalidateLayoutCache,
    SaveSnapshot,
    EnterHostSelectGraph,
    HistoryBack,
    HistoryForward,
    ScrollUp,
    ScrollDown,
}

/// Dispatch a resolved key (plain char or an arrow resolved via
/// [`crate::escape`]) against the current mode, mutating `state` in place
/// and returning any side effect the caller needs to perform.
pub fn dispatch_char(state: &mut ControllerState, c: char) -> Effect {
    if state.show_help {
        state.show_help = false;
        return Effect::None;
    }

    match state.mode {
        Mode::HostSelect => dispatch_host_select(state, c),
        Mode::Graph => dispatch_graph(state, c),
        Mode::Live | Mode::Help => dispatch_live(state, c),
    }
}

fn dispatch_live(state: &mut ControllerState, c: char) -> Effect {
    match c {
        'q' | 'Q' => Effect::Quit,
        'H' | 'h' => {
            state.show_help = true;
            Effect::None
        }
        'n' => {
            state.display_name_mode = state.display_name_mode.cycle();
            Effect::InvalidateLayoutCache
        }
        'v' => {
            state.main_view = state.main_view.cycle();
            Effect::None
        }
        'o' => {
            state.sort_mode = state.sort_mode.cycle();
            Effect::InvalidateLayoutCache
        }
        'f' => {
            state.filter_mode = state.filter_mode.cycle();
            Effect::InvalidateLayoutCache
        }
        'a' => {
            state.show_asn = !state.show_asn;
            Effect::InvalidateLayoutCache
        }
        'm' => {
            state.summary_mode = state.summary_mode.cycle();
            state.status_message = Some(format!("Summary: {:?}", state.summary_mode));
            Effect::None
        }
        'c' => {
            if state.color_supported {
                state.use_color = !state.use_color;
            } else {
                state.status_message = Some("Color output unavailable (no TTY)".to_string());
            }
            Effect::None
        }
        'b' => {
            state.bell_on_fail = !state.bell_on_fail;
            Effect::None
        }
        'F' => {
            state.summary_fullscreen = !state.summary_fullscreen;
            Effect::None
        }
        'w' => {
            state.panel_visible = !state.panel_visible;
            Effect::InvalidateLayoutCache
        }
        'W' => {
            state.panel_position = state.panel_position.cycle();
            Effect::InvalidateLayoutCache
        }
        'p' => {
            state.paused = !state.paused;
            Effect::None
        }
        's' => Effect::SaveSnapshot,
        'g' | 'G' => {
            state.mode = Mode::HostSelect;
            Effect::None
        }
        _ => Effect::None,
    }
}

fn dispatch_host_select(state: &mut ControllerState, c: char) -> Effect {
    match c {
        'n' => {
            state.host_select_index = state.host_select_index.saturating_add(1);
            Effect::None
        }
        'p' => {
            state.host_select_index = state.host_select_index.saturating_sub(1);
            Effect::None
        }
        '\r' | '\n' => {
            state.mode = Mode::Graph;
            Effect::EnterHostSelectGraph
        }
        _ => Effect::None,
    }
}

fn dispatch_graph(state: &mut ControllerState, c: char) -> Effect {
    match c {
        'g' | 'G' => {
            state.mode = Mode::HostSelect;
            Effect::None
        }
        _ => Effect::None,
    }
}

/// Dispatch escape, resolved either to a bare Escape keypress or an arrow.
pub fn dispatch_escape(state: &mut ControllerState, key: ResolvedKey) -> Effect {
    match key {
        ResolvedKey::Bare => dispatch_esc_cancel(state),
        ResolvedKey::ArrowLeft if state.mode == Mode::Live => Effect::HistoryBack,
        ResolvedKey::ArrowRight if state.mode == Mode::Live => Effect::HistoryForward,
        ResolvedKey::ArrowUp if state.mode == Mode::Live => Effect::ScrollUp,
        ResolvedKey::ArrowDown if state.mode == Mode::Live => Effect::ScrollDown,
        _ => Effect::None,
    }
}

fn dispatch_esc_cancel(state: &mut ControllerState) -> Effect {
    match state.mode {
        Mode::HostSelect | Mode::Graph => {
            state.mode = Mode::Live;
            state.graph_host_id = None;
            Effect::None
        }
        Mode::Help => {
            state.show_help = false;
            state.mode = Mode::Live;
            Effect::None
        }
        Mode::Live => Effect::None,
    }
}

/// Clamp the host-list scroll offset so `visible_hosts` rows starting at the
/// offset stay within `[0, total_hosts]`.
pub fn compute_host_scroll_bounds(offset: usize, total_hosts: usize, visible_hosts: usize) -> usize {
    if total_hosts <= visible_hosts {
        0
    } else {
        offset.min(total_hosts - visible_hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_key_in_live_mode() {
        let mut s = ControllerState::new(true, PauseMode::Ping);
        assert_eq!(dispatch_char(&mut s, 'q'), Effect::Quit);
    }

    #[test]
    fn help_any_key_dismisses() {
        let mut s = ControllerState::new(true, PauseMode::Ping);
        dispatch_char(&mut s, 'h');
        assert!(s.show_help);
        dispatch_char(&mut s, 'x');
        assert!(!s.show_help);
    }

    #[test]
    fn host_select_np_navigation() {
        let mut s = ControllerState::new(true, PauseMode::Ping);
        s.mode = Mode::HostSelect;
        dispatch_char(&mut s, 'n');
        assert_eq!(s.host_select_index, 1);
        dispatch_char(&mut s, 'p');
        assert_eq!(s.host_select_index, 0);
    }

    #[test]
    fn host_select_enter_moves_to_graph() {
        let mut s = ControllerState::new(true, PauseMode::Ping);
        s.mode = Mode::HostSelect;
        let effect = dispatch_char(&mut s, '\r');
        assert_eq!(s.mode, Mode::Graph);
        assert_eq!(effect, Effect::EnterHostSelectGraph);
    }

    #[test]
    fn esc_exits_graph_to_live() {
        let mut s = ControllerState::new(true, PauseMode::Ping);
        s.mode = Mode::Graph;
        s.graph_host_id = Some(3);
        dispatch_escape(&mut s, ResolvedKey::Bare);
        assert_eq!(s.mode, Mode::Live);
        assert!(s.graph_host_id.is_none());
    }

    #[test]
    fn color_toggle_refuses_without_tty() {
        let mut s = ControllerState::new(false, PauseMode::Ping);
        dispatch_char(&mut s, 'c');
        assert!(!s.use_color);
        assert!(s.status_message.is_some());
    }

    #[test]
    fn history_arrows_only_in_live_mode() {
        let mut s = ControllerState::new(true, PauseMode::Ping);
        assert_eq!(dispatch_escape(&mut s, ResolvedKey::ArrowLeft), Effect::HistoryBack);
        s.mode = Mode::Graph;
        assert_eq!(dispatch_escape(&mut s, ResolvedKey::ArrowLeft), Effect::None);
    }

    #[test]
    fn scroll_bounds_clamp() {
        assert_eq!(compute_host_scroll_bounds(5, 10, 20), 0);
        assert_eq!(compute_host_scroll_bounds(100, 30, 10), 20);
    }
}
