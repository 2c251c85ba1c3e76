// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure layout math: panel placement sizing and main-view (timeline) layout.
//! No I/O, no ratatui `Frame` dependency beyond the `Rect`/`Constraint`
//! types it hands back to the renderer.

use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPosition {
    Left,
    Right,
    Top,
    Bottom,
    None,
}

impl PanelPosition {
    pub fn cycle(self) -> Self {
        match self {
            PanelPosition::Left => PanelPosition::Right,
            PanelPosition::Right => PanelPosition::Top,
            PanelPosition::Top => PanelPosition::Bottom,
            PanelPosition::Bottom => PanelPosition::Left,
            PanelPosition::None => PanelPosition::None,
        }
    }
}

pub const MIN_PANEL_W: u16 = 30;
pub const MIN_PANEL_H: u16 = 5;
pub const MIN_MAIN_W: u16 = 20;
pub const MIN_MAIN_H: u16 = 5;
pub const GAP: u16 = 1;

#[derive(Debug, Clone, Copy)]
pub struct PanelSizes {
    pub main: Rect,
    pub panel: Option<Rect>,
    pub resolved_position: PanelPosition,
}

/// Split the terminal area between the main view and the summary panel.
/// Falls back to `None` (full area to main) if the terminal is too small
/// for the requested position.
pub fn compute_panel_sizes(area: Rect, requested: PanelPosition) -> PanelSizes {
    if requested == PanelPosition::None || area.width < MIN_MAIN_W || area.height < MIN_MAIN_H {
        return PanelSizes {
            main: area,
            panel: None,
            resolved_position: PanelPosition::None,
        };
    }

    match requested {
        PanelPosition::Left | PanelPosition::Right => {
            let panel_w = MIN_PANEL_W.max(area.width / 4);
            if area.width < panel_w + GAP + MIN_MAIN_W {
                return PanelSizes {
                    main: area,
                    panel: None,
                    resolved_position: PanelPosition::None,
                };
            }
            let main_w = area.width - panel_w - GAP;
            let (main_x, panel_x) = if requested == PanelPosition::Left {
                (area.x + panel_w + GAP, area.x)
            } else {
                (area.x, area.x + main_w + GAP)
            };
            PanelSizes {
                main: Rect::new(main_x, area.y, main_w, area.height),
                panel: Some(Rect::new(panel_x, area.y, panel_w, area.height)),
                resolved_position: requested,
            }
        }
        PanelPosition::Top | PanelPosition::Bottom => {
            let panel_h = MIN_PANEL_H.max(area.height / 4);
            if area.height < panel_h + GAP + MIN_MAIN_H {
                return PanelSizes {
                    main: area,
                    panel: None,
                    resolved_position: PanelPosition::None,
                };
            }
            let main_h = area.height - panel_h - GAP;
            let (main_y, panel_y) = if requested == PanelPosition::Top {
                (area.y + panel_h + GAP, area.y)
            } else {
                (area.y, area.y + main_h + GAP)
            };
            PanelSizes {
                main: Rect::new(area.x, main_y, area.width, main_h),
                panel: Some(Rect::new(area.x, panel_y, area.width, panel_h)),
                resolved_position: requested,
            }
        }
        PanelPosition::None => unreachable!(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainLayout {
    pub width: u16,
    pub label_width: u16,
    pub timeline_width: u16,
    pub visible_hosts: u16,
}

/// Given the main view's area and the set of host label lengths, compute
/// label column width, timeline (glyph) width, and how many host rows fit.
pub fn compute_main_layout(host_label_lens: &[usize], main: Rect, header_lines: u16) -> MainLayout {
    let max_label_len = host_label_lens.iter().copied().max().unwrap_or(4) as u16;
    let label_width = max_label_len.min(10.max(main.width / 3));
    let timeline_width = 1.max(main.width.saturating_sub(label_width + 3));
    let visible_hosts = 1.max(main.height.saturating_sub(header_lines));

    MainLayout {
        width: main.width,
        label_width,
        timeline_width,
        visible_hosts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_area_when_none() {
        let area = Rect::new(0, 0, 80, 24);
        let sizes = compute_panel_sizes(area, PanelPosition::None);
        assert_eq!(sizes.main, area);
        assert!(sizes.panel.is_none());
    }

    #[test]
    fn left_panel_splits_width() {
        let area = Rect::new(0, 0, 80, 24);
        let sizes = compute_panel_sizes(area, PanelPosition::Left);
        assert_eq!(sizes.resolved_position, PanelPosition::Left);
        let panel = sizes.panel.unwrap();
        assert_eq!(panel.width, 30);
        assert_eq!(sizes.main.width, 80 - 30 - 1);
        assert_eq!(sizes.main.x, 31);
    }

    #[test]
    fn falls_back_to_none_when_too_small() {
        let area = Rect::new(0, 0, 30, 24);
        let sizes = compute_panel_sizes(area, PanelPosition::Left);
        assert_eq!(sizes.resolved_position, PanelPosition::None);
        assert!(sizes.panel.is_none());
    }

    #[test]
    fn falls_back_to_none_on_orthogonal_dimension() {
        // Narrow terminal requesting a Top/Bottom panel: width, not height,
        // is what's too small, but it must still fall back.
        let narrow = Rect::new(0, 0, 10, 24);
        let sizes = compute_panel_sizes(narrow, PanelPosition::Bottom);
        assert_eq!(sizes.resolved_position, PanelPosition::None);

        // Short terminal requesting a Left/Right panel: height is too small.
        let short = Rect::new(0, 0, 80, 3);
        let sizes = compute_panel_sizes(short, PanelPosition::Left);
        assert_eq!(sizes.resolved_position, PanelPosition::None);
    }

    #[test]
    fn top_bottom_split_height() {
        let area = Rect::new(0, 0, 80, 24);
        let sizes = compute_panel_sizes(area, PanelPosition::Bottom);
        let panel = sizes.panel.unwrap();
        assert_eq!(panel.height, 6); // max(5, 24/4)
        assert_eq!(sizes.main.height, 24 - 6 - 1);
    }

    #[test]
    fn s5_main_layout_formula() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = compute_main_layout(&[5], area, 2);
        assert_eq!(layout.label_width, 5);
        assert_eq!(layout.timeline_width, 80 - 5 - 3);
        assert_eq!(layout.visible_hosts, 22);
    }

    #[test]
    fn label_width_caps_at_third_of_main_width() {
        let area = Rect::new(0, 0, 30, 24);
        let layout = compute_main_layout(&[25], area, 2);
        assert_eq!(layout.label_width, 10); // max(10, 30/3=10) = 10
    }
}
