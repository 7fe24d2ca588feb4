#![forbid(unsafe_code)]

//! Viewport windowing over flattened rows.
//!
//! The renderer owns scrolling and painting; this only answers which row
//! indexes a fixed-row-height viewport has to paint, plus an overscan margin
//! so fast scrolling does not expose blank rows.

use std::ops::Range;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Row geometry for a windowed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Height of every row in pixels.
    pub row_height_px: u32,
    /// Extra rows rendered above and below the viewport.
    pub overscan_rows: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            row_height_px: 56,
            overscan_rows: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Which rows to paint for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWindow {
    /// Rows intersecting the viewport.
    pub visible: Range<usize>,
    /// `visible` widened by overscan, clamped to the row count.
    pub render: Range<usize>,
    /// Scrollable content height.
    pub total_height_px: u64,
}

impl RowWindow {
    /// Compute the window for `total_rows` rows.
    ///
    /// `scroll_offset_px` past the end is clamped to the last full page.
    #[must_use]
    pub fn compute(
        total_rows: usize,
        scroll_offset_px: u64,
        viewport_px: u32,
        config: WindowConfig,
    ) -> Self {
        let row_height = u64::from(config.row_height_px.max(1));
        let total_height_px = total_rows as u64 * row_height;
        if total_rows == 0 || viewport_px == 0 {
            return Self {
                visible: 0..0,
                render: 0..0,
                total_height_px,
            };
        }

        let max_offset = total_height_px.saturating_sub(u64::from(viewport_px));
        let offset = scroll_offset_px.min(max_offset);

        let first = (offset / row_height) as usize;
        let last = (offset + u64::from(viewport_px)).div_ceil(row_height) as usize;
        let visible = first..last.min(total_rows);

        let render = visible.start.saturating_sub(config.overscan_rows)
            ..visible.end.saturating_add(config.overscan_rows).min(total_rows);

        Self {
            visible,
            render,
            total_height_px,
        }
    }

    /// Pixel offset of row `index` from the top of the content.
    #[must_use]
    pub fn row_offset_px(index: usize, config: WindowConfig) -> u64 {
        index as u64 * u64::from(config.row_height_px.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: WindowConfig = WindowConfig {
        row_height_px: 50,
        overscan_rows: 2,
    };

    #[test]
    fn top_of_list() {
        let window = RowWindow::compute(100, 0, 400, CONFIG);
        assert_eq!(window.visible, 0..8);
        assert_eq!(window.render, 0..10);
        assert_eq!(window.total_height_px, 5000);
    }

    #[test]
    fn partial_rows_are_included() {
        let window = RowWindow::compute(100, 25, 400, CONFIG);
        assert_eq!(window.visible, 0..9);
        assert_eq!(window.render, 0..11);
    }

    #[test]
    fn offset_is_clamped_to_last_page() {
        let window = RowWindow::compute(100, 1_000_000, 400, CONFIG);
        assert_eq!(window.visible, 92..100);
        assert_eq!(window.render, 90..100);
    }

    #[test]
    fn short_list_fits() {
        let window = RowWindow::compute(3, 0, 400, CONFIG);
        assert_eq!(window.visible, 0..3);
        assert_eq!(window.render, 0..3);
    }

    #[test]
    fn empty_list_or_viewport() {
        assert_eq!(RowWindow::compute(0, 0, 400, CONFIG).render, 0..0);
        assert_eq!(RowWindow::compute(10, 0, 0, CONFIG).visible, 0..0);
    }

    #[test]
    fn default_geometry() {
        let config = WindowConfig::default();
        assert_eq!(RowWindow::row_offset_px(3, config), 168);
        let window = RowWindow::compute(1000, 0, 400, config);
        assert_eq!(window.visible, 0..8);
        assert_eq!(window.render, 0..18);
    }
}
