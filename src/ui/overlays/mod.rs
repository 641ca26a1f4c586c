//! Popups drawn over the dashboard.

pub mod action_menu;
pub mod confirm_quit;
pub mod log_viewer;
pub mod settings;
pub mod toast;
pub mod warning;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Create a centered rectangle with fixed dimensions, clipped to `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width.min(area.width))]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_centered() {
        let rect = centered_rect(20, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(rect, Rect::new(40, 20, 20, 10));
    }

    #[test]
    fn test_centered_rect_clips_to_area() {
        let rect = centered_rect(200, 80, Rect::new(0, 0, 100, 50));
        assert_eq!(rect, Rect::new(0, 0, 100, 50));
    }
}
