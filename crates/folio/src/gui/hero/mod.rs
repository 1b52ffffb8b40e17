pub mod canvas;
pub mod view;

pub use canvas::Canvas;
pub use view::draw;

pub const HEADING_MIN_FONT: f64 = 80.0;
pub const HEADING_WIDTH_RATIO: f64 = 0.26; // of the viewport width
pub const CAPTION_FONT: f64 = 16.0;
pub const INDICATOR_RADIUS: f64 = 10.0;
pub const ARC_DASH: [f64; 2] = [50.0, 100.0];

pub fn heading_font_size(viewport_width: f64) -> f64 {
    (viewport_width * HEADING_WIDTH_RATIO).max(HEADING_MIN_FONT)
}

/// Distance of the bottom captions from the window edges.
pub fn caption_margin(is_mobile: bool) -> (f64, f64) {
    if is_mobile { (24.0, 32.0) } else { (40.0, 40.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_font_is_clamped_to_minimum() {
        assert_eq!(heading_font_size(200.0), HEADING_MIN_FONT);
        assert_eq!(heading_font_size(1000.0), 260.0);
    }
}
