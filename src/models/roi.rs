use serde::{Deserialize, Serialize};

/// Rectangular region of a screenshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Full-width region covering the bottom `keep_fraction` of an image.
    ///
    /// The top row is `floor(height * (1 - keep_fraction))`, so the region
    /// always reaches the bottom edge.
    pub fn bottom_panel(width: u32, height: u32, keep_fraction: f64) -> Self {
        let keep = keep_fraction.clamp(0.0, 1.0);
        let top = ((height as f64) * (1.0 - keep)) as u32;
        let top = top.min(height);

        Self {
            x: 0,
            y: top,
            width,
            height: height - top,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn y2(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_panel_forty_percent() {
        let roi = Roi::bottom_panel(1170, 2532, 0.40);

        // int(2532 * 0.6) = 1519
        assert_eq!(roi.x, 0);
        assert_eq!(roi.y, 1519);
        assert_eq!(roi.width, 1170);
        assert_eq!(roi.y2(), 2532, "Panel should reach the bottom edge");
    }

    #[test]
    fn test_bottom_panel_thirty_five_percent() {
        let roi = Roi::bottom_panel(100, 200, 0.35);

        assert_eq!(roi.y, 130);
        assert_eq!(roi.height, 70);
    }

    #[test]
    fn test_bottom_panel_clamps_fraction() {
        let whole = Roi::bottom_panel(10, 10, 1.5);
        assert_eq!(whole, Roi::new(0, 0, 10, 10));

        let none = Roi::bottom_panel(10, 10, -0.5);
        assert!(!none.is_valid(), "Negative fraction keeps nothing");
    }

    #[test]
    fn test_area() {
        assert_eq!(Roi::new(0, 0, 200, 150).area(), 30000);
    }
}
