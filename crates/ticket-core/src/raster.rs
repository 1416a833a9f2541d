//! # The ticket raster canvas
//!
//! A [Canvas] is a fixed-width monochrome raster. The width is constant for
//! the lifetime of a render while the height grows to fit the composed
//! content. Every `u8` in the buffer represents 8 sequential pixels in a
//! row where 0 is white (no ink) and 1 is black (ink), most significant
//! bit first.

#[cfg(feature = "image")]
use image::GrayImage;

/// A fixed-width, variable-height 1-bit raster
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    bytes_per_line: u32,
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl Canvas {
    /// Create a new canvas of the given width with no rows yet
    pub fn new(width: u32) -> Self {
        Self::with_height(width, 0)
    }

    /// Create a new canvas with the given dimensions
    pub fn with_height(width: u32, height: u32) -> Self {
        let bytes_per_line = (width - 1) / 8 + 1;
        Canvas {
            bytes_per_line,
            width,
            height,
            buffer: vec![0; (bytes_per_line as usize) * (height as usize)],
        }
    }

    /// The width in B/W pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height in B/W pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Return the number of bytes per line
    pub fn bytes_per_line(&self) -> u32 {
        self.bytes_per_line
    }

    /// The packed pixel rows as one contiguous slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Iterate over the packed pixel rows
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.buffer.chunks_exact(self.bytes_per_line as usize)
    }

    fn grow_to(&mut self, height: u32) {
        if height > self.height {
            self.buffer
                .resize((self.bytes_per_line as usize) * (height as usize), 0);
            self.height = height;
        }
    }

    /// Drop all rows below `height`
    ///
    /// Growth is implicit in the drawing operations, so this is the one
    /// explicit size change: the composer calls it once to cut the canvas
    /// to the content height.
    pub fn crop(&mut self, height: u32) {
        self.grow_to(height);
        self.buffer
            .truncate((self.bytes_per_line as usize) * (height as usize));
        self.height = height;
    }

    /// Check whether there is ink at a given coordinate
    pub fn ink_at(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = (y * self.bytes_per_line + x / 8) as usize;
        let shift = 7 - x % 8;
        ((self.buffer[byte] >> shift) & 1) > 0
    }

    fn put(&mut self, x: i32, y: i32, ink: bool) {
        // Pixels left/right of the canvas are never written; rows below the
        // current height extend it.
        if x < 0 || x as u32 >= self.width || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        self.grow_to(y + 1);
        let byte = (y * self.bytes_per_line + x / 8) as usize;
        let mask = 0x80u8 >> (x % 8);
        if ink {
            self.buffer[byte] |= mask;
        } else {
            self.buffer[byte] &= !mask;
        }
    }

    /// Set a single pixel to ink
    pub fn set_ink(&mut self, x: i32, y: i32) {
        self.put(x, y, true);
    }

    /// Fill a rectangle with ink
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        for dy in 0..h {
            for dx in 0..w {
                self.put(x + dx as i32, y + dy as i32, true);
            }
        }
    }

    /// Clear a rectangle back to white
    pub fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        for dy in 0..h {
            for dx in 0..w {
                self.put(x + dx as i32, y + dy as i32, false);
            }
        }
    }

    /// Draw a rectangle outline of the given stroke thickness
    pub fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, thickness: u32) {
        let t = thickness.min(w).min(h);
        self.fill_rect(x, y, w, t);
        self.fill_rect(x, y + (h - t) as i32, w, t);
        self.fill_rect(x, y, t, h);
        self.fill_rect(x + (w - t) as i32, y, t, h);
    }

    /// Draw a horizontal rule from `x0` to `x1` (exclusive)
    pub fn hrule(&mut self, x0: i32, x1: i32, y: i32, thickness: u32) {
        if x1 > x0 {
            self.fill_rect(x0, y, (x1 - x0) as u32, thickness);
        }
    }

    /// Draw a line segment with a square brush of the given thickness
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: u32) {
        let t = thickness.max(1) as i32;
        let off = (t - 1) / 2;
        let stamp = |c: &mut Self, x: i32, y: i32| {
            c.fill_rect(x - off, y - off, t as u32, t as u32);
        };

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            stamp(self, x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a closed polygon outline
    pub fn draw_polygon(&mut self, pts: &[(f32, f32)], thickness: u32) {
        for i in 0..pts.len() {
            let (ax, ay) = pts[i];
            let (bx, by) = pts[(i + 1) % pts.len()];
            self.draw_line(
                ax.round() as i32,
                ay.round() as i32,
                bx.round() as i32,
                by.round() as i32,
                thickness,
            );
        }
    }

    /// Fill a polygon using even-odd scanlines
    pub fn fill_polygon(&mut self, pts: &[(f32, f32)]) {
        if pts.len() < 3 {
            return;
        }
        let min_y = pts.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = pts.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let y0 = min_y.floor() as i32;
        let y1 = max_y.ceil() as i32;

        let mut hits: Vec<f32> = Vec::with_capacity(pts.len());
        for y in y0..y1 {
            let yc = y as f32 + 0.5;
            hits.clear();
            for i in 0..pts.len() {
                let (ax, ay) = pts[i];
                let (bx, by) = pts[(i + 1) % pts.len()];
                if (ay <= yc) != (by <= yc) {
                    hits.push(ax + (yc - ay) / (by - ay) * (bx - ax));
                }
            }
            hits.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            for pair in hits.chunks_exact(2) {
                let xs = (pair[0] - 0.5).ceil() as i32;
                let xe = (pair[1] - 0.5).ceil() as i32;
                for x in xs..xe {
                    self.put(x, y, true);
                }
            }
        }
    }

    fn corner(&mut self, cx: i32, cy: i32, r: u32, t: u32, qx: i32, qy: i32, fill: bool) {
        let rf = r as f32;
        let inner = rf - t as f32;
        for dy in 0..=r as i32 {
            for dx in 0..=r as i32 {
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                let on = if fill { d <= rf } else { d <= rf && d >= inner };
                if on {
                    self.put(cx + qx * dx, cy + qy * dy, true);
                }
            }
        }
    }

    /// Draw a rounded rectangle outline
    pub fn draw_round_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u32, thickness: u32) {
        let r = r.min(w / 2).min(h / 2);
        let t = thickness.max(1);
        let (wi, hi) = (w as i32, h as i32);
        self.fill_rect(x + r as i32, y, w - 2 * r, t);
        self.fill_rect(x + r as i32, y + hi - t as i32, w - 2 * r, t);
        self.fill_rect(x, y + r as i32, t, h - 2 * r);
        self.fill_rect(x + wi - t as i32, y + r as i32, t, h - 2 * r);
        self.corner(x + r as i32, y + r as i32, r, t, -1, -1, false);
        self.corner(x + wi - 1 - r as i32, y + r as i32, r, t, 1, -1, false);
        self.corner(x + r as i32, y + hi - 1 - r as i32, r, t, -1, 1, false);
        self.corner(x + wi - 1 - r as i32, y + hi - 1 - r as i32, r, t, 1, 1, false);
    }

    /// Fill a rounded rectangle with ink
    pub fn fill_round_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u32) {
        let r = r.min(w / 2).min(h / 2);
        let (wi, hi) = (w as i32, h as i32);
        self.fill_rect(x, y + r as i32, w, h - 2 * r);
        self.fill_rect(x + r as i32, y, w - 2 * r, h);
        self.corner(x + r as i32, y + r as i32, r, 0, -1, -1, true);
        self.corner(x + wi - 1 - r as i32, y + r as i32, r, 0, 1, -1, true);
        self.corner(x + r as i32, y + hi - 1 - r as i32, r, 0, -1, 1, true);
        self.corner(x + wi - 1 - r as i32, y + hi - 1 - r as i32, r, 0, 1, 1, true);
    }

    /// Blit a grayscale coverage bitmap, thresholding to 1-bit
    ///
    /// Thermal heads have no gray levels, so coverage is cut at 50%:
    /// values >= 128 become ink, everything else stays white.
    pub fn draw_coverage(&mut self, x: i32, y: i32, w: u32, h: u32, coverage: &[u8]) {
        debug_assert_eq!(coverage.len(), (w * h) as usize);
        for dy in 0..h {
            for dx in 0..w {
                if coverage[(dy * w + dx) as usize] >= 128 {
                    self.put(x + dx as i32, y + dy as i32, true);
                }
            }
        }
    }

    /// Count the ink pixels on the whole canvas
    pub fn ink_count(&self) -> u32 {
        self.buffer.iter().map(|b| b.count_ones()).sum()
    }

    #[cfg(feature = "image")]
    #[cfg_attr(docsrs, doc(cfg(feature = "image")))]
    /// Turn the canvas into a `GrayImage` from the `image` crate
    pub fn to_image(&self) -> GrayImage {
        let mut buffer = Vec::with_capacity((self.width * self.height) as usize);
        for row in self.rows() {
            for x in 0..self.width {
                let bit = (row[(x / 8) as usize] >> (7 - x % 8)) & 1;
                buffer.push(if bit == 1 { 0x00 } else { 0xFF });
            }
        }
        GrayImage::from_vec(self.width, self.height, buffer).unwrap()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Canvas;

    #[test]
    fn test_fill_rect_aligned() {
        let mut page = Canvas::with_height(24, 4);
        page.fill_rect(8, 1, 8, 2);
        assert_eq!(&[0x00, 0x00, 0x00], &page.as_bytes()[0..3]);
        assert_eq!(&[0x00, 0xFF, 0x00], &page.as_bytes()[3..6]);
        assert_eq!(&[0x00, 0xFF, 0x00], &page.as_bytes()[6..9]);
        assert_eq!(&[0x00, 0x00, 0x00], &page.as_bytes()[9..12]);
    }

    #[test]
    fn test_fill_rect_unaligned() {
        let mut page = Canvas::with_height(24, 3);
        page.fill_rect(2, 1, 12, 1);
        assert_eq!(&[0x00, 0x00, 0x00], &page.as_bytes()[0..3]);
        assert_eq!(&[0x3F, 0xFC, 0x00], &page.as_bytes()[3..6]);
        assert_eq!(&[0x00, 0x00, 0x00], &page.as_bytes()[6..9]);
    }

    #[test]
    fn test_horizontal_clip() {
        let mut page = Canvas::with_height(16, 2);
        page.fill_rect(-4, 0, 8, 1);
        page.fill_rect(12, 1, 8, 1);
        assert_eq!(&[0xF0, 0x00], &page.as_bytes()[0..2]);
        assert_eq!(&[0x00, 0x0F], &page.as_bytes()[2..4]);
    }

    #[test]
    fn test_vertical_growth() {
        let mut page = Canvas::new(16);
        assert_eq!(0, page.height());
        page.set_ink(3, 9);
        assert_eq!(10, page.height());
        assert!(page.ink_at(3, 9));
        assert!(!page.ink_at(3, 8));
        page.crop(4);
        assert_eq!(4, page.height());
        assert_eq!(8, page.as_bytes().len());
    }

    #[test]
    fn test_coverage_threshold() {
        let mut page = Canvas::with_height(8, 2);
        page.draw_coverage(0, 0, 2, 2, &[0, 127, 128, 255]);
        assert!(!page.ink_at(0, 0));
        assert!(!page.ink_at(1, 0));
        assert!(page.ink_at(0, 1));
        assert!(page.ink_at(1, 1));
    }

    #[test]
    fn test_clear_rect() {
        let mut page = Canvas::with_height(8, 1);
        page.fill_rect(0, 0, 8, 1);
        page.clear_rect(2, 0, 4, 1);
        assert_eq!(&[0xC3], page.as_bytes());
    }

    #[test]
    fn test_fill_polygon_triangle() {
        let mut page = Canvas::with_height(8, 8);
        page.fill_polygon(&[(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)]);
        assert!(page.ink_at(1, 1));
        assert!(!page.ink_at(7, 7));
    }

    #[test]
    fn test_rows_shape() {
        let page = Canvas::with_height(20, 3);
        let rows: Vec<_> = page.rows().collect();
        assert_eq!(3, rows.len());
        assert_eq!(3, rows[0].len());
    }
}
