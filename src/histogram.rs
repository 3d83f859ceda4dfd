//! Color frequency counting over decoded images
//!
//! Pixels are premultiplied by their alpha, quantized to the high 8 bits of
//! each RGB channel, and counted per distinct key. Alpha itself is not part of
//! the key, so a fully transparent pixel counts as `000000`. Ranking is by
//! descending count; equal counts are ordered by ascending key so repeated
//! runs produce identical records.

use image::{DynamicImage, ImageBuffer, Rgb, Rgba, RgbImage, RgbaImage};
use std::collections::HashMap;
use std::fmt;

/// Half-open pixel rectangle `[min_x, max_x) × [min_y, max_y)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Bounds {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width,
            max_y: height,
        }
    }

    pub fn pixel_count(&self) -> usize {
        let width = self.max_x.saturating_sub(self.min_x) as usize;
        let height = self.max_y.saturating_sub(self.min_y) as usize;
        width * height
    }
}

/// A decoded image that can be sampled pixel by pixel
pub trait PixelGrid {
    fn bounds(&self) -> Bounds;

    /// Quantized, alpha-premultiplied 8-bit RGB value at an in-bounds coordinate
    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3];
}

impl PixelGrid for RgbImage {
    fn bounds(&self) -> Bounds {
        Bounds::from_dimensions(self.width(), self.height())
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        self.get_pixel(x, y).0
    }
}

impl PixelGrid for RgbaImage {
    fn bounds(&self) -> Bounds {
        Bounds::from_dimensions(self.width(), self.height())
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, a] = self.get_pixel(x, y).0.map(widen);
        [premultiply(r, a), premultiply(g, a), premultiply(b, a)]
    }
}

impl PixelGrid for ImageBuffer<Rgb<u16>, Vec<u16>> {
    fn bounds(&self) -> Bounds {
        Bounds::from_dimensions(self.width(), self.height())
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b] = self.get_pixel(x, y).0;
        [premultiply(r, u16::MAX), premultiply(g, u16::MAX), premultiply(b, u16::MAX)]
    }
}

impl PixelGrid for ImageBuffer<Rgba<u16>, Vec<u16>> {
    fn bounds(&self) -> Bounds {
        Bounds::from_dimensions(self.width(), self.height())
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        [premultiply(r, a), premultiply(g, a), premultiply(b, a)]
    }
}

/// Spreads an 8-bit channel over the full 16-bit range (`0xAB` → `0xABAB`).
fn widen(channel: u8) -> u16 {
    u16::from(channel) * 0x101
}

/// Scales a 16-bit channel by a 16-bit alpha and keeps the high byte.
fn premultiply(channel: u16, alpha: u16) -> u8 {
    let scaled = u32::from(channel) * u32::from(alpha) / u32::from(u16::MAX);
    (scaled >> 8) as u8
}

/// Canonical 24-bit color key, rendered as six uppercase hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorKey([u8; 3]);

impl ColorKey {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{r:02X}{g:02X}{b:02X}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCount {
    pub key: ColorKey,
    pub count: usize,
}

/// Per-key pixel counts for one image
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    counts: HashMap<ColorKey, usize>,
    total: usize,
}

impl Histogram {
    pub fn from_grid<G: PixelGrid + ?Sized>(grid: &G) -> Self {
        let bounds = grid.bounds();
        let mut counts = HashMap::new();

        for y in bounds.min_y..bounds.max_y {
            for x in bounds.min_x..bounds.max_x {
                *counts.entry(ColorKey(grid.rgb_at(x, y))).or_insert(0) += 1;
            }
        }

        Self {
            counts,
            total: bounds.pixel_count(),
        }
    }

    /// Counts a decoded image, keeping the high byte of deep-color channels.
    pub fn from_image(image: &DynamicImage) -> Self {
        let color = image.color();
        let bytes_per_channel = color.bytes_per_pixel() / color.channel_count();

        if bytes_per_channel > 1 {
            Self::from_grid(&image.to_rgba16())
        } else {
            Self::from_grid(&image.to_rgba8())
        }
    }

    pub fn total_pixels(&self) -> usize {
        self.total
    }

    pub fn distinct_colors(&self) -> usize {
        self.counts.len()
    }

    /// The `k` most frequent colors, most frequent first.
    pub fn top(&self, k: usize) -> Vec<ColorCount> {
        let mut ranked: Vec<ColorCount> = self
            .counts
            .iter()
            .map(|(&key, &count)| ColorCount { key, count })
            .collect();

        ranked.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        ranked.truncate(k);
        ranked
    }
}

/// Shorthand for `Histogram::from_grid(grid).top(k)`.
pub fn top_colors<G: PixelGrid + ?Sized>(grid: &G, k: usize) -> Vec<ColorCount> {
    Histogram::from_grid(grid).top(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(width: u32, height: u32, pixels: &[[u8; 3]]) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb(pixels[(y * width + x) as usize]))
    }

    #[test]
    fn test_color_key_display() {
        assert_eq!(ColorKey::new(255, 0, 161).to_string(), "FF00A1");
        assert_eq!(ColorKey::new(0, 0, 0).to_string(), "000000");
        assert_eq!(ColorKey::new(10, 11, 12).to_string(), "0A0B0C");
    }

    #[test]
    fn test_two_by_two_round_trip() {
        let grid = grid_from(2, 2, &[[255, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]]);
        let top = top_colors(&grid, 3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].key.to_string(), "FF0000");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].count, 1);
        assert_eq!(top[2].count, 1);
    }

    #[test]
    fn test_uniform_grid() {
        let grid = RgbImage::from_pixel(7, 5, Rgb([12, 34, 56]));
        let top = top_colors(&grid, 3);

        assert_eq!(
            top,
            vec![ColorCount {
                key: ColorKey::new(12, 34, 56),
                count: 35,
            }]
        );
    }

    #[test]
    fn test_two_distinct_colors() {
        let grid = RgbImage::from_fn(4, 4, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) });
        let top = top_colors(&grid, 3);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].key, ColorKey::new(255, 255, 255));
        assert_eq!(top[0].count, 12);
        assert_eq!(top[1].count, 4);
    }

    #[test]
    fn test_empty_grid() {
        let grid = RgbImage::new(0, 0);
        let histogram = Histogram::from_grid(&grid);

        assert_eq!(histogram.total_pixels(), 0);
        assert!(histogram.top(3).is_empty());
    }

    #[test]
    fn test_ranking_properties() {
        // 5 distinct colors with uneven frequencies
        let grid = RgbImage::from_fn(10, 10, |x, y| {
            let v = ((x * y) % 5) as u8;
            Rgb([v * 40, 255 - v * 40, v])
        });
        let histogram = Histogram::from_grid(&grid);
        let top = histogram.top(3);

        assert!(top.len() <= 3);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        assert!(top.iter().map(|c| c.count).sum::<usize>() <= histogram.total_pixels());

        let mut tally = [0usize; 5];
        for y in 0..10u32 {
            for x in 0..10u32 {
                tally[((x * y) % 5) as usize] += 1;
            }
        }
        let true_max = tally.iter().copied().max().unwrap();
        assert_eq!(top[0].count, true_max);
    }

    #[test]
    fn test_alpha_is_premultiplied() {
        let grid = RgbaImage::from_fn(4, 1, |x, _| match x {
            0 => Rgba([9, 8, 7, 255]),
            1 => Rgba([9, 8, 7, 0]),
            _ => Rgba([255, 0, 0, 128]),
        });
        let top = top_colors(&grid, 3);

        assert_eq!(
            top.iter().map(|c| c.key.to_string()).collect::<Vec<_>>(),
            ["800000", "000000", "090807"]
        );
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn test_semi_transparent_png() {
        let image = RgbaImage::from_fn(3, 1, |x, _| {
            if x < 2 { Rgba([255, 0, 0, 128]) } else { Rgba([0, 0, 255, 0]) }
        });
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .unwrap();

        let decoded = crate::decode_image(bytes.get_ref()).unwrap();
        let top = Histogram::from_image(&decoded).top(3);

        assert_eq!(
            top.iter().map(|c| c.key.to_string()).collect::<Vec<_>>(),
            ["800000", "000000"]
        );
    }

    #[test]
    fn test_deep_alpha_is_premultiplied() {
        let grid: ImageBuffer<Rgba<u16>, Vec<u16>> = ImageBuffer::from_pixel(1, 1, Rgba([0xFFFF, 0x8000, 0, 0x8080]));
        let top = top_colors(&grid, 3);

        assert_eq!(top[0].key.to_string(), "804000");
    }

    #[test]
    fn test_deep_color_uses_high_byte() {
        let grid: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_fn(2, 1, |x, _| if x == 0 { Rgb([0xFF10, 0x0001, 0xA1FF]) } else { Rgb([0xFFEE, 0x00FF, 0xA100]) });
        let top = top_colors(&grid, 3);

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key.to_string(), "FF00A1");
    }

    #[test]
    fn test_from_dynamic_image() {
        let image = DynamicImage::ImageRgb8(grid_from(1, 3, &[[1, 2, 3], [1, 2, 3], [4, 5, 6]]));
        let histogram = Histogram::from_image(&image);

        assert_eq!(histogram.total_pixels(), 3);
        assert_eq!(histogram.distinct_colors(), 2);
        assert_eq!(
            histogram.top(1),
            vec![ColorCount {
                key: ColorKey::new(1, 2, 3),
                count: 2,
            }]
        );
    }

    #[test]
    fn test_bounds_pixel_count() {
        assert_eq!(Bounds::from_dimensions(3, 4).pixel_count(), 12);
        assert_eq!(Bounds::from_dimensions(0, 4).pixel_count(), 0);
    }
}
