//! Pixel buffer with the handful of stroke primitives the drawing tools need,
//! plus PNG data-URL encoding.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{Rgba, RgbaImage};
use kurbo::{Point, Rect, Vec2};

use super::CanvasError;
use crate::model::Snapshot;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// What a stroke does to the pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Overwrite with an opaque colour.
    Color(Rgba<u8>),
    /// Clear to transparent.
    Erase,
}

impl Paint {
    fn pixel(&self) -> Rgba<u8> {
        match self {
            Paint::Color(c) => *c,
            Paint::Erase => TRANSPARENT,
        }
    }
}

/// An RGBA raster, transparent where nothing has been drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pixels: RgbaImage,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.width() && y < self.height()).then(|| *self.pixels.get_pixel(x, y))
    }

    /// True when no pixel has any coverage.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }

    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = TRANSPARENT;
        }
    }

    /// Copy `other` onto this raster at the origin, clipped to our bounds.
    pub fn draw_image(&mut self, other: &RgbaImage) {
        let w = self.width().min(other.width());
        let h = self.height().min(other.height());
        for y in 0..h {
            for x in 0..w {
                self.pixels.put_pixel(x, y, *other.get_pixel(x, y));
            }
        }
    }

    /// Visit every pixel whose centre lies in `bounds` (clipped to the raster).
    fn for_each_in(&mut self, bounds: Rect, mut f: impl FnMut(Point) -> bool, paint: Paint) {
        if self.width() == 0 || self.height() == 0 {
            return;
        }
        let x0 = bounds.x0.floor().max(0.0) as u32;
        let y0 = bounds.y0.floor().max(0.0) as u32;
        let x1 = (bounds.x1.ceil().max(0.0) as u32).min(self.width() - 1);
        let y1 = (bounds.y1.ceil().max(0.0) as u32).min(self.height() - 1);
        let pixel = paint.pixel();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let centre = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if f(centre) {
                    self.pixels.put_pixel(x, y, pixel);
                }
            }
        }
    }

    /// Stroke a straight segment with round caps.
    pub fn stroke_segment(&mut self, a: Point, b: Point, width: f64, paint: Paint) {
        let half = (width / 2.0).max(0.5);
        let bounds = Rect::from_points(a, b).inflate(half, half);
        let ab = b - a;
        let len_sq = ab.hypot2();
        self.for_each_in(
            bounds,
            |p| distance_sq_to_segment(p, a, ab, len_sq) <= half * half,
            paint,
        );
    }

    /// Stroke the outline of the rectangle spanned by two corners.
    pub fn stroke_rect(&mut self, a: Point, b: Point, width: f64, paint: Paint) {
        let corners = [a, Point::new(b.x, a.y), b, Point::new(a.x, b.y)];
        for i in 0..corners.len() {
            self.stroke_segment(corners[i], corners[(i + 1) % corners.len()], width, paint);
        }
    }

    /// Stroke a circle outline.
    pub fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, paint: Paint) {
        let half = (width / 2.0).max(0.5);
        let reach = radius + half;
        let bounds = Rect::new(center.x - reach, center.y - reach, center.x + reach, center.y + reach);
        self.for_each_in(bounds, |p| ((p - center).hypot() - radius).abs() <= half, paint);
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, CanvasError> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| CanvasError::Encode(e.to_string()))?;
            writer
                .write_image_data(self.pixels.as_raw())
                .map_err(|e| CanvasError::Encode(e.to_string()))?;
        }
        Ok(png_data)
    }

    /// Encode as a PNG data URL snapshot.
    pub fn to_snapshot(&self) -> Result<Snapshot, CanvasError> {
        let png_data = self.encode_png()?;
        Ok(Snapshot::from_data_url(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(png_data))))
    }
}

fn distance_sq_to_segment(p: Point, a: Point, ab: Vec2, len_sq: f64) -> f64 {
    if len_sq == 0.0 {
        return (p - a).hypot2();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot2()
}

/// Decode a snapshot (any base64 image data URL the `image` crate can read).
pub fn decode_snapshot(snapshot: &Snapshot) -> Result<RgbaImage, CanvasError> {
    let url = snapshot.as_str();
    let payload = match url.strip_prefix(DATA_URL_PREFIX) {
        Some(payload) => payload,
        None => {
            let (header, payload) = url
                .split_once(',')
                .ok_or_else(|| CanvasError::Decode("not a data URL".to_string()))?;
            if !header.starts_with("data:") || !header.ends_with(";base64") {
                return Err(CanvasError::Decode(format!("unsupported data URL header: {}", header)));
            }
            payload
        }
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CanvasError::Decode(e.to_string()))?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| CanvasError::Decode(e.to_string()))?;
    Ok(decoded.to_rgba8())
}
