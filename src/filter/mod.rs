//! Image filters
//!
//! `FilterKind` selects the branch the image fragment shader takes. The CPU
//! functions here compute the same per-texel result and back the offline
//! `filter` command.

use crate::constants::{
    DEFAULT_TINT_INTENSITY, LUMINANCE_WEIGHTS, MOSAIC_REFERENCE_SIZE, SLIDER_MAX,
};

/// Channels a tint raises
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Red and green
    Warm,
    /// Blue
    Cool,
}

/// Filter applied by the image demo
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FilterKind {
    #[default]
    None,
    Grayscale,
    /// Additive per-channel offset, clamped to [0, 1]
    Tint { tone: Tone, progress: f32 },
    Mosaic,
}

impl FilterKind {
    /// Warm tint: red and green raised by `progress`
    pub fn warm(progress: f32) -> Self {
        Self::Tint {
            tone: Tone::Warm,
            progress,
        }
    }

    /// Cool tint: blue raised by `progress`
    pub fn cool(progress: f32) -> Self {
        Self::Tint {
            tone: Tone::Cool,
            progress,
        }
    }

    /// Integer branch selector uploaded as `u_Type`
    pub fn selector(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Grayscale => 1,
            Self::Tint { .. } => 2,
            Self::Mosaic => 3,
        }
    }

    /// Colour weights uploaded as `u_ChangeColor`
    pub fn weights(&self) -> [f32; 3] {
        match self {
            Self::Grayscale => LUMINANCE_WEIGHTS,
            Self::Tint {
                tone: Tone::Warm,
                progress,
            } => [*progress, *progress, 0.0],
            Self::Tint {
                tone: Tone::Cool,
                progress,
            } => [0.0, 0.0, *progress],
            Self::None | Self::Mosaic => [0.0; 3],
        }
    }

    /// Parse a menu choice: none, gray, warm, cool, mosaic
    ///
    /// `progress` overrides the tint intensity for warm and cool.
    pub fn parse(name: &str, progress: Option<f32>) -> Option<Self> {
        let intensity = progress.unwrap_or(DEFAULT_TINT_INTENSITY);
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "gray" | "grey" | "grayscale" => Some(Self::Grayscale),
            "warm" => Some(Self::warm(intensity)),
            "cool" => Some(Self::cool(intensity)),
            "mosaic" => Some(Self::Mosaic),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "gray",
            Self::Tint { tone: Tone::Warm, .. } => "warm",
            Self::Tint { tone: Tone::Cool, .. } => "cool",
            Self::Mosaic => "mosaic",
        }
    }
}

/// Map a 0-100 slider position to 0.0-1.0
pub fn slider_progress(value: u32) -> f32 {
    value.min(SLIDER_MAX) as f32 / SLIDER_MAX as f32
}

/// Mosaic cell size if it is usable as a block size (finite and positive)
pub fn checked_mosaic_cell(cell: f32) -> Option<f32> {
    (cell.is_finite() && cell > 0.0).then_some(cell)
}

/// Per-texel result of the colour filters (mosaic only moves the sample point)
pub fn apply_texel(filter: &FilterKind, texel: [f32; 4]) -> [f32; 4] {
    let [r, g, b, a] = texel;
    match filter {
        FilterKind::Grayscale => {
            let [wr, wg, wb] = LUMINANCE_WEIGHTS;
            let l = r * wr + g * wg + b * wb;
            [l, l, l, a]
        }
        FilterKind::Tint { .. } => {
            let [dr, dg, db] = filter.weights();
            [
                (r + dr).clamp(0.0, 1.0),
                (g + dg).clamp(0.0, 1.0),
                (b + db).clamp(0.0, 1.0),
                a.clamp(0.0, 1.0),
            ]
        }
        FilterKind::None | FilterKind::Mosaic => texel,
    }
}

/// Source texel sampled for output texel (x, y) under the mosaic filter
///
/// Texture coordinates are snapped to a `cell`-sized grid in a 400x400
/// reference space; the sample is the centre of the block's corner texel.
pub fn mosaic_source_texel(x: u32, y: u32, width: u32, height: u32, cell: f32) -> (u32, u32) {
    let snap = |coord: u32, size: u32| -> u32 {
        let uv = (coord as f32 + 0.5) / size as f32;
        let reference = uv * MOSAIC_REFERENCE_SIZE;
        let corner = (reference / cell).floor() * cell;
        let sample_uv = (corner + 0.5) / MOSAIC_REFERENCE_SIZE;
        ((sample_uv * size as f32).floor() as u32).min(size - 1)
    };
    (snap(x, width), snap(y, height))
}

/// Apply `filter` to a whole image on the CPU
pub fn apply(filter: &FilterKind, image: &image::RgbaImage, mosaic_cell: f32) -> image::RgbaImage {
    let (width, height) = image.dimensions();
    image::RgbaImage::from_fn(width, height, |x, y| {
        if let FilterKind::Mosaic = filter {
            let (sx, sy) = mosaic_source_texel(x, y, width, height, mosaic_cell);
            return *image.get_pixel(sx, sy);
        }
        let texel = to_unit(image.get_pixel(x, y).0);
        image::Rgba(from_unit(apply_texel(filter, texel)))
    })
}

fn to_unit(rgba: [u8; 4]) -> [f32; 4] {
    rgba.map(|c| c as f32 / 255.0)
}

fn from_unit(rgba: [f32; 4]) -> [u8; 4] {
    rgba.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [[f32; 4]; 5] = [
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 1.0, 1.0, 1.0],
        [0.2, 0.4, 0.6, 0.5],
        [0.9, 0.1, 0.3, 0.0],
        [0.6, 0.7, 0.05, 0.75],
    ];

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_selectors() {
        assert_eq!(FilterKind::None.selector(), 0);
        assert_eq!(FilterKind::Grayscale.selector(), 1);
        assert_eq!(FilterKind::warm(0.3).selector(), 2);
        assert_eq!(FilterKind::cool(0.3).selector(), 2);
        assert_eq!(FilterKind::Mosaic.selector(), 3);
    }

    #[test]
    fn test_grayscale_luminance() {
        for texel in SAMPLES {
            let [r, g, b, a] = texel;
            let l = 0.299 * r + 0.587 * g + 0.114 * b;
            let out = apply_texel(&FilterKind::Grayscale, texel);
            assert!(close(out[0], l) && close(out[1], l) && close(out[2], l));
            assert_eq!(out[3], a);
        }
    }

    #[test]
    fn test_warm_half_progress() {
        let warm = FilterKind::warm(0.5);
        for texel in SAMPLES {
            let [r, g, b, a] = texel;
            let out = apply_texel(&warm, texel);
            assert!(close(out[0], (r + 0.5).min(1.0)));
            assert!(close(out[1], (g + 0.5).min(1.0)));
            assert!(close(out[2], b));
            assert!(close(out[3], a));
        }
    }

    #[test]
    fn test_tint_zero_progress_is_identity() {
        for texel in SAMPLES {
            assert_eq!(apply_texel(&FilterKind::warm(0.0), texel), texel);
            assert_eq!(apply_texel(&FilterKind::cool(0.0), texel), texel);
        }
    }

    #[test]
    fn test_warm_full_progress_saturates() {
        for texel in SAMPLES {
            let out = apply_texel(&FilterKind::warm(1.0), texel);
            assert_eq!(out[0], 1.0);
            assert_eq!(out[1], 1.0);
        }
    }

    #[test]
    fn test_cool_only_raises_blue() {
        let out = apply_texel(&FilterKind::cool(0.25), [0.1, 0.2, 0.3, 1.0]);
        assert!(close(out[0], 0.1) && close(out[1], 0.2) && close(out[2], 0.55));
    }

    #[test]
    fn test_parse_menu_choices() {
        assert_eq!(FilterKind::parse("none", None), Some(FilterKind::None));
        assert_eq!(FilterKind::parse("GRAY", None), Some(FilterKind::Grayscale));
        assert_eq!(FilterKind::parse("warm", None), Some(FilterKind::warm(0.1)));
        assert_eq!(FilterKind::parse("cool", Some(0.7)), Some(FilterKind::cool(0.7)));
        assert_eq!(FilterKind::parse("mosaic", None), Some(FilterKind::Mosaic));
        assert_eq!(FilterKind::parse("sepia", None), None);
    }

    #[test]
    fn test_names_round_trip() {
        for name in ["none", "gray", "warm", "cool", "mosaic"] {
            let filter = FilterKind::parse(name, None).unwrap();
            assert_eq!(filter.name(), name);
        }
    }

    #[test]
    fn test_zero_tint_keeps_its_name() {
        assert_eq!(FilterKind::cool(0.0).name(), "cool");
        assert_eq!(FilterKind::warm(0.0).name(), "warm");
        assert_eq!(FilterKind::parse("cool", Some(0.0)).unwrap().name(), "cool");
        assert_eq!(FilterKind::cool(0.4).weights(), [0.0, 0.0, 0.4]);
    }

    #[test]
    fn test_checked_mosaic_cell() {
        assert_eq!(checked_mosaic_cell(10.0), Some(10.0));
        assert_eq!(checked_mosaic_cell(0.5), Some(0.5));
        for bad in [0.0, -10.0, f32::NAN, f32::INFINITY] {
            assert_eq!(checked_mosaic_cell(bad), None, "{}", bad);
        }
    }

    #[test]
    fn test_slider_progress() {
        assert_eq!(slider_progress(0), 0.0);
        assert_eq!(slider_progress(50), 0.5);
        assert_eq!(slider_progress(100), 1.0);
        assert_eq!(slider_progress(250), 1.0);
    }

    #[test]
    fn test_mosaic_is_blockwise_constant() {
        let image = image::RgbaImage::from_fn(400, 400, |x, y| {
            image::Rgba([(x % 251) as u8, (y % 241) as u8, ((x * 7 + y * 13) % 256) as u8, 255])
        });
        let out = apply(&FilterKind::Mosaic, &image, 10.0);
        for y in 0..400 {
            for x in 0..400 {
                let corner = image.get_pixel(x / 10 * 10, y / 10 * 10);
                assert_eq!(out.get_pixel(x, y), corner, "texel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_mosaic_source_texel_corner() {
        assert_eq!(mosaic_source_texel(0, 0, 400, 400, 10.0), (0, 0));
        assert_eq!(mosaic_source_texel(9, 19, 400, 400, 10.0), (0, 10));
        assert_eq!(mosaic_source_texel(399, 255, 400, 400, 10.0), (390, 250));
    }

    #[test]
    fn test_apply_none_keeps_image() {
        let image = image::RgbaImage::from_fn(8, 8, |x, y| image::Rgba([x as u8 * 30, y as u8 * 30, 7, 200]));
        assert_eq!(apply(&FilterKind::None, &image, 10.0), image);
    }
}
