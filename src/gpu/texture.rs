//! Texture loading
//!
//! Decodes an image resource and uploads it as a mipmapped RGBA texture.
//! The decoded pixels are moved into the upload and dropped right after it.

use std::path::PathBuf;

use glow::HasContext;
use log::{debug, info};

use super::error::GlError;

/// Prefix for resources generated in memory instead of read from disk
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Decoded RGBA8 pixels, row 0 at the top
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn from_rgba(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}

/// Image decode provider
pub trait ImageSource {
    fn decode(&self, resource: &str) -> Result<DecodedImage, GlError>;
}

/// Reads images relative to an asset directory
///
/// Resource ids starting with `builtin:` are generated instead
/// (`builtin:checker`, `builtin:gradient`, `builtin:badge`).
pub struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for FileImageSource {
    fn decode(&self, resource: &str) -> Result<DecodedImage, GlError> {
        if let Some(name) = resource.strip_prefix(BUILTIN_PREFIX) {
            return builtin_image(name)
                .map(DecodedImage::from_rgba)
                .ok_or_else(|| GlError::ImageDecode {
                    resource: resource.to_string(),
                    reason: "unknown builtin image".to_string(),
                });
        }

        let path = self.root.join(resource);
        let image = image::open(&path).map_err(|e| GlError::ImageDecode {
            resource: resource.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Decoded {}", path.display());
        Ok(DecodedImage::from_rgba(image.to_rgba8()))
    }
}

/// Procedural images so the texture demos run without asset files
pub fn builtin_image(name: &str) -> Option<image::RgbaImage> {
    match name {
        "checker" => Some(image::RgbaImage::from_fn(400, 400, |x, y| {
            if ((x / 50) + (y / 50)) % 2 == 0 {
                image::Rgba([230, 180, 60, 255])
            } else {
                image::Rgba([40, 70, 160, 255])
            }
        })),
        "gradient" => Some(image::RgbaImage::from_fn(400, 400, |x, y| {
            image::Rgba([(x * 255 / 399) as u8, (y * 255 / 399) as u8, 128, 255])
        })),
        "badge" => Some(image::RgbaImage::from_fn(128, 64, |x, y| {
            let border = x < 4 || y < 4 || x >= 124 || y >= 60;
            if border {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([180, 20, 20, 255])
            }
        })),
        _ => None,
    }
}

/// Sampler state for a texture of a given size
///
/// ES 2.0 without OES_texture_npot treats a non-power-of-two texture as
/// incomplete unless it uses CLAMP_TO_EDGE and a non-mipmapped min filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Sampling {
    min_filter: u32,
    wrap: u32,
    mipmaps: bool,
}

impl Sampling {
    fn for_size(width: u32, height: u32) -> Self {
        if width.is_power_of_two() && height.is_power_of_two() {
            Self {
                min_filter: glow::LINEAR_MIPMAP_LINEAR,
                wrap: glow::REPEAT,
                mipmaps: true,
            }
        } else {
            Self {
                min_filter: glow::LINEAR,
                wrap: glow::CLAMP_TO_EDGE,
                mipmaps: false,
            }
        }
    }
}

/// GPU texture with its source dimensions
pub struct Texture {
    pub width: u32,
    pub height: u32,
    texture: glow::Texture,
}

impl Texture {
    /// Decode `resource` from `source` and upload it
    pub fn load(
        gl: &glow::Context,
        source: &dyn ImageSource,
        resource: &str,
    ) -> Result<Self, GlError> {
        let image = source.decode(resource)?;
        let texture = Self::upload(gl, image)?;
        info!(
            "Texture uploaded: {} {}x{}",
            resource, texture.width, texture.height
        );
        Ok(texture)
    }

    /// Upload decoded pixels, with mipmaps when the size allows them
    ///
    /// Takes the image by value; the host-side buffer is freed on return.
    pub fn upload(gl: &glow::Context, image: DecodedImage) -> Result<Self, GlError> {
        unsafe {
            let texture = gl.create_texture().map_err(GlError::TextureCreate)?;

            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            let sampling = Sampling::for_size(image.width, image.height);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                sampling.min_filter as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, sampling.wrap as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, sampling.wrap as i32);

            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                image.width as i32,
                image.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(&image.pixels),
            );
            if sampling.mipmaps {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }

            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                width: image.width,
                height: image.height,
                texture,
            })
        }
    }

    /// Bind to texture unit `unit` (0-based)
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
    }

    /// Release resources
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_texture(self.texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_images() {
        let source = FileImageSource::new("/nonexistent");
        let checker = source.decode("builtin:checker").unwrap();
        assert_eq!((checker.width, checker.height), (400, 400));
        assert_eq!(checker.pixels.len(), 400 * 400 * 4);

        let badge = source.decode("builtin:badge").unwrap();
        assert_eq!((badge.width, badge.height), (128, 64));
    }

    #[test]
    fn test_npot_sampling_stays_complete() {
        let checker = Sampling::for_size(400, 400);
        assert_eq!(checker.min_filter, glow::LINEAR);
        assert_eq!(checker.wrap, glow::CLAMP_TO_EDGE);
        assert!(!checker.mipmaps);

        // One non-power-of-two side is enough
        assert!(!Sampling::for_size(128, 60).mipmaps);

        let badge = Sampling::for_size(128, 64);
        assert_eq!(badge.min_filter, glow::LINEAR_MIPMAP_LINEAR);
        assert_eq!(badge.wrap, glow::REPEAT);
        assert!(badge.mipmaps);
    }

    #[test]
    fn test_unknown_builtin_is_decode_error() {
        let source = FileImageSource::new(".");
        match source.decode("builtin:nope") {
            Err(GlError::ImageDecode { resource, .. }) => assert_eq!(resource, "builtin:nope"),
            other => panic!("unexpected result: {:?}", other.map(|i| i.width)),
        }
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileImageSource::new(dir.path());
        assert!(matches!(
            source.decode("missing.png"),
            Err(GlError::ImageDecode { .. })
        ));
    }

    #[test]
    fn test_decode_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]));
        image.save(dir.path().join("tiny.png")).unwrap();

        let source = FileImageSource::new(dir.path());
        let decoded = source.decode("tiny.png").unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(&decoded.pixels[0..4], &[1, 2, 3, 4]);
    }
}
