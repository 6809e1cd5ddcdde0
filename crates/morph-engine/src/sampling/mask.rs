//! Candidate points from a 2D boolean mask (e.g. a thresholded logo image).
//!
//! The mask lives on a normalized plane: the longer image side spans
//! `[-extent, extent]`, image rows grow downward while plane y grows upward.
//! There are no normals here; depth is synthesized from `thickness`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::rng::Rng;
use crate::error::{MorphError, Result};
use super::SurfaceSample;

/// Row-major boolean mask.
#[derive(Debug, Clone)]
pub struct ImageMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl ImageMask {
    pub fn new(width: u32, height: u32, bits: Vec<bool>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if bits.len() != expected {
            return Err(MorphError::InvalidConfig(format!(
                "mask has {} cells, expected {}x{}={}",
                bits.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self { width, height, bits })
    }

    /// Single-channel luminance; a pixel is set when `luma >= threshold`.
    pub fn from_luminance(width: u32, height: u32, luma: &[u8], threshold: u8) -> Result<Self> {
        Self::new(width, height, luma.iter().map(|&l| l >= threshold).collect())
    }

    /// RGBA8 pixels, thresholded on Rec.601 luma.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8], threshold: u8) -> Result<Self> {
        if rgba.len() % 4 != 0 {
            return Err(MorphError::InvalidConfig(format!(
                "rgba buffer length {} is not a multiple of 4",
                rgba.len()
            )));
        }
        let luma: Vec<u8> = rgba
            .chunks_exact(4)
            .map(|px| {
                let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        Self::from_luminance(width, height, &luma, threshold)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Plane placement for mask samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// Half-size of the longer image side on the plane.
    pub extent: f32,
    /// Jitter in pixels around each pixel center.
    pub jitter: f32,
    /// Total depth of the synthesized slab along z.
    pub thickness: f32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            extent: 1.5,
            jitter: 1.0,
            thickness: 0.2,
        }
    }
}

/// Samples set pixels of a mask uniformly.
#[derive(Debug, Clone)]
pub struct MaskSampler {
    pixels: Vec<(u32, u32)>,
    params: MaskParams,
    /// World units per pixel.
    unit: f32,
    half_w: f32,
    half_h: f32,
}

impl MaskSampler {
    pub fn new(mask: &ImageMask, params: MaskParams, name: &str) -> Result<Self> {
        let mut pixels = Vec::with_capacity(mask.count());
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if mask.is_set(x, y) {
                    pixels.push((x, y));
                }
            }
        }
        if pixels.is_empty() {
            return Err(MorphError::EmptySource { source_name: name.to_string() });
        }
        log::debug!("mask `{}`: {} candidate pixels", name, pixels.len());

        let longer = mask.width().max(mask.height()) as f32;
        let unit = 2.0 * params.extent / longer;
        Ok(Self {
            pixels,
            unit,
            half_w: mask.width() as f32 * unit * 0.5,
            half_h: mask.height() as f32 * unit * 0.5,
            params,
        })
    }

    pub fn candidate_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn sample(&self, rng: &mut Rng) -> SurfaceSample {
        let (px, py) = self.pixels[rng.next_int(self.pixels.len() as u32) as usize];
        let jx = (rng.next_f32() - 0.5) * self.params.jitter;
        let jy = (rng.next_f32() - 0.5) * self.params.jitter;
        let depth = rng.next_f32();

        let x = (px as f32 + 0.5 + jx) * self.unit - self.half_w;
        let y = self.half_h - (py as f32 + 0.5 + jy) * self.unit;
        let z = (depth - 0.5) * self.params.thickness;

        SurfaceSample {
            position: Vec3::new(x, y, z),
            normal: None,
            depth: Some(depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_is_empty_source() {
        let mask = ImageMask::from_luminance(2, 2, &[0, 10, 20, 30], 128).unwrap();
        let err = MaskSampler::new(&mask, MaskParams::default(), "logo").unwrap_err();
        assert!(matches!(err, MorphError::EmptySource { ref source_name } if source_name == "logo"));
    }

    #[test]
    fn wrong_buffer_size_rejected() {
        assert!(ImageMask::from_luminance(4, 4, &[0; 15], 1).is_err());
        assert!(ImageMask::from_rgba(1, 1, &[0; 3], 1).is_err());
    }

    #[test]
    fn rgba_threshold_uses_luma() {
        // White then black.
        let mask = ImageMask::from_rgba(2, 1, &[255, 255, 255, 255, 0, 0, 0, 255], 128).unwrap();
        assert!(mask.is_set(0, 0));
        assert!(!mask.is_set(1, 0));
    }

    #[test]
    fn samples_stay_on_plane_and_within_thickness() {
        let mut luma = vec![0u8; 8 * 4];
        luma[0] = 255; // top-left
        let mask = ImageMask::from_luminance(8, 4, &luma, 128).unwrap();
        let params = MaskParams { extent: 1.0, jitter: 0.0, thickness: 0.4 };
        let sampler = MaskSampler::new(&mask, params, "corner").unwrap();
        let mut rng = Rng::new(2);
        for _ in 0..200 {
            let s = sampler.sample(&mut rng);
            assert!(s.normal.is_none());
            // Pixel (0,0) center: unit = 0.25 → x = -0.875, y = +0.375.
            assert!((s.position.x + 0.875).abs() < 1e-5);
            assert!((s.position.y - 0.375).abs() < 1e-5);
            assert!(s.position.z.abs() <= 0.2);
            let d = s.depth.unwrap();
            assert!((0.0..1.0).contains(&d));
        }
    }
}
