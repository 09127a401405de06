// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarizer: grayscale conversion, smoothing, and adaptive (local mean)
// thresholding into an ink mask.

use image::{GrayImage, Luma};
use markscan_core::RecognizerConfig;
use markscan_core::error::{MarkscanError, Result};
use tracing::{debug, info, instrument};

use crate::capability::Binarize;
use crate::load::RasterImage;
use crate::mask::{BinaryMask, INK};

/// Parameters for the smoothing and local thresholding steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdParams {
    /// Gaussian sigma for the pre-threshold blur.
    pub blur_sigma: f32,
    /// Half-width of the square neighbourhood used for the local mean.
    pub block_radius: u32,
    /// A pixel is ink when it is at least this much darker than its local mean.
    pub bias: i32,
}

impl From<&RecognizerConfig> for ThresholdParams {
    fn from(config: &RecognizerConfig) -> Self {
        Self {
            blur_sigma: config.blur_sigma,
            block_radius: config.threshold_block_radius,
            bias: config.threshold_bias,
        }
    }
}

/// Convert a loaded photograph to grayscale and binarize it.
///
/// Returns the grayscale image alongside the mask; the rectifier resamples
/// both. Fails with `LoadError` on an empty image.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn binarize_image<B: Binarize>(
    backend: &B,
    image: &RasterImage,
    params: &ThresholdParams,
) -> Result<(GrayImage, BinaryMask)> {
    if image.width() == 0 || image.height() == 0 {
        return Err(MarkscanError::LoadError(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let gray = image.to_luma8();
    let mask = backend.binarize(&gray, params);
    info!(ink_pixels = mask.ink_pixels(), "Ink mask computed");
    Ok((gray, mask))
}

/// Mark a pixel as ink when it is no brighter than its local mean minus
/// `bias`. The mean covers a `(2 * block_radius + 1)` square clamped to the
/// image, so with a positive bias a uniform region never produces ink.
pub fn adaptive_mean_threshold(gray: &GrayImage, block_radius: u32, bias: i32) -> BinaryMask {
    let (width, height) = gray.dimensions();
    let integral = IntegralImage::new(gray);
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let threshold = integral.window_mean(x, y, block_radius) - f64::from(bias);
            let pixel_val = gray.get_pixel(x, y).0[0] as f64;
            if pixel_val <= threshold {
                output.put_pixel(x, y, Luma([INK]));
            }
        }
    }

    debug!(block_radius, bias, "Adaptive threshold complete");
    BinaryMask::from_gray(output)
}

// -- Integral image ------------------------------------------------------------

/// Summed-area table of a grayscale image, `(width + 1) x (height + 1)` with
/// a zero first row and column, so `sums[y * stride + x]` is the total of
/// every pixel above and left of (x, y), exclusive.
struct IntegralImage {
    sums: Vec<u64>,
    width: u32,
    height: u32,
}

impl IntegralImage {
    fn new(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let stride = width as usize + 1;
        let mut sums = vec![0u64; stride * (height as usize + 1)];

        for (y, row) in gray.rows().enumerate() {
            let mut row_sum = 0u64;
            for (x, pixel) in row.enumerate() {
                row_sum += u64::from(pixel.0[0]);
                sums[(y + 1) * stride + x + 1] = row_sum + sums[y * stride + x + 1];
            }
        }

        Self { sums, width, height }
    }

    fn stride(&self) -> usize {
        self.width as usize + 1
    }

    /// Mean over the `(2 * radius + 1)` square centred on (cx, cy), clipped to
    /// the image. The centre must lie inside the image; the clipped window
    /// then always holds at least that one pixel.
    fn window_mean(&self, cx: u32, cy: u32, radius: u32) -> f64 {
        debug_assert!(cx < self.width && cy < self.height);
        let stride = self.stride();
        let x0 = cx.saturating_sub(radius) as usize;
        let y0 = cy.saturating_sub(radius) as usize;
        let x1 = (cx.saturating_add(radius).saturating_add(1)).min(self.width) as usize;
        let y1 = (cy.saturating_add(radius).saturating_add(1)).min(self.height) as usize;

        let at = |x: usize, y: usize| self.sums[y * stride + x];
        let sum = at(x1, y1) + at(x0, y0) - at(x1, y0) - at(x0, y1);
        sum as f64 / ((x1 - x0) * (y1 - y0)) as f64
    }
}
