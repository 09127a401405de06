// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectifier: perspective-correct the located table into an axis-aligned
// rectangle, resampling both the grayscale photo and the ink mask.

use image::{GrayImage, Luma};
use tracing::{debug, info, instrument, warn};

use crate::capability::Warp;
use crate::geometry::Quadrilateral;
use crate::mask::BinaryMask;

/// The table region after perspective correction.
#[derive(Debug, Clone, PartialEq)]
pub struct RectifiedImage {
    pub gray: GrayImage,
    pub mask: BinaryMask,
}

impl RectifiedImage {
    /// A plain white sheet with no ink, used when the geometry is unusable.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            gray: GrayImage::from_pixel(width, height, Luma([255u8])),
            mask: BinaryMask::blank(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }
}

/// Warp the quadrilateral `quad` of `gray` and `mask` onto a
/// `target_size()` rectangle with corners at (0, 0) and (W-1, H-1).
///
/// Degenerate outlines (a target narrower or shorter than two pixels, or a
/// transform that cannot be solved) produce a blank image of the target
/// size rather than an error; every row then scores zero downstream.
#[instrument(skip_all)]
pub fn rectify<B: Warp>(
    backend: &B,
    gray: &GrayImage,
    mask: &BinaryMask,
    quad: &Quadrilateral,
) -> RectifiedImage {
    let (width, height) = quad.target_size();
    debug!(corners = ?quad.corners(), width, height, "Rectification target");

    if width < 2 || height < 2 {
        warn!(width, height, "Degenerate table outline; skipping warp");
        return RectifiedImage::blank(width, height);
    }

    let (w, h) = ((width - 1) as f32, (height - 1) as f32);
    let dest = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    let Some(transform) = backend.compute_homography(quad.corners(), dest) else {
        warn!("Failed to compute projective transform; skipping warp");
        return RectifiedImage::blank(width, height);
    };

    let rectified = RectifiedImage {
        gray: backend.warp_gray(gray, &transform, width, height),
        mask: backend.warp_mask(mask, &transform, width, height),
    };
    info!(width, height, "Perspective correction applied");
    rectified
}
