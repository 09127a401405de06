// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits for the image and geometry primitives the pipeline needs.
//
// The recognizer's control flow only talks to these traits; `ImageprocBackend`
// implements them with the `image` and `imageproc` crates.

use image::{GrayImage, Luma};
use imageproc::contours::{self, BorderType};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::point::Point;

use crate::geometry::{self, Contour};
use crate::mask::BinaryMask;
use crate::omr::binarize::{ThresholdParams, adaptive_mean_threshold};

/// Separate dark ink from paper.
pub trait Binarize {
    /// Produce an ink mask from a grayscale image of the same size.
    fn binarize(&self, gray: &GrayImage, params: &ThresholdParams) -> BinaryMask;
}

/// Trace the outer boundaries of connected ink regions.
pub trait FindContours {
    /// Outermost contours only: boundaries nested inside another region's
    /// hole are not returned.
    fn find_external_contours(&self, mask: &BinaryMask) -> Vec<Contour>;
}

/// Simplify a closed contour into a polygon.
pub trait ApproxPolygon {
    /// No dropped point may lie further than `epsilon` pixels from the result.
    fn approx_polygon(&self, contour: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>>;
}

/// Solve for a perspective transform between two quadrilaterals.
pub trait ComputeHomography {
    type Transform;

    /// Transform sending each `from[i]` to `to[i]`, or `None` when the
    /// correspondence is degenerate.
    fn compute_homography(
        &self,
        from: [(f32, f32); 4],
        to: [(f32, f32); 4],
    ) -> Option<Self::Transform>;
}

/// Resample images through a transform from [`ComputeHomography`].
pub trait Warp: ComputeHomography {
    /// Smoothly resample a grayscale image into a `width x height` output.
    fn warp_gray(
        &self,
        image: &GrayImage,
        transform: &Self::Transform,
        width: u32,
        height: u32,
    ) -> GrayImage;

    /// Resample a mask into a `width x height` output, keeping it two-level.
    fn warp_mask(
        &self,
        mask: &BinaryMask,
        transform: &Self::Transform,
        width: u32,
        height: u32,
    ) -> BinaryMask;
}

/// Everything the recognizer needs from an image library.
pub trait Backend: Binarize + FindContours + ApproxPolygon + Warp {}

impl<T: Binarize + FindContours + ApproxPolygon + Warp> Backend for T {}

/// Backend built on `image` + `imageproc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocBackend;

impl Binarize for ImageprocBackend {
    fn binarize(&self, gray: &GrayImage, params: &ThresholdParams) -> BinaryMask {
        let blurred = gaussian_blur_f32(gray, params.blur_sigma);
        adaptive_mean_threshold(&blurred, params.block_radius, params.bias)
    }
}

impl FindContours for ImageprocBackend {
    fn find_external_contours(&self, mask: &BinaryMask) -> Vec<Contour> {
        contours::find_contours::<i32>(mask.as_image())
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| c.points)
            .collect()
    }
}

impl ApproxPolygon for ImageprocBackend {
    fn approx_polygon(&self, contour: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
        geometry::approximate_closed_polygon(contour, epsilon)
    }
}

impl ComputeHomography for ImageprocBackend {
    type Transform = Projection;

    fn compute_homography(
        &self,
        from: [(f32, f32); 4],
        to: [(f32, f32); 4],
    ) -> Option<Projection> {
        Projection::from_control_points(from, to)
    }
}

impl Warp for ImageprocBackend {
    fn warp_gray(
        &self,
        image: &GrayImage,
        transform: &Projection,
        width: u32,
        height: u32,
    ) -> GrayImage {
        let mut output = GrayImage::new(width, height);
        warp_into(
            image,
            transform,
            Interpolation::Bilinear,
            Luma([0u8]),
            &mut output,
        );
        output
    }

    fn warp_mask(
        &self,
        mask: &BinaryMask,
        transform: &Projection,
        width: u32,
        height: u32,
    ) -> BinaryMask {
        // Nearest keeps the mask two-level.
        let mut output = GrayImage::new(width, height);
        warp_into(
            mask.as_image(),
            transform,
            Interpolation::Nearest,
            Luma([0u8]),
            &mut output,
        );
        BinaryMask::from_gray(output)
    }
}
