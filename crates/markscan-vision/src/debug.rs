// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Intermediate images for diagnosing a bad read: the ink mask, the rectified
// table, and the rectified table with the scoring grid drawn over it.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use markscan_core::error::{MarkscanError, Result};
use tracing::{info, instrument};

use crate::mask::BinaryMask;
use crate::omr::{GridLayout, RectifiedImage};

const GRID_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);

/// Images captured from one recognition run.
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    /// Ink mask of the whole photograph.
    pub thresh: GrayImage,
    /// Rectified grayscale table.
    pub warped: GrayImage,
    /// Rectified ink mask (what the grid scorer counts).
    pub warped_thresh: GrayImage,
    /// Rectified table with every answer cell outlined.
    pub grid: RgbImage,
}

impl DebugArtifacts {
    /// Without a layout the grid image is the rectified table with nothing
    /// drawn on it.
    pub(crate) fn capture(
        mask: &BinaryMask,
        rectified: &RectifiedImage,
        layout: Option<&GridLayout>,
    ) -> Self {
        let grid = match layout {
            Some(layout) => grid_overlay(&rectified.gray, layout),
            None => DynamicImage::ImageLuma8(rectified.gray.clone()).to_rgb8(),
        };
        Self {
            thresh: mask.as_image().clone(),
            warped: rectified.gray.clone(),
            warped_thresh: rectified.mask.as_image().clone(),
            grid,
        }
    }

    /// Write every image as PNG into `dir`, creating it if needed.
    /// Returns the written paths.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let images = [
            ("thresh.png", DynamicImage::ImageLuma8(self.thresh.clone())),
            ("warped.png", DynamicImage::ImageLuma8(self.warped.clone())),
            (
                "warped_thresh.png",
                DynamicImage::ImageLuma8(self.warped_thresh.clone()),
            ),
            ("grid.png", DynamicImage::ImageRgb8(self.grid.clone())),
        ];

        let mut written = Vec::with_capacity(images.len());
        for (name, image) in images {
            let path = dir.join(name);
            if let Err(err) = image.save(&path) {
                let detail = format!("{}: {}", path.display(), err);
                return Err(MarkscanError::ImageWrite(detail));
            }
            written.push(path);
        }
        info!(count = written.len(), "Debug images written");
        Ok(written)
    }
}

/// Outline each scored cell (questions x options, skipping the header row and
/// label column) on a colour copy of `gray`.
pub fn grid_overlay(gray: &GrayImage, layout: &GridLayout) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(gray.clone()).to_rgb8();
    if layout.cell_width == 0 || layout.cell_height == 0 {
        return canvas;
    }
    for row in 1..layout.rows {
        for col in 1..layout.cols {
            let cell = layout.cell(row, col);
            let rect = Rect::at(cell.x0 as i32, cell.y0 as i32)
                .of_size(layout.cell_width, layout.cell_height);
            draw_hollow_rect_mut(&mut canvas, rect, GRID_COLOUR);
        }
    }
    canvas
}
