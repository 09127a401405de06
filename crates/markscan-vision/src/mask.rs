// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary ink mask: foreground pixels mark dark ink on the sheet.

use image::{GrayImage, Luma};

/// Pixel value of an ink pixel; background is zero.
pub const INK: u8 = 255;

/// Two-level image where every pixel is either ink ([`INK`]) or background (0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// Wrap a grayscale image, treating every non-zero pixel as ink.
    pub fn from_gray(mut image: GrayImage) -> Self {
        for pixel in image.pixels_mut() {
            if pixel.0[0] != 0 {
                *pixel = Luma([INK]);
            }
        }
        Self { image }
    }

    /// An all-background mask.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Whether the pixel at (x, y) is ink. Out-of-bounds reads as background.
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.image.get_pixel(x, y).0[0] != 0
    }

    /// Count ink pixels in the half-open window `[x0, x1) x [y0, y1)`,
    /// clipped to the mask.
    pub fn count_ink(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u32 {
        let x1 = x1.min(self.width());
        let y1 = y1.min(self.height());
        let mut count = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                if self.image.get_pixel(x, y).0[0] != 0 {
                    count += 1;
                }
            }
        }
        count
    }

    /// Total ink pixels in the mask.
    pub fn ink_pixels(&self) -> u32 {
        self.count_ink(0, 0, self.width(), self.height())
    }

    /// Borrow the underlying 0/255 image.
    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}
