// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photograph loading.

use std::path::Path;

use image::DynamicImage;
use markscan_core::error::{MarkscanError, Result};
use tracing::{debug, info, instrument};

/// A decoded photograph, colour or grayscale.
pub type RasterImage = DynamicImage;

/// Decode an image from raw encoded bytes (JPEG, PNG, TIFF, etc.).
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn load_image_bytes(data: &[u8]) -> Result<RasterImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| MarkscanError::LoadError(format!("failed to decode image: {}", err)))?;
    debug!(
        width = image.width(),
        height = image.height(),
        "Image decoded from bytes"
    );
    ensure_not_empty(image)
}

/// Load an image from a file path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_image_path(path: impl AsRef<Path>) -> Result<RasterImage> {
    let image = image::open(path.as_ref()).map_err(|err| {
        MarkscanError::LoadError(format!(
            "failed to open {}: {}",
            path.as_ref().display(),
            err
        ))
    })?;
    info!(
        width = image.width(),
        height = image.height(),
        "Image loaded"
    );
    ensure_not_empty(image)
}

fn ensure_not_empty(image: RasterImage) -> Result<RasterImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(MarkscanError::LoadError("image has no pixels".into()));
    }
    Ok(image)
}
