// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Markscan vision: reads the marked answers from a photographed answer sheet.

pub mod capability;
pub mod debug;
pub mod geometry;
pub mod load;
pub mod mask;
pub mod omr;
pub mod recognizer;
pub mod synthetic;

pub use capability::{Backend, ImageprocBackend};
pub use debug::DebugArtifacts;
pub use load::{RasterImage, load_image_bytes, load_image_path};
pub use recognizer::{Recognizer, recognize};
