// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer-sheet recognition stages, leaf first: binarize, locate, rectify,
// score the grid, decide.

pub mod binarize;
pub mod decision;
pub mod grid;
pub mod locate;
pub mod rectify;

pub use binarize::ThresholdParams;
pub use grid::GridLayout;
pub use locate::LocatedTable;
pub use rectify::RectifiedImage;
