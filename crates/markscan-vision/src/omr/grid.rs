// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid scorer: split the rectified table into equal rows and columns and
// count ink in every answer cell.
//
// Row 0 is the header and column 0 holds question numbers; neither is scored.

use markscan_core::{CellScore, OptionLetter};
use tracing::{debug, instrument};

use crate::mask::BinaryMask;

/// Equal-sized partition of a rectified table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Header row plus one row per question.
    pub rows: u32,
    /// Label column plus one column per option.
    pub cols: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

/// Half-open pixel window `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWindow {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellWindow {
    pub fn area(&self) -> u32 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

impl GridLayout {
    /// Layout for a `width x height` table with `questions` rows of
    /// `options` answer columns. Cell sizes use integer division, so any
    /// remainder pixels sit unused along the right and bottom edges.
    ///
    /// Returns `None` when the table has fewer pixels than grid rows or
    /// columns, leaving zero-sized cells.
    pub fn new(width: u32, height: u32, questions: u32, options: u32) -> Option<Self> {
        let rows = questions.checked_add(1)?;
        let cols = options.checked_add(1)?;
        let layout = Self {
            rows,
            cols,
            cell_width: width / cols,
            cell_height: height / rows,
        };
        (layout.cell_width > 0 && layout.cell_height > 0).then_some(layout)
    }

    pub fn questions(&self) -> u32 {
        self.rows - 1
    }

    pub fn options(&self) -> u32 {
        self.cols - 1
    }

    /// Full bounds of cell (`row`, `col`).
    pub fn cell(&self, row: u32, col: u32) -> CellWindow {
        CellWindow {
            x0: col * self.cell_width,
            y0: row * self.cell_height,
            x1: (col + 1) * self.cell_width,
            y1: (row + 1) * self.cell_height,
        }
    }

    /// Cell bounds shrunk by `margin` on every side, or `None` when the margin
    /// leaves nothing.
    pub fn scoring_window(&self, row: u32, col: u32, margin: u32) -> Option<CellWindow> {
        let cell = self.cell(row, col);
        let shrunk = CellWindow {
            x0: cell.x0 + margin,
            y0: cell.y0 + margin,
            x1: cell.x1.checked_sub(margin)?,
            y1: cell.y1.checked_sub(margin)?,
        };
        (shrunk.x1 > shrunk.x0 && shrunk.y1 > shrunk.y0).then_some(shrunk)
    }
}

/// Ink count for every (question, option) cell, one vector per question in
/// question order, options in column order.
#[instrument(skip_all, fields(rows = layout.rows, cols = layout.cols, margin = margin))]
pub fn score_grid(mask: &BinaryMask, layout: &GridLayout, margin: u32) -> Vec<Vec<CellScore>> {
    debug!(
        cell_width = layout.cell_width,
        cell_height = layout.cell_height,
        "Scoring grid"
    );
    (1..=layout.questions())
        .map(|question| {
            (1..=layout.options())
                .filter_map(|col| {
                    let option = OptionLetter::from_index((col - 1) as usize)?;
                    Some(score_cell(mask, layout, question, col, option, margin))
                })
                .collect()
        })
        .collect()
}

fn score_cell(
    mask: &BinaryMask,
    layout: &GridLayout,
    question: u32,
    col: u32,
    option: OptionLetter,
    margin: u32,
) -> CellScore {
    let (ink, area) = match layout.scoring_window(question, col, margin) {
        Some(w) => (mask.count_ink(w.x0, w.y0, w.x1, w.y1), w.area()),
        None => (0, 0),
    };
    CellScore {
        question,
        option,
        ink,
        area,
    }
}
