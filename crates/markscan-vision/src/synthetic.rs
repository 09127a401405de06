// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic answer sheets for tests and benchmarks.
//
// A sheet is a ruled table on white paper: a header row, a label column with
// a short bar standing in for each question number, and one filled block per
// marked answer.

use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::geometric_transformations::{self, Interpolation, Projection};
use imageproc::rect::Rect;
use markscan_core::OptionLetter;

const PAPER: Luma<u8> = Luma([255]);
const INK: Luma<u8> = Luma([20]);

/// Builder for a rendered answer sheet.
#[derive(Debug, Clone)]
pub struct AnswerSheet {
    questions: u32,
    options: u32,
    cell_width: u32,
    cell_height: u32,
    border: u32,
    marks: BTreeMap<u32, OptionLetter>,
}

impl AnswerSheet {
    /// A sheet with `questions` rows of four options, 80x60 cells and a
    /// 150 pixel paper border.
    pub fn new(questions: u32) -> Self {
        Self {
            questions,
            options: 4,
            cell_width: 80,
            cell_height: 60,
            border: 150,
            marks: BTreeMap::new(),
        }
    }

    pub fn options(mut self, options: u32) -> Self {
        self.options = options;
        self
    }

    pub fn cell_size(mut self, width: u32, height: u32) -> Self {
        self.cell_width = width;
        self.cell_height = height;
        self
    }

    /// Fill in `letter` for `question` (1-based). A later mark for the same
    /// question replaces the earlier one.
    pub fn mark(mut self, question: u32, letter: OptionLetter) -> Self {
        self.marks.insert(question, letter);
        self
    }

    /// Table width and height, including the closing rule.
    pub fn table_size(&self) -> (u32, u32) {
        (
            (self.options + 1) * self.cell_width + 1,
            (self.questions + 1) * self.cell_height + 1,
        )
    }

    /// Render the sheet square to the camera.
    pub fn render(&self) -> GrayImage {
        let (table_w, table_h) = self.table_size();
        let mut img = GrayImage::from_pixel(
            table_w + 2 * self.border,
            table_h + 2 * self.border,
            PAPER,
        );
        let (left, top) = (self.border as i32, self.border as i32);

        for col in 0..=self.options + 1 {
            let x = left + (col * self.cell_width) as i32;
            draw_filled_rect_mut(&mut img, Rect::at(x, top).of_size(1, table_h), INK);
        }
        for row in 0..=self.questions + 1 {
            let y = top + (row * self.cell_height) as i32;
            draw_filled_rect_mut(&mut img, Rect::at(left, y).of_size(table_w, 1), INK);
        }

        // Question number placeholders in the label column.
        for row in 1..=self.questions {
            let x = left + (self.cell_width * 2 / 5) as i32;
            let y = top + (row * self.cell_height + self.cell_height / 3) as i32;
            draw_filled_rect_mut(
                &mut img,
                Rect::at(x, y).of_size(self.cell_width / 5, self.cell_height / 3),
                INK,
            );
        }

        for (&question, &letter) in &self.marks {
            if question == 0 || question > self.questions || letter.index() as u32 >= self.options {
                continue;
            }
            let col = letter.index() as u32 + 1;
            let x = left + (col * self.cell_width + self.cell_width / 4) as i32;
            let y = top + (question * self.cell_height + self.cell_height / 4) as i32;
            draw_filled_rect_mut(
                &mut img,
                Rect::at(x, y).of_size(self.cell_width / 2, self.cell_height / 2),
                INK,
            );
        }
        img
    }

    /// Render, then rotate the whole photo by `degrees` about its centre.
    pub fn render_rotated(&self, degrees: f32) -> GrayImage {
        geometric_transformations::rotate_about_center(
            &self.render(),
            degrees.to_radians(),
            Interpolation::Bilinear,
            PAPER,
        )
    }

    /// Render, then pinch the top edge inward by `inset` pixels on each side,
    /// as if photographed from below the sheet.
    pub fn render_keystoned(&self, inset: f32) -> GrayImage {
        let img = self.render();
        let (w, h) = (img.width() as f32 - 1.0, img.height() as f32 - 1.0);
        let from = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let to = [(inset, 0.0), (w - inset, 0.0), (w, h), (0.0, h)];
        match Projection::from_control_points(from, to) {
            Some(projection) => {
                geometric_transformations::warp(&img, &projection, Interpolation::Bilinear, PAPER)
            }
            None => img,
        }
    }
}
