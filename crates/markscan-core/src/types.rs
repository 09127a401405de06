// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Markscan answer-sheet reader.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::MAX_OPTION_COLUMNS;

/// An answer option, identified by its position among the option columns.
///
/// Column 1 of the grid is `A`, column 2 is `B`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionLetter(u8);

impl OptionLetter {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);

    /// Letter for a zero-based option index (`0` → `A`).
    pub fn from_index(index: usize) -> Option<Self> {
        (index < MAX_OPTION_COLUMNS).then(|| Self(index as u8))
    }

    /// Letter for an uppercase or lowercase ASCII character.
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        upper
            .is_ascii_uppercase()
            .then(|| Self(upper as u8 - b'A'))
    }

    /// Zero-based option index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn as_char(self) -> char {
        (b'A' + self.0) as char
    }
}

impl std::fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for OptionLetter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OptionLetter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c)
                .ok_or_else(|| serde::de::Error::custom(format!("not an option letter: {s:?}"))),
            _ => Err(serde::de::Error::custom(format!(
                "expected a single letter, got {s:?}"
            ))),
        }
    }
}

/// Detected answers for one sheet, keyed by 1-based question number.
///
/// A question with no detected mark has no entry in the underlying map; use
/// [`AnswerMap::entries`] to walk every question including the absent ones.
/// Serializes as a JSON object with string keys, e.g. `{"1":"B","3":"D"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    question_count: u32,
    answers: BTreeMap<u32, OptionLetter>,
}

impl AnswerMap {
    /// An empty map covering questions `1..=question_count`.
    pub fn new(question_count: u32) -> Self {
        Self {
            question_count,
            answers: BTreeMap::new(),
        }
    }

    /// Record a detected answer. Returns `false` (and records nothing) if the
    /// question number is outside `1..=question_count`.
    pub fn insert(&mut self, question: u32, letter: OptionLetter) -> bool {
        if question == 0 || question > self.question_count {
            return false;
        }
        self.answers.insert(question, letter);
        true
    }

    /// Detected answer for a question, or `None` when nothing was detected.
    pub fn get(&self, question: u32) -> Option<OptionLetter> {
        self.answers.get(&question).copied()
    }

    /// Number of questions on the sheet.
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// Number of questions with a detected answer.
    pub fn detected_count(&self) -> usize {
        self.answers.len()
    }

    /// True when no question has a detected answer.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Every question in order, with `None` for "no detection".
    pub fn entries(&self) -> impl Iterator<Item = (u32, Option<OptionLetter>)> + '_ {
        (1..=self.question_count).map(|q| (q, self.get(q)))
    }
}

impl Serialize for AnswerMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.answers.iter().map(|(q, l)| (q.to_string(), l)))
    }
}

/// Ink measurement for one (question, option) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellScore {
    pub question: u32,
    pub option: OptionLetter,
    /// Ink pixels inside the margin-shrunk cell.
    pub ink: u32,
    /// Pixel area of the margin-shrunk cell (zero when the margin swallows it).
    pub area: u32,
}

impl CellScore {
    /// Ink pixels per cell pixel; zero for an empty crop.
    pub fn ratio(&self) -> f32 {
        if self.area == 0 {
            0.0
        } else {
            self.ink as f32 / self.area as f32
        }
    }
}

/// Outcome of the decision step for one question row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDecision {
    pub question: u32,
    pub scores: Vec<CellScore>,
    /// Highest-scoring option (earliest on ties), whether or not it cleared
    /// the threshold. `None` only when every cell scored zero.
    pub strongest: Option<OptionLetter>,
    /// The answer recorded in the [`AnswerMap`], if any.
    pub detected: Option<OptionLetter>,
}

/// How the answer table outline was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocateStrategy {
    /// Polygon simplification of a contour produced four vertices.
    Polygon {
        /// Rank of the contour by area (0 = largest).
        candidate: usize,
        /// Tolerance as a fraction of the contour perimeter.
        epsilon_fraction: f64,
    },
    /// Axis-aligned bounding box of the largest contour.
    BoundingBoxFallback,
}

/// Diagnostics gathered while reading one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub strategy: LocateStrategy,
    /// Table corners in source pixels: top-left, top-right, bottom-right, bottom-left.
    pub corners: [(f32, f32); 4],
    /// Rectified table size in pixels (width, height).
    pub rectified_size: (u32, u32),
    /// Grid cell size in rectified pixels (width, height); `(0, 0)` when the
    /// table was too small to hold the requested grid.
    pub cell_size: (u32, u32),
    /// One entry per question, or empty when no grid could be laid out.
    pub rows: Vec<RowDecision>,
}

/// Answers plus the diagnostics that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
    pub answers: AnswerMap,
    pub report: ScoreReport,
}
