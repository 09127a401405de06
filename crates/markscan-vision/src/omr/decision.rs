// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decision policy: turn per-row cell scores into detected answers.

use markscan_core::{AnswerMap, CellScore, DetectionThreshold, RowDecision};
use tracing::{debug, instrument};

/// Decide one question row.
///
/// The strongest option is the one with the most ink; ties go to the
/// earliest option. It is recorded as the answer only if it clears the
/// threshold strictly.
pub fn decide_row(
    question: u32,
    scores: Vec<CellScore>,
    threshold: DetectionThreshold,
) -> RowDecision {
    let strongest = scores
        .iter()
        .fold(None::<&CellScore>, |best, cell| match best {
            Some(b) if cell.ink <= b.ink => Some(b),
            _ if cell.ink == 0 => best,
            _ => Some(cell),
        });

    let detected = strongest
        .filter(|cell| clears(threshold, cell))
        .map(|cell| cell.option);

    RowDecision {
        question,
        strongest: strongest.map(|cell| cell.option),
        detected,
        scores,
    }
}

/// Decide every row and collect the answers.
#[instrument(skip_all, fields(questions = question_count))]
pub fn decide(
    rows: Vec<Vec<CellScore>>,
    question_count: u32,
    threshold: DetectionThreshold,
) -> (AnswerMap, Vec<RowDecision>) {
    let mut answers = AnswerMap::new(question_count);
    let decisions: Vec<RowDecision> = rows
        .into_iter()
        .zip(1..=question_count)
        .map(|(scores, question)| decide_row(question, scores, threshold))
        .collect();

    for row in &decisions {
        match row.detected {
            Some(letter) => {
                answers.insert(row.question, letter);
            }
            None => debug!(question = row.question, "No mark detected"),
        }
    }
    (answers, decisions)
}

fn clears(threshold: DetectionThreshold, cell: &CellScore) -> bool {
    match threshold {
        DetectionThreshold::Absolute { min_ink } => cell.ink > min_ink,
        DetectionThreshold::Density { min_ratio } => cell.ratio() > min_ratio,
    }
}
