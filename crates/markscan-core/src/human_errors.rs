// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for students and teachers uploading photos.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the caller presents it (retake prompt, manual entry).

use crate::error::MarkscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something on our side hiccupped; trying again may work.
    Transient,
    /// The user must do something (retake the photo, fix a setting).
    ActionRequired,
    /// Cannot be fixed by retrying; the input itself is unusable.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying again with a new photo is worthwhile.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `MarkscanError` into a `HumanError` a student can act on.
pub fn humanize_error(err: &MarkscanError) -> HumanError {
    match err {
        MarkscanError::LoadError(detail) => HumanError {
            message: "We couldn't open this photo.".into(),
            suggestion: format!(
                "The file may be damaged or not a picture. Try taking the photo again and saving it as a JPEG or PNG. ({detail})"
            ),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        MarkscanError::NoTableFound => HumanError {
            message: "We couldn't find the answer grid in this photo.".into(),
            suggestion: "Please retake the photo with the whole answer table in view, on a flat surface, in good light. You can also type your answers in by hand.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        MarkscanError::InvalidQuestionCount(count) => HumanError {
            message: "This exam has no questions to read.".into(),
            suggestion: format!(
                "Ask your teacher to check the exam version; it reports {count} questions."
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        MarkscanError::InvalidConfig(detail) => HumanError {
            message: "The answer reader is set up incorrectly.".into(),
            suggestion: format!("Check the reader settings file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        MarkscanError::ImageWrite(_) | MarkscanError::Io(_) => HumanError {
            message: "We couldn't save or read a file.".into(),
            suggestion: "Check that there is free disk space and that the folder is writable, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        MarkscanError::Serialization(_) => HumanError {
            message: "A settings or results file is damaged.".into(),
            suggestion: "Check that the file is valid JSON, or delete it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
