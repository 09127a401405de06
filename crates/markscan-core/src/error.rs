// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Markscan.

use thiserror::Error;

/// Top-level error type for all Markscan operations.
///
/// Only two kinds are terminal for a recognition call: the photograph could
/// not be decoded (`LoadError`) or no candidate table region exists at all
/// (`NoTableFound`). Weak or ambiguous rows are never errors.
#[derive(Debug, Error)]
pub enum MarkscanError {
    // -- Recognition errors --
    #[error("could not load image: {0}")]
    LoadError(String),

    #[error("no answer table found in image")]
    NoTableFound,

    #[error("invalid question count {0}: at least one question is required")]
    InvalidQuestionCount(u32),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Output --
    #[error("failed to write debug image: {0}")]
    ImageWrite(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MarkscanError>;
