// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognizer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MarkscanError, Result};

/// Highest number of option columns; letters run A..=Z.
pub const MAX_OPTION_COLUMNS: usize = 26;

/// Minimum signal a row's winning cell must carry to count as a mark.
///
/// Both variants compare strictly: a winner sitting exactly on the threshold
/// is reported as "no detection".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DetectionThreshold {
    /// Raw ink-pixel count in the shrunk cell.
    Absolute { min_ink: u32 },
    /// Ink pixels divided by the shrunk cell area, in `0.0..=1.0`.
    Density { min_ratio: f32 },
}

impl Default for DetectionThreshold {
    fn default() -> Self {
        Self::Absolute { min_ink: 40 }
    }
}

/// Tuning knobs for the recognition pipeline.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Gaussian sigma applied before thresholding (1.1 matches a 5x5 kernel).
    pub blur_sigma: f32,
    /// Half-width of the adaptive threshold window (5 gives an 11x11 window).
    pub threshold_block_radius: u32,
    /// How much darker than the local mean a pixel must be to count as ink.
    pub threshold_bias: i32,
    /// Number of largest contours examined for a four-sided outline.
    pub max_candidates: usize,
    /// Polygon simplification tolerances as fractions of contour perimeter,
    /// tried smallest first.
    pub epsilon_fractions: Vec<f64>,
    /// Answer options per question (the grid has one extra label column).
    pub option_columns: usize,
    /// Inward margin, in pixels, trimmed from every side of a cell.
    pub cell_margin: u32,
    /// Minimum signal for a detected mark.
    pub detection: DetectionThreshold,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            threshold_block_radius: 5,
            threshold_bias: 2,
            max_candidates: 5,
            epsilon_fractions: vec![0.02, 0.04, 0.06],
            option_columns: 4,
            cell_margin: 5,
            detection: DetectionThreshold::default(),
        }
    }
}

impl RecognizerConfig {
    /// Read a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
            return Err(invalid(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if self.max_candidates == 0 {
            return Err(invalid("max_candidates must be at least 1"));
        }
        if self.epsilon_fractions.is_empty() {
            return Err(invalid("epsilon_fractions must not be empty"));
        }
        if self
            .epsilon_fractions
            .iter()
            .any(|eps| !eps.is_finite() || *eps <= 0.0)
        {
            return Err(invalid("epsilon_fractions must all be positive"));
        }
        if self.epsilon_fractions.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("epsilon_fractions must be strictly increasing"));
        }
        if self.option_columns == 0 || self.option_columns > MAX_OPTION_COLUMNS {
            return Err(invalid(format!(
                "option_columns must be within 1..={MAX_OPTION_COLUMNS}, got {}",
                self.option_columns
            )));
        }
        if let DetectionThreshold::Density { min_ratio } = self.detection {
            if !(0.0..1.0).contains(&min_ratio) {
                return Err(invalid(format!(
                    "density min_ratio must be within [0, 1), got {min_ratio}"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> MarkscanError {
    MarkscanError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let config = RecognizerConfig::default();
        assert_eq!(config.threshold_block_radius * 2 + 1, 11);
        assert_eq!(config.threshold_bias, 2);
        assert_eq!(config.max_candidates, 5);
        assert_eq!(config.epsilon_fractions, vec![0.02, 0.04, 0.06]);
        assert_eq!(config.option_columns, 4);
        assert_eq!(config.cell_margin, 5);
        assert_eq!(
            config.detection,
            DetectionThreshold::Absolute { min_ink: 40 }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{"cell_margin": 8, "detection": {"mode": "density", "min_ratio": 0.1}}"#;
        let config: RecognizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.cell_margin, 8);
        assert_eq!(
            config.detection,
            DetectionThreshold::Density { min_ratio: 0.1 }
        );
        assert_eq!(config.option_columns, 4);
    }

    #[test]
    fn validate_rejects_unsorted_epsilons() {
        let config = RecognizerConfig {
            epsilon_fractions: vec![0.04, 0.02],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MarkscanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_options_and_candidates() {
        let no_options = RecognizerConfig {
            option_columns: 0,
            ..Default::default()
        };
        assert!(no_options.validate().is_err());

        let no_candidates = RecognizerConfig {
            max_candidates: 0,
            ..Default::default()
        };
        assert!(no_candidates.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_density() {
        let config = RecognizerConfig {
            detection: DetectionThreshold::Density { min_ratio: 1.5 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markscan.json");
        let config = RecognizerConfig {
            option_columns: 5,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(RecognizerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecognizerConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MarkscanError::Io(_)));
    }
}
