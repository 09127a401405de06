// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognizer: runs binarize, locate, rectify, grid scoring and the decision
// policy over one photograph.

use markscan_core::error::{MarkscanError, Result};
use markscan_core::{AnswerMap, Recognition, RecognizerConfig, ScoreReport};
use tracing::{info, instrument, warn};

use crate::capability::{Backend, ImageprocBackend};
use crate::debug::DebugArtifacts;
use crate::load::RasterImage;
use crate::mask::BinaryMask;
use crate::omr::{GridLayout, LocatedTable, RectifiedImage, ThresholdParams};
use crate::omr::{binarize, decision, grid, locate, rectify};

/// Reads answer sheets with a fixed configuration.
///
/// Each call is independent; a `Recognizer` can be shared between threads
/// when its backend can.
#[derive(Debug, Clone)]
pub struct Recognizer<B = ImageprocBackend> {
    config: RecognizerConfig,
    backend: B,
}

/// Everything one run produced, kept together for the debug dump.
struct Run {
    mask: BinaryMask,
    rectified: RectifiedImage,
    layout: Option<GridLayout>,
    recognition: Recognition,
}

impl Default for Recognizer {
    fn default() -> Self {
        Self {
            config: RecognizerConfig::default(),
            backend: ImageprocBackend,
        }
    }
}

impl Recognizer {
    /// Recognizer using the `imageproc` backend. Fails if `config` is invalid.
    pub fn new(config: RecognizerConfig) -> Result<Self> {
        Self::with_backend(config, ImageprocBackend)
    }
}

impl<B: Backend> Recognizer<B> {
    /// Recognizer over a custom image backend.
    pub fn with_backend(config: RecognizerConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Read the marked answers for questions `1..=num_questions`.
    pub fn recognize(&self, image: &RasterImage, num_questions: u32) -> Result<AnswerMap> {
        self.recognize_with_report(image, num_questions)
            .map(|recognition| recognition.answers)
    }

    /// Like [`recognize`](Self::recognize), also returning per-cell scores and
    /// the table geometry.
    pub fn recognize_with_report(
        &self,
        image: &RasterImage,
        num_questions: u32,
    ) -> Result<Recognition> {
        self.run(image, num_questions).map(|run| run.recognition)
    }

    /// Like [`recognize_with_report`](Self::recognize_with_report), also
    /// capturing the intermediate images.
    pub fn recognize_with_debug(
        &self,
        image: &RasterImage,
        num_questions: u32,
    ) -> Result<(Recognition, DebugArtifacts)> {
        let run = self.run(image, num_questions)?;
        let artifacts = DebugArtifacts::capture(&run.mask, &run.rectified, run.layout.as_ref());
        Ok((run.recognition, artifacts))
    }

    #[instrument(
        skip_all,
        fields(width = image.width(), height = image.height(), num_questions = num_questions)
    )]
    fn run(&self, image: &RasterImage, num_questions: u32) -> Result<Run> {
        if num_questions == 0 {
            return Err(MarkscanError::InvalidQuestionCount(num_questions));
        }
        let config = &self.config;

        let (gray, mask) =
            binarize::binarize_image(&self.backend, image, &ThresholdParams::from(config))?;

        let LocatedTable { quad, strategy } = locate::locate_table(
            &self.backend,
            &mask,
            config.max_candidates,
            &config.epsilon_fractions,
        )?;

        let rectified = rectify::rectify(&self.backend, &gray, &mask, &quad);
        let layout = GridLayout::new(
            rectified.width(),
            rectified.height(),
            num_questions,
            config.option_columns as u32,
        );

        // A table shorter than its row count has no scorable cells; every
        // question is absent and no per-row report is built.
        let (answers, decisions) = match &layout {
            Some(layout) => {
                let rows = grid::score_grid(&rectified.mask, layout, config.cell_margin);
                decision::decide(rows, num_questions, config.detection)
            }
            None => {
                warn!(
                    width = rectified.width(),
                    height = rectified.height(),
                    num_questions,
                    "Table too small for the requested grid; no answers read"
                );
                (AnswerMap::new(num_questions), Vec::new())
            }
        };

        info!(
            detected = answers.detected_count(),
            questions = num_questions,
            "Answer sheet recognized"
        );

        let report = ScoreReport {
            strategy,
            corners: quad.corners(),
            rectified_size: (rectified.width(), rectified.height()),
            cell_size: layout.map_or((0, 0), |l| (l.cell_width, l.cell_height)),
            rows: decisions,
        };
        Ok(Run {
            mask,
            rectified,
            layout,
            recognition: Recognition { answers, report },
        })
    }
}

/// Read a sheet with the default configuration.
pub fn recognize(image: &RasterImage, num_questions: u32) -> Result<AnswerMap> {
    let recognizer: Recognizer = Recognizer::default();
    recognizer.recognize(image, num_questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::AnswerSheet;
    use image::{DynamicImage, GrayImage, Luma};
    use markscan_core::{LocateStrategy, OptionLetter};

    fn photo(img: GrayImage) -> RasterImage {
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn zero_questions_is_rejected() {
        let img = photo(AnswerSheet::new(2).render());
        let err = recognize(&img, 0).unwrap_err();
        assert!(matches!(err, MarkscanError::InvalidQuestionCount(0)));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = RecognizerConfig {
            max_candidates: 0,
            ..RecognizerConfig::default()
        };
        assert!(matches!(
            Recognizer::new(config),
            Err(MarkscanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_image_is_load_error() {
        let err = recognize(&photo(GrayImage::new(0, 0)), 3).unwrap_err();
        assert!(matches!(err, MarkscanError::LoadError(_)));
    }

    #[test]
    fn blank_paper_has_no_table() {
        let img = photo(GrayImage::from_pixel(300, 200, Luma([255u8])));
        assert!(matches!(recognize(&img, 3), Err(MarkscanError::NoTableFound)));
    }

    #[test]
    fn question_count_beyond_table_height_reads_all_absent() {
        let img = photo(AnswerSheet::new(3).mark(1, OptionLetter::B).render());
        let recognizer = Recognizer::new(RecognizerConfig::default()).unwrap();

        for count in [u32::MAX, 100_000_000, 1_000] {
            let recognition = recognizer.recognize_with_report(&img, count).unwrap();
            assert!(recognition.answers.is_empty(), "count {count}");
            assert_eq!(recognition.answers.question_count(), count);
            assert!(recognition.report.rows.is_empty());
            assert_eq!(recognition.report.cell_size, (0, 0));
        }
        assert!(recognize(&img, u32::MAX).unwrap().is_empty());
    }

    #[test]
    fn report_describes_the_table() {
        let img = photo(AnswerSheet::new(3).mark(1, OptionLetter::B).render());
        let recognition = Recognizer::new(RecognizerConfig::default())
            .unwrap()
            .recognize_with_report(&img, 3)
            .unwrap();

        assert!(matches!(
            recognition.report.strategy,
            LocateStrategy::Polygon { candidate: 0, .. }
        ));
        assert_eq!(recognition.report.cell_size, (80, 60));
        assert_eq!(recognition.report.rows.len(), 3);
        let first = &recognition.report.rows[0];
        assert_eq!(first.detected, Some(OptionLetter::B));
        assert!(first.scores[1].ink > 40);
        assert_eq!(recognition.answers.get(1), Some(OptionLetter::B));
    }

    #[test]
    fn debug_artifacts_share_rectified_size() {
        let img = photo(AnswerSheet::new(2).render());
        let (recognition, artifacts) = Recognizer::new(RecognizerConfig::default())
            .unwrap()
            .recognize_with_debug(&img, 2)
            .unwrap();
        assert_eq!(artifacts.thresh.dimensions(), (img.width(), img.height()));
        assert_eq!(
            artifacts.warped.dimensions(),
            recognition.report.rectified_size
        );
        assert_eq!(
            artifacts.warped_thresh.dimensions(),
            recognition.report.rectified_size
        );
        assert_eq!(
            artifacts.grid.dimensions(),
            recognition.report.rectified_size
        );
    }
}
