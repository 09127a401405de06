// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end recognition over rendered answer sheets.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use markscan_core::{
    AnswerMap, DetectionThreshold, LocateStrategy, MarkscanError, OptionLetter, RecognizerConfig,
};
use markscan_vision::synthetic::AnswerSheet;
use markscan_vision::{Recognizer, load_image_bytes, recognize};
use serde_json::json;

fn photo(img: GrayImage) -> DynamicImage {
    DynamicImage::ImageLuma8(img)
}

fn expected(questions: u32, marks: &[(u32, OptionLetter)]) -> AnswerMap {
    let mut map = AnswerMap::new(questions);
    for &(q, letter) in marks {
        assert!(map.insert(q, letter));
    }
    map
}

fn default_recognizer() -> Recognizer {
    Recognizer::default()
}

#[test]
fn single_mark_on_three_question_sheet() {
    let img = photo(AnswerSheet::new(3).mark(1, OptionLetter::B).render());
    let answers = recognize(&img, 3).unwrap();

    assert_eq!(answers, expected(3, &[(1, OptionLetter::B)]));
    let entries: Vec<_> = answers.entries().collect();
    assert_eq!(
        entries,
        vec![(1, Some(OptionLetter::B)), (2, None), (3, None)]
    );
}

#[test]
fn every_row_marked_differently() {
    let marks = [
        (1, OptionLetter::A),
        (2, OptionLetter::D),
        (3, OptionLetter::C),
        (4, OptionLetter::B),
        (5, OptionLetter::A),
    ];
    let sheet = marks
        .iter()
        .fold(AnswerSheet::new(5), |s, &(q, l)| s.mark(q, l));
    let answers = recognize(&photo(sheet.render()), 5).unwrap();
    assert_eq!(answers, expected(5, &marks));
}

#[test]
fn unmarked_sheet_reads_all_absent() {
    let answers = recognize(&photo(AnswerSheet::new(4).render()), 4).unwrap();
    assert!(answers.is_empty());
    assert_eq!(answers.entries().count(), 4);
}

#[test]
fn stray_speck_does_not_count_as_a_mark() {
    let mut img = AnswerSheet::new(3).mark(3, OptionLetter::D).render();
    // 2x2 speck in the middle of question 2, option A.
    draw_filled_rect_mut(
        &mut img,
        Rect::at(150 + 80 + 40, 150 + 120 + 30).of_size(2, 2),
        Luma([20u8]),
    );
    let answers = recognize(&photo(img), 3).unwrap();
    assert_eq!(answers, expected(3, &[(3, OptionLetter::D)]));
}

#[test]
fn colour_photo_is_accepted() {
    let gray = AnswerSheet::new(3).mark(2, OptionLetter::C).render();
    let rgb = DynamicImage::ImageRgb8(photo(gray).to_rgb8());
    let answers = recognize(&rgb, 3).unwrap();
    assert_eq!(answers, expected(3, &[(2, OptionLetter::C)]));
}

#[test]
fn encoded_png_round_trips_through_loader() {
    let img = photo(AnswerSheet::new(2).mark(2, OptionLetter::A).render());
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();

    let loaded = load_image_bytes(buf.get_ref()).unwrap();
    let answers = recognize(&loaded, 2).unwrap();
    assert_eq!(answers, expected(2, &[(2, OptionLetter::A)]));
}

#[test]
fn blank_paper_is_no_table_found() {
    let img = photo(GrayImage::from_pixel(640, 480, Luma([255u8])));
    let err = recognize(&img, 3).unwrap_err();
    assert!(matches!(err, MarkscanError::NoTableFound));
}

#[test]
fn tiny_blob_degrades_to_all_absent() {
    let mut img = GrayImage::from_pixel(200, 200, Luma([255u8]));
    draw_filled_rect_mut(&mut img, Rect::at(100, 100).of_size(4, 4), Luma([0u8]));
    let answers = recognize(&photo(img), 3).unwrap();
    assert!(answers.is_empty());
    assert_eq!(answers.question_count(), 3);
}

#[test]
fn zero_questions_is_an_error() {
    let img = photo(AnswerSheet::new(3).render());
    assert!(matches!(
        recognize(&img, 0),
        Err(MarkscanError::InvalidQuestionCount(0))
    ));
}

#[test]
fn recognition_is_deterministic() {
    let img = photo(
        AnswerSheet::new(4)
            .mark(1, OptionLetter::C)
            .mark(4, OptionLetter::B)
            .render(),
    );
    let recognizer = default_recognizer();
    let first = recognizer.recognize_with_report(&img, 4).unwrap();
    let second = recognizer.recognize_with_report(&img, 4).unwrap();
    assert_eq!(first, second);
}

#[test]
fn heavily_rotated_photo_reads_the_same() {
    let sheet = AnswerSheet::new(3)
        .mark(1, OptionLetter::B)
        .mark(3, OptionLetter::D);
    let recognizer = default_recognizer();
    let upright = recognizer.recognize(&photo(sheet.render()), 3).unwrap();
    assert_eq!(
        upright,
        expected(3, &[(1, OptionLetter::B), (3, OptionLetter::D)])
    );

    for degrees in [20.0, -15.0, 30.0] {
        let recognition = recognizer
            .recognize_with_report(&photo(sheet.render_rotated(degrees)), 3)
            .unwrap();
        assert!(
            matches!(recognition.report.strategy, LocateStrategy::Polygon { .. }),
            "{degrees} degrees: {:?}",
            recognition.report.strategy
        );
        assert_eq!(recognition.answers, upright, "{degrees} degrees");
    }
}

#[test]
fn keystoned_photo_reads_the_same() {
    let sheet = AnswerSheet::new(4)
        .mark(2, OptionLetter::A)
        .mark(4, OptionLetter::C);
    let recognizer = default_recognizer();
    let upright = recognizer.recognize(&photo(sheet.render()), 4).unwrap();
    let recognition = recognizer
        .recognize_with_report(&photo(sheet.render_keystoned(30.0)), 4)
        .unwrap();
    assert!(matches!(
        recognition.report.strategy,
        LocateStrategy::Polygon { .. }
    ));
    assert_eq!(recognition.answers, upright);
    assert_eq!(
        recognition.answers,
        expected(4, &[(2, OptionLetter::A), (4, OptionLetter::C)])
    );
}

#[test]
fn larger_cells_read_the_same() {
    let img = photo(
        AnswerSheet::new(3)
            .cell_size(100, 75)
            .mark(2, OptionLetter::D)
            .render(),
    );
    let recognition = default_recognizer().recognize_with_report(&img, 3).unwrap();
    assert_eq!(recognition.report.cell_size, (100, 75));
    assert_eq!(recognition.answers, expected(3, &[(2, OptionLetter::D)]));
}

#[test]
fn question_count_far_beyond_the_grid_is_all_absent() {
    let img = photo(AnswerSheet::new(3).mark(1, OptionLetter::A).render());
    let answers = recognize(&img, u32::MAX).unwrap();
    assert!(answers.is_empty());
    assert_eq!(answers.question_count(), u32::MAX);
}

#[test]
fn density_threshold_reads_marks() {
    let recognizer = Recognizer::new(RecognizerConfig {
        detection: DetectionThreshold::Density { min_ratio: 0.05 },
        ..RecognizerConfig::default()
    })
    .unwrap();
    let img = photo(AnswerSheet::new(3).mark(2, OptionLetter::B).render());
    let answers = recognizer.recognize(&img, 3).unwrap();
    assert_eq!(answers, expected(3, &[(2, OptionLetter::B)]));
}

#[test]
fn wider_option_grid() {
    let recognizer = Recognizer::new(RecognizerConfig {
        option_columns: 5,
        ..RecognizerConfig::default()
    })
    .unwrap();
    let letter_e = OptionLetter::from_char('E').unwrap();
    let img = photo(AnswerSheet::new(2).options(5).mark(1, letter_e).render());
    let answers = recognizer.recognize(&img, 2).unwrap();
    assert_eq!(answers, expected(2, &[(1, letter_e)]));
}

#[test]
fn answers_serialize_with_question_keys() {
    let img = photo(
        AnswerSheet::new(3)
            .mark(1, OptionLetter::B)
            .mark(3, OptionLetter::A)
            .render(),
    );
    let recognition = default_recognizer().recognize_with_report(&img, 3).unwrap();

    assert_eq!(
        serde_json::to_value(&recognition.answers).unwrap(),
        json!({"1": "B", "3": "A"})
    );
    let report = serde_json::to_value(&recognition.report).unwrap();
    assert_eq!(report["strategy"]["kind"], "polygon");
    assert_eq!(report["rows"].as_array().map(Vec::len), Some(3));
}

#[test]
fn debug_images_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let img = photo(AnswerSheet::new(2).mark(1, OptionLetter::D).render());
    let (recognition, artifacts) = default_recognizer().recognize_with_debug(&img, 2).unwrap();
    assert_eq!(recognition.answers.get(1), Some(OptionLetter::D));

    let written = artifacts.write_to(dir.path()).unwrap();
    assert_eq!(written.len(), 4);
    assert!(dir.path().join("grid.png").exists());
}
