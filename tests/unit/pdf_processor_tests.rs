/*!
 * Tests for PDF text extraction
 */

use qrayti::errors::ExtractionError;
use qrayti::pdf_processor::{clean_text, estimate_page_count, PdfProcessor, MIN_TEXT_CHARS};

use crate::common;

/// A two-page PDF yields its text and a consistent page estimate
#[test]
fn test_process_twoPagePdf_shouldExtractTextAndEstimatePages() {
    let bytes = common::course_pdf();

    let document = PdfProcessor::new().process("cours.pdf", &bytes).unwrap();

    assert_eq!(document.file_name, "cours.pdf");
    assert!(document.content.contains("Chapitre 1"));
    assert!(document.content.contains("Chapitre 2"));
    assert!(document.page_count >= 1);
    assert_eq!(
        document.page_count,
        (document.content.chars().count() / 2000).max(1)
    );
}

/// Extracted text is already clean
#[test]
fn test_extractText_shouldReturnCleanedText() {
    let text = PdfProcessor::new()
        .extract_text(&common::course_pdf())
        .unwrap();

    assert_eq!(clean_text(&text), text);
    assert!(!text.contains("  "));
}

/// Pages beyond the cap are not read
#[test]
fn test_extractText_pageCap_shouldIgnoreLaterPages() {
    let bytes = common::build_pdf(&[
        vec!["Premiere page du support de cours"],
        vec!["Deuxieme page du support de cours"],
        vec!["Troisieme page du support de cours"],
    ]);

    let text = PdfProcessor::with_max_pages(2).extract_text(&bytes).unwrap();

    assert!(text.contains("Premiere"));
    assert!(text.contains("Deuxieme"));
    assert!(!text.contains("Troisieme"));
}

/// A document whose pages carry no text is a client error
#[test]
fn test_process_noTextPages_shouldReturnNoText() {
    let bytes = common::build_pdf(&[vec![], vec![]]);

    let result = PdfProcessor::new().process("scan.pdf", &bytes);

    assert!(matches!(result, Err(ExtractionError::NoText)));
}

/// Too little text is rejected
#[test]
fn test_process_shortText_shouldReturnInsufficientText() {
    let bytes = common::build_pdf(&[vec!["Titre seul"]]);

    let result = PdfProcessor::new().process("court.pdf", &bytes);

    match result {
        Err(ExtractionError::InsufficientText { chars }) => assert!(chars < MIN_TEXT_CHARS),
        other => panic!("expected insufficient text, got {:?}", other),
    }
}

/// Bytes that are not a PDF are a server-side extraction failure
#[test]
fn test_process_garbage_shouldReturnMalformed() {
    let result = PdfProcessor::new().process("faux.pdf", b"%PDF-1.4 but nothing else");

    assert!(matches!(result, Err(ExtractionError::Malformed(_))));
}

#[test]
fn test_estimatePageCount_longText_shouldScaleWithLength() {
    assert_eq!(estimate_page_count(&"x".repeat(10_500)), 5);
}
