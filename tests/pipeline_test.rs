//! Integration tests for the conversion pipeline over in-memory documents.

use pdfdown::source::{MemoryImage, RawTable};
use pdfdown::{BBox, ConvertOptions, Converter, MemoryDocument, MemoryPage};
use tempfile::TempDir;

fn page(lines: &[(&str, f32)]) -> MemoryPage {
    let mut page = MemoryPage::letter();
    for (text, top) in lines {
        page.add_text(text, 72.0, *top, 10.0, "Helvetica");
    }
    page
}

fn converter_in(dir: &TempDir) -> Converter {
    Converter::new(
        ConvertOptions::new()
            .with_output_dir(dir.path().join("out"))
            .with_image_output_dir(dir.path().join("out/images"))
            .with_public_image_path("images"),
    )
}

fn convert(document: &MemoryDocument, base_name: &str) -> (String, pdfdown::ConversionReport) {
    let dir = TempDir::new().unwrap();
    let output = converter_in(&dir).convert_document(document, base_name).unwrap();
    let markdown = std::fs::read_to_string(&output.markdown_path).unwrap();
    (markdown, output.report)
}

#[test]
fn test_running_header_and_footer_removed() {
    let mut document = MemoryDocument::new();
    for n in 1..=4 {
        let body = format!("Body text on page {}", n);
        document.add_page(page(&[
            ("ACME Corp", 30.0),
            (body.as_str(), 300.0),
            ("Confidential draft", 760.0),
        ]));
    }

    let (markdown, report) = convert(&document, "acme");
    assert!(!markdown.contains("ACME Corp"));
    assert!(!markdown.contains("Confidential draft"));
    for n in 1..=4 {
        assert!(markdown.contains(&format!("Body text on page {}", n)));
    }
    assert_eq!(report.header_footer_lines, 2);
}

#[test]
fn test_short_documents_keep_repeated_lines() {
    let document = MemoryDocument::new()
        .with_page(page(&[("ACME Corp", 30.0), ("First page body", 300.0)]))
        .with_page(page(&[("ACME Corp", 30.0), ("Second page body", 300.0)]));

    let (markdown, report) = convert(&document, "short");
    assert_eq!(markdown.matches("ACME Corp").count(), 2);
    assert_eq!(report.header_footer_lines, 0);
}

#[test]
fn test_structure_classification() {
    let document = MemoryDocument::new().with_page(page(&[
        ("Foo bar.", 100.0),
        ("Baz qux.", 112.0),
        ("1.1.1 Scope", 140.0),
        ("• Item one", 170.0),
        ("(iv) Roman item", 190.0),
    ]));

    let (markdown, report) = convert(&document, "structure");
    assert_eq!(
        markdown,
        "Foo bar. Baz qux.\n\n### 1.1.1 Scope\n\n- Item one\n\n  (iv) Roman item"
    );
    assert_eq!(report.heading_count, 1);
    assert_eq!(report.list_item_count, 2);
    assert_eq!(report.text_block_count, 1);
}

#[test]
fn test_split_section_number_heading() {
    let document = MemoryDocument::new().with_page(page(&[
        ("20.", 100.0),
        ("PUBLICITY AND USE OF NAMES", 114.0),
        ("Neither party may use the other's name.", 140.0),
    ]));

    let (markdown, _) = convert(&document, "contract");
    assert!(markdown.starts_with("# 20. PUBLICITY AND USE OF NAMES\n\n"));
}

#[test]
fn test_table_rendered_in_reading_order() {
    let mut first = page(&[("Intro paragraph", 100.0), ("• Closing item", 400.0)]);
    first
        .add_text("Widget", 80.0, 220.0, 10.0, "Helvetica")
        .add_table(RawTable::new(
            BBox::new(72.0, 200.0, 400.0, 260.0),
            vec![
                vec![Some("Name".into()), Some("Qty".into()), Some("Price".into())],
                vec![Some("Widget".into())],
                vec![Some("Gadget".into()), Some("2".into()), Some("3".into()), Some("x".into())],
            ],
        ));
    let document = MemoryDocument::new().with_page(first);

    let (markdown, report) = convert(&document, "table");
    assert_eq!(
        markdown,
        "Intro paragraph\n\n\
         | Name | Qty | Price |\n| --- | --- | --- |\n| Widget |  |  |\n| Gadget | 2 | 3 |\n\n\
         - Closing item"
    );
    assert_eq!(report.table_count, 1);
}

#[test]
fn test_image_failure_does_not_abort_page() {
    let mut first = page(&[("Figure caption text", 500.0)]);
    first
        .add_image(MemoryImage::failing(BBox::new(72.0, 100.0, 200.0, 200.0), "unsupported filter"))
        .add_image(MemoryImage::new(
            BBox::new(72.0, 300.0, 200.0, 400.0),
            vec![0x89, b'P', b'N', b'G'],
            "png",
        ));
    let document = MemoryDocument::new().with_page(first);

    let dir = TempDir::new().unwrap();
    let output = converter_in(&dir).convert_document(&document, "fig").unwrap();
    let markdown = std::fs::read_to_string(&output.markdown_path).unwrap();

    assert_eq!(markdown, "![Image](images/fig_p0_img1.png)\n\nFigure caption text");
    assert_eq!(output.report.image_count, 1);
    assert_eq!(output.report.images_skipped, 1);
    assert!(dir.path().join("out/images/fig_p0_img1.png").exists());
    assert!(!dir.path().join("out/images/fig_p0_img0.png").exists());
}

#[test]
fn test_pages_joined_with_blank_line() {
    let document = MemoryDocument::new()
        .with_page(page(&[("End of the first page.", 700.0)]))
        .with_page(page(&[("Start of the second page.", 100.0)]));

    let (markdown, report) = convert(&document, "pages");
    assert_eq!(markdown, "End of the first page.\n\nStart of the second page.");
    assert_eq!(report.page_count, 2);
}

#[test]
fn test_empty_document() {
    let (markdown, report) = convert(&MemoryDocument::new(), "empty");
    assert_eq!(markdown, "");
    assert_eq!(report.page_count, 0);
}

#[test]
fn test_conversion_is_idempotent() {
    let build = || {
        let mut first = page(&[("Repeated run", 100.0), ("Some body text.", 130.0)]);
        first.add_image(MemoryImage::new(
            BBox::new(72.0, 200.0, 172.0, 300.0),
            vec![1, 2, 3],
            "jpg",
        ));
        MemoryDocument::new().with_page(first)
    };

    let run = || {
        let dir = TempDir::new().unwrap();
        let output = converter_in(&dir).convert_document(&build(), "same").unwrap();
        let markdown = std::fs::read(&output.markdown_path).unwrap();
        let mut images: Vec<String> = std::fs::read_dir(dir.path().join("out/images"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        images.sort();
        (markdown, images)
    };

    let (first_md, first_images) = run();
    let (second_md, second_images) = run();
    assert_eq!(first_md, second_md);
    assert_eq!(first_images, second_images);
    assert_eq!(first_images, vec!["same_p0_img0.jpg".to_string()]);
}

#[test]
fn test_custom_filename() {
    let dir = TempDir::new().unwrap();
    let converter = Converter::new(
        ConvertOptions::new()
            .with_output_dir(dir.path())
            .with_image_output_dir(dir.path().join("img"))
            .with_custom_filename("notes"),
    );
    let document = MemoryDocument::new().with_page(page(&[("Hello", 100.0)]));
    let output = converter.convert_document(&document, "ignored").unwrap();
    assert_eq!(output.markdown_path, dir.path().join("notes.md"));
}
