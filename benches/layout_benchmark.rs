//! Benchmarks for layout analysis and conversion.
//!
//! Run with: cargo bench

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pdfdown::layout::{HeaderFooterDetector, LayoutAnalyzer, PageSample};
use pdfdown::source::PageSource;
use pdfdown::{Character, ConvertOptions, Converter, MemoryDocument, MemoryPage};

/// A letter page with a running header, a heading, list items and
/// paragraphs of body text.
fn synthetic_page(number: usize) -> MemoryPage {
    let mut page = MemoryPage::letter();
    page.add_text("Benchmark Corp Quarterly", 72.0, 30.0, 9.0, "Helvetica");
    page.add_text(&format!("{}. Section heading", number), 72.0, 80.0, 16.0, "Helvetica-Bold");

    let mut top = 110.0;
    for line in 0..40 {
        let text = match line % 8 {
            0 => "• A bullet item describing one finding".to_string(),
            1 => "(ii) A roman numbered clause of the agreement".to_string(),
            _ => format!("Body line {} with enough words to look like prose text.", line),
        };
        page.add_text(&text, 72.0, top, 10.0, "Helvetica");
        top += 14.0;
    }
    page.add_text(&format!("Page {}", number), 290.0, 770.0, 9.0, "Helvetica");
    page
}

fn bench_text_blocks(c: &mut Criterion) {
    let page = synthetic_page(1);
    let chars: Vec<Character> = page.characters().unwrap();
    let analyzer = LayoutAnalyzer::default();
    let none = HashSet::new();

    c.bench_function("text_blocks_single_page", |b| {
        b.iter(|| analyzer.text_blocks(black_box(&chars), &[], &none));
    });
}

fn bench_header_footer_detection(c: &mut Criterion) {
    let pages: Vec<Vec<Character>> = (1..=20)
        .map(|n| synthetic_page(n).characters().unwrap())
        .collect();
    let samples: Vec<PageSample<'_>> = pages.iter().map(|c| PageSample::new(792.0, c)).collect();
    let detector = HeaderFooterDetector::default();

    c.bench_function("header_footer_20_pages", |b| {
        b.iter(|| detector.detect(black_box(&samples)));
    });
}

fn bench_render_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_document");
    let converter = Converter::new(ConvertOptions::new().with_images(false));

    for page_count in [1, 5, 20].iter() {
        let mut document = MemoryDocument::new();
        for n in 1..=*page_count {
            document.add_page(synthetic_page(n));
        }

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| converter.render_document(black_box(&document), "bench").unwrap());
        });
    }

    group.finish();
}

fn bench_pdf_detection(c: &mut Criterion) {
    let header = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";
    let non_pdf = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| pdfdown::is_pdf(black_box(header)));
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| pdfdown::is_pdf(black_box(non_pdf)));
    });
}

criterion_group!(
    benches,
    bench_text_blocks,
    bench_header_footer_detection,
    bench_render_document,
    bench_pdf_detection,
);
criterion_main!(benches);
