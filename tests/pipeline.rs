use lopdf::{dictionary, Document, Object, Stream};
use pdfdedup::core::{DedupOutcome, SourcePage};
use pdfdedup::services::{assemble, resolve_output_path, PdfDocument};
use pdfdedup::{DedupConfig, DuplicateDetector};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Page description for `write_pdf`: text plus raw RGB pixels per image.
struct TestPage<'a> {
    text: &'a str,
    images: Vec<Vec<u8>>,
}

fn text_page(text: &str) -> TestPage<'_> {
    TestPage {
        text,
        images: Vec::new(),
    }
}

fn image_page<'a>(text: &'a str, pixels: &[u8]) -> TestPage<'a> {
    TestPage {
        text,
        images: vec![pixels.to_vec()],
    }
}

fn build_pdf(pages: &[TestPage<'_>]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for page in pages {
        let mut xobjects = lopdf::Dictionary::new();
        let mut content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", page.text);
        for (i, pixels) in page.images.iter().enumerate() {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => (pixels.len() / 3) as i64,
                    "Height" => 1,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                pixels.clone(),
            ));
            let name = format!("Im{}", i);
            xobjects.set(name.clone(), Object::Reference(image_id));
            content.push_str(&format!(" q 100 0 0 100 72 500 cm /{} Do Q", name));
        }

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn write_pdf(dir: &Path, name: &str, pages: &[TestPage<'_>]) -> PathBuf {
    let path = dir.join(name);
    build_pdf(pages).save(&path).unwrap();
    path
}

fn page_texts(pdf: &PdfDocument) -> Vec<String> {
    pdf.pages()
        .iter()
        .map(|page| page.extract_text().unwrap())
        .collect()
}

fn detector() -> DuplicateDetector {
    DuplicateDetector::new(DedupConfig::default()).unwrap()
}

#[test]
fn test_repeated_page_is_removed_from_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(
        temp_dir.path(),
        "slides.pdf",
        &[
            text_page("Agenda for Monday"),
            text_page("Budget overview"),
            text_page("Agenda for Monday"),
        ],
    );

    let pdf = PdfDocument::load(&input).unwrap();
    let detector = detector();
    let analysis = detector.analyze(&pdf.pages()).unwrap();

    assert_eq!(analysis.candidates.len(), 1);
    assert_eq!((analysis.candidates[0].a, analysis.candidates[0].b), (0, 2));
    assert_eq!(analysis.candidates[0].similarity, 1.0);
    let deletion = analysis.deletion_set().unwrap();
    assert_eq!(deletion.page_numbers(), vec![3]);

    let output = resolve_output_path(&input, None);
    assert_eq!(output, temp_dir.path().join("outfile.pdf"));
    let kept = assemble(&pdf, deletion, &output, &detector.context()).unwrap();
    assert_eq!(kept, 2);

    let original_texts = page_texts(&pdf);
    let result = PdfDocument::load(&output).unwrap();
    assert_eq!(result.page_count(), 2);
    assert_eq!(page_texts(&result), original_texts[..2].to_vec());
}

#[test]
fn test_identical_text_with_different_images_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(
        temp_dir.path(),
        "figures.pdf",
        &[
            image_page("Figure 1", &[255, 0, 0, 255, 0, 0]),
            image_page("Figure 1", &[0, 0, 255, 0, 0, 255]),
        ],
    );

    let pdf = PdfDocument::load(&input).unwrap();
    let analysis = detector().analyze(&pdf.pages()).unwrap();

    assert_eq!(analysis.outcome, DedupOutcome::NoDuplicates);
    assert!(analysis.candidates.is_empty());
    assert_eq!(analysis.rejected.len(), 1);
}

#[test]
fn test_identical_text_and_images_is_duplicate() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(
        temp_dir.path(),
        "figures.pdf",
        &[
            image_page("Figure 1", &[9, 9, 9]),
            image_page("Figure 1", &[9, 9, 9]),
        ],
    );

    let pdf = PdfDocument::load(&input).unwrap();
    let analysis = detector().analyze(&pdf.pages()).unwrap();
    assert_eq!(analysis.deletion_set().unwrap().page_numbers(), vec![2]);
}

#[test]
fn test_image_on_one_side_only_relies_on_text() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(
        temp_dir.path(),
        "mixed.pdf",
        &[image_page("Summary", &[1, 2, 3]), text_page("Summary")],
    );

    let pdf = PdfDocument::load(&input).unwrap();
    let analysis = detector().analyze(&pdf.pages()).unwrap();
    assert_eq!(analysis.candidates.len(), 1);
    assert!(analysis.rejected.is_empty());
}

#[test]
fn test_group_keeps_first_occurrence() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(
        temp_dir.path(),
        "group.pdf",
        &[
            text_page("Cover"),
            text_page("Repeated handout"),
            text_page("Notes"),
            text_page("Repeated handout"),
            text_page("Repeated handout"),
        ],
    );

    let pdf = PdfDocument::load(&input).unwrap();
    let analysis = detector().analyze(&pdf.pages()).unwrap();
    let deletion = analysis.deletion_set().unwrap();
    assert_eq!(deletion.page_numbers(), vec![4, 5]);
    assert!(!deletion.contains(1));
}

#[test]
fn test_blank_pages_are_kept_unless_configured() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(
        temp_dir.path(),
        "blank.pdf",
        &[text_page(""), text_page("")],
    );
    let pdf = PdfDocument::load(&input).unwrap();

    let analysis = detector().analyze(&pdf.pages()).unwrap();
    assert_eq!(analysis.outcome, DedupOutcome::NoDuplicates);
    assert!(analysis.candidates.is_empty());

    let analysis = DuplicateDetector::new(DedupConfig {
        blank_pages_match: true,
        ..DedupConfig::default()
    })
    .unwrap()
    .analyze(&pdf.pages())
    .unwrap();
    assert_eq!(analysis.deletion_set().unwrap().page_numbers(), vec![2]);
    assert!(analysis.deletion_set().unwrap().contains(1));
}

#[test]
fn test_single_page_document_has_nothing_to_remove() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "one.pdf", &[text_page("Alone")]);

    let pdf = PdfDocument::load(&input).unwrap();
    let analysis = detector().analyze(&pdf.pages()).unwrap();
    assert_eq!(analysis.outcome, DedupOutcome::NoDuplicates);
    assert_eq!(analysis.page_count, 1);
}

#[test]
fn test_existing_output_is_not_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(
        temp_dir.path(),
        "deck.pdf",
        &[text_page("Same"), text_page("Same")],
    );
    std::fs::write(temp_dir.path().join("clean.pdf"), b"occupied").unwrap();

    let pdf = PdfDocument::load(&input).unwrap();
    let detector = detector();
    let analysis = detector.analyze(&pdf.pages()).unwrap();

    let output = resolve_output_path(&input, Some("clean"));
    assert_eq!(output, temp_dir.path().join("clean(2).pdf"));
    assemble(
        &pdf,
        analysis.deletion_set().unwrap(),
        &output,
        &detector.context(),
    )
    .unwrap();

    assert_eq!(
        std::fs::read(temp_dir.path().join("clean.pdf")).unwrap(),
        b"occupied"
    );
    assert_eq!(PdfDocument::load(&output).unwrap().page_count(), 1);
}

#[test]
fn test_parallel_analysis_agrees_with_sequential() {
    let temp_dir = TempDir::new().unwrap();
    let texts = ["Alpha", "Beta", "Alpha", "Gamma", "Beta", "Alpha"];
    let pages: Vec<_> = texts.iter().map(|t| text_page(t)).collect();
    let input = write_pdf(temp_dir.path(), "many.pdf", &pages);
    let pdf = PdfDocument::load(&input).unwrap();

    let sequential = detector().analyze(&pdf.pages()).unwrap();
    let parallel = DuplicateDetector::new(DedupConfig {
        parallel: true,
        ..DedupConfig::default()
    })
    .unwrap()
    .analyze(&pdf.pages())
    .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(
        sequential.deletion_set().unwrap().page_numbers(),
        vec![3, 5, 6]
    );
}
