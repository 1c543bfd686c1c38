//! Document-level operations: information dictionary, imposition and
//! summaries, each saved and reloaded.

use pdfjuggle::config::{ImposeLayout, Metadata, SheetSize};
use pdfjuggle::dump::dump_object;
use pdfjuggle::impose::impose;
use pdfjuggle::io::{PdfReader, PdfWriter, WriteOptions};
use pdfjuggle::metadata::{
    clear_metadata, read_metadata, unset_metadata_fields, write_metadata,
};
use pdfjuggle::output::DocumentSummary;
use pdfjuggle::pages::page_count;
use tempfile::TempDir;

use crate::common::{sample_document, write_pdf};

#[tokio::test]
async fn test_metadata_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &sample_document("p", 1));
    let output = temp_dir.path().join("out.pdf");

    let reader = PdfReader::new();
    let mut loaded = reader.load(&input).await.unwrap();
    let metadata = Metadata {
        title: Some("Année 2024".to_string()),
        author: Some("Jane Doe".to_string()),
        keywords: Some("pdf, pages".to_string()),
        ..Default::default()
    };
    write_metadata(&mut loaded.document, &metadata).unwrap();
    PdfWriter::new().save(&loaded.document, &output).await.unwrap();

    let reloaded = reader.load(&output).await.unwrap();
    let read = read_metadata(&reloaded.document);
    assert_eq!(read.title.as_deref(), Some("Année 2024"));
    assert_eq!(read.author.as_deref(), Some("Jane Doe"));
    assert_eq!(read.keywords.as_deref(), Some("pdf, pages"));
    assert!(read.subject.is_none());
}

#[tokio::test]
async fn test_clear_then_set_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let mut doc = sample_document("p", 1);
    write_metadata(
        &mut doc,
        &Metadata {
            title: Some("Old".to_string()),
            subject: Some("Old subject".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &doc);

    let mut loaded = PdfReader::new().load(&input).await.unwrap();
    clear_metadata(&mut loaded.document).unwrap();
    write_metadata(
        &mut loaded.document,
        &Metadata {
            title: Some("New".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let read = read_metadata(&loaded.document);
    assert_eq!(read.title.as_deref(), Some("New"));
    assert!(read.subject.is_none());
}

#[tokio::test]
async fn test_unset_field_survives_save() {
    let temp_dir = TempDir::new().unwrap();
    let mut doc = sample_document("p", 1);
    write_metadata(
        &mut doc,
        &Metadata {
            title: Some("Title".to_string()),
            author: Some("Someone".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &doc);
    let output = temp_dir.path().join("out.pdf");

    let reader = PdfReader::new();
    let mut loaded = reader.load(&input).await.unwrap();
    let key = Metadata::info_key("author").unwrap();
    assert_eq!(unset_metadata_fields(&mut loaded.document, &[key]).unwrap(), 1);
    PdfWriter::new().save(&loaded.document, &output).await.unwrap();

    let read = read_metadata(&reader.load(&output).await.unwrap().document);
    assert_eq!(read.title.as_deref(), Some("Title"));
    assert!(read.author.is_none());
}

#[tokio::test]
async fn test_dump_loaded_page() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &sample_document("p", 2));

    let loaded = PdfReader::new().load(&input).await.unwrap();
    let page = loaded.document.get_pages()[&1];
    let dump = dump_object(&loaded.document, page).unwrap();

    let text = dump.to_string();
    assert!(text.contains("/Type /Page"), "{text}");
    assert!(dump.references().count() >= 2);

    let contents = loaded
        .document
        .get_dictionary(page)
        .unwrap()
        .get(b"Contents")
        .unwrap()
        .as_reference()
        .unwrap();
    let stream_dump = dump_object(&loaded.document, contents).unwrap();
    let preview = String::from_utf8_lossy(stream_dump.stream_preview().unwrap()).into_owned();
    assert!(preview.contains("(p1) Tj"));
}

#[tokio::test]
async fn test_impose_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &sample_document("p", 7));
    let output = temp_dir.path().join("out.pdf");

    let reader = PdfReader::new();
    let loaded = reader.load(&input).await.unwrap();
    let layout = ImposeLayout {
        columns: 2,
        rows: 2,
        sheet: SheetSize::A3,
        margin: 18.0,
    };
    let (imposed, stats) = impose(&loaded.document, &layout).unwrap();
    assert_eq!(stats.sheets, 2);
    assert_eq!(stats.pages_placed, 7);
    // One shared Resources dictionary and one font
    assert_eq!(stats.objects_copied, 2);

    let write_stats = PdfWriter::new()
        .save_with_stats(&imposed, &output)
        .await
        .unwrap();
    assert_eq!(write_stats.pruned_objects, 0);

    let reloaded = reader.load(&output).await.unwrap();
    assert_eq!(reloaded.page_count, 2);

    let first_sheet = reloaded.document.get_pages()[&1];
    let media_box = reloaded
        .document
        .get_dictionary(first_sheet)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(media_box.len(), 4);
    let content = reloaded.document.get_page_content(first_sheet).unwrap();
    assert!(String::from_utf8_lossy(&content).contains("/P3 Do"));
}

#[tokio::test]
async fn test_summary_reports_document() {
    let temp_dir = TempDir::new().unwrap();
    let mut doc = sample_document("p", 4);
    write_metadata(
        &mut doc,
        &Metadata {
            title: Some("Summary".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &doc);

    let loaded = PdfReader::new().load(&input).await.unwrap();
    let summary = DocumentSummary::from_loaded(&loaded);
    assert_eq!(summary.page_count, 4);
    assert_eq!(summary.version, "1.5");
    assert_eq!(summary.metadata.title.as_deref(), Some("Summary"));

    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(json["page_count"], 4);
    assert_eq!(json["metadata"]["title"], "Summary");
}

#[tokio::test]
async fn test_uncompressed_write() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("plain.pdf");
    let doc = sample_document("p", 2);

    let writer = PdfWriter::with_options(WriteOptions {
        compress: false,
        ..Default::default()
    });
    let stats = writer.save_with_stats(&doc, &output).await.unwrap();
    assert!(!stats.compressed);

    let bytes = std::fs::read(&output).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("(p2) Tj"));
    let reloaded = PdfReader::new().load(&output).await.unwrap();
    assert_eq!(page_count(&reloaded.document), 2);
}
