//! Page operations on documents loaded from and saved to disk.

use pdfjuggle::config::{InsertPosition, PageRange, Rotation};
use pdfjuggle::io::{PdfReader, PdfWriter};
use pdfjuggle::pages::{
    inherited_attribute, insert_pages, page_count, page_rotation, remove_pages, rotate_pages,
};
use pdfjuggle::JuggleError;
use tempfile::TempDir;

use crate::common::{page_tags, sample_document, write_pdf};

#[tokio::test]
async fn test_insert_from_file_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let base = write_pdf(temp_dir.path(), "base.pdf", &sample_document("b", 3));
    let cover = write_pdf(temp_dir.path(), "cover.pdf", &sample_document("c", 2));
    let output = temp_dir.path().join("out.pdf");

    let reader = PdfReader::new();
    let mut dest = reader.load(&base).await.unwrap();
    let src = reader.load(&cover).await.unwrap();

    let stats = insert_pages(&mut dest.document, &src.document, InsertPosition::Before(1)).unwrap();
    assert_eq!(stats.pages_inserted, 2);
    assert_eq!(stats.first_index, 1);
    assert!(stats.objects_copied > 0);

    PdfWriter::new().save(&dest.document, &output).await.unwrap();

    let reloaded = reader.load(&output).await.unwrap();
    assert_eq!(reloaded.page_count, 5);
    assert_eq!(page_tags(&reloaded.document), vec!["b1", "c1", "c2", "b2", "b3"]);
}

#[tokio::test]
async fn test_inserted_pages_keep_their_content() {
    let temp_dir = TempDir::new().unwrap();
    let base = write_pdf(temp_dir.path(), "base.pdf", &sample_document("b", 1));
    let extra = write_pdf(temp_dir.path(), "extra.pdf", &sample_document("x", 1));
    let output = temp_dir.path().join("out.pdf");

    let reader = PdfReader::new();
    let mut dest = reader.load(&base).await.unwrap();
    let src = reader.load(&extra).await.unwrap();
    insert_pages(&mut dest.document, &src.document, InsertPosition::End).unwrap();
    PdfWriter::new().save(&dest.document, &output).await.unwrap();

    let reloaded = reader.load(&output).await.unwrap().document;
    let pages = reloaded.get_pages();
    let content = reloaded.get_page_content(pages[&2]).unwrap();
    assert!(String::from_utf8_lossy(&content).contains("(x1) Tj"));

    // The font came along through the inherited Resources
    let resources = inherited_attribute(&reloaded, pages[&2], b"Resources").unwrap();
    let font = resources
        .as_dict()
        .unwrap()
        .get(b"Font")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"F1")
        .unwrap()
        .as_reference()
        .unwrap();
    let base_font = reloaded.get_dictionary(font).unwrap().get(b"BaseFont").unwrap();
    assert!(matches!(base_font, lopdf::Object::Name(name) if name == b"Helvetica"));
}

#[tokio::test]
async fn test_remove_and_save_prunes_pages() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &sample_document("p", 5));
    let output = temp_dir.path().join("out.pdf");

    let reader = PdfReader::new();
    let mut loaded = reader.load(&input).await.unwrap();
    let objects_before = loaded.document.objects.len();

    let removed = remove_pages(&mut loaded.document, &PageRange::parse("2-4").unwrap()).unwrap();
    assert_eq!(removed, 3);

    let stats = PdfWriter::new()
        .save_with_stats(&loaded.document, &output)
        .await
        .unwrap();
    assert!(stats.pruned_objects >= 3);
    assert!(stats.object_count < objects_before);

    let reloaded = reader.load(&output).await.unwrap();
    assert_eq!(page_tags(&reloaded.document), vec!["p1", "p5"]);
}

#[tokio::test]
async fn test_remove_every_page_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &sample_document("p", 2));

    let mut loaded = PdfReader::new().load(&input).await.unwrap();
    let result = remove_pages(&mut loaded.document, &PageRange::parse("1-2").unwrap());
    assert!(matches!(result, Err(JuggleError::CannotRemoveAllPages)));
    assert_eq!(page_count(&loaded.document), 2);
}

#[tokio::test]
async fn test_rotate_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_pdf(temp_dir.path(), "in.pdf", &sample_document("p", 3));
    let output = temp_dir.path().join("out.pdf");

    let reader = PdfReader::new();
    let mut loaded = reader.load(&input).await.unwrap();
    let range = PageRange::parse("1,3").unwrap();
    rotate_pages(&mut loaded.document, Rotation::Clockwise90, false, Some(&range)).unwrap();
    rotate_pages(&mut loaded.document, Rotation::Clockwise270, true, None).unwrap();

    PdfWriter::new().save(&loaded.document, &output).await.unwrap();
    let reloaded = reader.load(&output).await.unwrap().document;

    let rotations: Vec<i64> = (0..3).map(|i| page_rotation(&reloaded, i).unwrap()).collect();
    assert_eq!(rotations, vec![0, 270, 0]);
}
