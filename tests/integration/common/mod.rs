//! Shared fixtures for the integration tests.
//!
//! Documents are built in memory and, where a test needs a file, saved into
//! a temporary directory.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};

/// A document with `pages` pages tagged `{prefix}1`.. that share one font.
pub fn sample_document(prefix: &str, pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|i| {
            let tag = format!("{prefix}{i}");
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(tag.clone())]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content encodes"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Tag" => Object::string_literal(tag),
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Save `doc` as `dir/name`.
pub fn write_pdf(dir: &Path, name: &str, doc: &Document) -> PathBuf {
    let path = dir.join(name);
    doc.clone().save(&path).expect("fixture saves");
    path
}

/// The `Tag` of every page in document order.
pub fn page_tags(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .filter_map(|id| match doc.get_dictionary(id).ok()?.get(b"Tag").ok()? {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// Object id a copied value refers to.
pub fn reference(value: &Object) -> ObjectId {
    value.as_reference().expect("value is a reference")
}

/// Build a source document from explicit `(number, object)` pairs.
pub fn source_with(objects: Vec<(u32, Object)>) -> Document {
    let mut doc = Document::with_version("1.5");
    for (number, object) in objects {
        doc.objects.insert((number, 0), object);
        doc.max_id = doc.max_id.max(number);
    }
    doc
}
