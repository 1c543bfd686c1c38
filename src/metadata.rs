//! Document information dictionary.
//!
//! Reads and writes the trailer `Info` dictionary:
//! - Text strings are decoded from UTF-16BE (with byte order mark) or
//!   PDFDocEncoding, which is treated as Latin-1
//! - Non-ASCII text is written back as UTF-16BE with a byte order mark
//! - `ModDate` is refreshed when the catalog carries `PieceInfo`
//! - Single entries can be removed without touching the rest
//!
//! # Examples
//!
//! ```no_run
//! use pdfjuggle::config::Metadata;
//! use pdfjuggle::metadata::{read_metadata, write_metadata};
//! # use lopdf::Document;
//!
//! # fn example(mut doc: Document) -> pdfjuggle::Result<()> {
//! let update = Metadata {
//!     title: Some("Quarterly report".to_string()),
//!     ..Default::default()
//! };
//! write_metadata(&mut doc, &update)?;
//! assert_eq!(read_metadata(&doc).title.as_deref(), Some("Quarterly report"));
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::config::Metadata;
use crate::error::{JuggleError, Result};

const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Read the document information dictionary.
///
/// Missing or unreadable entries are left as `None`.
pub fn read_metadata(doc: &Document) -> Metadata {
    let mut metadata = Metadata::default();
    let Some(info) = info_dictionary(doc) else {
        return metadata;
    };

    for (key, value) in info.iter() {
        let Some(field) = metadata.field_mut(key) else {
            continue;
        };
        let value = match value {
            Object::Reference(id) => doc.get_object(*id).ok(),
            direct => Some(direct),
        };
        if let Some(Object::String(bytes, _)) = value {
            *field = Some(decode_text(bytes));
        }
    }

    metadata
}

/// Set the provided fields of the information dictionary.
///
/// Fields left as `None` keep their current value. The dictionary is
/// created as an indirect object if the document has none.
///
/// # Errors
///
/// Returns [`JuggleError::MetadataFailed`] if the trailer `Info` entry
/// points at something other than a dictionary.
pub fn write_metadata(doc: &mut Document, metadata: &Metadata) -> Result<()> {
    let refresh_mod_date = metadata.mod_date.is_none() && has_piece_info(doc);
    let info_id = ensure_info(doc)?;
    let info = info_dict_mut(doc, info_id)?;

    let mut written = 0;
    for (key, value) in metadata.fields() {
        if let Some(text) = value {
            info.set(key, encode_text(text));
            written += 1;
        }
    }

    if refresh_mod_date {
        info.set("ModDate", encode_text(&pdf_date_now()));
    }

    debug!("wrote {written} Info field(s) to {} {} R", info_id.0, info_id.1);
    Ok(())
}

/// Remove every entry of the information dictionary.
///
/// # Errors
///
/// Returns [`JuggleError::MetadataFailed`] if the trailer `Info` entry
/// points at something other than a dictionary.
pub fn clear_metadata(doc: &mut Document) -> Result<()> {
    let Some(Ok(info_id)) = doc.trailer.get(b"Info").ok().map(Object::as_reference) else {
        if doc.trailer.remove(b"Info").is_some() {
            debug!("removed direct Info dictionary");
        }
        return Ok(());
    };

    let info = info_dict_mut(doc, info_id)?;
    let removed = info.len();
    *info = Dictionary::new();
    debug!("cleared {removed} Info field(s)");
    Ok(())
}

/// Remove the named entries, such as `Title`, from the information
/// dictionary. Returns how many were present.
///
/// # Errors
///
/// Returns [`JuggleError::MetadataFailed`] if the trailer `Info` entry
/// points at something other than a dictionary.
pub fn unset_metadata_fields<K: AsRef<[u8]>>(doc: &mut Document, keys: &[K]) -> Result<usize> {
    let info_id = match doc.trailer.get(b"Info") {
        Err(_) => return Ok(0),
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        Ok(other) => {
            return Err(JuggleError::MetadataFailed {
                reason: format!("trailer Info is not a dictionary: {other:?}"),
            });
        }
    };
    let info = match info_id {
        Some(id) => info_dict_mut(doc, id)?,
        None => doc.trailer.get_mut(b"Info")?.as_dict_mut()?,
    };

    let mut removed = 0;
    for key in keys {
        if info.remove(key.as_ref()).is_some() {
            removed += 1;
        }
    }
    debug!("removed {removed} Info field(s)");
    Ok(removed)
}

/// Current time as a PDF date string.
pub fn pdf_date_now() -> String {
    Utc::now().format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Id of an indirect `Info` dictionary, creating or hoisting one as needed.
fn ensure_info(doc: &mut Document) -> Result<ObjectId> {
    let existing = doc.trailer.get(b"Info").ok().cloned();

    let dict = match existing {
        Some(Object::Reference(id)) => return Ok(id),
        Some(Object::Dictionary(dict)) => dict,
        Some(other) => {
            return Err(JuggleError::MetadataFailed {
                reason: format!("trailer Info is not a dictionary: {other:?}"),
            });
        }
        None => Dictionary::new(),
    };

    let id = doc.add_object(dict);
    doc.trailer.set("Info", id);
    debug!("created Info dictionary {} {} R", id.0, id.1);
    Ok(id)
}

fn info_dict_mut(doc: &mut Document, id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_object_mut(id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| JuggleError::MetadataFailed {
            reason: format!("Info object {} {} R is not a dictionary", id.0, id.1),
        })
}

fn has_piece_info(doc: &Document) -> bool {
    doc.catalog().is_ok_and(|catalog| catalog.has(b"PieceInfo"))
}

/// Decode a PDF text string.
fn decode_text(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&UTF16_BOM) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Encode text as a PDF text string.
fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }

    let mut bytes = UTF16_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::flat_document;
    use lopdf::dictionary;

    fn info_bytes(doc: &Document, key: &[u8]) -> Vec<u8> {
        match info_dictionary(doc).unwrap().get(key).unwrap() {
            Object::String(bytes, _) => bytes.clone(),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_read_without_info() {
        let doc = flat_document("p", 1);
        assert!(read_metadata(&doc).is_empty());
    }

    #[test]
    fn test_write_creates_indirect_info() {
        let mut doc = flat_document("p", 1);
        let metadata = Metadata {
            title: Some("Report".to_string()),
            author: Some("Jane".to_string()),
            ..Default::default()
        };

        write_metadata(&mut doc, &metadata).unwrap();

        assert!(doc.trailer.get(b"Info").unwrap().as_reference().is_ok());
        let read = read_metadata(&doc);
        assert_eq!(read.title.as_deref(), Some("Report"));
        assert_eq!(read.author.as_deref(), Some("Jane"));
        assert!(read.mod_date.is_none());
    }

    #[test]
    fn test_write_preserves_unset_fields() {
        let mut doc = flat_document("p", 1);
        let info = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Old title"),
            "Producer" => Object::string_literal("Some producer"),
        });
        doc.trailer.set("Info", info);

        let metadata = Metadata {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        write_metadata(&mut doc, &metadata).unwrap();

        let read = read_metadata(&doc);
        assert_eq!(read.title.as_deref(), Some("New title"));
        assert_eq!(read.producer.as_deref(), Some("Some producer"));
    }

    #[test]
    fn test_direct_info_is_hoisted() {
        let mut doc = flat_document("p", 1);
        doc.trailer.set(
            "Info",
            dictionary! { "Subject" => Object::string_literal("Direct") },
        );

        let metadata = Metadata {
            keywords: Some("a, b".to_string()),
            ..Default::default()
        };
        write_metadata(&mut doc, &metadata).unwrap();

        assert!(doc.trailer.get(b"Info").unwrap().as_reference().is_ok());
        let read = read_metadata(&doc);
        assert_eq!(read.subject.as_deref(), Some("Direct"));
        assert_eq!(read.keywords.as_deref(), Some("a, b"));
    }

    #[test]
    fn test_non_ascii_round_trips_as_utf16() {
        let mut doc = flat_document("p", 1);
        let metadata = Metadata {
            title: Some("Grüße, 世界".to_string()),
            ..Default::default()
        };
        write_metadata(&mut doc, &metadata).unwrap();

        assert!(info_bytes(&doc, b"Title").starts_with(&UTF16_BOM));
        assert_eq!(read_metadata(&doc).title.as_deref(), Some("Grüße, 世界"));
    }

    #[test]
    fn test_latin1_strings_are_decoded() {
        assert_eq!(decode_text(b"caf\xe9"), "café");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]), "AB");
    }

    #[test]
    fn test_piece_info_refreshes_mod_date() {
        let mut doc = flat_document("p", 1);
        let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(catalog_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("PieceInfo", dictionary! {});

        let metadata = Metadata {
            title: Some("Stamped".to_string()),
            ..Default::default()
        };
        write_metadata(&mut doc, &metadata).unwrap();

        let mod_date = read_metadata(&doc).mod_date.unwrap();
        assert!(mod_date.starts_with("D:"));
        assert!(mod_date.ends_with("+00'00'"));
        assert_eq!(mod_date.len(), "D:20240101120000+00'00'".len());
    }

    #[test]
    fn test_clear_metadata() {
        let mut doc = flat_document("p", 1);
        let metadata = Metadata {
            title: Some("Gone soon".to_string()),
            ..Default::default()
        };
        write_metadata(&mut doc, &metadata).unwrap();

        clear_metadata(&mut doc).unwrap();
        assert!(read_metadata(&doc).is_empty());

        // Nothing to clear is fine
        let mut empty = flat_document("p", 1);
        clear_metadata(&mut empty).unwrap();
    }

    #[test]
    fn test_unset_single_field() {
        let mut doc = flat_document("p", 1);
        let metadata = Metadata {
            title: Some("Kept".to_string()),
            author: Some("Removed".to_string()),
            ..Default::default()
        };
        write_metadata(&mut doc, &metadata).unwrap();

        let removed = unset_metadata_fields(&mut doc, &["Author", "Subject"]).unwrap();
        assert_eq!(removed, 1);

        let read = read_metadata(&doc);
        assert_eq!(read.title.as_deref(), Some("Kept"));
        assert!(read.author.is_none());
    }

    #[test]
    fn test_unset_on_direct_or_missing_info() {
        let mut doc = flat_document("p", 1);
        assert_eq!(unset_metadata_fields(&mut doc, &["Title"]).unwrap(), 0);

        doc.trailer.set(
            "Info",
            dictionary! { "Title" => Object::string_literal("Direct") },
        );
        assert_eq!(unset_metadata_fields(&mut doc, &["Title"]).unwrap(), 1);
        assert!(read_metadata(&doc).title.is_none());
    }

    #[test]
    fn test_info_that_is_not_a_dictionary() {
        let mut doc = flat_document("p", 1);
        doc.trailer.set("Info", Object::Integer(3));

        assert!(matches!(
            write_metadata(&mut doc, &Metadata::default()),
            Err(JuggleError::MetadataFailed { .. })
        ));
    }
}
