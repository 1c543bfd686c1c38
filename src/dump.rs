//! Readable dumps of single PDF objects.
//!
//! A dump is a sequence of [`DumpSegment`]s: formatted text, indirect
//! references kept apart so a caller can follow them, and a preview of the
//! decoded stream data when the object is a stream.
//!
//! # Examples
//!
//! ```
//! use lopdf::{dictionary, Document};
//! use pdfjuggle::dump::dump_object;
//!
//! let mut doc = Document::with_version("1.5");
//! let font = doc.add_object(dictionary! { "Type" => "Font" });
//! let page = doc.add_object(dictionary! { "Font" => font });
//!
//! let dump = dump_object(&doc, page).unwrap();
//! assert_eq!(dump.references().collect::<Vec<_>>(), vec![font]);
//! assert_eq!(dump.to_string(), format!("<<\n  /Font {} 0 R\n>>", font.0));
//! ```

use std::fmt::{self, Write};

use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::error::{JuggleError, Result};

/// Most decoded stream bytes kept in a dump.
pub const STREAM_PREVIEW_LIMIT: usize = 0x4000;

/// One piece of an [`ObjectDump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpSegment {
    /// Formatted object syntax.
    Text(String),
    /// An indirect reference.
    Reference(ObjectId),
    /// Decoded stream data, at most [`STREAM_PREVIEW_LIMIT`] bytes.
    Stream(Vec<u8>),
}

/// Formatted content of one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectDump {
    segments: Vec<DumpSegment>,
}

impl ObjectDump {
    /// Segments in output order.
    pub fn segments(&self) -> &[DumpSegment] {
        &self.segments
    }

    /// Every reference in the object, in the order they appear.
    pub fn references(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            DumpSegment::Reference(id) => Some(*id),
            _ => None,
        })
    }

    /// Decoded stream data, if the object is a stream.
    pub fn stream_preview(&self) -> Option<&[u8]> {
        self.segments.iter().find_map(|segment| match segment {
            DumpSegment::Stream(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
    }

    fn text(&mut self, text: &str) {
        match self.segments.last_mut() {
            Some(DumpSegment::Text(last)) => last.push_str(text),
            _ => self.segments.push(DumpSegment::Text(text.to_string())),
        }
    }

    fn object(&mut self, object: &Object, depth: usize) {
        match object {
            Object::Null => self.text("null"),
            Object::Boolean(value) => self.text(if *value { "true" } else { "false" }),
            Object::Integer(value) => self.text(&value.to_string()),
            Object::Real(value) => self.text(&value.to_string()),
            Object::Name(name) => self.text(&format_name(name)),
            Object::String(bytes, format) => self.text(&format_string(bytes, *format)),
            Object::Reference(id) => self.segments.push(DumpSegment::Reference(*id)),
            Object::Array(items) => {
                self.text("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.text(" ");
                    }
                    self.object(item, depth);
                }
                self.text("]");
            }
            Object::Dictionary(dict) => self.dictionary(dict, depth),
            Object::Stream(stream) => self.dictionary(&stream.dict, depth),
        }
    }

    fn dictionary(&mut self, dict: &Dictionary, depth: usize) {
        let indent = "  ".repeat(depth);
        self.text("<<\n");
        for (key, value) in dict.iter() {
            self.text(&format!("{indent}  {} ", format_name(key)));
            self.object(value, depth + 1);
            self.text("\n");
        }
        self.text(&format!("{indent}>>"));
    }
}

impl fmt::Display for ObjectDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                DumpSegment::Text(text) => f.write_str(text)?,
                DumpSegment::Reference((number, generation)) => {
                    write!(f, "{number} {generation} R")?;
                }
                DumpSegment::Stream(bytes) => {
                    write!(f, "\nstream\n{}\nendstream", String::from_utf8_lossy(bytes))?;
                }
            }
        }
        Ok(())
    }
}

/// Dump object `id` of `doc`.
///
/// Streams are followed by their decoded data, cut at
/// [`STREAM_PREVIEW_LIMIT`] bytes. Data that cannot be decoded is shown
/// as stored.
///
/// # Errors
///
/// Returns [`JuggleError::ObjectNotFound`] if `doc` has no such object.
pub fn dump_object(doc: &Document, id: ObjectId) -> Result<ObjectDump> {
    let object = doc.objects.get(&id).ok_or(JuggleError::ObjectNotFound {
        number: id.0,
        generation: id.1,
    })?;

    let mut dump = ObjectDump::default();
    dump.object(object, 0);

    if let Object::Stream(stream) = object {
        let mut data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        if data.len() > STREAM_PREVIEW_LIMIT {
            debug!(
                "stream {} {} R holds {} bytes, showing the first {STREAM_PREVIEW_LIMIT}",
                id.0,
                id.1,
                data.len()
            );
            data.truncate(STREAM_PREVIEW_LIMIT);
        }
        dump.segments.push(DumpSegment::Stream(data));
    }

    Ok(dump)
}

/// `/Name`, with delimiters and non-printable bytes written as `#xx`.
fn format_name(name: &[u8]) -> String {
    let mut out = String::from("/");
    for &byte in name {
        if byte.is_ascii_graphic() && !b"#/()<>[]{}%".contains(&byte) {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "#{byte:02X}");
        }
    }
    out
}

fn format_string(bytes: &[u8], format: StringFormat) -> String {
    match format {
        StringFormat::Hexadecimal => {
            let mut out = String::from("<");
            for byte in bytes {
                let _ = write!(out, "{byte:02X}");
            }
            out.push('>');
            out
        }
        StringFormat::Literal => {
            let mut out = String::from("(");
            for &byte in bytes {
                match byte {
                    b'(' | b')' | b'\\' => {
                        out.push('\\');
                        out.push(char::from(byte));
                    }
                    b'\n' => out.push_str("\\n"),
                    b'\r' => out.push_str("\\r"),
                    0x20..=0x7e => out.push(char::from(byte)),
                    _ => {
                        let _ = write!(out, "\\{byte:03o}");
                    }
                }
            }
            out.push(')');
            out
        }
    }
}
