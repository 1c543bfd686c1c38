//! Store capabilities the copy engine relies on.
//!
//! The engine never touches a document directly. It reads through
//! [`SourceStore`] and writes through [`DestinationStore`], both of which are
//! implemented for [`lopdf::Document`].

use std::io::Read;

use lopdf::{Dictionary, Document, Object, Stream};

use super::ObjectHandle;
use crate::error::{JuggleError, Result};

/// Read access to the document objects are copied from.
pub trait SourceStore {
    /// Highest object number that may be valid in this store.
    fn object_count(&self) -> u32;

    /// Load the body of an indirect object.
    ///
    /// # Errors
    ///
    /// Returns an error when no object with this number and generation
    /// exists. The engine treats this as a soft failure.
    fn load_object(&self, handle: ObjectHandle) -> Result<&Object>;

    /// Whether the object carries a byte payload.
    fn is_stream(&self, handle: ObjectHandle) -> bool;

    /// Open a reader over the object's payload exactly as stored, still
    /// encoded by whatever filters its dictionary names.
    fn open_raw_stream(&self, handle: ObjectHandle) -> Result<impl Read + '_>;
}

/// Write access to the document objects are copied into.
pub trait DestinationStore {
    /// Allocate a new indirect object holding `null` and return its number.
    fn create_object(&mut self) -> u32;

    /// Replace the value stored in slot `number`.
    fn update_object(&mut self, number: u32, value: Object);

    /// Attach a payload to slot `number`.
    ///
    /// With `already_filtered` set the bytes are stored as given and the
    /// store must not encode them again.
    fn write_stream(&mut self, number: u32, content: Vec<u8>, already_filtered: bool);
}

impl SourceStore for Document {
    fn object_count(&self) -> u32 {
        self.max_id
    }

    fn load_object(&self, handle: ObjectHandle) -> Result<&Object> {
        self.objects
            .get(&handle.id())
            .ok_or(JuggleError::Pdf(lopdf::Error::ObjectNotFound(handle.id())))
    }

    fn is_stream(&self, handle: ObjectHandle) -> bool {
        matches!(self.objects.get(&handle.id()), Some(Object::Stream(_)))
    }

    fn open_raw_stream(&self, handle: ObjectHandle) -> Result<impl Read + '_> {
        match self.objects.get(&handle.id()) {
            Some(Object::Stream(stream)) => Ok(stream.content.as_slice()),
            Some(_) => Err(JuggleError::other(format!(
                "object {handle} is not a stream"
            ))),
            None => Err(JuggleError::Pdf(lopdf::Error::ObjectNotFound(handle.id()))),
        }
    }
}

impl DestinationStore for Document {
    fn create_object(&mut self) -> u32 {
        let id = self.new_object_id();
        self.objects.insert(id, Object::Null);
        id.0
    }

    fn update_object(&mut self, number: u32, value: Object) {
        self.objects.insert((number, 0), value);
    }

    fn write_stream(&mut self, number: u32, content: Vec<u8>, already_filtered: bool) {
        let id = (number, 0);
        let dict = match self.objects.remove(&id) {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Stream(stream)) => stream.dict,
            _ => Dictionary::new(),
        };

        let stream = Stream::new(dict, content).with_compression(!already_filtered);
        self.objects.insert(id, Object::Stream(stream));
    }
}
