use log::warn;
use lopdf::{Dictionary, Object};

use super::session::CopySession;
use super::{DestinationStore, ObjectHandle, SourceStore};

impl<S: SourceStore, D: DestinationStore> CopySession<'_, S, D> {
    /// Produce the destination equivalent of a source value.
    ///
    /// Referenced objects are not copied here; they get a slot and are
    /// queued for the drain loop.
    pub(crate) fn copy_value(&mut self, value: &Object) -> Object {
        match value {
            Object::Reference(id) => self.resolve_reference(ObjectHandle::from(*id)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_value(item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            // The payload moves separately, see `relocate_stream`.
            Object::Stream(stream) => Object::Dictionary(self.copy_dictionary(&stream.dict)),
            scalar => scalar.clone(),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            copied.set(key.clone(), self.copy_value(value));
        }
        copied
    }

    fn resolve_reference(&mut self, handle: ObjectHandle) -> Object {
        if !self.in_range(handle) {
            warn!(
                "reference {handle} points outside the source document ({} objects), copied as null",
                self.src.object_count()
            );
            self.stats.degraded += 1;
            return Object::Null;
        }

        let mapped = match self.identity.get(handle.number) {
            Some(mapped) => mapped,
            None => {
                let slot = self.dest.create_object();
                self.identity.insert(handle.number, slot);
                self.worklist.push(handle);
                slot
            }
        };

        Object::Reference((mapped, 0))
    }
}
