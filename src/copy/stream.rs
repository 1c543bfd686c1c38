use std::io::Read;

use log::{debug, warn};
use lopdf::Object;

use super::{DestinationStore, ObjectHandle, SourceStore};

/// Move the raw payload of source stream `handle` into destination slot
/// `target`, which already holds the copied dictionary.
///
/// Returns whether a payload was transferred. Bytes are transferred
/// undecoded and never more than the declared `Length`. When nothing can be
/// transferred the slot still becomes an empty stream.
pub(crate) fn relocate_stream<S, D>(src: &S, dest: &mut D, handle: ObjectHandle, target: u32) -> bool
where
    S: SourceStore,
    D: DestinationStore,
{
    let length = match declared_length(src, handle) {
        Some(length) if length > 0 => length,
        _ => {
            debug!("stream {handle} declares no payload, skipping relocation");
            dest.write_stream(target, Vec::new(), true);
            return false;
        }
    };

    let reader = match src.open_raw_stream(handle) {
        Ok(reader) => reader,
        Err(err) => {
            warn!("payload of stream {handle} could not be opened: {err}");
            dest.write_stream(target, Vec::new(), true);
            return false;
        }
    };

    let mut payload = Vec::with_capacity(length.min(64 * 1024) as usize);
    if let Err(err) = reader.take(length).read_to_end(&mut payload) {
        warn!("payload of stream {handle} could not be read: {err}");
        dest.write_stream(target, Vec::new(), true);
        return false;
    }

    if (payload.len() as u64) < length {
        debug!(
            "stream {handle} declares {length} bytes but holds {}",
            payload.len()
        );
    }

    dest.write_stream(target, payload, true);
    true
}

/// The stream's declared `Length`, following one indirect reference.
fn declared_length<S: SourceStore>(src: &S, handle: ObjectHandle) -> Option<u64> {
    let dict = match src.load_object(handle).ok()? {
        Object::Stream(stream) => &stream.dict,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    let length = match dict.get(b"Length").ok()? {
        Object::Reference(id) => src.load_object(ObjectHandle::from(*id)).ok()?,
        direct => direct,
    };

    match length {
        Object::Integer(n) => u64::try_from(*n).ok(),
        _ => None,
    }
}
