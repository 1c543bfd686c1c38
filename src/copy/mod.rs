//! Cross-document object graph copying.
//!
//! Deep-copies a PDF value, and everything it transitively references, from
//! one document's object space into another's:
//! - indirect references are remapped to freshly allocated destination objects
//! - objects reached more than once are copied once per [`IdentityMap`]
//! - cyclic reference graphs terminate
//! - stream payloads travel byte for byte, without re-encoding
//!
//! Copying never fails. References outside the source document become
//! `null`, unloadable objects leave a `null` slot behind and unreadable
//! payloads are skipped; each case is reported with `log::warn!`.
//!
//! # Entry points
//!
//! - [`copy_object_single`] copies one object graph with a private map.
//! - [`copy_object_continue`] copies an object within a campaign, reusing
//!   everything the campaign already copied.
//! - [`copy_unassigned_object_continue`] copies a direct value (such as a
//!   page's inline `Resources` dictionary) within a campaign.
//!
//! # Examples
//!
//! ```
//! use lopdf::{dictionary, Document, Object};
//! use pdfjuggle::copy::{copy_object_continue, IdentityMap, ObjectHandle};
//!
//! let mut src = Document::with_version("1.5");
//! let font = src.add_object(dictionary! { "Type" => "Font" });
//! let page_a = src.add_object(dictionary! { "Font" => font });
//! let page_b = src.add_object(dictionary! { "Font" => font });
//!
//! let mut dest = Document::with_version("1.5");
//! let mut campaign = IdentityMap::new();
//! copy_object_continue(&mut dest, &src, page_a.into(), &mut campaign);
//! copy_object_continue(&mut dest, &src, page_b.into(), &mut campaign);
//!
//! // Both pages share one copy of the font.
//! assert_eq!(dest.objects.len(), 3);
//! ```

mod identity;
mod session;
mod store;
mod stream;
mod value;
mod worklist;

use std::fmt;

use lopdf::ObjectId;

pub use identity::IdentityMap;
pub use session::{copy_object_continue, copy_object_single, copy_unassigned_object_continue};
pub use store::{DestinationStore, SourceStore};

/// Identifies an indirect object: object number and generation.
///
/// Valid object numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle {
    /// Object number.
    pub number: u32,
    /// Generation number.
    pub generation: u16,
}

impl ObjectHandle {
    /// Create a handle from its parts.
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    /// The equivalent `lopdf` object id.
    pub const fn id(self) -> ObjectId {
        (self.number, self.generation)
    }
}

impl From<ObjectId> for ObjectHandle {
    fn from((number, generation): ObjectId) -> Self {
        Self { number, generation }
    }
}

impl From<ObjectHandle> for ObjectId {
    fn from(handle: ObjectHandle) -> Self {
        handle.id()
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}
