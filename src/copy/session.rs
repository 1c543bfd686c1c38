//! Copy sessions and the public entry points of the engine.

use log::{debug, trace, warn};
use lopdf::Object;

use super::stream::relocate_stream;
use super::worklist::Worklist;
use super::{DestinationStore, IdentityMap, ObjectHandle, SourceStore};

/// Counters for one top-level copy call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CopyStats {
    pub(crate) objects_copied: usize,
    pub(crate) streams_relocated: usize,
    pub(crate) degraded: usize,
}

/// State of one top-level copy call.
///
/// Owns the worklist and borrows the campaign's identity map together with
/// both stores. Dropped, fully drained, before the call returns.
pub(crate) struct CopySession<'a, S: SourceStore, D: DestinationStore> {
    pub(crate) src: &'a S,
    pub(crate) dest: &'a mut D,
    pub(crate) identity: &'a mut IdentityMap,
    pub(crate) worklist: Worklist,
    pub(crate) stats: CopyStats,
}

impl<'a, S: SourceStore, D: DestinationStore> CopySession<'a, S, D> {
    pub(crate) fn new(dest: &'a mut D, src: &'a S, identity: &'a mut IdentityMap) -> Self {
        Self {
            src,
            dest,
            identity,
            worklist: Worklist::new(),
            stats: CopyStats::default(),
        }
    }

    /// Whether `handle` names an object that may exist in the source.
    pub(crate) fn in_range(&self, handle: ObjectHandle) -> bool {
        handle.number >= 1 && handle.number <= self.src.object_count()
    }

    /// Copy the bodies of every queued object until nothing is left.
    pub(crate) fn drain(&mut self) {
        let src = self.src;

        while let Some(handle) = self.worklist.pop() {
            let Some(target) = self.identity.get(handle.number) else {
                // Pushes always follow a mapping.
                continue;
            };

            let body = match src.load_object(handle) {
                Ok(body) => body,
                Err(err) => {
                    warn!("object {handle} could not be loaded, copied as null: {err}");
                    self.stats.degraded += 1;
                    continue;
                }
            };

            let copied = self.copy_value(body);
            self.dest.update_object(target, copied);
            self.stats.objects_copied += 1;
            trace!("copied object {handle} to {target} 0 R");

            if src.is_stream(handle) && relocate_stream(src, &mut *self.dest, handle, target) {
                self.stats.streams_relocated += 1;
            }
        }
    }

    fn finish(self) -> CopyStats {
        debug_assert!(self.worklist.is_empty());
        debug!(
            "copy session finished: {} object(s), {} stream(s), {} degraded",
            self.stats.objects_copied, self.stats.streams_relocated, self.stats.degraded
        );
        self.stats
    }
}

/// Copy `root` and everything it references from `src` into `dest`.
///
/// Uses a private [`IdentityMap`], so repeated calls never share objects.
/// Returns a reference to the copy of `root`, or `null` when `root` is not a
/// valid object number of `src`.
///
/// # Examples
///
/// ```
/// use lopdf::{dictionary, Document, Object};
/// use pdfjuggle::copy::{copy_object_single, ObjectHandle};
///
/// let mut src = Document::with_version("1.5");
/// let root = src.add_object(dictionary! { "Type" => "Example" });
/// let mut dest = Document::with_version("1.5");
///
/// let copied = copy_object_single(&mut dest, &src, ObjectHandle::from(root));
/// assert!(matches!(copied, Object::Reference(_)));
/// ```
pub fn copy_object_single<D, S>(dest: &mut D, src: &S, root: ObjectHandle) -> Object
where
    D: DestinationStore,
    S: SourceStore,
{
    let mut identity = IdentityMap::new();
    copy_object_continue(dest, src, root, &mut identity)
}

/// Copy `root` into `dest` as part of the campaign described by `identity`.
///
/// Objects already copied in this campaign are reused rather than copied
/// again; if `root` itself is already mapped nothing is copied at all.
pub fn copy_object_continue<D, S>(
    dest: &mut D,
    src: &S,
    root: ObjectHandle,
    identity: &mut IdentityMap,
) -> Object
where
    D: DestinationStore,
    S: SourceStore,
{
    if let Some(existing) = identity.get(root.number) {
        trace!("object {root} already copied to {existing} 0 R");
        return Object::Reference((existing, 0));
    }

    let mut session = CopySession::new(dest, src, identity);
    if !session.in_range(root) {
        warn!("root object {root} is outside the source document, copied as null");
        return Object::Null;
    }

    let target = session.dest.create_object();
    session.identity.insert(root.number, target);
    session.worklist.push(root);
    session.drain();
    session.finish();

    Object::Reference((target, 0))
}

/// Copy a value that has no object of its own in `src`.
///
/// The returned value is meant to be embedded directly in a destination
/// object. References inside it are resolved against `identity` and copied
/// like any other object of the campaign.
///
/// # Examples
///
/// ```
/// use lopdf::{dictionary, Document, Object};
/// use pdfjuggle::copy::{copy_unassigned_object_continue, IdentityMap};
///
/// let mut src = Document::with_version("1.5");
/// let font = src.add_object(dictionary! { "Type" => "Font" });
/// let resources = Object::Dictionary(dictionary! {
///     "Font" => dictionary! { "F1" => font },
/// });
///
/// let mut dest = Document::with_version("1.5");
/// let mut identity = IdentityMap::new();
/// let copied = copy_unassigned_object_continue(&mut dest, &src, &resources, &mut identity);
/// assert!(copied.as_dict().is_ok());
/// assert_eq!(identity.len(), 1);
/// ```
pub fn copy_unassigned_object_continue<D, S>(
    dest: &mut D,
    src: &S,
    value: &Object,
    identity: &mut IdentityMap,
) -> Object
where
    D: DestinationStore,
    S: SourceStore,
{
    let mut session = CopySession::new(dest, src, identity);
    let copied = session.copy_value(value);
    session.drain();
    session.finish();
    copied
}
