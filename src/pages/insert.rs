//! Inserting the pages of one document into another.

use log::debug;
use lopdf::{Document, Object};

use super::tree::{
    adjust_count, ancestors, inherited_attribute, kid_index, kids, kids_mut, page_count, page_id,
    parent_of, root_pages_id,
};
use crate::config::InsertPosition;
use crate::copy::{ObjectHandle, copy_object_single};
use crate::error::{JuggleError, Result};

/// Outcome of an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertStatistics {
    /// Pages added to the destination.
    pub pages_inserted: usize,
    /// Objects created in the destination by the copy.
    pub objects_copied: usize,
    /// 0-based index of the first inserted page.
    pub first_index: usize,
}

/// Insert every page of `src` into `dest`.
///
/// The source page tree is copied as a whole, so its inheritable
/// attributes (`MediaBox`, `Resources`, ...) keep applying to its pages.
/// The copied tree is attached as a new intermediate node: before the page
/// currently at `Before(index)`, or after the last page for
/// [`InsertPosition::End`] and indices past the end.
///
/// # Errors
///
/// Returns [`JuggleError::NoPages`] when `src` has no page tree or no
/// pages, and [`JuggleError::MalformedPageTree`] when the destination tree
/// cannot be edited.
///
/// # Examples
///
/// ```no_run
/// # use pdfjuggle::config::InsertPosition;
/// # use pdfjuggle::pages::insert_pages;
/// # use lopdf::Document;
/// # fn example(mut dest: Document, src: Document) -> pdfjuggle::Result<()> {
/// // Put the whole of `src` in front of the current second page
/// insert_pages(&mut dest, &src, InsertPosition::Before(1))?;
/// # Ok(())
/// # }
/// ```
pub fn insert_pages(dest: &mut Document, src: &Document, position: InsertPosition) -> Result<InsertStatistics> {
    let src_root = root_pages_id(src)?;
    let src_pages = page_count(src);
    if src_pages == 0 {
        return Err(JuggleError::NoPages);
    }

    let dest_root = root_pages_id(dest)
        .map_err(|_| JuggleError::malformed_page_tree("destination has no root Pages node"))?;
    let dest_pages = page_count(dest);

    let (parent, index, first_index) = match position {
        InsertPosition::Before(at) if at < dest_pages => {
            let page = page_id(dest, at)?;
            let parent = parent_of(dest, page).ok_or_else(|| {
                JuggleError::malformed_page_tree(format!("page {} has no Parent", at + 1))
            })?;
            (parent, kid_index(dest, parent, page)?, at)
        }
        _ => {
            let end = kids(dest, dest_root)?.len();
            (dest_root, end, dest_pages)
        }
    };

    let objects_before = dest.objects.len();
    let node = match copy_object_single(dest, src, ObjectHandle::from(src_root)) {
        Object::Reference(id) => id,
        _ => return Err(JuggleError::NoPages),
    };

    // The copied root becomes an intermediate node under `parent`.
    let shield_rotation = inherited_attribute(dest, parent, b"Rotate").is_some();
    {
        let dict = dest.get_object_mut(node)?.as_dict_mut()?;
        dict.set("Parent", parent);
        if shield_rotation && !dict.has(b"Rotate") {
            dict.set("Rotate", 0);
        }
    }

    kids_mut(dest, parent)?.insert(index, Object::Reference(node));

    let delta = src_pages as i64;
    adjust_count(dest, parent, delta)?;
    for ancestor in ancestors(dest, parent)? {
        adjust_count(dest, ancestor, delta)?;
    }

    let stats = InsertStatistics {
        pages_inserted: src_pages,
        objects_copied: dest.objects.len() - objects_before,
        first_index,
    };
    debug!(
        "inserted {} page(s) at index {} under {} {} R ({} objects copied)",
        stats.pages_inserted, stats.first_index, parent.0, parent.1, stats.objects_copied
    );

    Ok(stats)
}
