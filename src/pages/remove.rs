//! Removing pages from a document.

use log::debug;
use lopdf::{Document, Object, ObjectId};

use super::tree::{
    adjust_count, ancestors, kid_index, kids, kids_mut, page_ids, parent_of, root_pages_id,
};
use crate::config::PageRange;
use crate::error::{JuggleError, Result};

/// Remove the page at 0-based `index`.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidPageIndex`] if there is no such page and
/// [`JuggleError::CannotRemoveAllPages`] if it is the only one.
pub fn remove_page(doc: &mut Document, index: usize) -> Result<()> {
    remove_page_span(doc, index, index).map(|_| ())
}

/// Remove the pages from `first` to `last` (0-based, inclusive).
///
/// Returns the number of pages removed.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidPageIndex`] for indices past the end or a
/// reversed span, and [`JuggleError::CannotRemoveAllPages`] when the span
/// covers the whole document.
pub fn remove_page_span(doc: &mut Document, first: usize, last: usize) -> Result<usize> {
    let pages = page_ids(doc);
    let page_count = pages.len();

    if last >= page_count || first > last {
        return Err(JuggleError::InvalidPageIndex {
            index: if first > last { first } else { last },
            page_count,
        });
    }

    if first == 0 && last == page_count - 1 {
        return Err(JuggleError::CannotRemoveAllPages);
    }

    remove_page_ids(doc, &pages[first..=last])
}

/// Remove every page selected by a 1-based [`PageRange`].
///
/// Returns the number of pages removed.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidPageRange`] if the range names pages past
/// the end, and [`JuggleError::CannotRemoveAllPages`] if it selects every page.
///
/// # Examples
///
/// ```no_run
/// # use pdfjuggle::config::PageRange;
/// # use pdfjuggle::pages::remove_pages;
/// # use lopdf::Document;
/// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
/// let removed = remove_pages(&mut doc, &PageRange::parse("2-3,7")?)?;
/// println!("removed {removed} page(s)");
/// # Ok(())
/// # }
/// ```
pub fn remove_pages(doc: &mut Document, range: &PageRange) -> Result<usize> {
    let pages = page_ids(doc);
    let total = u32::try_from(pages.len()).unwrap_or(u32::MAX);

    let selected = range.to_pages(total);
    if range.exceeds(total) || selected.is_empty() {
        return Err(JuggleError::InvalidPageRange {
            range: range.as_str().to_string(),
            total_pages: pages.len(),
        });
    }

    if selected.len() == pages.len() {
        return Err(JuggleError::CannotRemoveAllPages);
    }

    let doomed: Vec<ObjectId> = selected
        .iter()
        .map(|number| pages[*number as usize - 1])
        .collect();
    remove_page_ids(doc, &doomed)
}

fn remove_page_ids(doc: &mut Document, pages: &[ObjectId]) -> Result<usize> {
    let root = root_pages_id(doc)?;

    for page in pages {
        detach_page(doc, root, *page)?;
    }

    debug!("removed {} page(s)", pages.len());
    Ok(pages.len())
}

/// Unlink one page from the tree, fix every `Count` above it and drop
/// intermediate nodes that end up empty. The page object itself is left
/// for the writer to prune.
fn detach_page(doc: &mut Document, root: ObjectId, page: ObjectId) -> Result<()> {
    let parent = parent_of(doc, page).ok_or_else(|| {
        JuggleError::malformed_page_tree(format!("page {} {} R has no Parent", page.0, page.1))
    })?;
    let chain = ancestors(doc, page)?;

    let index = kid_index(doc, parent, page)?;
    kids_mut(doc, parent)?.remove(index);

    for node in &chain {
        adjust_count(doc, *node, -1)?;
    }

    let mut node = parent;
    while node != root && kids(doc, node)?.is_empty() {
        let Some(grandparent) = parent_of(doc, node) else {
            break;
        };
        let index = kid_index(doc, grandparent, node)?;
        kids_mut(doc, grandparent)?.remove(index);
        debug!("pruned empty Pages node {} {} R", node.0, node.1);
        node = grandparent;
    }

    if let Ok(dict) = doc.get_object_mut(page).and_then(Object::as_dict_mut) {
        dict.remove(b"Parent");
    }

    Ok(())
}
