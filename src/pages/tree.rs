//! Page tree navigation.

use std::collections::BTreeSet;

use lopdf::{Document, Object, ObjectId};

use crate::error::{JuggleError, Result};

/// Number of pages reachable from the document catalog.
pub fn page_count(doc: &Document) -> usize {
    doc.get_pages().len()
}

/// Object id of the page at 0-based `index`.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidPageIndex`] when the index is past the end.
pub fn page_id(doc: &Document, index: usize) -> Result<ObjectId> {
    let pages = doc.get_pages();
    u32::try_from(index + 1)
        .ok()
        .and_then(|number| pages.get(&number).copied())
        .ok_or(JuggleError::InvalidPageIndex {
            index,
            page_count: pages.len(),
        })
}

/// Object ids of every page, in document order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// The root `Pages` node named by the catalog.
///
/// # Errors
///
/// Returns [`JuggleError::NoPages`] if the catalog has no indirect `Pages`
/// entry.
pub fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Pages").ok())
        .and_then(|pages| pages.as_reference().ok())
        .ok_or(JuggleError::NoPages)
}

/// The `Parent` of a page tree node, if it has one.
pub fn parent_of(doc: &Document, node: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(node)
        .ok()?
        .get(b"Parent")
        .ok()?
        .as_reference()
        .ok()
}

/// Every ancestor of `node`, nearest first, ending with the root.
///
/// # Errors
///
/// Returns [`JuggleError::MalformedPageTree`] if the `Parent` chain loops.
pub fn ancestors(doc: &Document, node: ObjectId) -> Result<Vec<ObjectId>> {
    let mut seen = BTreeSet::from([node]);
    let mut chain = Vec::new();
    let mut current = node;

    while let Some(parent) = parent_of(doc, current) {
        if !seen.insert(parent) {
            return Err(JuggleError::malformed_page_tree(format!(
                "Parent chain of {} {} R loops at {} {} R",
                node.0, node.1, parent.0, parent.1
            )));
        }
        chain.push(parent);
        current = parent;
    }

    Ok(chain)
}

/// Look up `key` on a page, falling back to its ancestors.
///
/// Indirect values are resolved. A looping `Parent` chain ends the search.
pub fn inherited_attribute<'a>(doc: &'a Document, node: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut seen = BTreeSet::new();
    let mut current = Some(node);

    while let Some(id) = current {
        if !seen.insert(id) {
            return None;
        }

        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(value) = dict.get(key) {
            return match value {
                Object::Reference(target) => doc.get_object(*target).ok(),
                direct => Some(direct),
            };
        }

        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

/// The `Kids` array of a `Pages` node.
pub(crate) fn kids(doc: &Document, node: ObjectId) -> Result<&Vec<Object>> {
    let malformed = || JuggleError::malformed_page_tree(format!("{} {} R has no Kids array", node.0, node.1));

    let value = match doc.get_dictionary(node)?.get(b"Kids").map_err(|_| malformed())? {
        Object::Reference(id) => doc.get_object(*id)?,
        direct => direct,
    };
    value.as_array().map_err(|_| malformed())
}

/// Mutable access to the `Kids` array of a `Pages` node.
pub(crate) fn kids_mut(doc: &mut Document, node: ObjectId) -> Result<&mut Vec<Object>> {
    let malformed = || JuggleError::malformed_page_tree(format!("{} {} R has no Kids array", node.0, node.1));

    let indirect = match doc.get_dictionary(node)?.get(b"Kids").map_err(|_| malformed())? {
        Object::Reference(id) => Some(*id),
        _ => None,
    };

    let value = match indirect {
        Some(id) => doc.get_object_mut(id)?,
        None => doc
            .get_object_mut(node)?
            .as_dict_mut()?
            .get_mut(b"Kids")
            .map_err(|_| malformed())?,
    };
    value.as_array_mut().map_err(|_| malformed())
}

/// Position of `child` within the `Kids` of `parent`.
pub(crate) fn kid_index(doc: &Document, parent: ObjectId, child: ObjectId) -> Result<usize> {
    kids(doc, parent)?
        .iter()
        .position(|kid| matches!(kid, Object::Reference(id) if *id == child))
        .ok_or_else(|| {
            JuggleError::malformed_page_tree(format!(
                "{} {} R is not among the Kids of its Parent {} {} R",
                child.0, child.1, parent.0, parent.1
            ))
        })
}

/// Add `delta` to the `Count` of `node`.
pub(crate) fn adjust_count(doc: &mut Document, node: ObjectId, delta: i64) -> Result<()> {
    let dict = doc.get_object_mut(node)?.as_dict_mut()?;
    let count = match dict.get(b"Count") {
        Ok(Object::Integer(count)) => *count,
        _ => {
            return Err(JuggleError::malformed_page_tree(format!(
                "{} {} R has no integer Count",
                node.0, node.1
            )));
        }
    };
    dict.set("Count", (count + delta).max(0));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::{flat_document, nested_document};
    use lopdf::dictionary;

    #[test]
    fn test_page_lookup() {
        let doc = flat_document("p", 3);
        assert_eq!(page_count(&doc), 3);
        assert!(page_id(&doc, 2).is_ok());
        assert!(matches!(
            page_id(&doc, 3),
            Err(JuggleError::InvalidPageIndex {
                index: 3,
                page_count: 3
            })
        ));
        assert_eq!(page_ids(&doc).len(), 3);
    }

    #[test]
    fn test_root_pages_missing() {
        let mut doc = Document::with_version("1.5");
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog" });
        doc.trailer.set("Root", catalog);
        assert!(matches!(root_pages_id(&doc), Err(JuggleError::NoPages)));
    }

    #[test]
    fn test_ancestors_of_nested_page() {
        let doc = nested_document();
        let root = root_pages_id(&doc).unwrap();
        let first = page_id(&doc, 0).unwrap();

        let chain = ancestors(&doc, first).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.last(), Some(&root));
    }

    #[test]
    fn test_ancestors_detects_cycle() {
        let mut doc = nested_document();
        let root = root_pages_id(&doc).unwrap();
        let first = page_id(&doc, 0).unwrap();
        let middle = parent_of(&doc, first).unwrap();
        doc.get_object_mut(root)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Parent", middle);

        assert!(matches!(
            ancestors(&doc, first),
            Err(JuggleError::MalformedPageTree { .. })
        ));
    }

    #[test]
    fn test_inherited_attribute() {
        let doc = nested_document();
        let first = page_id(&doc, 0).unwrap();
        let last = page_id(&doc, 2).unwrap();

        let rotate = inherited_attribute(&doc, first, b"Rotate").unwrap();
        assert_eq!(rotate.as_i64().unwrap(), 90);
        assert!(inherited_attribute(&doc, last, b"Rotate").is_none());
        assert!(inherited_attribute(&doc, last, b"MediaBox").is_some());
    }

    #[test]
    fn test_adjust_count() {
        let mut doc = flat_document("p", 2);
        let root = root_pages_id(&doc).unwrap();
        adjust_count(&mut doc, root, 3).unwrap();
        let count = doc.get_dictionary(root).unwrap().get(b"Count").unwrap();
        assert_eq!(count.as_i64().unwrap(), 5);
    }
}
