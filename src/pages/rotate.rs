//! Page rotation.

use log::debug;
use lopdf::{Document, Object};

use super::tree::{inherited_attribute, page_id, page_ids};
use crate::config::{PageRange, Rotation};
use crate::error::{JuggleError, Result};

/// Effective rotation of the page at 0-based `index`, in `0..360`.
///
/// The value may be inherited from an ancestor `Pages` node. Pages with no
/// `Rotate` anywhere above them are upright.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidPageIndex`] if there is no such page.
pub fn page_rotation(doc: &Document, index: usize) -> Result<i64> {
    let page = page_id(doc, index)?;
    let degrees = inherited_attribute(doc, page, b"Rotate")
        .and_then(|value| value.as_i64().ok())
        .unwrap_or(0);
    Ok(degrees.rem_euclid(360))
}

/// Set the rotation of the page at 0-based `index`.
///
/// The value is written on the page itself, overriding anything inherited.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidPageIndex`] if there is no such page.
pub fn set_page_rotation(doc: &mut Document, index: usize, rotation: Rotation) -> Result<()> {
    let page = page_id(doc, index)?;
    doc.get_object_mut(page)?
        .as_dict_mut()?
        .set("Rotate", Object::Integer(rotation.as_degrees()));
    Ok(())
}

/// Rotate a set of pages, or every page when `pages` is `None`.
///
/// With `relative` the rotation is added to each page's current rotation;
/// otherwise it replaces it. Returns the number of pages touched.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidPageRange`] if `pages` names pages past
/// the end of the document.
///
/// # Examples
///
/// ```no_run
/// # use pdfjuggle::config::{PageRange, Rotation};
/// # use pdfjuggle::pages::rotate_pages;
/// # use lopdf::Document;
/// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
/// // Turn the first two pages a quarter clockwise
/// let range = PageRange::parse("1-2")?;
/// rotate_pages(&mut doc, Rotation::Clockwise90, true, Some(&range))?;
/// # Ok(())
/// # }
/// ```
pub fn rotate_pages(
    doc: &mut Document,
    rotation: Rotation,
    relative: bool,
    pages: Option<&PageRange>,
) -> Result<usize> {
    let page_count = page_ids(doc).len();

    let indices: Vec<usize> = match pages {
        None => (0..page_count).collect(),
        Some(range) => {
            let total = u32::try_from(page_count).unwrap_or(u32::MAX);
            if range.exceeds(total) {
                return Err(JuggleError::InvalidPageRange {
                    range: range.as_str().to_string(),
                    total_pages: page_count,
                });
            }
            range
                .to_pages(total)
                .into_iter()
                .map(|number| number as usize - 1)
                .collect()
        }
    };

    for &index in &indices {
        let target = if relative {
            Rotation::from_relative_degrees(page_rotation(doc, index)? + rotation.as_degrees())?
        } else {
            rotation
        };
        set_page_rotation(doc, index, target)?;
    }

    debug!(
        "rotated {} page(s) {} {} degrees",
        indices.len(),
        if relative { "by" } else { "to" },
        rotation.as_degrees()
    );
    Ok(indices.len())
}
