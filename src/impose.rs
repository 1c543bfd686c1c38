//! N-up imposition.
//!
//! Lays the pages of a document out on new, larger sheets. Every source
//! page becomes a Form XObject; each sheet draws a grid of them, filled
//! row by row from the top-left cell. Pages are turned by their `Rotate`,
//! then scaled uniformly so their `TrimBox` (or `MediaBox`) fits the cell,
//! and centred in it. Drawing is clipped to the `BleedBox` when present.
//!
//! Resources are copied with one campaign-wide [`IdentityMap`], so a font
//! or image shared by many source pages appears once in the output.
//!
//! # Examples
//!
//! ```no_run
//! use pdfjuggle::config::ImposeLayout;
//! use pdfjuggle::impose::impose;
//! # use lopdf::Document;
//!
//! # fn example(src: Document) -> pdfjuggle::Result<()> {
//! let layout = ImposeLayout {
//!     columns: 2,
//!     rows: 2,
//!     ..Default::default()
//! };
//! let (sheets, stats) = impose(&src, &layout)?;
//! println!("{} pages on {} sheets", stats.pages_placed, stats.sheets);
//! # Ok(())
//! # }
//! ```

use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::config::ImposeLayout;
use crate::copy::{IdentityMap, copy_unassigned_object_continue};
use crate::error::{JuggleError, Result};
use crate::pages::{ancestors, inherited_attribute, page_ids};

/// Page box used when a page has no usable `MediaBox`.
const DEFAULT_MEDIA_BOX: PageBox = PageBox {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// Outcome of an imposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImposeStatistics {
    /// Sheets in the output document.
    pub sheets: usize,
    /// Source pages drawn onto sheets.
    pub pages_placed: usize,
    /// Source objects copied into the output.
    pub objects_copied: usize,
}

/// A page rectangle in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageBox {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl PageBox {
    fn from_array(values: &[Object]) -> Option<Self> {
        let [x0, y0, x1, y1] = values else {
            return None;
        };
        let (x0, y0, x1, y1) = (number(x0)?, number(y0)?, number(x1)?, number(y1)?);

        let page_box = Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        };
        page_box.is_usable().then_some(page_box)
    }

    fn is_usable(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Overlap of two boxes, `None` if they do not overlap.
    fn intersect(self, other: PageBox) -> Option<PageBox> {
        let overlap = PageBox {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        overlap.is_usable().then_some(overlap)
    }

    fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.x0),
            Object::Real(self.y0),
            Object::Real(self.x1),
            Object::Real(self.y1),
        ])
    }
}

/// How a source page is cut out and turned before it is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageGeometry {
    /// Box scaled into the cell and centred: `TrimBox`, else `MediaBox`.
    trim: PageBox,
    /// Box the drawn page is clipped to: `BleedBox`, else `MediaBox`.
    clip: PageBox,
    /// Clockwise display rotation: 0, 90, 180 or 270.
    rotate: i64,
}

impl PageGeometry {
    fn of(src: &Document, page: ObjectId) -> Self {
        let media = media_box(src, page);
        let page_box = |key: &[u8]| {
            own_box(src, page, key).and_then(|found| found.intersect(media))
        };

        Self {
            trim: page_box(b"TrimBox").unwrap_or(media),
            clip: page_box(b"BleedBox").unwrap_or(media),
            rotate: page_rotate(src, page),
        }
    }

    /// Width and height of the trim box as displayed.
    fn display_size(&self) -> (f32, f32) {
        match self.rotate {
            90 | 270 => (self.trim.height(), self.trim.width()),
            _ => (self.trim.width(), self.trim.height()),
        }
    }

    /// Matrix turning the page by `rotate` with the displayed trim box's
    /// lower-left corner at the origin.
    fn orientation(&self) -> [f32; 6] {
        let PageBox { x0, y0, x1, y1 } = self.trim;
        match self.rotate {
            90 => [0.0, -1.0, 1.0, 0.0, -y0, x1],
            180 => [-1.0, 0.0, 0.0, -1.0, x1, y1],
            270 => [0.0, 1.0, -1.0, 0.0, y1, -x0],
            _ => [1.0, 0.0, 0.0, 1.0, -x0, -y0],
        }
    }

    /// Full `cm` matrix drawing the page at `placed`.
    fn transform(&self, placed: Placement) -> [f32; 6] {
        let [a, b, c, d, e, f] = self.orientation();
        let s = placed.scale;
        [a * s, b * s, c * s, d * s, e * s + placed.x, f * s + placed.y]
    }
}

/// Where the displayed trim box lands on its sheet: uniform `scale`, lower
/// left corner at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    scale: f32,
    x: f32,
    y: f32,
}

/// Impose every page of `src` onto new sheets.
///
/// `src` is only read; the sheets are built in a fresh document.
///
/// # Errors
///
/// Returns [`JuggleError::InvalidConfig`] for an unusable layout,
/// [`JuggleError::NoPages`] when `src` has no pages, and
/// [`JuggleError::Pdf`] if a sheet's content cannot be encoded.
pub fn impose(src: &Document, layout: &ImposeLayout) -> Result<(Document, ImposeStatistics)> {
    layout
        .validate()
        .map_err(|e| JuggleError::invalid_config(format!("{e:#}")))?;

    let pages = page_ids(src);
    if pages.is_empty() {
        return Err(JuggleError::NoPages);
    }

    let mut output = Document::with_version(src.version.as_str());
    let pages_id = output.new_object_id();
    let mut identity = IdentityMap::new();
    let mut sheets = Vec::new();

    for chunk in pages.chunks(layout.cells_per_sheet()) {
        let sheet = build_sheet(&mut output, src, chunk, layout, pages_id, &mut identity)?;
        sheets.push(Object::Reference(sheet));
    }

    let stats = ImposeStatistics {
        sheets: sheets.len(),
        pages_placed: pages.len(),
        objects_copied: identity.len(),
    };

    output.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => Object::Integer(stats.sheets as i64),
            "Kids" => sheets,
        }),
    );
    let catalog_id = output.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    output.trailer.set("Root", catalog_id);

    debug!(
        "imposed {} page(s) {}x{} onto {} sheet(s), {} object(s) copied",
        stats.pages_placed, layout.columns, layout.rows, stats.sheets, stats.objects_copied
    );
    Ok((output, stats))
}

fn build_sheet(
    output: &mut Document,
    src: &Document,
    pages: &[ObjectId],
    layout: &ImposeLayout,
    parent: ObjectId,
    identity: &mut IdentityMap,
) -> Result<ObjectId> {
    let mut xobjects = Dictionary::new();
    let mut operations = Vec::new();

    for (slot, &page) in pages.iter().enumerate() {
        let geometry = PageGeometry::of(src, page);
        let form = page_form(output, src, page, geometry.clip, identity);
        let name = format!("P{slot}");
        xobjects.set(name.as_bytes(), form);

        let (width, height) = geometry.display_size();
        let matrix = geometry.transform(placement(layout, slot, width, height));
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            matrix.iter().map(|&value| Object::Real(value)).collect(),
        ));
        operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations }.encode()?;
    let content_id = output.add_object(Stream::new(dictionary! {}, content));

    Ok(output.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.sheet.width),
            Object::Real(layout.sheet.height),
        ],
        "Resources" => dictionary! { "XObject" => xobjects },
        "Contents" => content_id,
    }))
}

/// Wrap a source page as a Form XObject in `output`, clipped to `bbox`.
fn page_form(
    output: &mut Document,
    src: &Document,
    page: ObjectId,
    bbox: PageBox,
    identity: &mut IdentityMap,
) -> ObjectId {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "FormType" => 1,
        "BBox" => bbox.to_object(),
    };

    if let Some(resources) = raw_inherited(src, page, b"Resources") {
        dict.set(
            "Resources",
            copy_unassigned_object_continue(output, src, resources, identity),
        );
    }

    output.add_object(Stream::new(dict, page_content(src, page)))
}

/// Decoded content of a page, every content stream concatenated.
fn page_content(src: &Document, page: ObjectId) -> Vec<u8> {
    let contents = match src.get_dictionary(page).and_then(|dict| dict.get(b"Contents")) {
        Ok(Object::Reference(id)) => match src.get_object(*id) {
            Ok(Object::Array(parts)) => parts.clone(),
            Ok(_) => vec![Object::Reference(*id)],
            Err(_) => Vec::new(),
        },
        Ok(Object::Array(parts)) => parts.clone(),
        _ => Vec::new(),
    };

    let mut content = Vec::new();
    for part in &contents {
        let stream = part
            .as_reference()
            .and_then(|id| src.get_object(id))
            .and_then(Object::as_stream);
        match stream {
            Ok(stream) => {
                let bytes = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend_from_slice(&bytes);
            }
            Err(e) => warn!("skipping unreadable content stream of page {} {} R: {e}", page.0, page.1),
        }
    }
    content
}

/// Effective `MediaBox` of a page.
fn media_box(src: &Document, page: ObjectId) -> PageBox {
    inherited_attribute(src, page, b"MediaBox")
        .and_then(|value| value.as_array().ok())
        .and_then(|values| PageBox::from_array(values))
        .unwrap_or_else(|| {
            warn!("page {} {} R has no usable MediaBox, assuming US Letter", page.0, page.1);
            DEFAULT_MEDIA_BOX
        })
}

/// A non-inheritable page box such as `TrimBox`, read from the page itself.
fn own_box(src: &Document, page: ObjectId, key: &[u8]) -> Option<PageBox> {
    let value = match src.get_dictionary(page).ok()?.get(key).ok()? {
        Object::Reference(id) => src.get_object(*id).ok()?,
        direct => direct,
    };
    PageBox::from_array(value.as_array().ok()?)
}

/// Effective `Rotate` of a page, normalized to `0..360`.
fn page_rotate(src: &Document, page: ObjectId) -> i64 {
    let degrees = inherited_attribute(src, page, b"Rotate")
        .and_then(|value| value.as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360);

    if degrees % 90 != 0 {
        warn!("page {} {} R has Rotate {degrees}, drawing it upright", page.0, page.1);
        return 0;
    }
    degrees
}

/// Like [`inherited_attribute`], but returns the value as written so an
/// indirect `Resources` dictionary stays shared.
fn raw_inherited<'a>(src: &'a Document, page: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let chain = ancestors(src, page).unwrap_or_default();
    std::iter::once(page)
        .chain(chain)
        .find_map(|node| src.get_dictionary(node).ok()?.get(key).ok())
}

/// Cell placement for a page displayed `width` by `height`, filling the
/// grid row-major from the top-left.
fn placement(layout: &ImposeLayout, slot: usize, width: f32, height: f32) -> Placement {
    let columns = layout.columns as usize;
    let (column, row) = (slot % columns, slot / columns);

    let cell_width = (layout.sheet.width - 2.0 * layout.margin) / layout.columns as f32;
    let cell_height = (layout.sheet.height - 2.0 * layout.margin) / layout.rows as f32;
    let cell_x = layout.margin + column as f32 * cell_width;
    let cell_y = layout.margin + (layout.rows as usize - 1 - row) as f32 * cell_height;

    let scale = (cell_width / width).min(cell_height / height);

    Placement {
        scale,
        x: cell_x + (cell_width - width * scale) / 2.0,
        y: cell_y + (cell_height - height * scale) / 2.0,
    }
}

fn number(value: &Object) -> Option<f32> {
    match value {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
