//! End-to-end behaviour of the object graph copy engine.

use lopdf::{Document, Object, Stream, dictionary};
use pdfjuggle::copy::{
    IdentityMap, ObjectHandle, copy_object_continue, copy_object_single,
    copy_unassigned_object_continue,
};
use pdfjuggle::io::{PdfReader, PdfWriter};
use tempfile::TempDir;

use crate::common::{reference, source_with};

fn kids_and_stream_source() -> Document {
    source_with(vec![
        (
            1,
            Object::Dictionary(dictionary! {
                "Kids" => vec![Object::Reference((2, 0)), Object::Reference((3, 0))],
            }),
        ),
        (
            2,
            Object::Dictionary(dictionary! { "Parent" => Object::Reference((1, 0)) }),
        ),
        (
            3,
            Object::Stream(Stream::new(dictionary! {}, b"hello".to_vec())),
        ),
    ])
}

#[test]
fn test_copy_tree_with_back_reference_and_stream() {
    let src = kids_and_stream_source();
    let mut dest = Document::with_version("1.5");

    let root = reference(&copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0)));

    let kids = dest
        .get_dictionary(root)
        .unwrap()
        .get(b"Kids")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(kids.len(), 2);
    let child = reference(&kids[0]);
    let payload = reference(&kids[1]);
    assert_ne!(child, payload);
    assert_ne!(child, root);
    assert_eq!(dest.objects.len(), 3);

    let parent = dest.get_dictionary(child).unwrap().get(b"Parent").unwrap();
    assert_eq!(reference(parent), root);

    let stream = dest.get_object(payload).unwrap().as_stream().unwrap();
    assert_eq!(stream.content, b"hello");
    assert_eq!(stream.dict.get(b"Length").unwrap().as_i64().unwrap(), 5);
}

#[tokio::test]
async fn test_copied_payload_survives_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("copied.pdf");

    let src = kids_and_stream_source();
    let mut dest = Document::with_version("1.5");
    let root = copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0));

    let pages_id = dest.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = dest.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Copied" => root,
    });
    dest.trailer.set("Root", catalog_id);

    PdfWriter::new().save(&dest, &path).await.unwrap();
    let reloaded = PdfReader::allow_empty().load(&path).await.unwrap().document;

    let copied = reloaded.catalog().unwrap().get(b"Copied").unwrap();
    let kids = reloaded
        .get_dictionary(reference(copied))
        .unwrap()
        .get(b"Kids")
        .unwrap()
        .as_array()
        .unwrap();
    let stream = reloaded
        .get_object(reference(&kids[1]))
        .unwrap()
        .as_stream()
        .unwrap();
    assert_eq!(stream.content, b"hello");
}

#[test]
fn test_cycle_terminates() {
    let src = source_with(vec![
        (1, Object::Dictionary(dictionary! { "Next" => Object::Reference((2, 0)) })),
        (2, Object::Dictionary(dictionary! { "Next" => Object::Reference((1, 0)) })),
    ]);
    let mut dest = Document::with_version("1.5");

    let first = reference(&copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0)));
    assert_eq!(dest.objects.len(), 2);

    let second = reference(dest.get_dictionary(first).unwrap().get(b"Next").unwrap());
    let back = reference(dest.get_dictionary(second).unwrap().get(b"Next").unwrap());
    assert_eq!(back, first);
}

#[test]
fn test_self_reference() {
    let src = source_with(vec![(
        1,
        Object::Dictionary(dictionary! { "Me" => Object::Reference((1, 0)) }),
    )]);
    let mut dest = Document::with_version("1.5");

    let copy = reference(&copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0)));
    let me = reference(dest.get_dictionary(copy).unwrap().get(b"Me").unwrap());
    assert_eq!(me, copy);
    assert_eq!(dest.objects.len(), 1);
}

#[test]
fn test_order_is_preserved() {
    let src = source_with(vec![(
        1,
        Object::Dictionary(dictionary! {
            "Zebra" => 1,
            "Apple" => vec![Object::Integer(3), Object::Integer(1), Object::Integer(2)],
            "Mango" => true,
        }),
    )]);
    let mut dest = Document::with_version("1.5");

    let copy = reference(&copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0)));
    let dict = dest.get_dictionary(copy).unwrap();

    let keys: Vec<&[u8]> = dict.iter().map(|(key, _)| key.as_slice()).collect();
    assert_eq!(keys, vec![b"Zebra".as_slice(), b"Apple".as_slice(), b"Mango".as_slice()]);

    let values: Vec<i64> = dict
        .get(b"Apple")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(values, vec![3, 1, 2]);
}

#[test]
fn test_invalid_references_become_null() {
    let src = source_with(vec![
        (
            1,
            Object::Dictionary(dictionary! {
                "Zero" => Object::Reference((0, 0)),
                "Far" => Object::Reference((99, 0)),
                "Good" => Object::Reference((2, 0)),
            }),
        ),
        (2, Object::Dictionary(dictionary! { "Type" => "Leaf" })),
    ]);
    let mut dest = Document::with_version("1.5");

    let copy = reference(&copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0)));
    let dict = dest.get_dictionary(copy).unwrap();

    assert!(matches!(dict.get(b"Zero"), Ok(Object::Null)));
    assert!(matches!(dict.get(b"Far"), Ok(Object::Null)));
    let leaf = reference(dict.get(b"Good").unwrap());
    assert!(dest.get_dictionary(leaf).unwrap().has(b"Type"));
}

#[test]
fn test_campaign_copies_shared_object_once() {
    let src = source_with(vec![
        (1, Object::Dictionary(dictionary! { "Font" => Object::Reference((3, 0)) })),
        (2, Object::Dictionary(dictionary! { "Font" => Object::Reference((3, 0)) })),
        (3, Object::Dictionary(dictionary! { "Type" => "Font" })),
    ]);
    let mut dest = Document::with_version("1.5");
    let mut campaign = IdentityMap::new();

    let a = reference(&copy_object_continue(&mut dest, &src, ObjectHandle::new(1, 0), &mut campaign));
    let b = reference(&copy_object_continue(&mut dest, &src, ObjectHandle::new(2, 0), &mut campaign));
    assert_eq!(dest.objects.len(), 3);

    let font_a = reference(dest.get_dictionary(a).unwrap().get(b"Font").unwrap());
    let font_b = reference(dest.get_dictionary(b).unwrap().get(b"Font").unwrap());
    assert_eq!(font_a, font_b);

    // Asking again for an object of the campaign copies nothing
    let again = reference(&copy_object_continue(&mut dest, &src, ObjectHandle::new(1, 0), &mut campaign));
    assert_eq!(again, a);
    assert_eq!(dest.objects.len(), 3);
}

#[test]
fn test_unassigned_then_continue_share_destination() {
    let src = source_with(vec![(5, Object::Dictionary(dictionary! { "Type" => "Font" }))]);
    let mut dest = Document::with_version("1.5");
    let mut campaign = IdentityMap::new();

    let value = Object::Dictionary(dictionary! { "F" => Object::Reference((5, 0)) });
    let copied = copy_unassigned_object_continue(&mut dest, &src, &value, &mut campaign);
    let via_value = reference(copied.as_dict().unwrap().get(b"F").unwrap());

    let direct = reference(&copy_object_continue(&mut dest, &src, ObjectHandle::new(5, 0), &mut campaign));
    assert_eq!(direct, via_value);
    assert_eq!(dest.objects.len(), 1);
}

#[test]
fn test_separate_single_copies_duplicate() {
    let src = kids_and_stream_source();
    let mut dest = Document::with_version("1.5");

    let first = reference(&copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0)));
    let second = reference(&copy_object_single(&mut dest, &src, ObjectHandle::new(1, 0)));
    assert_ne!(first, second);
    assert_eq!(dest.objects.len(), 6);
}
