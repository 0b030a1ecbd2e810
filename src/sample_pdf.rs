// src/sample_pdf.rs
//
// Small PDFs built with lopdf for tests. Every cell is drawn as its own
// text object at an absolute position, the way invoice generators lay out
// table rows.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

const FONT_SIZE: i64 = 10;
const TOP: i64 = 760;
const LEFT: i64 = 40;
const ROW_HEIGHT: i64 = 18;
const CELL_WIDTH: i64 = 110;

/// A page is a list of rows, a row is a list of cells.
pub type Page<'a> = &'a [&'a [&'a str]];

/// A document with one page per entry of `pages`.
pub fn document(pages: &[Page<'_>]) -> Vec<u8> {
    build(pages, true, false)
}

/// Same as [`document`] but the pages carry no `MediaBox`.
pub fn without_media_box(pages: &[Page<'_>]) -> Vec<u8> {
    build(pages, false, false)
}

/// One page holding only an image, no fonts and no text.
pub fn scanned() -> Vec<u8> {
    build(&[], true, true)
}

fn build(pages: &[Page<'_>], media_box: bool, image_page: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = pages
        .iter()
        .map(|rows| {
            let resources = dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            };
            add_page(&mut doc, pages_id, text_content(rows), resources, media_box).into()
        })
        .collect();

    if image_page {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0x80],
        ));
        let resources = dictionary! {
            "XObject" => dictionary! { "Im1" => image_id },
        };
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("cm", vec![500.into(), 0.into(), 0.into(), 700.into(), 50.into(), 50.into()]),
                Operation::new("Do", vec!["Im1".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        kids.push(add_page(&mut doc, pages_id, content, resources, media_box).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize sample PDF");
    bytes
}

fn text_content(rows: &[&[&str]]) -> Content {
    let mut operations = Vec::new();
    for (row, cells) in rows.iter().enumerate() {
        let y = TOP - ROW_HEIGHT * row as i64;
        for (column, cell) in cells.iter().enumerate() {
            let x = LEFT + CELL_WIDTH * column as i64;
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(*cell)]),
                Operation::new("ET", vec![]),
            ]);
        }
    }
    Content { operations }
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    content: Content,
    resources: lopdf::Dictionary,
    media_box: bool,
) -> ObjectId {
    let stream = content.encode().expect("encode page content");
    let content_id = doc.add_object(Stream::new(dictionary! {}, stream));
    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
    };
    if media_box {
        let a4: Vec<Object> = vec![0.into(), 0.into(), 595.into(), 842.into()];
        page.set("MediaBox", a4);
    }
    doc.add_object(page)
}
