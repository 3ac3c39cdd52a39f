use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::DocumentListing;
use crate::utils::error::{CheckinError, Result};

// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 28.0;
const LINE_HEIGHT: f32 = 28.0;
const FONT_SIZE: f32 = 12.0;
// Rough Helvetica advance, good enough to centre a title.
const AVERAGE_GLYPH_WIDTH: f32 = 0.5 * FONT_SIZE;

const PRODUCER: &str = "event-checkin";

fn pdf_error(e: impl std::fmt::Display) -> CheckinError {
    CheckinError::ExportError {
        format: "pdf",
        message: e.to_string(),
    }
}

/// Latin-1 bytes for the standard Helvetica font; anything else becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn text_at(x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_text(text))]),
        Operation::new("ET", vec![]),
    ]
}

fn baseline(line: usize) -> f32 {
    PAGE_HEIGHT - MARGIN - LINE_HEIGHT * (line as f32 + 1.0) + (LINE_HEIGHT - FONT_SIZE) / 2.0
}

fn page_operations(title: Option<&str>, lines: &[String]) -> Vec<Operation> {
    let mut operations = Vec::new();
    let mut line = 0;

    if let Some(title) = title {
        let width = title.chars().count() as f32 * AVERAGE_GLYPH_WIDTH;
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        operations.extend(text_at(x, baseline(line), title));
        line += 1;
    }

    for text in lines {
        operations.extend(text_at(MARGIN, baseline(line), text));
        line += 1;
    }

    operations
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<ObjectId> {
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(pdf_error)?,
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

pub fn render_pdf(listing: &DocumentListing, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(listing.page_count());
    for (index, lines) in listing.pages.iter().enumerate() {
        let title = (index == 0).then_some(listing.title.as_str());
        let page_id = add_page(&mut doc, pages_id, page_operations(title, lines))?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text(&listing.title)),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(
            generated_at.format("D:%Y%m%d%H%M%SZ").to_string()
        ),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(pdf_error)?;

    tracing::debug!(
        "Rendered {} page PDF ({} bytes)",
        listing.page_count(),
        bytes.len()
    );
    Ok(bytes)
}
