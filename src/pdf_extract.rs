// src/pdf_extract.rs

use crate::costs::CostTable;
use crate::error::ExtractError;
use crate::heuristics::{self, LineItem};
use lopdf::Document;
use serde::Serialize;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, info, warn};

/// Source of per-page text for a document on disk.
pub trait PageReader {
    /// Text of every page, in document order.
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError>;
}

/// Reads PDFs with pdf-extract, one text per page. lopdf only opens the
/// document first, to reject non-PDFs early and to spot scans.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfPageReader;

impl PageReader for PdfPageReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let bytes = fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        read_pdf_pages(&bytes)
    }
}

/// Split raw PDF bytes into page texts.
///
/// Image-only documents come back with no pages at all.
pub fn read_pdf_pages(pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let doc = Document::load_mem(pdf_bytes)?;

    if is_image_only(&doc) {
        warn!(pages = doc.get_pages().len(), "PDF has images but no fonts, skipping text extraction");
        return Ok(Vec::new());
    }

    let texts = layout_text_by_page(pdf_bytes)?;
    debug!(pages = texts.len(), "Read page text");
    Ok(texts)
}

/// pdf-extract keeps cells of a table row on one line, separated by spaces.
/// It also panics on some malformed input; that is turned into an error.
fn layout_text_by_page(pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractError::Text(e.to_string())),
        Err(_) => Err(ExtractError::Text("PDF text extraction panicked (malformed PDF)".to_string())),
    }
}

/// Every page places an image and none declares a font: a scan.
fn is_image_only(doc: &Document) -> bool {
    let pages = doc.get_pages();
    !pages.is_empty()
        && pages.values().all(|&page_id| {
            let has_images = doc.get_page_images(page_id).is_ok_and(|images| !images.is_empty());
            let has_fonts = doc.get_page_fonts(page_id).is_ok_and(|fonts| !fonts.is_empty());
            has_images && !has_fonts
        })
}

/// Extract the sale items of one document.
///
/// A document that cannot be opened or read yields no items; the failure is
/// reported and the caller moves on.
pub fn extract_items<R: PageReader + ?Sized>(reader: &R, path: &Path) -> Vec<LineItem> {
    match reader.read_pages(path) {
        Ok(pages) => {
            let items = heuristics::extract_items(&pages);
            info!(pages = pages.len(), items = items.len(), "Extracted items");
            items
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to process PDF");
            println!("Could not process PDF '{}': {e}", path.display());
            Vec::new()
        }
    }
}

#[derive(Debug, Serialize)]
struct InspectedItem<'a> {
    #[serde(flatten)]
    item: &'a LineItem,
    normalized: String,
    unit_cost: Option<i64>,
}

/// Dump what the pipeline sees in a single PDF.
///
/// Usage: `remision_profit inspect <file.pdf>`
pub fn inspect_pdf<R: PageReader + ?Sized>(
    reader: &R,
    path: &Path,
    costs: &CostTable,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %path.display(), "Inspecting single PDF");
    let pages = reader.read_pages(path)?;

    for (idx, page) in pages.iter().enumerate() {
        println!("\n--- Page {} ---", idx + 1);
        for line in page.lines() {
            let mark = if heuristics::is_item_line(line) { "+" } else { " " };
            println!("{mark} {line}");
        }
    }

    let items = heuristics::extract_items(&pages);
    let inspected: Vec<InspectedItem<'_>> = items
        .iter()
        .map(|item| {
            let normalized = heuristics::normalize_product_name(&item.product);
            let unit_cost = costs.unit_cost(&normalized);
            InspectedItem {
                item,
                normalized,
                unit_cost,
            }
        })
        .collect();

    println!("\n--- Items ({}) ---", inspected.len());
    println!("{}", serde_json::to_string_pretty(&inspected)?);
    println!("--- End ---\n");

    Ok(())
}
