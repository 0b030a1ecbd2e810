// src/processor.rs

use crate::config::Config;
use crate::costs::CostTable;
use crate::error::RunError;
use crate::ledger::Ledger;
use crate::pdf_extract::{self, PageReader, PdfPageReader};
use crate::report;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// Compared against the lowercased file name, so `.pdf` alone is a document.
const DOCUMENT_SUFFIX: &str = ".pdf";

/// What a run produced.
#[derive(Debug)]
pub enum RunOutcome<'a> {
    /// No document yielded any item; nothing was written.
    NothingProcessed,
    Written { path: PathBuf, ledger: Ledger<'a> },
}

/// Process every PDF in `config.data_dir` with the built-in cost table.
pub fn run(config: &Config) -> Result<RunOutcome<'static>, RunError> {
    run_with(&PdfPageReader, CostTable::builtin(), config)
}

/// Fold every document of the source directory into a ledger and write the
/// workbook. A bad document is skipped; only directory-level I/O fails the run.
pub fn run_with<'a, R: PageReader + ?Sized>(
    reader: &R,
    costs: &'a CostTable,
    config: &Config,
) -> Result<RunOutcome<'a>, RunError> {
    fs::create_dir_all(&config.output_dir).map_err(|source| RunError::CreateOutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let documents =
        list_documents(&config.data_dir).map_err(|source| RunError::ReadSourceDir {
            path: config.data_dir.clone(),
            source,
        })?;
    info!(dir = %config.data_dir.display(), count = documents.len(), "Documents to process");

    let mut ledger = Ledger::new(costs);

    for (document_id, path) in &documents {
        let span = tracing::info_span!("remision", id = %document_id);
        let _guard = span.enter();

        println!("Processing remision: {document_id}");
        let items = pdf_extract::extract_items(reader, path);

        match ledger.record_document(document_id, &items) {
            Some(summary) => {
                info!(
                    items = items.len(),
                    sales = summary.total_sales,
                    profit = summary.total_profit,
                    "Remision summarized"
                );
                println!(
                    "  - Total sales: {} COP | Profit: {} COP",
                    format_thousands(summary.total_sales),
                    format_thousands(summary.total_profit)
                );
            }
            None => {
                info!("No items found — skipped");
                let file_name = path.file_name().unwrap_or_default().to_string_lossy();
                println!("  - No items found in {file_name}. Skipped from the summary.");
            }
        }
    }

    if ledger.is_empty() {
        warn!("No remisiones processed");
        println!("No remisiones were processed. Check that the data folder contains PDFs.");
        return Ok(RunOutcome::NothingProcessed);
    }

    let path = config.output_path();
    report::write_report(&path, &ledger.to_sheets())?;

    let totals = ledger.totals();
    info!(
        documents = totals.document_count,
        sales = totals.total_sales,
        profit = totals.total_profit,
        unknown = ledger.unknown_products().len(),
        "Run complete"
    );

    println!("Excel file written to: {}", path.display());
    if !ledger.unknown_products().is_empty() {
        let names: Vec<&str> = ledger.unknown_products().iter().map(String::as_str).collect();
        println!(
            "Products without a cost (see sheet '{}'): {}",
            crate::ledger::PENDING_SHEET,
            names.join(", ")
        );
    }

    Ok(RunOutcome::Written { path, ledger })
}

/// PDF files of `dir` as `(document id, path)`, sorted by file name.
fn list_documents(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut documents = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_document = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().to_lowercase().ends_with(DOCUMENT_SUFFIX));
        if !is_document || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        documents.push((stem.to_string_lossy().into_owned(), path));
    }

    documents.sort_by(|(_, a), (_, b)| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

/// `41000` → `"41,000"`.
fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::ledger::{DETAIL_SHEET, PENDING_SHEET, SUMMARY_SHEET};
    use crate::sample_pdf;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use tempfile::TempDir;

    /// Reads fixtures as plain text, pages separated by form feed.
    struct TextPages;

    impl PageReader for TextPages {
        fn read_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
            let text = fs::read_to_string(path).map_err(|source| ExtractError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(text.split('\u{c}').map(str::to_string).collect())
        }
    }

    const REMISION: &str = "\
REMISION No. 17
Señor: Tienda Central
ITEM PRODUCTO PRECIO CANT DESC TOTAL
PRIV BAR $18.000 2 0 $36.000
\u{c}FOO $5.000 1 0 $5.000
TOTAL $41.000";

    const NO_ITEMS: &str = "Señor: nadie\nTOTAL $0\n";

    struct Fixture {
        _root: TempDir,
        config: Config,
    }

    fn fixture(files: &[(&str, &str)]) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let data_dir = root.path().join("data");
        fs::create_dir(&data_dir).unwrap();
        for (name, body) in files {
            fs::write(data_dir.join(name), body).unwrap();
        }
        let config = Config {
            data_dir,
            output_dir: root.path().join("output"),
            output_file: "resumen.xlsx".to_string(),
        };
        Fixture {
            _root: root,
            config,
        }
    }

    fn read_sheet(path: &Path, name: &str) -> Vec<Vec<Data>> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let range = workbook.worksheet_range(name).unwrap();
        range.rows().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(41000), "41,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-9000), "-9,000");
    }

    #[test]
    fn test_list_documents_filters_and_sorts() {
        let fx = fixture(&[
            ("b.pdf", ""),
            ("a.PDF", ""),
            ("notes.txt", ""),
            ("c.pdf.bak", ""),
            ("pdf", ""),
        ]);
        fs::create_dir(fx.config.data_dir.join("d.pdf")).unwrap();
        let docs = list_documents(&fx.config.data_dir).unwrap();
        let ids: Vec<&str> = docs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_bare_extension_is_a_document() {
        let fx = fixture(&[(".pdf", ""), ("x.Pdf", "")]);
        let docs = list_documents(&fx.config.data_dir).unwrap();
        let ids: Vec<&str> = docs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec![".pdf", "x"]);
    }

    #[test]
    fn test_single_document_totals() {
        let fx = fixture(&[("R-001.pdf", REMISION)]);
        let outcome = run_with(&TextPages, CostTable::builtin(), &fx.config).unwrap();

        let RunOutcome::Written { path, ledger } = outcome else {
            panic!("expected a written report");
        };
        assert_eq!(path, fx.config.output_path());

        let summary = &ledger.summaries()[0];
        assert_eq!(summary.document_id, "R-001");
        assert_eq!(summary.total_sales, 41000);
        assert_eq!(summary.total_profit, 9000);
        assert!(ledger.unknown_products().contains("FOO"));

        let pending = read_sheet(&path, PENDING_SHEET);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1][0], Data::String("FOO".into()));
    }

    #[test]
    fn test_two_documents_and_a_skipped_one() {
        let fx = fixture(&[
            ("R-001.pdf", REMISION),
            ("R-002.pdf", REMISION),
            ("R-003.pdf", NO_ITEMS),
        ]);
        let outcome = run_with(&TextPages, CostTable::builtin(), &fx.config).unwrap();
        let RunOutcome::Written { path, ledger } = outcome else {
            panic!("expected a written report");
        };

        assert_eq!(ledger.summaries().len(), 2);
        assert_eq!(ledger.details().len(), 4);
        assert!(ledger.details().iter().all(|d| d.document_id != "R-003"));

        let summary = read_sheet(&path, SUMMARY_SHEET);
        assert_eq!(summary.len(), 4); // header + 2 documents + TOTAL
        assert_eq!(summary[1][0], Data::String("R-001".into()));
        assert_eq!(summary[1][3], Data::String("FOO + PRIV BAR".into()));
        assert_eq!(summary[3][0], Data::String("TOTAL (2 remisiones)".into()));
        assert_eq!(summary[3][1], Data::Float(82000.0));
        assert_eq!(summary[3][2], Data::Float(18000.0));
        assert_eq!(summary[3][3], Data::String("2 remisiones".into()));

        let detail = read_sheet(&path, DETAIL_SHEET);
        assert_eq!(detail.len(), 5);
        assert_eq!(detail[0][7], Data::String("Ganancia_Item".into()));
        assert_eq!(detail[1][1], Data::String("PRIV BAR".into()));
        assert_eq!(detail[1][5], Data::Float(13500.0));
        assert_eq!(detail[2][1], Data::String("FOO".into()));
        assert_eq!(detail[2][5], Data::Empty);
        assert_eq!(detail[2][7], Data::Empty);
    }

    #[test]
    fn test_nothing_processed_writes_nothing() {
        let fx = fixture(&[("R-003.pdf", NO_ITEMS), ("readme.txt", REMISION)]);
        let outcome = run_with(&TextPages, CostTable::builtin(), &fx.config).unwrap();

        assert!(matches!(outcome, RunOutcome::NothingProcessed));
        assert!(fx.config.output_dir.is_dir());
        assert!(!fx.config.output_path().exists());
    }

    #[test]
    fn test_unreadable_document_does_not_abort() {
        let fx = fixture(&[("R-001.pdf", REMISION), ("R-002.pdf", "%PDF-1.4 junk")]);
        let outcome = run_with(&PdfPageReader, CostTable::builtin(), &fx.config).unwrap();
        // Neither fixture is a real PDF, so both are skipped.
        assert!(matches!(outcome, RunOutcome::NothingProcessed));
    }

    #[test]
    fn test_pdf_documents_end_to_end() {
        let fx = fixture(&[]);
        let row: &[&str] = &["PRIV BAR", "$18.000", "2", "0", "$36.000"];
        let header: &[&str] = &["PRODUCTO", "PRECIO", "CANT", "DESC", "TOTAL"];
        fs::write(
            fx.config.data_dir.join("R-001.pdf"),
            sample_pdf::document(&[&[header, row], &[&["FOO", "$5.000", "1", "0", "$5.000"]]]),
        )
        .unwrap();
        // pdf-extract panics on this one; the run must carry on.
        fs::write(
            fx.config.data_dir.join("R-002.pdf"),
            sample_pdf::without_media_box(&[&[row]]),
        )
        .unwrap();
        fs::write(fx.config.data_dir.join("R-003.pdf"), sample_pdf::scanned()).unwrap();

        let outcome = run_with(&PdfPageReader, CostTable::builtin(), &fx.config).unwrap();
        let RunOutcome::Written { path, ledger } = outcome else {
            panic!("expected a written report");
        };
        assert_eq!(ledger.summaries().len(), 1);
        assert_eq!(ledger.summaries()[0].total_sales, 41000);
        assert_eq!(ledger.summaries()[0].total_profit, 9000);

        let summary = read_sheet(&path, SUMMARY_SHEET);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[1][0], Data::String("R-001".into()));
        assert_eq!(summary[1][1], Data::Float(41000.0));

        let detail = read_sheet(&path, DETAIL_SHEET);
        assert_eq!(detail.len(), 3);
        assert_eq!(detail[1][1], Data::String("PRIV BAR".into()));
        assert_eq!(detail[2][1], Data::String("FOO".into()));

        let pending = read_sheet(&path, PENDING_SHEET);
        assert_eq!(pending[1][0], Data::String("FOO".into()));
    }

    #[test]
    fn test_missing_source_dir() {
        let fx = fixture(&[]);
        let config = Config {
            data_dir: fx.config.data_dir.join("missing"),
            ..fx.config.clone()
        };
        let result = run_with(&TextPages, CostTable::builtin(), &config);
        assert!(matches!(result, Err(RunError::ReadSourceDir { .. })));
    }

    #[test]
    fn test_rerun_is_identical() {
        let fx = fixture(&[("R-001.pdf", REMISION), ("R-002.pdf", REMISION)]);

        run_with(&TextPages, CostTable::builtin(), &fx.config).unwrap();
        let first = fs::read(fx.config.output_path()).unwrap();
        run_with(&TextPages, CostTable::builtin(), &fx.config).unwrap();
        let second = fs::read(fx.config.output_path()).unwrap();

        assert_eq!(first, second);
    }
}
