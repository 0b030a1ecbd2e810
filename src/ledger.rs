// src/ledger.rs

use crate::costs::CostTable;
use crate::heuristics::{LineItem, normalize_product_name};
use crate::report::{Cell, Sheet};
use std::collections::BTreeSet;
use tracing::debug;

pub const SUMMARY_SHEET: &str = "Resumen";
pub const DETAIL_SHEET: &str = "Detalle_Items";
pub const PENDING_SHEET: &str = "Pendientes";

const SUMMARY_COLUMNS: &[&str] = &[
    "Remision",
    "Total_Ventas_COP",
    "Total_Ganancias_COP",
    "Detalle_de_Items",
];

const DETAIL_COLUMNS: &[&str] = &[
    "Remision",
    "Producto",
    "Cantidad",
    "Precio_Venta_Unitario",
    "Total_Venta_Item",
    "Costo_Unitario",
    "Ganancia_Unidad",
    "Ganancia_Item",
];

const PENDING_COLUMNS: &[&str] = &["Producto_no_en_tabla_costos"];

/// One matched line, priced against the cost table.
///
/// The cost and profit fields are `None` together, exactly when the product
/// has no cost entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub document_id: String,
    /// Product name as printed on the document.
    pub product: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub line_total: i64,
    pub unit_cost: Option<i64>,
    pub unit_profit: Option<i64>,
    pub line_profit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub document_id: String,
    /// Sum of every line total.
    pub total_sales: i64,
    /// Sum of line profits with a known cost only.
    pub total_profit: i64,
    /// Sorted distinct normalized product names, joined with `" + "`.
    pub products: String,
}

/// Grand totals over every summarized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalsRow {
    pub document_count: usize,
    pub total_sales: i64,
    pub total_profit: i64,
}

impl TotalsRow {
    pub fn label(&self) -> String {
        format!("TOTAL ({} remisiones)", self.document_count)
    }

    pub fn items_note(&self) -> String {
        format!("{} remisiones", self.document_count)
    }
}

/// Accumulates summaries, detail records and unknown products across a run.
#[derive(Debug)]
pub struct Ledger<'a> {
    costs: &'a CostTable,
    summaries: Vec<DocumentSummary>,
    details: Vec<DetailRecord>,
    unknown: BTreeSet<String>,
}

impl<'a> Ledger<'a> {
    pub fn new(costs: &'a CostTable) -> Self {
        Self {
            costs,
            summaries: Vec::new(),
            details: Vec::new(),
            unknown: BTreeSet::new(),
        }
    }

    /// Price the items of one document and add them to the ledger.
    ///
    /// A document without items leaves no trace and returns `None`.
    pub fn record_document(
        &mut self,
        document_id: &str,
        items: &[LineItem],
    ) -> Option<&DocumentSummary> {
        if items.is_empty() {
            return None;
        }

        let mut total_sales: i64 = 0;
        let mut total_profit: i64 = 0;
        let mut products = BTreeSet::new();

        for item in items {
            let normalized = normalize_product_name(&item.product);
            let unit_cost = self.costs.unit_cost(&normalized);
            let unit_profit = unit_cost.map(|cost| item.unit_price.saturating_sub(cost));
            let line_profit = unit_profit.map(|profit| profit.saturating_mul(item.quantity));

            total_sales = total_sales.saturating_add(item.line_total);
            match line_profit {
                Some(profit) => total_profit = total_profit.saturating_add(profit),
                None => {
                    debug!(product = %normalized, "No cost entry");
                    self.unknown.insert(normalized.clone());
                }
            }
            products.insert(normalized);

            self.details.push(DetailRecord {
                document_id: document_id.to_string(),
                product: item.product.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total,
                unit_cost,
                unit_profit,
                line_profit,
            });
        }

        self.summaries.push(DocumentSummary {
            document_id: document_id.to_string(),
            total_sales,
            total_profit,
            products: products.into_iter().collect::<Vec<_>>().join(" + "),
        });
        self.summaries.last()
    }

    pub fn summaries(&self) -> &[DocumentSummary] {
        &self.summaries
    }

    pub fn details(&self) -> &[DetailRecord] {
        &self.details
    }

    /// Distinct normalized names without a cost entry, sorted.
    pub fn unknown_products(&self) -> &BTreeSet<String> {
        &self.unknown
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn totals(&self) -> TotalsRow {
        TotalsRow {
            document_count: self.summaries.len(),
            total_sales: self
                .summaries
                .iter()
                .fold(0i64, |acc, s| acc.saturating_add(s.total_sales)),
            total_profit: self
                .summaries
                .iter()
                .fold(0i64, |acc, s| acc.saturating_add(s.total_profit)),
        }
    }

    /// Report tables in sheet order; the pending sheet only when needed.
    pub fn to_sheets(&self) -> Vec<Sheet> {
        let mut summary = Sheet::new(SUMMARY_SHEET, SUMMARY_COLUMNS);
        for s in &self.summaries {
            summary.push_row(vec![
                s.document_id.as_str().into(),
                s.total_sales.into(),
                s.total_profit.into(),
                s.products.as_str().into(),
            ]);
        }
        let totals = self.totals();
        summary.push_row(vec![
            totals.label().into(),
            totals.total_sales.into(),
            totals.total_profit.into(),
            totals.items_note().into(),
        ]);

        let mut detail = Sheet::new(DETAIL_SHEET, DETAIL_COLUMNS);
        for d in &self.details {
            detail.push_row(vec![
                d.document_id.as_str().into(),
                d.product.as_str().into(),
                d.quantity.into(),
                d.unit_price.into(),
                d.line_total.into(),
                Cell::from(d.unit_cost),
                Cell::from(d.unit_profit),
                Cell::from(d.line_profit),
            ]);
        }

        let mut sheets = vec![summary, detail];

        if !self.unknown.is_empty() {
            let mut pending = Sheet::new(PENDING_SHEET, PENDING_COLUMNS);
            for name in &self.unknown {
                pending.push_row(vec![name.as_str().into()]);
            }
            sheets.push(pending);
        }

        sheets
    }
}
