//! Parsers for the `tb_base tb_dados` table rendered by the VitiBrasil pages.
//!
//! Only the rows of the table's first `<tbody>` are read; the header and the
//! `tb_total` footer never reach the parsers.

use crate::domain::model::{BilateralRecord, ItemRecord, Metadata, SubRecord};
use crate::parsers::number::parse_html_number;
use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};

const DATA_TABLE_SELECTOR: &str = "table.tb_base.tb_dados";
const ITEM_CLASS: &str = "tb_item";
const SUBITEM_CLASS: &str = "tb_subitem";

fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |element| element.value().name() == tag)
}

// 每個文字節點各自 trim 後再串接
fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

// 依原始書寫順序取第一個 class（`classes()` 會排序）
fn first_class<'a>(cell: &ElementRef<'a>) -> Option<&'a str> {
    cell.value().attr("class")?.split_whitespace().next()
}

fn data_table_rows(document: &Html) -> Result<Vec<ElementRef<'_>>> {
    let selector =
        Selector::parse(DATA_TABLE_SELECTOR).map_err(|e| EtlError::ProcessingError {
            message: format!("Invalid selector '{}': {:?}", DATA_TABLE_SELECTOR, e),
        })?;

    let Some(table) = document.select(&selector).next() else {
        tracing::warn!("Table not found in HTML content");
        return Ok(Vec::new());
    };

    let rows = child_elements(table, "tbody")
        .next()
        .map(|tbody| child_elements(tbody, "tr").collect())
        .unwrap_or_default();

    Ok(rows)
}

/// Parses an item / sub-item table (production, commercialization and
/// processing pages).
///
/// A `tb_item` row opens a new record; a row whose first two cells are both
/// `tb_subitem` is appended to the latest record. Sub-item rows seen before
/// any item are dropped, and every other row shape is skipped.
pub fn parse_item_table(html: &str, year: i32, metadata: &Metadata) -> Result<Vec<ItemRecord>> {
    tracing::info!("Request html");
    if html.is_empty() {
        return Ok(Vec::new());
    }

    let document = Html::parse_document(html);
    let mut results: Vec<ItemRecord> = Vec::new();

    for row in data_table_rows(&document)? {
        let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
        let Some(first) = cells.first() else {
            continue;
        };
        let quantity = cells.get(1).map(cell_text).unwrap_or_default();

        match first_class(first) {
            Some(ITEM_CLASS) => results.push(ItemRecord {
                item: cell_text(first),
                quantity: parse_html_number(&quantity),
                year,
                sub_items: Vec::new(),
                metadata: metadata.clone(),
            }),
            Some(SUBITEM_CLASS) if cells.get(1).and_then(first_class) == Some(SUBITEM_CLASS) => {
                match results.last_mut() {
                    Some(last) => last.sub_items.push(SubRecord {
                        name: cell_text(first),
                        quantity: parse_html_number(&quantity),
                    }),
                    None => tracing::debug!(
                        "Dropping sub-item '{}' with no preceding item",
                        cell_text(first)
                    ),
                }
            }
            _ => {}
        }
    }

    Ok(results)
}

/// Parses a country / quantity / amount table (import and export pages).
///
/// Every body row must carry at least three cells; a shorter row fails the
/// whole parse with [`EtlError::MalformedRow`].
pub fn parse_bilateral_table(
    html: &str,
    year: i32,
    metadata: &Metadata,
) -> Result<Vec<BilateralRecord>> {
    tracing::info!("Request html");
    if html.is_empty() {
        return Ok(Vec::new());
    }

    let document = Html::parse_document(html);
    let rows = data_table_rows(&document)?;
    let mut results = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
        let [country, quantity, amount, ..] = cells.as_slice() else {
            return Err(EtlError::MalformedRow {
                row: index + 1,
                reason: format!("expected at least 3 cells, found {}", cells.len()),
            });
        };

        results.push(BilateralRecord {
            country: cell_text(country),
            quantity: parse_html_number(&cell_text(quantity)),
            amount: parse_html_number(&cell_text(amount)),
            year,
            metadata: metadata.clone(),
        });
    }

    Ok(results)
}
