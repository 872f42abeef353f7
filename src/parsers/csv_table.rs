//! Parsers for the CSV extracts published by Embrapa.
//!
//! Both parsers produce the same record shapes as [`crate::parsers::html_table`]
//! so callers cannot tell which source a response came from.

use crate::domain::model::{BilateralRecord, ItemRecord, Metadata, SubRecord};
use crate::parsers::number::parse_csv_number;
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;

const CONTROL_COLUMN: &str = "control";
const COUNTRY_COLUMN: &str = "País";

fn csv_reader(data: &[u8], delimiter: u8) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(data)
}

// 重複欄名時取最後一欄
fn column_index(headers: &[String], column: &str) -> Result<usize> {
    headers
        .iter()
        .rposition(|header| header == column)
        .ok_or_else(|| EtlError::MissingColumn {
            column: column.to_string(),
        })
}

fn required_cell<'r>(row: &'r StringRecord, index: usize, column: &str, row_number: usize) -> Result<&'r str> {
    row.get(index).ok_or_else(|| EtlError::MalformedRow {
        row: row_number,
        reason: format!("missing value for column '{}'", column),
    })
}

/// Upper-case test used on the `control` column: at least one cased
/// character and no lower-case ones (`"VINHO DE MESA"` yes, `"vm_Tinto"` no).
fn is_upper(value: &str) -> bool {
    let mut cased = false;
    for c in value.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Parses an item / sub-item extract (production, commercialization,
/// processing).
///
/// Row classification uses the `control` column: upper-case or empty opens a
/// new item, a value containing `_` is a sub-item of the latest item. Names
/// come from `key_column`, quantities from the `"{year}"` column.
pub fn parse_item_csv(
    data: &[u8],
    year: i32,
    key_column: &str,
    delimiter: u8,
    metadata: &Metadata,
) -> Result<Vec<ItemRecord>> {
    tracing::info!("Request csv");

    let mut reader = csv_reader(data, delimiter);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let year_column = year.to_string();

    let control_index = column_index(&headers, CONTROL_COLUMN)?;
    let key_index = column_index(&headers, key_column)?;
    let year_index = column_index(&headers, &year_column)?;

    let mut results: Vec<ItemRecord> = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = index + 1;
        let control = required_cell(&row, control_index, CONTROL_COLUMN, row_number)?;
        let quantity = parse_csv_number(row.get(year_index).unwrap_or_default());

        if is_upper(control) || control.is_empty() {
            let name = required_cell(&row, key_index, key_column, row_number)?;
            results.push(ItemRecord {
                item: name.trim().to_string(),
                quantity,
                year,
                sub_items: Vec::new(),
                metadata: metadata.clone(),
            });
        } else if control.contains('_') {
            if let Some(last) = results.last_mut() {
                let name = required_cell(&row, key_index, key_column, row_number)?;
                last.sub_items.push(SubRecord {
                    name: name.trim().to_string(),
                    quantity,
                });
            }
        }
    }

    tracing::debug!("Parsed {} items from CSV", results.len());
    Ok(results)
}

/// Renames repeated header names: the first occurrence keeps its name, the
/// Nth becomes `name_N`. Order and count are preserved.
pub fn disambiguate_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut occurrences: HashMap<&'a str, usize> = HashMap::new();

    headers
        .into_iter()
        .map(|header| {
            let count = occurrences.entry(header).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{}_{}", header, count)
            } else {
                header.to_string()
            }
        })
        .collect()
}

fn parse_integer(value: &str, column: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| EtlError::InvalidNumber {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Parses an import / export extract.
///
/// These files repeat every year in the header, first for the quantity and
/// then for the amount, so `"{year}"` holds the quantity and `"{year}_2"` the
/// amount once headers are disambiguated. Numbers are plain integers; any
/// malformed value fails the parse.
pub fn parse_bilateral_csv(
    data: &[u8],
    year: i32,
    delimiter: u8,
    metadata: &Metadata,
) -> Result<Vec<BilateralRecord>> {
    tracing::info!("Request csv");

    let mut reader = csv_reader(data, delimiter);
    let headers = disambiguate_headers(reader.headers()?.iter());
    let quantity_column = year.to_string();
    let amount_column = format!("{}_2", year);

    let country_index = column_index(&headers, COUNTRY_COLUMN)?;
    let quantity_index = column_index(&headers, &quantity_column)?;
    let amount_index = column_index(&headers, &amount_column)?;

    let mut results = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = index + 1;
        let country = required_cell(&row, country_index, COUNTRY_COLUMN, row_number)?;
        let quantity = required_cell(&row, quantity_index, &quantity_column, row_number)?;
        let amount = required_cell(&row, amount_index, &amount_column, row_number)?;

        results.push(BilateralRecord {
            country: country.to_string(),
            quantity: parse_integer(quantity, &quantity_column)?,
            amount: parse_integer(amount, &amount_column)?,
            year,
            metadata: metadata.clone(),
        });
    }

    tracing::debug!("Parsed {} countries from CSV", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTION_CSV: &str = "id;control;produto;2022;2023\n\
1;VINHO DE MESA;VINHO DE MESA;195031611;169762429\n\
2;vm_Tinto;Tinto;162844214;139320884\n\
3;vm_Branco;  Branco ;30198430;27910299\n\
4;;Sem controle;1,234;5,678\n\
5;Outros;Ignorado;1;2\n";

    #[test]
    fn test_is_upper() {
        assert!(is_upper("VINHO DE MESA"));
        assert!(is_upper("SUCO_2"));
        assert!(!is_upper("vm_Tinto"));
        assert!(!is_upper(""));
        assert!(!is_upper("123"));
    }

    #[test]
    fn test_item_csv_classifies_rows() {
        let result =
            parse_item_csv(PRODUCTION_CSV.as_bytes(), 2023, "produto", b';', &Metadata::new()).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].item, "VINHO DE MESA");
        assert_eq!(result[0].quantity, 169762429);
        assert_eq!(result[0].year, 2023);
        assert_eq!(
            result[0].sub_items,
            vec![
                SubRecord {
                    name: "Tinto".to_string(),
                    quantity: 139320884
                },
                SubRecord {
                    name: "Branco".to_string(),
                    quantity: 27910299
                },
            ]
        );
        // control 為空也視為新項目，千分位為 ","
        assert_eq!(result[1].item, "Sem controle");
        assert_eq!(result[1].quantity, 5678);
    }

    #[test]
    fn test_item_csv_drops_orphan_subitems() {
        let data = "control\tcultivar\t2023\nti_Alicante\tAlicante\t10\nTINTAS\tTINTAS\t20\n";
        let result = parse_item_csv(data.as_bytes(), 2023, "cultivar", b'\t', &Metadata::new()).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item, "TINTAS");
        assert!(result[0].sub_items.is_empty());
    }

    #[test]
    fn test_item_csv_missing_year_column_is_fatal() {
        let err = parse_item_csv(PRODUCTION_CSV.as_bytes(), 1999, "produto", b';', &Metadata::new())
            .unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { column } if column == "1999"));
    }

    #[test]
    fn test_item_csv_short_row_is_fatal() {
        let missing_control = "id;control;produto;2023\n1;VINHO;VINHO;10\n2\n";
        let err = parse_item_csv(missing_control.as_bytes(), 2023, "produto", b';', &Metadata::new())
            .unwrap_err();
        assert!(matches!(err, EtlError::MalformedRow { row: 2, .. }));

        let missing_key = "id;control;produto;2023\n1;VINHO\n";
        let err = parse_item_csv(missing_key.as_bytes(), 2023, "produto", b';', &Metadata::new())
            .unwrap_err();
        assert!(matches!(err, EtlError::MalformedRow { row: 1, reason } if reason.contains("produto")));
    }

    #[test]
    fn test_item_csv_wrong_delimiter_is_fatal() {
        let err = parse_item_csv(PRODUCTION_CSV.as_bytes(), 2023, "produto", b'\t', &Metadata::new())
            .unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { .. }));
    }

    #[test]
    fn test_disambiguate_headers() {
        let headers = disambiguate_headers(["Id", "País", "2022", "2022", "2023", "2023", "2023"]);
        assert_eq!(
            headers,
            vec!["Id", "País", "2022", "2022_2", "2023", "2023_2", "2023_3"]
        );
    }

    #[test]
    fn test_bilateral_csv_reads_quantity_and_amount() {
        let data = "Id\tPaís\t2022\t2022\t2023\t2023\n\
1\tAfeganistão\t0\t0\t0\t0\n\
2\tÁfrica do Sul\t10\t20\t103\t1783\n";
        let metadata = Metadata::new().with("category", "vinhos-de-mesa");

        let result = parse_bilateral_csv(data.as_bytes(), 2023, b'\t', &metadata).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].country, "África do Sul");
        assert_eq!(result[1].quantity, 103);
        assert_eq!(result[1].amount, 1783);
        assert_eq!(result[1].year, 2023);
        assert_eq!(result[1].metadata, metadata);
    }

    #[test]
    fn test_bilateral_csv_malformed_number_is_fatal() {
        let data = "Id;País;2023;2023\n1;Chile;1,000;5\n";
        let err = parse_bilateral_csv(data.as_bytes(), 2023, b';', &Metadata::new()).unwrap_err();
        assert!(matches!(err, EtlError::InvalidNumber { value, .. } if value == "1,000"));
    }

    #[test]
    fn test_bilateral_csv_short_row_is_fatal() {
        let data = "Id;País;2023;2023\n1;Chile;10\n";
        let err = parse_bilateral_csv(data.as_bytes(), 2023, b';', &Metadata::new()).unwrap_err();
        assert!(matches!(err, EtlError::MalformedRow { row: 1, .. }));
    }
}
