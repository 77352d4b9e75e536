//! Heuristic chart-data detection.
//!
//! Inspects extracted text for delimiter-separated tabular structure
//! and, when found, emits a [`ChartSpec`] for downstream rendering.
//! The heuristic is deterministic: same input, same answer.

use indexmap::IndexMap;

use crate::types::chart::{CellValue, ChartKind, ChartRow, ChartSpec};

/// Delimiters tried against the header line, in preference order.
const DELIMITERS: [char; 3] = [',', '\t', '|'];

/// Rows above this render better as a line chart than as bars.
const LINE_CHART_THRESHOLD: usize = 10;

/// Detect tabular structure in free text.
///
/// The header is the first line that splits into at least two columns;
/// leading prose (source headers, summaries) is skipped. Requires at
/// least two data rows whose column count matches the header; a data
/// row is kept only if at least one cell coerces to a number.
pub fn detect(text: &str) -> Option<ChartSpec> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 3 {
        return None;
    }

    let (header_index, delimiter) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| best_delimiter(line).map(|d| (i, d)))?;
    let columns: Vec<String> = lines[header_index]
        .split(delimiter)
        .map(|c| c.trim().to_string())
        .collect();

    let mut rows: Vec<ChartRow> = Vec::new();
    for line in &lines[header_index + 1..] {
        let cells: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        if cells.len() != columns.len() {
            continue;
        }

        let mut row: ChartRow = IndexMap::new();
        let mut numeric_cells = 0;
        for (name, raw) in columns.iter().zip(&cells) {
            let value = match parse_numeric(raw) {
                Some(n) => {
                    numeric_cells += 1;
                    CellValue::Number(n)
                }
                None => CellValue::Text((*raw).to_string()),
            };
            row.insert(name.clone(), value);
        }

        if numeric_cells > 0 {
            rows.push(row);
        }
    }

    if rows.len() < 2 {
        return None;
    }

    let kind = if rows.len() > LINE_CHART_THRESHOLD {
        ChartKind::Line
    } else {
        ChartKind::Bar
    };

    Some(ChartSpec::new(kind, rows))
}

/// Pick the delimiter that splits the header into the most columns.
/// A single column is not tabular, so at least two are required.
fn best_delimiter(header: &str) -> Option<char> {
    let mut best: Option<(char, usize)> = None;
    for d in DELIMITERS {
        let count = header.split(d).count();
        if count > best.map_or(1, |(_, c)| c) {
            best = Some((d, count));
        }
    }
    best.map(|(d, _)| d)
}

/// Coerce a cell to a number, tolerating common decorations: currency
/// symbols, thousands separators, and percent signs.
pub(crate) fn parse_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(['$', '€', '£', '¥'])
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != ' ')
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(row: &ChartRow, key: &str) -> f64 {
        row[key].as_number().expect("numeric cell")
    }

    #[test]
    fn fewer_than_three_lines_is_never_a_chart() {
        assert!(detect("").is_none());
        assert!(detect("a,b").is_none());
        assert!(detect("a,b\n1,2").is_none());
        assert!(detect("just some prose\nand another line").is_none());
    }

    #[test]
    fn simple_comma_table_becomes_a_bar_chart() {
        let spec = detect("a,b\n1,2\n3,4").unwrap();

        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.rows.len(), 2);
        assert_eq!(number(&spec.rows[0], "a"), 1.0);
        assert_eq!(number(&spec.rows[0], "b"), 2.0);
        assert_eq!(number(&spec.rows[1], "a"), 3.0);
        assert_eq!(number(&spec.rows[1], "b"), 4.0);
    }

    #[test]
    fn more_than_ten_rows_becomes_a_line_chart() {
        let mut text = String::from("day,value\n");
        for i in 0..11 {
            text.push_str(&format!("{i},{}\n", i * 10));
        }
        let spec = detect(&text).unwrap();
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.rows.len(), 11);
    }

    #[test]
    fn pipe_and_tab_delimiters_are_detected() {
        let spec = detect("name|count\nalpha|3\nbeta|5").unwrap();
        assert_eq!(spec.rows.len(), 2);
        assert_eq!(number(&spec.rows[1], "count"), 5.0);

        let spec = detect("name\tcount\nalpha\t3\nbeta\t5").unwrap();
        assert_eq!(spec.rows.len(), 2);
    }

    #[test]
    fn mismatched_and_non_numeric_rows_are_skipped() {
        let text = "city,pop\noslo,700000\nshort line\nbergen,plenty\ntromso,77000";
        let spec = detect(text).unwrap();
        // "short line" has the wrong column count, "bergen,plenty" has
        // no numeric cell
        assert_eq!(spec.rows.len(), 2);
    }

    #[test]
    fn numeric_decorations_are_stripped() {
        let spec = detect("quarter,revenue\nQ1,$1200\nQ2,95%").unwrap();
        assert_eq!(number(&spec.rows[0], "revenue"), 1200.0);
        assert_eq!(number(&spec.rows[1], "revenue"), 95.0);

        assert_eq!(parse_numeric("1 234"), Some(1234.0));
        assert_eq!(parse_numeric("£2,500"), Some(2500.0));
        assert_eq!(parse_numeric("n/a"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn table_after_leading_prose_is_found() {
        let text = "Source: https://example.com/report\nNumbers below.\nmonth,total\njan,10\nfeb,12";
        let spec = detect(text).unwrap();
        assert_eq!(spec.rows.len(), 2);
        assert_eq!(number(&spec.rows[0], "total"), 10.0);
        assert_eq!(number(&spec.rows[1], "total"), 12.0);
    }

    #[test]
    fn prose_with_single_column_is_rejected() {
        assert!(detect("heading\n2020\n2021\n2022").is_none());
    }
}
