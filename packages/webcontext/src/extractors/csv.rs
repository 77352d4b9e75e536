//! CSV extraction: narrative summary plus chart data.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

use crate::chart::parse_numeric;
use crate::extractors::Extractor;
use crate::traits::fetcher::Fetcher;
use crate::types::{
    chart::{CellValue, ChartKind, ChartRow, ChartSpec},
    extraction::ExtractionResult,
};

/// Rows echoed in the narrative preview.
const PREVIEW_ROWS: usize = 5;

/// Rows above this render as a line chart.
const LINE_CHART_THRESHOLD: usize = 10;

/// Parses a CSV table into a narrative summary and a chart built from
/// its numeric columns.
pub struct CsvExtractor<F: Fetcher> {
    fetcher: Arc<F>,
}

impl<F: Fetcher> CsvExtractor<F> {
    /// Create a CSV extractor.
    pub fn new(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<F: Fetcher> Extractor for CsvExtractor<F> {
    async fn extract(&self, url: &str) -> ExtractionResult {
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => return ExtractionResult::failure(url, e),
        };
        let text = body.text();

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = match reader.headers() {
            Ok(headers) => headers.iter().map(|h| h.trim().to_string()).collect(),
            Err(e) => return ExtractionResult::failure(url, format!("malformed CSV ({e})")),
        };
        if headers.is_empty() {
            return ExtractionResult::failure(url, "CSV has no header row");
        }

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            match record {
                Ok(r) => records.push(r.iter().map(|c| c.trim().to_string()).collect()),
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "skipping unparseable CSV record");
                }
            }
        }
        if records.is_empty() {
            return ExtractionResult::failure(url, "CSV has no data rows");
        }

        let numeric_columns = classify_columns(&headers, &records);
        let label_column = headers
            .iter()
            .position(|h| !numeric_columns.contains(h))
            .unwrap_or(0);

        let mut content = format!(
            "CSV data from {url}\n{} records. Columns: {}.\n",
            records.len(),
            headers.join(", ")
        );
        content.push_str("First rows:\n");
        for record in records.iter().take(PREVIEW_ROWS) {
            let cells: Vec<String> = headers
                .iter()
                .zip(record)
                .map(|(h, v)| format!("{h}={v}"))
                .collect();
            content.push_str(&format!("- {}\n", cells.join(", ")));
        }

        let mut result = ExtractionResult::text(content);
        if let Some(chart) = build_chart(&headers, &records, &numeric_columns, label_column) {
            result = result.with_visualization(chart);
        }
        result
    }
}

/// A column is numeric only if every non-empty value in it parses as a
/// number.
fn classify_columns(headers: &[String], records: &[Vec<String>]) -> Vec<String> {
    let mut numeric = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        let mut saw_value = false;
        let all_numeric = records.iter().all(|r| match r.get(index) {
            Some(v) if !v.is_empty() => {
                saw_value = true;
                parse_numeric(v).is_some()
            }
            _ => true,
        });
        if all_numeric && saw_value {
            numeric.push(header.clone());
        }
    }
    numeric
}

fn build_chart(
    headers: &[String],
    records: &[Vec<String>],
    numeric_columns: &[String],
    label_column: usize,
) -> Option<ChartSpec> {
    if numeric_columns.is_empty() {
        return None;
    }
    let label_header = headers.get(label_column)?;

    let mut rows: Vec<ChartRow> = Vec::new();
    for record in records {
        let mut row: ChartRow = IndexMap::new();
        if let Some(label) = record.get(label_column) {
            if !numeric_columns.contains(label_header) {
                row.insert(label_header.clone(), CellValue::Text(label.clone()));
            }
        }
        for (index, header) in headers.iter().enumerate() {
            if !numeric_columns.contains(header) {
                continue;
            }
            if let Some(n) = record.get(index).and_then(|v| parse_numeric(v)) {
                row.insert(header.clone(), CellValue::Number(n));
            }
        }
        if row.values().any(CellValue::is_number) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn summarizes_and_charts_numeric_columns() {
        let fetcher = MockFetcher::new();
        fetcher.add_body(
            "https://data.test/sales.csv",
            "text/csv",
            b"region,revenue,units\nnorth,1200,30\nsouth,950,22\neast,1430,41".to_vec(),
        );

        let extractor = CsvExtractor::new(Arc::new(fetcher));
        let result = extractor.extract("https://data.test/sales.csv").await;

        assert!(result.content.contains("3 records"));
        assert!(result.content.contains("region, revenue, units"));
        assert!(result.content.contains("region=north"));

        let chart = result.visualization.unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.rows.len(), 3);
        assert_eq!(chart.rows[0]["region"], CellValue::Text("north".into()));
        assert_eq!(chart.rows[0]["revenue"].as_number(), Some(1200.0));
        assert_eq!(chart.rows[2]["units"].as_number(), Some(41.0));
    }

    #[tokio::test]
    async fn mixed_column_is_not_numeric() {
        let fetcher = MockFetcher::new();
        fetcher.add_body(
            "https://data.test/mixed.csv",
            "text/csv",
            b"name,score\nalice,10\nbob,unknown\ncarol,8".to_vec(),
        );

        let extractor = CsvExtractor::new(Arc::new(fetcher));
        let result = extractor.extract("https://data.test/mixed.csv").await;

        // "score" has a non-numeric value, so no column charts
        assert!(result.visualization.is_none());
        assert!(result.content.contains("3 records"));
    }

    #[tokio::test]
    async fn empty_csv_downgrades_to_failure_text() {
        let fetcher = MockFetcher::new();
        fetcher.add_body("https://data.test/empty.csv", "text/csv", b"a,b".to_vec());

        let extractor = CsvExtractor::new(Arc::new(fetcher));
        let result = extractor.extract("https://data.test/empty.csv").await;

        assert!(result.content.contains("empty.csv"));
        assert!(result.visualization.is_none());
    }

    #[tokio::test]
    async fn all_numeric_table_still_charts_with_first_column_as_label() {
        let fetcher = MockFetcher::new();
        fetcher.add_body(
            "https://data.test/xy.csv",
            "text/csv",
            b"x,y\n1,10\n2,20\n3,30".to_vec(),
        );

        let extractor = CsvExtractor::new(Arc::new(fetcher));
        let result = extractor.extract("https://data.test/xy.csv").await;

        let chart = result.visualization.unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.rows.len(), 3);
        assert_eq!(chart.rows[0]["x"].as_number(), Some(1.0));
        assert_eq!(chart.rows[0]["y"].as_number(), Some(10.0));
    }
}
