//! Aggregation of persisted records into tabular outputs

use crate::field_converter::FieldConverter;
use crate::{load_intermediate_folder, StoreError};
use ipsummary_domain::Direction;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fixed metadata columns leading every aggregated row
const META_COLUMNS: [&str; 4] = ["合同源文件", "合同方向", "LLM置信度", "LLM判定理由"];

/// UTF-8 byte-order mark; spreadsheet applications need it to detect the
/// encoding of CJK CSV content
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// A rectangular result table.
///
/// The column set is always the four metadata columns plus the configured
/// header list, never inferred from the data, so table width is stable
/// across runs even as individual records gain or lose fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names, in output order
    pub columns: Vec<String>,
    /// One row per record; cells align with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    fn render_cell(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn write_csv_to(&self, mut out: impl std::io::Write, with_bom: bool) -> Result<(), StoreError> {
        if with_bom {
            out.write_all(UTF8_BOM)?;
        }
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| Self::render_cell(v)))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table as CSV, optionally BOM-prefixed
    pub fn write_csv(&self, path: &Path, with_bom: bool) -> Result<(), StoreError> {
        let file = fs::File::create(path)?;
        self.write_csv_to(file, with_bom)
    }
}

/// Paths of the rendered outputs
#[derive(Debug, Clone)]
pub struct TabularOutputs {
    /// Plain UTF-8 CSV
    pub csv: PathBuf,
    /// BOM-prefixed CSV for spreadsheet applications
    pub excel: PathBuf,
}

fn collect_rows<F>(
    intermediate_dir: &Path,
    headers: &[String],
    direction: Direction,
    mut cell: F,
) -> Result<Table, StoreError>
where
    F: FnMut(&str, &Value) -> Value,
{
    let folder = intermediate_dir.join(direction.as_str());
    let results = load_intermediate_folder(&folder, direction)?;
    info!(
        count = results.len(),
        direction = %direction,
        "aggregating stored records"
    );

    let mut columns: Vec<String> = META_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(headers.iter().cloned());

    let mut rows = Vec::with_capacity(results.len());
    for res in &results {
        let mut row: Vec<Value> = vec![
            Value::String(res.contract_path.display().to_string()),
            Value::String(direction.as_str().to_string()),
            serde_json::Number::from_f64(res.classification.confidence)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Value::String(res.classification.reason.clone()),
        ];
        for header in headers {
            let value = res.fields.get(header).unwrap_or(&Value::Null);
            row.push(cell(header, value));
        }
        rows.push(row);
    }
    Ok(Table { columns, rows })
}

/// Assemble one direction's stored records into a table.
///
/// Rows come out in stored-file-name order; each row is the four metadata
/// columns followed by one cell per header (null when the record lacks it).
pub fn aggregate_results(
    intermediate_dir: &Path,
    headers: &[String],
    direction: Direction,
) -> Result<Table, StoreError> {
    collect_rows(intermediate_dir, headers, direction, |_, value| value.clone())
}

/// Like [`aggregate_results`], but passes every field value through the
/// text→code converter for database ingestion.
pub fn aggregate_for_database(
    intermediate_dir: &Path,
    headers: &[String],
    direction: Direction,
    converter: &FieldConverter,
) -> Result<Table, StoreError> {
    collect_rows(intermediate_dir, headers, direction, |header, value| {
        converter.convert(header, value)
    })
}

/// Render a table as `{basename}.csv` and `{basename}_excel.csv`
pub fn write_tabular_outputs(
    table: &Table,
    output_dir: &Path,
    basename: &str,
) -> Result<TabularOutputs, StoreError> {
    fs::create_dir_all(output_dir)?;
    let csv_path = output_dir.join(format!("{basename}.csv"));
    let excel_path = output_dir.join(format!("{basename}_excel.csv"));
    table.write_csv(&csv_path, false)?;
    table.write_csv(&excel_path, true)?;
    Ok(TabularOutputs {
        csv: csv_path,
        excel: excel_path,
    })
}

/// Render a code-converted table as `{basename}_db.csv` and
/// `{basename}_db_excel.csv`
pub fn write_database_outputs(
    table: &Table,
    output_dir: &Path,
    basename: &str,
) -> Result<TabularOutputs, StoreError> {
    write_tabular_outputs(table, output_dir, &format!("{basename}_db"))
}

/// Append a table to the cumulative history log.
///
/// Creates the file (with header row) on first use; afterwards only data
/// rows are appended. Repeated aggregation of the same batch appends
/// duplicate rows: the history is a log, not a set.
pub fn append_history(table: &Table, history_file: &Path) -> Result<(), StoreError> {
    if let Some(parent) = history_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let exists = history_file.exists();
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(history_file)?;
    let mut writer = csv::Writer::from_writer(file);
    if !exists {
        writer.write_record(&table.columns)?;
    }
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| Table::render_cell(v)))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save_intermediate;
    use crate::tests::sample_result;

    fn headers() -> Vec<String> {
        vec!["作品名称".to_string(), "合同类型".to_string(), "签约日期".to_string()]
    }

    #[test]
    fn table_width_comes_from_headers_not_data() {
        let dir = tempfile::tempdir().unwrap();
        save_intermediate(&sample_result("x", Direction::Upstream), dir.path()).unwrap();

        let table = aggregate_results(dir.path(), &headers(), Direction::Upstream).unwrap();
        assert_eq!(table.columns.len(), 4 + 3);
        assert_eq!(table.rows.len(), 1);
        // "签约日期" is absent from the stored record: it must still occupy a cell.
        assert_eq!(table.rows[0].len(), 7);
        assert_eq!(table.rows[0][6], Value::Null);
        assert_eq!(table.rows[0][4], Value::String("示例作品".to_string()));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for stem in ["b", "a", "c"] {
            save_intermediate(&sample_result(stem, Direction::Upstream), dir.path()).unwrap();
        }

        let first = aggregate_results(dir.path(), &headers(), Direction::Upstream).unwrap();
        let second = aggregate_results(dir.path(), &headers(), Direction::Upstream).unwrap();
        assert_eq!(first, second);

        let sources: Vec<String> = first
            .rows
            .iter()
            .map(|row| match &row[0] {
                Value::String(s) => s.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(sources, ["input/a.txt", "input/b.txt", "input/c.txt"]);
    }

    #[test]
    fn outputs_include_bom_variant() {
        let dir = tempfile::tempdir().unwrap();
        save_intermediate(&sample_result("x", Direction::Upstream), dir.path()).unwrap();
        let table = aggregate_results(dir.path(), &headers(), Direction::Upstream).unwrap();

        let out = dir.path().join("final");
        let outputs = write_tabular_outputs(&table, &out, "upstream_20240101").unwrap();
        let plain = fs::read(&outputs.csv).unwrap();
        let excel = fs::read(&outputs.excel).unwrap();
        assert!(!plain.starts_with(UTF8_BOM));
        assert!(excel.starts_with(UTF8_BOM));
        assert_eq!(&excel[UTF8_BOM.len()..], &plain[..]);
    }

    #[test]
    fn history_appends_without_dedup() {
        let dir = tempfile::tempdir().unwrap();
        save_intermediate(&sample_result("x", Direction::Upstream), dir.path()).unwrap();
        let table = aggregate_results(dir.path(), &headers(), Direction::Upstream).unwrap();

        let history = dir.path().join("history").join("upstream_history.csv");
        append_history(&table, &history).unwrap();
        append_history(&table, &history).unwrap();

        let content = fs::read_to_string(&history).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // One header row, then the same data row twice.
        assert_eq!(lines.len(), 1 + 2 * table.rows.len());
        assert_eq!(lines[1], lines[2]);
    }
}
