//! Header-column loading

use crate::StoreError;
use std::path::Path;

/// Read the ordered output column names from a header sheet.
///
/// The sheet is a CSV export whose first record is the column row; order is
/// significant and preserved through extraction and aggregation.
pub fn load_header_columns(path: &Path) -> Result<Vec<String>, StoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?;
    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_columns_in_sheet_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upstream.csv");
        fs::write(&path, "作品名称,合同类型,签约日期\n,,\n").unwrap();

        let columns = load_header_columns(&path).unwrap();
        assert_eq!(columns, ["作品名称", "合同类型", "签约日期"]);
    }

    #[test]
    fn missing_sheet_is_an_error() {
        assert!(load_header_columns(Path::new("/nonexistent/headers.csv")).is_err());
    }
}
