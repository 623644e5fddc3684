use crate::model::BulkRow;

// Row shapes for the export sinks.

pub struct Formatter;

impl Formatter {
    pub fn csv_header() -> [&'static str; 5] {
        ["Title", "DDC Number", "Category", "Description", "Error"]
    }

    pub fn to_csv_record(row: &BulkRow) -> [String; 5] {
        [
            row.title.clone(),
            row.ddc.as_ref().map(|d| d.number.clone()).unwrap_or_default(),
            row.ddc.as_ref().map(|d| d.category.clone()).unwrap_or_default(),
            row.ddc.as_ref().map(|d| d.description.clone()).unwrap_or_default(),
            row.error.clone().unwrap_or_default()
        ]
    }

    pub fn to_jsonl(row: &BulkRow) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(row)?;
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DdcRecord;

    fn ok_row() -> BulkRow {
        BulkRow::ok(
            "Dune".to_string(),
            DdcRecord::new("813.54".to_string(), "American fiction".to_string(), "Novel".to_string())
        )
    }

    #[test]
    fn test_csv_record_for_success() {
        let record = Formatter::to_csv_record(&ok_row());
        assert_eq!(record, [
            "Dune".to_string(),
            "813.54".to_string(),
            "American fiction".to_string(),
            "Novel".to_string(),
            String::new()
        ]);
    }

    #[test]
    fn test_csv_record_for_failure() {
        let row = BulkRow::failed("Dune".to_string(), "rate limit exceeded".to_string());
        let record = Formatter::to_csv_record(&row);
        assert_eq!(record[0], "Dune");
        assert!(record[1].is_empty());
        assert_eq!(record[4], "rate limit exceeded");
    }

    #[test]
    fn test_jsonl_omits_absent_fields() {
        let line = Formatter::to_jsonl(&ok_row()).unwrap();
        assert!(line.ends_with('\n'));
        assert!(line.contains("\"number\":\"813.54\""));
        assert!(!line.contains("\"error\""));
    }
}
