use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path
};
use chrono::Utc;
use csv::Writer;

use crate::{
    format::Formatter,
    model::BulkRow
};

const CLASSIFICATION_LOG: &str = "classifications.log";

// Utils to store run results on the local device.
pub struct LocalSaver;

impl LocalSaver {
    pub fn save_rows_as_csv<P: AsRef<Path>>(path: P, rows: &[BulkRow]) -> csv::Result<()> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(Formatter::csv_header())?;
        for row in rows {
            writer.write_record(Formatter::to_csv_record(row))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save_rows_as_jsonl<P: AsRef<Path>>(path: P, rows: &[BulkRow]) -> io::Result<()> {
        let mut file = File::create(path)?;
        rows.iter().try_for_each(|row| -> io::Result<()> {
            let line = Formatter::to_jsonl(row)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            file.write_all(line.as_bytes())?;
            Ok(())
        })?;
        file.flush()?;
        Ok(())
    }

    /// Append one successful classification to the run log, title
    /// truncated to a preview.
    pub fn append_classification_log(title: &str, number: &str) -> io::Result<()> {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let preview: String = title.chars().take(50).collect();
        let entry = format!("[{}] Classified: '{}' -> DDC: {}\n", timestamp, preview, number);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(CLASSIFICATION_LOG)?;
        file.write_all(entry.as_bytes())?;
        Ok(())
    }
}
