use std::{fs::File, io::Read, path::Path};
use csv::ReaderBuilder;

use crate::error::IngestError;

/// Pulls classification inputs out of a spreadsheet export. The only
/// column this pipeline needs is the title column, matched
/// case-insensitively; every other column is ignored.
#[derive(Debug)]
pub struct TitleParser {
    column: String
}

#[allow(clippy::should_implement_trait)]
impl TitleParser {
    pub fn new(column: &str) -> Self {
        TitleParser {
            column: column.to_string()
        }
    }

    pub fn default() -> Self {
        Self::new("title")
    }

    pub fn read_titles_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>, IngestError> {
        let file = File::open(path)?;
        self.read_titles(file)
    }

    /// Rows with an empty or whitespace-only title are dropped; the rest
    /// come back trimmed, in file order.
    pub fn read_titles<R: Read>(&self, reader: R) -> Result<Vec<String>, IngestError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let title_index = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(&self.column))
            .ok_or(IngestError::MissingTitleColumn)?;

        let mut titles = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if let Some(raw) = record.get(title_index) {
                let title = raw.trim();
                if !title.is_empty() {
                    titles.push(title.to_string());
                }
            }
        }

        if titles.is_empty() {
            return Err(IngestError::NoTitles);
        }
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(input: &str) -> Result<Vec<String>, IngestError> {
        TitleParser::default().read_titles(Cursor::new(input.to_string()))
    }

    #[test]
    fn test_reads_lowercase_title_column() {
        let titles = read("title,author\nDune,Frank Herbert\nHyperion,Dan Simmons\n").unwrap();
        assert_eq!(titles, vec!["Dune", "Hyperion"]);
    }

    #[test]
    fn test_matches_column_case_insensitively() {
        let titles = read("Author,TITLE\nHerbert,Dune\n").unwrap();
        assert_eq!(titles, vec!["Dune"]);
    }

    #[test]
    fn test_trims_and_skips_empty_titles() {
        let titles = read("title\n  Dune  \n\n   \nHyperion\n").unwrap();
        assert_eq!(titles, vec!["Dune", "Hyperion"]);
    }

    #[test]
    fn test_missing_title_column() {
        let err = read("name,author\nDune,Herbert\n").unwrap_err();
        assert!(matches!(err, IngestError::MissingTitleColumn));
    }

    #[test]
    fn test_no_titles_left() {
        let err = read("title\n\n   \n").unwrap_err();
        assert!(matches!(err, IngestError::NoTitles));
    }

    #[test]
    fn test_custom_column_name() {
        let parser = TitleParser::new("book");
        let titles = parser
            .read_titles(Cursor::new("Book,Year\nDune,1965\n".to_string()))
            .unwrap();
        assert_eq!(titles, vec!["Dune"]);
    }
}
