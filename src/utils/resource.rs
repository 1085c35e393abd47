//! Text resources: corpus lines and word lists, one entry per line.

use std::{fs, path::Path};

use tracing::info;

use crate::error::{ResponderError, Result};

/// Every line of a text file, empty lines included
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ResponderError::resource(path, e))?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    info!(path = %path.display(), lines = lines.len(), "resource read");
    Ok(lines)
}

/// Trimmed non-empty lines of a word list
pub fn read_word_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    Ok(read_lines(path)?
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Word list lowercased for stopword comparison
pub fn read_stopwords(path: impl AsRef<Path>) -> Result<Vec<String>> {
    Ok(read_word_list(path)?.into_iter().map(|w| w.to_lowercase()).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn lines_keep_blank_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "I love pizza\n\nPizza is great\n").unwrap();
        assert_eq!(read_lines(file.path()).unwrap(), vec!["I love pizza", "", "Pizza is great"]);
    }

    #[test]
    fn word_lists_are_trimmed_and_stopwords_lowercased() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, " The \n\nIS\na\r\n").unwrap();
        assert_eq!(read_word_list(file.path()).unwrap(), vec!["The", "IS", "a"]);
        assert_eq!(read_stopwords(file.path()).unwrap(), vec!["the", "is", "a"]);
    }

    #[test]
    fn missing_file_is_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_word_list(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ResponderError::Resource { .. }));
    }
}
