//! Publishing corpus lines to a document store.
//!
//! Documents are keyed `{corpus}_{file}_{line}`. A [`CorporaIndexer`] walks
//! a [`CorpusSource`] and publishes the lines of every `.txt` file it lists.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Store id of one corpus line
pub fn document_id(corpus: &str, file: &str, line: usize) -> String {
    format!("{corpus}_{file}_{line}")
}

/// Stored body of one corpus line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedLine {
    pub corpus: String,
    pub file: String,
    pub line: usize,
    pub text: String,
}

pub trait DocumentStore {
    /// Store `text` under `document_id(corpus, file, line)` and return the id.
    /// An existing document with the same id is replaced.
    fn index_document(&mut self, corpus: &str, file: &str, line: usize, text: &str) -> Result<String>;

    fn retrieve_document(&self, id: &str) -> Result<Option<IndexedLine>>;

    /// Returns whether a document was removed
    fn delete_document(&mut self, id: &str) -> Result<bool>;
}

/// In-memory store keeping CBOR encoded bodies
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: IndexMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

impl DocumentStore for MemoryStore {
    fn index_document(&mut self, corpus: &str, file: &str, line: usize, text: &str) -> Result<String> {
        let id = document_id(corpus, file, line);
        let body = serde_cbor::to_vec(&IndexedLine {
            corpus: corpus.to_string(),
            file: file.to_string(),
            line,
            text: text.to_string(),
        })?;
        self.documents.insert(id.clone(), body);
        Ok(id)
    }

    fn retrieve_document(&self, id: &str) -> Result<Option<IndexedLine>> {
        self.documents
            .get(id)
            .map(|body| serde_cbor::from_slice::<IndexedLine>(body))
            .transpose()
            .map_err(Into::into)
    }

    fn delete_document(&mut self, id: &str) -> Result<bool> {
        Ok(self.documents.shift_remove(id).is_some())
    }
}

/// Where corpus files come from
pub trait CorpusSource {
    /// Files of a corpus. Listing failures yield an empty list.
    fn list_files(&self, corpus: &str) -> Vec<PathBuf>;

    fn read_lines(&self, file: &Path) -> Result<Vec<String>>;
}

/// Corpora as subdirectories of a root directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CorpusSource for DirectorySource {
    fn list_files(&self, corpus: &str) -> Vec<PathBuf> {
        let dir = self.root.join(corpus);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot list corpus");
                return Vec::new();
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        files
    }

    fn read_lines(&self, file: &Path) -> Result<Vec<String>> {
        crate::utils::resource::read_lines(file)
    }
}

/// Publishes corpora from a source into a store.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorporaIndexer {
    /// publish at most this many lines of each file
    pub max_lines_per_file: Option<usize>,
}

impl CorporaIndexer {
    pub fn new(max_lines_per_file: Option<usize>) -> Self {
        Self { max_lines_per_file }
    }

    /// Publish every `.txt` file of `corpus`.
    /// The document's corpus name is the last path segment of `corpus`.
    ///
    /// Returns the number of documents published.
    pub fn index_corpus<S, D>(&self, source: &S, store: &mut D, corpus: &str) -> Result<usize>
    where
        S: CorpusSource + ?Sized,
        D: DocumentStore + ?Sized,
    {
        let corpus_name = corpus.rsplit('/').next().unwrap_or(corpus);
        let mut published = 0;
        for file in source.list_files(corpus) {
            if file.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let lines = source.read_lines(&file)?;
            let limit = self.max_lines_per_file.unwrap_or(lines.len());
            for (number, text) in lines.iter().take(limit).enumerate() {
                store.index_document(corpus_name, &file_name, number, text)?;
                published += 1;
            }
            debug!(file = %file_name, lines = lines.len().min(limit), "file published");
        }
        info!(corpus = corpus_name, published, "corpus published");
        Ok(published)
    }

    /// Publish several corpora, returning the total document count
    pub fn index_corpora<S, D>(&self, source: &S, store: &mut D, corpora: &[&str]) -> Result<usize>
    where
        S: CorpusSource + ?Sized,
        D: DocumentStore + ?Sized,
    {
        corpora
            .iter()
            .try_fold(0, |total, corpus| Ok(total + self.index_corpus(source, store, corpus)?))
    }
}
