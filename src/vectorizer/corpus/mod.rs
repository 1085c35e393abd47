use indexmap::IndexMap;

/// Document frequency table of a session.
///
/// Keeps, for every term, the number of documents containing it at least
/// once, plus the number of documents counted. Counts only grow.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Corpus {
    /// documents added
    pub add_num: u64,
    /// term -> number of documents containing it
    pub term_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            add_num: 0,
            term_counts: IndexMap::new(),
        }
    }

    /// Add one document's distinct terms.
    /// Callers pass a set; a repeated term would be counted twice.
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.add_num += 1;
        self.add_terms(terms);
    }

    /// Count distinct terms without counting a document.
    /// Used for the live query, which never counts toward N.
    pub fn add_terms<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
    }

    /// Count a document that produced no terms
    #[inline]
    pub fn add_empty(&mut self) {
        self.add_num += 1;
    }

    #[inline]
    fn add_term(&mut self, term: &str) {
        if let Some(count) = self.term_counts.get_mut(term) {
            *count += 1;
        } else {
            self.term_counts.insert(term.into(), 1);
        }
    }

    /// Number of documents counted
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.add_num
    }

    /// Number of documents containing `term`
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_counts.iter().map(|(t, &c)| (t.as_ref(), c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_set_counts_documents_not_occurrences() {
        let mut corpus = Corpus::new();
        corpus.add_set(&["pizza", "love"]);
        corpus.add_set(&["pizza"]);
        corpus.add_empty();
        assert_eq!(corpus.get_doc_num(), 3);
        assert_eq!(corpus.get_term_count("pizza"), 2);
        assert_eq!(corpus.get_term_count("love"), 1);
        assert_eq!(corpus.get_term_count("rain"), 0);
        assert_eq!(corpus.vocab_size(), 2);
    }

    #[test]
    fn add_terms_leaves_document_count_alone() {
        let mut corpus = Corpus::new();
        corpus.add_set(&["pizza"]);
        corpus.add_terms(&["pizza", "rain"]);
        assert_eq!(corpus.get_doc_num(), 1);
        assert_eq!(corpus.get_term_count("pizza"), 2);
        assert_eq!(corpus.get_term_count("rain"), 1);
    }
}
