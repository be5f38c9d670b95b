use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Identifier of the input file a record was read from
pub type FileId = usize;

/// A protein database entry
///
/// Two accessions are equal if their identifiers are equal, regardless of
/// the metadata attached to them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Accession {
    /// Unique identifier, e.g. `sp|P02768|ALBU_HUMAN`
    pub accession: String,
    pub description: Option<String>,
    /// Protein sequence, if the database provided one
    pub sequence: Option<String>,
    /// Files in which this accession was reported
    pub files: BTreeSet<FileId>,
}

impl Accession {
    pub fn new<S: Into<String>>(accession: S) -> Self {
        Self {
            accession: accession.into(),
            ..Default::default()
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sequence<S: Into<String>>(mut self, sequence: S) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn with_file(mut self, file: FileId) -> Self {
        self.files.insert(file);
        self
    }

    /// Augment this accession with the metadata of `other`: files are
    /// unioned, the first non-empty description and sequence are kept.
    pub fn merge(&mut self, other: &Accession) {
        self.files.extend(other.files.iter().copied());
        if self.description.as_deref().map_or(true, str::is_empty) {
            if let Some(desc) = other.description.as_deref().filter(|d| !d.is_empty()) {
                self.description = Some(desc.to_string());
            }
        }
        if self.sequence.as_deref().map_or(true, str::is_empty) {
            if let Some(seq) = other.sequence.as_deref().filter(|s| !s.is_empty()) {
                self.sequence = Some(seq.to_string());
            }
        }
    }
}

impl PartialEq for Accession {
    fn eq(&self, other: &Self) -> bool {
        self.accession == other.accession
    }
}

impl Eq for Accession {}

impl Hash for Accession {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.accession.hash(state);
    }
}

impl std::fmt::Display for Accession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.accession)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn equality_ignores_metadata() {
        let a = Accession::new("P1").with_description("albumin").with_file(0);
        let b = Accession::new("P1").with_file(3);
        assert_eq!(a, b);
        assert_ne!(a, Accession::new("P2"));
    }

    #[test]
    fn merge_keeps_first_metadata() {
        let mut a = Accession::new("P1").with_file(0).with_description("");
        let b = Accession::new("P1")
            .with_file(2)
            .with_description("serum albumin")
            .with_sequence("MKWVTF");
        let c = Accession::new("P1").with_description("other").with_file(2);

        a.merge(&b);
        a.merge(&c);
        assert_eq!(a.description.as_deref(), Some("serum albumin"));
        assert_eq!(a.sequence.as_deref(), Some("MKWVTF"));
        assert_eq!(a.files.iter().copied().collect::<Vec<_>>(), vec![0, 2]);
    }
}
