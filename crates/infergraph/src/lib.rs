pub mod accession;
pub mod aggregate;
pub mod fdr;
pub mod forest;
pub mod group;
pub mod identification;
pub mod modification;
pub mod peptide;
pub mod psm;
pub mod report;
pub mod score;
pub mod tree;

/// Insertion-ordered map using the FNV hasher
pub type FnvIndexMap<K, V> = indexmap::IndexMap<K, V, fnv::FnvBuildHasher>;
pub type FnvIndexSet<T> = indexmap::IndexSet<T, fnv::FnvBuildHasher>;

#[derive(Debug)]
pub enum Error {
    InvalidDecoyPattern {
        pattern: String,
        source: regex::Error,
    },
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDecoyPattern { pattern, source } => {
                write!(f, "invalid decoy pattern `{}`: {}", pattern, source)
            }
            Self::Json(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDecoyPattern { source, .. } => Some(source),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
