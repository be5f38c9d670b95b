use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};

/// A modification observed on a single residue of a peptide
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    /// 1-based position within the peptide. Position 0 is the N-terminus,
    /// `len + 1` the C-terminus.
    pub position: usize,
    pub residue: char,
    pub monoisotopic_mass_delta: f64,
    /// Ontology accession, e.g. `UNIMOD:35`
    pub accession: Option<String>,
    pub description: Option<String>,
}

impl Modification {
    pub fn new(position: usize, residue: char, monoisotopic_mass_delta: f64) -> Self {
        Self {
            position,
            residue,
            monoisotopic_mass_delta,
            accession: None,
            description: None,
        }
    }

    pub fn with_accession<S: Into<String>>(mut self, accession: S) -> Self {
        self.accession = Some(accession.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Renders as `5M[+15.9949]`
impl Display for Modification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.position)?;
        f.write_char(self.residue)?;
        if self.monoisotopic_mass_delta.is_sign_negative() {
            write!(f, "[{:.4}]", self.monoisotopic_mass_delta)
        } else {
            write!(f, "[+{:.4}]", self.monoisotopic_mass_delta)
        }
    }
}
