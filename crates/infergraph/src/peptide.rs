use crate::accession::Accession;
use crate::psm::PeptideSpectrumMatch;
use std::sync::Arc;

/// A peptide sequence, together with all PSMs that identified it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Peptide {
    pub id: u64,
    pub sequence: String,
    psms: Vec<Arc<PeptideSpectrumMatch>>,
}

impl Peptide {
    pub fn new<S: Into<String>>(id: u64, sequence: S) -> Self {
        Self {
            id,
            sequence: sequence.into(),
            psms: Vec::new(),
        }
    }

    pub fn add_psm(&mut self, psm: Arc<PeptideSpectrumMatch>) {
        self.psms.push(psm);
    }

    pub fn psms(&self) -> &[Arc<PeptideSpectrumMatch>] {
        &self.psms
    }

    /// Accessions reported by any of the PSMs, first occurrence wins
    pub fn accessions(&self) -> Vec<Arc<Accession>> {
        let mut seen = fnv::FnvHashSet::default();
        self.psms
            .iter()
            .flat_map(|psm| psm.accessions.iter())
            .filter(|acc| seen.insert(acc.accession.as_str()))
            .cloned()
            .collect()
    }
}

impl std::fmt::Display for Peptide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sequence)
    }
}
