//! Report-level items: PSMs, PSM sets and the peptides assembled from them

use crate::accession::Accession;
use crate::identification::KeySettings;
use crate::modification::Modification;
use crate::score::ScoreModel;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod peptide;
pub mod psm;

pub use peptide::ReportPeptide;
pub use psm::{PsmReportItem, ReportPsm, ReportPsmSet};

/// Capabilities shared by single PSMs and PSM sets
pub trait ReportItem {
    fn score(&self, short_name: &str) -> Option<&ScoreModel>;

    /// The score used to rank this item against others
    fn compare_score(&self, short_name: &str) -> Option<&ScoreModel>;

    fn accessions(&self) -> Vec<Arc<Accession>>;

    fn identification_key(&self, settings: KeySettings) -> String;

    fn available_identification_key_settings(&self) -> KeySettings;

    fn modifications(&self) -> &BTreeMap<usize, Modification>;

    fn source_id(&self) -> Option<&str>;

    fn spectrum_title(&self) -> Option<&str>;

    fn sequence(&self) -> &str;

    fn missed_cleavages(&self) -> Option<u32>;

    fn nice_spectrum_name(&self) -> String;

    fn peptide_string_id(&self, consider_modifications: bool) -> String;
}
