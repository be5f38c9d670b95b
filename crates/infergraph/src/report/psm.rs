use super::ReportItem;
use crate::accession::Accession;
use crate::identification::KeySettings;
use crate::modification::Modification;
use crate::psm::PeptideSpectrumMatch;
use crate::score::{self, ScoreModel};
use fnv::FnvHashSet;
use std::collections::BTreeMap;
use std::sync::Arc;

static NO_MODIFICATIONS: BTreeMap<usize, Modification> = BTreeMap::new();

/// A PSM as it is reported: one spectrum match from one input file
#[derive(Clone, Debug, PartialEq)]
pub struct ReportPsm {
    pub id: u64,
    pub file_name: String,
    pub spectrum: Arc<PeptideSpectrumMatch>,
}

impl ReportPsm {
    pub fn new<S: Into<String>>(id: u64, file_name: S, spectrum: Arc<PeptideSpectrumMatch>) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            spectrum,
        }
    }

    /// Key of the identified spectrum under `settings`
    pub fn spectrum_identification_key(&self, settings: KeySettings) -> String {
        self.spectrum.spectrum_identification_key(settings)
    }
}

impl ReportItem for ReportPsm {
    fn score(&self, short_name: &str) -> Option<&ScoreModel> {
        self.spectrum.score(short_name)
    }

    fn compare_score(&self, short_name: &str) -> Option<&ScoreModel> {
        self.score(short_name)
    }

    fn accessions(&self) -> Vec<Arc<Accession>> {
        self.spectrum.accessions.clone()
    }

    fn identification_key(&self, settings: KeySettings) -> String {
        self.spectrum.identification_key(settings)
    }

    fn available_identification_key_settings(&self) -> KeySettings {
        self.spectrum.available_identification_key_settings()
    }

    fn modifications(&self) -> &BTreeMap<usize, Modification> {
        &self.spectrum.modifications
    }

    fn source_id(&self) -> Option<&str> {
        self.spectrum.source_id.as_deref()
    }

    fn spectrum_title(&self) -> Option<&str> {
        self.spectrum.spectrum_title.as_deref()
    }

    fn sequence(&self) -> &str {
        &self.spectrum.sequence
    }

    fn missed_cleavages(&self) -> Option<u32> {
        self.spectrum.missed_cleavages
    }

    fn nice_spectrum_name(&self) -> String {
        self.spectrum.nice_spectrum_name()
    }

    fn peptide_string_id(&self, consider_modifications: bool) -> String {
        self.spectrum.peptide_string_id(consider_modifications)
    }
}

/// PSMs from different files or search engines that share one
/// identification key
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportPsmSet {
    psms: Vec<ReportPsm>,
}

impl ReportPsmSet {
    pub fn new(psms: Vec<ReportPsm>) -> Self {
        Self { psms }
    }

    pub fn add_psm(&mut self, psm: ReportPsm) {
        self.psms.push(psm);
    }

    pub fn psms(&self) -> &[ReportPsm] {
        &self.psms
    }

    fn first(&self) -> Option<&ReportPsm> {
        self.psms.first()
    }

    /// The best score over all members that are neither excluded by id, nor
    /// by the key of their spectrum (under `settings`)
    pub fn compare_score_excluding(
        &self,
        short_name: &str,
        excluded_psms: &FnvHashSet<u64>,
        excluded_spectra: &FnvHashSet<String>,
        settings: KeySettings,
    ) -> Option<&ScoreModel> {
        score::best(
            self.psms
                .iter()
                .filter(|psm| !excluded_psms.contains(&psm.id))
                .filter(|psm| {
                    excluded_spectra.is_empty()
                        || !excluded_spectra.contains(&psm.spectrum_identification_key(settings))
                })
                .filter_map(|psm| psm.score(short_name)),
        )
    }
}

impl ReportItem for ReportPsmSet {
    fn score(&self, short_name: &str) -> Option<&ScoreModel> {
        self.compare_score(short_name)
    }

    fn compare_score(&self, short_name: &str) -> Option<&ScoreModel> {
        score::best(self.psms.iter().filter_map(|psm| psm.score(short_name)))
    }

    fn accessions(&self) -> Vec<Arc<Accession>> {
        let mut seen = FnvHashSet::default();
        self.psms
            .iter()
            .flat_map(|psm| psm.spectrum.accessions.iter())
            .filter(|acc| seen.insert(acc.accession.as_str()))
            .cloned()
            .collect()
    }

    /// Members share their key, so this is the key of the first member
    fn identification_key(&self, settings: KeySettings) -> String {
        self.first()
            .map(|psm| psm.identification_key(settings))
            .unwrap_or_default()
    }

    fn available_identification_key_settings(&self) -> KeySettings {
        self.psms.iter().fold(KeySettings::all(), |acc, psm| {
            acc.intersection(&psm.available_identification_key_settings())
        })
    }

    fn modifications(&self) -> &BTreeMap<usize, Modification> {
        self.first()
            .map(|psm| psm.modifications())
            .unwrap_or(&NO_MODIFICATIONS)
    }

    fn source_id(&self) -> Option<&str> {
        self.psms.iter().find_map(|psm| psm.source_id())
    }

    fn spectrum_title(&self) -> Option<&str> {
        self.psms.iter().find_map(|psm| psm.spectrum_title())
    }

    fn sequence(&self) -> &str {
        self.first().map(|psm| psm.sequence()).unwrap_or_default()
    }

    fn missed_cleavages(&self) -> Option<u32> {
        self.first().and_then(|psm| psm.missed_cleavages())
    }

    fn nice_spectrum_name(&self) -> String {
        self.first()
            .map(|psm| psm.nice_spectrum_name())
            .unwrap_or_default()
    }

    fn peptide_string_id(&self, consider_modifications: bool) -> String {
        self.first()
            .map(|psm| psm.peptide_string_id(consider_modifications))
            .unwrap_or_default()
    }
}

/// Either a single PSM or a PSM set; peptides are assembled from these
#[derive(Clone, Debug, PartialEq)]
pub enum PsmReportItem {
    Single(ReportPsm),
    Set(ReportPsmSet),
}

impl PsmReportItem {
    /// The reported PSMs behind this item
    pub fn report_psms(&self) -> &[ReportPsm] {
        match self {
            Self::Single(psm) => std::slice::from_ref(psm),
            Self::Set(set) => set.psms(),
        }
    }

    fn inner(&self) -> &dyn ReportItem {
        match self {
            Self::Single(psm) => psm,
            Self::Set(set) => set,
        }
    }
}

impl From<ReportPsm> for PsmReportItem {
    fn from(psm: ReportPsm) -> Self {
        Self::Single(psm)
    }
}

impl From<ReportPsmSet> for PsmReportItem {
    fn from(set: ReportPsmSet) -> Self {
        Self::Set(set)
    }
}

impl ReportItem for PsmReportItem {
    fn score(&self, short_name: &str) -> Option<&ScoreModel> {
        self.inner().score(short_name)
    }

    fn compare_score(&self, short_name: &str) -> Option<&ScoreModel> {
        self.inner().compare_score(short_name)
    }

    fn accessions(&self) -> Vec<Arc<Accession>> {
        self.inner().accessions()
    }

    fn identification_key(&self, settings: KeySettings) -> String {
        self.inner().identification_key(settings)
    }

    fn available_identification_key_settings(&self) -> KeySettings {
        self.inner().available_identification_key_settings()
    }

    fn modifications(&self) -> &BTreeMap<usize, Modification> {
        self.inner().modifications()
    }

    fn source_id(&self) -> Option<&str> {
        self.inner().source_id()
    }

    fn spectrum_title(&self) -> Option<&str> {
        self.inner().spectrum_title()
    }

    fn sequence(&self) -> &str {
        self.inner().sequence()
    }

    fn missed_cleavages(&self) -> Option<u32> {
        self.inner().missed_cleavages()
    }

    fn nice_spectrum_name(&self) -> String {
        self.inner().nice_spectrum_name()
    }

    fn peptide_string_id(&self, consider_modifications: bool) -> String {
        self.inner().peptide_string_id(consider_modifications)
    }
}
