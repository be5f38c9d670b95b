use super::{PsmReportItem, ReportItem, ReportPsm, ReportPsmSet};
use crate::accession::Accession;
use crate::fdr::{DecoyPattern, DecoyStrategy, FdrComputable};
use crate::identification::{no_redundant_settings, KeySettings};
use crate::modification::Modification;
use crate::peptide::Peptide;
use crate::score::{self, ScoreModel};
use crate::FnvIndexSet;
use fnv::FnvHashSet;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// A peptide (or peptide-form, if modifications are considered) on report
/// level, together with its PSMs and FDR state.
///
/// Spectrum keys and identification key settings are derived from the PSMs
/// on first use and cached until the PSMs change.
#[derive(Clone, Debug)]
pub struct ReportPeptide {
    string_id: String,
    sequence: String,
    peptide: Option<Arc<Peptide>>,
    psms: Vec<PsmReportItem>,
    rank: Option<u64>,

    non_scoring_psm_ids: FnvHashSet<u64>,
    non_scoring_spectra_keys: FnvHashSet<String>,

    is_decoy: bool,
    fdr: f64,
    q_value: f64,
    fdr_score: Option<ScoreModel>,
    is_fdr_good: bool,

    spectra_keys: OnceLock<FnvIndexSet<String>>,
    available_settings: OnceLock<KeySettings>,
    not_redundant_settings: OnceLock<KeySettings>,
}

impl ReportPeptide {
    pub fn new<S: Into<String>, T: Into<String>>(string_id: S, sequence: T) -> Self {
        Self {
            string_id: string_id.into(),
            sequence: sequence.into(),
            peptide: None,
            psms: Vec::new(),
            rank: None,
            non_scoring_psm_ids: FnvHashSet::default(),
            non_scoring_spectra_keys: FnvHashSet::default(),
            is_decoy: false,
            fdr: f64::INFINITY,
            q_value: f64::NAN,
            fdr_score: None,
            is_fdr_good: false,
            spectra_keys: OnceLock::new(),
            available_settings: OnceLock::new(),
            not_redundant_settings: OnceLock::new(),
        }
    }

    /// Link this report peptide to the peptide of the inference graph
    pub fn with_peptide(mut self, peptide: Arc<Peptide>) -> Self {
        self.peptide = Some(peptide);
        self
    }

    pub fn string_id(&self) -> &str {
        &self.string_id
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn peptide(&self) -> Option<&Arc<Peptide>> {
        self.peptide.as_ref()
    }

    pub fn rank(&self) -> Option<u64> {
        self.rank
    }

    pub fn set_rank(&mut self, rank: u64) {
        self.rank = Some(rank);
    }

    /// The string id a PSM item would get as a report peptide
    pub fn create_string_id<I: ReportItem>(item: &I, consider_modifications: bool) -> String {
        item.peptide_string_id(consider_modifications)
    }

    fn invalidate_caches(&mut self) {
        self.spectra_keys = OnceLock::new();
        self.available_settings = OnceLock::new();
        self.not_redundant_settings = OnceLock::new();
    }

    pub fn add_psm<P: Into<PsmReportItem>>(&mut self, psm: P) {
        self.psms.push(psm.into());
        self.invalidate_caches();
    }

    /// Remove the first PSM set with the same identification key as `set`
    /// (under `settings`)
    pub fn remove_psm_set_by_key(
        &mut self,
        set: &ReportPsmSet,
        settings: KeySettings,
    ) -> Option<ReportPsmSet> {
        let key = set.identification_key(settings);
        let ix = self.psms.iter().position(|item| match item {
            PsmReportItem::Set(other) => other.identification_key(settings) == key,
            PsmReportItem::Single(_) => false,
        })?;

        self.invalidate_caches();
        match self.psms.remove(ix) {
            PsmReportItem::Set(set) => Some(set),
            PsmReportItem::Single(_) => None,
        }
    }

    pub fn psms(&self) -> &[PsmReportItem] {
        &self.psms
    }

    /// All reported PSMs, with PSM sets flattened into their members
    pub fn report_psms(&self) -> impl Iterator<Item = &ReportPsm> {
        self.psms.iter().flat_map(PsmReportItem::report_psms)
    }

    pub fn nr_psms(&self) -> usize {
        self.psms.len()
    }

    pub fn nr_spectra(&self) -> usize {
        self.spectra_identification_keys().len()
    }

    pub fn non_scoring_psm_ids(&self) -> &FnvHashSet<u64> {
        &self.non_scoring_psm_ids
    }

    pub fn add_to_non_scoring_psms(&mut self, id: u64) {
        self.non_scoring_psm_ids.insert(id);
    }

    /// Returns whether the id was marked as non-scoring
    pub fn remove_from_non_scoring_psms(&mut self, id: u64) -> bool {
        self.non_scoring_psm_ids.remove(&id)
    }

    pub fn clear_non_scoring_psm_ids(&mut self) {
        self.non_scoring_psm_ids.clear();
    }

    pub fn non_scoring_spectra_keys(&self) -> &FnvHashSet<String> {
        &self.non_scoring_spectra_keys
    }

    pub fn add_to_non_scoring_spectra<S: Into<String>>(&mut self, key: S) {
        self.non_scoring_spectra_keys.insert(key.into());
    }

    pub fn remove_from_non_scoring_spectra(&mut self, key: &str) -> bool {
        self.non_scoring_spectra_keys.remove(key)
    }

    pub fn clear_non_scoring_spectra_keys(&mut self) {
        self.non_scoring_spectra_keys.clear();
    }

    /// The best score with the given name over all scoring PSMs.
    ///
    /// A single PSM is scoring if neither its id nor the key of its spectrum
    /// are marked as non-scoring; PSM sets apply the same rule to each
    /// of their members.
    pub fn best_score_model(&self, short_name: &str) -> Option<&ScoreModel> {
        let settings = self.not_redundant_identification_key_settings();
        score::best(self.psms.iter().filter_map(|item| match item {
            PsmReportItem::Single(psm) => {
                if self.non_scoring_psm_ids.contains(&psm.id)
                    || self
                        .non_scoring_spectra_keys
                        .contains(&psm.spectrum_identification_key(settings))
                {
                    None
                } else {
                    psm.compare_score(short_name)
                }
            }
            PsmReportItem::Set(set) => set.compare_score_excluding(
                short_name,
                &self.non_scoring_psm_ids,
                &self.non_scoring_spectra_keys,
                settings,
            ),
        }))
    }

    /// Value of [`best_score_model`](Self::best_score_model), NaN if there is
    /// no such score
    pub fn best_score(&self, short_name: &str) -> f64 {
        self.best_score_model(short_name)
            .map(|score| score.value)
            .unwrap_or(f64::NAN)
    }

    /// Accessions of all PSMs, first occurrence wins
    pub fn accessions(&self) -> Vec<Arc<Accession>> {
        let mut seen = FnvHashSet::default();
        self.psms
            .iter()
            .flat_map(|item| item.accessions())
            .filter(|acc| seen.insert(acc.accession.clone()))
            .collect()
    }

    /// Keys of all identified spectra, under the non-redundant settings
    pub fn spectra_identification_keys(&self) -> &FnvIndexSet<String> {
        self.spectra_keys.get_or_init(|| {
            self.spectra_identification_keys_with(self.not_redundant_identification_key_settings())
        })
    }

    /// Keys of all identified spectra, under `settings`. Not cached.
    pub fn spectra_identification_keys_with(&self, settings: KeySettings) -> FnvIndexSet<String> {
        self.report_psms()
            .map(|psm| psm.spectrum_identification_key(settings))
            .collect()
    }

    /// Keys of the spectra that may contribute to the score
    pub fn scoring_spectra_identification_keys(&self) -> FnvIndexSet<String> {
        let settings = self.not_redundant_identification_key_settings();
        self.report_psms()
            .filter(|psm| !self.non_scoring_psm_ids.contains(&psm.id))
            .map(|psm| psm.spectrum_identification_key(settings))
            .filter(|key| !self.non_scoring_spectra_keys.contains(key))
            .collect()
    }

    /// Spectrum identification key settings for which every PSM has a value
    pub fn available_identification_key_settings(&self) -> KeySettings {
        *self.available_settings.get_or_init(|| {
            self.psms.iter().fold(KeySettings::SPECTRUM, |acc, item| {
                acc.intersection(&item.available_identification_key_settings())
            })
        })
    }

    pub fn not_redundant_identification_key_settings(&self) -> KeySettings {
        *self
            .not_redundant_settings
            .get_or_init(|| no_redundant_settings(self.available_identification_key_settings()))
    }

    pub fn psms_identification_keys(&self, settings: KeySettings) -> Vec<String> {
        self.psms
            .iter()
            .map(|item| item.identification_key(settings))
            .collect()
    }

    pub fn psms_by_identification_key(
        &self,
        key: &str,
        settings: KeySettings,
    ) -> Vec<&PsmReportItem> {
        self.psms
            .iter()
            .filter(|item| item.identification_key(settings) == key)
            .collect()
    }

    /// Items with at least one PSM for the given spectrum; a PSM set is
    /// listed once
    pub fn psms_by_spectrum_identification_key(&self, key: &str) -> Vec<&PsmReportItem> {
        let settings = self.not_redundant_identification_key_settings();
        self.psms
            .iter()
            .filter(|item| {
                item.report_psms()
                    .iter()
                    .any(|psm| psm.spectrum_identification_key(settings) == key)
            })
            .collect()
    }

    /// Display name of a spectrum. If several items identified it, their
    /// number is appended, e.g. `scan=1042 [2]`.
    pub fn nice_spectrum_name(&self, key: &str) -> Option<String> {
        let items = self.psms_by_spectrum_identification_key(key);
        let name = items.last()?.nice_spectrum_name();
        if items.len() > 1 {
            Some(format!("{} [{}]", name, items.len()))
        } else {
            Some(name)
        }
    }

    /// Missed cleavages of the first PSM, -1 if unknown
    pub fn missed_cleavages(&self) -> i32 {
        self.psms
            .first()
            .and_then(|item| item.missed_cleavages())
            .map(|mc| mc as i32)
            .unwrap_or(-1)
    }

    /// Modifications of the first PSM
    pub fn modifications(&self) -> Option<&BTreeMap<usize, Modification>> {
        self.psms.first().map(|item| item.modifications())
    }

    /// Modifications of all PSMs, in PSM order and including duplicates
    pub fn modifications_list(&self) -> Vec<&Modification> {
        self.psms
            .iter()
            .flat_map(|item| item.modifications().values())
            .collect()
    }

    pub fn file_names(&self) -> Vec<&str> {
        unique(self.report_psms().map(|psm| psm.file_name.as_str()))
    }

    pub fn source_ids(&self) -> Vec<&str> {
        unique(self.psms.iter().filter_map(|item| item.source_id()))
    }

    pub fn spectrum_titles(&self) -> Vec<&str> {
        unique(self.psms.iter().filter_map(|item| item.spectrum_title()))
    }

    pub fn set_is_decoy(&mut self, is_decoy: bool) {
        self.is_decoy = is_decoy;
    }
}

fn unique<'a, I: Iterator<Item = &'a str>>(iter: I) -> Vec<&'a str> {
    let mut seen = FnvHashSet::default();
    iter.filter(|s| seen.insert(*s)).collect()
}

impl FdrComputable for ReportPeptide {
    fn fdr(&self) -> f64 {
        self.fdr
    }

    fn set_fdr(&mut self, fdr: f64) {
        self.fdr = fdr;
    }

    fn q_value(&self) -> f64 {
        self.q_value
    }

    fn set_q_value(&mut self, q_value: f64) {
        self.q_value = q_value;
    }

    fn fdr_score(&self) -> Option<&ScoreModel> {
        self.fdr_score.as_ref()
    }

    fn set_fdr_score(&mut self, value: f64) {
        match self.fdr_score.as_mut() {
            Some(score) => score.value = value,
            None => self.fdr_score = Some(ScoreModel::peptide_level_fdr_score(value)),
        }
    }

    fn is_decoy(&self) -> bool {
        self.is_decoy
    }

    fn is_fdr_good(&self) -> bool {
        self.is_fdr_good
    }

    fn set_is_fdr_good(&mut self, is_fdr_good: bool) {
        self.is_fdr_good = is_fdr_good;
    }

    fn dump_fdr_calculation(&mut self) {
        self.fdr = f64::INFINITY;
        self.q_value = f64::NAN;
        self.fdr_score = None;
        self.is_fdr_good = false;
    }

    /// A peptide is a decoy only if every accession (or, with the
    /// search-engine strategy, every PSM) says so. Peptides without
    /// accessions or PSMs count as decoys.
    fn update_decoy_status(&mut self, strategy: DecoyStrategy, pattern: &DecoyPattern) {
        self.is_decoy = match strategy {
            DecoyStrategy::AccessionPattern => self
                .accessions()
                .iter()
                .all(|acc| pattern.is_match(&acc.accession)),
            DecoyStrategy::SearchEngine => self
                .report_psms()
                .all(|psm| psm.spectrum.is_decoy == Some(true)),
            DecoyStrategy::Inherit => false,
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identification::IdentificationKeySetting::*;
    use crate::psm::PeptideSpectrumMatch;
    use crate::score::{ScoreCatalog, ScoreDirection};
    use quickcheck_macros::quickcheck;

    fn spectrum(id: u64, scan: &str) -> PeptideSpectrumMatch {
        PeptideSpectrumMatch {
            id,
            sequence: "LVNELTEFAK".into(),
            charge: Some(2),
            mass_to_charge: Some(582.3190),
            retention_time: Some(1200.0),
            source_id: Some(scan.into()),
            ..Default::default()
        }
    }

    fn scored(id: u64, scan: &str, q: f64) -> ReportPsm {
        let mut spectrum = spectrum(id, scan);
        spectrum.scores = vec![ScoreCatalog::default().model(score::PSM_LEVEL_Q_VALUE, q)];
        ReportPsm::new(id, "run.mzid", Arc::new(spectrum))
    }

    fn peptide() -> ReportPeptide {
        ReportPeptide::new("LVNELTEFAK", "LVNELTEFAK")
    }

    #[test]
    fn best_score_with_exclusions() {
        let mut pep = peptide();
        pep.add_psm(scored(1, "scan=1", 0.01));
        pep.add_psm(scored(2, "scan=2", 0.001));

        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.001);
        pep.add_to_non_scoring_psms(2);
        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.01);
        assert!(pep.remove_from_non_scoring_psms(2));
        assert!(!pep.remove_from_non_scoring_psms(2));
        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.001);

        pep.add_to_non_scoring_spectra("scan=2:2");
        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.01);
        pep.add_to_non_scoring_spectra("scan=1:2");
        assert!(pep.best_score(score::PSM_LEVEL_Q_VALUE).is_nan());
        assert!(pep.remove_from_non_scoring_spectra("scan=1:2"));
        assert!(!pep.remove_from_non_scoring_spectra("scan=1:2"));
        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.01);
        pep.clear_non_scoring_spectra_keys();

        assert!(pep.best_score("hyperscore").is_nan());
    }

    #[test]
    fn best_score_looks_into_sets() {
        let mut pep = peptide();
        pep.add_psm(ReportPsmSet::new(vec![
            scored(1, "scan=1", 0.02),
            scored(2, "scan=1", 0.005),
        ]));
        pep.add_psm(scored(3, "scan=3", 0.01));

        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.005);
        pep.add_to_non_scoring_psms(2);
        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.01);
        pep.add_to_non_scoring_psms(3);
        assert_eq!(pep.best_score(score::PSM_LEVEL_Q_VALUE), 0.02);
        assert_eq!(
            pep.best_score_model(score::PSM_LEVEL_Q_VALUE)
                .map(|s| s.direction),
            Some(ScoreDirection::LowerIsBetter)
        );
    }

    #[test]
    fn decoy_by_search_engine() {
        let pattern = DecoyPattern::new("rev_.*").unwrap();
        let psm = |id, decoy| {
            let mut s = spectrum(id, "scan=1");
            s.is_decoy = decoy;
            ReportPsm::new(id, "run.mzid", Arc::new(s))
        };

        let mut pep = peptide();
        pep.add_psm(psm(1, Some(true)));
        pep.add_psm(psm(2, Some(true)));
        pep.update_decoy_status(DecoyStrategy::SearchEngine, &pattern);
        assert!(pep.is_decoy());

        let mut pep = peptide();
        pep.add_psm(psm(1, Some(true)));
        pep.add_psm(psm(2, Some(false)));
        pep.update_decoy_status(DecoyStrategy::SearchEngine, &pattern);
        assert!(!pep.is_decoy());

        let mut pep = peptide();
        pep.add_psm(ReportPsmSet::new(vec![psm(1, Some(true)), psm(2, None)]));
        pep.update_decoy_status(DecoyStrategy::SearchEngine, &pattern);
        assert!(!pep.is_decoy());

        pep.set_is_decoy(true);
        pep.update_decoy_status(DecoyStrategy::Inherit, &pattern);
        assert!(!pep.is_decoy());
    }

    #[test]
    fn decoy_by_accession_pattern() {
        let pattern = DecoyPattern::new("rev_.*").unwrap();
        let psm = |id, accessions: &[&str]| {
            let mut s = spectrum(id, "scan=1");
            s.accessions = accessions
                .iter()
                .map(|a| Arc::new(Accession::new(*a)))
                .collect();
            ReportPsm::new(id, "run.mzid", Arc::new(s))
        };

        let mut pep = peptide();
        pep.add_psm(psm(1, &["rev_P1", "rev_P2"]));
        pep.update_decoy_status(DecoyStrategy::AccessionPattern, &pattern);
        assert!(pep.is_decoy());

        pep.add_psm(psm(2, &["P3"]));
        pep.update_decoy_status(DecoyStrategy::AccessionPattern, &pattern);
        assert!(!pep.is_decoy());
    }

    #[test]
    fn spectra_keys_follow_psms() {
        let mut pep = peptide();
        pep.add_psm(scored(1, "scan=1", 0.01));
        pep.add_psm(scored(2, "scan=1", 0.02));
        assert_eq!(
            pep.spectra_identification_keys()
                .iter()
                .collect::<Vec<_>>(),
            vec!["scan=1:2"]
        );
        assert_eq!(pep.nr_spectra(), 1);
        assert_eq!(pep.nr_psms(), 2);

        pep.add_psm(scored(3, "scan=7", 0.03));
        assert!(pep.spectra_identification_keys().contains("scan=7:2"));
        assert_eq!(pep.nr_spectra(), 2);

        pep.add_to_non_scoring_psms(3);
        assert_eq!(pep.scoring_spectra_identification_keys().len(), 1);
    }

    #[test]
    fn settings_shrink_with_psms() {
        let mut pep = peptide();
        assert_eq!(pep.available_identification_key_settings(), KeySettings::SPECTRUM);

        pep.add_psm(scored(1, "scan=1", 0.01));
        let available = pep.available_identification_key_settings();
        assert!(available.contains(SourceId));
        assert!(!available.contains(SpectrumTitle));
        assert!(!available.contains(Sequence));

        let nr = pep.not_redundant_identification_key_settings();
        assert_eq!(nr, KeySettings::empty().with(SourceId).with(Charge));

        let mut anonymous = spectrum(2, "");
        anonymous.source_id = None;
        pep.add_psm(ReportPsm::new(2, "other.mzid", Arc::new(anonymous)));
        assert!(!pep.available_identification_key_settings().contains(SourceId));
        assert_eq!(
            pep.not_redundant_identification_key_settings(),
            KeySettings::empty()
                .with(MassToCharge)
                .with(RetentionTime)
                .with(Charge)
        );
        assert_eq!(pep.file_names(), vec!["run.mzid", "other.mzid"]);
        assert_eq!(pep.source_ids(), vec!["scan=1"]);
    }

    #[test]
    fn remove_set_by_key() {
        let settings = KeySettings::empty().with(SourceId).with(Sequence);
        let mut pep = peptide();
        pep.add_psm(scored(1, "scan=1", 0.01));
        pep.add_psm(ReportPsmSet::new(vec![scored(2, "scan=2", 0.01)]));
        pep.add_psm(ReportPsmSet::new(vec![scored(3, "scan=3", 0.01)]));
        assert_eq!(pep.nr_spectra(), 3);

        let lookup = ReportPsmSet::new(vec![scored(9, "scan=3", 0.5)]);
        let removed = pep.remove_psm_set_by_key(&lookup, settings).unwrap();
        assert_eq!(removed.psms()[0].id, 3);
        assert_eq!(pep.nr_psms(), 2);
        assert_eq!(pep.nr_spectra(), 2);

        let lookup = ReportPsmSet::new(vec![scored(9, "scan=1", 0.5)]);
        assert!(pep.remove_psm_set_by_key(&lookup, settings).is_none());
        assert_eq!(pep.nr_psms(), 2);
    }

    #[test]
    fn spectrum_names_count_items() {
        let mut pep = peptide();
        pep.add_psm(scored(1, "scan=1", 0.01));
        pep.add_psm(ReportPsmSet::new(vec![
            scored(2, "scan=1", 0.01),
            scored(3, "scan=1", 0.01),
        ]));
        pep.add_psm(scored(4, "scan=4", 0.01));

        assert_eq!(pep.psms_by_spectrum_identification_key("scan=1:2").len(), 2);
        assert_eq!(pep.nice_spectrum_name("scan=1:2").as_deref(), Some("scan=1 [2]"));
        assert_eq!(pep.nice_spectrum_name("scan=4:2").as_deref(), Some("scan=4"));
        assert_eq!(pep.nice_spectrum_name("scan=5:2"), None);
    }

    #[test]
    fn readers_on_empty_peptide() {
        let pep = peptide();
        assert_eq!(pep.missed_cleavages(), -1);
        assert_eq!(pep.nr_spectra(), 0);
        assert!(pep.accessions().is_empty());
        assert!(pep.modifications().is_none());
        assert!(pep.modifications_list().is_empty());
        assert!(pep.best_score(score::PSM_LEVEL_Q_VALUE).is_nan());
    }

    #[test]
    fn modifications_keep_duplicates() {
        let mut s = spectrum(1, "scan=1");
        s.missed_cleavages = Some(1);
        s.modifications
            .insert(2, Modification::new(2, 'N', 0.984016));
        let s = Arc::new(s);
        let mut pep = peptide();
        pep.add_psm(ReportPsm::new(1, "a.mzid", s.clone()));
        pep.add_psm(ReportPsm::new(2, "b.mzid", s));
        assert_eq!(pep.modifications_list().len(), 2);
        assert_eq!(pep.modifications().map(BTreeMap::len), Some(1));
        assert_eq!(pep.missed_cleavages(), 1);
        assert_eq!(
            ReportPeptide::create_string_id(&pep.psms()[0], true),
            "LVNELTEFAK:2N[+0.9840]"
        );
    }

    #[test]
    fn fdr_state() {
        let mut pep = peptide();
        assert_eq!(pep.fdr(), f64::INFINITY);
        assert!(pep.q_value().is_nan());
        assert!(pep.fdr_score().is_none());

        pep.set_fdr(0.01);
        pep.set_q_value(0.005);
        pep.set_is_fdr_good(true);
        pep.set_fdr_score(0.2);
        pep.set_fdr_score(0.1);
        let fdr_score = pep.fdr_score().unwrap();
        assert_eq!(fdr_score.short_name, score::PEPTIDE_LEVEL_FDR_SCORE);
        assert_eq!(fdr_score.value, 0.1);

        pep.dump_fdr_calculation();
        pep.dump_fdr_calculation();
        assert_eq!(pep.fdr(), f64::INFINITY);
        assert!(pep.q_value().is_nan());
        assert!(pep.fdr_score().is_none());
        assert!(!pep.is_fdr_good());
    }

    fn from_scores(scores: &[u8]) -> ReportPeptide {
        let mut pep = peptide();
        for (ix, &s) in scores.iter().enumerate() {
            pep.add_psm(scored(ix as u64, &format!("scan={}", ix), s as f64));
        }
        pep
    }

    #[quickcheck]
    fn best_score_is_minimum(scores: Vec<u8>) -> bool {
        let pep = from_scores(&scores);
        let best = pep.best_score(score::PSM_LEVEL_Q_VALUE);
        match scores.iter().min() {
            Some(&min) => best == min as f64,
            None => best.is_nan(),
        }
    }

    #[quickcheck]
    fn excluding_never_improves(scores: Vec<u8>, excluded: u8) -> bool {
        let mut pep = from_scores(&scores);
        let before = pep.best_score(score::PSM_LEVEL_Q_VALUE);
        pep.add_to_non_scoring_psms(excluded as u64 % (scores.len() as u64 + 1));
        let after = pep.best_score(score::PSM_LEVEL_Q_VALUE);
        after.is_nan() || after >= before
    }

    #[quickcheck]
    fn scoring_keys_are_subset(scores: Vec<u8>, excluded: Vec<u8>) -> bool {
        let mut pep = from_scores(&scores);
        for id in excluded {
            pep.add_to_non_scoring_psms(id as u64);
        }
        let all = pep.spectra_identification_keys().clone();
        pep.nr_spectra() == all.len()
            && pep
                .scoring_spectra_identification_keys()
                .iter()
                .all(|key| all.contains(key))
    }
}
