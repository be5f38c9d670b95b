//! Assembly of report-level items: PSMs from several search engines are
//! combined into PSM sets, and PSM items into report peptides

use crate::fdr::{DecoyPattern, DecoyStrategy, FdrComputable};
use crate::identification::{IdentificationKeySetting, KeySettings};
use crate::peptide::Peptide;
use crate::report::{PsmReportItem, ReportItem, ReportPeptide, ReportPsm, ReportPsmSet};
use crate::score::{ScoreCatalog, ScoreDirection, ScoreModel};
use crate::{Error, FnvIndexMap};
use fnv::FnvHashMap;
use log::info;
use rayon::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Deserialize, Default, Debug)]
/// Settings for assembling PSM sets and report peptides
pub struct Builder {
    /// Identification key options that PSMs must agree on to form a set
    pub psm_set_settings: Option<KeySettings>,
    /// Distinguish peptide-forms by their modifications
    pub consider_modifications: Option<bool>,

    pub decoy_strategy: Option<DecoyStrategy>,
    /// Regular expression matching complete decoy accessions
    pub decoy_pattern: Option<String>,
    /// Ranking direction of scores, in addition to the built-in ones
    pub scores: Option<FnvHashMap<String, ScoreDirection>>,
}

impl Builder {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(Error::Json)
    }

    pub fn make_parameters(self) -> Result<Parameters, Error> {
        use IdentificationKeySetting::*;
        let psm_set_settings = self.psm_set_settings.unwrap_or_else(|| {
            [
                MassToCharge,
                RetentionTime,
                SourceId,
                SpectrumTitle,
                Charge,
                Sequence,
            ]
            .into_iter()
            .collect()
        });

        let mut catalog = ScoreCatalog::default();
        catalog.extend(self.scores.unwrap_or_default());

        Ok(Parameters {
            psm_set_settings,
            consider_modifications: self.consider_modifications.unwrap_or(false),
            decoy_strategy: self.decoy_strategy.unwrap_or_default(),
            decoy_pattern: DecoyPattern::new(
                self.decoy_pattern.unwrap_or_else(|| "rev_.*".into()),
            )?,
            catalog,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Parameters {
    pub psm_set_settings: KeySettings,
    pub consider_modifications: bool,
    pub decoy_strategy: DecoyStrategy,
    pub decoy_pattern: DecoyPattern,
    pub catalog: ScoreCatalog,
}

impl Parameters {
    /// Build a score model, ranked according to the configured catalog
    pub fn score<S: Into<String>>(&self, short_name: S, value: f64) -> ScoreModel {
        self.catalog.model(short_name, value)
    }
}

/// Combine PSMs with the same identification key (under `settings`) into
/// PSM sets. Sets are returned in order of their first PSM.
pub fn group_psm_sets<I>(psms: I, settings: KeySettings) -> Vec<ReportPsmSet>
where
    I: IntoIterator<Item = ReportPsm>,
{
    let start = Instant::now();
    let mut sets: FnvIndexMap<String, ReportPsmSet> = FnvIndexMap::default();
    let mut count = 0;
    for psm in psms {
        count += 1;
        sets.entry(psm.identification_key(settings))
            .or_default()
            .add_psm(psm);
    }
    info!(
        "- grouped {} PSMs into {} PSM sets in {}ms",
        count,
        sets.len(),
        start.elapsed().as_millis()
    );
    sets.into_values().collect()
}

/// Combine PSM items into report peptides (one per peptide-form), link them
/// to the peptides of the inference graph, and classify them as target or
/// decoy. Report peptides are returned in order of their first PSM.
pub fn aggregate_peptides<I>(
    items: I,
    peptides: &FnvHashMap<String, Arc<Peptide>>,
    parameters: &Parameters,
) -> Vec<ReportPeptide>
where
    I: IntoIterator<Item = PsmReportItem>,
{
    let start = Instant::now();
    let mut report: FnvIndexMap<String, ReportPeptide> = FnvIndexMap::default();
    for item in items {
        let string_id = ReportPeptide::create_string_id(&item, parameters.consider_modifications);
        report
            .entry(string_id)
            .or_insert_with_key(|string_id| {
                let peptide = ReportPeptide::new(string_id.clone(), item.sequence());
                match peptides.get(item.sequence()) {
                    Some(graph) => peptide.with_peptide(graph.clone()),
                    None => peptide,
                }
            })
            .add_psm(item);
    }

    let mut report = report.into_values().collect::<Vec<_>>();
    report.par_iter_mut().for_each(|peptide| {
        peptide.update_decoy_status(parameters.decoy_strategy, &parameters.decoy_pattern)
    });

    info!(
        "- aggregated {} report peptides ({} decoys) in {}ms",
        report.len(),
        report.iter().filter(|p| p.is_decoy()).count(),
        start.elapsed().as_millis()
    );
    report
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::accession::Accession;
    use crate::modification::Modification;
    use crate::psm::PeptideSpectrumMatch;
    use crate::score::PSM_LEVEL_Q_VALUE;

    fn psm(id: u64, file: &str, scan: &str, sequence: &str, accession: &str) -> ReportPsm {
        ReportPsm::new(
            id,
            file,
            Arc::new(PeptideSpectrumMatch {
                id,
                sequence: sequence.into(),
                charge: Some(2),
                source_id: Some(scan.into()),
                accessions: vec![Arc::new(Accession::new(accession))],
                ..Default::default()
            }),
        )
    }

    #[test]
    fn defaults() {
        let parameters = Builder::default().make_parameters().unwrap();
        assert!(!parameters.consider_modifications);
        assert_eq!(parameters.decoy_strategy, DecoyStrategy::AccessionPattern);
        assert_eq!(parameters.decoy_pattern.as_str(), "rev_.*");
        assert_eq!(parameters.psm_set_settings.len(), 6);
        assert!(!parameters
            .psm_set_settings
            .contains(IdentificationKeySetting::Modifications));
        assert_eq!(
            parameters.score(PSM_LEVEL_Q_VALUE, 0.1).direction,
            ScoreDirection::LowerIsBetter
        );
    }

    #[test]
    fn from_json() {
        let builder = Builder::from_json(
            r#"{
                "psm_set_settings": {"SOURCE_ID": true, "CHARGE": true, "SEQUENCE": false},
                "consider_modifications": true,
                "decoy_strategy": "SEARCH_ENGINE",
                "decoy_pattern": "DECOY_.*",
                "scores": {"mascot_expect": "LOWER_IS_BETTER"}
            }"#,
        )
        .unwrap();
        let parameters = builder.make_parameters().unwrap();
        assert_eq!(
            parameters.psm_set_settings,
            KeySettings::empty()
                .with(IdentificationKeySetting::SourceId)
                .with(IdentificationKeySetting::Charge)
        );
        assert!(parameters.consider_modifications);
        assert_eq!(parameters.decoy_strategy, DecoyStrategy::SearchEngine);
        assert!(parameters.decoy_pattern.is_match("DECOY_P1"));
        assert_eq!(
            parameters.catalog.direction("mascot_expect"),
            ScoreDirection::LowerIsBetter
        );

        let builder = Builder::from_json(r#"{"psm_set_settings": ["SOURCE_ID", "SEQUENCE"]}"#).unwrap();
        assert_eq!(builder.psm_set_settings.map(|s| s.len()), Some(2));
    }

    #[test]
    fn invalid_configuration() {
        assert!(matches!(Builder::from_json("{\"decoy_strategy\": 1}"), Err(Error::Json(_))));

        let builder = Builder {
            decoy_pattern: Some("[".into()),
            ..Default::default()
        };
        assert!(matches!(
            builder.make_parameters(),
            Err(Error::InvalidDecoyPattern { .. })
        ));
    }

    #[test]
    fn psm_sets_across_engines() {
        let settings = KeySettings::empty()
            .with(IdentificationKeySetting::SourceId)
            .with(IdentificationKeySetting::Sequence);
        let sets = group_psm_sets(
            vec![
                psm(1, "comet.mzid", "scan=1", "PEPTIDE", "P1"),
                psm(2, "comet.mzid", "scan=2", "PEPTIDE", "P1"),
                psm(3, "xtandem.xml", "scan=1", "PEPTIDE", "P1"),
                psm(4, "xtandem.xml", "scan=1", "PEPTIDER", "P1"),
            ],
            settings,
        );
        let ids = sets
            .iter()
            .map(|set| set.psms().iter().map(|p| p.id).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![vec![1, 3], vec![2], vec![4]]);
    }

    #[test]
    fn peptides_from_items() {
        let parameters = Builder::default().make_parameters().unwrap();
        let mut modified = psm(3, "a.mzid", "scan=3", "PEPTIDE", "rev_P1");
        Arc::make_mut(&mut modified.spectrum)
            .modifications
            .insert(1, Modification::new(1, 'P', 79.966331));

        let items: Vec<PsmReportItem> = vec![
            psm(1, "a.mzid", "scan=1", "PEPTIDE", "P1").into(),
            psm(2, "a.mzid", "scan=2", "ELVISLIVES", "rev_P2").into(),
            modified.into(),
        ];

        let mut graph = FnvHashMap::default();
        graph.insert("PEPTIDE".to_string(), Arc::new(Peptide::new(1, "PEPTIDE")));

        let report = aggregate_peptides(items, &graph, &parameters);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].string_id(), "PEPTIDE");
        assert_eq!(report[0].nr_psms(), 2);
        assert!(report[0].peptide().is_some());
        assert!(!report[0].is_decoy());
        assert_eq!(report[1].sequence(), "ELVISLIVES");
        assert!(report[1].peptide().is_none());
        assert!(report[1].is_decoy());

        let parameters = Parameters {
            consider_modifications: true,
            ..parameters
        };
        let report = aggregate_peptides(report[0].psms().to_vec(), &graph, &parameters);
        assert_eq!(report.len(), 2);
        assert_eq!(report[1].string_id(), "PEPTIDE:1P[+79.9663]");
        assert!(report[1].is_decoy());
    }
}
