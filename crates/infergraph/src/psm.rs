use crate::accession::{Accession, FileId};
use crate::identification::{KeyFields, KeySettings};
use crate::modification::Modification;
use crate::score::ScoreModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// A single peptide spectrum match, as produced by a search engine result
/// parser
pub struct PeptideSpectrumMatch {
    pub id: u64,
    /// File identifier
    pub file_id: FileId,
    /// Unmodified peptide sequence
    pub sequence: String,
    /// Reported precursor charge
    pub charge: Option<i32>,
    /// Experimental precursor m/z
    pub mass_to_charge: Option<f64>,
    /// Retention time, in seconds
    pub retention_time: Option<f64>,
    /// Native spectrum identifier, e.g. `controllerType=0 controllerNumber=1 scan=1042`
    pub source_id: Option<String>,
    pub spectrum_title: Option<String>,
    /// Target/decoy label reported by the search engine, if any
    pub is_decoy: Option<bool>,
    pub missed_cleavages: Option<u32>,
    /// Modifications, keyed by position
    pub modifications: BTreeMap<usize, Modification>,
    pub accessions: Vec<Arc<Accession>>,
    pub scores: Vec<ScoreModel>,
}

impl PeptideSpectrumMatch {
    /// Return the score with the given short name, if this PSM carries one
    pub fn score(&self, short_name: &str) -> Option<&ScoreModel> {
        self.scores.iter().find(|s| s.short_name == short_name)
    }

    /// Modifications in position order, e.g. `3C[+57.0215]5M[+15.9949]`
    pub fn modifications_string(&self) -> String {
        self.modifications
            .values()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("")
    }

    fn key_fields<'a>(&'a self, modifications: &'a str) -> KeyFields<'a> {
        KeyFields {
            source_id: self.source_id.as_deref(),
            spectrum_title: self.spectrum_title.as_deref(),
            mass_to_charge: self.mass_to_charge,
            retention_time: self.retention_time,
            charge: self.charge,
            sequence: &self.sequence,
            modifications,
        }
    }

    /// Identification key options this PSM carries a value for
    pub fn available_identification_key_settings(&self) -> KeySettings {
        self.key_fields("").available()
    }

    pub fn identification_key(&self, settings: KeySettings) -> String {
        let mods = self.modifications_string();
        self.key_fields(&mods).key(settings)
    }

    /// The identification key restricted to the options that describe the
    /// spectrum; sequence and modifications never contribute.
    pub fn spectrum_identification_key(&self, settings: KeySettings) -> String {
        self.key_fields("")
            .key(settings.intersection(&KeySettings::SPECTRUM))
    }

    /// Identifier of the peptide-form: the sequence, followed by the
    /// modifications if these should be considered and there are any
    pub fn peptide_string_id(&self, consider_modifications: bool) -> String {
        if consider_modifications && !self.modifications.is_empty() {
            format!("{}:{}", self.sequence, self.modifications_string())
        } else {
            self.sequence.clone()
        }
    }

    /// A human readable name for the spectrum
    pub fn nice_spectrum_name(&self) -> String {
        if let Some(title) = self.spectrum_title.as_deref().filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        if let Some(source) = self.source_id.as_deref().filter(|s| !s.is_empty()) {
            return source.to_string();
        }
        let mut name = String::new();
        if let Some(mz) = self.mass_to_charge {
            name.push_str(&format!("{:.4}", mz));
        }
        if let Some(z) = self.charge {
            name.push_str(&format!("_{}", z));
        }
        if let Some(rt) = self.retention_time {
            name.push_str(&format!("_{:.2}", rt));
        }
        name
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identification::IdentificationKeySetting::*;

    fn psm() -> PeptideSpectrumMatch {
        let mut modifications = BTreeMap::new();
        modifications.insert(5, Modification::new(5, 'M', 15.994915));
        modifications.insert(3, Modification::new(3, 'C', 57.021464));
        PeptideSpectrumMatch {
            id: 7,
            sequence: "AACAMK".into(),
            charge: Some(2),
            mass_to_charge: Some(356.1502),
            source_id: Some("scan=12".into()),
            modifications,
            ..Default::default()
        }
    }

    #[test]
    fn string_ids() {
        let psm = psm();
        assert_eq!(psm.peptide_string_id(false), "AACAMK");
        assert_eq!(
            psm.peptide_string_id(true),
            "AACAMK:3C[+57.0215]5M[+15.9949]"
        );

        let unmodified = PeptideSpectrumMatch {
            modifications: BTreeMap::new(),
            ..psm
        };
        assert_eq!(unmodified.peptide_string_id(true), "AACAMK");
    }

    #[test]
    fn spectrum_key_ignores_peptide() {
        let psm = psm();
        let settings = KeySettings::all();
        assert_eq!(psm.spectrum_identification_key(settings), "scan=12::356.1502::2");
        assert_eq!(
            psm.identification_key(settings),
            "scan=12::356.1502::2:AACAMK:3C[+57.0215]5M[+15.9949]"
        );
    }

    #[test]
    fn available_settings() {
        let available = psm().available_identification_key_settings();
        assert!(available.contains(SourceId));
        assert!(available.contains(MassToCharge));
        assert!(available.contains(Charge));
        assert!(!available.contains(SpectrumTitle));
        assert!(!available.contains(RetentionTime));
    }

    #[test]
    fn json_with_shared_accessions() {
        let accession = Arc::new(Accession::new("sp|P02768|ALBU_HUMAN").with_file(1));
        let mut psm = psm();
        psm.accessions = vec![accession.clone(), accession];
        psm.scores = vec![ScoreModel::peptide_level_fdr_score(0.01)];

        let json = serde_json::to_string(&psm).unwrap();
        let parsed: PeptideSpectrumMatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, psm);
        assert_eq!(parsed.accessions[1].files.len(), 1);
    }

    #[test]
    fn nice_names() {
        let mut psm = psm();
        assert_eq!(psm.nice_spectrum_name(), "scan=12");
        psm.spectrum_title = Some("run.12.12.2".into());
        assert_eq!(psm.nice_spectrum_name(), "run.12.12.2");
        psm.spectrum_title = None;
        psm.source_id = None;
        assert_eq!(psm.nice_spectrum_name(), "356.1502_2");
    }
}
