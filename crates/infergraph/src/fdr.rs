//! Target/decoy classification, and the state the FDR estimation writes
//! back into the items it scores

use crate::score::ScoreModel;
use crate::Error;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How to decide whether an item is a decoy
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecoyStrategy {
    /// Match the accessions against a regular expression
    #[default]
    AccessionPattern,
    /// Trust the target/decoy labels reported by the search engine
    SearchEngine,
    /// Keep the decision made on another level; items are set to target
    Inherit,
}

/// Regular expression matched against whole accessions
#[derive(Clone, Debug)]
pub struct DecoyPattern {
    pattern: String,
    regex: Regex,
}

impl DecoyPattern {
    pub fn new<S: Into<String>>(pattern: S) -> Result<Self, Error> {
        let pattern = pattern.into();
        match Regex::new(&format!("^(?:{})$", pattern)) {
            Ok(regex) => Ok(Self { pattern, regex }),
            Err(source) => Err(Error::InvalidDecoyPattern { pattern, source }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, accession: &str) -> bool {
        self.regex.is_match(accession)
    }
}

impl std::str::FromStr for DecoyPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// An item that takes part in FDR estimation.
///
/// Freshly created items (and items after
/// [`dump_fdr_calculation`](FdrComputable::dump_fdr_calculation)) have an
/// infinite FDR, a NaN q-value, no FDR score and are not FDR-good.
pub trait FdrComputable {
    fn fdr(&self) -> f64;

    fn set_fdr(&mut self, fdr: f64);

    fn q_value(&self) -> f64;

    fn set_q_value(&mut self, q_value: f64);

    fn fdr_score(&self) -> Option<&ScoreModel>;

    /// Update the value of the FDR score, creating it if necessary
    fn set_fdr_score(&mut self, value: f64);

    fn is_decoy(&self) -> bool;

    fn is_fdr_good(&self) -> bool;

    fn set_is_fdr_good(&mut self, is_fdr_good: bool);

    /// Reset all FDR related values
    fn dump_fdr_calculation(&mut self);

    fn update_decoy_status(&mut self, strategy: DecoyStrategy, pattern: &DecoyPattern);
}
