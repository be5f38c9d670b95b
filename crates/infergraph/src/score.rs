//! Named score values, and the catalog that decides how they are ranked

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Short name of the peptide-level FDR score
pub const PEPTIDE_LEVEL_FDR_SCORE: &str = "peptide_fdr_score";
pub const PEPTIDE_LEVEL_Q_VALUE: &str = "peptide_q_value";
pub const PSM_LEVEL_FDR_SCORE: &str = "psm_fdr_score";
pub const PSM_LEVEL_Q_VALUE: &str = "psm_q_value";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreDirection {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

/// A score value, tagged with the short name of the scoring model it
/// belongs to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreModel {
    pub short_name: String,
    pub value: f64,
    pub direction: ScoreDirection,
}

impl ScoreModel {
    pub fn new<S: Into<String>>(short_name: S, value: f64, direction: ScoreDirection) -> Self {
        Self {
            short_name: short_name.into(),
            value,
            direction,
        }
    }

    pub fn peptide_level_fdr_score(value: f64) -> Self {
        Self::new(
            PEPTIDE_LEVEL_FDR_SCORE,
            value,
            ScoreDirection::LowerIsBetter,
        )
    }

    /// A NaN value stands for "no score"
    pub fn is_absent(&self) -> bool {
        self.value.is_nan()
    }

    /// Order two scores best-first: `Less` means `self` is better than
    /// `other`. Absent (NaN) scores rank after every finite score.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        match (self.is_absent(), other.is_absent()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self.direction {
                ScoreDirection::HigherIsBetter => other.value.total_cmp(&self.value),
                ScoreDirection::LowerIsBetter => self.value.total_cmp(&other.value),
            },
        }
    }

    /// Is `self` strictly better than `other`?
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.cmp_rank(other) == Ordering::Less
    }
}

/// Maps score short names to their ranking direction
#[derive(Clone, Debug)]
pub struct ScoreCatalog {
    directions: FnvHashMap<String, ScoreDirection>,
}

impl Default for ScoreCatalog {
    fn default() -> Self {
        let directions = [
            PEPTIDE_LEVEL_FDR_SCORE,
            PEPTIDE_LEVEL_Q_VALUE,
            PSM_LEVEL_FDR_SCORE,
            PSM_LEVEL_Q_VALUE,
        ]
        .into_iter()
        .map(|name| (name.to_string(), ScoreDirection::LowerIsBetter))
        .collect();
        Self { directions }
    }
}

impl ScoreCatalog {
    /// Register (or override) the direction of a score
    pub fn insert<S: Into<String>>(&mut self, short_name: S, direction: ScoreDirection) {
        self.directions.insert(short_name.into(), direction);
    }

    /// Unknown scores are treated as higher-is-better
    pub fn direction(&self, short_name: &str) -> ScoreDirection {
        self.directions
            .get(short_name)
            .copied()
            .unwrap_or_default()
    }

    pub fn model<S: Into<String>>(&self, short_name: S, value: f64) -> ScoreModel {
        let short_name = short_name.into();
        let direction = self.direction(&short_name);
        ScoreModel {
            short_name,
            value,
            direction,
        }
    }
}

impl Extend<(String, ScoreDirection)> for ScoreCatalog {
    fn extend<T: IntoIterator<Item = (String, ScoreDirection)>>(&mut self, iter: T) {
        self.directions.extend(iter)
    }
}

/// The best of a sequence of scores. Absent scores are skipped, and on ties
/// the score seen first is kept.
pub fn best<'a, I>(scores: I) -> Option<&'a ScoreModel>
where
    I: IntoIterator<Item = &'a ScoreModel>,
{
    scores
        .into_iter()
        .filter(|score| !score.is_absent())
        .fold(None, |best, score| match best {
            Some(b) if !score.is_better_than(b) => Some(b),
            _ => Some(score),
        })
}
