//! Identification keys: canonical strings derived from spectrum and PSM
//! fields, used to decide whether two identifications refer to the same
//! spectrum (or the same PSM across search engines)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::str::FromStr;

/// Options that may contribute to an identification key. The declaration
/// order is the order in which segments appear in a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentificationKeySetting {
    SourceId,
    SpectrumTitle,
    MassToCharge,
    RetentionTime,
    Charge,
    Sequence,
    Modifications,
}

impl IdentificationKeySetting {
    pub const ALL: [IdentificationKeySetting; 7] = [
        Self::SourceId,
        Self::SpectrumTitle,
        Self::MassToCharge,
        Self::RetentionTime,
        Self::Charge,
        Self::Sequence,
        Self::Modifications,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SourceId => "SOURCE_ID",
            Self::SpectrumTitle => "SPECTRUM_TITLE",
            Self::MassToCharge => "MASS_TO_CHARGE",
            Self::RetentionTime => "RETENTION_TIME",
            Self::Charge => "CHARGE",
            Self::Sequence => "SEQUENCE",
            Self::Modifications => "MODIFICATIONS",
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSetting(pub String);

impl std::fmt::Display for UnknownSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown identification key setting: {}", self.0)
    }
}

impl std::error::Error for UnknownSetting {}

impl FromStr for IdentificationKeySetting {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.name() == s)
            .ok_or_else(|| UnknownSetting(s.into()))
    }
}

/// The set of enabled identification key options
///
/// Absent and disabled options are equivalent, so this is a plain set.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySettings(u8);

impl KeySettings {
    /// The options describing a spectrum (as opposed to the peptide
    /// assigned to it)
    pub const SPECTRUM: KeySettings = KeySettings(
        (1 << IdentificationKeySetting::SourceId as u8)
            | (1 << IdentificationKeySetting::SpectrumTitle as u8)
            | (1 << IdentificationKeySetting::MassToCharge as u8)
            | (1 << IdentificationKeySetting::RetentionTime as u8)
            | (1 << IdentificationKeySetting::Charge as u8),
    );

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        IdentificationKeySetting::ALL.into_iter().collect()
    }

    pub fn contains(&self, setting: IdentificationKeySetting) -> bool {
        self.0 & setting.bit() != 0
    }

    pub fn insert(&mut self, setting: IdentificationKeySetting) {
        self.0 |= setting.bit();
    }

    pub fn remove(&mut self, setting: IdentificationKeySetting) {
        self.0 &= !setting.bit();
    }

    pub fn with(mut self, setting: IdentificationKeySetting) -> Self {
        self.insert(setting);
        self
    }

    pub fn intersection(&self, other: &KeySettings) -> KeySettings {
        KeySettings(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled options, in key order
    pub fn iter(&self) -> impl Iterator<Item = IdentificationKeySetting> + '_ {
        IdentificationKeySetting::ALL
            .into_iter()
            .filter(|setting| self.contains(*setting))
    }

    /// Build settings from a `{name -> enabled}` map. Unknown names are
    /// rejected.
    pub fn from_map<S: AsRef<str>>(map: &HashMap<S, bool>) -> Result<Self, UnknownSetting> {
        let mut settings = KeySettings::empty();
        for (name, enabled) in map {
            let setting = name.as_ref().parse::<IdentificationKeySetting>()?;
            if *enabled {
                settings.insert(setting);
            }
        }
        Ok(settings)
    }

    /// Project to a `{name -> true}` map
    pub fn to_map(&self) -> HashMap<String, bool> {
        self.iter().map(|s| (s.name().to_string(), true)).collect()
    }
}

impl FromIterator<IdentificationKeySetting> for KeySettings {
    fn from_iter<T: IntoIterator<Item = IdentificationKeySetting>>(iter: T) -> Self {
        let mut settings = KeySettings::empty();
        for setting in iter {
            settings.insert(setting);
        }
        settings
    }
}

impl std::fmt::Debug for KeySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter().map(|s| s.name())).finish()
    }
}

impl Serialize for KeySettings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for KeySettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<IdentificationKeySetting>),
            Map(HashMap<String, bool>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::List(list) => Ok(list.into_iter().collect()),
            Repr::Map(map) => KeySettings::from_map(&map).map_err(serde::de::Error::custom),
        }
    }
}

/// Reduce `available` to a minimal set of options that still tells spectra
/// apart:
/// * `SOURCE_ID` is preferred over `SPECTRUM_TITLE`
/// * if a spectrum identifier is kept, m/z and retention time are dropped
/// * charge is always kept, as one spectrum may be assigned several charges
///
/// Non-spectrum options pass through unchanged.
pub fn no_redundant_settings(available: KeySettings) -> KeySettings {
    use IdentificationKeySetting::*;
    let mut settings = available;
    if settings.contains(SourceId) {
        settings.remove(SpectrumTitle);
    }
    if settings.contains(SourceId) || settings.contains(SpectrumTitle) {
        settings.remove(MassToCharge);
        settings.remove(RetentionTime);
    }
    settings
}

/// The raw fields an identification key may be built from
#[derive(Copy, Clone, Debug, Default)]
pub struct KeyFields<'a> {
    pub source_id: Option<&'a str>,
    pub spectrum_title: Option<&'a str>,
    pub mass_to_charge: Option<f64>,
    pub retention_time: Option<f64>,
    pub charge: Option<i32>,
    pub sequence: &'a str,
    pub modifications: &'a str,
}

impl KeyFields<'_> {
    /// Options for which this record actually carries a value
    pub fn available(&self) -> KeySettings {
        use IdentificationKeySetting::*;
        let mut settings = KeySettings::empty();
        if self.source_id.map_or(false, |s| !s.is_empty()) {
            settings.insert(SourceId);
        }
        if self.spectrum_title.map_or(false, |s| !s.is_empty()) {
            settings.insert(SpectrumTitle);
        }
        if self.mass_to_charge.map_or(false, f64::is_finite) {
            settings.insert(MassToCharge);
        }
        if self.retention_time.map_or(false, f64::is_finite) {
            settings.insert(RetentionTime);
        }
        if self.charge.is_some() {
            settings.insert(Charge);
        }
        if !self.sequence.is_empty() {
            settings.insert(Sequence);
        }
        settings.insert(Modifications);
        settings
    }

    /// Concatenate one segment per enabled option, in key order, separated
    /// by `:`. An enabled option without a value yields an empty segment.
    pub fn key(&self, settings: KeySettings) -> String {
        use IdentificationKeySetting::*;
        let mut key = String::with_capacity(64);
        for (ix, setting) in settings.iter().enumerate() {
            if ix > 0 {
                key.push(':');
            }
            // Writing into a String cannot fail
            let _ = match setting {
                SourceId => key.write_str(self.source_id.unwrap_or_default()),
                SpectrumTitle => key.write_str(self.spectrum_title.unwrap_or_default()),
                MassToCharge => match self.mass_to_charge {
                    Some(mz) => write!(key, "{:.4}", mz),
                    None => Ok(()),
                },
                RetentionTime => match self.retention_time {
                    Some(rt) => write!(key, "{:.2}", rt),
                    None => Ok(()),
                },
                Charge => match self.charge {
                    Some(z) => write!(key, "{}", z),
                    None => Ok(()),
                },
                Sequence => key.write_str(self.sequence),
                Modifications => key.write_str(self.modifications),
            };
        }
        key
    }
}
