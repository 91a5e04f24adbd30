use crate::error::{Result, SearchError};
use crate::tokenizer::TokenizerOptions;
use crate::Field;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// BM25 smoothing constants. Only constructible with in-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBm25")]
pub struct Bm25Params {
    k1: f64,
    b: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBm25 {
    #[serde(default = "default_k1")]
    k1: f64,
    #[serde(default = "default_b")]
    b: f64,
}

fn default_k1() -> f64 { 1.5 }
fn default_b() -> f64 { 0.75 }

impl TryFrom<RawBm25> for Bm25Params {
    type Error = SearchError;

    fn try_from(raw: RawBm25) -> Result<Self> {
        Bm25Params::new(raw.k1, raw.b)
    }
}

impl Bm25Params {
    /// `k1` must be finite and non-negative, `b` within `[0, 1]`.
    pub fn new(k1: f64, b: f64) -> Result<Self> {
        if !k1.is_finite() || k1 < 0.0 {
            return Err(SearchError::InvalidBm25 { param: "k1", value: k1 });
        }
        if !(0.0..=1.0).contains(&b) {
            return Err(SearchError::InvalidBm25 { param: "b", value: b });
        }
        Ok(Self { k1, b })
    }

    pub fn k1(&self) -> f64 { self.k1 }
    pub fn b(&self) -> f64 { self.b }
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: default_k1(), b: default_b() }
    }
}

/// Per-field score multipliers. Fields without an entry weigh 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Field, f64>", into = "BTreeMap<Field, f64>")]
pub struct FieldBoosts {
    boosts: BTreeMap<Field, f64>,
}

impl FieldBoosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boosts the original documentation tool used: filename matches count double.
    pub fn filename_weighted() -> Self {
        Self { boosts: BTreeMap::from([(Field::Content, 1.0), (Field::Filename, 2.0)]) }
    }

    pub fn set(&mut self, field: Field, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SearchError::InvalidBoost { field, value });
        }
        self.boosts.insert(field, value);
        Ok(())
    }

    pub fn with(mut self, field: Field, value: f64) -> Result<Self> {
        self.set(field, value)?;
        Ok(self)
    }

    pub fn get(&self, field: Field) -> f64 {
        self.boosts.get(&field).copied().unwrap_or(1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        self.boosts.iter().map(|(f, v)| (*f, *v))
    }

    /// Parse a `field=factor` spec, as given on a command line.
    pub fn parse_entry(spec: &str) -> Result<(Field, f64)> {
        let (name, value) = spec
            .split_once('=')
            .ok_or_else(|| SearchError::Config(format!("expected field=factor, got '{spec}'")))?;
        let field = Field::from_str(name.trim())?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| SearchError::Config(format!("boost factor '{}' is not a number", value.trim())))?;
        Ok((field, value))
    }
}

impl TryFrom<BTreeMap<Field, f64>> for FieldBoosts {
    type Error = SearchError;

    fn try_from(map: BTreeMap<Field, f64>) -> Result<Self> {
        let mut boosts = FieldBoosts::new();
        for (field, value) in map {
            boosts.set(field, value)?;
        }
        Ok(boosts)
    }
}

impl From<FieldBoosts> for BTreeMap<Field, f64> {
    fn from(boosts: FieldBoosts) -> Self {
        boosts.boosts
    }
}

/// Everything a caller can tune, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub bm25: Bm25Params,
    pub boosts: FieldBoosts,
    pub default_k: usize,
    /// Characters of content shown per result by text renderers.
    pub preview_chars: usize,
    pub tokenizer: TokenizerOptions,
    pub keyword_fields: BTreeSet<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            boosts: FieldBoosts::filename_weighted(),
            default_k: 5,
            preview_chars: 200,
            tokenizer: TokenizerOptions::default(),
            keyword_fields: BTreeSet::new(),
        }
    }
}

impl SearchConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let config: SearchConfig = serde_json::from_reader(BufReader::new(f))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what the field types cannot: a usable default result count and
    /// keyword fields that do not shadow text fields.
    pub fn validate(&self) -> Result<()> {
        if self.default_k == 0 {
            return Err(SearchError::InvalidResultCount(0));
        }
        if let Some(name) = self.keyword_fields.iter().find(|n| n.parse::<Field>().is_ok()) {
            return Err(SearchError::Config(format!("'{name}' is a text field and cannot be a keyword field")));
        }
        Ok(())
    }
}
