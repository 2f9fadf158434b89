use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node in the funnel: an entry point, an intermediate step, or a paid endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_terminal: bool,
}

impl Stage {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_terminal: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_terminal,
        }
    }
}

/// A directed connection between two stages. Cohorts attach a conversion rate to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

impl Transition {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

/// A customer segment with its own entry volumes and conversion rates.
///
/// `entries` maps stage id to entry volume; a cohort may enter at several stages.
/// `conversion_rates` maps transition id to a rate, where a missing entry means 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub entries: BTreeMap<String, f64>,
    #[serde(default)]
    pub conversion_rates: BTreeMap<String, f64>,
}

impl Cohort {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: String::new(),
            entries: BTreeMap::new(),
            conversion_rates: BTreeMap::new(),
        }
    }

    /// Adds an entry point. Volumes landing on the same stage are summed.
    pub fn with_entry(mut self, stage_id: impl Into<String>, volume: f64) -> Self {
        *self.entries.entry(stage_id.into()).or_insert(0.0) += volume;
        self
    }

    pub fn with_rate(mut self, transition_id: impl Into<String>, rate: f64) -> Self {
        self.conversion_rates.insert(transition_id.into(), rate);
        self
    }

    /// The stored rate for a transition, unclamped. Missing rates are 0.
    pub fn rate(&self, transition_id: &str) -> f64 {
        self.conversion_rates
            .get(transition_id)
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of the cohort's volume across all entry points.
    pub fn total_entry_volume(&self) -> f64 {
        self.entries.values().sum()
    }
}

/// Sum of a cohort's entry-point volumes, the denominator of every conversion ratio.
pub fn total_entry_volume(cohort: &Cohort) -> f64 {
    cohort.total_entry_volume()
}

/// What an opportunity changes in the funnel.
#[derive(Debug, Clone, PartialEq)]
pub enum OpportunityMode {
    /// Move one transition's rate toward `target_rate`.
    Rate { edge_id: String, target_rate: f64 },
    /// Inject `absolute_count` new customers at one stage.
    Absolute {
        target_stage_id: String,
        absolute_count: f64,
    },
}

/// A hypothetical intervention, weighted by likelihood and optionally scoped to cohorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OpportunityRecord", into = "OpportunityRecord")]
pub struct Opportunity {
    pub id: String,
    pub name: String,
    pub mode: OpportunityMode,
    /// Empty means the opportunity applies to every cohort.
    pub cohort_ids: Vec<String>,
    pub likelihood: f64,
    pub enabled: bool,
}

impl Opportunity {
    pub fn rate(
        id: impl Into<String>,
        name: impl Into<String>,
        edge_id: impl Into<String>,
        target_rate: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode: OpportunityMode::Rate {
                edge_id: edge_id.into(),
                target_rate,
            },
            cohort_ids: Vec::new(),
            likelihood: 1.0,
            enabled: true,
        }
    }

    pub fn absolute(
        id: impl Into<String>,
        name: impl Into<String>,
        target_stage_id: impl Into<String>,
        absolute_count: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode: OpportunityMode::Absolute {
                target_stage_id: target_stage_id.into(),
                absolute_count,
            },
            cohort_ids: Vec::new(),
            likelihood: 1.0,
            enabled: true,
        }
    }

    pub fn with_likelihood(mut self, likelihood: f64) -> Self {
        self.likelihood = likelihood;
        self
    }

    pub fn with_cohorts<I, S>(mut self, cohort_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cohort_ids = cohort_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// True when the cohort filter is empty or names this cohort.
    pub fn applies_to(&self, cohort_id: &str) -> bool {
        self.cohort_ids.is_empty() || self.cohort_ids.iter().any(|id| id == cohort_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ModeTag {
    Rate,
    Absolute,
}

/// The flat persisted shape of an opportunity. Both modes' fields are always
/// present on the wire; the unused pair holds empty defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpportunityRecord {
    id: String,
    #[serde(default)]
    name: String,
    mode: ModeTag,
    #[serde(default)]
    edge_id: String,
    #[serde(default)]
    target_rate: f64,
    #[serde(default)]
    target_stage_id: String,
    #[serde(default)]
    absolute_count: f64,
    #[serde(default)]
    cohort_ids: Vec<String>,
    #[serde(default = "default_likelihood")]
    likelihood: f64,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_likelihood() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

impl From<OpportunityRecord> for Opportunity {
    fn from(record: OpportunityRecord) -> Self {
        let mode = match record.mode {
            ModeTag::Rate => OpportunityMode::Rate {
                edge_id: record.edge_id,
                target_rate: record.target_rate,
            },
            ModeTag::Absolute => OpportunityMode::Absolute {
                target_stage_id: record.target_stage_id,
                absolute_count: record.absolute_count,
            },
        };
        Self {
            id: record.id,
            name: record.name,
            mode,
            cohort_ids: record.cohort_ids,
            likelihood: record.likelihood,
            enabled: record.enabled,
        }
    }
}

impl From<Opportunity> for OpportunityRecord {
    fn from(opp: Opportunity) -> Self {
        let mut record = OpportunityRecord {
            id: opp.id,
            name: opp.name,
            mode: ModeTag::Rate,
            edge_id: String::new(),
            target_rate: 0.0,
            target_stage_id: String::new(),
            absolute_count: 0.0,
            cohort_ids: opp.cohort_ids,
            likelihood: opp.likelihood,
            enabled: opp.enabled,
        };
        match opp.mode {
            OpportunityMode::Rate {
                edge_id,
                target_rate,
            } => {
                record.edge_id = edge_id;
                record.target_rate = target_rate;
            }
            OpportunityMode::Absolute {
                target_stage_id,
                absolute_count,
            } => {
                record.mode = ModeTag::Absolute;
                record.target_stage_id = target_stage_id;
                record.absolute_count = absolute_count;
            }
        }
        record
    }
}
