//! Explicit project state with validated, non-mutating updates.
//!
//! Every [`Command`] is applied to a borrowed state and yields a new one, so
//! callers can keep the previous snapshot for undo or memoization.

use crate::error::StateError;
use crate::model::{Cohort, Opportunity, OpportunityMode, ProjectBundle, Stage, Transition};
use crate::projection::{ProjectionReport, Projector};
use crate::walker::{StageVolumes, compute_stage_volumes};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Colours assigned to new cohorts, in rotation.
pub const COHORT_COLORS: [&str; 8] = [
    "#4f46e5", "#059669", "#d97706", "#dc2626", "#7c3aed", "#0891b2", "#be185d", "#65a30d",
];

/// Entry volume given to a new cohort at the first stage.
pub const DEFAULT_COHORT_ENTRY: f64 = 10_000.0;

/// Everything about an opportunity except its id.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityDraft {
    pub name: String,
    pub mode: OpportunityMode,
    pub cohort_ids: Vec<String>,
    pub likelihood: f64,
    pub enabled: bool,
}

impl OpportunityDraft {
    fn into_opportunity(self, id: String) -> Opportunity {
        Opportunity {
            id,
            name: self.name,
            mode: self.mode,
            cohort_ids: self.cohort_ids,
            likelihood: self.likelihood,
            enabled: self.enabled,
        }
    }
}

/// A discrete edit to a project.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddStage {
        name: String,
        is_terminal: bool,
    },
    UpdateStage {
        id: String,
        name: Option<String>,
        is_terminal: Option<bool>,
    },
    RemoveStage {
        id: String,
    },
    AddTransition {
        source_id: String,
        target_id: String,
    },
    RemoveTransition {
        id: String,
    },
    AddCohort {
        name: String,
    },
    UpdateCohort {
        id: String,
        name: Option<String>,
        color: Option<String>,
    },
    /// Also drops the cohort from every opportunity's `cohort_ids`. An
    /// opportunity scoped only to this cohort is left with an empty filter and
    /// so applies to every remaining cohort.
    RemoveCohort {
        id: String,
    },
    SetConversionRate {
        cohort_id: String,
        transition_id: String,
        rate: f64,
    },
    SetCohortEntry {
        cohort_id: String,
        stage_id: String,
        volume: f64,
    },
    RemoveCohortEntry {
        cohort_id: String,
        stage_id: String,
    },
    AddOpportunity(OpportunityDraft),
    UpdateOpportunity {
        id: String,
        draft: OpportunityDraft,
    },
    RemoveOpportunity {
        id: String,
    },
    ToggleOpportunity {
        id: String,
    },
    SelectCohort {
        id: Option<String>,
    },
}

/// The state produced by a command, plus the id of any entity it created.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub state: ProjectState,
    pub created_id: Option<String>,
}

/// A project's entities plus editor selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub bundle: ProjectBundle,
    #[serde(default)]
    pub selected_cohort_id: Option<String>,
}

impl ProjectState {
    pub fn new(bundle: ProjectBundle) -> Self {
        Self {
            bundle,
            selected_cohort_id: None,
        }
    }

    /// Projects every cohort using the default configuration.
    pub fn projection(&self) -> ProjectionReport {
        Projector::builder(&self.bundle)
            .build()
            .project()
            .unwrap_or_default()
    }

    /// Baseline per-stage volumes for one cohort, or `None` if it does not exist.
    pub fn stage_volumes(&self, cohort_id: &str) -> Option<StageVolumes> {
        let cohort = self.bundle.cohort(cohort_id)?;
        Some(compute_stage_volumes(
            &self.bundle.stages,
            &self.bundle.transitions,
            cohort,
        ))
    }

    /// Applies `command` to a copy of this state.
    pub fn apply(&self, command: Command) -> Result<Applied, StateError> {
        let mut next = self.clone();
        let created_id = next.apply_in_place(command)?;
        Ok(Applied {
            state: next,
            created_id,
        })
    }

    fn apply_in_place(&mut self, command: Command) -> Result<Option<String>, StateError> {
        debug!("Applying command: {:?}", command);
        let bundle = &mut self.bundle;

        match command {
            Command::AddStage { name, is_terminal } => {
                let id = new_id();
                bundle.stages.push(Stage::new(id.clone(), name, is_terminal));
                return Ok(Some(id));
            }
            Command::UpdateStage {
                id,
                name,
                is_terminal,
            } => {
                let stage = bundle
                    .stages
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or(StateError::StageNotFound(id))?;
                if let Some(name) = name {
                    stage.name = name;
                }
                if let Some(is_terminal) = is_terminal {
                    stage.is_terminal = is_terminal;
                }
            }
            Command::RemoveStage { id } => {
                if bundle.stage(&id).is_none() {
                    return Err(StateError::StageNotFound(id));
                }
                bundle.stages.retain(|s| s.id != id);

                let incident: Vec<String> = bundle
                    .transitions
                    .iter()
                    .filter(|t| t.source_id == id || t.target_id == id)
                    .map(|t| t.id.clone())
                    .collect();
                for transition_id in &incident {
                    remove_transition(bundle, transition_id);
                }

                for cohort in &mut bundle.cohorts {
                    cohort.entries.remove(&id);
                }
                bundle.opportunities.retain(|o| {
                    !matches!(&o.mode, OpportunityMode::Absolute { target_stage_id, .. } if *target_stage_id == id)
                });
            }
            Command::AddTransition {
                source_id,
                target_id,
            } => {
                for stage_id in [&source_id, &target_id] {
                    if bundle.stage(stage_id).is_none() {
                        return Err(StateError::StageNotFound(stage_id.clone()));
                    }
                }
                if source_id == target_id {
                    return Err(StateError::SelfLoop(source_id));
                }
                if bundle
                    .transitions
                    .iter()
                    .any(|t| t.source_id == source_id && t.target_id == target_id)
                {
                    return Err(StateError::DuplicateTransition {
                        source_id,
                        target_id,
                    });
                }
                let id = new_id();
                bundle
                    .transitions
                    .push(Transition::new(id.clone(), source_id, target_id));
                return Ok(Some(id));
            }
            Command::RemoveTransition { id } => {
                if bundle.transition(&id).is_none() {
                    return Err(StateError::TransitionNotFound(id));
                }
                remove_transition(bundle, &id);
            }
            Command::AddCohort { name } => {
                let id = new_id();
                let color = COHORT_COLORS[bundle.cohorts.len() % COHORT_COLORS.len()];
                let mut cohort = Cohort::new(id.clone(), name);
                cohort.color = color.to_string();
                if let Some(first) = bundle.stages.first() {
                    cohort = cohort.with_entry(first.id.clone(), DEFAULT_COHORT_ENTRY);
                }
                bundle.cohorts.push(cohort);
                return Ok(Some(id));
            }
            Command::UpdateCohort { id, name, color } => {
                let cohort = find_cohort(bundle, &id)?;
                if let Some(name) = name {
                    cohort.name = name;
                }
                if let Some(color) = color {
                    cohort.color = color;
                }
            }
            Command::RemoveCohort { id } => {
                if bundle.cohort(&id).is_none() {
                    return Err(StateError::CohortNotFound(id));
                }
                bundle.cohorts.retain(|c| c.id != id);
                for opp in &mut bundle.opportunities {
                    opp.cohort_ids.retain(|cid| *cid != id);
                }
                if self.selected_cohort_id.as_deref() == Some(id.as_str()) {
                    self.selected_cohort_id = None;
                }
            }
            Command::SetConversionRate {
                cohort_id,
                transition_id,
                rate,
            } => {
                if bundle.transition(&transition_id).is_none() {
                    return Err(StateError::TransitionNotFound(transition_id));
                }
                find_cohort(bundle, &cohort_id)?
                    .conversion_rates
                    .insert(transition_id, rate);
            }
            Command::SetCohortEntry {
                cohort_id,
                stage_id,
                volume,
            } => {
                if bundle.stage(&stage_id).is_none() {
                    return Err(StateError::StageNotFound(stage_id));
                }
                find_cohort(bundle, &cohort_id)?
                    .entries
                    .insert(stage_id, volume);
            }
            Command::RemoveCohortEntry {
                cohort_id,
                stage_id,
            } => {
                find_cohort(bundle, &cohort_id)?.entries.remove(&stage_id);
            }
            Command::AddOpportunity(draft) => {
                let id = new_id();
                bundle
                    .opportunities
                    .push(draft.into_opportunity(id.clone()));
                return Ok(Some(id));
            }
            Command::UpdateOpportunity { id, draft } => {
                let opp = find_opportunity(bundle, &id)?;
                *opp = draft.into_opportunity(id);
            }
            Command::RemoveOpportunity { id } => {
                if bundle.opportunity(&id).is_none() {
                    return Err(StateError::OpportunityNotFound(id));
                }
                bundle.opportunities.retain(|o| o.id != id);
            }
            Command::ToggleOpportunity { id } => {
                let opp = find_opportunity(bundle, &id)?;
                opp.enabled = !opp.enabled;
            }
            Command::SelectCohort { id } => {
                if let Some(cohort_id) = &id {
                    if bundle.cohort(cohort_id).is_none() {
                        return Err(StateError::CohortNotFound(cohort_id.clone()));
                    }
                }
                self.selected_cohort_id = id;
            }
        }
        Ok(None)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Drops a transition along with every cohort rate and rate-mode opportunity on it.
fn remove_transition(bundle: &mut ProjectBundle, id: &str) {
    bundle.transitions.retain(|t| t.id != id);
    for cohort in &mut bundle.cohorts {
        cohort.conversion_rates.remove(id);
    }
    bundle.opportunities.retain(|o| {
        !matches!(&o.mode, OpportunityMode::Rate { edge_id, .. } if edge_id == id)
    });
}

fn find_cohort<'b>(bundle: &'b mut ProjectBundle, id: &str) -> Result<&'b mut Cohort, StateError> {
    bundle
        .cohorts
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| StateError::CohortNotFound(id.to_string()))
}

fn find_opportunity<'b>(
    bundle: &'b mut ProjectBundle,
    id: &str,
) -> Result<&'b mut Opportunity, StateError> {
    bundle
        .opportunities
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| StateError::OpportunityNotFound(id.to_string()))
}
