use crate::error::PlanError;
use crate::migration::{Catalog, Direction, MigrationFile};
use std::fmt;

/// Where a run should take the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Move to exactly this version (0 = before the first migration)
    ToVersion(u64),
    /// Apply `n` steps; positive goes up, negative goes down
    StepN(i64),
    /// Everything in one direction
    All(Direction),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::ToVersion(v) => write!(f, "migrate to {}", v),
            Directive::StepN(n) => write!(f, "step {}", n),
            Directive::All(direction) => write!(f, "all {}", direction),
        }
    }
}

/// One script to run and the version the store is at once it succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub file: MigrationFile,
    pub resulting_version: u64,
}

/// Ordered steps, consumed front to back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Version of the migration each step runs, in order
    pub fn versions(&self) -> Vec<u64> {
        self.steps.iter().map(|s| s.file.version).collect()
    }

    /// Version the store ends at if every step succeeds
    pub fn final_version(&self) -> Option<u64> {
        self.steps.last().map(|s| s.resulting_version)
    }
}

/// Pure function computing the steps that take `current` to wherever `directive` points
pub fn compute_plan(
    current: u64,
    catalog: &Catalog,
    directive: Directive,
) -> Result<ExecutionPlan, PlanError> {
    match directive {
        Directive::ToVersion(target) => plan_to_version(current, catalog, target),
        Directive::All(Direction::Up) => plan_to_version(current, catalog, catalog.max_version()),
        Directive::All(Direction::Down) => plan_to_version(current, catalog, 0),
        Directive::StepN(n) if n > 0 => plan_steps_up(current, catalog, n.unsigned_abs()),
        Directive::StepN(n) if n < 0 => plan_steps_down(current, catalog, n.unsigned_abs()),
        Directive::StepN(_) => Ok(ExecutionPlan::default()),
    }
}

fn plan_to_version(current: u64, catalog: &Catalog, target: u64) -> Result<ExecutionPlan, PlanError> {
    if target == current {
        return Ok(ExecutionPlan::default());
    }
    if target != 0 && !catalog.contains(target) {
        return Err(PlanError::UnknownVersion(target));
    }

    if target > current {
        let versions: Vec<u64> = catalog
            .versions()
            .filter(|v| *v > current && *v <= target)
            .collect();
        up_steps(catalog, &versions)
    } else {
        let versions = versions_down_from(current, catalog)
            .into_iter()
            .take_while(|v| *v > target)
            .collect::<Vec<_>>();
        down_steps(catalog, &versions)
    }
}

fn plan_steps_up(current: u64, catalog: &Catalog, n: u64) -> Result<ExecutionPlan, PlanError> {
    let available: Vec<u64> = catalog.versions().filter(|v| *v > current).collect();
    if (available.len() as u64) < n {
        return Err(PlanError::InsufficientSteps {
            requested: n,
            available: available.len() as u64,
            direction: Direction::Up,
        });
    }
    up_steps(catalog, &available[..n as usize])
}

fn plan_steps_down(current: u64, catalog: &Catalog, n: u64) -> Result<ExecutionPlan, PlanError> {
    let available = versions_down_from(current, catalog);
    if (available.len() as u64) < n {
        return Err(PlanError::InsufficientSteps {
            requested: n,
            available: available.len() as u64,
            direction: Direction::Down,
        });
    }
    down_steps(catalog, &available[..n as usize])
}

/// Applied versions, newest first. The current version heads the list even
/// when the catalog no longer has it, so the missing down script gets reported.
fn versions_down_from(current: u64, catalog: &Catalog) -> Vec<u64> {
    if current == 0 {
        return Vec::new();
    }
    let mut versions: Vec<u64> = catalog.versions().rev().filter(|v| *v < current).collect();
    versions.insert(0, current);
    versions
}

fn up_steps(catalog: &Catalog, versions: &[u64]) -> Result<ExecutionPlan, PlanError> {
    let steps = versions
        .iter()
        .map(|&version| {
            let file = catalog
                .get(version, Direction::Up)
                .ok_or(PlanError::MissingScript {
                    version,
                    direction: Direction::Up,
                })?;
            Ok(PlanStep {
                file: file.clone(),
                resulting_version: version,
            })
        })
        .collect::<Result<Vec<_>, PlanError>>()?;
    Ok(ExecutionPlan { steps })
}

fn down_steps(catalog: &Catalog, versions: &[u64]) -> Result<ExecutionPlan, PlanError> {
    let mut steps = Vec::with_capacity(versions.len());
    for &version in versions {
        let file = catalog
            .get(version, Direction::Down)
            .ok_or(PlanError::MissingScript {
                version,
                direction: Direction::Down,
            })?;

        // Each down lands on the next version below it
        let resulting_version = catalog.previous_version(version);

        steps.push(PlanStep {
            file: file.clone(),
            resulting_version,
        });
    }
    Ok(ExecutionPlan { steps })
}
