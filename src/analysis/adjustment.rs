//! Backdoor criterion and adjustment-set search.
//!
//! A candidate set Z is a valid adjustment set for estimating the effect of
//! a treatment on an outcome iff no member of Z descends from the treatment
//! and Z blocks every backdoor path (paths entering the treatment). The
//! blocking test is delegated to the d-separation oracle on the graph with
//! the treatment's outgoing edges removed.

use super::error::AnalysisError;
use super::separation::is_d_separated;
use super::subsets::IncreasingSubsets;
use crate::graph::{CausalDag, NodeId};
use std::collections::BTreeSet;

/// Tests the backdoor criterion for `candidate` relative to the ordered
/// (treatment, outcome) pair. Validity is always recomputed from the graph,
/// never cached.
pub fn satisfies_backdoor(
    dag: &CausalDag,
    treatment: &str,
    outcome: &str,
    candidate: &[&str],
) -> Result<bool, AnalysisError> {
    let t = resolve(dag, treatment)?;
    let o = resolve(dag, outcome)?;
    if t == o {
        return Err(AnalysisError::TreatmentIsOutcome);
    }

    let mut members = BTreeSet::new();
    for name in candidate {
        let id = resolve(dag, name)?;
        if id == t || id == o {
            return Err(AnalysisError::AdjustsForQueryNode {
                name: name.to_string(),
            });
        }
        members.insert(id);
    }

    // (a) Nothing downstream of the treatment may be adjusted for.
    let descendants = dag.descendant_closure(t);
    if members.iter().any(|id| descendants.contains(id)) {
        return Ok(false);
    }

    // (b) With the treatment's outgoing edges cut, only backdoor paths
    //     remain; the candidate must d-separate treatment from outcome.
    let cut = dag.without_outgoing(t);
    let candidate_names: Vec<&str> = members.iter().map(|&id| dag.name_of(id)).collect();
    is_d_separated(&cut, &[treatment], &[outcome], &candidate_names)
}

/// All backdoor paths from `treatment` to `outcome`: skeleton paths of
/// length > 2 whose first step enters the treatment.
pub fn backdoor_paths(
    dag: &CausalDag,
    treatment: &str,
    outcome: &str,
) -> Result<Vec<Vec<String>>, AnalysisError> {
    resolve(dag, treatment)?;
    resolve(dag, outcome)?;

    let parents: BTreeSet<&str> = dag
        .parents_of(treatment)
        .expect("BUG: treatment resolved above")
        .into_iter()
        .collect();
    let paths = dag
        .skeleton_paths_between(treatment, outcome)
        .expect("BUG: endpoints resolved above");

    Ok(paths
        .into_iter()
        .filter(|path| path.len() > 2 && parents.contains(path[1].as_str()))
        .collect())
}

/// Lazy enumeration of valid backdoor adjustment sets, smallest first.
///
/// Candidates are drawn from the non-descendants of the treatment
/// (excluding treatment and outcome themselves). The sequence is finite
/// and restartable; degenerate queries (treatment equals outcome) yield an
/// empty sequence rather than failing, since the absence of a valid set is
/// a legitimate graphical fact.
pub struct AdjustmentSets<'a> {
    dag: &'a CausalDag,
    treatment: String,
    outcome: String,
    subsets: IncreasingSubsets<String>,
    degenerate: bool,
}

impl<'a> AdjustmentSets<'a> {
    pub fn new(
        dag: &'a CausalDag,
        treatment: &str,
        outcome: &str,
    ) -> Result<Self, AnalysisError> {
        let t = resolve(dag, treatment)?;
        resolve(dag, outcome)?;

        let descendants = dag.descendant_closure(t);
        let pool: Vec<String> = dag
            .node_names()
            .into_iter()
            .filter(|&n| n != treatment && n != outcome)
            .filter(|&n| {
                let id = dag.id_of(n).expect("BUG: name listed by the dag");
                !descendants.contains(&id)
            })
            .map(|n| n.to_string())
            .collect();

        Ok(Self {
            dag,
            treatment: treatment.to_string(),
            outcome: outcome.to_string(),
            subsets: IncreasingSubsets::new(pool),
            degenerate: treatment == outcome,
        })
    }
}

impl Iterator for AdjustmentSets<'_> {
    type Item = BTreeSet<String>;

    fn next(&mut self) -> Option<BTreeSet<String>> {
        if self.degenerate {
            return None;
        }
        for subset in self.subsets.by_ref() {
            let names: Vec<&str> = subset.iter().map(|s| s.as_str()).collect();
            let valid = satisfies_backdoor(self.dag, &self.treatment, &self.outcome, &names);
            if matches!(valid, Ok(true)) {
                return Some(subset.into_iter().collect());
            }
        }
        None
    }
}

fn resolve(dag: &CausalDag, name: &str) -> Result<NodeId, AnalysisError> {
    dag.id_of(name).ok_or_else(|| AnalysisError::InvalidNode {
        name: name.to_string(),
    })
}
