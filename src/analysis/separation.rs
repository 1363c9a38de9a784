//! d-separation oracle.
//!
//! Implements the moralization criterion: X and Y are d-separated given Z
//! iff X and Y are disconnected in the moral graph of the ancestral closure
//! of X ∪ Y ∪ Z after deleting Z. Equivalent to the classical path-blocking
//! rule (chains and forks blocked by conditioning, colliders opened by it).

use super::error::AnalysisError;
use super::moral::moralize_ids;
use super::subsets::IncreasingSubsets;
use crate::graph::{CausalDag, NodeId};
use std::collections::BTreeSet;

/// Decides whether the node sets `xs` and `ys` are d-separated given `zs`.
///
/// The three sets must be pairwise disjoint; `xs` and `ys` must be
/// non-empty, `zs` may be empty. Set semantics: duplicates and ordering
/// within any argument do not affect the result.
pub fn is_d_separated(
    dag: &CausalDag,
    xs: &[&str],
    ys: &[&str],
    zs: &[&str],
) -> Result<bool, AnalysisError> {
    let xs = resolve(dag, xs)?;
    let ys = resolve(dag, ys)?;
    let zs = resolve(dag, zs)?;

    if xs.is_empty() || ys.is_empty() {
        return Err(AnalysisError::EmptyQuerySet);
    }
    check_disjoint(dag, &xs, &ys)?;
    check_disjoint(dag, &xs, &zs)?;
    check_disjoint(dag, &ys, &zs)?;

    let mut union = BTreeSet::new();
    union.extend(&xs);
    union.extend(&ys);
    union.extend(&zs);

    let moral = moralize_ids(dag, union);
    Ok(!moral.connects(&xs, &ys, &zs))
}

/// Every conditional independence the graph structure implies: pairs
/// (x, y) together with each conditioning set Z ⊆ V \ {x, y} that
/// d-separates them. Exponential in node count; intended for small models.
pub fn all_independence_relationships(dag: &CausalDag) -> Vec<(String, String, BTreeSet<String>)> {
    let names = dag.node_names();
    let mut relationships = Vec::new();

    for (i, &x) in names.iter().enumerate() {
        for &y in &names[i + 1..] {
            let rest: Vec<&str> = names
                .iter()
                .copied()
                .filter(|&n| n != x && n != y)
                .collect();
            for zs in IncreasingSubsets::new(rest) {
                let separated = is_d_separated(dag, &[x], &[y], &zs)
                    .expect("BUG: generated query sets are disjoint and valid");
                if separated {
                    relationships.push((
                        x.to_string(),
                        y.to_string(),
                        zs.iter().map(|z| z.to_string()).collect(),
                    ));
                }
            }
        }
    }
    relationships
}

fn resolve(dag: &CausalDag, names: &[&str]) -> Result<BTreeSet<NodeId>, AnalysisError> {
    let mut ids = BTreeSet::new();
    for name in names {
        let id = dag.id_of(name).ok_or_else(|| AnalysisError::InvalidNode {
            name: name.to_string(),
        })?;
        ids.insert(id);
    }
    Ok(ids)
}

fn check_disjoint(
    dag: &CausalDag,
    a: &BTreeSet<NodeId>,
    b: &BTreeSet<NodeId>,
) -> Result<(), AnalysisError> {
    if let Some(&id) = a.intersection(b).next() {
        return Err(AnalysisError::ConditioningOverlap {
            name: dag.name_of(id).to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chain() -> CausalDag {
        CausalDag::from_edges(&[("x1", "x2"), ("x2", "x3")]).unwrap()
    }

    fn fork() -> CausalDag {
        CausalDag::from_edges(&[("x2", "x1"), ("x2", "x3")]).unwrap()
    }

    fn collider() -> CausalDag {
        CausalDag::from_edges(&[("x1", "x2"), ("x3", "x2")]).unwrap()
    }

    fn sprinkler() -> CausalDag {
        CausalDag::from_parts(
            &["season", "rain", "sprinkler", "wet", "slippery"],
            &[
                ("season", "rain"),
                ("season", "sprinkler"),
                ("rain", "wet"),
                ("sprinkler", "wet"),
                ("wet", "slippery"),
            ],
        )
        .unwrap()
    }

    // Chain and fork block on the middle node; the collider does the
    // opposite: marginally separated, opened by conditioning on the child.
    #[rstest]
    #[case::chain_unconditioned(chain(), &[], false)]
    #[case::chain_blocked(chain(), &["x2"], true)]
    #[case::fork_unconditioned(fork(), &[], false)]
    #[case::fork_blocked(fork(), &["x2"], true)]
    #[case::collider_unconditioned(collider(), &[], true)]
    #[case::collider_opened(collider(), &["x2"], false)]
    fn test_three_node_structures(
        #[case] dag: CausalDag,
        #[case] zs: &[&str],
        #[case] expected: bool,
    ) {
        assert_eq!(is_d_separated(&dag, &["x1"], &["x3"], zs).unwrap(), expected);
    }

    #[test]
    fn test_conditioning_on_collider_descendant_opens_path() {
        let dag = CausalDag::from_edges(&[("x1", "x2"), ("x3", "x2"), ("x2", "x4")]).unwrap();
        assert!(is_d_separated(&dag, &["x1"], &["x3"], &[]).unwrap());
        assert!(!is_d_separated(&dag, &["x1"], &["x3"], &["x4"]).unwrap());
    }

    #[rstest]
    #[case(&["season"], &["slippery"], &["wet"], true)]
    #[case(&["season"], &["slippery"], &["rain", "sprinkler"], true)]
    #[case(&["rain"], &["sprinkler"], &[], false)]
    #[case(&["rain"], &["sprinkler"], &["season"], true)]
    #[case(&["rain"], &["sprinkler"], &["wet"], false)]
    fn test_sprinkler_cases(
        #[case] xs: &[&str],
        #[case] ys: &[&str],
        #[case] zs: &[&str],
        #[case] expected: bool,
    ) {
        assert_eq!(is_d_separated(&sprinkler(), xs, ys, zs).unwrap(), expected);
    }

    #[test]
    fn test_symmetry_in_x_and_y() {
        let dag = sprinkler();
        for zs in [&[][..], &["season"][..], &["wet"][..]] {
            assert_eq!(
                is_d_separated(&dag, &["rain"], &["sprinkler"], zs).unwrap(),
                is_d_separated(&dag, &["sprinkler"], &["rain"], zs).unwrap()
            );
        }
    }

    #[test]
    fn test_invariant_under_permutation_and_duplicates() {
        let dag = sprinkler();
        let base = is_d_separated(&dag, &["season"], &["slippery"], &["rain", "sprinkler"]).unwrap();
        assert_eq!(
            base,
            is_d_separated(&dag, &["season"], &["slippery"], &["sprinkler", "rain"]).unwrap()
        );
        assert_eq!(
            base,
            is_d_separated(
                &dag,
                &["season", "season"],
                &["slippery"],
                &["rain", "sprinkler", "rain"]
            )
            .unwrap()
        );
    }

    #[test]
    fn test_overlap_rejected() {
        let dag = sprinkler();
        assert_eq!(
            is_d_separated(&dag, &["rain"], &["sprinkler"], &["rain"]).unwrap_err(),
            AnalysisError::ConditioningOverlap {
                name: "rain".into()
            }
        );
        assert_eq!(
            is_d_separated(&dag, &["rain"], &["rain"], &[]).unwrap_err(),
            AnalysisError::ConditioningOverlap {
                name: "rain".into()
            }
        );
    }

    #[test]
    fn test_empty_query_rejected() {
        let dag = sprinkler();
        assert_eq!(
            is_d_separated(&dag, &[], &["rain"], &[]).unwrap_err(),
            AnalysisError::EmptyQuerySet
        );
    }

    #[test]
    fn test_unknown_node_rejected() {
        let dag = sprinkler();
        assert_eq!(
            is_d_separated(&dag, &["rain"], &["ghost"], &[]).unwrap_err(),
            AnalysisError::InvalidNode {
                name: "ghost".into()
            }
        );
    }

    #[test]
    fn test_all_independence_relationships_on_chain() {
        let found = all_independence_relationships(&chain());
        assert_eq!(
            found,
            vec![(
                "x1".to_string(),
                "x3".to_string(),
                ["x2".to_string()].into_iter().collect()
            )]
        );
    }
}
