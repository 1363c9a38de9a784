//! Renders the factorized joint distribution implied by a causal graph.

use crate::graph::CausalDag;
use std::fmt::Write;

/// Formats the product of conditional factors in topological order, e.g.
/// `P(a)P(b|a)P(c|b)`. Intervened nodes contribute no factor of their own
/// and appear as `do(x)` wherever they condition a child.
pub fn factorization(dag: &CausalDag) -> String {
    let mut output = String::new();

    for name in dag.topological_order() {
        if dag.is_set_node(name) {
            continue;
        }

        let parents = dag
            .parents_of(name)
            .expect("BUG: node listed by the dag itself");
        if parents.is_empty() {
            let _ = write!(output, "P({})", name);
        } else {
            let rendered: Vec<String> = parents
                .iter()
                .map(|&p| {
                    if dag.is_set_node(p) {
                        format!("do({})", p)
                    } else {
                        p.to_string()
                    }
                })
                .collect();
            let _ = write!(output, "P({}|{})", name, rendered.join(","));
        }
    }
    output
}
