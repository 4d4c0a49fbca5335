//! Dependency ordering of applicable blocks.
//!
//! Topological sort over explicit `depends_on` edges. Among blocks that are
//! ready, the lowest priority number goes first, then declaration order, so
//! the result is a deterministic function of the candidate list.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use survey_types::{Result, SurveyError};

use crate::block::InstructionBlock;

/// Order `candidates` so every block follows the candidates it depends on.
///
/// Dependencies on blocks outside `candidates` impose no constraint. A cycle
/// among candidates is a configuration error naming one block on the cycle.
pub fn sort_blocks_with_dependencies<'a>(
    candidates: &[&'a InstructionBlock],
) -> Result<Vec<&'a InstructionBlock>> {
    let position: HashMap<&str, usize> = candidates
        .iter()
        .enumerate()
        .rev()
        .map(|(i, b)| (b.id.as_str(), i))
        .collect();

    // dependents[i] = candidates that must wait for candidate i
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); candidates.len()];
    let mut pending: Vec<usize> = vec![0; candidates.len()];

    for (i, block) in candidates.iter().enumerate() {
        let mut seen = HashSet::new();
        for dep in &block.depends_on {
            if let Some(&d) = position.get(dep.as_str()) {
                if seen.insert(d) {
                    dependents[d].push(i);
                    pending[i] += 1;
                }
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<(i32, usize)>> = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| pending[*i] == 0)
        .map(|(i, b)| Reverse((b.priority, i)))
        .collect();

    let mut ordered = Vec::with_capacity(candidates.len());
    while let Some(Reverse((_, i))) = ready.pop() {
        ordered.push(candidates[i]);
        for &next in &dependents[i] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.push(Reverse((candidates[next].priority, next)));
            }
        }
    }

    if ordered.len() < candidates.len() {
        let block = cycle_member(candidates, &position, &pending);
        tracing::error!(block = %block, "Dependency cycle among applicable blocks");
        return Err(SurveyError::DependencyCycle { block });
    }

    Ok(ordered)
}

/// Walk unresolved dependencies until a block repeats; that block is on a cycle.
fn cycle_member(
    candidates: &[&InstructionBlock],
    position: &HashMap<&str, usize>,
    pending: &[usize],
) -> String {
    let Some(mut current) = pending.iter().position(|&p| p > 0) else {
        return String::new();
    };
    let mut visited = HashSet::new();
    while visited.insert(current) {
        let next = candidates[current]
            .depends_on
            .iter()
            .filter_map(|dep| position.get(dep.as_str()).copied())
            .find(|&d| pending[d] > 0);
        match next {
            Some(d) => current = d,
            None => break,
        }
    }
    candidates[current].id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, priority: i32, deps: &[&str]) -> InstructionBlock {
        deps.iter().fold(
            InstructionBlock::new(id, "s", id).priority(priority),
            |b, d| b.depends_on(*d),
        )
    }

    fn ids(ordered: &[&InstructionBlock]) -> Vec<String> {
        ordered.iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn orders_by_priority_without_dependencies() {
        let blocks = [block("c", 30, &[]), block("a", 10, &[]), block("b", 20, &[])];
        let refs: Vec<_> = blocks.iter().collect();
        let ordered = sort_blocks_with_dependencies(&refs).unwrap();
        assert_eq!(ids(&ordered), vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_priority_keeps_declaration_order() {
        let blocks = [block("x", 5, &[]), block("y", 5, &[]), block("z", 5, &[])];
        let refs: Vec<_> = blocks.iter().collect();
        let ordered = sort_blocks_with_dependencies(&refs).unwrap();
        assert_eq!(ids(&ordered), vec!["x", "y", "z"]);
    }

    #[test]
    fn dependency_overrides_priority() {
        // "b" has the smaller number but must wait for "a".
        let blocks = [block("b", 1, &["a"]), block("a", 50, &[])];
        let refs: Vec<_> = blocks.iter().collect();
        let ordered = sort_blocks_with_dependencies(&refs).unwrap();
        assert_eq!(ids(&ordered), vec!["a", "b"]);
    }

    #[test]
    fn dependency_order_independent_of_declaration() {
        let a = block("a", 10, &[]);
        let b = block("b", 20, &["a"]);
        for refs in [vec![&a, &b], vec![&b, &a]] {
            let ordered = sort_blocks_with_dependencies(&refs).unwrap();
            assert_eq!(ids(&ordered), vec!["a", "b"]);
        }
    }

    #[test]
    fn missing_dependency_is_ignored() {
        let blocks = [block("b", 20, &["not-applicable"]), block("c", 10, &[])];
        let refs: Vec<_> = blocks.iter().collect();
        let ordered = sort_blocks_with_dependencies(&refs).unwrap();
        assert_eq!(ids(&ordered), vec!["c", "b"]);
    }

    #[test]
    fn chain_of_dependencies() {
        let blocks = [
            block("d", 1, &["c"]),
            block("c", 1, &["b"]),
            block("b", 1, &["a"]),
            block("a", 1, &[]),
        ];
        let refs: Vec<_> = blocks.iter().collect();
        let ordered = sort_blocks_with_dependencies(&refs).unwrap();
        assert_eq!(ids(&ordered), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn cycle_fails_fast_naming_a_member() {
        let blocks = [
            block("root", 1, &[]),
            block("x", 10, &["y"]),
            block("y", 20, &["x"]),
            block("downstream", 30, &["y"]),
        ];
        let refs: Vec<_> = blocks.iter().collect();
        let err = sort_blocks_with_dependencies(&refs).unwrap_err();
        match err {
            SurveyError::DependencyCycle { block } => {
                assert!(block == "x" || block == "y", "unexpected block {block}");
            }
            other => panic!("Expected DependencyCycle, got: {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let blocks = [block("loop", 1, &["loop"])];
        let refs: Vec<_> = blocks.iter().collect();
        assert!(matches!(
            sort_blocks_with_dependencies(&refs),
            Err(SurveyError::DependencyCycle { .. })
        ));
    }
}
