//! Complete backtracking enumeration of lattice configurations.
//!
//! Every unassigned edge is tried with both values; a full assignment is
//! accepted when each center holds a legal piece. The search never stops
//! early, so the result is the whole solution set for the boundary.

use std::time::Instant;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::geometry::Position;
use crate::lattice::{EdgeValue, LatticeState};
use crate::piece::{state_is_legal, LegalPieces};
use crate::propagation;

/// Backend used to enumerate solutions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Binary split on every free edge, legality checked at the leaves
    #[default]
    BruteForce,
    /// Most-constrained edge first, values limited to legal completions
    Propagating,
}

/// Configuration for the solver
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    pub strategy: SearchStrategy,
}

/// Counters shared by both backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Fully assigned states checked for legality
    pub states_tested: usize,
    /// Frames that split into more than one child
    pub branches: usize,
}

/// Result of the solver search
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub solutions: Vec<LatticeState>,
    pub stats: SearchStats,
    pub time_elapsed_ms: u64,
}

/// A partial assignment waiting to be extended
#[derive(Debug, Clone)]
struct SearchFrame {
    state: LatticeState,
    /// Index of the next edge to fill in the traversal order
    next: usize,
}

/// Run the configured backend on `state`.
///
/// Fails before searching if any boundary edge is unassigned.
pub fn solve(state: &LatticeState, legal: &LegalPieces, config: &SolverConfig) -> Result<SolverResult> {
    check_boundary(state)?;
    let start_time = Instant::now();
    let mut stats = SearchStats::default();

    let solutions = match config.strategy {
        SearchStrategy::BruteForce => brute_force(state, legal, state.unassigned_positions(), &mut stats),
        SearchStrategy::Propagating => propagation::search(state, legal, &mut stats)?,
    };

    let time_elapsed_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "{:?} search found {} solutions ({} states tested, {} branches, {} ms)",
        config.strategy,
        solutions.len(),
        stats.states_tested,
        stats.branches,
        time_elapsed_ms
    );

    Ok(SolverResult {
        solutions,
        stats,
        time_elapsed_ms,
    })
}

/// Every fully assigned state reachable from `state` whose pieces are all legal
pub fn enumerate_solutions(state: &LatticeState, legal: &LegalPieces) -> Result<Vec<LatticeState>> {
    check_boundary(state)?;
    let free = state.unassigned_positions();
    Ok(brute_force(state, legal, free, &mut SearchStats::default()))
}

/// Like [`enumerate_solutions`], filling edges in the given order.
///
/// `order` must list every unassigned edge of `state` exactly once.
pub fn enumerate_solutions_ordered(
    state: &LatticeState,
    legal: &LegalPieces,
    order: &[Position],
) -> Result<Vec<LatticeState>> {
    check_boundary(state)?;

    let mut expected = state.unassigned_positions();
    let mut given = order.to_vec();
    expected.sort();
    given.sort();
    if let Some(pos) = first_difference(&expected, &given) {
        return Err(LatticeError::InvalidCoordinate {
            x: pos.x,
            y: pos.y,
            reason: "traversal order must list every unassigned edge exactly once",
        });
    }

    Ok(brute_force(state, legal, order.to_vec(), &mut SearchStats::default()))
}

fn first_difference(a: &[Position], b: &[Position]) -> Option<Position> {
    let paired = a.iter().zip(b.iter()).find(|(x, y)| x != y).map(|(x, _)| *x);
    paired.or_else(|| match a.len().cmp(&b.len()) {
        std::cmp::Ordering::Greater => Some(a[b.len()]),
        std::cmp::Ordering::Less => Some(b[a.len()]),
        std::cmp::Ordering::Equal => None,
    })
}

fn check_boundary(state: &LatticeState) -> Result<()> {
    if !state.boundary_is_filled() {
        return Err(LatticeError::InvalidBoundary(
            "every boundary edge must be filled before searching".to_string(),
        ));
    }
    Ok(())
}

fn brute_force(
    initial: &LatticeState,
    legal: &LegalPieces,
    free: Vec<Position>,
    stats: &mut SearchStats,
) -> Vec<LatticeState> {
    debug!("brute force over {} free edges", free.len());

    let mut solutions = Vec::new();
    let mut stack = vec![SearchFrame {
        state: initial.clone(),
        next: 0,
    }];

    while let Some(frame) = stack.pop() {
        let Some(&pos) = free.get(frame.next) else {
            stats.states_tested += 1;
            if state_is_legal(&frame.state, legal) {
                trace!("accepted state #{}", solutions.len() + 1);
                solutions.push(frame.state);
            }
            continue;
        };

        stats.branches += 1;
        let mut with_b = frame.state;
        let mut with_a = with_b.clone();
        with_a.assign(pos, EdgeValue::A);
        with_b.assign(pos, EdgeValue::B);

        // B below A on the stack, so A is explored first
        stack.push(SearchFrame {
            state: with_b,
            next: frame.next + 1,
        });
        stack.push(SearchFrame {
            state: with_a,
            next: frame.next + 1,
        });
    }

    solutions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimensions;
    use crate::lattice::BoundaryFill;

    fn canonical(m: usize, n: usize) -> LatticeState {
        let dims = Dimensions::new(m, n).unwrap();
        LatticeState::initial(dims, &BoundaryFill::canonical(dims)).unwrap()
    }

    #[test]
    fn test_single_site_has_one_solution() {
        let state = canonical(1, 1);
        let solutions = enumerate_solutions(&state, &LegalPieces::six_vertex()).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0], state);
    }

    #[test]
    fn test_two_by_one_forces_the_middle_edge() {
        let state = canonical(2, 1);
        let solutions = enumerate_solutions(&state, &LegalPieces::six_vertex()).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].get(Position::new(2, 1)).unwrap(), EdgeValue::B);
    }

    #[test]
    fn test_stats_count_every_leaf() {
        let state = canonical(2, 2);
        let result = solve(&state, &LegalPieces::six_vertex(), &SolverConfig::default()).unwrap();
        assert_eq!(result.solutions.len(), 2);
        // four free edges: 2^4 leaves, 2^4 - 1 splits
        assert_eq!(result.stats.states_tested, 16);
        assert_eq!(result.stats.branches, 15);
    }

    #[test]
    fn test_empty_legal_set_yields_no_solutions() {
        let state = canonical(2, 2);
        let solutions = enumerate_solutions(&state, &LegalPieces::default()).unwrap();
        assert!(solutions.is_empty());
    }

    #[test]
    fn test_open_boundary_fails_before_search() {
        let dims = Dimensions::new(2, 2).unwrap();
        let state = LatticeState::empty(dims);
        assert!(matches!(
            enumerate_solutions(&state, &LegalPieces::six_vertex()),
            Err(LatticeError::InvalidBoundary(_))
        ));
    }

    #[test]
    fn test_reversed_order_finds_the_same_set() {
        let state = canonical(3, 2);
        let legal = LegalPieces::six_vertex();
        let mut order = state.unassigned_positions();
        order.reverse();

        let mut forward = enumerate_solutions(&state, &legal).unwrap();
        let mut backward = enumerate_solutions_ordered(&state, &legal, &order).unwrap();
        assert_eq!(forward.len(), 3);

        let key = |s: &LatticeState| s.to_string();
        forward.sort_by_key(key);
        backward.sort_by_key(key);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_order_must_cover_free_edges() {
        let state = canonical(2, 2);
        let legal = LegalPieces::six_vertex();
        let mut order = state.unassigned_positions();
        let dropped = order.pop().unwrap();

        match enumerate_solutions_ordered(&state, &legal, &order) {
            Err(LatticeError::InvalidCoordinate { x, y, .. }) => {
                assert_eq!(Position::new(x, y), dropped);
            }
            other => panic!("expected InvalidCoordinate, got {:?}", other.map(|s| s.len())),
        }

        order.push(Position::new(1, 0));
        assert!(enumerate_solutions_ordered(&state, &legal, &order).is_err());
    }
}
