//! Most-constrained-edge search.
//!
//! Instead of splitting on the next free edge in grid order, each step picks
//! the free edge with the most filled neighbours (bottom-most, then
//! left-most on ties) and only tries the values that leave every adjacent
//! center with at least one legal completion. A single surviving value is
//! forced without branching. The solution set equals the brute-force one:
//! a value is only dropped when no completion can use it.

use std::cmp::Reverse;

use log::debug;
use smallvec::SmallVec;

use crate::error::Result;
use crate::geometry::Position;
use crate::lattice::{EdgeValue, LatticeState};
use crate::piece::{piece_at, state_is_legal, LegalPieces, Piece};
use crate::solver::SearchStats;

pub(crate) fn search(
    initial: &LatticeState,
    legal: &LegalPieces,
    stats: &mut SearchStats,
) -> Result<Vec<LatticeState>> {
    let mut solutions = Vec::new();
    let mut stack = vec![initial.clone()];
    let mut dead_ends = 0usize;

    while let Some(state) = stack.pop() {
        let free = state.unassigned_positions();
        let Some(target) = select_target(&state, &free)? else {
            stats.states_tested += 1;
            if state_is_legal(&state, legal) {
                solutions.push(state);
            }
            continue;
        };

        let values = candidate_values(&state, target, legal)?;
        match values.len() {
            0 => dead_ends += 1,
            1 => {}
            _ => stats.branches += 1,
        }

        // pushed in reverse so the first candidate is explored first
        for &value in values.iter().rev() {
            let mut next = state.clone();
            next.assign(target, value);
            stack.push(next);
        }
    }

    debug!("propagating search pruned {} dead ends", dead_ends);
    Ok(solutions)
}

/// Free edge with the most filled neighbours; ties go to the smallest `y`, then `x`.
///
/// `None` once nothing is left to fill.
pub(crate) fn select_target(state: &LatticeState, free: &[Position]) -> Result<Option<Position>> {
    let dims = state.dims();
    let mut best: Option<((usize, Reverse<usize>, Reverse<usize>), Position)> = None;
    for &pos in free {
        let filled = dims
            .edge_neighbors(pos)?
            .iter()
            .filter(|&&p| state.value(p).is_filled())
            .count();
        let rank = (filled, Reverse(pos.y), Reverse(pos.x));
        if best.as_ref().map_or(true, |(r, _)| rank > *r) {
            best = Some((rank, pos));
        }
    }
    Ok(best.map(|(_, pos)| pos))
}

/// Values for `target` under which every adjacent center can still be completed legally
pub(crate) fn candidate_values(
    state: &LatticeState,
    target: Position,
    legal: &LegalPieces,
) -> Result<SmallVec<[EdgeValue; 2]>> {
    let dims = state.dims();
    let centers = dims.neighbor_centers(target)?;

    let mut values = SmallVec::new();
    'value: for value in EdgeValue::FILLED {
        for &center in &centers {
            let piece = piece_with(state, center, target, value)?;
            if legal.completions(&piece).next().is_none() {
                continue 'value;
            }
        }
        values.push(value);
    }
    Ok(values)
}

/// The piece at `center` with `target` read as `value`
fn piece_with(state: &LatticeState, center: Position, target: Position, value: EdgeValue) -> Result<Piece> {
    let edges = state.dims().center_to_edges(center)?;
    let mut slots = piece_at(state, center)?.as_array();
    for (slot, pos) in slots.iter_mut().zip(edges) {
        if pos == target {
            *slot = value;
        }
    }
    Ok(Piece::from_array(slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimensions;
    use crate::lattice::BoundaryFill;
    use crate::solver::enumerate_solutions;

    fn canonical(m: usize, n: usize) -> LatticeState {
        let dims = Dimensions::new(m, n).unwrap();
        LatticeState::initial(dims, &BoundaryFill::canonical(dims)).unwrap()
    }

    #[test]
    fn test_select_prefers_bottom_left_on_ties() {
        let state = canonical(2, 2);
        let free = state.unassigned_positions();
        // all four free edges see four filled neighbours
        let target = select_target(&state, &free).unwrap();
        assert_eq!(target, Some(Position::new(2, 1)));
        assert_eq!(select_target(&state, &[]).unwrap(), None);
    }

    #[test]
    fn test_forced_value() {
        let state = canonical(2, 1);
        let target = Position::new(2, 1);
        let values = candidate_values(&state, target, &LegalPieces::six_vertex()).unwrap();
        assert_eq!(values.as_slice(), &[EdgeValue::B]);
    }

    #[test]
    fn test_matches_brute_force() {
        let legal = LegalPieces::six_vertex();
        for (m, n) in [(1, 1), (2, 1), (2, 2), (3, 2), (2, 3), (3, 3)] {
            let state = canonical(m, n);
            let mut stats = SearchStats::default();
            let mut fast = search(&state, &legal, &mut stats).unwrap();
            let mut slow = enumerate_solutions(&state, &legal).unwrap();

            let key = |s: &LatticeState| s.to_string();
            fast.sort_by_key(key);
            slow.sort_by_key(key);
            assert_eq!(fast, slow, "{}x{}", m, n);
        }
    }

    #[test]
    fn test_prunes_the_search() {
        let legal = LegalPieces::six_vertex();
        let state = canonical(3, 3);
        let mut stats = SearchStats::default();
        let solutions = search(&state, &legal, &mut stats).unwrap();
        assert_eq!(solutions.len(), 6);
        // brute force tests 2^12 leaves
        assert!(stats.states_tested < 1 << 12);
    }
}
