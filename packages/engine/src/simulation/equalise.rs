//! Liquid surface equalisation.
//!
//! One raster scan over the grid unions same-element liquid cells into
//! connected groups through their UP and LEFT predecessors, rewriting group
//! slots on merges. Each group carries the surface pairs (liquid cell, air
//! cell directly above it) that the redistribution step may swap. Small
//! puddles are skipped outright.

use crate::domain::element::{Category, EMPTY};
use crate::grid::{Grid, IndexSet};

/// Groups need strictly more members than this to be equalised.
pub const MIN_GROUP_SIZE: usize = 30;

/// Fraction of a group's surface pairs that may swap per tick.
const SWAP_CAP_DIVISOR: usize = 4;

const NO_GROUP: u32 = u32::MAX;

/// A connected same-element liquid region with its equalisation payload.
pub struct EqualisationGroup {
    /// Every member cell, by flat index.
    pub members: Vec<usize>,
    /// Surface members - cells whose UP neighbor is air.
    pub liquids: Vec<usize>,
    /// The air cells paired with `liquids`, in push order.
    pub empties: Vec<usize>,
}

impl EqualisationGroup {
    fn new() -> EqualisationGroup {
        EqualisationGroup {
            members: Vec::new(),
            liquids: Vec::new(),
            empties: Vec::new(),
        }
    }
}

/// Scan the grid once and return the liquid groups large enough to equalise.
///
/// The scan walks rows top-first (y descending in sim space) and columns left
/// to right, so a cell's UP and LEFT neighbors are always already labeled.
pub fn collect_equalisation_groups(grid: &Grid) -> Vec<EqualisationGroup> {
    let w = grid.width();
    let h = grid.height();
    let mut groups: Vec<Option<EqualisationGroup>> = Vec::new();
    let mut group_of: Vec<u32> = vec![NO_GROUP; grid.size()];

    for y in (0..h).rev() {
        for x in 0..w {
            let index = (y * w + x) as usize;
            let p = grid.cell(index);
            if p.category != Category::Liquid {
                continue;
            }

            let up = if y + 1 < h { Some(index + w as usize) } else { None };
            let left = if x > 0 { Some(index - 1) } else { None };
            let has_up = up.is_some_and(|i| grid.cell(i).element == p.element);
            let has_left = left.is_some_and(|i| grid.cell(i).element == p.element);
            let up_empty = up.filter(|&i| grid.cell(i).element == EMPTY);

            let gid = match (has_left, has_up) {
                (false, false) => {
                    groups.push(Some(EqualisationGroup::new()));
                    (groups.len() - 1) as u32
                }
                (true, false) => group_of[left.unwrap()],
                (false, true) => group_of[up.unwrap()],
                (true, true) => {
                    let up_gid = group_of[up.unwrap()];
                    let left_gid = group_of[left.unwrap()];
                    if left_gid != up_gid {
                        merge(&mut groups, &mut group_of, left_gid, up_gid);
                    }
                    up_gid
                }
            };

            group_of[index] = gid;
            let Some(group) = groups[gid as usize].as_mut() else {
                debug_assert!(false, "group slot {} already merged away", gid);
                continue;
            };
            group.members.push(index);
            if let Some(empty_index) = up_empty {
                group.liquids.push(index);
                group.empties.push(empty_index);
            }
        }
    }

    groups
        .into_iter()
        .flatten()
        .filter(|g| g.members.len() > MIN_GROUP_SIZE)
        .collect()
}

/// Fold group `from` into group `into`, relabeling every member. The vacated
/// slot stays in place so later group ids remain stable.
fn merge(groups: &mut [Option<EqualisationGroup>], group_of: &mut [u32], from: u32, into: u32) {
    let Some(absorbed) = groups[from as usize].take() else {
        debug_assert!(false, "merging from an empty slot {}", from);
        return;
    };
    for &index in &absorbed.members {
        group_of[index] = into;
    }
    let Some(target) = groups[into as usize].as_mut() else {
        debug_assert!(false, "merging into an empty slot {}", into);
        return;
    };
    target.members.extend(absorbed.members);
    target.liquids.extend(absorbed.liquids);
    target.empties.extend(absorbed.empties);
}

/// Redistribute each group's surface liquid downwards: highest liquids swap
/// into lowest empties, throttled to a quarter of the available pairs per
/// tick. Returns the number of swaps performed.
pub fn equalise(
    grid: &mut Grid,
    groups: &mut [EqualisationGroup],
    processed: &mut IndexSet,
) -> usize {
    let w = grid.width() as usize;
    let mut total = 0;

    for group in groups.iter_mut() {
        // highest surface liquid first, lowest air cell first
        group.liquids.sort_by(|a, b| (b / w).cmp(&(a / w)));
        group.empties.sort_by_key(|index| index / w);

        let pairs = group.liquids.len().min(group.empties.len());
        let cap = pairs / SWAP_CAP_DIVISOR;
        let mut swapped = 0;
        for i in 0..pairs {
            if swapped >= cap {
                break;
            }
            let (liquid, empty) = (group.liquids[i], group.empties[i]);
            if liquid / w > empty / w {
                grid.swap(liquid, empty, true, true);
                processed.insert(liquid);
                processed.insert(empty);
                swapped += 1;
            }
        }
        total += swapped;
    }
    total
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::rng::seed_nonzero;
    use crate::testutil::test_registry;

    const WATER: u16 = 11;
    const OIL: u16 = 14;

    fn grid(w: u32, h: u32) -> Grid {
        Grid::new(w, h, Arc::new(test_registry()))
    }

    fn fill_block(g: &mut Grid, x0: i32, y0: i32, w: i32, h: i32, element: u16, rng: &mut u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                g.create_at(x, y, element, false, false, rng);
            }
        }
    }

    #[test]
    fn a_block_forms_one_group_with_its_surface_pairs() {
        let mut g = grid(20, 10);
        let mut rng = seed_nonzero(7);
        fill_block(&mut g, 2, 0, 11, 3, WATER, &mut rng);

        let groups = collect_equalisation_groups(&g);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 33);
        // only the top row has air above it
        assert_eq!(groups[0].liquids.len(), 11);
        assert_eq!(groups[0].empties.len(), 11);
        for (&l, &e) in groups[0].liquids.iter().zip(&groups[0].empties) {
            assert_eq!(e, l + 20);
        }
    }

    #[test]
    fn threshold_is_strictly_more_than_thirty_members() {
        let mut g = grid(20, 10);
        let mut rng = seed_nonzero(7);
        fill_block(&mut g, 2, 0, 10, 3, WATER, &mut rng);
        assert!(collect_equalisation_groups(&g).is_empty()); // 30 members: skipped

        let mut g = grid(20, 10);
        fill_block(&mut g, 2, 0, 11, 3, WATER, &mut rng);
        assert_eq!(collect_equalisation_groups(&g).len(), 1); // 33 members: kept
    }

    #[test]
    fn different_liquids_never_share_a_group() {
        let mut g = grid(40, 10);
        let mut rng = seed_nonzero(7);
        fill_block(&mut g, 0, 0, 16, 3, WATER, &mut rng);
        fill_block(&mut g, 16, 0, 16, 3, OIL, &mut rng);

        let groups = collect_equalisation_groups(&g);
        assert_eq!(groups.len(), 2);
        for group in &groups {
            let first = g.cell(group.members[0]).element;
            assert!(group.members.iter().all(|&i| g.cell(i).element == first));
        }
    }

    #[test]
    fn u_shape_merges_into_a_single_group() {
        // Two 2-wide columns joined by a basin row: the scan meets the right
        // column long after the left one and must fold the groups together.
        let mut g = grid(12, 12);
        let mut rng = seed_nonzero(7);
        fill_block(&mut g, 1, 1, 2, 9, WATER, &mut rng);
        fill_block(&mut g, 8, 1, 2, 9, WATER, &mut rng);
        fill_block(&mut g, 1, 0, 9, 1, WATER, &mut rng);

        let groups = collect_equalisation_groups(&g);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 9 + 2 * 9 * 2);
    }

    #[test]
    fn equalise_moves_the_highest_into_the_lowest() {
        // A 7-tall, 5-wide tank of water next to a 1-deep shelf of the same
        // pool: surface cells on the tall side sit above the shelf's air, so
        // swaps must flow that way and never upwards.
        let mut g = grid(30, 12);
        let mut rng = seed_nonzero(7);
        fill_block(&mut g, 0, 0, 5, 7, WATER, &mut rng);
        fill_block(&mut g, 5, 0, 6, 1, WATER, &mut rng);

        let mut groups = collect_equalisation_groups(&g);
        assert_eq!(groups.len(), 1);
        let mut processed = IndexSet::new(g.size());
        let swaps = equalise(&mut g, &mut groups, &mut processed);

        // 5 tall-side surface cells + 6 shelf surface cells = 11 pairs
        assert_eq!(swaps, 11 / SWAP_CAP_DIVISOR);
        // each swap records both endpoints
        assert_eq!(processed.len(), swaps * 2);

        // the swapped water left the tank's top row and landed on the shelf
        let at_tank_top = (0..5).filter(|&x| g.get(x, 6).unwrap().element == WATER).count();
        assert_eq!(at_tank_top, 5 - swaps);
        let on_shelf = (5..11).filter(|&x| g.get(x, 1).unwrap().element == WATER).count();
        assert_eq!(on_shelf, swaps);
        // nothing was created or destroyed
        let water_total = (0..g.size()).filter(|&i| g.cell(i).element == WATER).count();
        assert_eq!(water_total, 5 * 7 + 6);
    }

    #[test]
    fn flat_pools_do_not_churn() {
        let mut g = grid(20, 10);
        let mut rng = seed_nonzero(7);
        fill_block(&mut g, 0, 0, 20, 2, WATER, &mut rng);

        let mut groups = collect_equalisation_groups(&g);
        let mut processed = IndexSet::new(g.size());
        // every surface liquid sits directly below its paired air cell
        assert_eq!(equalise(&mut g, &mut groups, &mut processed), 0);
    }
}
