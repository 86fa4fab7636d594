//! Read-only ranking projection over islands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Island;

/// Highest-value islands first. Ties keep input order; `n` past the end
/// simply returns every island.
pub fn top_n(islands: &[Island], n: usize) -> Vec<Island> {
    let mut ranked = islands.to_vec();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(n);
    ranked
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopSlot {
    pub slot: usize,
    pub position: usize,
    /// `None` renders as filler.
    pub island: Option<Island>,
}

/// Maps leaderboard positions onto display slots, in layout order.
pub fn fill_slots(islands: &[Island], layout: &BTreeMap<usize, usize>) -> Vec<TopSlot> {
    let deepest = layout.keys().copied().max().unwrap_or(0);
    let ranked = top_n(islands, deepest);
    layout
        .iter()
        .map(|(&position, &slot)| TopSlot {
            slot,
            position,
            island: position
                .checked_sub(1)
                .and_then(|index| ranked.get(index))
                .cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{fill_slots, top_n};
    use crate::model::Island;
    use crate::IslandId;
    use std::collections::BTreeMap;

    fn islands(values: &[f64]) -> Vec<Island> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let mut island = Island::new(IslandId(index as i32 + 1), format!("isle-{index}"));
                island.value = *value;
                island
            })
            .collect()
    }

    #[test]
    fn sorts_by_value_descending() {
        let ranked = top_n(&islands(&[50.0, 10.0, 90.0]), 3);
        let values: Vec<f64> = ranked.iter().map(|island| island.value).collect();
        assert_eq!(values, vec![90.0, 50.0, 10.0]);
    }

    #[test]
    fn oversized_n_returns_everything_without_padding() {
        assert_eq!(top_n(&islands(&[50.0, 10.0, 90.0]), 10).len(), 3);
        assert!(top_n(&[], 5).is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let ranked = top_n(&islands(&[5.0, 7.0, 5.0, 5.0]), 4);
        let ids: Vec<i32> = ranked.iter().map(|island| island.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn slots_past_the_population_are_filler() {
        let layout: BTreeMap<usize, usize> = [(1, 4), (2, 12), (3, 14), (4, 19)].into_iter().collect();
        let slots = fill_slots(&islands(&[1.0, 3.0]), &layout);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].slot, 4);
        assert_eq!(slots[0].island.as_ref().map(|i| i.value), Some(3.0));
        assert_eq!(slots[1].island.as_ref().map(|i| i.value), Some(1.0));
        assert!(slots[2].island.is_none());
        assert!(slots[3].island.is_none());
    }

    #[test]
    fn position_zero_is_never_filled() {
        let layout: BTreeMap<usize, usize> = [(0, 1)].into_iter().collect();
        let slots = fill_slots(&islands(&[1.0]), &layout);
        assert!(slots[0].island.is_none());
    }
}
