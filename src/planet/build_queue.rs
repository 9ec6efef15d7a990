//! FIFO build progression (§4.5.5, Testable Property 8).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::registry::Cost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildCategory {
    Building,
    Defense,
}

/// Minimum `total_industry_points` used when deriving `build_time_seconds`,
/// so a freshly-seeded planet with zero industry never divides by zero
/// (§9 Design Notes).
pub const MIN_TOTAL_INDUSTRY_POINTS: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOrder {
    pub item_id: String,
    pub item_name: String,
    pub build_time_seconds: f64,
    pub cost: Cost,
    pub category: BuildCategory,
    #[serde(default)]
    pub progress_seconds: f64,
    #[serde(default)]
    pub target_slot: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildQueue {
    pub orders: VecDeque<BuildOrder>,
}

impl BuildQueue {
    pub fn push(&mut self, order: BuildOrder) {
        self.orders.push_back(order);
    }

    /// Advance only the head order. Returns the order if this tick
    /// completed it (caller finalizes slot/defense state and dequeues).
    pub fn tick(&mut self, delta_seconds: f64) -> Option<BuildOrder> {
        let completed = {
            let head = self.orders.front_mut()?;
            head.progress_seconds += delta_seconds;
            head.progress_seconds >= head.build_time_seconds
        };
        if completed {
            self.orders.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

pub fn build_time_seconds(industry_cost: f64, total_industry_points: f64) -> f64 {
    let denom = total_industry_points.max(MIN_TOTAL_INDUSTRY_POINTS);
    (industry_cost / denom) * 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(name: &str, build_time: f64) -> BuildOrder {
        BuildOrder {
            item_id: name.into(),
            item_name: name.into(),
            build_time_seconds: build_time,
            cost: Cost::default(),
            category: BuildCategory::Building,
            progress_seconds: 0.0,
            target_slot: Some(0),
        }
    }

    #[test]
    fn only_the_head_order_advances() {
        let mut queue = BuildQueue::default();
        queue.push(order("a", 1.0));
        queue.push(order("b", 2.0));
        queue.push(order("c", 3.0));

        let mut completions = Vec::new();
        for t in 1..=6 {
            if let Some(done) = queue.tick(1.0) {
                completions.push((t, done.item_id));
            }
        }
        assert_eq!(
            completions,
            vec![(1, "a".to_string()), (3, "b".to_string()), (6, "c".to_string())]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn build_time_clamps_zero_industry_points() {
        let t = build_time_seconds(1000.0, 0.0);
        assert_eq!(t, 1000.0 / MIN_TOTAL_INDUSTRY_POINTS * 60.0);
        assert!(t.is_finite());
    }

    #[test]
    fn build_time_matches_scenario_s6() {
        let t = build_time_seconds(1000.0, 1000.0);
        assert_eq!(t, 60.0);
    }
}
