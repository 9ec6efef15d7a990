//! A transferable bonus that conditionally multiplies yield. Present in
//! the data model but not executed by the core unless a patent
//! collection is supplied to the production step (GLOSSARY).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patent {
    pub target: String,
    pub multiplier: f64,
}

/// Multiplies `base_yield` by every patent targeting `target`; an empty
/// `patents` slice leaves `base_yield` unchanged.
pub fn apply_patents(base_yield: f64, target: &str, patents: &[Patent]) -> f64 {
    patents
        .iter()
        .filter(|p| p.target == target)
        .fold(base_yield, |acc, p| acc * p.multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patents_is_a_no_op() {
        assert_eq!(apply_patents(10.0, "mine", &[]), 10.0);
    }

    #[test]
    fn only_matching_targets_apply() {
        let patents = vec![
            Patent { target: "mine".into(), multiplier: 1.5 },
            Patent { target: "refine".into(), multiplier: 2.0 },
        ];
        assert_eq!(apply_patents(10.0, "mine", &patents), 15.0);
        assert_eq!(apply_patents(10.0, "farm", &patents), 10.0);
    }
}
