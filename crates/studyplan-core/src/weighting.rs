//! Proficiency to time-share weighting.
//!
//! `weight = 6 - proficiency`, so the weakest subject (1) weighs 5 and the
//! strongest (5) weighs 1. Shares are weights normalized over the plan.

use crate::plan::{Subject, MAX_PROFICIENCY};

/// Relative weight for a proficiency in 1..=5. Out-of-range values clamp.
pub fn weight(proficiency: u8) -> u32 {
    let p = proficiency.clamp(1, MAX_PROFICIENCY) as u32;
    MAX_PROFICIENCY as u32 + 1 - p
}

/// A subject's fractional claim on study time.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectShare {
    pub name: String,
    pub proficiency: u8,
    pub weight: u32,
    pub share: f64,
}

/// Shares for `subjects`, in input order. Sums to 1.0 for a non-empty list.
pub fn shares(subjects: &[Subject]) -> Vec<SubjectShare> {
    let total: u32 = subjects.iter().map(|s| weight(s.proficiency)).sum();
    subjects
        .iter()
        .map(|s| {
            let w = weight(s.proficiency);
            SubjectShare {
                name: s.name.clone(),
                proficiency: s.proficiency,
                weight: w,
                share: if total == 0 {
                    0.0
                } else {
                    w as f64 / total as f64
                },
            }
        })
        .collect()
}

/// Indices of `subjects` ordered weakest first; ties keep input order.
pub fn priority_order(subjects: &[Subject]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..subjects.len()).collect();
    order.sort_by_key(|&i| subjects[i].proficiency);
    order
}

/// Index of the weakest subject (first in input order on ties).
pub fn weakest(subjects: &[Subject]) -> Option<usize> {
    priority_order(subjects).first().copied()
}
