//! Five-component score vector and its closed value domain.

use serde::{Deserialize, Serialize};

use vitrine_core::DomainError;

/// The only values a submitted score component may take. Clients rate on an
/// ordinal 0..=4 scale which is mapped linearly (×25) before submission.
pub const SCORE_DOMAIN: [i64; 5] = [0, 25, 50, 75, 100];

/// One five-component score: either a single vote or a project aggregate.
///
/// Component order is fixed and load-bearing for serialization:
/// design, performance, ease of use, responsiveness, motion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreVector {
    pub design: i64,
    pub performance: i64,
    pub ease_of_use: i64,
    pub responsiveness: i64,
    pub motion: i64,
}

impl ScoreVector {
    pub fn new(design: i64, performance: i64, ease_of_use: i64, responsiveness: i64, motion: i64) -> Self {
        Self {
            design,
            performance,
            ease_of_use,
            responsiveness,
            motion,
        }
    }

    /// The aggregate of a project with no ratings.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Map a client-side ordinal vote (each component 0..=4) into the
    /// percentage domain. Rejects out-of-range ordinals.
    pub fn from_ordinals(ordinals: [i64; 5]) -> Result<Self, DomainError> {
        for &o in &ordinals {
            if !(0..=4).contains(&o) {
                return Err(DomainError::InvalidScoreComponent(o));
            }
        }
        Ok(Self::from_components(ordinals.map(|o| o * 25)))
    }

    pub fn from_components(c: [i64; 5]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4])
    }

    pub fn components(&self) -> [i64; 5] {
        [
            self.design,
            self.performance,
            self.ease_of_use,
            self.responsiveness,
            self.motion,
        ]
    }

    /// Enforce the closed score domain on every component.
    pub fn validate(&self) -> Result<(), DomainError> {
        for c in self.components() {
            if !SCORE_DOMAIN.contains(&c) {
                return Err(DomainError::InvalidScoreComponent(c));
            }
        }
        Ok(())
    }

    /// Componentwise integer-truncated mean of a non-empty set of scores.
    ///
    /// Truncation (not rounding) is observable behavior: the mean of
    /// {25, 50} is 37. Returns `None` for an empty set; the caller decides
    /// what an absent aggregate means.
    pub fn truncated_mean(scores: &[ScoreVector]) -> Option<ScoreVector> {
        if scores.is_empty() {
            return None;
        }

        let n = scores.len() as i64;
        let mut sums = [0i64; 5];
        for s in scores {
            for (sum, c) in sums.iter_mut().zip(s.components()) {
                *sum += c;
            }
        }

        Some(Self::from_components(sums.map(|sum| sum / n)))
    }
}
