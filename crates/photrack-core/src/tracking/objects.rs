use tracing::warn;

use crate::error::{PhotrackError, Result};
use crate::frame::PixelPosition;

/// A named source followed across the frame sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    pub name: String,
    /// Initial-position hypotheses in priority order.
    pub hypotheses: Vec<PixelPosition>,
}

impl TrackedObject {
    pub fn new(name: impl Into<String>, hypotheses: Vec<PixelPosition>) -> Self {
        Self {
            name: name.into(),
            hypotheses,
        }
    }

    pub fn hypothesis(&self, round: usize) -> Option<PixelPosition> {
        self.hypotheses.get(round).copied()
    }
}

/// Number of complete hypothesis rounds, i.e. the shortest hypothesis list.
///
/// Objects with extra hypotheses only contribute up to that count.
pub fn hypothesis_rounds(objects: &[TrackedObject]) -> usize {
    let rounds = objects
        .iter()
        .map(|o| o.hypotheses.len())
        .min()
        .unwrap_or(0);

    if let Some(longest) = objects.iter().map(|o| o.hypotheses.len()).max() {
        if longest != rounds {
            warn!(
                rounds,
                longest, "Objects have unequal hypothesis counts; extra rounds are ignored"
            );
        }
    }
    rounds
}

/// Every object's hypothesis for one round, in object order.
pub fn round_seeds(objects: &[TrackedObject], round: usize) -> Option<Vec<PixelPosition>> {
    objects.iter().map(|o| o.hypothesis(round)).collect()
}

/// Validate an object list before tracking starts.
pub fn validate_objects(objects: &[TrackedObject]) -> Result<usize> {
    if objects.is_empty() {
        return Err(PhotrackError::NoTrackedObjects);
    }
    match hypothesis_rounds(objects) {
        0 => Err(PhotrackError::NoHypothesisRounds),
        rounds => Ok(rounds),
    }
}
