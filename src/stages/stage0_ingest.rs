use crate::error::ReconstructError;
use crate::models::{SpeakerSegment, TimedWord, Transcript, WatsonResponse};

use super::{BoundaryPolicy, reconstruct};

/// Typed inputs of the reconstructor, extracted from a provider response
#[derive(Debug, Clone, Default)]
pub struct SttInput {
    pub words: Vec<TimedWord>,
    pub segments: Vec<SpeakerSegment>,
}

impl SttInput {
    /// Map the two fields the reconstructor needs; everything else in the
    /// response is ignored.
    pub fn from_watson(response: &WatsonResponse) -> Self {
        let words = response
            .timestamps()
            .map(|(text, start, end)| TimedWord::new(text.clone(), *start, *end))
            .collect();

        let segments = response
            .speaker_labels
            .iter()
            .map(|label| SpeakerSegment::new(label.speaker.label(), label.from, label.to))
            .collect();

        Self { words, segments }
    }

    pub fn reconstruct(&self, policy: BoundaryPolicy) -> Result<Transcript, ReconstructError> {
        reconstruct(&self.words, &self.segments, policy)
    }
}
