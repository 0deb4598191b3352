use tracing::{debug, warn};

use crate::error::ReconstructError;
use crate::models::{SpeakerSegment, TimedWord, Transcript, Turn};

/// How words that cross a turn boundary are attributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// A word failing containment ends the current turn and seeds the text
    /// of the next one, whatever its timestamps.
    #[default]
    CarryOver,
    /// Every word goes to the turn in which it begins.
    Strict,
}

/// Build a speaker-attributed transcript from word timestamps and
/// diarization segments.
///
/// Consecutive same-speaker segments are merged into turns first, then words
/// are consumed from a single forward-only cursor. The first turn's speaker
/// becomes the agent.
pub fn reconstruct(
    words: &[TimedWord],
    segments: &[SpeakerSegment],
    policy: BoundaryPolicy,
) -> Result<Transcript, ReconstructError> {
    validate_inputs(words, segments)?;

    let runs = merge_segments(segments);
    let (turns, unattributed) = match policy {
        BoundaryPolicy::CarryOver => attribute_carry_over(words, runs),
        BoundaryPolicy::Strict => attribute_strict(words, runs),
    };

    let mut transcript =
        Transcript::from_turns(turns).ok_or(ReconstructError::EmptyInput("segment"))?;
    transcript.unattributed_words = unattributed;

    if unattributed > 0 {
        warn!(
            "{} of {} words fall after the last turn and were not attributed",
            unattributed,
            words.len()
        );
    }
    debug!(
        "Reconstructed {} turns from {} segments, agent is {:?}",
        transcript.turns.len(),
        segments.len(),
        transcript.agent_speaker
    );

    Ok(transcript)
}

fn validate_inputs(words: &[TimedWord], segments: &[SpeakerSegment]) -> Result<(), ReconstructError> {
    if words.is_empty() {
        return Err(ReconstructError::EmptyInput("word"));
    }
    if segments.is_empty() {
        return Err(ReconstructError::EmptyInput("segment"));
    }

    let spans = words
        .iter()
        .enumerate()
        .map(|(i, w)| ("word", i, w.start, w.end))
        .chain(
            segments
                .iter()
                .enumerate()
                .map(|(i, s)| ("segment", i, s.start, s.end)),
        );

    for (kind, index, start, end) in spans {
        if !start.is_finite() || !end.is_finite() || end < start {
            return Err(ReconstructError::MalformedTimestamp {
                kind,
                index,
                start,
                end,
            });
        }
    }

    Ok(())
}

/// Merge consecutive segments of the same speaker into maximal runs.
///
/// Returned turns carry the run boundaries and an empty text.
pub fn merge_segments(segments: &[SpeakerSegment]) -> Vec<Turn> {
    let mut runs: Vec<Turn> = Vec::new();

    for segment in segments {
        match runs.last_mut() {
            Some(run) if run.speaker_id == segment.speaker_id => {
                run.end = segment.end;
            }
            _ => runs.push(Turn {
                speaker_id: segment.speaker_id.clone(),
                start: segment.start,
                end: segment.end,
                text: String::new(),
            }),
        }
    }

    runs
}

/// Returns the turns and the number of words left without a turn.
fn attribute_carry_over(words: &[TimedWord], mut runs: Vec<Turn>) -> (Vec<Turn>, usize) {
    let mut cursor = 0;
    let mut seed: Option<&str> = None;

    for run in runs.iter_mut() {
        // Only a rejected word seeds the next turn. A turn that runs out of
        // words passes nothing on, so no word is ever emitted twice.
        let mut parts: Vec<&str> = seed.take().into_iter().collect();

        while let Some(word) = words.get(cursor) {
            cursor += 1;
            if word.start >= run.start && word.end <= run.end {
                parts.push(word.text.as_str());
            } else {
                seed = Some(word.text.as_str());
                break;
            }
        }

        run.text = parts.join(" ");
    }

    // A seed still pending after the last turn has nowhere to go, and the
    // cursor never reaches the words behind it.
    let unattributed = usize::from(seed.is_some()) + (words.len() - cursor);
    (runs, unattributed)
}

fn attribute_strict(words: &[TimedWord], mut runs: Vec<Turn>) -> (Vec<Turn>, usize) {
    let mut cursor = 0;

    for i in 0..runs.len() {
        let next_start = runs.get(i + 1).map(|r| r.start);
        let mut parts: Vec<&str> = Vec::new();

        while let Some(word) = words.get(cursor) {
            if next_start.is_some_and(|start| word.start >= start) {
                break;
            }
            parts.push(word.text.as_str());
            cursor += 1;
        }

        runs[i].text = parts.join(" ");
    }

    (runs, 0)
}
