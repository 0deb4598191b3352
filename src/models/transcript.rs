use std::fmt;

use serde::{Deserialize, Serialize};

/// A single recognized word with its time span in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TimedWord {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A contiguous span attributed to one speaker channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    pub speaker_id: String,
    pub start: f64,
    pub end: f64,
}

impl SpeakerSegment {
    pub fn new(speaker_id: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            start,
            end,
        }
    }
}

/// A maximal same-speaker span of the call with its attributed words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker_id: String,
    /// Start time in seconds (first merged segment)
    pub start: f64,
    /// End time in seconds (last merged segment)
    pub end: f64,
    /// Space-joined words
    pub text: String,
}

impl Turn {
    /// Duration of this turn in seconds
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Call-specific role derived from the raw speaker id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Agent => "agent",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered turns of a call with the speaker that opened the call as agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub turns: Vec<Turn>,
    /// Speaker id of the first turn; every other id is a customer
    pub agent_speaker: String,
    /// Words that ended up in no turn
    #[serde(default)]
    pub unattributed_words: usize,
}

impl Transcript {
    /// Build a transcript, deriving the agent from the first turn.
    /// Returns `None` for an empty turn list.
    pub fn from_turns(turns: Vec<Turn>) -> Option<Self> {
        let agent_speaker = turns.first()?.speaker_id.clone();
        Some(Self {
            turns,
            agent_speaker,
            unattributed_words: 0,
        })
    }

    pub fn role_of(&self, turn: &Turn) -> Role {
        if turn.speaker_id == self.agent_speaker {
            Role::Agent
        } else {
            Role::Customer
        }
    }

    /// Turns paired with their role, in call order
    pub fn utterances(&self) -> impl Iterator<Item = (Role, &Turn)> {
        self.turns.iter().map(move |t| (self.role_of(t), t))
    }

    /// Full transcript as `"<role>: <text>"` lines
    pub fn format(&self) -> String {
        self.format_lines(|_| true)
    }

    /// Only the lines spoken in `role`
    pub fn format_role(&self, role: Role) -> String {
        self.format_lines(|r| r == role)
    }

    fn format_lines(&self, keep: impl Fn(Role) -> bool) -> String {
        self.utterances()
            .filter(|(role, _)| keep(*role))
            .map(|(role, turn)| format!("{}: {}", role, turn.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Distinct raw speaker ids in order of first appearance
    pub fn speakers(&self) -> Vec<&str> {
        let mut speakers: Vec<&str> = Vec::new();
        for turn in &self.turns {
            if !speakers.contains(&turn.speaker_id.as_str()) {
                speakers.push(&turn.speaker_id);
            }
        }
        speakers
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        match (self.turns.first(), self.turns.last()) {
            (Some(first), Some(last)) => (last.end - first.start).max(0.0),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(speaker: &str, start: f64, end: f64, text: &str) -> Turn {
        Turn {
            speaker_id: speaker.to_string(),
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_by_role() {
        let transcript = Transcript::from_turns(vec![
            turn("speaker 0", 0.0, 2.0, "hello how can I help"),
            turn("speaker 1", 2.5, 4.0, "my card is blocked"),
            turn("speaker 0", 4.5, 6.0, "let me check"),
        ])
        .unwrap();

        assert_eq!(
            transcript.format(),
            "agent: hello how can I help\ncustomer: my card is blocked\nagent: let me check"
        );
        assert_eq!(
            transcript.format_role(Role::Agent),
            "agent: hello how can I help\nagent: let me check"
        );
        assert_eq!(transcript.format_role(Role::Customer), "customer: my card is blocked");
        assert_eq!(transcript.duration(), 6.0);
    }

    #[test]
    fn test_empty_turns_has_no_transcript() {
        assert!(Transcript::from_turns(vec![]).is_none());
    }

    #[test]
    fn test_speakers_in_order_of_appearance() {
        let transcript = Transcript::from_turns(vec![
            turn("B", 0.0, 1.0, "a"),
            turn("A", 1.0, 2.0, "b"),
            turn("B", 2.0, 3.0, "c"),
            turn("C", 3.0, 4.0, "d"),
        ])
        .unwrap();

        assert_eq!(transcript.speakers(), vec!["B", "A", "C"]);
        assert_eq!(transcript.role_of(&transcript.turns[3]), Role::Customer);
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), "\"agent\"");
    }
}
