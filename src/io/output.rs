use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{
    AspectProfile, AspectResult, Role, SentimentProfile, SentimentResult, SlotResult, Transcript,
};

/// Machine-readable profiling report
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub metadata: ReportMetadata,
    pub transcript: Vec<ReportTurn>,
    /// Keyed by aspect label
    pub aspects: BTreeMap<String, Slot<AspectResult>>,
    pub sentiment: SentimentReport,
}

/// Sentiment slots in display order
#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub overall: Slot<SentimentResult>,
    pub agent: Slot<SentimentResult>,
    pub customer: Slot<SentimentResult>,
}

impl SentimentReport {
    pub fn channels(&self) -> [(&'static str, &Slot<SentimentResult>); 3] {
        [
            ("overall", &self.overall),
            ("agent", &self.agent),
            ("customer", &self.customer),
        ]
    }
}

impl From<&SentimentProfile> for SentimentReport {
    fn from(profile: &SentimentProfile) -> Self {
        Self {
            overall: Slot::from(&profile.overall),
            agent: Slot::from(&profile.agent),
            customer: Slot::from(&profile.customer),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub report_id: String,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub total_turns: usize,
    pub speakers: usize,
    pub duration_seconds: f64,
    pub unattributed_words: usize,
    pub aspects_rated: usize,
    pub sentiments_available: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTurn {
    pub role: Role,
    pub speaker_id: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub text: String,
}

/// A profiling slot as the presentation layer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Slot<T> {
    Available { result: T },
    Unavailable { error: String },
}

impl<T: Clone> From<&SlotResult<T>> for Slot<T> {
    fn from(result: &SlotResult<T>) -> Self {
        match result {
            Ok(result) => Slot::Available {
                result: result.clone(),
            },
            Err(e) => Slot::Unavailable {
                error: e.to_string(),
            },
        }
    }
}

impl ProfileReport {
    pub fn new(
        transcript: &Transcript,
        aspects: &AspectProfile,
        sentiment: &SentimentProfile,
        source: Option<String>,
    ) -> Self {
        let turns: Vec<ReportTurn> = transcript
            .utterances()
            .map(|(role, turn)| ReportTurn {
                role,
                speaker_id: turn.speaker_id.clone(),
                start: turn.start,
                end: turn.end,
                duration: turn.duration(),
                text: turn.text.clone(),
            })
            .collect();

        let aspects: BTreeMap<String, Slot<AspectResult>> = aspects
            .iter()
            .map(|(label, result)| (label.clone(), Slot::from(result)))
            .collect();

        let sentiment = SentimentReport::from(sentiment);

        let metadata = ReportMetadata {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            source,
            total_turns: turns.len(),
            speakers: transcript.speakers().len(),
            duration_seconds: transcript.duration(),
            unattributed_words: transcript.unattributed_words,
            aspects_rated: count_available(aspects.values()),
            sentiments_available: count_available(
                sentiment.channels().into_iter().map(|(_, slot)| slot),
            ),
        };

        Self {
            metadata,
            transcript: turns,
            aspects,
            sentiment,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

fn count_available<'a, T: 'a>(slots: impl Iterator<Item = &'a Slot<T>>) -> usize {
    slots
        .filter(|s| matches!(s, Slot::Available { .. }))
        .count()
}

/// Human-readable rendering of a report
pub struct HumanReport<'a> {
    report: &'a ProfileReport,
}

impl<'a> HumanReport<'a> {
    pub fn new(report: &'a ProfileReport) -> Self {
        Self { report }
    }

    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str("TRANSCRIPT\n==========\n\n");
        for turn in &self.report.transcript {
            output.push_str(&format!("[{}] {}:\n", format_timestamp(turn.start), turn.role));
            output.push_str(&wrap_text(&turn.text, 80));
            output.push_str("\n\n");
        }

        output.push_str("CALL QUALITY\n============\n\n");
        for (label, slot) in &self.report.aspects {
            match slot {
                Slot::Available { result } => {
                    output.push_str(&format!("{}: {}/5\n", label, result.rating));
                    output.push_str(&format!("  Reason: {}\n", result.reason));
                    output.push_str(&format!("  Scope of improvement: {}\n", result.suggestion));
                }
                Slot::Unavailable { error } => {
                    output.push_str(&format!("{}: unavailable ({})\n", label, error));
                }
            }
        }

        output.push_str("\nSENTIMENT\n=========\n\n");
        for (channel, slot) in self.report.sentiment.channels() {
            match slot {
                Slot::Available { result } => {
                    output.push_str(&format!("{}: {}\n", result.label, result.sentiment));
                    output.push_str(&format!("  Reason: {}\n", result.reason));
                    output.push_str(&format!("  Scope of improvement: {}\n", result.suggestion));
                }
                Slot::Unavailable { error } => {
                    output.push_str(&format!("{}: unavailable ({})\n", channel, error));
                }
            }
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Format seconds as MM:SS.mmm
pub fn format_timestamp(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    format!("{:02}:{:02}.{:03}", total_secs / 60, total_secs % 60, millis)
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}
