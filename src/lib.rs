pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;
pub mod stt;

pub use error::{ProfileError, ReconstructError};
pub use io::{HumanReport, ProfileReport, parse_watson_file, parse_watson_json};
pub use llm::{
    AnthropicClient, AnthropicConfig, LlmProvider, WatsonxClient, WatsonxConfig, default_aspects,
    extract_json, extract_json_with_llm,
};
pub use models::{
    AspectDef, AspectProfile, AspectResult, Role, SentimentProfile, SentimentResult,
    SpeakerSegment, TimedWord, Transcript, Turn, WatsonResponse,
};
pub use stages::{
    BoundaryPolicy, ProfilerConfig, SttInput, execute_render, profile_aspects, profile_sentiment,
    reconstruct,
};
pub use stt::{SpeechToText, WatsonSttClient, WatsonSttConfig};
