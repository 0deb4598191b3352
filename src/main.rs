use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use call_profiler::{
    AnthropicClient, AnthropicConfig, BoundaryPolicy, LlmProvider, ProfileReport, ProfilerConfig,
    SpeechToText, WatsonSttClient, WatsonSttConfig, WatsonxClient, WatsonxConfig, default_aspects,
    execute_render, parse_watson_file, profile_aspects, profile_sentiment,
};

#[derive(Parser)]
#[command(name = "call-profiler")]
#[command(author, version, about = "Customer-support call quality profiling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Watsonx,
    Anthropic,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an audio recording to Watson STT and save the raw response
    Recognize {
        /// Audio file (wav, mp3, flac, ogg, webm)
        #[arg(short, long)]
        audio: PathBuf,

        /// Output file for the STT response (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rebuild and print the speaker-attributed transcript
    Transcript {
        /// Input STT response file (Watson JSON format)
        #[arg(short, long)]
        input: PathBuf,

        /// Attribute every word to the turn it starts in
        #[arg(long)]
        strict_boundaries: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Profile call quality and sentiment with an LLM
    Profile {
        /// Input STT response file (Watson JSON format)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the machine-readable report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the human-readable report (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// LLM backend
        #[arg(long, value_enum, default_value = "watsonx")]
        provider: Provider,

        /// Concurrent aspect prompts
        #[arg(long, default_value = "6")]
        aspect_workers: usize,

        /// Concurrent sentiment prompts
        #[arg(long, default_value = "3")]
        sentiment_workers: usize,

        /// Per-prompt timeout in seconds (no timeout when omitted)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Attribute every word to the turn it starts in
        #[arg(long)]
        strict_boundaries: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Recognize {
            audio,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            recognize_audio(audio, output).await
        }
        Commands::Transcript {
            input,
            strict_boundaries,
            verbose,
        } => {
            setup_logging(verbose);
            print_transcript(input, boundary_policy(strict_boundaries))
        }
        Commands::Profile {
            input,
            output,
            human_readable,
            provider,
            aspect_workers,
            sentiment_workers,
            timeout_secs,
            strict_boundaries,
            verbose,
        } => {
            setup_logging(verbose);
            let config = ProfilerConfig {
                aspect_workers,
                sentiment_workers,
                task_timeout: timeout_secs.map(Duration::from_secs),
            };
            profile_call(
                input,
                output,
                human_readable,
                provider,
                config,
                boundary_policy(strict_boundaries),
            )
            .await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn boundary_policy(strict: bool) -> BoundaryPolicy {
    if strict {
        BoundaryPolicy::Strict
    } else {
        BoundaryPolicy::CarryOver
    }
}

async fn recognize_audio(audio: PathBuf, output: PathBuf) -> Result<()> {
    let bytes =
        std::fs::read(&audio).with_context(|| format!("Failed to read audio: {:?}", audio))?;
    let content_type = call_profiler::stt::audio_content_type(&audio);

    let client = WatsonSttClient::new(WatsonSttConfig::from_env()?);
    let response = client.recognize(bytes, content_type).await?;

    info!(
        "Received {} result blocks, {} speaker labels",
        response.results.len(),
        response.speaker_labels.len()
    );

    let file = std::fs::File::create(&output)
        .with_context(|| format!("Failed to create file: {:?}", output))?;
    serde_json::to_writer_pretty(file, &response).context("Failed to write JSON")?;
    info!("STT response written to {:?}", output);

    Ok(())
}

fn print_transcript(input: PathBuf, policy: BoundaryPolicy) -> Result<()> {
    info!("Loading STT response from {:?}", input);
    let stt = parse_watson_file(&input).context("Failed to parse input")?;
    let transcript = stt
        .reconstruct(policy)
        .context("Failed to reconstruct transcript")?;

    println!("{}", transcript.format());
    println!();
    println!("Turns: {}", transcript.turns.len());
    println!("Speakers: {:?}", transcript.speakers());
    println!("Agent: {}", transcript.agent_speaker);
    println!("Duration: {:.1}s", transcript.duration());
    if transcript.unattributed_words > 0 {
        println!("Unattributed words: {}", transcript.unattributed_words);
    }

    Ok(())
}

async fn connect_llm(provider: Provider) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match provider {
        Provider::Watsonx => Arc::new(WatsonxClient::connect(WatsonxConfig::from_env()?).await?),
        Provider::Anthropic => Arc::new(AnthropicClient::new(AnthropicConfig::from_env()?)),
    };
    Ok(llm)
}

async fn profile_call(
    input: PathBuf,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    provider: Provider,
    config: ProfilerConfig,
    policy: BoundaryPolicy,
) -> Result<()> {
    info!("Loading STT response from {:?}", input);
    let stt = parse_watson_file(&input).context("Failed to parse input")?;

    // No LLM spend when the transcript cannot be built
    let transcript = stt
        .reconstruct(policy)
        .context("Failed to reconstruct transcript")?;
    info!(
        "Reconstructed {} turns, {} speakers, {:.1}s",
        transcript.turns.len(),
        transcript.speakers().len(),
        transcript.duration()
    );

    let llm = connect_llm(provider).await?;
    let aspects = default_aspects();

    let (aspect_profile, sentiment_profile) = tokio::join!(
        profile_aspects(&llm, &transcript, &aspects, &config),
        profile_sentiment(&llm, &transcript, &config),
    );

    let report = ProfileReport::new(
        &transcript,
        &aspect_profile,
        &sentiment_profile,
        Some(input.display().to_string()),
    );
    let result = execute_render(&report, Some(&output), human_readable.as_deref())?;

    if let Some(path) = result.machine_path {
        info!("Report written to {:?}", path);
    }
    if let Some(path) = result.human_path {
        info!("Human-readable report written to {:?}", path);
    }
    info!(
        "Complete: {}/{} aspects rated, {}/3 sentiments available",
        report.metadata.aspects_rated,
        aspects.len(),
        report.metadata.sentiments_available
    );

    Ok(())
}
