//! narrate - Convert EPUB and other documents to MP3 audiobooks using Edge
//! neural voices.

mod config;
mod error;
mod extract;
mod pipeline;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::NarrateConfig;
use extract::{ChapterRecord, Document};
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::batch::BatchCoordinator;
use pipeline::{CancelFlag, ConvertOptions, FileSink};
use std::path::PathBuf;
use std::time::Duration;
use tts_client::{EdgeBackend, SpeechBackend, SpeechOptions};

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Convert EPUB and other documents to MP3 audiobooks", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the input document (.epub, .docx, .txt, .md, .html)
    input: Option<PathBuf>,

    /// Output file path (default: <input-name>.mp3, or _audiobook.zip)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Voice short name (e.g. "en-US-AriaNeural")
    #[arg(long)]
    voice: Option<String>,

    /// Rate modifier as a signed percentage (e.g. "+10%")
    #[arg(long)]
    rate: Option<String>,

    /// Maximum characters per synthesis request
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Pause between chunks in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Convert each EPUB chapter to its own file, packaged as a ZIP
    #[arg(long)]
    split_chapters: bool,

    /// Chapter range to convert in split mode (e.g. "1-10" or "3")
    #[arg(long)]
    chapters: Option<String>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available voices
    Voices,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default voice
    SetVoice {
        /// Voice short name
        voice: String,
    },
    /// Set the default rate modifier
    SetRate {
        /// Signed percentage, e.g. "+10%"
        rate: String,
    },
    /// Set the default chunk size
    SetChunkSize {
        /// Maximum characters per synthesis request
        size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.command {
        Some(Commands::Voices) => return list_voices_command().await,
        Some(Commands::Config { action }) => return handle_config_command(action),
        None => {}
    }

    let input = args.input.clone().ok_or_else(|| {
        anyhow::anyhow!("Input file path is required. Run 'narrate --help' for usage.")
    })?;

    let config = NarrateConfig::load().context("Failed to load configuration")?;

    let voice = args.voice.clone().or_else(|| config.voice.clone()).ok_or_else(|| {
        anyhow::anyhow!(
            "No voice selected. Run 'narrate voices' to list voices, then pass --voice \
             or set a default with 'narrate config set-voice'."
        )
    })?;

    let mut speech = SpeechOptions::new(voice);
    if let Some(rate) = args.rate.clone().or_else(|| config.rate.clone()) {
        speech = speech.with_rate(rate);
    }
    speech.validate()?;

    let delay = Duration::from_millis(args.delay_ms.unwrap_or(config.inter_chunk_delay_ms));
    let options = ConvertOptions::new(speech).with_delay(delay);

    if args.debug {
        eprintln!("Input: {}", input.display());
        eprintln!("Voice: {}", options.speech.voice);
        eprintln!("Rate: {}", options.speech.rate_str());
        eprintln!("Delay: {:?}", options.inter_chunk_delay);
    }

    eprintln!("Reading {}", input.display());
    let document = extract::extract(&input)?;
    eprintln!(
        "Document: \"{}\", {} chapter(s), ~{} words",
        document.title,
        document.chapters.len(),
        document.total_words()
    );

    // Honor Ctrl-C at the next chunk boundary
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nStopping after the current part...");
                cancel.cancel();
            }
        });
    }

    let backend = EdgeBackend::new();

    if args.split_chapters {
        convert_split(&document, &input, &args, &config, options, &backend, &cancel).await
    } else {
        convert_single(&document, &input, &args, &config, options, &backend, &cancel).await
    }
}

/// Convert the whole document into one MP3 file.
async fn convert_single(
    document: &Document,
    input: &PathBuf,
    args: &Args,
    config: &NarrateConfig,
    options: ConvertOptions,
    backend: &dyn SpeechBackend,
    cancel: &CancelFlag,
) -> Result<()> {
    let chunk_size = args.chunk_size.unwrap_or(config.chunk_size);
    let chunks = text::chunk_text(&document.full_text(), chunk_size);
    if chunks.is_empty() {
        anyhow::bail!("No text extracted from {}", input.display());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension("mp3"));

    // Clears any stale target; fails before any network work if it can't
    let mut sink = FileSink::create(&output)?;

    eprintln!("Converting {} part(s) to {}", chunks.len(), output.display());
    let pb = progress_bar(chunks.len() as u64);
    pipeline::convert_chunks(
        backend,
        &chunks,
        &options,
        &mut sink,
        |p| pb.set_position(p.current as u64),
        cancel,
    )
    .await?;
    pb.finish_and_clear();

    let size_mb = std::fs::metadata(&output)?.len() as f64 / (1024.0 * 1024.0);
    eprintln!("Output: {} ({:.1} MB)", output.display(), size_mb);

    Ok(())
}

/// Convert selected chapters to one file each, packaged into a ZIP.
async fn convert_split(
    document: &Document,
    input: &PathBuf,
    args: &Args,
    config: &NarrateConfig,
    options: ConvertOptions,
    backend: &dyn SpeechBackend,
    cancel: &CancelFlag,
) -> Result<()> {
    let chunk_size = args.chunk_size.unwrap_or(config.batch_chunk_size);
    let selected = select_chapters(&document.chapters, &args.chapters)?;
    if selected.is_empty() {
        anyhow::bail!("No chapters selected");
    }

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default();
        input.with_file_name(format!("{}_audiobook.zip", stem.to_string_lossy()))
    });

    eprintln!("Converting {} chapter(s)", selected.len());
    let pb = progress_bar(selected.len() as u64);
    let mut coordinator = BatchCoordinator::new(backend, options, chunk_size);
    let outcome = coordinator
        .run(
            &selected,
            |p| {
                pb.set_position(p.current as u64);
                pb.set_message(format!("{:.0}%", p.percent()));
            },
            cancel,
        )
        .await;
    pb.finish_and_clear();

    // Completed chapters are kept even when a later one failed
    let completed = coordinator.outputs().len();
    if completed > 0 {
        let outputs = coordinator.into_outputs();
        let zip_bytes = pipeline::package::zip_chapters(&outputs)?;
        std::fs::write(&output, zip_bytes)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        eprintln!(
            "Output: {} ({} of {} chapter(s))",
            output.display(),
            completed,
            selected.len()
        );
    }

    outcome?;
    Ok(())
}

/// Filter chapters by an optional 1-based range like "1-10" or "3".
fn select_chapters(
    chapters: &[ChapterRecord],
    range: &Option<String>,
) -> Result<Vec<ChapterRecord>> {
    let (start, end) = match range {
        None => (1, chapters.len()),
        Some(r) => {
            if let Some((a, b)) = r.split_once('-') {
                let start: usize = a.trim().parse().context("Invalid start chapter")?;
                let end: usize = b.trim().parse().context("Invalid end chapter")?;
                (start, end)
            } else {
                let only: usize = r.trim().parse().context("Invalid chapter number")?;
                (only, only)
            }
        }
    };
    if start == 0 || start > end {
        anyhow::bail!("Invalid chapter range. Use '1-10' or a single 1-based number.");
    }

    Ok(chapters
        .iter()
        .filter(|c| c.id >= start && c.id <= end)
        .cloned()
        .collect())
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

async fn list_voices_command() -> Result<()> {
    let config = NarrateConfig::load()?;
    eprintln!("Fetching voices (filter: {})...", config.voice_filter);
    let voices = tts_client::list_voices(Some(&config.voice_filter))
        .await
        .map_err(|e| match e {
            tts_client::TtsError::VoiceListUnavailable(msg) => {
                error::NarrateError::VoiceListUnavailable(msg)
            }
            other => error::NarrateError::Tts(other),
        })?;

    for (i, voice) in voices.iter().enumerate() {
        println!(
            "{:3}. {} ({}) - {} [{}]",
            i + 1,
            voice.display_name(),
            voice.gender,
            voice.locale,
            voice.short_name
        );
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrateConfig::load()?;
            println!("Configuration file: {:?}", NarrateConfig::config_path()?);
            println!();
            match &config.voice {
                Some(voice) => println!("voice = \"{}\"", voice),
                None => println!("voice = (none)"),
            }
            match &config.rate {
                Some(rate) => println!("rate = \"{}\"", rate),
                None => println!("rate = (service default)"),
            }
            println!("chunk_size = {}", config.chunk_size);
            println!("batch_chunk_size = {}", config.batch_chunk_size);
            println!("inter_chunk_delay_ms = {}", config.inter_chunk_delay_ms);
            println!("voice_filter = \"{}\"", config.voice_filter);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = NarrateConfig::load()?;
            config.voice = Some(voice.clone());
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
        ConfigAction::SetRate { rate } => {
            SpeechOptions::new("check").with_rate(rate.clone()).validate()?;
            let mut config = NarrateConfig::load()?;
            config.rate = Some(rate.clone());
            config.save()?;
            println!("Default rate set to: {}", rate);
        }
        ConfigAction::SetChunkSize { size } => {
            if *size == 0 {
                anyhow::bail!("Chunk size must be positive");
            }
            let mut config = NarrateConfig::load()?;
            config.chunk_size = *size;
            config.save()?;
            println!("Default chunk size set to: {}", size);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters(n: usize) -> Vec<ChapterRecord> {
        (1..=n)
            .map(|id| ChapterRecord {
                id,
                title: format!("Chapter {}", id),
                text: format!("Text {}.", id),
            })
            .collect()
    }

    #[test]
    fn test_select_chapters_no_range() {
        let selected = select_chapters(&chapters(4), &None).unwrap();
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_select_chapters_range() {
        let selected = select_chapters(&chapters(10), &Some("2-4".to_string())).unwrap();
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].id, 2);
        assert_eq!(selected[2].id, 4);
    }

    #[test]
    fn test_select_chapters_single() {
        let selected = select_chapters(&chapters(5), &Some("3".to_string())).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 3);
    }

    #[test]
    fn test_select_chapters_invalid() {
        assert!(select_chapters(&chapters(5), &Some("0-3".to_string())).is_err());
        assert!(select_chapters(&chapters(5), &Some("5-2".to_string())).is_err());
        assert!(select_chapters(&chapters(5), &Some("abc".to_string())).is_err());
    }
}
