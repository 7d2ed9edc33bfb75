//! Command-line interface for voicewire
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Streaming speech-to-text protocol harness
#[derive(Parser, Debug)]
#[command(
    name = "voicewire",
    version,
    about = "Streaming speech-to-text protocol harness"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Language code for transcription (e.g. en-IN, hi-IN)
    #[arg(long, global = true, value_name = "LANG")]
    pub language: Option<String>,

    /// Transcription model identifier
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream audio over the WebSocket endpoint and report transcripts
    Stream {
        /// WAV file to stream (16-bit PCM; stereo is folded to mono)
        #[arg(long, value_name = "FILE", conflicts_with = "tone")]
        file: Option<PathBuf>,

        /// Stream a generated 440 Hz test tone instead of a file
        #[arg(long)]
        tone: bool,

        /// Cap on how many seconds of the file to stream
        #[arg(long, value_name = "SECONDS")]
        seconds: Option<u32>,
    },

    /// Transcribe a WAV file via the synchronous REST endpoint
    Transcribe {
        /// WAV file to transcribe
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
