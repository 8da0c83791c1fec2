//! tts-stream: speak text through a TTS service from the command line
//!
//! Usage:
//!   tts-stream voices                                   List available voices
//!   tts-stream play <TEXT> [--voice V] [--out PATH|-]   Stream speech to a file or stdout
//!   tts-stream download <TEXT> [--voice V] [--out PATH] Save speech as one file

use anyhow::{bail, Context};
use std::path::PathBuf;
use tts_stream::sink::{FileTarget, StdoutTarget};
use tts_stream::{Feeder, Player, ServiceConfig, TtsClient, TtsOptions};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    init_logging();

    let result = match args[1].as_str() {
        "voices" => cmd_voices(&args[2..]).await,
        "play" => cmd_play(&args[2..]).await,
        "download" => cmd_download(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        let unsupported = e
            .downcast_ref::<tts_stream::Error>()
            .is_some_and(|e| e.is_unsupported_sink());
        if unsupported {
            eprintln!("Error: this output cannot play the requested audio ({e:#})");
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"tts-stream - streaming text-to-speech

USAGE:
    tts-stream <COMMAND> [OPTIONS]

COMMANDS:
    voices                          List voices offered by the service
    play <TEXT> [--voice V]         Stream speech as it is synthesized
         [--out PATH|-]             Output file, or - for stdout (default)
    download <TEXT> [--voice V]     Synthesize in one piece and save it
         [--out PATH]               Output file (default audio.<format>)
    version                         Show version information
    help                            Show this help message

OPTIONS:
    --config PATH                   YAML or JSON service config

ENVIRONMENT:
    TTS_CONFIG                      Config file path when --config is absent
    TTS_BASE_URL, TTS_DEFAULT_VOICE, TTS_FORMAT, TTS_HTTP_TIMEOUT_SECS,
    TTS_CONNECT_TIMEOUT_SECS, TTS_PROXY_URL, TTS_API_KEY
    RUST_LOG                        Log filter (logs go to stderr)"#
    );
}

fn cmd_version() {
    println!("tts-stream {}", env!("CARGO_PKG_VERSION"));
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tts_stream=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Flags shared by all commands plus the first positional argument.
struct Invocation {
    text: Option<String>,
    voice: Option<String>,
    out: Option<String>,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let mut inv = Invocation {
        text: None,
        voice: None,
        out: None,
        config: None,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--voice" => inv.voice = Some(flag_value(&mut iter, "--voice")?),
            "--out" | "-o" => inv.out = Some(flag_value(&mut iter, "--out")?),
            "--config" => inv.config = Some(PathBuf::from(flag_value(&mut iter, "--config")?)),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            positional => {
                if inv.text.is_some() {
                    bail!("unexpected argument {positional:?}; quote the text to speak");
                }
                inv.text = Some(positional.to_string());
            }
        }
    }
    if inv.config.is_none() {
        inv.config = std::env::var("TTS_CONFIG").ok().map(PathBuf::from);
    }
    Ok(inv)
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, name: &str) -> anyhow::Result<String> {
    iter.next()
        .cloned()
        .with_context(|| format!("{name} needs a value"))
}

fn client_for(inv: &Invocation) -> anyhow::Result<TtsClient> {
    let config = ServiceConfig::load(inv.config.as_deref()).context("loading configuration")?;
    Ok(TtsClient::new(&config)?)
}

fn options_for(inv: &Invocation) -> TtsOptions {
    TtsOptions {
        voice: inv.voice.clone(),
        format: None,
    }
}

fn text_of(inv: &Invocation) -> anyhow::Result<&str> {
    match inv.text.as_deref() {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => bail!("no text given"),
    }
}

async fn cmd_voices(args: &[String]) -> anyhow::Result<()> {
    let inv = parse_args(args)?;
    let client = client_for(&inv)?;
    let voices = client.voices().await.context("fetching voices")?;
    if voices.is_empty() {
        println!("No voices available");
        return Ok(());
    }
    for voice in voices {
        println!("{}", voice.label());
    }
    Ok(())
}

async fn cmd_play(args: &[String]) -> anyhow::Result<()> {
    let inv = parse_args(args)?;
    let text = text_of(&inv)?;
    let player = Player::new(client_for(&inv)?);
    let options = options_for(&inv);

    let feeder = Feeder::new();
    let cancel = feeder.cancel_handle();
    let mut progress = feeder.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, stopping playback");
            cancel.cancel();
        }
    });
    tokio::spawn(async move {
        let mut announced = false;
        while progress.changed().await.is_ok() {
            let started = progress.borrow().playback_started;
            if started && !announced {
                announced = true;
                tracing::info!("playback started");
            }
        }
    });

    let report = match inv.out.as_deref() {
        None | Some("-") => {
            player
                .play_with(feeder, text, &options, &mut StdoutTarget)
                .await?
        }
        Some(path) => {
            let mut target = FileTarget::new(path);
            player.play_with(feeder, text, &options, &mut target).await?
        }
    };

    if report.abandoned {
        eprintln!(
            "Stopped after {} bytes ({} chunks)",
            report.bytes_delivered, report.chunks_delivered
        );
    } else {
        eprintln!(
            "Done: {} bytes in {} chunks (peak queue {})",
            report.bytes_delivered, report.chunks_delivered, report.peak_queued
        );
    }
    Ok(())
}

async fn cmd_download(args: &[String]) -> anyhow::Result<()> {
    let inv = parse_args(args)?;
    let text = text_of(&inv)?;
    let player = Player::new(client_for(&inv)?);
    let options = options_for(&inv);
    let path = match &inv.out {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(player.client().format_for(&options).default_file_name()),
    };
    let output = player
        .download(text, &options, &path)
        .await
        .with_context(|| format!("downloading speech to {}", path.display()))?;
    println!("Saved {} bytes to {}", output.data.len(), path.display());
    Ok(())
}
