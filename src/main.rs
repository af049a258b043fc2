use anyhow::{Context, Result};
use chatmorse::audio::output::{CpalPlayer, list_output_devices, suppress_audio_warnings};
use chatmorse::audio::player::Player;
use chatmorse::audio::wav::{WavFilePlayer, write_wav};
use chatmorse::cli::{Cli, Commands, ConfigAction, ListenArgs};
use chatmorse::config::Config;
use chatmorse::irc::connection::connect;
use chatmorse::pipeline::MorsePipeline;
use chatmorse::session::Session;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(&cli, Some(&cli.listen))?;
            run_listen(config, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Listen(ref args)) => {
            let config = load_config(&cli, Some(args))?;
            run_listen(config, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Encode { ref text }) => {
            let config = load_config(&cli, None)?;
            print_encoding(&config, text)?;
        }
        Some(Commands::Play { ref text }) => {
            let config = load_config(&cli, None)?;
            play_text(&config, text)?;
        }
        Some(Commands::Render { ref text, ref out }) => {
            let config = load_config(&cli, None)?;
            let rendered = MorsePipeline::new(config.tone_params()).render(text)?;
            write_wav(out, &rendered.waveform)?;
            if !cli.quiet {
                eprintln!(
                    "Wrote {} ({:.1}s)",
                    out.display(),
                    rendered.waveform.duration().as_secs_f64()
                );
            }
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Config { ref action }) => match action {
            ConfigAction::Dump => print!("{}", Config::dump_template()),
            ConfigAction::Path => {
                let path = cli.config.clone().unwrap_or_else(Config::default_path);
                println!("{}", path.display());
            }
        },
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "chatmorse",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration and apply overrides.
///
/// Priority order (highest first):
/// 1. Command-line flags
/// 2. Environment variables (CHATMORSE_*)
/// 3. Config file (--config, or ~/.config/chatmorse/config.toml if present)
/// 4. Built-in defaults
fn load_config(cli: &Cli, listen: Option<&ListenArgs>) -> Result<Config> {
    let config = if let Some(path) = cli.config.as_deref() {
        Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    let mut config = config.with_env_overrides();

    if let Some(tone) = cli.tone {
        config.tone.frequency_hz = tone;
    }
    if let Some(dot) = cli.dot {
        config.tone.dot_duration_ms = u64::try_from(dot.as_millis()).unwrap_or(u64::MAX);
    }
    if let Some(volume) = cli.volume {
        config.tone.volume = volume;
    }
    if let Some(device) = &cli.device {
        config.output.device = Some(device.clone());
    }

    if let Some(args) = listen {
        if let Some(channel) = &args.channel {
            config.irc.channel = channel.clone();
        }
        if let Some(nick) = &args.nick {
            config.irc.nickname = nick.clone();
        }
        if let Some(dir) = &args.wav_dir {
            config.output.wav_dir = Some(dir.clone());
        }
    }

    config.tone_params().validate()?;
    Ok(config)
}

/// Pick the playback backend: WAV files when a directory is configured,
/// otherwise the speakers.
fn open_player(config: &Config) -> Result<Box<dyn Player>> {
    if let Some(dir) = &config.output.wav_dir {
        return Ok(Box::new(WavFilePlayer::new(dir.clone())?));
    }
    suppress_audio_warnings();
    Ok(Box::new(CpalPlayer::new(config.output.device.as_deref())?))
}

/// Connect, join and play the channel until Ctrl+C or the server hangs up.
async fn run_listen(config: Config, quiet: bool, verbosity: u8) -> Result<()> {
    config.validate().context(
        "Missing login details. Set them in the config file, via CHATMORSE_* \
         environment variables, or with --nick/--channel",
    )?;

    let player = open_player(&config)?;
    if !quiet {
        eprintln!(
            "Connecting to {}:{} as {} ({})...",
            config.irc.server,
            config.irc.port,
            config.irc.nickname,
            player.name()
        );
    }

    let stream = connect(&config.irc.server, config.irc.port).await?;
    let pipeline = MorsePipeline::new(config.tone_params());
    let mut session = Session::new(stream, pipeline, player).with_output(quiet, verbosity);

    session.join(&config.credentials()).await?;
    let report = session
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    if !quiet {
        eprintln!(
            "{} messages played, {} pings answered",
            report.messages_played, report.pings_answered
        );
        if report.lines_dropped + report.malformed_messages > 0 {
            eprintln!(
                "{}",
                format!(
                    "{} lines dropped, {} malformed messages ignored",
                    report.lines_dropped, report.malformed_messages
                )
                .yellow()
            );
        }
    }
    Ok(())
}

/// Print notation, beat count and timing for `text`.
fn print_encoding(config: &Config, text: &str) -> Result<()> {
    let rendered = MorsePipeline::new(config.tone_params()).render(text)?;
    println!("{}", rendered.encoded);
    println!(
        "{} beats, {} letters, {:.2}s at {:.0} WPM",
        rendered.timeline.len(),
        rendered.encoded.letter_count(),
        rendered.waveform.duration().as_secs_f64(),
        chatmorse::defaults::words_per_minute(config.tone.dot_duration_ms)
    );
    Ok(())
}

fn play_text(config: &Config, text: &str) -> Result<()> {
    let rendered = MorsePipeline::new(config.tone_params()).render(text)?;
    if rendered.waveform.is_empty() {
        eprintln!("Nothing to play: no encodable characters");
        return Ok(());
    }
    let mut player = open_player(config)?;
    player.play(&rendered.waveform)?;
    Ok(())
}

/// List available audio output devices.
fn list_audio_devices() -> Result<()> {
    suppress_audio_warnings();
    let devices = list_output_devices()?;

    if devices.is_empty() {
        eprintln!("No audio output devices found");
        std::process::exit(1);
    }

    println!("Available audio output devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}
