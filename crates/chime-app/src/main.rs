//! Chime
//!
//! Command-line front end for the alarm list, display settings and alarm sound.

use anyhow::{bail, Context, Result};
use chime_app::{
    sound::{AudioDevice, AudioOutput, BellDevice, DeviceError, RecordingDevice},
    ChimeEvent, ClockContext,
};
use chime_core::{
    models::{BeepPattern, NewAlarm, SettingsRecord, ThemeMode, TimeFormat},
    storage::{init_data_dir, FileStore},
    SystemClock,
};
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cpal")]
use chime_app::sound::CpalDevice;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

#[derive(Parser, Debug)]
#[command(name = "chime")]
#[command(about = "Chime - alarms, clock settings and alarm sound", long_about = None)]
struct Args {
    /// Directory holding the persisted alarms and settings
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Record beeps instead of ringing the terminal bell
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage alarms
    #[command(subcommand)]
    Alarms(AlarmCommand),

    /// Manage display settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Print the theme in effect right now
    Theme,

    /// Sound the alarm until Ctrl-C or the given number of seconds
    Ring {
        #[arg(short, long)]
        seconds: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum AlarmCommand {
    List,
    Add {
        hour: i64,
        minute: i64,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        sound: Option<String>,
    },
    Remove {
        id: i64,
    },
    Toggle {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Set { field: SettingField, value: String },
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SettingField {
    TimeFormat,
    ShowSeconds,
    ShowDate,
    ThemeMode,
    ClockColor,
    FontSize,
    FontWeight,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = match &args.data_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => init_data_dir()?,
    };
    init_logging(&args.log_level, &data_dir)?;

    tracing::info!("Data directory: {}", data_dir.display());

    let dry_run_device = Arc::new(RecordingDevice::new());
    let output = if args.dry_run {
        AudioOutput::with_device(dry_run_device.clone())
    } else {
        AudioOutput::new(open_device)
    };

    let context = ClockContext::new(
        Arc::new(FileStore::new(data_dir)),
        Arc::new(SystemClock),
        output,
        BeepPattern::default(),
    )?;

    let mut events = context.events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ChimeEvent::Alarm(e) => tracing::debug!("alarm event: {:?}", e.event_type),
                ChimeEvent::Settings(_) => tracing::debug!("settings event"),
                ChimeEvent::Sound(e) => tracing::debug!("sound event: {:?}", e.event_type),
            }
        }
    });

    match args.command {
        Command::Alarms(cmd) => run_alarms(&context, cmd).await?,
        Command::Settings(cmd) => run_settings(&context, cmd).await?,
        Command::Theme => println!("{}", context.settings.current_theme().await),
        Command::Ring { seconds } => {
            run_ring(&context, seconds).await?;
            if args.dry_run {
                println!("{} beeps", dry_run_device.started_count());
            }
        }
    }

    Ok(())
}

/// The sound card when built with it, otherwise the terminal bell.
fn open_device() -> Result<Arc<dyn AudioDevice>, DeviceError> {
    #[cfg(feature = "cpal")]
    match CpalDevice::open() {
        Ok(device) => return Ok(Arc::new(device)),
        Err(e) => tracing::warn!("Sound card unavailable, using terminal bell: {}", e),
    }

    Ok(Arc::new(BellDevice::open()?))
}

fn init_logging(level: &str, data_dir: &std::path::Path) -> Result<()> {
    let log_file_path = data_dir.join("chime.log");
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("opening {}", log_file_path.display()))?;

    // Command output owns stdout, logs go to stderr and the file
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let stderr_writer = std::io::stderr.with_max_level(tracing::Level::INFO);
    let file_writer = log_file.with_max_level(tracing::Level::DEBUG);

    tracing_subscriber::fmt()
        .with_writer(stderr_writer.and(file_writer))
        .with_env_filter(level)
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_alarms(context: &ClockContext, cmd: AlarmCommand) -> Result<()> {
    let time_format = context.settings.get().await.time_format;

    match cmd {
        AlarmCommand::List => {
            let alarms = context.alarms.list().await;
            if alarms.is_empty() {
                println!("No alarms");
            }
            for alarm in alarms {
                println!(
                    "{}  {:>8}  [{}]  {}  ({})",
                    alarm.id,
                    alarm.format_time(time_format),
                    if alarm.enabled { "on" } else { "off" },
                    alarm.label,
                    alarm.sound
                );
            }
        }
        AlarmCommand::Add {
            hour,
            minute,
            label,
            sound,
        } => {
            let alarm = context
                .alarms
                .add(NewAlarm {
                    hour,
                    minute,
                    label,
                    sound,
                })
                .await?;
            println!("Added alarm {} at {}", alarm.id, alarm.format_time(time_format));
        }
        AlarmCommand::Remove { id } => {
            if context.alarms.remove(id).await? {
                println!("Removed alarm {}", id);
            } else {
                println!("No alarm with id {}", id);
            }
        }
        AlarmCommand::Toggle { id } => match context.alarms.toggle(id).await? {
            Some(alarm) => println!(
                "Alarm {} is now {}",
                alarm.id,
                if alarm.enabled { "on" } else { "off" }
            ),
            None => println!("No alarm with id {}", id),
        },
    }

    Ok(())
}

async fn run_settings(context: &ClockContext, cmd: SettingsCommand) -> Result<()> {
    let settings = match cmd {
        SettingsCommand::Show => context.settings.get().await,
        SettingsCommand::Reset => context.settings.reset().await?,
        SettingsCommand::Set { field, value } => set_field(context, field, &value).await?,
    };

    print_settings(&settings)?;
    Ok(())
}

async fn set_field(
    context: &ClockContext,
    field: SettingField,
    value: &str,
) -> Result<SettingsRecord> {
    let settings = &context.settings;

    let updated = match field {
        SettingField::TimeFormat => settings.set_time_format(value.parse::<TimeFormat>()?).await?,
        SettingField::ShowSeconds => settings.set_show_seconds(parse_bool(value)?).await?,
        SettingField::ShowDate => settings.set_show_date(parse_bool(value)?).await?,
        SettingField::ThemeMode => settings.set_theme_mode(value.parse::<ThemeMode>()?).await?,
        SettingField::ClockColor => settings.set_clock_color(value.to_string()).await?,
        SettingField::FontSize => settings.set_font_size(parse_int(value)?).await?,
        SettingField::FontWeight => settings.set_font_weight(parse_int(value)?).await?,
    };

    Ok(updated)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => bail!("Expected a boolean, got '{}'", value),
    }
}

fn parse_int(value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Expected an integer, got '{}'", value))
}

fn print_settings(settings: &SettingsRecord) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

async fn run_ring(context: &ClockContext, seconds: Option<u64>) -> Result<()> {
    context.sound.start().await?;
    println!("Ringing, press Ctrl-C to stop");

    match seconds {
        Some(secs) => {
            tokio::select! {
                _ = sleep(Duration::from_secs(secs)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
        }
    }

    context.sound.stop().await;
    // Let the last beep run out
    sleep(context.sound.pattern().duration()).await;

    Ok(())
}
