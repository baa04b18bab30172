use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use log::info;
use signal_catcher_lib::commands;
use signal_catcher_lib::config::AppConfig;
use signal_catcher_lib::events::{AppEvent, EventSink};
use signal_catcher_lib::logging::ChannelLogger;
use signal_catcher_lib::model::SignalKind;
use signal_catcher_lib::state::AppState;

const USAGE: &str = "\
Usage: signal-catcher [--config-dir <dir>] <command>

Commands:
  scan [secs]                 Scan for Bluetooth devices
  record-first [secs]         Scan and record the first device found
  listen [secs]               Listen for infrared signals and record them
  list [bluetooth|infrared]   List stored signals, newest first
  show <id>                   Show a stored signal
  share <id>                  Print the share text of a stored signal
  delete <id>                 Delete a stored signal
  transmit <id>               Replay a stored signal
  export                      Print all stored signals as JSON
  import <file>               Import signals from a JSON file";

const DEFAULT_LISTEN_SECS: u64 = 10;

#[derive(Debug, PartialEq)]
enum Command {
    Scan(Option<Duration>),
    RecordFirst(Option<Duration>),
    Listen(Duration),
    List(Option<SignalKind>),
    Show(String),
    Share(String),
    Delete(String),
    Transmit(String),
    Export,
    Import(PathBuf),
}

#[derive(Debug, PartialEq)]
struct Cli {
    config_dir: PathBuf,
    command: Command,
}

fn parse_secs(arg: Option<&String>) -> Result<Option<Duration>> {
    arg.map(|secs| {
        secs.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| anyhow!("Invalid number of seconds: {}", secs))
    })
    .transpose()
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut config_dir = PathBuf::from(".");
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config-dir" {
            let dir = iter.next().ok_or_else(|| anyhow!("--config-dir needs a value"))?;
            config_dir = PathBuf::from(dir);
        } else {
            rest.push(arg.clone());
        }
    }

    let Some((name, params)) = rest.split_first() else {
        bail!("No command given");
    };
    let id = || {
        params
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("{} needs a signal id", name))
    };

    let command = match name.as_str() {
        "scan" => Command::Scan(parse_secs(params.first())?),
        "record-first" => Command::RecordFirst(parse_secs(params.first())?),
        "listen" => Command::Listen(
            parse_secs(params.first())?.unwrap_or(Duration::from_secs(DEFAULT_LISTEN_SECS)),
        ),
        "list" => Command::List(params.first().map(|kind| kind.parse()).transpose()?),
        "show" => Command::Show(id()?),
        "share" => Command::Share(id()?),
        "delete" => Command::Delete(id()?),
        "transmit" => Command::Transmit(id()?),
        "export" => Command::Export,
        "import" => Command::Import(PathBuf::from(
            params.first().ok_or_else(|| anyhow!("import needs a file"))?,
        )),
        other => bail!("Unknown command: {}", other),
    };

    Ok(Cli { config_dir, command })
}

fn render(event: &AppEvent) {
    match event {
        AppEvent::ScanStart => println!("Scanning for Bluetooth devices..."),
        AppEvent::DeviceFound(device) => println!(
            "Found {} ({}) {} dBm",
            device.name, device.address, device.rssi
        ),
        AppEvent::ScanComplete { device_count } => println!("Scan complete: {} device(s)", device_count),
        AppEvent::ListenStart => println!("Listening for IR signals..."),
        AppEvent::SignalDetected(signal) => println!(
            "Detected {} at {} Hz, {:.1} ms",
            signal.name, signal.frequency, signal.duration
        ),
        AppEvent::ListenStopped => println!("Stopped listening"),
        // already written to stderr by the logger
        AppEvent::Log(_) => {}
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), String> {
    match command {
        Command::Scan(duration) => {
            commands::scan_devices(state, duration).await?;
        }
        Command::RecordFirst(duration) => {
            let devices = commands::scan_devices(state, duration).await?;
            let first = devices.first().ok_or("No devices found")?;
            commands::record_device(state, first).await?;
            println!("Recorded {}", first.name);
        }
        Command::Listen(duration) => {
            let signals = commands::listen_for(state, duration, true).await?;
            println!("Recorded {} signal(s)", signals.len());
        }
        Command::List(kind) => {
            for record in commands::list_records(state, kind).await {
                println!("{}  {:<9}  {}", record.id, record.kind().as_str(), record.name);
            }
        }
        Command::Show(id) => println!("{}", commands::show_record(state, &id).await?),
        Command::Share(id) => println!("{}", commands::share_record(state, &id).await?),
        Command::Delete(id) => {
            commands::delete_record(state, &id).await?;
            println!("Deleted {}", id);
        }
        Command::Transmit(id) => {
            commands::transmit_record(state, &id).await?;
            println!("Transmitted {}", id);
        }
        Command::Export => println!("{}", commands::export_records(state).await?),
        Command::Import(path) => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
            let saved = commands::import_records(state, &json).await?;
            println!("Imported {} signal(s)", saved);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let (events, mut rx) = EventSink::channel();

    if ChannelLogger::init(events.clone(), log::Level::Info).is_err() {
        // Only fall back to env_logger when the channel logger cannot be installed
        env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let config = AppConfig::load_or_create(&cli.config_dir).await?;
    info!("Starting AppState initialization.");
    let state = AppState::new(config, &cli.config_dir, events).await?;

    let command = run(&state, cli.command);
    tokio::pin!(command);

    let outcome = loop {
        tokio::select! {
            outcome = &mut command => break outcome,
            Some(event) = rx.recv() => render(&event),
        }
    };
    while let Ok(event) = rx.try_recv() {
        render(&event);
    }

    outcome.map_err(|e| anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_commands() {
        let cli = parse_args(&args("--config-dir /tmp/sc listen 3")).unwrap();
        assert_eq!(cli.config_dir, PathBuf::from("/tmp/sc"));
        assert_eq!(cli.command, Command::Listen(Duration::from_secs(3)));

        assert_eq!(parse_args(&args("scan")).unwrap().command, Command::Scan(None));
        assert_eq!(
            parse_args(&args("list infrared")).unwrap().command,
            Command::List(Some(SignalKind::Infrared))
        );
        assert_eq!(
            parse_args(&args("show abc --config-dir x")).unwrap(),
            Cli {
                config_dir: PathBuf::from("x"),
                command: Command::Show("abc".into()),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args("")).is_err());
        assert!(parse_args(&args("scan soon")).is_err());
        assert!(parse_args(&args("list wifi")).is_err());
        assert!(parse_args(&args("delete")).is_err());
        assert!(parse_args(&args("fly")).is_err());
        assert!(parse_args(&args("--config-dir")).is_err());
    }
}
