use std::{fmt::Write as _, fs, io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use engine::{MoneyCents, Room, RoomCode, SplitReport, SplitWarning};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "billsplit_cli")]
#[command(about = "Offline utilities for billsplit rooms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a room saved as JSON.
    Split(SplitArgs),
    /// Print a fresh room code.
    Code,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Room JSON file, as written by the server snapshot (one room or a list).
    #[arg(long)]
    file: PathBuf,
    /// Room code to pick when the file holds several rooms.
    #[arg(long)]
    code: Option<String>,
    /// Override the room total, e.g. `42.50`.
    #[arg(long)]
    total: Option<MoneyCents>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid room file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
    #[error("{0}")]
    Usage(String),
}

fn pick_room(raw: &str, code: Option<&str>) -> Result<Room, CliError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let mut rooms: Vec<Room> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    match code {
        Some(code) => {
            let code: RoomCode = code.parse()?;
            rooms
                .into_iter()
                .find(|room| room.code == code)
                .ok_or_else(|| CliError::Usage(format!("room {code} not in file")))
        }
        None if rooms.len() == 1 => Ok(rooms.remove(0)),
        None => Err(CliError::Usage(format!(
            "file holds {} rooms, pick one with --code",
            rooms.len()
        ))),
    }
}

fn describe(warning: &SplitWarning) -> String {
    match warning {
        SplitWarning::TotalBelowSubtotal { total, subtotal } => format!(
            "total {} is below the items subtotal {}",
            MoneyCents::from_major(*total),
            MoneyCents::from_major(*subtotal)
        ),
        SplitWarning::UnassignedItems { count, cost } => format!(
            "{count} item(s) worth {} are not assigned to anyone",
            MoneyCents::from_major(*cost)
        ),
        SplitWarning::SumMismatch { expected, actual } => format!(
            "bills add up to {actual:.4}, expected {expected:.4}"
        ),
    }
}

fn render(room: &Room, report: &SplitReport) -> String {
    let mut out = String::new();
    for bill in &report.bills {
        let name = room
            .member(bill.member_id)
            .map(|member| member.name.as_str())
            .unwrap_or("?");
        let _ = writeln!(out, "{name}: {}", bill.rounded());
    }
    let _ = writeln!(
        out,
        "total {} (items {})",
        MoneyCents::from_major(report.total),
        MoneyCents::from_major(report.subtotal)
    );
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {}", describe(warning));
    }
    out
}

fn split(args: SplitArgs) -> Result<String, CliError> {
    let raw = fs::read_to_string(&args.file).map_err(|source| CliError::Read {
        path: args.file.clone(),
        source,
    })?;
    let mut room = pick_room(&raw, args.code.as_deref())?;
    room.repair()?;
    if let Some(total) = args.total {
        room.update_total(total.to_major())?;
    }
    Ok(render(&room, &room.report()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Code => {
            println!("{}", RoomCode::generate());
            ExitCode::SUCCESS
        }
        Command::Split(args) => match split(args) {
            Ok(out) => {
                print!("{out}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::from(2)
            }
        },
    }
}
