// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Line-oriented operator console.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use gridnav_core::{AmountInput, NavEvent, OperatorCommand, PointInput, PoseInput};

use crate::error::StationError;
use crate::session::Station;

pub const HELP_TEXT: &str = "\
commands:
  connect [target]        open the link (default target from config)
  disconnect              close the link
  status                  print the navigation snapshot
  goto <x> <y>            drive to a point
  pose <x> <y> <heading>  set the robot's believed pose
  map-left <x> <y>        drive to a point and scan to the left
  map-right <x> <y>       drive to a point and scan to the right
  travel <distance>       drive straight
  rotate <angle>          turn by an angle
  rotate-to <angle>       turn to an absolute heading
  echo <angle>            single sonar reading at an angle
  explore <distance>      explore up to a distance
  scan <angle>            turn the scanner
  stop | fix | grab       stop, fix position, grab the bomb
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    Connect(Option<String>),
    Disconnect,
    Status,
    Help,
    Quit,
    Issue(OperatorCommand),
}

/// Parse one console line. Missing numeric fields are passed on empty so
/// that validation names them.
pub fn parse_line(line: &str) -> Result<ConsoleAction, String> {
    let mut parts = line.split_whitespace();
    let Some(op) = parts.next() else {
        return Err("empty command".to_string());
    };
    let mut field = || parts.next().unwrap_or_default().to_string();

    let action = match op {
        "q" | "quit" | "exit" => ConsoleAction::Quit,
        "?" | "help" => ConsoleAction::Help,
        "status" => ConsoleAction::Status,
        "disconnect" => ConsoleAction::Disconnect,
        "connect" => {
            let target = field();
            ConsoleAction::Connect((!target.is_empty()).then_some(target))
        }
        "goto" => ConsoleAction::Issue(OperatorCommand::Goto(point(&mut field))),
        "map-left" => ConsoleAction::Issue(OperatorCommand::MapLeft(point(&mut field))),
        "map-right" => ConsoleAction::Issue(OperatorCommand::MapRight(point(&mut field))),
        "pose" => {
            let (x, y, heading) = (field(), field(), field());
            ConsoleAction::Issue(OperatorCommand::SetPose(PoseInput { x, y, heading }))
        }
        "travel" => ConsoleAction::Issue(OperatorCommand::Travel(amount(&mut field))),
        "rotate" => ConsoleAction::Issue(OperatorCommand::Rotate(amount(&mut field))),
        "rotate-to" => ConsoleAction::Issue(OperatorCommand::RotateTo(amount(&mut field))),
        "echo" => ConsoleAction::Issue(OperatorCommand::Echo(amount(&mut field))),
        "explore" => ConsoleAction::Issue(OperatorCommand::Explore(amount(&mut field))),
        "scan" => ConsoleAction::Issue(OperatorCommand::ScannerRotate(amount(&mut field))),
        "stop" => ConsoleAction::Issue(OperatorCommand::Stop),
        "fix" => ConsoleAction::Issue(OperatorCommand::FixPos),
        "grab" => ConsoleAction::Issue(OperatorCommand::GrabBomb),
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(action)
}

fn point(field: &mut impl FnMut() -> String) -> PointInput {
    let x = field();
    let y = field();
    PointInput { x, y }
}

fn amount(field: &mut impl FnMut() -> String) -> AmountInput {
    AmountInput { value: field() }
}

/// Human-readable line for one navigation event.
pub fn format_event(event: &NavEvent) -> String {
    match event {
        NavEvent::Status { text } => format!("* {text}"),
        NavEvent::Pose { x, y, heading } => format!("pose x={x} y={y} heading={heading}"),
        NavEvent::Obstacle { x, y } => format!("obstacle at ({x}, {y})"),
        NavEvent::Wall { x, y, category } => format!("{category} wall at ({x}, {y})"),
        NavEvent::Uncertainty {
            x,
            y,
            sdev_x,
            sdev_y,
        } => format!("uncertainty at ({x}, {y}) sdev=({sdev_x}, {sdev_y})"),
        NavEvent::BombCaptured { x, y } => format!("bomb captured at ({x}, {y})"),
        NavEvent::Connection { state } => format!("link {state}"),
    }
}

/// Print events until the channel closes.
pub async fn render_events(mut rx: mpsc::UnboundedReceiver<NavEvent>) {
    while let Some(event) = rx.recv().await {
        println!("{}", format_event(&event));
    }
    debug!("Event renderer stopped");
}

/// Whether the console keeps reading after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn execute(station: &Station, action: ConsoleAction, default_target: Option<&str>) -> Flow {
    match action {
        ConsoleAction::Quit => return Flow::Quit,
        ConsoleAction::Help => println!("{HELP_TEXT}"),
        ConsoleAction::Status => {
            match serde_json::to_string_pretty(&station.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("Failed to render snapshot: {}", e),
            }
            let obstacles = station.with_state(|state| {
                state
                    .obstacles()
                    .iter()
                    .map(|o| format!("({}, {})", o.x, o.y))
                    .collect::<Vec<_>>()
                    .join(" ")
            });
            if !obstacles.is_empty() {
                println!("obstacles: {obstacles}");
            }
            let link = station.link_status();
            let since = link
                .in_state_ms
                .map(|ms| format!(" for {:.1}s", ms as f64 / 1000.0))
                .unwrap_or_default();
            println!(
                "link: {}{} ({} transitions)",
                link.state, since, link.transitions
            );
            if let Some(error) = link.last_error {
                println!("last link error: {error}");
            }
            let stats = station.stats();
            println!(
                "records: {} applied, {} ignored, {} rejected",
                stats.applied, stats.ignored, stats.rejected
            );
        }
        ConsoleAction::Connect(target) => {
            let Some(target) = target.as_deref().or(default_target) else {
                println!("error: no target given and none configured");
                return Flow::Continue;
            };
            if let Err(e) = station.connect(target).await {
                println!("error: {e}");
            }
        }
        ConsoleAction::Disconnect => {
            if let Err(e) = station.disconnect().await {
                println!("error: {e}");
            }
        }
        ConsoleAction::Issue(cmd) => match station.issue(&cmd).await {
            Ok(msg) => debug!("Issued {}", msg),
            Err(StationError::Validation(e)) => println!("{e}"),
            Err(e) => println!("error: {e}"),
        },
    }
    Flow::Continue
}

/// Read operator lines from stdin until quit, EOF or shutdown.
pub async fn run_console(
    station: Arc<Station>,
    default_target: Option<String>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            changed = shutdown_rx.changed() => {
                match changed {
                    Ok(()) if !*shutdown_rx.borrow() => continue,
                    _ => break,
                }
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let action = match parse_line(&line) {
            Ok(action) => action,
            Err(e) => {
                println!("error: {e} (try 'help')");
                continue;
            }
        };
        if execute(&station, action, default_target.as_deref()).await == Flow::Quit {
            break;
        }
    }
}
