// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! Console control surface - parses operator commands and drives the engine

use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::core::Engine;

/// Operator command accepted on the console
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    Save,
    Export,
    Clear,
    /// Simulated alert, on a random sensor when no id is given
    Alert(Option<String>),
    Maintenance,
    Report,
    Trends,
    Status,
    Threshold {
        id: String,
        alert: f64,
        critical: Option<f64>,
    },
    Enable(String),
    Disable(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{0} requires a sensor id")]
    MissingId(&'static str),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("usage: threshold <id> <alert> [critical]")]
    ThresholdUsage,
}

pub const HELP: &str = "\
commands:
  start | stop | toggle         control monitoring
  save                          store a snapshot
  export                        write a JSON snapshot to the export directory
  clear                         clear the alert log
  alert [id]                    simulate an alert
  maintenance                   simulate sensor maintenance
  report | trends | status      print summaries
  threshold <id> <alert> [crit] change alert thresholds
  enable <id> | disable <id>    include or exclude a sensor from polling
  help | quit";

fn parse_number(token: &str) -> Result<f64, ParseCommandError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseCommandError::InvalidNumber(token.to_string()))
}

fn sensor_id<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<String, ParseCommandError> {
    parts
        .next()
        .map(str::to_string)
        .ok_or(ParseCommandError::MissingId(command))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let word = parts.next().ok_or(ParseCommandError::Empty)?.to_lowercase();

        let command = match word.as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "toggle" => Command::Toggle,
            "save" => Command::Save,
            "export" => Command::Export,
            "clear" => Command::Clear,
            "alert" => Command::Alert(parts.next().map(str::to_string)),
            "maintenance" => Command::Maintenance,
            "report" => Command::Report,
            "trends" => Command::Trends,
            "status" => Command::Status,
            "enable" => Command::Enable(sensor_id(&mut parts, "enable")?),
            "disable" => Command::Disable(sensor_id(&mut parts, "disable")?),
            "threshold" => {
                let id = parts.next().ok_or(ParseCommandError::ThresholdUsage)?.to_string();
                let alert = parse_number(parts.next().ok_or(ParseCommandError::ThresholdUsage)?)?;
                let critical = parts.next().map(parse_number).transpose()?;
                Command::Threshold { id, alert, critical }
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Result of running one command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Text for the operator, possibly empty
    Reply(String),
    Quit,
}

/// Run a command against the engine
pub async fn execute(engine: &Engine, command: Command) -> Outcome {
    let reply = match command {
        Command::Start => {
            if engine.start() {
                "monitoring started".to_string()
            } else {
                "already monitoring".to_string()
            }
        }
        Command::Stop => {
            if engine.stop() {
                "monitoring stopped".to_string()
            } else {
                "not monitoring".to_string()
            }
        }
        Command::Toggle => {
            if engine.toggle() {
                "monitoring started".to_string()
            } else {
                "monitoring stopped".to_string()
            }
        }
        Command::Save => match engine.save().await {
            Some(key) => format!("saved as {}", key),
            None => "save failed".to_string(),
        },
        Command::Export => match engine.export() {
            Ok(path) => format!("exported to {}", path.display()),
            Err(err) => format!("export failed: {:#}", err),
        },
        Command::Clear => {
            engine.clear_alerts();
            "alerts cleared".to_string()
        }
        Command::Alert(None) => match engine.simulate_alert() {
            Some(view) => format!("simulated alert on {}", view.id()),
            None => "no sensors configured".to_string(),
        },
        Command::Alert(Some(id)) => match engine.simulate_alert_on(&id) {
            Ok(view) => format!("simulated alert on {}", view.id()),
            Err(err) => err.to_string(),
        },
        Command::Maintenance => {
            engine.simulate_maintenance().await;
            "maintenance complete".to_string()
        }
        Command::Report => render_json(&engine.report()),
        Command::Trends => render_json(&engine.trends()),
        Command::Status => render_status(engine),
        Command::Threshold { id, alert, critical } => {
            if engine.configure_thresholds(&id, Some(alert), critical) {
                format!("thresholds updated for {}", id)
            } else {
                format!("thresholds rejected for {}", id)
            }
        }
        Command::Enable(id) => toggle_reply(engine.set_active(&id, true), &id, "enabled"),
        Command::Disable(id) => toggle_reply(engine.set_active(&id, false), &id, "disabled"),
        Command::Help => HELP.to_string(),
        Command::Quit => return Outcome::Quit,
    };
    Outcome::Reply(reply)
}

/// Parse and run one console line. Blank lines produce an empty reply.
pub async fn handle_line(engine: &Engine, line: &str) -> Outcome {
    match line.parse::<Command>() {
        Ok(command) => execute(engine, command).await,
        Err(ParseCommandError::Empty) => Outcome::Reply(String::new()),
        Err(err) => {
            warn!("Rejected command {:?}: {}", line.trim(), err);
            Outcome::Reply(format!("{} (type 'help')", err))
        }
    }
}

fn toggle_reply(ok: bool, id: &str, what: &str) -> String {
    if ok {
        format!("{} {}", id, what)
    } else {
        format!("unknown sensor: {}", id)
    }
}

fn render_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("render failed: {}", e))
}

fn render_status(engine: &Engine) -> String {
    let stats = engine.stats();
    let mut out = format!(
        "monitoring: {}  uptime: {}  data points: {}  alerts: {}  sensors: {}",
        if stats.is_monitoring { "on" } else { "off" },
        stats.uptime,
        stats.data_points,
        stats.alert_count,
        stats.total_sensors,
    );
    for view in engine.sensors() {
        out.push_str(&format!(
            "\n  {:<8} {:<22} {:>9.2} {:<4} {:<8} battery {:>3}%{}",
            view.definition.id,
            view.definition.name,
            view.state.value,
            view.definition.unit,
            view.state.status.as_str(),
            view.state.battery_level,
            if view.state.is_active { "" } else { "  (disabled)" },
        ));
    }
    out
}
