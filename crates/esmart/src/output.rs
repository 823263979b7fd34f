use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use esmart_frame::Command;
use esmart_telemetry::TelemetryRecord;
use esmart_transport::PortInfo;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    kind: &'static str,
    mode: &'static str,
    #[serde(flatten)]
    record: &'a TelemetryRecord,
    timestamp: String,
}

#[derive(Serialize)]
struct CommandOutput<'a> {
    kind: &'static str,
    port: &'a str,
    command: &'static str,
    bytes: String,
    timestamp: String,
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'a str,
}

pub fn print_record(record: &TelemetryRecord, format: OutputFormat) {
    println!("{}", render_record(record, format));
}

pub fn render_record(record: &TelemetryRecord, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let out = RecordOutput {
                kind: "telemetry",
                mode: record.charge_mode().label(),
                record,
                timestamp: now_unix_seconds(),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["name".to_string(), record.name.clone()])
                .add_row(vec!["mode".to_string(), record.charge_mode().to_string()]);
            for (field, value) in record.fields() {
                let label = if field == "ext_temp" {
                    format!("ext_temp ({})", record.ext_temp_name)
                } else {
                    field.to_string()
                };
                table.add_row(vec![label, value.to_string()]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => format!(
            "{} mode={} pv={}V batt={}V chg={}A/{}W load={}V/{}A/{}W {}={}C int={}C soc={}% co2={}g",
            record.name,
            record.charge_mode(),
            record.pv_volt,
            record.bat_volt,
            record.chg_cur,
            record.chg_power,
            record.load_volt,
            record.load_cur,
            record.load_power,
            record.ext_temp_name,
            record.ext_temp,
            record.int_temp,
            record.soc,
            record.co2_gram
        ),
    }
}

pub fn print_command(port: &str, command: Command, format: OutputFormat) {
    let bytes = hex_string(command.as_bytes());
    match format {
        OutputFormat::Json => {
            let out = CommandOutput {
                kind: "command-sent",
                port,
                command: command.name(),
                bytes,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "COMMAND", "BYTES"])
                .add_row(vec![port.to_string(), command.name().to_string(), bytes]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("sent {} to {} ({})", command.name(), port, bytes);
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports
                .iter()
                .map(|p| PortOutput {
                    name: &p.name,
                    kind: &p.kind,
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TYPE"]);
            for port in ports {
                table.add_row(vec![port.name.clone(), port.kind.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for port in ports {
                println!("{}\t{}", port.name, port.kind);
            }
        }
    }
}

pub fn hex_string(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
