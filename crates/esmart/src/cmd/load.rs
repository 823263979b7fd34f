use esmart_driver::{DriverConfig, PollDriver};
use esmart_frame::Command;
use esmart_telemetry::TelemetryDecoder;
use esmart_transport::{SerialTransport, Transport};

use crate::cmd::{LoadArgs, LoadState};
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::{print_command, OutputFormat};

/// A one-shot command should fail rather than wait forever on a dead link.
const RECONNECT_ATTEMPTS: u32 = 3;

pub fn run(args: LoadArgs, format: OutputFormat) -> CliResult<i32> {
    let transport = SerialTransport::new(args.serial.to_config()?);
    let config = DriverConfig {
        max_reconnect_attempts: Some(RECONNECT_ATTEMPTS),
        ..DriverConfig::default()
    };
    let mut driver = PollDriver::new(transport, TelemetryDecoder::default(), config);
    driver
        .open()
        .map_err(|err| driver_error("open failed", err))?;

    let command = load_command(args.state);
    let result = driver.send_command(command);
    driver.close();
    result.map_err(|err| driver_error("load switch failed", err))?;

    print_command(driver.transport().identifier(), command, format);
    Ok(SUCCESS)
}

fn load_command(state: LoadState) -> Command {
    match state {
        LoadState::On => Command::LoadOn,
        LoadState::Off => Command::LoadOff,
    }
}
