use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use esmart_driver::{DriverConfig, PollDriver};
use esmart_telemetry::TelemetryDecoder;
use esmart_transport::SerialTransport;
use tracing::info;

use crate::cmd::{parse_duration, MonitorArgs};
use crate::exit::{driver_error, CliError, CliResult, INTERNAL, INTERRUPTED, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let tick = parse_duration(&args.tick)?;
    let config = driver_config(&args)?;
    let transport = SerialTransport::new(args.serial.to_config()?);
    let decoder = TelemetryDecoder::new(args.device.to_config());

    let (tx, records) = mpsc::channel();
    let mut driver = PollDriver::new(transport, decoder, config).with_sink(tx);
    driver
        .open()
        .map_err(|err| driver_error("open failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        driver
            .tick()
            .map_err(|err| driver_error("monitor stopped", err))?;

        for record in records.try_iter() {
            print_record(&record, format);
            printed = printed.saturating_add(1);

            if args.count.is_some_and(|count| printed >= count) {
                driver.close();
                return Ok(SUCCESS);
            }
        }

        thread::sleep(tick);
    }

    let stats = driver.stats();
    info!(
        records = stats.records_decoded,
        polls = stats.polls_sent,
        recoveries = stats.recoveries,
        "monitor stopped"
    );
    driver.close();
    Ok(SUCCESS)
}

fn driver_config(args: &MonitorArgs) -> CliResult<DriverConfig> {
    let frame_timeout = if args.no_frame_timeout {
        None
    } else {
        Some(parse_duration(&args.frame_timeout)?)
    };
    Ok(DriverConfig {
        poll_interval: parse_duration(&args.poll_interval)?,
        reconnect_delay: parse_duration(&args.reconnect_delay)?,
        frame_timeout,
        max_reconnect_attempts: args.max_reconnect_attempts,
        ..DriverConfig::default()
    })
}

/// First Ctrl-C stops the loop after the current tick. Recovery can block, so
/// a second one exits immediately.
fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        if !running.swap(false, Ordering::SeqCst) {
            std::process::exit(INTERRUPTED);
        }
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
