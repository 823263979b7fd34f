use std::sync::mpsc;

use tracing::{debug, info};

use crate::record::TelemetryRecord;

/// Receives decoded telemetry records.
///
/// Called synchronously from the driver loop, once per record, in frame
/// completion order. Implementations should return quickly.
pub trait TelemetrySink {
    fn on_record(&mut self, record: TelemetryRecord);
}

impl<F> TelemetrySink for F
where
    F: FnMut(TelemetryRecord),
{
    fn on_record(&mut self, record: TelemetryRecord) {
        self(record)
    }
}

impl TelemetrySink for Vec<TelemetryRecord> {
    fn on_record(&mut self, record: TelemetryRecord) {
        self.push(record);
    }
}

/// Forwards records to another thread. A hung-up receiver drops records.
impl TelemetrySink for mpsc::Sender<TelemetryRecord> {
    fn on_record(&mut self, record: TelemetryRecord) {
        if self.send(record).is_err() {
            debug!("telemetry receiver gone, record dropped");
        }
    }
}

/// Emits every record as a structured `info!` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn on_record(&mut self, record: TelemetryRecord) {
        info!(
            name = %record.name,
            mode = %record.charge_mode(),
            pv_volt = record.pv_volt,
            bat_volt = record.bat_volt,
            chg_cur = record.chg_cur,
            load_volt = record.load_volt,
            load_cur = record.load_cur,
            chg_power = record.chg_power,
            load_power = record.load_power,
            ext_temp = record.ext_temp,
            ext_temp_name = %record.ext_temp_name,
            int_temp = record.int_temp,
            soc = record.soc,
            co2_gram = record.co2_gram,
            "telemetry"
        );
    }
}
