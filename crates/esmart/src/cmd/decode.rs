use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};

use esmart_frame::{FrameError, FrameReader};
use esmart_telemetry::TelemetryDecoder;
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_record, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input: Box<dyn Read> = if let Some(hex) = &args.hex {
        Box::new(Cursor::new(parse_hex(hex)?))
    } else if let Some(path) = &args.file {
        let file = File::open(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(io::stdin().lock())
    };

    let decoder = TelemetryDecoder::new(args.device.to_config());
    let mut reader = FrameReader::new(input);
    let mut frames = 0usize;
    let mut records = 0usize;

    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        };
        frames += 1;

        if let Some(record) = decoder.decode(&frame) {
            print_record(&record, format);
            records += 1;
        }
    }

    debug!(frames, records, "capture decoded");
    if records == 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("no telemetry frames found ({frames} frames read)"),
        ));
    }
    Ok(SUCCESS)
}

/// Parse hex bytes. Whitespace, `:` and `,` separators are ignored.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':' && *b != b',')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "hex input has an odd number of digits"));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).unwrap_or("??");
            u8::from_str_radix(text, 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex byte: {text}")))
        })
        .collect()
}
