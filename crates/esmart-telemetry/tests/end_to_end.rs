use bytes::BytesMut;
use esmart_frame::{encode_frame, FrameAssembler, FrameHeader};
use esmart_telemetry::{
    ChargeMode, DecoderConfig, TelemetryDecoder, TelemetryRecord, TelemetrySink,
};

/// A 41-byte telemetry frame on the wire: sentinel + 40 bytes, L = 34.
fn telemetry_wire() -> Vec<u8> {
    // Payload index = frame index - 5.
    let mut payload = [0u8; 34];
    let mut put = |frame_index: usize, bytes: &[u8]| {
        let at = frame_index - 5;
        payload[at..at + bytes.len()].copy_from_slice(bytes);
    };
    put(7, &2u16.to_le_bytes()); // chg_mode: CV
    put(9, &182u16.to_le_bytes()); // pv_volt 18.2
    put(11, &134u16.to_le_bytes()); // bat_volt 13.4
    put(13, &25u16.to_le_bytes()); // chg_cur 2.5
    put(15, &[0xEE, 0xEE]); // reserved
    put(17, &133u16.to_le_bytes()); // load_volt 13.3
    put(19, &7u16.to_le_bytes()); // load_cur 0.7
    put(21, &33u16.to_le_bytes()); // chg_power
    put(23, &9u16.to_le_bytes()); // load_power
    put(25, &[23]); // ext_temp
    put(26, &[0xEE]); // reserved
    put(27, &[251]); // int_temp -5
    put(28, &[0xEE]); // reserved
    put(29, &[87]); // soc
    put(30, &[0xEE, 0xEE, 0xEE]); // reserved
    put(33, &1234u16.to_le_bytes()); // co2_gram

    let header = FrameHeader {
        prefix: [0x01, 0x01],
        source: 3,
        msg_type: 0,
    };
    let mut buf = BytesMut::new();
    encode_frame(&header, &payload, &mut buf).expect("payload fits");
    buf.to_vec()
}

fn expected() -> TelemetryRecord {
    TelemetryRecord {
        name: "cabin".to_string(),
        ext_temp_name: "battery".to_string(),
        chg_mode: 2,
        pv_volt: 18.2,
        bat_volt: 13.4,
        chg_cur: 2.5,
        load_volt: 13.3,
        load_cur: 0.7,
        chg_power: 33,
        load_power: 9,
        ext_temp: 23,
        int_temp: -5,
        soc: 87,
        co2_gram: 1234,
    }
}

fn run(chunks: &[&[u8]], sink: &mut impl TelemetrySink) {
    let decoder = TelemetryDecoder::new(DecoderConfig {
        name: "cabin".to_string(),
        ext_temp_name: "battery".to_string(),
        verify_checksum: true,
    });
    let mut assembler = FrameAssembler::new();
    for chunk in chunks {
        for frame in assembler.feed(chunk) {
            if let Some(record) = decoder.decode(&frame) {
                sink.on_record(record);
            }
        }
    }
}

#[test]
fn three_chunks_deliver_one_record() {
    let wire = telemetry_wire();
    assert_eq!(wire.len(), 41);

    let mut records: Vec<TelemetryRecord> = Vec::new();
    run(&[&wire[..3], &wire[3..22], &wire[22..]], &mut records);

    assert_eq!(records, vec![expected()]);
    assert_eq!(records[0].charge_mode(), ChargeMode::ConstantVoltage);
}

#[test]
fn interleaved_foreign_frames_are_filtered() {
    let telemetry = telemetry_wire();
    let mut stream = esmart_frame::REQUEST_TELEMETRY.to_vec();
    stream.extend_from_slice(&telemetry);
    stream.extend_from_slice(&esmart_frame::LOAD_ON);
    stream.extend_from_slice(&telemetry);

    let mut calls = 0;
    run(&[stream.as_slice()], &mut |_record: TelemetryRecord| calls += 1);

    assert_eq!(calls, 2);
}

#[test]
fn record_serializes_to_json() {
    let json = serde_json::to_value(expected()).unwrap();
    assert_eq!(json["name"], "cabin");
    assert_eq!(json["soc"], 87);
    assert_eq!(json["int_temp"], -5);
    assert_eq!(json["pv_volt"], 18.2);
}

#[test]
fn fields_follow_wire_order() {
    let names: Vec<&str> = expected().fields().iter().map(|(n, _)| *n).collect();
    assert_eq!(
        names,
        vec![
            "chg_mode",
            "pv_volt",
            "bat_volt",
            "chg_cur",
            "load_volt",
            "load_cur",
            "chg_power",
            "load_power",
            "ext_temp",
            "int_temp",
            "soc",
            "co2_gram"
        ]
    );
}
