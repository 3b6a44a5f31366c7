//! Fuzz target: `decode_read_response`
//!
//! Treats the input as a response frame to a 14-register probe read and
//! checks that decoding never panics and only ever yields the requested
//! number of registers.
//!
//! cargo fuzz run fuzz_rtu_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use soilprobe::SoilMeasurement;
use soilprobe::modbus::codec::expected_frame_len;
use soilprobe::modbus::{ReadRequest, decode_read_response};

fuzz_target!(|data: &[u8]| {
    let Ok(request) = ReadRequest::new(1, 0, 14) else {
        return;
    };

    if let Some(len) = expected_frame_len(data) {
        assert!(len >= 5, "frame length below the exception frame size");
    }

    if let Ok(registers) = decode_read_response(data, &request) {
        assert_eq!(registers.len(), 14);
        let m = SoilMeasurement::from_registers(&registers).expect("14 registers decode");
        assert!(m.ph.is_finite() && m.temperature_c.is_finite());
    }
});
