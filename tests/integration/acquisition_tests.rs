//! Integration tests for the AppService probe loop and soil check.
//!
//! The probe is mocked at the port boundary, so these cover endpoint
//! ordering, failure aggregation and the two plausibility layers.

use super::mock_probe::{MockProbe, RecordingSink, probe_registers};

use soilprobe::app::events::AppEvent;
use soilprobe::config::SystemConfig;
use soilprobe::error::DeviceError;
use soilprobe::{AcquisitionOutcome, AppService, InvalidReason, ReferenceTables, SoilCheck};

fn make_app() -> AppService<'static> {
    AppService::new(SystemConfig::default(), ReferenceTables::builtin())
}

fn good_soil() -> Vec<u16> {
    probe_registers(253, 320, 415, 1200, 65, 180, 210)
}

// ── Probe loop ───────────────────────────────────────────────

#[test]
fn no_ports_is_reported_without_attempts() {
    let app = make_app();
    let mut probe = MockProbe::new(&[]);
    let mut sink = RecordingSink::new();

    let outcome = app.acquire_measurement(&mut probe, &mut sink);

    assert_eq!(outcome, AcquisitionOutcome::NoEndpointsFound);
    assert!(probe.attempts.is_empty());
    assert!(matches!(sink.events[..], [AppEvent::EndpointsDiscovered(0)]));
}

#[test]
fn discovery_failure_becomes_device_error() {
    let app = make_app();
    let mut probe = MockProbe::failing_discovery(DeviceError::Enumeration("udev gone".into()));
    let mut sink = RecordingSink::new();

    match app.acquire_measurement(&mut probe, &mut sink) {
        AcquisitionOutcome::DeviceError(msg) => assert!(msg.contains("udev gone"), "{msg}"),
        other => panic!("expected DeviceError, got {other:?}"),
    }
    assert!(probe.attempts.is_empty());
    assert!(matches!(
        sink.events[..],
        [AppEvent::DiscoveryFailed(DeviceError::Enumeration(_))]
    ));
}

#[test]
fn first_answering_port_wins_and_later_ports_are_untouched() {
    let app = make_app();
    let mut probe = MockProbe::new(&["COM1", "COM3", "COM4"])
        .respond("COM1", Err(DeviceError::Timeout))
        .respond("COM3", Ok(good_soil()))
        .respond("COM4", Ok(good_soil()));
    let mut sink = RecordingSink::new();

    let outcome = app.acquire_measurement(&mut probe, &mut sink);

    let m = outcome.measurement().expect("reading");
    assert!((m.temperature_c - 25.3).abs() < 1e-9);
    assert!((m.nitrogen_mg_kg - 32.0).abs() < 1e-9);
    assert!((m.moisture_percent - 41.5).abs() < 1e-9);
    assert!((m.ph - 6.5).abs() < 1e-9);
    assert!((m.conductivity_us_cm - 1200.0).abs() < 1e-9);
    assert_eq!(probe.attempts, ["COM1", "COM3"]);
    assert!(outcome.user_message().is_none());

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::AttemptFailed { .. })),
        1
    );
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::MeasurementAcquired { endpoint, .. } if endpoint == "COM3"
    )));
}

#[test]
fn every_failure_is_kept_in_probe_order() {
    let app = make_app();
    let mut probe = MockProbe::new(&["/dev/ttyS0", "/dev/ttyUSB0", "/dev/ttyUSB1"])
        .respond(
            "/dev/ttyS0",
            Err(DeviceError::Open {
                port: "/dev/ttyS0".into(),
                reason: "permission denied".into(),
            }),
        )
        .respond("/dev/ttyUSB0", Err(DeviceError::CrcMismatch { expected: 1, actual: 2 }))
        .respond("/dev/ttyUSB1", Err(DeviceError::Exception(0x02)));
    let mut sink = RecordingSink::new();

    let outcome = app.acquire_measurement(&mut probe, &mut sink);

    let AcquisitionOutcome::AllEndpointsFailed(failures) = &outcome else {
        panic!("expected AllEndpointsFailed, got {outcome:?}");
    };
    let names: Vec<&str> = failures.iter().map(|f| f.endpoint.name.as_str()).collect();
    assert_eq!(names, ["/dev/ttyS0", "/dev/ttyUSB0", "/dev/ttyUSB1"]);
    assert_eq!(failures[2].error, DeviceError::Exception(0x02));
    assert!(outcome.user_message().unwrap().contains("any of 3 port(s)"));
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::AcquisitionFailed { attempts: 3 })
    ));
}

#[test]
fn short_register_block_counts_as_endpoint_failure() {
    let app = make_app();
    let mut probe = MockProbe::new(&["COM1"]).respond("COM1", Ok(vec![1, 2, 3]));
    let mut sink = RecordingSink::new();

    let AcquisitionOutcome::AllEndpointsFailed(failures) =
        app.acquire_measurement(&mut probe, &mut sink)
    else {
        panic!("short block must not produce a reading");
    };
    assert_eq!(
        failures[0].error,
        DeviceError::ShortRead { expected: 7, actual: 3 }
    );
}

#[test]
fn link_settings_follow_config() {
    let config = SystemConfig {
        baud_rate: 4800,
        slave_address: 7,
        timeout_ms: 250,
        ..SystemConfig::default()
    };
    let app = AppService::new(config, ReferenceTables::builtin());
    let mut probe = MockProbe::new(&["COM9"]).respond("COM9", Ok(good_soil()));

    app.acquire_measurement(&mut probe, &mut RecordingSink::new());

    let link = probe.last_link.expect("one attempt");
    assert_eq!(link.baud_rate, 4800);
    assert_eq!(link.timeout.as_millis(), 250);
    assert_eq!(link.request.slave, 7);
    assert_eq!(link.request.count, 14);
}

#[test]
fn read_port_skips_discovery() {
    let app = make_app();
    let mut probe = MockProbe::failing_discovery(DeviceError::Enumeration("unused".into()))
        .respond("/dev/ttyACM0", Ok(good_soil()));

    let m = app.read_port(&mut probe, "/dev/ttyACM0").unwrap();

    assert!((m.potassium_mg_kg - 21.0).abs() < 1e-9);
    assert_eq!(probe.attempts, ["/dev/ttyACM0"]);
}

#[test]
fn read_port_surfaces_the_device_error() {
    let app = make_app();
    let mut probe = MockProbe::new(&[]);
    assert_eq!(
        app.read_port(&mut probe, "COM5").unwrap_err(),
        DeviceError::Timeout
    );
}

// ── Soil check ───────────────────────────────────────────────

#[test]
fn probe_in_soil_is_ready() {
    let app = make_app();
    let mut probe = MockProbe::new(&["COM1"]).respond("COM1", Ok(good_soil()));
    let mut sink = RecordingSink::new();

    let check = app.check_soil(&mut probe, &mut sink);
    assert!(check.is_ready(), "{check:?}");
    assert!(check.user_message().is_none());
}

#[test]
fn probe_in_air_reads_too_low() {
    let app = make_app();
    // Temperature and pH still report, nutrients and moisture are zero.
    let mut probe = MockProbe::new(&["COM1"])
        .respond("COM1", Ok(probe_registers(221, 0, 0, 0, 70, 0, 0)));
    let mut sink = RecordingSink::new();

    let check = app.check_soil(&mut probe, &mut sink);
    assert!(matches!(check, SoilCheck::ReadingsTooLow(_)));
    assert!(check.user_message().unwrap().contains("inserted in soil"));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ReadingsTooLow(_))), 1);
}

#[test]
fn shallow_insertion_is_implausible() {
    let app = make_app();
    let mut probe = MockProbe::new(&["COM1"])
        .respond("COM1", Ok(probe_registers(240, 150, 80, 300, 62, 90, 120)));
    let mut sink = RecordingSink::new();

    let check = app.check_soil(&mut probe, &mut sink);
    assert!(matches!(
        check,
        SoilCheck::Implausible(_, InvalidReason::MoistureTooLow)
    ));
    assert!(check.user_message().unwrap().contains("insert fully"));
}

#[test]
fn acid_ph_is_reported_before_moisture() {
    let app = make_app();
    let mut probe = MockProbe::new(&["COM1"])
        .respond("COM1", Ok(probe_registers(240, 150, 80, 300, 25, 90, 120)));

    let check = app.check_soil(&mut probe, &mut RecordingSink::new());
    assert!(matches!(
        check,
        SoilCheck::Implausible(_, InvalidReason::PhNotPlausible)
    ));
}

#[test]
fn check_without_ports_is_unavailable() {
    let app = make_app();
    let check = app.check_soil(&mut MockProbe::new(&[]), &mut RecordingSink::new());
    assert_eq!(
        check,
        SoilCheck::Unavailable(AcquisitionOutcome::NoEndpointsFound)
    );
}

#[test]
fn thresholds_come_from_config() {
    let config = SystemConfig {
        min_inserted_moisture_percent: 5.0,
        ..SystemConfig::default()
    };
    let app = AppService::new(config, ReferenceTables::builtin());
    let mut probe = MockProbe::new(&["COM1"])
        .respond("COM1", Ok(probe_registers(240, 150, 80, 300, 62, 90, 120)));

    assert!(app.check_soil(&mut probe, &mut RecordingSink::new()).is_ready());
}

#[test]
fn check_port_reads_only_the_named_port() {
    let app = make_app();
    let mut probe = MockProbe::failing_discovery(DeviceError::Enumeration("unused".into()))
        .respond("COM7", Ok(good_soil()));
    let mut sink = RecordingSink::new();

    let check = app.check_port(&mut probe, "COM7", &mut sink);

    assert!(check.is_ready(), "{check:?}");
    assert_eq!(probe.attempts, ["COM7"]);
    assert!(matches!(
        sink.events[..],
        [AppEvent::MeasurementAcquired { .. }]
    ));
}

#[test]
fn check_port_runs_the_plausibility_layers() {
    let app = make_app();
    let mut probe = MockProbe::new(&[])
        .respond("COM7", Ok(probe_registers(221, 0, 0, 0, 70, 0, 0)));

    let check = app.check_port(&mut probe, "COM7", &mut RecordingSink::new());
    assert!(matches!(check, SoilCheck::ReadingsTooLow(_)));
}

#[test]
fn check_port_failure_names_the_port() {
    let app = make_app();
    let mut probe = MockProbe::new(&[]);
    let mut sink = RecordingSink::new();

    let check = app.check_port(&mut probe, "COM7", &mut sink);

    let SoilCheck::Unavailable(AcquisitionOutcome::AllEndpointsFailed(failures)) = &check else {
        panic!("expected an unavailable reading, got {check:?}");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].endpoint.name, "COM7");
    assert_eq!(failures[0].error, DeviceError::Timeout);
    assert!(check.user_message().unwrap().starts_with("Sensor error:"));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AttemptFailed { .. })), 1);
}
