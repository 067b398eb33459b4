use ins_reconcile::adapters::recording::RecordingReporter;
use ins_reconcile::adapters::simulated::{Command, DeviceImage, SimulatedDevice};
use ins_reconcile::core::{Domain, Severity};
use ins_reconcile::domain::model::{
    AxisDirection, GnssAlignment, InitConditions, MessageClass, ModelInfo, ModulePort, OutputKey,
    OutputLog, OutputMode, OutputPort, RejectionMode,
};
use ins_reconcile::{ConfigApplier, DesiredConfig, DeviceError, Diagnostic, ReadFailurePolicy};

fn desired_config() -> DesiredConfig {
    let mut config = DesiredConfig::default();
    config.initial_conditions = InitConditions {
        year: 2024,
        month: 6,
        day: 1,
        latitude: 48.419,
        longitude: -4.472,
        altitude: 100.0,
    };
    config.motion_profile = ModelInfo::with_id(1);
    config.imu_alignment.alignment.axis_direction_x = AxisDirection::Forward;
    config.imu_alignment.alignment.axis_direction_y = AxisDirection::Right;
    config.imu_alignment.lever_arm = [0.1, 0.0, -0.2];
    config.aiding_assignment.gnss1_port = ModulePort::PortB;
    config.magnetometer.model = ModelInfo::with_id(201);
    config.magnetometer.rejection.magnetic_field = RejectionMode::Automatic;
    config.gnss.model = ModelInfo::with_id(101);
    config.gnss.alignment = GnssAlignment {
        lever_arm_z: 1.2,
        ..Default::default()
    };
    config.gnss.rejection.position = RejectionMode::Automatic;
    config.odometer.conf.gain = 4800.0;
    config.odometer.conf.gain_error = 1;
    config.odometer.rejection.velocity = RejectionMode::Automatic;
    config.output.port = OutputPort::PortA;
    config.output.messages = vec![
        log0(1, OutputMode::Div8),
        log0(2, OutputMode::MainLoop),
        log0(6, OutputMode::Disabled),
    ];
    config
}

fn log0(id: u8, mode: OutputMode) -> OutputLog {
    OutputLog {
        class: MessageClass::Log0,
        id,
        mode,
    }
}

fn key(id: u8) -> OutputKey {
    OutputKey {
        port: OutputPort::PortA,
        class: MessageClass::Log0,
        id,
    }
}

fn synced_device(desired: &DesiredConfig) -> SimulatedDevice {
    SimulatedDevice::new(DeviceImage::from_config(desired))
}

fn applier() -> ConfigApplier<RecordingReporter> {
    ConfigApplier::with_reporter(RecordingReporter::new())
}

#[test]
fn test_every_domain_is_read_once_in_order() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    let mut expected: Vec<Command> = Domain::ORDERED.iter().map(|d| Command::Get(*d)).collect();
    expected.extend([1, 2, 6].map(|id| Command::Get(Domain::Output(key(id)))));
    assert_eq!(device.commands(), expected.as_slice());
}

#[test]
fn test_matching_init_conditions_cause_no_write() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.set_count(), 0);
    assert_eq!(device.save_count(), 0);
    assert!(!applier.persistence_needed());
}

#[test]
fn test_single_differing_field_writes_full_value() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    device.image_mut().init_conditions.altitude = 99.5;
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.sets_for(Domain::InitConditions), 1);
    assert_eq!(device.set_count(), 1);
    assert_eq!(device.image().init_conditions, desired.initial_conditions);
}

#[test]
fn test_every_compared_field_of_gnss_alignment_triggers_write() {
    let desired = desired_config();
    let mutations: [fn(&mut GnssAlignment); 6] = [
        |a| a.lever_arm_x += 0.5,
        |a| a.lever_arm_y += 0.5,
        |a| a.lever_arm_z += 0.5,
        |a| a.pitch_offset += 0.5,
        |a| a.yaw_offset += 0.5,
        |a| a.antenna_distance += 0.5,
    ];

    for mutate in mutations {
        let mut device = synced_device(&desired);
        mutate(&mut device.image_mut().gnss_alignment);
        let mut applier = applier();

        applier.apply_configuration(&desired, &mut device);

        assert_eq!(device.sets_for(Domain::GnssAlignment), 1);
        assert_eq!(device.image().gnss_alignment, desired.gnss.alignment);
    }
}

#[test]
fn test_magnetometer_model_change_is_written_and_saved() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    device.image_mut().mag_model = ModelInfo { id: 202, revision: 1 };
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.set_count(), 1);
    assert_eq!(device.sets_for(Domain::MagModel), 1);
    assert_eq!(device.image().mag_model.id, 201);
    assert!(applier.persistence_needed());
    assert_eq!(device.save_count(), 1);
    assert_eq!(device.commands().last(), Some(&Command::Save));
    assert_eq!(
        applier.reporter().diagnostics(),
        vec![
            Diagnostic::Updated {
                domain: Domain::MagModel
            },
            Diagnostic::Saved,
        ]
    );
}

#[test]
fn test_gnss_rejection_read_failure_does_not_abort() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    device.fail_get(Domain::GnssRejection, DeviceError::TimeOut);
    device.image_mut().odometer_conf.gain = 1000.0;
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    let warnings = applier.reporter().with_severity(Severity::Warning);
    assert_eq!(
        warnings,
        vec![Diagnostic::ReadFailed {
            domain: Domain::GnssRejection,
            error: DeviceError::TimeOut,
        }]
    );
    // Desired rejection differs from the default fallback value.
    assert_eq!(device.sets_for(Domain::GnssRejection), 1);
    // Later domains are still visited.
    assert_eq!(device.sets_for(Domain::Odometer), 1);
    assert!(device
        .commands()
        .contains(&Command::Get(Domain::OdometerRejection)));
    assert_eq!(device.save_count(), 1);
}

#[test]
fn test_read_failure_with_default_desired_value_writes_nothing() {
    let mut desired = desired_config();
    desired.gnss.rejection = Default::default();
    let mut device = synced_device(&desired);
    device.fail_get(Domain::GnssRejection, DeviceError::TimeOut);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.set_count(), 0);
    assert!(!applier.persistence_needed());
}

#[test]
fn test_all_reads_failing_still_visits_every_domain() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    for domain in Domain::ORDERED {
        device.fail_get(domain, DeviceError::DeviceNotFound);
    }
    let mut applier = applier().with_read_failure_policy(ReadFailurePolicy::Skip);

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.get_count(), 12 + desired.output.messages.len());
    assert_eq!(device.set_count(), 0);
    assert_eq!(applier.reporter().with_severity(Severity::Warning).len(), 12);
}

#[test]
fn test_write_failure_does_not_request_persistence() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    device.image_mut().motion_profile.id = 3;
    device.fail_set(Domain::MotionProfile, DeviceError::InvalidParameter);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.image().motion_profile.id, 3);
    assert!(!applier.persistence_needed());
    assert_eq!(device.save_count(), 0);
    assert_eq!(
        applier.reporter().diagnostics(),
        vec![Diagnostic::WriteFailed {
            domain: Domain::MotionProfile,
            error: DeviceError::InvalidParameter,
        }]
    );
}

#[test]
fn test_flag_stays_set_after_later_write_failure() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    device.image_mut().init_conditions.day = 2;
    device.image_mut().odometer_lever_arm = [1.0, 0.0, 0.0];
    device.fail_set(Domain::OdometerLeverArm, DeviceError::WriteError);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert!(applier.persistence_needed());
    assert_eq!(device.save_count(), 1);
}

#[test]
fn test_output_mode_mismatch_sets_exact_triple() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    device.image_mut().set_output_mode(key(2), OutputMode::Div200);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.set_count(), 1);
    assert_eq!(device.sets_for(Domain::Output(key(2))), 1);
    assert_eq!(device.image().output_mode(key(2)), OutputMode::MainLoop);
    assert_eq!(device.save_count(), 1);
}

#[test]
fn test_output_failures_are_independent() {
    let desired = desired_config();
    let mut device = SimulatedDevice::new(DeviceImage::default());
    device.fail_get(Domain::Output(key(1)), DeviceError::InvalidFrame);
    device.fail_set(Domain::Output(key(2)), DeviceError::WriteError);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    let entries = desired.output.messages.len();
    let output_gets = device
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::Get(Domain::Output(_))))
        .count();
    let output_sets = device
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::Set(Domain::Output(_))))
        .count();
    assert_eq!(output_gets, entries);
    assert!(output_sets <= entries);
    // Entry 1 falls back to Disabled and is rewritten, entry 2 fails, entry 6
    // already reads Disabled.
    assert_eq!(device.image().output_mode(key(1)), OutputMode::Div8);
    assert_eq!(device.image().output_mode(key(2)), OutputMode::Disabled);
    assert_eq!(device.sets_for(Domain::Output(key(6))), 0);
}

#[test]
fn test_duplicate_output_entries_last_write_wins() {
    let mut desired = desired_config();
    desired.output.messages = vec![log0(3, OutputMode::Div8), log0(3, OutputMode::NewData)];
    let mut device = synced_device(&desired);
    device.image_mut().set_output_mode(key(3), OutputMode::Disabled);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    let domain = Domain::Output(key(3));
    assert_eq!(
        &device.commands()[12..],
        &[
            Command::Get(domain),
            Command::Set(domain),
            Command::Get(domain),
            Command::Set(domain),
            Command::Save,
        ]
    );
    assert_eq!(device.image().output_mode(key(3)), OutputMode::NewData);
}

#[test]
fn test_save_failure_is_reported_as_error() {
    let desired = desired_config();
    let mut device = synced_device(&desired);
    device.image_mut().motion_profile.id = 2;
    device.image_mut().gnss_rejection.hdt = RejectionMode::Always;
    device.image_mut().odometer_rejection.velocity = RejectionMode::Never;
    device.fail_save(DeviceError::TimeOut);
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);

    assert_eq!(device.save_count(), 1);
    assert_eq!(device.image().save_count, 0);
    assert_eq!(
        applier.reporter().diagnostics(),
        vec![
            Diagnostic::Updated {
                domain: Domain::MotionProfile
            },
            Diagnostic::Updated {
                domain: Domain::GnssRejection
            },
            Diagnostic::Updated {
                domain: Domain::OdometerRejection
            },
            Diagnostic::SaveFailed {
                error: DeviceError::TimeOut
            },
        ]
    );
    assert_eq!(applier.reporter().with_severity(Severity::Error).len(), 1);
    assert_eq!(applier.reporter().with_severity(Severity::Info).len(), 3);
}

#[test]
fn test_repeated_runs_converge() {
    let desired = desired_config();
    let mut device = SimulatedDevice::new(DeviceImage::default());
    let mut applier = applier();

    applier.apply_configuration(&desired, &mut device);
    assert!(applier.persistence_needed());
    let first_sets = device.set_count();
    assert!(first_sets > 0);

    applier.reporter().clear();
    applier.apply_configuration(&desired, &mut device);

    assert!(!applier.persistence_needed());
    assert_eq!(device.set_count(), first_sets);
    assert_eq!(device.save_count(), 1);
    assert!(applier.reporter().diagnostics().is_empty());
}
