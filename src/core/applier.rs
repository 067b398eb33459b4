use crate::adapters::tracing_reporter::TracingReporter;
use crate::config::DesiredConfig;
use crate::core::{ConfigStore, DeviceTransport, Diagnostic, Domain, OutputSetting, Reporter};
use crate::utils::error::DeviceResult;
use serde::{Deserialize, Serialize};

/// What to do with a domain whose current value could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFailurePolicy {
    /// Compare the desired value against the domain's default value and
    /// write on mismatch.
    #[default]
    Compare,
    /// Leave the domain untouched for this run.
    Skip,
}

/// Converges a device toward a desired configuration, one domain at a time.
///
/// Every domain is read, compared field by field with exact equality and only
/// written back when it differs. Failures are reported through the
/// [`Reporter`] and never abort the run. When at least one write succeeded the
/// settings are saved once at the end of [`ConfigApplier::apply_configuration`].
pub struct ConfigApplier<R: Reporter = TracingReporter> {
    reporter: R,
    on_read_failure: ReadFailurePolicy,
    reboot_needed: bool,
}

impl ConfigApplier<TracingReporter> {
    pub fn new() -> Self {
        Self::with_reporter(TracingReporter::new())
    }
}

impl Default for ConfigApplier<TracingReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reporter> ConfigApplier<R> {
    pub fn with_reporter(reporter: R) -> Self {
        Self {
            reporter,
            on_read_failure: ReadFailurePolicy::default(),
            reboot_needed: false,
        }
    }

    /// Applier set up with the reconciliation options carried by `config`.
    pub fn from_config(config: &DesiredConfig, reporter: R) -> Self {
        Self::with_reporter(reporter).with_read_failure_policy(config.read_failure_policy)
    }

    pub fn with_read_failure_policy(mut self, policy: ReadFailurePolicy) -> Self {
        self.on_read_failure = policy;
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// True once any write of the current run has succeeded.
    pub fn persistence_needed(&self) -> bool {
        self.reboot_needed
    }

    /// Reconciles every configuration domain and every output of `store`
    /// against `device`, then saves the settings if anything was written.
    pub fn apply_configuration<C, D>(&mut self, store: &C, device: &mut D)
    where
        C: ConfigStore + ?Sized,
        D: DeviceTransport + ?Sized,
    {
        self.reboot_needed = false;

        self.reconcile(
            device,
            Domain::InitConditions,
            store.initial_conditions(),
            D::get_init_conditions,
            PartialEq::eq,
            D::set_init_conditions,
        );
        self.reconcile(
            device,
            Domain::MotionProfile,
            store.motion_profile(),
            D::get_motion_profile,
            |current, desired| current.same_model(desired),
            |dev, desired| dev.set_motion_profile_id(desired.id),
        );
        self.reconcile(
            device,
            Domain::ImuAlignment,
            store.imu_alignment(),
            D::get_imu_alignment,
            PartialEq::eq,
            D::set_imu_alignment,
        );
        self.reconcile(
            device,
            Domain::AidingAssignment,
            store.aiding_assignment(),
            D::get_aiding_assignment,
            PartialEq::eq,
            D::set_aiding_assignment,
        );
        self.reconcile(
            device,
            Domain::MagModel,
            store.magnetometer_model(),
            D::get_mag_model,
            |current, desired| current.same_model(desired),
            |dev, desired| dev.set_mag_model_id(desired.id),
        );
        self.reconcile(
            device,
            Domain::MagRejection,
            store.magnetometer_rejection(),
            D::get_mag_rejection,
            PartialEq::eq,
            D::set_mag_rejection,
        );
        self.reconcile(
            device,
            Domain::GnssModel,
            store.gnss_model(),
            D::get_gnss_model,
            |current, desired| current.same_model(desired),
            |dev, desired| dev.set_gnss_model_id(desired.id),
        );
        self.reconcile(
            device,
            Domain::GnssAlignment,
            store.gnss_alignment(),
            D::get_gnss_alignment,
            PartialEq::eq,
            D::set_gnss_alignment,
        );
        self.reconcile(
            device,
            Domain::GnssRejection,
            store.gnss_rejection(),
            D::get_gnss_rejection,
            PartialEq::eq,
            D::set_gnss_rejection,
        );
        self.reconcile(
            device,
            Domain::Odometer,
            store.odometer_conf(),
            D::get_odometer_conf,
            PartialEq::eq,
            D::set_odometer_conf,
        );
        self.reconcile(
            device,
            Domain::OdometerLeverArm,
            store.odometer_lever_arm(),
            D::get_odometer_lever_arm,
            PartialEq::eq,
            D::set_odometer_lever_arm,
        );
        self.reconcile(
            device,
            Domain::OdometerRejection,
            store.odometer_rejection(),
            D::get_odometer_rejection,
            PartialEq::eq,
            D::set_odometer_rejection,
        );

        for setting in store.output_settings() {
            self.configure_output(device, &setting);
        }

        if self.reboot_needed {
            self.save_configuration(device);
        } else {
            tracing::debug!("Device already matches the desired configuration, nothing to save");
        }
    }

    /// Asks the device to persist its current settings.
    pub fn save_configuration<D: DeviceTransport + ?Sized>(&mut self, device: &mut D) {
        match device.save_settings() {
            Ok(()) => self.reporter.report(Diagnostic::Saved),
            Err(error) => self.reporter.report(Diagnostic::SaveFailed { error }),
        }
    }

    fn configure_output<D: DeviceTransport + ?Sized>(&mut self, device: &mut D, setting: &OutputSetting) {
        let key = setting.key();

        self.reconcile(
            device,
            Domain::Output(key),
            &setting.output_mode,
            |dev| dev.get_output_mode(key.port, key.class, key.id),
            PartialEq::eq,
            |dev, mode| dev.set_output_mode(key.port, key.class, key.id, *mode),
        );
    }

    /// Read, compare and conditionally write a single domain.
    fn reconcile<D, T, G, E, S>(
        &mut self,
        device: &mut D,
        domain: Domain,
        desired: &T,
        get: G,
        same: E,
        set: S,
    ) where
        D: DeviceTransport + ?Sized,
        T: Default + std::fmt::Debug,
        G: FnOnce(&mut D) -> DeviceResult<T>,
        E: FnOnce(&T, &T) -> bool,
        S: FnOnce(&mut D, &T) -> DeviceResult<()>,
    {
        let current = match get(device) {
            Ok(current) => current,
            Err(error) => {
                self.reporter.report(Diagnostic::ReadFailed { domain, error });

                match self.on_read_failure {
                    ReadFailurePolicy::Compare => T::default(),
                    ReadFailurePolicy::Skip => {
                        tracing::debug!("{} skipped after read failure", domain);
                        return;
                    }
                }
            }
        };

        if same(&current, desired) {
            tracing::debug!("{} already in sync", domain);
            return;
        }

        tracing::debug!("{} differs: device {:?}, desired {:?}", domain, current, desired);

        match set(device, desired) {
            Ok(()) => {
                self.reporter.report(Diagnostic::Updated { domain });
                self.reboot_needed = true;
            }
            Err(error) => self.reporter.report(Diagnostic::WriteFailed { domain, error }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recording::RecordingReporter;
    use crate::adapters::simulated::{Command, DeviceImage, SimulatedDevice};
    use crate::config::DesiredConfig;
    use crate::domain::model::{ModelInfo, RejectionMode};
    use crate::utils::error::DeviceError;

    fn in_sync_pair() -> (DesiredConfig, SimulatedDevice) {
        let desired = DesiredConfig::default();
        let device = SimulatedDevice::new(DeviceImage::from_config(&desired));
        (desired, device)
    }

    #[test]
    fn test_in_sync_device_is_left_alone() {
        let (desired, mut device) = in_sync_pair();
        let mut applier = ConfigApplier::with_reporter(RecordingReporter::new());

        applier.apply_configuration(&desired, &mut device);

        assert!(!applier.persistence_needed());
        assert_eq!(device.set_count(), 0);
        assert_eq!(device.save_count(), 0);
        assert!(applier.reporter().diagnostics().is_empty());
    }

    #[test]
    fn test_model_revision_does_not_trigger_write() {
        let (desired, mut device) = in_sync_pair();
        device.image_mut().gnss_model = ModelInfo {
            id: desired.gnss.model.id,
            revision: 7,
        };
        let mut applier = ConfigApplier::with_reporter(RecordingReporter::new());

        applier.apply_configuration(&desired, &mut device);

        assert_eq!(device.set_count(), 0);
    }

    #[test]
    fn test_skip_policy_leaves_unreadable_domain_untouched() {
        let (mut desired, mut device) = in_sync_pair();
        desired.magnetometer.rejection.magnetic_field = RejectionMode::Always;
        device.fail_get(Domain::MagRejection, DeviceError::TimeOut);

        let mut applier = ConfigApplier::with_reporter(RecordingReporter::new())
            .with_read_failure_policy(ReadFailurePolicy::Skip);
        applier.apply_configuration(&desired, &mut device);

        assert_eq!(device.set_count(), 0);
        assert!(!applier.persistence_needed());
        assert_eq!(
            applier.reporter().diagnostics(),
            vec![Diagnostic::ReadFailed {
                domain: Domain::MagRejection,
                error: DeviceError::TimeOut,
            }]
        );
    }

    #[test]
    fn test_from_config_uses_configured_read_failure_policy() {
        let (mut desired, mut device) = in_sync_pair();
        desired.read_failure_policy = ReadFailurePolicy::Skip;
        desired.magnetometer.rejection.magnetic_field = RejectionMode::Always;
        device.fail_get(Domain::MagRejection, DeviceError::TimeOut);

        let mut applier = ConfigApplier::from_config(&desired, RecordingReporter::new());
        applier.apply_configuration(&desired, &mut device);

        assert_eq!(device.sets_for(Domain::MagRejection), 0);
        assert!(!applier.persistence_needed());
    }

    #[test]
    fn test_compare_policy_writes_desired_value_after_read_failure() {
        let (mut desired, mut device) = in_sync_pair();
        desired.magnetometer.rejection.magnetic_field = RejectionMode::Always;
        device.fail_get(Domain::MagRejection, DeviceError::TimeOut);

        let mut applier = ConfigApplier::with_reporter(RecordingReporter::new());
        applier.apply_configuration(&desired, &mut device);

        assert!(device.commands().contains(&Command::Set(Domain::MagRejection)));
        assert_eq!(
            device.image().mag_rejection.magnetic_field,
            RejectionMode::Always
        );
        assert!(applier.persistence_needed());
    }

    #[test]
    fn test_flag_resets_between_runs() {
        let (mut desired, mut device) = in_sync_pair();
        desired.odometer.conf.reverse_mode = !desired.odometer.conf.reverse_mode;
        let mut applier = ConfigApplier::with_reporter(RecordingReporter::new());

        applier.apply_configuration(&desired, &mut device);
        assert!(applier.persistence_needed());
        assert_eq!(device.save_count(), 1);

        applier.apply_configuration(&desired, &mut device);
        assert!(!applier.persistence_needed());
        assert_eq!(device.save_count(), 1);
    }

    #[test]
    fn test_save_configuration_can_be_forced() {
        let (_, mut device) = in_sync_pair();
        let mut applier = ConfigApplier::with_reporter(RecordingReporter::new());

        applier.save_configuration(&mut device);

        assert_eq!(device.save_count(), 1);
        assert_eq!(applier.reporter().diagnostics(), vec![Diagnostic::Saved]);
    }
}
