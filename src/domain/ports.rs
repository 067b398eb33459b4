use crate::domain::diagnostic::Diagnostic;
use crate::domain::model::{
    AidingAssignment, GnssAlignment, GnssRejection, ImuAlignment, InitConditions, LeverArm,
    MagRejection, MessageClass, ModelInfo, OdometerConf, OdometerRejection, OutputLog, OutputMode,
    OutputPort, OutputSetting,
};
use crate::utils::error::DeviceResult;

/// Synchronous command channel to a single device.
///
/// Each call blocks until the device answers. Timeouts and framing are the
/// implementation's concern; callers only see success or a `DeviceError`.
pub trait DeviceTransport {
    fn get_init_conditions(&mut self) -> DeviceResult<InitConditions>;
    fn set_init_conditions(&mut self, conf: &InitConditions) -> DeviceResult<()>;

    fn get_motion_profile(&mut self) -> DeviceResult<ModelInfo>;
    fn set_motion_profile_id(&mut self, id: u32) -> DeviceResult<()>;

    fn get_imu_alignment(&mut self) -> DeviceResult<ImuAlignment>;
    fn set_imu_alignment(&mut self, conf: &ImuAlignment) -> DeviceResult<()>;

    fn get_aiding_assignment(&mut self) -> DeviceResult<AidingAssignment>;
    fn set_aiding_assignment(&mut self, conf: &AidingAssignment) -> DeviceResult<()>;

    fn get_mag_model(&mut self) -> DeviceResult<ModelInfo>;
    fn set_mag_model_id(&mut self, id: u32) -> DeviceResult<()>;

    fn get_mag_rejection(&mut self) -> DeviceResult<MagRejection>;
    fn set_mag_rejection(&mut self, conf: &MagRejection) -> DeviceResult<()>;

    fn get_gnss_model(&mut self) -> DeviceResult<ModelInfo>;
    fn set_gnss_model_id(&mut self, id: u32) -> DeviceResult<()>;

    fn get_gnss_alignment(&mut self) -> DeviceResult<GnssAlignment>;
    fn set_gnss_alignment(&mut self, conf: &GnssAlignment) -> DeviceResult<()>;

    fn get_gnss_rejection(&mut self) -> DeviceResult<GnssRejection>;
    fn set_gnss_rejection(&mut self, conf: &GnssRejection) -> DeviceResult<()>;

    fn get_odometer_conf(&mut self) -> DeviceResult<OdometerConf>;
    fn set_odometer_conf(&mut self, conf: &OdometerConf) -> DeviceResult<()>;

    fn get_odometer_lever_arm(&mut self) -> DeviceResult<LeverArm>;
    fn set_odometer_lever_arm(&mut self, lever_arm: &LeverArm) -> DeviceResult<()>;

    fn get_odometer_rejection(&mut self) -> DeviceResult<OdometerRejection>;
    fn set_odometer_rejection(&mut self, conf: &OdometerRejection) -> DeviceResult<()>;

    fn get_output_mode(
        &mut self,
        port: OutputPort,
        class: MessageClass,
        id: u8,
    ) -> DeviceResult<OutputMode>;
    fn set_output_mode(
        &mut self,
        port: OutputPort,
        class: MessageClass,
        id: u8,
        mode: OutputMode,
    ) -> DeviceResult<()>;

    /// Commits the current settings to non-volatile memory. The device
    /// reboots afterwards.
    fn save_settings(&mut self) -> DeviceResult<()>;
}

/// Read-only source of the desired configuration.
pub trait ConfigStore {
    fn initial_conditions(&self) -> &InitConditions;
    fn motion_profile(&self) -> &ModelInfo;
    fn imu_alignment(&self) -> &ImuAlignment;
    fn aiding_assignment(&self) -> &AidingAssignment;
    fn magnetometer_model(&self) -> &ModelInfo;
    fn magnetometer_rejection(&self) -> &MagRejection;
    fn gnss_model(&self) -> &ModelInfo;
    fn gnss_alignment(&self) -> &GnssAlignment;
    fn gnss_rejection(&self) -> &GnssRejection;
    fn odometer_conf(&self) -> &OdometerConf;
    fn odometer_lever_arm(&self) -> &LeverArm;
    fn odometer_rejection(&self) -> &OdometerRejection;
    fn output_port(&self) -> OutputPort;
    fn output_modes(&self) -> &[OutputLog];

    /// Output settings in declaration order, bound to the target port.
    fn output_settings(&self) -> Vec<OutputSetting> {
        let port = self.output_port();
        self.output_modes()
            .iter()
            .map(|log| OutputSetting::new(port, log))
            .collect()
    }
}

/// Sink for reconciliation diagnostics.
pub trait Reporter {
    fn report(&self, diagnostic: Diagnostic);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}
