use crate::domain::model::{
    AidingAssignment, Domain, GnssAlignment, GnssRejection, ImuAlignment, InitConditions,
    LeverArm, MagRejection, MessageClass, ModelInfo, OdometerConf, OdometerRejection, OutputKey,
    OutputMode, OutputPort,
};
use crate::domain::ports::{ConfigStore, DeviceTransport};
use crate::utils::error::{DeviceError, DeviceResult, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub port: OutputPort,
    pub class: MessageClass,
    pub id: u8,
    pub mode: OutputMode,
}

impl OutputEntry {
    fn key(&self) -> OutputKey {
        OutputKey {
            port: self.port,
            class: self.class,
            id: self.id,
        }
    }
}

/// Full settings snapshot of a device, as stored in an image file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceImage {
    pub init_conditions: InitConditions,
    pub motion_profile: ModelInfo,
    pub imu_alignment: ImuAlignment,
    pub aiding_assignment: AidingAssignment,
    pub mag_model: ModelInfo,
    pub mag_rejection: MagRejection,
    pub gnss_model: ModelInfo,
    pub gnss_alignment: GnssAlignment,
    pub gnss_rejection: GnssRejection,
    pub odometer_conf: OdometerConf,
    pub odometer_lever_arm: LeverArm,
    pub odometer_rejection: OdometerRejection,
    #[serde(default)]
    pub outputs: Vec<OutputEntry>,
    /// Number of successful save commands the device has executed.
    #[serde(default)]
    pub save_count: u32,
}

impl DeviceImage {
    /// Image of a device already configured exactly as `store` describes.
    pub fn from_config<C: ConfigStore + ?Sized>(store: &C) -> Self {
        let mut image = Self {
            init_conditions: *store.initial_conditions(),
            motion_profile: *store.motion_profile(),
            imu_alignment: *store.imu_alignment(),
            aiding_assignment: *store.aiding_assignment(),
            mag_model: *store.magnetometer_model(),
            mag_rejection: *store.magnetometer_rejection(),
            gnss_model: *store.gnss_model(),
            gnss_alignment: *store.gnss_alignment(),
            gnss_rejection: *store.gnss_rejection(),
            odometer_conf: *store.odometer_conf(),
            odometer_lever_arm: *store.odometer_lever_arm(),
            odometer_rejection: *store.odometer_rejection(),
            outputs: Vec::new(),
            save_count: 0,
        };

        for setting in store.output_settings() {
            image.set_output_mode(setting.key(), setting.output_mode);
        }

        image
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Outputs never configured on the device report `Disabled`.
    pub fn output_mode(&self, key: OutputKey) -> OutputMode {
        self.outputs
            .iter()
            .find(|entry| entry.key() == key)
            .map(|entry| entry.mode)
            .unwrap_or_default()
    }

    pub fn set_output_mode(&mut self, key: OutputKey, mode: OutputMode) {
        match self.outputs.iter_mut().find(|entry| entry.key() == key) {
            Some(entry) => entry.mode = mode,
            None => self.outputs.push(OutputEntry {
                port: key.port,
                class: key.class,
                id: key.id,
                mode,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Get(Domain),
    Set(Domain),
    Save,
}

/// In-memory device answering commands from a [`DeviceImage`].
///
/// Failures can be injected per domain for reads and writes, and for the
/// save command. Every command received is logged, failed or not.
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    image: DeviceImage,
    get_faults: HashMap<Domain, DeviceError>,
    set_faults: HashMap<Domain, DeviceError>,
    save_fault: Option<DeviceError>,
    commands: Vec<Command>,
}

impl SimulatedDevice {
    pub fn new(image: DeviceImage) -> Self {
        Self {
            image,
            ..Default::default()
        }
    }

    pub fn image(&self) -> &DeviceImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut DeviceImage {
        &mut self.image
    }

    pub fn into_image(self) -> DeviceImage {
        self.image
    }

    pub fn fail_get(&mut self, domain: Domain, error: DeviceError) {
        self.get_faults.insert(domain, error);
    }

    pub fn fail_set(&mut self, domain: Domain, error: DeviceError) {
        self.set_faults.insert(domain, error);
    }

    pub fn fail_save(&mut self, error: DeviceError) {
        self.save_fault = Some(error);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn get_count(&self) -> usize {
        self.count(|c| matches!(c, Command::Get(_)))
    }

    pub fn set_count(&self) -> usize {
        self.count(|c| matches!(c, Command::Set(_)))
    }

    /// Save commands received, including failed ones.
    pub fn save_count(&self) -> usize {
        self.count(|c| matches!(c, Command::Save))
    }

    pub fn sets_for(&self, domain: Domain) -> usize {
        self.count(|c| *c == Command::Set(domain))
    }

    fn count(&self, filter: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| filter(c)).count()
    }

    fn read<T>(&mut self, domain: Domain, value: impl FnOnce(&DeviceImage) -> T) -> DeviceResult<T> {
        self.commands.push(Command::Get(domain));
        match self.get_faults.get(&domain) {
            Some(error) => Err(*error),
            None => Ok(value(&self.image)),
        }
    }

    fn write(&mut self, domain: Domain, apply: impl FnOnce(&mut DeviceImage)) -> DeviceResult<()> {
        self.commands.push(Command::Set(domain));
        match self.set_faults.get(&domain) {
            Some(error) => Err(*error),
            None => {
                apply(&mut self.image);
                Ok(())
            }
        }
    }
}

impl DeviceTransport for SimulatedDevice {
    fn get_init_conditions(&mut self) -> DeviceResult<InitConditions> {
        self.read(Domain::InitConditions, |image| image.init_conditions)
    }

    fn set_init_conditions(&mut self, conf: &InitConditions) -> DeviceResult<()> {
        self.write(Domain::InitConditions, |image| image.init_conditions = *conf)
    }

    fn get_motion_profile(&mut self) -> DeviceResult<ModelInfo> {
        self.read(Domain::MotionProfile, |image| image.motion_profile)
    }

    fn set_motion_profile_id(&mut self, id: u32) -> DeviceResult<()> {
        self.write(Domain::MotionProfile, |image| image.motion_profile.id = id)
    }

    fn get_imu_alignment(&mut self) -> DeviceResult<ImuAlignment> {
        self.read(Domain::ImuAlignment, |image| image.imu_alignment)
    }

    fn set_imu_alignment(&mut self, conf: &ImuAlignment) -> DeviceResult<()> {
        self.write(Domain::ImuAlignment, |image| image.imu_alignment = *conf)
    }

    fn get_aiding_assignment(&mut self) -> DeviceResult<AidingAssignment> {
        self.read(Domain::AidingAssignment, |image| image.aiding_assignment)
    }

    fn set_aiding_assignment(&mut self, conf: &AidingAssignment) -> DeviceResult<()> {
        self.write(Domain::AidingAssignment, |image| image.aiding_assignment = *conf)
    }

    fn get_mag_model(&mut self) -> DeviceResult<ModelInfo> {
        self.read(Domain::MagModel, |image| image.mag_model)
    }

    fn set_mag_model_id(&mut self, id: u32) -> DeviceResult<()> {
        self.write(Domain::MagModel, |image| image.mag_model.id = id)
    }

    fn get_mag_rejection(&mut self) -> DeviceResult<MagRejection> {
        self.read(Domain::MagRejection, |image| image.mag_rejection)
    }

    fn set_mag_rejection(&mut self, conf: &MagRejection) -> DeviceResult<()> {
        self.write(Domain::MagRejection, |image| image.mag_rejection = *conf)
    }

    fn get_gnss_model(&mut self) -> DeviceResult<ModelInfo> {
        self.read(Domain::GnssModel, |image| image.gnss_model)
    }

    fn set_gnss_model_id(&mut self, id: u32) -> DeviceResult<()> {
        self.write(Domain::GnssModel, |image| image.gnss_model.id = id)
    }

    fn get_gnss_alignment(&mut self) -> DeviceResult<GnssAlignment> {
        self.read(Domain::GnssAlignment, |image| image.gnss_alignment)
    }

    fn set_gnss_alignment(&mut self, conf: &GnssAlignment) -> DeviceResult<()> {
        self.write(Domain::GnssAlignment, |image| image.gnss_alignment = *conf)
    }

    fn get_gnss_rejection(&mut self) -> DeviceResult<GnssRejection> {
        self.read(Domain::GnssRejection, |image| image.gnss_rejection)
    }

    fn set_gnss_rejection(&mut self, conf: &GnssRejection) -> DeviceResult<()> {
        self.write(Domain::GnssRejection, |image| image.gnss_rejection = *conf)
    }

    fn get_odometer_conf(&mut self) -> DeviceResult<OdometerConf> {
        self.read(Domain::Odometer, |image| image.odometer_conf)
    }

    fn set_odometer_conf(&mut self, conf: &OdometerConf) -> DeviceResult<()> {
        self.write(Domain::Odometer, |image| image.odometer_conf = *conf)
    }

    fn get_odometer_lever_arm(&mut self) -> DeviceResult<LeverArm> {
        self.read(Domain::OdometerLeverArm, |image| image.odometer_lever_arm)
    }

    fn set_odometer_lever_arm(&mut self, lever_arm: &LeverArm) -> DeviceResult<()> {
        self.write(Domain::OdometerLeverArm, |image| {
            image.odometer_lever_arm = *lever_arm
        })
    }

    fn get_odometer_rejection(&mut self) -> DeviceResult<OdometerRejection> {
        self.read(Domain::OdometerRejection, |image| image.odometer_rejection)
    }

    fn set_odometer_rejection(&mut self, conf: &OdometerRejection) -> DeviceResult<()> {
        self.write(Domain::OdometerRejection, |image| {
            image.odometer_rejection = *conf
        })
    }

    fn get_output_mode(
        &mut self,
        port: OutputPort,
        class: MessageClass,
        id: u8,
    ) -> DeviceResult<OutputMode> {
        let key = OutputKey { port, class, id };
        self.read(Domain::Output(key), |image| image.output_mode(key))
    }

    fn set_output_mode(
        &mut self,
        port: OutputPort,
        class: MessageClass,
        id: u8,
        mode: OutputMode,
    ) -> DeviceResult<()> {
        let key = OutputKey { port, class, id };
        self.write(Domain::Output(key), |image| image.set_output_mode(key, mode))
    }

    fn save_settings(&mut self) -> DeviceResult<()> {
        self.commands.push(Command::Save);
        match self.save_fault {
            Some(error) => Err(error),
            None => {
                self.image.save_count += 1;
                Ok(())
            }
        }
    }
}
