use crate::core::{ConfigStore, ReadFailurePolicy};
use crate::domain::model::{
    AidingAssignment, AxisDirection, GnssAlignment, GnssRejection, ImuAlignment, InitConditions,
    LeverArm, MagRejection, ModelInfo, OdometerConf, OdometerRejection, OutputLog, OutputPort,
    RejectionMode, SensorAlignment,
};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Desired configuration file, as written by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub reconcile: ReconcileSection,
    pub initial_conditions: InitialConditionsSection,
    pub motion_profile: ModelSection,
    pub imu_alignment: ImuAlignmentSection,
    pub aiding_assignment: AidingAssignment,
    pub magnetometer: MagnetometerSection,
    pub gnss: GnssSection,
    pub odometer: OdometerSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileSection {
    #[serde(default)]
    pub on_read_failure: ReadFailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialConditionsSection {
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    pub id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImuAlignmentSection {
    pub axis_direction_x: AxisDirection,
    pub axis_direction_y: AxisDirection,
    /// Roll, pitch and yaw misalignment in degrees.
    #[serde(default)]
    pub misalignment: [f32; 3],
    #[serde(default)]
    pub lever_arm: LeverArm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagnetometerSection {
    pub model_id: u32,
    pub rejection: RejectionMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GnssSection {
    pub model_id: u32,
    pub alignment: GnssAlignmentSection,
    pub rejection: GnssRejection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GnssAlignmentSection {
    #[serde(default)]
    pub lever_arm: LeverArm,
    #[serde(default)]
    pub pitch_offset: f32,
    #[serde(default)]
    pub yaw_offset: f32,
    #[serde(default)]
    pub antenna_distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdometerSection {
    pub gain: f32,
    pub gain_error: u8,
    #[serde(default)]
    pub reverse_mode: bool,
    #[serde(default)]
    pub lever_arm: LeverArm,
    pub rejection: RejectionMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub port: OutputPort,
    #[serde(default)]
    pub messages: Vec<OutputLog>,
}

impl TomlConfig {
    /// Loads the configuration file without validating it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable. Unknown
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn parse_date(&self) -> Result<NaiveDate> {
        let date = validation::validate_required_field(
            "initial_conditions.date",
            &self.initial_conditions.date,
        )?;

        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| SyncError::InvalidConfigValueError {
            field: "initial_conditions.date".to_string(),
            value: date.clone(),
            reason: e.to_string(),
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        let date = self.parse_date()?;
        validation::validate_range("initial_conditions.date", date.year(), 0, i32::from(u16::MAX))?;

        let init = &self.initial_conditions;
        validation::validate_range("initial_conditions.latitude", init.latitude, -90.0, 90.0)?;
        validation::validate_range("initial_conditions.longitude", init.longitude, -180.0, 180.0)?;
        if !init.altitude.is_finite() {
            return Err(SyncError::InvalidConfigValueError {
                field: "initial_conditions.altitude".to_string(),
                value: init.altitude.to_string(),
                reason: "Value must be a finite number".to_string(),
            });
        }

        validation::validate_finite("imu_alignment.misalignment", &self.imu_alignment.misalignment)?;
        validation::validate_finite("imu_alignment.lever_arm", &self.imu_alignment.lever_arm)?;

        let gnss = &self.gnss.alignment;
        validation::validate_finite("gnss.alignment.lever_arm", &gnss.lever_arm)?;
        validation::validate_finite(
            "gnss.alignment",
            &[gnss.pitch_offset, gnss.yaw_offset, gnss.antenna_distance],
        )?;

        validation::validate_finite("odometer.gain", &[self.odometer.gain])?;
        validation::validate_range("odometer.gain_error", self.odometer.gain_error, 0, 100)?;
        validation::validate_finite("odometer.lever_arm", &self.odometer.lever_arm)?;

        Ok(())
    }

    /// Converts the file layout into the typed configuration the reconciler
    /// consumes.
    pub fn into_desired(self) -> Result<DesiredConfig> {
        self.validate_config()?;
        let date = self.parse_date()?;

        let init = &self.initial_conditions;
        let [mis_roll, mis_pitch, mis_yaw] = self.imu_alignment.misalignment;
        let [lever_arm_x, lever_arm_y, lever_arm_z] = self.gnss.alignment.lever_arm;

        Ok(DesiredConfig {
            read_failure_policy: self.reconcile.on_read_failure,
            initial_conditions: InitConditions {
                year: date.year() as u16,
                month: date.month() as u8,
                day: date.day() as u8,
                latitude: init.latitude,
                longitude: init.longitude,
                altitude: init.altitude,
            },
            motion_profile: ModelInfo::with_id(self.motion_profile.id),
            imu_alignment: ImuAlignment {
                alignment: SensorAlignment {
                    axis_direction_x: self.imu_alignment.axis_direction_x,
                    axis_direction_y: self.imu_alignment.axis_direction_y,
                    mis_roll,
                    mis_pitch,
                    mis_yaw,
                },
                lever_arm: self.imu_alignment.lever_arm,
            },
            aiding_assignment: self.aiding_assignment,
            magnetometer: MagnetometerConfig {
                model: ModelInfo::with_id(self.magnetometer.model_id),
                rejection: MagRejection {
                    magnetic_field: self.magnetometer.rejection,
                },
            },
            gnss: GnssConfig {
                model: ModelInfo::with_id(self.gnss.model_id),
                alignment: GnssAlignment {
                    lever_arm_x,
                    lever_arm_y,
                    lever_arm_z,
                    pitch_offset: self.gnss.alignment.pitch_offset,
                    yaw_offset: self.gnss.alignment.yaw_offset,
                    antenna_distance: self.gnss.alignment.antenna_distance,
                },
                rejection: self.gnss.rejection,
            },
            odometer: OdometerConfig {
                conf: OdometerConf {
                    gain: self.odometer.gain,
                    gain_error: self.odometer.gain_error,
                    reverse_mode: self.odometer.reverse_mode,
                },
                lever_arm: self.odometer.lever_arm,
                rejection: OdometerRejection {
                    velocity: self.odometer.rejection,
                },
            },
            output: OutputConfig {
                port: self.output.port,
                messages: self.output.messages,
            },
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Immutable snapshot of the configuration a device should converge to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredConfig {
    /// Picked up by [`ConfigApplier::from_config`](crate::core::ConfigApplier::from_config).
    pub read_failure_policy: ReadFailurePolicy,
    pub initial_conditions: InitConditions,
    pub motion_profile: ModelInfo,
    pub imu_alignment: ImuAlignment,
    pub aiding_assignment: AidingAssignment,
    pub magnetometer: MagnetometerConfig,
    pub gnss: GnssConfig,
    pub odometer: OdometerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagnetometerConfig {
    pub model: ModelInfo,
    pub rejection: MagRejection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GnssConfig {
    pub model: ModelInfo,
    pub alignment: GnssAlignment,
    pub rejection: GnssRejection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdometerConfig {
    pub conf: OdometerConf,
    pub lever_arm: LeverArm,
    pub rejection: OdometerRejection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputConfig {
    pub port: OutputPort,
    pub messages: Vec<OutputLog>,
}

impl DesiredConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        TomlConfig::from_file(path)?.into_desired()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        TomlConfig::from_toml_str(content)?.into_desired()
    }
}

impl ConfigStore for DesiredConfig {
    fn initial_conditions(&self) -> &InitConditions {
        &self.initial_conditions
    }

    fn motion_profile(&self) -> &ModelInfo {
        &self.motion_profile
    }

    fn imu_alignment(&self) -> &ImuAlignment {
        &self.imu_alignment
    }

    fn aiding_assignment(&self) -> &AidingAssignment {
        &self.aiding_assignment
    }

    fn magnetometer_model(&self) -> &ModelInfo {
        &self.magnetometer.model
    }

    fn magnetometer_rejection(&self) -> &MagRejection {
        &self.magnetometer.rejection
    }

    fn gnss_model(&self) -> &ModelInfo {
        &self.gnss.model
    }

    fn gnss_alignment(&self) -> &GnssAlignment {
        &self.gnss.alignment
    }

    fn gnss_rejection(&self) -> &GnssRejection {
        &self.gnss.rejection
    }

    fn odometer_conf(&self) -> &OdometerConf {
        &self.odometer.conf
    }

    fn odometer_lever_arm(&self) -> &LeverArm {
        &self.odometer.lever_arm
    }

    fn odometer_rejection(&self) -> &OdometerRejection {
        &self.odometer.rejection
    }

    fn output_port(&self) -> OutputPort {
        self.output.port
    }

    fn output_modes(&self) -> &[OutputLog] {
        &self.output.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{MessageClass, ModulePort, OutputMode, OutputSetting};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_CONFIG: &str = r#"
[initial_conditions]
date = "2024-06-01"
latitude = 48.419
longitude = -4.472
altitude = 100.0

[motion_profile]
id = 1

[imu_alignment]
axis_direction_x = "forward"
axis_direction_y = "right"
misalignment = [0.0, 0.5, 0.0]
lever_arm = [0.1, 0.0, -0.2]

[aiding_assignment]
gnss1_port = "port_b"
gnss1_sync = "disabled"
odometer_pins = "disabled"
rtcm_port = "disabled"

[magnetometer]
model_id = 201
rejection = "automatic"

[gnss]
model_id = 101
rejection = { position = "automatic", velocity = "automatic", hdt = "never" }
alignment = { lever_arm = [0.0, 0.0, 1.2], antenna_distance = 0.0 }

[odometer]
gain = 4800.0
gain_error = 1
rejection = "automatic"

[output]
port = "port_a"

[[output.messages]]
class = "log0"
id = 1
mode = "div_8"

[[output.messages]]
class = "nmea0"
id = 0
mode = "disabled"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = DesiredConfig::from_toml_str(BASIC_CONFIG).unwrap();

        assert_eq!(config.read_failure_policy, ReadFailurePolicy::Compare);
        assert_eq!(config.initial_conditions.year, 2024);
        assert_eq!(config.initial_conditions.month, 6);
        assert_eq!(config.initial_conditions.day, 1);
        assert_eq!(config.imu_alignment.alignment.axis_direction_y, AxisDirection::Right);
        assert_eq!(config.imu_alignment.alignment.mis_pitch, 0.5);
        assert_eq!(config.aiding_assignment.gnss1_port, ModulePort::PortB);
        assert_eq!(config.magnetometer.model.id, 201);
        assert_eq!(config.gnss.alignment.lever_arm_z, 1.2);
        assert_eq!(config.gnss.rejection.hdt, RejectionMode::Never);
        assert_eq!(config.odometer.lever_arm, [0.0, 0.0, 0.0]);
        assert!(!config.odometer.conf.reverse_mode);
    }

    #[test]
    fn test_output_settings_keep_order_and_port() {
        let config = DesiredConfig::from_toml_str(BASIC_CONFIG).unwrap();
        let settings: Vec<OutputSetting> = config.output_settings();

        assert_eq!(settings.len(), 2);
        assert!(settings.iter().all(|s| s.output_port == OutputPort::PortA));
        assert_eq!(settings[0].message_class, MessageClass::Log0);
        assert_eq!(settings[0].output_mode, OutputMode::Div8);
        assert_eq!(settings[1].message_class, MessageClass::Nmea0);
    }

    #[test]
    fn test_skip_policy_is_read() {
        let content = format!("[reconcile]\non_read_failure = \"skip\"\n{}", BASIC_CONFIG);
        let config = DesiredConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.read_failure_policy, ReadFailurePolicy::Skip);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("INS_RECONCILE_TEST_GNSS_MODEL", "102");

        let content = BASIC_CONFIG.replace("model_id = 101", "model_id = ${INS_RECONCILE_TEST_GNSS_MODEL}");
        let config = DesiredConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.gnss.model.id, 102);

        std::env::remove_var("INS_RECONCILE_TEST_GNSS_MODEL");
    }

    #[test]
    fn test_missing_date_is_reported() {
        let content = BASIC_CONFIG.replace("date = \"2024-06-01\"\n", "");
        let err = DesiredConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, SyncError::MissingConfigError { ref field } if field == "initial_conditions.date"));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let content = BASIC_CONFIG.replace("2024-06-01", "2024-02-30");
        let err = DesiredConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_config_validation() {
        let content = BASIC_CONFIG.replace("latitude = 48.419", "latitude = 123.0");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());

        let content = BASIC_CONFIG.replace("gain_error = 1", "gain_error = 150");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_enum_value_fails_parsing() {
        let content = BASIC_CONFIG.replace("rejection = \"automatic\"\n\n[gnss]", "rejection = \"sometimes\"\n\n[gnss]");
        let err = TomlConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, SyncError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_CONFIG.as_bytes()).unwrap();

        let config = DesiredConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.messages.len(), 2);
    }
}
