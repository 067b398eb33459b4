use serde::{Deserialize, Serialize};
use std::fmt;

/// Lever arm expressed in meters along the device X, Y and Z axes.
pub type LeverArm = [f32; 3];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InitConditions {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Model reported by the device. Only `id` can be written back, the revision
/// is informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: u32,
    #[serde(default)]
    pub revision: u32,
}

impl ModelInfo {
    pub fn with_id(id: u32) -> Self {
        Self { id, revision: 0 }
    }

    pub fn same_model(&self, other: &ModelInfo) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDirection {
    #[default]
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorAlignment {
    pub axis_direction_x: AxisDirection,
    pub axis_direction_y: AxisDirection,
    pub mis_roll: f32,
    pub mis_pitch: f32,
    pub mis_yaw: f32,
}

/// Sensor alignment and primary lever arm, read and written as one command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuAlignment {
    pub alignment: SensorAlignment,
    pub lever_arm: LeverArm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulePort {
    PortA,
    PortB,
    PortC,
    PortD,
    PortE,
    Internal,
    #[default]
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleSync {
    #[default]
    Disabled,
    SyncInA,
    SyncInB,
    SyncInC,
    SyncInD,
    Internal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OdometerPins {
    #[default]
    Disabled,
    A,
    #[serde(rename = "ab")]
    AB,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidingAssignment {
    pub gnss1_port: ModulePort,
    pub gnss1_sync: ModuleSync,
    pub odometer_pins: OdometerPins,
    pub rtcm_port: ModulePort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionMode {
    #[default]
    Never,
    Automatic,
    Always,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagRejection {
    pub magnetic_field: RejectionMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GnssAlignment {
    pub lever_arm_x: f32,
    pub lever_arm_y: f32,
    pub lever_arm_z: f32,
    pub pitch_offset: f32,
    pub yaw_offset: f32,
    pub antenna_distance: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GnssRejection {
    pub position: RejectionMode,
    pub velocity: RejectionMode,
    pub hdt: RejectionMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OdometerConf {
    /// Pulses per meter.
    pub gain: f32,
    /// Gain error in percent.
    pub gain_error: u8,
    pub reverse_mode: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdometerRejection {
    pub velocity: RejectionMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPort {
    #[default]
    PortA,
    PortB,
    PortC,
    PortD,
    PortE,
}

impl fmt::Display for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputPort::PortA => "port A",
            OutputPort::PortB => "port B",
            OutputPort::PortC => "port C",
            OutputPort::PortD => "port D",
            OutputPort::PortE => "port E",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageClass {
    #[default]
    Log0,
    Log1,
    Nmea0,
    Nmea1,
    ThirdParty0,
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageClass::Log0 => "LOG_0",
            MessageClass::Log1 => "LOG_1",
            MessageClass::Nmea0 => "NMEA_0",
            MessageClass::Nmea1 => "NMEA_1",
            MessageClass::ThirdParty0 => "THIRD_PARTY_0",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Disabled,
    MainLoop,
    #[serde(rename = "div_2")]
    Div2,
    #[serde(rename = "div_4")]
    Div4,
    #[serde(rename = "div_5")]
    Div5,
    #[serde(rename = "div_8")]
    Div8,
    #[serde(rename = "div_10")]
    Div10,
    #[serde(rename = "div_20")]
    Div20,
    #[serde(rename = "div_40")]
    Div40,
    #[serde(rename = "div_200")]
    Div200,
    PpsSync,
    NewData,
}

/// Lookup key of a single message output on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputKey {
    pub port: OutputPort,
    pub class: MessageClass,
    pub id: u8,
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} message {} on {}", self.class, self.id, self.port)
    }
}

/// One message output as declared in the configuration, without its port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLog {
    pub class: MessageClass,
    pub id: u8,
    pub mode: OutputMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSetting {
    pub output_port: OutputPort,
    pub message_class: MessageClass,
    pub message_id: u8,
    pub output_mode: OutputMode,
}

impl OutputSetting {
    pub fn new(output_port: OutputPort, log: &OutputLog) -> Self {
        Self {
            output_port,
            message_class: log.class,
            message_id: log.id,
            output_mode: log.mode,
        }
    }

    pub fn key(&self) -> OutputKey {
        OutputKey {
            port: self.output_port,
            class: self.message_class,
            id: self.message_id,
        }
    }
}

/// A unit of device configuration reconciled as one get/compare/set group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    InitConditions,
    MotionProfile,
    ImuAlignment,
    AidingAssignment,
    MagModel,
    MagRejection,
    GnssModel,
    GnssAlignment,
    GnssRejection,
    Odometer,
    OdometerLeverArm,
    OdometerRejection,
    Output(OutputKey),
}

impl Domain {
    /// Scalar domains in reconciliation order.
    pub const ORDERED: [Domain; 12] = [
        Domain::InitConditions,
        Domain::MotionProfile,
        Domain::ImuAlignment,
        Domain::AidingAssignment,
        Domain::MagModel,
        Domain::MagRejection,
        Domain::GnssModel,
        Domain::GnssAlignment,
        Domain::GnssRejection,
        Domain::Odometer,
        Domain::OdometerLeverArm,
        Domain::OdometerRejection,
    ];

    /// Short identifier, as used on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Domain::InitConditions => "init-conditions",
            Domain::MotionProfile => "motion-profile",
            Domain::ImuAlignment => "imu-alignment",
            Domain::AidingAssignment => "aiding-assignment",
            Domain::MagModel => "mag-model",
            Domain::MagRejection => "mag-rejection",
            Domain::GnssModel => "gnss-model",
            Domain::GnssAlignment => "gnss-alignment",
            Domain::GnssRejection => "gnss-rejection",
            Domain::Odometer => "odometer",
            Domain::OdometerLeverArm => "odometer-lever-arm",
            Domain::OdometerRejection => "odometer-rejection",
            Domain::Output(_) => "output",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Domain> {
        Domain::ORDERED.into_iter().find(|d| d.slug() == slug)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::InitConditions => f.write_str("Init conditions"),
            Domain::MotionProfile => f.write_str("Motion profile"),
            Domain::ImuAlignment => f.write_str("IMU alignment"),
            Domain::AidingAssignment => f.write_str("Aiding assignment"),
            Domain::MagModel => f.write_str("Magnetometer model"),
            Domain::MagRejection => f.write_str("Magnetometer rejection"),
            Domain::GnssModel => f.write_str("Gnss model"),
            Domain::GnssAlignment => f.write_str("Gnss lever arms"),
            Domain::GnssRejection => f.write_str("Gnss rejection"),
            Domain::Odometer => f.write_str("Odometer"),
            Domain::OdometerLeverArm => f.write_str("Odometer lever arms"),
            Domain::OdometerRejection => f.write_str("Odometer rejection"),
            Domain::Output(key) => write!(f, "Output {}", key),
        }
    }
}
