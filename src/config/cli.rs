use crate::adapters::simulated::{DeviceImage, SimulatedDevice};
use crate::adapters::tracing_reporter::TracingReporter;
use crate::config::DesiredConfig;
use crate::core::ConfigApplier;
use crate::domain::diagnostic::Severity;
use crate::domain::model::Domain;
use crate::utils::error::{DeviceError, Result};
use crate::utils::validation::{validate_path, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "ins-reconcile")]
#[command(about = "Bring an inertial navigation device in line with a TOML configuration")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Action {
    /// Reconcile the device image with the configuration file
    Apply(ApplyArgs),
    /// Save the device settings without reconciling
    Save(SaveArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "ins-config.toml")]
    pub config: String,

    /// Path to the JSON device image
    #[arg(short, long)]
    pub device: String,

    /// Reconcile in memory without writing the device image back
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub faults: FaultArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SaveArgs {
    /// Path to the JSON device image
    #[arg(short, long)]
    pub device: String,

    #[command(flatten)]
    pub faults: FaultArgs,
}

/// Failures to inject into the simulated device.
#[derive(Debug, Clone, Default, Args)]
pub struct FaultArgs {
    /// Make reads of this domain fail (repeatable)
    #[arg(long = "fail-get", value_name = "DOMAIN", value_parser = parse_domain)]
    pub fail_get: Vec<Domain>,

    /// Make writes of this domain fail (repeatable)
    #[arg(long = "fail-set", value_name = "DOMAIN", value_parser = parse_domain)]
    pub fail_set: Vec<Domain>,

    /// Make the save command fail
    #[arg(long)]
    pub fail_save: bool,
}

impl FaultArgs {
    pub fn inject(&self, device: &mut SimulatedDevice) {
        for domain in &self.fail_get {
            device.fail_get(*domain, DeviceError::ReadError);
        }
        for domain in &self.fail_set {
            device.fail_set(*domain, DeviceError::WriteError);
        }
        if self.fail_save {
            device.fail_save(DeviceError::TimeOut);
        }
    }
}

fn parse_domain(value: &str) -> std::result::Result<Domain, String> {
    Domain::from_slug(value).ok_or_else(|| {
        let known: Vec<&str> = Domain::ORDERED.iter().map(|d| d.slug()).collect();
        format!("unknown domain '{}', expected one of: {}", value, known.join(", "))
    })
}

impl Validate for ApplyArgs {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        validate_path("device", &self.device)
    }
}

impl Validate for SaveArgs {
    fn validate(&self) -> Result<()> {
        validate_path("device", &self.device)
    }
}

/// Runs `apply` against the image file. Argument and config errors are
/// printed and mapped to exit code 1; image I/O errors are returned.
pub fn run_apply(args: &ApplyArgs) -> Result<i32> {
    if let Err(e) = args.validate() {
        tracing::error!("❌ Invalid arguments: {}", e);
        eprintln!("❌ {}", e);
        return Ok(1);
    }

    tracing::info!("📁 Loading configuration from: {}", args.config);
    let desired = match DesiredConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            return Ok(1);
        }
    };

    let mut device = SimulatedDevice::new(DeviceImage::from_file(&args.device)?);
    args.faults.inject(&mut device);

    let mut applier = ConfigApplier::from_config(&desired, TracingReporter::new());
    applier.apply_configuration(&desired, &mut device);

    print_summary(applier.reporter(), &device);

    if args.dry_run {
        tracing::info!("🔍 Dry run, device image left unchanged");
    } else {
        device.into_image().write_to_file(&args.device)?;
    }

    Ok(exit_code(applier.reporter()))
}

/// Runs `save` against the image file.
pub fn run_save(args: &SaveArgs) -> Result<i32> {
    if let Err(e) = args.validate() {
        eprintln!("❌ {}", e);
        return Ok(1);
    }

    let mut device = SimulatedDevice::new(DeviceImage::from_file(&args.device)?);
    args.faults.inject(&mut device);

    let mut applier = ConfigApplier::new();
    applier.save_configuration(&mut device);

    device.into_image().write_to_file(&args.device)?;

    Ok(exit_code(applier.reporter()))
}

fn print_summary(reporter: &TracingReporter, device: &SimulatedDevice) {
    println!("📋 Reconciliation Summary:");
    println!("  Commands sent: {}", device.commands().len());
    println!("  Set commands sent: {}", device.set_count());
    println!("  Info: {}", reporter.count(Severity::Info));
    println!("  Warnings: {}", reporter.count(Severity::Warning));
    println!("  Errors: {}", reporter.count(Severity::Error));
}

/// A failed save means the device drops the applied changes on its next
/// power cycle, which is the only outcome reported as a failure.
pub fn exit_code(reporter: &TracingReporter) -> i32 {
    if reporter.count(Severity::Error) > 0 {
        3
    } else {
        0
    }
}
