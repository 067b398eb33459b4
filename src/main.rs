use anyhow::Context;
use clap::Parser;
use ins_reconcile::config::cli::{run_apply, run_save, Action, LogFormat};
use ins_reconcile::utils::logger;
use ins_reconcile::CliConfig;

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::debug!("CLI config: {:?}", cli);

    let exit_code = match &cli.action {
        Action::Apply(args) => run_apply(args)
            .with_context(|| format!("failed to apply configuration to '{}'", args.device))?,
        Action::Save(args) => run_save(args)
            .with_context(|| format!("failed to save settings of '{}'", args.device))?,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
