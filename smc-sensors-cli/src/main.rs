use clap::Parser;
use smc_sensors::SmcConfig;
use smc_sensors_cli::{
    command::{CliArgs, Commands},
    func,
};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let cli = CliArgs::parse();

    let default_filter = if cli.verbose {
        "warn,smc_sensors=trace"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = SmcConfig::builder()
        .service_name(cli.service)
        .selector(cli.selector)
        .build();
    tracing::debug!(?config, "smc config");

    let result = match cli.command {
        Commands::List => func::list(&config),
        Commands::Read { key } => func::read(&config, &key),
        Commands::Info { key } => func::info(&config, &key),
        Commands::Temp { key, unit } => func::temp(&config, key.as_deref(), unit),
        Commands::Fans => func::fans(&config),
        Commands::Keys => {
            func::key_table();
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
