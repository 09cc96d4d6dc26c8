use clap::{Parser, Subcommand};
use smc_sensors::{TemperatureUnit, config::IOSERVICE_SMC, structs::KERNEL_INDEX_SMC};

#[derive(Parser)]
#[command(
    name = "smc-sensors",
    version,
    about = "Read temperatures and fan speeds from the Apple System Management Controller (SMC)"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Log every SMC round trip (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = IOSERVICE_SMC, help = "IOKit service to connect to")]
    pub service: String,

    #[arg(long, global = true, default_value_t = KERNEL_INDEX_SMC, help = "Struct method selector")]
    pub selector: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all SMC keys and their values
    List,
    /// Read a single SMC key and display its value
    Read {
        #[arg(help = "Four-character SMC key name (e.g. TC0D, F0Ac)")]
        key: String,
    },
    /// Show the size and data type of a key
    Info {
        #[arg(help = "Four-character SMC key name (e.g. TC0D, F0Ac)")]
        key: String,
    },
    /// Read temperature sensors
    Temp {
        #[arg(help = "Sensor key; all known sensors when omitted")]
        key: Option<String>,
        #[arg(short, long, default_value = "c", help = "Unit: c, f or k")]
        unit: TemperatureUnit,
    },
    /// Show the number of fans and their speeds
    Fans,
    /// Print the table of known sensor keys
    Keys,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_defaults_to_celsius() {
        let args = CliArgs::try_parse_from(["smc-sensors", "temp"]).unwrap();
        let Commands::Temp { key, unit } = args.command else {
            panic!("expected temp");
        };
        assert_eq!(key, None);
        assert_eq!(unit, TemperatureUnit::Celsius);
        assert_eq!(args.service, "AppleSMC");
        assert_eq!(args.selector, 2);
    }

    #[test]
    fn temp_with_key_and_unit() {
        let args =
            CliArgs::try_parse_from(["smc-sensors", "-v", "temp", "TC0D", "--unit", "F"]).unwrap();
        assert!(args.verbose);
        let Commands::Temp { key, unit } = args.command else {
            panic!("expected temp");
        };
        assert_eq!(key.as_deref(), Some("TC0D"));
        assert_eq!(unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn bad_unit_is_rejected() {
        assert!(CliArgs::try_parse_from(["smc-sensors", "temp", "--unit", "rankine"]).is_err());
    }

    #[test]
    fn read_requires_key() {
        assert!(CliArgs::try_parse_from(["smc-sensors", "read"]).is_err());
        let args = CliArgs::try_parse_from(["smc-sensors", "read", "F0Ac"]).unwrap();
        assert!(matches!(args.command, Commands::Read { key } if key == "F0Ac"));
    }
}
