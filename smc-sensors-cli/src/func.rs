use smc_sensors::{
    Smc, SmcConfig, SmcError, TemperatureUnit, keys,
    value::{DATATYPE_SP78, convert_temperature},
};

pub fn list(config: &SmcConfig) -> Result<(), SmcError> {
    let smc = Smc::open_with(config)?;
    for v in smc.values()? {
        match v {
            Ok(v) => println!("{v}"),
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}

pub fn read(config: &SmcConfig, key: &str) -> Result<(), SmcError> {
    let smc = Smc::open_with(config)?;
    let val = smc.read_key(key)?;
    println!("{val}");
    Ok(())
}

pub fn info(config: &SmcConfig, key: &str) -> Result<(), SmcError> {
    let smc = Smc::open_with(config)?;
    let info = smc.key_info(key)?;
    println!(
        "{key} type: {} size: {} attributes: {:#04x}",
        info.data_type_str(),
        info.data_size,
        info.data_attributes
    );
    Ok(())
}

pub fn temp(config: &SmcConfig, key: Option<&str>, unit: TemperatureUnit) -> Result<(), SmcError> {
    let smc = Smc::open_with(config)?;
    if let Some(key) = key {
        let t = smc.temperature(key, unit)?;
        println!("{key}: {t:.1}{unit}");
        return Ok(());
    }
    for (label, key) in keys::TEMPERATURE_SENSORS {
        // missing sensors are normal, only show what this machine has
        let Ok(val) = smc.read_key(key) else {
            continue;
        };
        match val.fixed_point() {
            Ok(c) if val.data_type_str() == DATATYPE_SP78 => {
                println!("{label:<24} {key} {:>6.1}{unit}", convert_temperature(c, unit));
            }
            _ => println!("{val}"),
        }
    }
    Ok(())
}

pub fn fans(config: &SmcConfig) -> Result<(), SmcError> {
    let smc = Smc::open_with(config)?;
    let count = smc.num_fans()?;
    println!("Fans: {count}");
    for index in 0..count {
        match smc.fan_rpm(index) {
            Ok(rpm) => println!("Fan {index}: {rpm:.0} RPM"),
            Err(e) => eprintln!("Fan {index}: {e}"),
        }
    }
    Ok(())
}

pub fn key_table() {
    for (label, key) in keys::TEMPERATURE_SENSORS {
        println!("{key}  {label}");
    }
    for (index, key) in [keys::FAN_0, keys::FAN_1, keys::FAN_2].iter().enumerate() {
        println!("{key}  Fan {index} speed");
    }
    println!("{}  Number of fans", keys::NUM_FANS);
}
