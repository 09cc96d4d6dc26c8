use crate::{error::KeyEncodingError, key::SensorKey};

// Temperatures (sp78 on Intel Macs)
pub const AMBIENT_AIR_0: &str = "TA0P";
pub const AMBIENT_AIR_1: &str = "TA1P";
pub const CPU_0_DIODE: &str = "TC0D";
pub const CPU_0_HEATSINK: &str = "TC0H";
pub const CPU_0_PROXIMITY: &str = "TC0P";
pub const ENCLOSURE_BASE_0: &str = "TB0T";
pub const ENCLOSURE_BASE_1: &str = "TB1T";
pub const ENCLOSURE_BASE_2: &str = "TB2T";
pub const ENCLOSURE_BASE_3: &str = "TB3T";
pub const GPU_0_DIODE: &str = "TG0D";
pub const GPU_0_HEATSINK: &str = "TG0H";
pub const GPU_0_PROXIMITY: &str = "TG0P";
pub const HARD_DRIVE_BAY: &str = "TH0P";
pub const MEMORY_SLOT_0: &str = "TM0S";
pub const MEMORY_SLOTS_PROXIMITY: &str = "TM0P";
pub const NORTHBRIDGE: &str = "TN0H";
pub const NORTHBRIDGE_DIODE: &str = "TN0D";
pub const NORTHBRIDGE_PROXIMITY: &str = "TN0P";
pub const THUNDERBOLT_0: &str = "TI0P";
pub const THUNDERBOLT_1: &str = "TI1P";
pub const WIRELESS_MODULE: &str = "TW0P";

/// CPU temperature key of the classic C API.
pub const SMC_KEY_CPU_TEMP: &str = CPU_0_DIODE;

/// Temperature sensors with a human readable label, in display order.
pub const TEMPERATURE_SENSORS: &[(&str, &str)] = &[
    ("Ambient air 0", AMBIENT_AIR_0),
    ("Ambient air 1", AMBIENT_AIR_1),
    ("CPU 0 diode", CPU_0_DIODE),
    ("CPU 0 heatsink", CPU_0_HEATSINK),
    ("CPU 0 proximity", CPU_0_PROXIMITY),
    ("Enclosure base 0", ENCLOSURE_BASE_0),
    ("Enclosure base 1", ENCLOSURE_BASE_1),
    ("Enclosure base 2", ENCLOSURE_BASE_2),
    ("Enclosure base 3", ENCLOSURE_BASE_3),
    ("GPU 0 diode", GPU_0_DIODE),
    ("GPU 0 heatsink", GPU_0_HEATSINK),
    ("GPU 0 proximity", GPU_0_PROXIMITY),
    ("Hard drive bay", HARD_DRIVE_BAY),
    ("Memory slot 0", MEMORY_SLOT_0),
    ("Memory slots proximity", MEMORY_SLOTS_PROXIMITY),
    ("Northbridge", NORTHBRIDGE),
    ("Northbridge diode", NORTHBRIDGE_DIODE),
    ("Northbridge proximity", NORTHBRIDGE_PROXIMITY),
    ("Thunderbolt 0", THUNDERBOLT_0),
    ("Thunderbolt 1", THUNDERBOLT_1),
    ("Wireless module", WIRELESS_MODULE),
];

// Fans (fpe2 on Intel Macs, flt on Apple silicon)
pub const FAN_0: &str = "F0Ac";
pub const FAN_1: &str = "F1Ac";
pub const FAN_2: &str = "F2Ac";
pub const NUM_FANS: &str = "FNum";

/// Fan keys are `F<index><suffix>`; indexes above 9 do not fit in 4 bytes.
fn fan_key(index: u8, suffix: &str) -> Result<SensorKey, KeyEncodingError> {
    SensorKey::new(&format!("F{index}{suffix}"))
}

/// Current speed of fan `index`.
pub fn fan_actual_speed(index: u8) -> Result<SensorKey, KeyEncodingError> {
    fan_key(index, "Ac")
}

pub fn fan_min_speed(index: u8) -> Result<SensorKey, KeyEncodingError> {
    fan_key(index, "Mn")
}

pub fn fan_max_speed(index: u8) -> Result<SensorKey, KeyEncodingError> {
    fan_key(index, "Mx")
}

pub fn fan_target_speed(index: u8) -> Result<SensorKey, KeyEncodingError> {
    fan_key(index, "Tg")
}
