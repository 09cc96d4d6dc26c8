//! Property-based tests for the codec layer.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use smc_sensors::{
    error::KeyEncodingError,
    key::{self, SensorKey},
    structs::{KeyInfo, PARAM_STRUCT_LEN, SmcPLimitData, SmcParams, SmcVersion},
    value::{TemperatureUnit, convert_temperature, decode_fixed_point},
};

fn ascii_key() -> impl Strategy<Value = String> {
    "[ -~]{4}"
}

fn params_strategy() -> impl Strategy<Value = SmcParams> {
    (
        any::<u32>(),
        any::<[u8; 4]>(),
        any::<(u16, u16, u16)>(),
        any::<(u32, u32, u32)>(),
        any::<(u32, u32, u8)>(),
        any::<(u8, u8, u8, u32)>(),
        any::<[u8; 32]>(),
    )
        .prop_map(
            |(key, vers, (release, version, length), plimits, info, tail, bytes)| SmcParams {
                key,
                vers: SmcVersion {
                    major: vers[0],
                    minor: vers[1],
                    build: vers[2],
                    reserved: vers[3],
                    release,
                },
                plimit_data: SmcPLimitData {
                    version,
                    length,
                    cpu_plimit: plimits.0,
                    gpu_plimit: plimits.1,
                    mem_plimit: plimits.2,
                },
                key_info: KeyInfo {
                    data_size: info.0,
                    data_type: info.1,
                    data_attributes: info.2,
                },
                result: tail.0,
                status: tail.1,
                data8: tail.2,
                data32: tail.3,
                bytes,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_key_decode_inverts_encode(k in ascii_key()) {
        let packed = key::encode(&k).unwrap();
        prop_assert_eq!(key::decode(packed), k.clone());
        prop_assert_eq!(SensorKey::new(&k).unwrap().to_string(), k);
    }

    #[test]
    fn prop_key_length_must_be_four(k in "[A-Za-z0-9]{0,12}") {
        let result = key::encode(&k);
        if k.len() == 4 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(KeyEncodingError::InvalidLength { len: k.len() }));
        }
    }

    #[test]
    fn prop_envelope_survives_encoding(params in params_strategy()) {
        let buf = params.encode();
        prop_assert_eq!(buf.len(), PARAM_STRUCT_LEN);
        prop_assert_eq!(SmcParams::decode(&buf), params);
        // padding stays zero
        prop_assert_eq!(&buf[10..12], &[0u8, 0][..]);
        prop_assert_eq!(&buf[37..40], &[0u8, 0, 0][..]);
        prop_assert_eq!(buf[43], 0);
    }

    #[test]
    fn prop_sp78_is_first_byte(b0 in any::<u8>(), rest in proptest::collection::vec(any::<u8>(), 0..31)) {
        let mut buf = vec![b0];
        buf.extend(rest);
        prop_assert_eq!(decode_fixed_point(&buf, "sp78"), Some(f64::from(b0)));
    }

    #[test]
    fn prop_fpe2_formula(b0 in any::<u8>(), b1 in any::<u8>()) {
        let expected = (u32::from(b0) << 6) + (u32::from(b1) << 2);
        prop_assert_eq!(decode_fixed_point(&[b0, b1], "fpe2"), Some(f64::from(expected)));
    }

    #[test]
    fn prop_unknown_tags_decline(tag in "[a-z0-9 ]{4}", buf in proptest::collection::vec(any::<u8>(), 0..32)) {
        prop_assume!(tag != "sp78" && tag != "fpe2");
        prop_assert_eq!(decode_fixed_point(&buf, &tag), None);
    }

    #[test]
    fn prop_conversions_invert(c in -100.0f64..200.0) {
        let f = convert_temperature(c, TemperatureUnit::Fahrenheit);
        let k = convert_temperature(c, TemperatureUnit::Kelvin);
        prop_assert!(((f - 32.0) / 1.8 - c).abs() < 1e-9);
        prop_assert!((k - 273.15 - c).abs() < 1e-9);
        prop_assert_eq!(convert_temperature(c, TemperatureUnit::Celsius), c);
    }
}
