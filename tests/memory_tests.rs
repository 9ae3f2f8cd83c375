// Property tests for the simulated memory

use brackit::memory::encoding::{encode, width_of};
use brackit::memory::ram::Ram;
use brackit::memory::value::Value;
use brackit::memory::MemoryError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const MAX_MAGNITUDE: i32 = i32::MAX;

proptest! {
    #[test]
    fn integers_round_trip(n in -MAX_MAGNITUDE..=MAX_MAGNITUDE) {
        let mut ram = Ram::new(64);
        ram.write("n", &Value::Integer(n)).unwrap();
        prop_assert_eq!(ram.read("n").unwrap(), Value::Integer(n));
        prop_assert_eq!(ram.bucket("n").unwrap().width, 32);
    }

    #[test]
    fn booleans_round_trip(b in any::<bool>()) {
        let mut ram = Ram::new(8);
        ram.write("b", &Value::Boolean(b)).unwrap();
        prop_assert_eq!(ram.read("b").unwrap(), Value::Boolean(b));
        prop_assert_eq!(ram.bucket("b").unwrap().width, 1);
    }

    #[test]
    fn words_round_trip(w in "[ -~]{0,24}") {
        let mut ram = Ram::new(1024);
        let value = Value::Word(w);
        ram.write("w", &value).unwrap();
        prop_assert_eq!(ram.bucket("w").unwrap().width, width_of(&value));
        prop_assert_eq!(ram.read("w").unwrap(), value);
    }

    #[test]
    fn rewrites_never_disturb_neighbours(
        first in "[a-z]{1,12}",
        second in "[a-z]{1,12}",
        n in -MAX_MAGNITUDE..=MAX_MAGNITUDE,
    ) {
        let mut ram = Ram::new(2048);
        ram.write("w", &Value::Word(first)).unwrap();
        ram.write("n", &Value::Integer(n)).unwrap();
        ram.write("w", &Value::Word(second.clone())).unwrap();
        prop_assert_eq!(ram.read("n").unwrap(), Value::Integer(n));
        prop_assert_eq!(ram.read("w").unwrap(), Value::Word(second));
    }

    #[test]
    fn compaction_preserves_values(values in prop::collection::vec(any::<i16>(), 1..12)) {
        let mut ram = Ram::new(32 * 24);
        for (i, v) in values.iter().enumerate() {
            ram.write(&format!("keep{}", i), &Value::Integer(i32::from(*v))).unwrap();
            ram.write(&format!("drop{}", i), &Value::Integer(0)).unwrap();
        }
        for i in 0..values.len() {
            ram.delete(&format!("drop{}", i)).unwrap();
        }
        ram.compact();
        prop_assert_eq!(ram.high_water(), 32 * values.len());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(
                ram.read(&format!("keep{}", i)).unwrap(),
                Value::Integer(i32::from(*v))
            );
        }
    }
}

#[test]
fn test_minimum_integer_is_rejected() {
    assert!(matches!(
        encode(&Value::Integer(i32::MIN)),
        Err(MemoryError::InvalidEncoding { .. })
    ));
}

#[test]
fn test_exhaustion_compacts_before_failing() {
    let mut ram = Ram::new(96);
    ram.write("a", &Value::Integer(1)).unwrap();
    ram.write("b", &Value::Integer(2)).unwrap();
    ram.write("c", &Value::Integer(3)).unwrap();
    ram.delete("a").unwrap();

    // The hole at the bottom is only reachable through compaction
    ram.write("d", &Value::Integer(4)).unwrap();
    assert_eq!(ram.compactions(), 1);
    assert_eq!(ram.bucket("b").unwrap().start, 0);
    assert_eq!(ram.bucket("d").unwrap().start, 64);

    let err = ram.write("e", &Value::Boolean(true)).unwrap_err();
    assert_eq!(
        err,
        MemoryError::OutOfMemory {
            requested: 1,
            capacity: 96
        }
    );
    assert_eq!(ram.compactions(), 2);
}

#[test]
fn test_alias_shares_storage_until_last_name_goes() {
    let mut ram = Ram::new(16);
    ram.write("flag", &Value::Boolean(false)).unwrap();
    ram.alias("-2.b", "flag").unwrap();
    ram.write("-2.b", &Value::Boolean(true)).unwrap();
    assert_eq!(ram.read("flag").unwrap(), Value::Boolean(true));

    ram.delete("-2.b").unwrap();
    assert_eq!(ram.read("flag").unwrap(), Value::Boolean(true));
    assert_eq!(ram.high_water(), 1);

    ram.delete("flag").unwrap();
    assert_eq!(ram.high_water(), 0);
}
