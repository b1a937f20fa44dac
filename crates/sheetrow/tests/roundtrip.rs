mod common;

use proptest::prelude::*;
use sheetrow::bigdecimal::BigDecimal;
use sheetrow::chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sheetrow::num_bigint::BigInt;
use sheetrow::{FieldDef, FieldDescriptor, FieldValue, Record, coerce};

use common::AllTypes;

fn finite_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("finite", |v| v.is_finite())
}

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

fn naive_date() -> impl Strategy<Value = NaiveDate> {
    (1000i32..=9999, 1u32..=365).prop_map(|(y, ordinal)| {
        NaiveDate::from_yo_opt(y, ordinal).expect("ordinal within every year")
    })
}

fn naive_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..86_400, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
        NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).expect("in range")
    })
}

fn millis_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..86_400, 0u32..1_000).prop_map(|(secs, millis)| {
        NaiveTime::from_num_seconds_from_midnight_opt(secs, millis * 1_000_000).expect("in range")
    })
}

prop_compose! {
    fn scalars()(
        text in "[A-Za-z0-9 ,.-]{0,24}",
        byte in any::<i8>(),
        short in any::<i16>(),
        int in any::<i32>(),
        long in any::<i64>(),
        float in finite_f32(),
        double in finite_f64(),
        flag in any::<bool>(),
        letter in any::<char>(),
    ) -> AllTypes {
        AllTypes {
            text,
            byte,
            short,
            int,
            long,
            float,
            double,
            flag,
            letter,
            ..AllTypes::default()
        }
    }
}

prop_compose! {
    fn all_types()(
        scalars in scalars(),
        big_int in proptest::option::of(any::<i128>()),
        big_dec in proptest::option::of((any::<i64>(), 0i64..30)),
        day in proptest::option::of(naive_date()),
        time in proptest::option::of(naive_time()),
        stamp in proptest::option::of((naive_date(), naive_time())),
        logged in proptest::option::of((naive_date(), millis_time())),
    ) -> AllTypes {
        AllTypes {
            big_int: big_int.map(BigInt::from),
            big_dec: big_dec.map(|(digits, scale)| BigDecimal::new(BigInt::from(digits), scale)),
            day,
            time,
            stamp: stamp.map(|(d, t)| NaiveDateTime::new(d, t)),
            logged: logged.map(|(d, t)| NaiveDateTime::new(d, t)),
            ..scalars
        }
    }
}

proptest! {
    #[test]
    fn every_slot_type_round_trips(record in all_types()) {
        let row = record.to_row().unwrap();
        let back = AllTypes::from_row(&row).unwrap();
        prop_assert_eq!(back, record);
    }

    #[test]
    fn decimal_text_is_preserved(literal in "-?[1-9][0-9]{0,45}\\.[0-9]{1,20}") {
        let field = FieldDescriptor::standalone(FieldDef::of::<BigDecimal>("amount"));
        let value = coerce::parse(Some(literal.as_str()), &field).unwrap();
        let text = coerce::stringify(value.as_ref(), &field).unwrap();
        prop_assert_eq!(text.as_deref(), Some(literal.as_str()));
    }

    #[test]
    fn only_true_reads_as_true(text in "\\PC{1,12}") {
        let field = FieldDescriptor::standalone(FieldDef::of::<bool>("flag"));
        let value = coerce::parse(Some(text.as_str()), &field).unwrap();
        let expected = text.eq_ignore_ascii_case("true");
        prop_assert_eq!(value, Some(FieldValue::Boolean(expected)));
    }

    #[test]
    fn explicit_default_matches_cell_text(default in "-?[0-9]{1,9}") {
        let field = FieldDescriptor::standalone(
            FieldDef::of::<i64>("n").with_column(None, Some(default.as_str())),
        );
        prop_assert_eq!(
            coerce::parse(None, &field).unwrap(),
            coerce::parse(Some(default.as_str()), &field).unwrap()
        );
    }
}
