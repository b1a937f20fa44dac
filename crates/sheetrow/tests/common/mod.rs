#![allow(dead_code)]

use sheetrow::Record;
use sheetrow::bigdecimal::BigDecimal;
use sheetrow::chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sheetrow::num_bigint::BigInt;

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Product {
    pub id: i64,
    #[column(name = "Product Name")]
    pub name: String,
    #[column(default = "N/A")]
    pub category: String,
    #[column(name = "Unit Price", default = "0.5")]
    pub price: f64,
    #[column]
    pub stock: i32,
    pub amount: Option<BigDecimal>,
    #[datetime(pattern = "yyyy/MM/dd")]
    pub released: Option<NaiveDate>,
    pub active: bool,
    #[record(ignore)]
    pub notes: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub label: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Toy {
    pub name: String,
    #[column(name = "Price")]
    pub price: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
#[record(policy = "includes_inherited")]
pub struct EducationToy {
    #[record(extends)]
    pub toy: Toy,
    pub name: String,
    pub min_age: Option<i16>,
    #[datetime(pattern = "HH:mm")]
    pub class_start: Option<NaiveTime>,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
#[record(policy = "includes_inherited")]
pub struct AdvancedToy {
    #[record(extends)]
    pub base: EducationToy,
    pub level: char,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct AllTypes {
    pub text: String,
    pub byte: i8,
    pub short: i16,
    pub int: i32,
    pub long: i64,
    pub float: f32,
    pub double: f64,
    pub flag: bool,
    pub letter: char,
    pub big_int: Option<BigInt>,
    pub big_dec: Option<BigDecimal>,
    pub day: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub stamp: Option<NaiveDateTime>,
    #[datetime(pattern = "dd MMM yyyy HH:mm:ss.SSS")]
    pub logged: Option<NaiveDateTime>,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
