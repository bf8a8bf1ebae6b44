use crate::structs::{Dataset, QuasiIdentifierSet, Record};
use proptest::prelude::*;

pub(crate) const COLUMNS: [&str; 3] = ["age", "zip", "gender"];

pub(crate) type Row = (i32, i32, Option<i32>);

// small domains so groups of every size show up
pub(crate) fn rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((30..33i32, 0..3i32, prop::option::of(0..2i32)), 0..40)
}

pub(crate) fn indexed_rows() -> impl Strategy<Value = Vec<(usize, Row)>> {
    rows().prop_map(|rows| rows.into_iter().enumerate().collect())
}

pub(crate) fn dataset(rows: &[(usize, Row)]) -> Dataset {
    let records = rows
        .iter()
        .map(|&(i, (age, zip, gender))| {
            Record::new(i as u64)
                .with("age", age)
                .with("zip", format!("0213{zip}"))
                .with("gender", gender)
        })
        .collect();
    Dataset::new(COLUMNS.iter().map(|c| c.to_string()).collect(), records)
        .expect("generated ids are distinct")
}

pub(crate) fn prefix(len: usize) -> QuasiIdentifierSet {
    QuasiIdentifierSet::new(COLUMNS[..len].iter().copied()).expect("non-empty prefix")
}
