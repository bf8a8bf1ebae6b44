use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[inline]
pub(crate) fn generate_record_id_str(id: u64) -> String {
    let mut buffer = itoa::Buffer::new();
    let formatted = buffer.format(id);
    formatted.to_owned()
}

// ties go to the even digit: 3.125 -> 3.12
#[inline]
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
