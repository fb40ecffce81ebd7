//! Plain-text float vectors
//!
//! A fixture is a list of whitespace-separated floats with no header. The
//! writer emits one value per line with ten decimals.

use hwt_core::{HwtError, HwtResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn read_fixture<R: Read>(mut reader: R) -> HwtResult<Vec<f32>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    text.split_whitespace()
        .enumerate()
        .map(|(index, token)| {
            token.parse::<f32>().map_err(|_| {
                HwtError::InvalidFixture(format!("value {} ({:?}) is not a number", index, token))
            })
        })
        .collect()
}

pub fn write_fixture<W: Write>(mut writer: W, values: &[f32]) -> HwtResult<()> {
    for value in values {
        writeln!(writer, "{:.10}", value)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_fixture_file<P: AsRef<Path>>(path: P) -> HwtResult<Vec<f32>> {
    read_fixture(BufReader::new(File::open(path)?))
}

pub fn write_fixture_file<P: AsRef<Path>>(path: P, values: &[f32]) -> HwtResult<()> {
    write_fixture(BufWriter::new(File::create(path)?), values)
}
