// Byte sources and sinks: trace files on disk, sibling channel discovery
// and CSV export

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{FormatError, Result};

/// Read a whole trace file into memory.
pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let bytes = fs::read(path.as_ref())?;
    debug!("Read {} bytes from {}", bytes.len(), path.as_ref().display());
    Ok(bytes)
}

/// List the channel files recorded alongside `path`.
///
/// LeCroy scopes name traces `C<n><core>`, e.g. `C1Trace00000.trc`. Every
/// file in the same directory whose name starts with `C` and ends with the
/// shared `<core>` is returned, sorted by name.
pub fn discover_channels<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FormatError::InvalidInput(format!("{} has no file name", path.display())))?;

    let core = match name.get(2..) {
        Some(core) if name.starts_with('C') && !core.is_empty() => core,
        _ => {
            return Err(FormatError::InvalidInput(format!(
                "{} is not a C<n><name> channel file",
                name
            )))
        }
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with('C') && n.len() > core.len() && n.ends_with(core))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();

    debug!("Found {} channel files for {}", files.len(), name);
    Ok(files)
}

/// Write a single trace as `Time,Voltage` rows.
pub fn write_csv<P: AsRef<Path>>(output_file: P, time: &[f64], voltage: &[f64]) -> Result<()> {
    let file = File::create(output_file)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "Time,Voltage")?;
    for (t, v) in time.iter().zip(voltage) {
        writeln!(writer, "{},{}", t, v)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write several channels as columns against a shared time axis.
pub fn write_channel_csv<P: AsRef<Path>>(
    output_file: P,
    time: &[f64],
    voltages: &[Vec<f64>],
) -> Result<()> {
    if let Some((i, channel)) = voltages
        .iter()
        .enumerate()
        .find(|(_, channel)| channel.len() != time.len())
    {
        return Err(FormatError::InvalidInput(format!(
            "channel {} has {} points but the time axis has {}",
            i + 1,
            channel.len(),
            time.len()
        )));
    }

    let file = File::create(output_file)?;
    let mut writer = BufWriter::new(file);

    write!(writer, "Time")?;
    for i in 0..voltages.len() {
        write!(writer, ",C{}", i + 1)?;
    }
    writeln!(writer)?;

    for (row, t) in time.iter().enumerate() {
        write!(writer, "{}", t)?;
        for channel in voltages {
            write!(writer, ",{}", channel[row])?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
