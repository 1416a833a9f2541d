//! The print backend selector
//!
//! An [EncodedStream] is handed to exactly one [PrintSink]: either the raw
//! printer device or a file in the output directory. The sink performs a
//! single scoped write (open, write all, flush, close on every path) and
//! never retries, so a failed attempt cannot re-fire a physical print.
//! Concurrent renders racing on one device must be serialized by the
//! caller, e.g. with a single-writer queue; this layer does not do that.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::info;

/// A fully encoded output, produced before any I/O happens
pub struct EncodedStream {
    /// Deterministic output file name (`ticket-<id>.<ext>`)
    pub name: String,
    /// The encoded bytes
    pub bytes: Vec<u8>,
}

/// The outcome of one print attempt
#[derive(Debug)]
pub struct PrintResult {
    /// Which backend consumed the stream
    pub backend: &'static str,
    /// Where the bytes went
    pub path: PathBuf,
}

/// A sink that consumes one encoded stream
pub trait PrintSink {
    /// Write the stream; called exactly once per render
    fn consume(&self, stream: EncodedStream) -> io::Result<PrintResult>;
}

/// Writes raw bytes to a character/USB printer device
pub struct DeviceSink {
    path: PathBuf,
}

impl DeviceSink {
    /// A sink for the given device path
    pub fn new(path: PathBuf) -> Self {
        DeviceSink { path }
    }
}

impl PrintSink for DeviceSink {
    fn consume(&self, stream: EncodedStream) -> io::Result<PrintResult> {
        info!("Writing {} bytes to '{}'", stream.bytes.len(), self.path.display());
        let mut device = OpenOptions::new().write(true).open(&self.path)?;
        device.write_all(&stream.bytes)?;
        device.flush()?;
        Ok(PrintResult {
            backend: "device",
            path: self.path.clone(),
        })
    }
}

/// Writes the stream as a file into the output directory
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// A sink for the given output directory
    pub fn new(dir: PathBuf) -> Self {
        FileSink { dir }
    }
}

impl PrintSink for FileSink {
    fn consume(&self, stream: EncodedStream) -> io::Result<PrintResult> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&stream.name);
        let mut file = File::create(&path)?;
        file.write_all(&stream.bytes)?;
        file.flush()?;
        info!("Wrote '{}'", path.display());
        Ok(PrintResult {
            backend: "file",
            path,
        })
    }
}

/// Pick the sink once, from configuration
///
/// A configured device path routes the stream to the printer; everything
/// else lands in the output directory.
pub fn select(device: Option<&Path>, out_dir: &Path, wants_device: bool) -> Box<dyn PrintSink> {
    match device {
        Some(path) if wants_device => Box::new(DeviceSink::new(path.to_path_buf())),
        _ => Box::new(FileSink::new(out_dir.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_writes_named_file() {
        let dir = std::env::temp_dir().join("boltpress-test-sink");
        let _ = fs::remove_dir_all(&dir);
        let sink = FileSink::new(dir.clone());
        let res = sink
            .consume(EncodedStream {
                name: "ticket-test.bin".to_string(),
                bytes: vec![1, 2, 3],
            })
            .unwrap();
        assert_eq!("file", res.backend);
        assert_eq!(vec![1, 2, 3], fs::read(&res.path).unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_device_is_surfaced() {
        let sink = DeviceSink::new(PathBuf::from("/nonexistent/printer0"));
        let err = sink
            .consume(EncodedStream {
                name: String::new(),
                bytes: vec![0],
            })
            .unwrap_err();
        assert_eq!(io::ErrorKind::NotFound, err.kind());
    }

    #[test]
    fn test_selection_is_config_driven() {
        let out = PathBuf::from("out");
        let dev = PathBuf::from("/nonexistent/usb/lp0");
        let sink = select(Some(&dev), &out, true);
        let err = sink
            .consume(EncodedStream {
                name: "x".into(),
                bytes: vec![],
            })
            .unwrap_err();
        // device sink: open fails, nothing is created
        assert!(err.kind() == io::ErrorKind::NotFound || err.kind() == io::ErrorKind::PermissionDenied);
    }
}
