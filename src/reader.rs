use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

/// Where receiver lines are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    Stdin,
    /// Serial port opened at `baud`, 8N1.
    Serial { path: PathBuf, baud: u32 },
    /// Capture file replayed as-is.
    File(PathBuf),
}

impl LineSource {
    /// `-` is stdin, paths under `/dev/` are serial ports, anything else is
    /// a capture file.
    pub fn new(input: &str, baud: u32) -> Self {
        match input.trim() {
            "-" => LineSource::Stdin,
            path if Path::new(path).starts_with("/dev") => LineSource::Serial {
                path: PathBuf::from(path),
                baud,
            },
            path => LineSource::File(PathBuf::from(path)),
        }
    }
}

/// Read lines from `source` into `tx` until the source ends or the receiving
/// side is dropped.
pub async fn read_lines(source: LineSource, tx: mpsc::Sender<String>) -> Result<()> {
    match source {
        LineSource::Stdin => {
            info!("Reading receiver lines from stdin");
            forward(BufReader::new(io::stdin()), tx).await
        }
        LineSource::Serial { path, baud } => {
            let port = tokio_serial::new(path.to_string_lossy(), baud)
                .data_bits(tokio_serial::DataBits::Eight)
                .stop_bits(tokio_serial::StopBits::One)
                .parity(tokio_serial::Parity::None)
                .open_native_async()
                .with_context(|| format!("Failed to open serial port {}", path.display()))?;
            info!(path = %path.display(), baud, "Reading receiver lines");
            forward(BufReader::new(port), tx).await
        }
        LineSource::File(path) => {
            let file = File::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            info!(path = %path.display(), "Replaying receiver lines");
            forward(BufReader::new(file), tx).await
        }
    }
}

async fn forward<R: AsyncBufRead + Unpin>(reader: R, tx: mpsc::Sender<String>) -> Result<()> {
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read line")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(line = %line, "Received");

        if tx.send(line.to_owned()).await.is_err() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_selects_the_source() {
        assert_eq!(LineSource::new("-", 57600), LineSource::Stdin);
        assert_eq!(
            LineSource::new("/dev/ttyUSB0", 57600),
            LineSource::Serial {
                path: PathBuf::from("/dev/ttyUSB0"),
                baud: 57600,
            }
        );
        assert_eq!(
            LineSource::new("captures/rf12.log", 57600),
            LineSource::File(PathBuf::from("captures/rf12.log"))
        );
        // "/devices" is not under /dev
        assert_eq!(
            LineSource::new("/devices/rf12.log", 57600),
            LineSource::File(PathBuf::from("/devices/rf12.log"))
        );
    }

    #[tokio::test]
    async fn forward_trims_and_skips_blank_lines() {
        let input: &[u8] = b"\r\n[RF12demo.12] A i1 g212 @ 868 MHz\r\n\nOK 2 1 213 40 57 3\r\n";
        let (tx, mut rx) = mpsc::channel(8);

        forward(input, tx).await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("[RF12demo.12] A i1 g212 @ 868 MHz"));
        assert_eq!(rx.recv().await.as_deref(), Some("OK 2 1 213 40 57 3"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn forward_stops_when_receiver_is_gone() {
        let input: &[u8] = b"OK 2 1 213 40 57 3\nOK 3 3 18 113 49\n";
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        assert!(forward(input, tx).await.is_ok());
    }

    #[tokio::test]
    async fn missing_capture_file_is_an_error() {
        let (tx, _rx) = mpsc::channel(1);
        let source = LineSource::File(PathBuf::from("/nonexistent/rf12.log"));

        let err = read_lines(source, tx).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rf12.log"));
    }

    #[tokio::test]
    async fn missing_serial_port_is_an_error() {
        let (tx, _rx) = mpsc::channel(1);
        let source = LineSource::new("/dev/ttyJEEGO404", 57600);

        let err = read_lines(source, tx).await.unwrap_err();
        assert!(err.to_string().contains("/dev/ttyJEEGO404"));
    }
}
