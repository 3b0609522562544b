use crate::model::backup_run::ProgressUpdate;
use crate::model::error::process::ParseWarning;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Parses `<bytes> <percent>% <speed> ...`, where bytes may carry thousands separators.
pub fn parse_progress_line(line: &str) -> Result<ProgressUpdate, ParseWarning> {
    let unexpected = || ParseWarning::UnexpectedLine {
        line: line.trim().to_string(),
    };

    let mut tokens = line.split_whitespace();
    let (Some(bytes), Some(percent), Some(speed)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(unexpected());
    };

    let bytes = bytes
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| unexpected())?;
    let percent = percent
        .strip_suffix('%')
        .and_then(|percent| percent.parse::<u32>().ok())
        .filter(|percent| *percent <= 100)
        .ok_or_else(unexpected)?;

    Ok(ProgressUpdate {
        bytes,
        fraction: f64::from(percent) / 100.0,
        speed: speed.to_string(),
    })
}

/// Splits a byte stream into lines on `\n` and on `\r`, since rsync redraws its
/// progress line with carriage returns.
pub struct LineReader<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending: Vec::new(),
        }
    }

    /// The next line without its terminator, or `None` at end of stream.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let (consumed, complete) = {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    if self.pending.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(self.take_pending()));
                }
                match available.iter().position(|byte| *byte == b'\n' || *byte == b'\r') {
                    Some(index) => {
                        self.pending.extend_from_slice(&available[..index]);
                        (index + 1, true)
                    }
                    None => {
                        self.pending.extend_from_slice(available);
                        (available.len(), false)
                    }
                }
            };
            self.reader.consume(consumed);
            if complete {
                return Ok(Some(self.take_pending()));
            }
        }
    }

    fn take_pending(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}
