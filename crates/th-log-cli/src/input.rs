//! Reading log lines from a file or stdin

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use th_log_parser::ArtifactBuilder;

/// Open the log file, or stdin when no path is given
pub fn open(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Feed every line of `reader` to the builder
///
/// Logs are not guaranteed to be valid UTF-8; invalid sequences are
/// replaced rather than aborting the parse.
pub fn feed<R: BufRead>(mut reader: R, builder: &mut ArtifactBuilder) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .context("Failed to read log")?;
        if read == 0 {
            break;
        }

        let line_number = builder.line_number();
        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        builder
            .process_line(&line)
            .with_context(|| format!("Failed to parse log line {}", line_number))?;
    }

    log::info!("Processed {} lines", builder.line_number());
    Ok(())
}
