use log::debug;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// One file's line hits. `lines` is 1-based, strictly increasing and never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    pub path: PathBuf,
    pub lines: Vec<usize>,
}

impl FileMatch {
    pub fn count(&self) -> usize {
        self.lines.len()
    }
}

/// What happens to already collected hits when a file stops being readable
/// halfway through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadErrorPolicy {
    #[default]
    KeepPartial,
    Discard,
}

/// Substring test with an optional lowercase fold applied to both sides.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    needle: String,
    case_insensitive: bool,
}

impl LineMatcher {
    pub fn new(term: &str, case_insensitive: bool) -> Self {
        let needle = if case_insensitive {
            term.to_lowercase()
        } else {
            term.to_string()
        };
        Self {
            needle,
            case_insensitive,
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        if self.case_insensitive {
            line.to_lowercase().contains(&self.needle)
        } else {
            line.contains(&self.needle)
        }
    }
}

/// Splits a byte stream into lines the way text editors do: `\n`, `\r\n`
/// and a lone `\r` each end a line. Bytes can arrive in chunks of any size;
/// a `\r\n` pair split across two chunks still counts as one break.
#[derive(Debug, Default)]
pub struct LineSplitter {
    line: Vec<u8>,
    pending_cr: bool,
}

impl LineSplitter {
    /// Appends every line completed by `chunk` to `out`.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<Vec<u8>>) {
        let mut pos = 0;
        while pos < chunk.len() {
            if self.pending_cr {
                self.pending_cr = false;
                if chunk[pos] == b'\n' {
                    pos += 1;
                    continue;
                }
            }
            match chunk[pos..].iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    self.line.extend_from_slice(&chunk[pos..pos + i]);
                    self.pending_cr = chunk[pos + i] == b'\r';
                    out.push(std::mem::take(&mut self.line));
                    pos += i + 1;
                }
                None => {
                    self.line.extend_from_slice(&chunk[pos..]);
                    pos = chunk.len();
                }
            }
        }
    }

    /// The unterminated last line, if there is one.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.line.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.line))
        }
    }
}

/// Reads `reader` to the end and returns the numbers of the matching lines.
/// `None` means no line matched, or the read failed under
/// [`ReadErrorPolicy::Discard`].
pub async fn scan_lines<R>(
    mut reader: R,
    matcher: &LineMatcher,
    policy: ReadErrorPolicy,
    origin: &Path,
) -> Option<Vec<usize>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line_number = 0;
    let mut hits = Vec::new();

    if let Err(e) = collect_hits(&mut reader, matcher, &mut line_number, &mut hits).await {
        debug!(
            "Stopped reading {} after line {}: {}",
            origin.display(),
            line_number,
            e
        );
        if policy == ReadErrorPolicy::Discard {
            return None;
        }
    }

    if hits.is_empty() { None } else { Some(hits) }
}

async fn collect_hits<R>(
    reader: &mut R,
    matcher: &LineMatcher,
    line_number: &mut usize,
    hits: &mut Vec<usize>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut splitter = LineSplitter::default();
    let mut completed = Vec::new();

    loop {
        let chunk = reader.fill_buf().await?;
        let at_eof = chunk.is_empty();
        let consumed = chunk.len();
        if at_eof {
            completed.extend(splitter.finish());
        } else {
            splitter.feed(chunk, &mut completed);
            reader.consume(consumed);
        }

        for bytes in completed.drain(..) {
            let line = String::from_utf8(bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            *line_number += 1;
            if matcher.is_match(&line) {
                hits.push(*line_number);
            }
        }

        if at_eof {
            return Ok(());
        }
    }
}

/// Streams one file and collects its matching lines.
pub async fn search_file(
    path: &Path,
    matcher: &LineMatcher,
    policy: ReadErrorPolicy,
) -> Option<FileMatch> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            debug!("Failed to open {}: {}", path.display(), e);
            return None;
        }
    };

    scan_lines(BufReader::new(file), matcher, policy, path)
        .await
        .map(|lines| FileMatch {
            path: path.to_path_buf(),
            lines,
        })
}
