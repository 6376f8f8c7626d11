use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::str::FromStr;

use anyhow::Context;
use camino::Utf8PathBuf;
use ip_locate::Locator;
use tracing::debug;

use crate::error::{Error, Result};

/// A source that can be either a file or stdin.
#[derive(Default, Clone, Debug)]
pub enum FileOrStdin {
    /// Input from a file.
    File(Utf8PathBuf),
    /// Input from stdin.
    #[default]
    Stdin,
}

impl fmt::Display for FileOrStdin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrStdin::File(path) => write!(f, "{}", path),
            FileOrStdin::Stdin => write!(f, "<stdin>"),
        }
    }
}

impl FileOrStdin {
    /// Create a new FileOrStdin from a path.
    ///
    /// If the path is "-", stdin is used.
    pub fn from_path(path: Utf8PathBuf) -> Self {
        if path.as_str() == "-" {
            FileOrStdin::Stdin
        } else {
            FileOrStdin::File(path)
        }
    }

    /// Read the whole source into a string.
    pub fn read_to_string(&self) -> anyhow::Result<String> {
        let mut buf = String::new();
        match self {
            FileOrStdin::File(path) => {
                let mut file =
                    File::open(path).with_context(|| format!("failed to open file: {}", path))?;
                file.read_to_string(&mut buf)
                    .with_context(|| format!("failed to read file: {}", path))?;
            }
            FileOrStdin::Stdin => {
                io::stdin()
                    .lock()
                    .read_to_string(&mut buf)
                    .context("failed to read from stdin")?;
            }
        }
        Ok(buf)
    }
}

/// A 1-based `LINE:COLUMN` cursor position as editors display it.
///
/// Columns count bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    /// Resolve the address touching this cursor in `buffer`.
    pub fn locate<'a>(&self, locator: &Locator, buffer: &'a str) -> Option<&'a str> {
        locator.at_position(buffer, self.line.checked_sub(1)?, self.column.checked_sub(1)?)
    }
}

impl FromStr for Cursor {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || Error::InvalidCursor {
            input: s.to_string(),
        };
        let (line, column) = s.split_once(':').ok_or_else(invalid)?;
        let line: usize = line.trim().parse().map_err(|_| invalid())?;
        let column: usize = column.trim().parse().map_err(|_| invalid())?;
        if line == 0 || column == 0 {
            return Err(invalid());
        }
        Ok(Cursor { line, column })
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where a candidate string came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Argument,
    Selection,
    Cursor,
    Stdin,
    Prompt,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Argument => "argument",
            Source::Selection => "selection",
            Source::Cursor => "cursor",
            Source::Stdin => "stdin",
            Source::Prompt => "prompt",
        };
        f.write_str(name)
    }
}

/// Candidate texts in priority order.
#[derive(Clone, Debug, Default)]
pub struct Candidates {
    entries: Vec<(Source, Option<String>)>,
}

impl Candidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate with the lowest priority so far.
    pub fn push(&mut self, source: Source, text: Option<String>) -> &mut Self {
        self.entries.push((source, text));
        self
    }

    /// The candidate texts, highest priority first.
    pub fn texts(&self) -> impl Iterator<Item = Option<&str>> {
        self.entries.iter().map(|(_, text)| text.as_deref())
    }

    /// Return the first address found and the source it came from.
    pub fn locate<'a>(&'a self, locator: &Locator) -> Option<(Source, &'a str)> {
        let found = self.entries.iter().find_map(|(source, text)| {
            let text = text.as_deref()?;
            locator.extract(text).map(|ip| (*source, ip))
        });
        match found {
            Some((source, ip)) => debug!(%source, ip, "address located"),
            None => debug!(candidates = self.entries.len(), "no candidate held an address"),
        }
        found
    }
}

/// Write `prompt` to `writer` and read one answer line from `reader`.
///
/// Returns `None` on end of input or a blank answer.
pub fn prompt_for_address<R, W>(
    mut reader: R,
    mut writer: W,
    prompt: &str,
) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(writer, "{prompt}")?;
    writer.flush()?;

    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        return Ok(None);
    }
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}
