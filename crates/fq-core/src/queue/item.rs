//! Line-level helpers for queue files
//!
//! Queue files hold one item per line. Lines are kept with their `\n`
//! terminator so rewrites reproduce the file byte for byte.

use crate::io::error::QueueError;
use std::fmt;
use std::str::FromStr;

/// How `add` interprets its element argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddMode {
    /// Element is the item text; appended as a single line
    #[default]
    Text,
    /// Element is a path whose entire contents are appended
    File,
}

impl AddMode {
    /// Legacy single-character mode flag: `t` is text, anything else is file
    pub fn from_flag(flag: char) -> Self {
        if flag == 't' {
            AddMode::Text
        } else {
            AddMode::File
        }
    }
}

impl fmt::Display for AddMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddMode::Text => write!(f, "text"),
            AddMode::File => write!(f, "file"),
        }
    }
}

impl FromStr for AddMode {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "t" | "text" => Ok(AddMode::Text),
            "f" | "file" => Ok(AddMode::File),
            other => Err(QueueError::InvalidItem {
                reason: format!("unknown add mode '{other}'"),
            }),
        }
    }
}

/// Split file content into lines, each keeping its terminator
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Line text without its `\n` (or `\r\n`) terminator
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Ensure a line ends with `\n`
pub fn with_terminator(line: &str) -> String {
    if line.ends_with('\n') {
        line.to_string()
    } else {
        format!("{line}\n")
    }
}

/// Index of the first line equal to `item`, ignoring terminators
pub fn find_line(lines: &[&str], item: &str) -> Option<usize> {
    let wanted = strip_terminator(item);
    lines.iter().position(|line| strip_terminator(line) == wanted)
}

/// Content with the line at `index` removed
pub fn without_line(lines: &[&str], index: usize) -> String {
    lines
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, line)| *line)
        .collect()
}

/// Validate a text item before it is appended as one line
pub fn validate_text_item(item: &str) -> Result<(), QueueError> {
    if strip_terminator(item).contains('\n') {
        return Err(QueueError::InvalidItem {
            reason: "text items must fit on a single line".to_string(),
        });
    }
    Ok(())
}
