//! Splits an optional leading YAML front-matter block off a template
//! source. A document carries front matter iff its very first line is a
//! `---` fence; the block runs to the next fence line, and everything after
//! that line is the template body.

use std::fmt;

use crate::context::{self, Context};

const FENCE: &str = "---";

/// A template source split into its optional front matter and its body.
/// Both borrow from the original input.
pub struct Document<'a> {
    /// The raw front-matter block, without either fence line.
    pub matter: Option<&'a str>,

    /// The template body: the input with the front-matter block (both
    /// fence lines included) removed, or the whole input when there is no
    /// front matter.
    pub body: &'a str,
}

/// A fence is a line reading `---`, allowing trailing whitespace. Leading
/// whitespace disqualifies it.
fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

/// Splits `input` into front matter and body. Input that doesn't open with
/// a fence line comes back unchanged with no matter; an opening fence
/// without a closing one is an error.
pub fn split(input: &str) -> Result<Document<'_>> {
    let (first, rest) = match input.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (input, ""),
    };
    if !is_fence(first) {
        return Ok(Document {
            matter: None,
            body: input,
        });
    }

    // `rest` begins immediately after the opening fence line. Scan it a
    // line at a time for the closing fence.
    let mut offset = 0;
    loop {
        let line_end = rest[offset..].find('\n').map(|i| offset + i);
        let line = match line_end {
            Some(end) => &rest[offset..end],
            None => &rest[offset..],
        };
        if is_fence(line) {
            return Ok(Document {
                matter: Some(&rest[..offset]),
                body: match line_end {
                    Some(end) => &rest[end + 1..],
                    None => "",
                },
            });
        }
        match line_end {
            Some(end) => offset = end + 1,
            None => return Err(Error::MissingClosingFence),
        }
    }
}

/// Parses a front-matter block into a [`Context`] with the same parser the
/// global context document uses.
pub fn parse(matter: &str) -> Result<Context> {
    match context::parse_document(matter) {
        Ok(Some(context)) => Ok(context),
        Ok(None) => Err(Error::NotAMapping),
        Err(err) => Err(Error::Yaml(err)),
    }
}

/// Represents the result of a front-matter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error splitting or parsing front matter.
#[derive(Debug)]
pub enum Error {
    /// Returned when an opening fence is found but no closing fence
    /// follows it.
    MissingClosingFence,

    /// Returned when the front-matter block is not valid YAML.
    Yaml(serde_yaml::Error),

    /// Returned when the front-matter document is not a mapping.
    NotAMapping,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingClosingFence => {
                write!(f, "Missing closing `---` fence")
            }
            Error::Yaml(err) => write!(f, "Parsing front matter: {}", err),
            Error::NotAMapping => {
                write!(f, "Front matter must contain a mapping")
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingClosingFence => None,
            Error::Yaml(err) => Some(err),
            Error::NotAMapping => None,
        }
    }
}
