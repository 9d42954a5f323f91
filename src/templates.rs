//! Defines the [`TemplateSet`] namespace type and the logic for populating
//! it from the partial files in the template tree. A partial is any file
//! whose name starts with [`PARTIAL_MARKER`] and ends with
//! [`TEMPLATE_EXTENSION`]; its registration name is the file name with both
//! stripped. All partials share one flat namespace regardless of the
//! directory they live in, so any partial can invoke any other with
//! `{{template "name" .}}`.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use gtmpl::Template;
use tracing::info;
use walkdir::WalkDir;

use crate::context::Context;
use crate::value;

/// The reserved name under which each renderable file's own body is
/// registered. The execution engine needs an explicit entry point once
/// multiple named templates share a namespace.
pub const ROOT_TEMPLATE: &str = "<root>";

/// Files ending with this extension are templates.
pub const TEMPLATE_EXTENSION: &str = ".tmpl";

/// Template files beginning with this marker are partials.
pub const PARTIAL_MARKER: char = '_';

/// A named collection of template sources sharing one lookup scope. The
/// base set is built once from the partial files; every renderable file
/// takes a `clone()`--an independent copy of the entry table--and registers
/// its own body into that, so the base is never mutated after construction.
#[derive(Clone, Default)]
pub struct TemplateSet {
    sources: HashMap<String, String>,
}

impl TemplateSet {
    /// Registers `source` under `name`, validating its syntax. Registering
    /// a name twice is an error; so is a source the engine can't parse.
    pub fn insert(&mut self, name: &str, source: &str) -> Result<()> {
        if self.sources.contains_key(name) {
            return Err(Error::Duplicate(name.to_owned()));
        }
        let mut probe = Template::default();
        probe.parse(source).map_err(|err| Error::Parse {
            name: name.to_owned(),
            err,
        })?;
        self.sources.insert(name.to_owned(), source.to_owned());
        Ok(())
    }

    /// Reports whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Compiles the whole set into a single engine template and executes
    /// the entry named `entry` against `context`, streaming the output to
    /// `writer`.
    pub fn execute<W: io::Write>(
        &self,
        entry: &str,
        context: &Context,
        writer: &mut W,
    ) -> Result<()> {
        if !self.contains(entry) {
            return Err(Error::Undefined(entry.to_owned()));
        }

        let mut template = Template::default();
        template
            .parse(self.combined_source(entry).as_str())
            .map_err(|err| Error::Parse {
                name: entry.to_owned(),
                err,
            })?;

        let context = gtmpl::Context::from(value::from_mapping(context))
            .map_err(Error::Context)?;
        template.execute(writer, &context).map_err(Error::Execute)
    }

    // Every entry becomes a `{{define}}` block so the engine sees one
    // namespace; the synthesized top-level text dispatches to `entry`.
    fn combined_source(&self, entry: &str) -> String {
        let mut combined = String::new();
        for (name, source) in &self.sources {
            combined.push_str(&format!("{{{{define \"{}\"}}}}", name));
            combined.push_str(source);
            combined.push_str("{{end}}");
        }
        combined.push_str(&format!("{{{{template \"{}\" .}}}}", entry));
        combined
    }
}

/// Walks `root` and registers every partial file found under it into a new
/// base [`TemplateSet`]. Traversal order is unspecified; registration is
/// order-independent because each partial is self-contained and duplicate
/// detection is symmetric.
pub fn load_partials(root: &Path) -> Result<TemplateSet> {
    let mut set = TemplateSet::default();
    for result in WalkDir::new(root) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        let name = match partial_name(&file_name) {
            Some(name) => name,
            None => continue,
        };

        info!("Loading partial template {}", entry.path().display());
        let source =
            std::fs::read_to_string(entry.path()).map_err(|err| {
                Error::Read {
                    path: entry.path().to_owned(),
                    err,
                }
            })?;
        set.insert(&name, &source).map_err(|err| {
            Error::Annotated(
                format!("loading partial `{}`", entry.path().display()),
                Box::new(err),
            )
        })?;
    }
    Ok(set)
}

/// Derives a partial's registration name from its file name, or `None` for
/// file names that don't mark a partial.
fn partial_name(file_name: &str) -> Option<String> {
    file_name
        .strip_prefix(PARTIAL_MARKER)?
        .strip_suffix(TEMPLATE_EXTENSION)
        .map(str::to_owned)
}

/// Represents the result of a fallible template-set operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building or executing a template namespace.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template source fails to parse.
    Parse { name: String, err: String },

    /// Returned when two registrations derive the same name.
    Duplicate(String),

    /// Returned when execution is requested for a name that was never
    /// registered.
    Undefined(String),

    /// Returned when a partial file cannot be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while walking the template tree.
    Walk(walkdir::Error),

    /// Returned when the context can't be converted for the engine.
    Context(String),

    /// Returned for runtime failures while executing a template.
    Execute(String),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse { name, err } => {
                write!(f, "Parsing template `{}`: {}", name, err)
            }
            Error::Duplicate(name) => {
                write!(f, "Duplicate template name `{}`", name)
            }
            Error::Undefined(name) => {
                write!(f, "Undefined template `{}`", name)
            }
            Error::Read { path, err } => {
                write!(f, "Reading template '{}': {}", path.display(), err)
            }
            Error::Walk(err) => err.fmt(f),
            Error::Context(err) => err.fmt(f),
            Error::Execute(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { name: _, err: _ } => None,
            Error::Duplicate(_) => None,
            Error::Undefined(_) => None,
            Error::Read { path: _, err } => Some(err),
            Error::Walk(err) => Some(err),
            Error::Context(_) => None,
            Error::Execute(_) => None,
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for fallible traversal operations.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}
