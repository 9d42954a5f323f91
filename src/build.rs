//! Exports the [`build_site`] function which stitches together the
//! high-level steps of producing the output tree: loading the global
//! context ([`crate::context`]), registering the partial templates
//! ([`crate::templates`]), and walking the template tree once, rendering
//! each template file ([`crate::render`]) and byte-copying everything
//! else into the mirrored output path.
//!
//! The run is strictly sequential and fails fast: the first error aborts
//! the whole build, and files already written stay on disk. Output is
//! expected to be regenerated wholesale on every run, so there is no
//! cleanup or rollback.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::config::Config;
use crate::context;
use crate::render::{Error as RenderError, Renderer};
use crate::templates::{
    self, Error as TemplateError, PARTIAL_MARKER, TEMPLATE_EXTENSION,
};

/// Builds the site from a [`Config`] object: one context load, one partial
/// scan, then one pass over the template tree dispatching every file to
/// the renderer or the copier.
pub fn build_site(config: &Config) -> Result<()> {
    let context = context::load(&config.context_file)?;
    let templates = templates::load_partials(&config.template_directory)?;
    let renderer = Renderer {
        templates: &templates,
        context: &context,
    };

    for result in WalkDir::new(&config.template_directory) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        // Partials were consumed by the registry scan; every other file
        // starting with the marker is ignored outright.
        if file_name.starts_with(PARTIAL_MARKER) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(&config.template_directory)
            .unwrap() // entry paths always extend the walk root
            .to_string_lossy()
            .into_owned();

        match relative.strip_suffix(TEMPLATE_EXTENSION) {
            Some(stripped) => {
                let target = config.output_directory.join(stripped);
                info!(
                    "Rendering {} to {}",
                    entry.path().display(),
                    target.display()
                );
                renderer.render(entry.path(), &target)?;
            }
            None => {
                let target = config.output_directory.join(&relative);
                info!(
                    "Copying {} to {}",
                    entry.path().display(),
                    target.display()
                );
                copy_file(entry.path(), &target).map_err(|err| {
                    Error::Copy {
                        path: entry.path().to_owned(),
                        err,
                    }
                })?;
            }
        }
    }

    Ok(())
}

fn copy_file(source: &Path, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, target)?;
    Ok(())
}

/// Represents the result of a site build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can occur loading the global
/// context, registering partials, walking the tree, rendering, and
/// copying.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the global context document.
    Context(context::Error),

    /// Returned for errors building the partial namespace.
    Templates(TemplateError),

    /// Returned for errors rendering a template file.
    Render(RenderError),

    /// Returned for I/O problems while walking the template tree.
    Walk(walkdir::Error),

    /// Returned for I/O problems while copying a plain file.
    Copy { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Context(err) => err.fmt(f),
            Error::Templates(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Walk(err) => err.fmt(f),
            Error::Copy { path, err } => {
                write!(f, "Copying '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Context(err) => Some(err),
            Error::Templates(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Walk(err) => Some(err),
            Error::Copy { path: _, err } => Some(err),
        }
    }
}

impl From<context::Error> for Error {
    /// Converts a [`context::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator.
    fn from(err: context::Error) -> Error {
        Error::Context(err)
    }
}

impl From<TemplateError> for Error {
    /// Converts a [`TemplateError`] into an [`Error`]. This allows us to
    /// use the `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Templates(err)
    }
}

impl From<RenderError> for Error {
    /// Converts a [`RenderError`] into an [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}
