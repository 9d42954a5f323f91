//! Renders a single template file to its destination. Each file gets an
//! independent clone of the base namespace and (when it carries front
//! matter) its own derived context, so one file's rendering can never
//! observe another's.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::context::{self, Context};
use crate::frontmatter;
use crate::templates::{TemplateSet, ROOT_TEMPLATE};

/// Responsible for rendering template files against the shared partial
/// namespace and root context.
pub struct Renderer<'a> {
    /// The base namespace holding every partial. Never mutated; each file
    /// works against a clone.
    pub templates: &'a TemplateSet,

    /// The run's root context. Files with front matter derive their own
    /// context from a duplicate of this one.
    pub context: &'a Context,
}

impl Renderer<'_> {
    /// Renders the template at `source` into `target`, creating missing
    /// ancestor directories. Any failure is annotated with the source
    /// path.
    pub fn render(&self, source: &Path, target: &Path) -> Result<()> {
        match self.render_inner(source, target) {
            Ok(()) => Ok(()),
            Err(err) => Err(Error::Annotated(
                format!("rendering `{}`", source.display()),
                Box::new(err),
            )),
        }
    }

    fn render_inner(&self, source: &Path, target: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(source)?;
        let document = frontmatter::split(&contents)?;

        let derived = match document.matter {
            Some(matter) => {
                Some(context::overlay(self.context, &frontmatter::parse(matter)?))
            }
            None => None,
        };
        let context = derived.as_ref().unwrap_or(self.context);

        let mut templates = self.templates.clone();
        templates.insert(ROOT_TEMPLATE, document.body)?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(target)?;
        templates.execute(ROOT_TEMPLATE, context, &mut file)?;
        Ok(())
    }
}

/// Represents the result of rendering one file.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering one file.
#[derive(Debug)]
pub enum Error {
    /// Returned for problems splitting or parsing front matter.
    FrontMatter(frontmatter::Error),

    /// Returned for problems compiling or executing templates.
    Templates(crate::templates::Error),

    /// Returned for I/O problems reading the source or writing the
    /// destination.
    Io(io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontMatter(err) => err.fmt(f),
            Error::Templates(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
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
            Error::FrontMatter(err) => Some(err),
            Error::Templates(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<frontmatter::Error> for Error {
    /// Converts a [`frontmatter::Error`] into an [`Error`]. This allows us
    /// to use the `?` operator for front-matter operations.
    fn from(err: frontmatter::Error) -> Error {
        Error::FrontMatter(err)
    }
}

impl From<crate::templates::Error> for Error {
    /// Converts a [`crate::templates::Error`] into an [`Error`]. This
    /// allows us to use the `?` operator for template operations.
    fn from(err: crate::templates::Error) -> Error {
        Error::Templates(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_annotates_errors_with_source_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("page.tmpl");
        std::fs::write(&source, "---\nname: x\nno closing fence").unwrap();

        let templates = TemplateSet::default();
        let context = Context::new();
        let renderer = Renderer {
            templates: &templates,
            context: &context,
        };

        let err = renderer
            .render(&source, &dir.path().join("page"))
            .unwrap_err();
        assert!(err.to_string().contains("page.tmpl"));
    }
}
