//! Defines the [`Context`] type along with the logic for loading the global
//! context document and deriving per-file contexts from front matter. A
//! context is a plain YAML mapping; nothing in it is ever shared mutably
//! between files, since [`overlay`] always works on a full duplicate.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Template data: an arbitrarily nested mapping from scalar keys to YAML
/// values. One root context exists per run; renderable files may derive
/// their own via [`overlay`].
pub type Context = serde_yaml::Mapping;

/// Loads the global context from `path`. A nonexistent file is not an
/// error; it yields an empty context. Anything else that goes wrong--an
/// unreadable file, malformed YAML, a document that isn't a mapping--is
/// fatal for the run.
pub fn load(path: &Path) -> Result<Context> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(Context::new())
        }
        Err(err) => {
            return Err(Error::Read {
                path: path.to_owned(),
                err,
            })
        }
    };

    match parse_document(&contents) {
        Ok(Some(context)) => Ok(context),
        Ok(None) => Err(Error::NotAMapping {
            path: path.to_owned(),
        }),
        Err(err) => Err(Error::Parse {
            path: path.to_owned(),
            err,
        }),
    }
}

/// Parses a YAML document into a [`Context`]. Empty and explicitly-null
/// documents parse to an empty context. Returns `None` if the document's
/// top level is not a mapping.
pub fn parse_document(
    source: &str,
) -> std::result::Result<Option<Context>, serde_yaml::Error> {
    if source.trim().is_empty() {
        return Ok(Some(Context::new()));
    }
    Ok(match serde_yaml::from_str(source)? {
        serde_yaml::Value::Null => Some(Context::new()),
        serde_yaml::Value::Mapping(mapping) => Some(mapping),
        _ => None,
    })
}

/// Returns a new context equal to `base` with `matter` merged over it. The
/// result shares no structure with either input, so mutating it cannot be
/// observed through `base`. Overlapping keys whose values are both mappings
/// merge recursively; any other overlap takes the value from `matter`
/// wholesale; keys absent from `matter` are retained from `base`.
pub fn overlay(base: &Context, matter: &Context) -> Context {
    let mut merged = base.clone();
    merge_into(&mut merged, matter);
    merged
}

fn merge_into(target: &mut Context, overlay: &Context) {
    for (key, value) in overlay {
        if let serde_yaml::Value::Mapping(incoming) = value {
            if let Some(serde_yaml::Value::Mapping(existing)) =
                target.get_mut(key)
            {
                merge_into(existing, incoming);
                continue;
            }
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Represents the result of a fallible context operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the global context document.
#[derive(Debug)]
pub enum Error {
    /// Returned when the context file exists but cannot be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned when the context file is not valid YAML.
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when the context document's top level is not a mapping.
    NotAMapping { path: PathBuf },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading context file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Parsing context file '{}': {}", path.display(), err)
            }
            Error::NotAMapping { path } => write!(
                f,
                "Context file '{}' must contain a mapping",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::NotAMapping { path: _ } => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn context(source: &str) -> Context {
        parse_document(source).unwrap().unwrap()
    }

    fn get<'a>(
        context: &'a Context,
        key: &str,
    ) -> Option<&'a serde_yaml::Value> {
        context.get(&serde_yaml::Value::String(key.to_owned()))
    }

    fn get_str<'a>(context: &'a Context, key: &str) -> &'a str {
        match get(context, key) {
            Some(serde_yaml::Value::String(s)) => s,
            other => panic!("expected a string under `{}`, got {:?}", key, other),
        }
    }

    fn get_mapping<'a>(context: &'a Context, key: &str) -> &'a Context {
        match get(context, key) {
            Some(serde_yaml::Value::Mapping(m)) => m,
            other => {
                panic!("expected a mapping under `{}`, got {:?}", key, other)
            }
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() -> Result<()> {
        let loaded = load(Path::new("./does-not-exist/context.yml"))?;
        assert!(loaded.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_empty_document_is_empty() {
        assert!(context("").is_empty());
        assert!(context("   \n").is_empty());
    }

    #[test]
    fn test_parse_non_mapping_is_rejected() {
        assert!(parse_document("- a\n- b").unwrap().is_none());
        assert!(parse_document("just a string").unwrap().is_none());
    }

    #[test]
    fn test_overlay_scalar_overwrite() {
        let merged = overlay(
            &context("name: world\nkeep: kept"),
            &context("name: override"),
        );
        assert_eq!(get_str(&merged, "name"), "override");
        assert_eq!(get_str(&merged, "keep"), "kept");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_overlay_nested_mapping_merges() {
        let merged = overlay(
            &context("site: {title: Home, author: me}"),
            &context("site: {title: About}"),
        );
        let site = get_mapping(&merged, "site");
        assert_eq!(get_str(site, "title"), "About");
        assert_eq!(get_str(site, "author"), "me");
    }

    #[test]
    fn test_overlay_sequence_replaces_wholesale() {
        let merged =
            overlay(&context("tags: [a, b, c]"), &context("tags: [d]"));
        assert_eq!(
            get(&merged, "tags"),
            Some(&serde_yaml::Value::Sequence(vec![
                serde_yaml::Value::String("d".to_owned())
            ]))
        );
    }

    #[test]
    fn test_overlay_mapping_replaces_scalar() {
        let merged =
            overlay(&context("site: plain"), &context("site: {title: Home}"));
        assert_eq!(get_str(get_mapping(&merged, "site"), "title"), "Home");
    }

    #[test]
    fn test_overlay_does_not_alias_base() {
        let base = context("site: {title: Home}");
        let mut merged = overlay(&base, &context("name: world"));

        let key = serde_yaml::Value::String("site".to_owned());
        match merged.get_mut(&key) {
            Some(serde_yaml::Value::Mapping(site)) => {
                site.insert(
                    serde_yaml::Value::String("title".to_owned()),
                    serde_yaml::Value::String("Mutated".to_owned()),
                );
            }
            _ => panic!("expected a mapping under `site`"),
        }

        assert_eq!(base, context("site: {title: Home}"));
    }
}
