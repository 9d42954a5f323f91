use std::path::{Path, PathBuf};

/// The directory scanned for partials, templates, and plain files.
pub const TEMPLATE_DIRECTORY: &str = "templates";

/// The directory into which output files are written.
pub const OUTPUT_DIRECTORY: &str = "output";

/// The global context document. Optional; an absent file means an empty
/// context.
pub const CONTEXT_FILE: &str = "context.yml";

/// The resolved paths for a single run. Threading this through
/// [`crate::build::build_site`] rather than reading ambient constants lets
/// multiple isolated runs coexist in one process (notably in tests).
pub struct Config {
    pub template_directory: PathBuf,
    pub output_directory: PathBuf,
    pub context_file: PathBuf,
}

impl Config {
    /// Resolves the fixed-name layout against a project directory.
    pub fn from_directory(dir: &Path) -> Config {
        Config {
            template_directory: dir.join(TEMPLATE_DIRECTORY),
            output_directory: dir.join(OUTPUT_DIRECTORY),
            context_file: dir.join(CONTEXT_FILE),
        }
    }
}
