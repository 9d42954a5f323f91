use std::path::Path;
use std::process;

use clap::{App, Arg};
use tracing_subscriber::EnvFilter;

use stele::build::build_site;
use stele::config::Config;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = App::new("stele")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a template tree into a static site")
        .arg(
            Arg::with_name("directory")
                .help("Project directory holding the template tree")
                .index(1),
        )
        .get_matches();
    let directory = Path::new(matches.value_of("directory").unwrap_or("."));

    if let Err(err) = build_site(&Config::from_directory(directory)) {
        eprintln!("Error building site: {}", err);
        process::exit(1);
    }
}
