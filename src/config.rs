//! Command line handling for the `leafdb` binary.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Must supply a database filename.")]
    MissingFilename,
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Multiple database paths specified")]
    MultiplePaths,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Config),
    Help,
    Version,
}

pub const USAGE: &str = "\
leafdb - a single-table database stored in one B-tree leaf

USAGE:
    leafdb [OPTIONS] <DATABASE_PATH>

OPTIONS:
    -h, --help       Print help information
    -V, --version    Print version information

ENVIRONMENT:
    RUST_LOG         Log filter, e.g. RUST_LOG=leafdb=debug";

impl Config {
    /// Reads the arguments that follow the program name.
    pub fn from_args<I>(args: I) -> Result<Invocation, Error>
    where
        I: IntoIterator<Item = String>,
    {
        let mut db_path: Option<PathBuf> = None;
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Invocation::Help),
                "--version" | "-V" => return Ok(Invocation::Version),
                opt if opt.starts_with('-') => return Err(Error::UnknownOption(arg)),
                path => {
                    if db_path.is_some() {
                        return Err(Error::MultiplePaths);
                    }
                    db_path = Some(PathBuf::from(path));
                }
            }
        }
        db_path
            .map(|db_path| Invocation::Run(Config { db_path }))
            .ok_or(Error::MissingFilename)
    }
}

#[cfg(test)]
fn args(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_from_args_path() {
    assert_eq!(
        Config::from_args(args(&["mydb.db"])),
        Ok(Invocation::Run(Config {
            db_path: PathBuf::from("mydb.db")
        }))
    );
}

#[test]
fn test_from_args_missing_filename() {
    let err = Config::from_args(args(&[])).unwrap_err();
    assert_eq!(err, Error::MissingFilename);
    assert_eq!(err.to_string(), "Must supply a database filename.");
}

#[test]
fn test_from_args_flags() {
    assert_eq!(Config::from_args(args(&["-h"])), Ok(Invocation::Help));
    assert_eq!(
        Config::from_args(args(&["a.db", "--version"])),
        Ok(Invocation::Version)
    );
    assert_eq!(
        Config::from_args(args(&["--create", "a.db"])),
        Err(Error::UnknownOption("--create".to_string()))
    );
    assert_eq!(
        Config::from_args(args(&["a.db", "b.db"])),
        Err(Error::MultiplePaths)
    );
}
