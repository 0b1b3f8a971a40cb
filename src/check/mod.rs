//! Evaluation of an emitted `zpool_iostat` section against levels

pub mod evaluate;
pub mod params;
pub mod section;

use log::debug;
use std::error::Error;
use std::io::{Read, Write};
use std::path::Path;

use crate::system::FilesystemReader;

pub use evaluate::{check_section, State};
pub use params::{load_params, CheckParams};
pub use section::parse_section;

/// Read a section from `input`, write one result line per pool and return
/// the worst state seen.
pub fn run_check<F, R, W>(
    reader: &F,
    params_path: Option<&Path>,
    item: Option<&str>,
    mut input: R,
    mut out: W,
) -> Result<State, Box<dyn Error>>
where
    F: FilesystemReader,
    R: Read,
    W: Write,
{
    let params = match params_path {
        Some(path) => load_params(reader, path)?,
        None => CheckParams::default(),
    };

    let mut text = String::new();
    input.read_to_string(&mut text)?;
    let section = parse_section(&text);
    debug!("Section holds {} pool(s)", section.pools.len());

    let checks = check_section(item, &params, &section);
    let mut worst = State::Ok;
    for check in &checks {
        writeln!(out, "{}", check.render())?;
        worst = worst.worst(check.state);
    }
    if checks.is_empty() {
        writeln!(out, "UNKNOWN ZPool I/O - No pools in agent output")?;
        worst = State::Unknown;
    }
    out.flush()?;

    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::RealFilesystemReader;

    #[test]
    fn test_run_check_with_params_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"storage_levels": [50, 70]}}"#).unwrap();

        let input = "<<<zpool_iostat:sep(124)>>>\ntank|{\"alloc\":3.0,\"free\":1.0}\nbackup|{\"alloc\":1.0,\"free\":3.0}\n";
        let mut out = Vec::new();
        let state = run_check(
            &RealFilesystemReader,
            Some(&path),
            None,
            input.as_bytes(),
            &mut out,
        )
        .unwrap();

        assert_eq!(state, State::Crit);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("OK ZPool I/O backup - Storage used: 25.00%"));
        assert!(lines[1].starts_with("CRIT ZPool I/O tank - Storage used: 75.00%"));
    }

    #[test]
    fn test_run_check_empty_section() {
        let mut out = Vec::new();
        let state = run_check(&RealFilesystemReader, None, None, "".as_bytes(), &mut out).unwrap();

        assert_eq!(state, State::Unknown);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "UNKNOWN ZPool I/O - No pools in agent output\n"
        );
    }

    #[test]
    fn test_run_check_bad_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, "{broken").unwrap();

        let result = run_check(&RealFilesystemReader, Some(&path), None, "".as_bytes(), Vec::new());
        assert!(result.is_err());
    }
}
