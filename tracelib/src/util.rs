use std::error::Error;
use std::fs;

use regex::Regex;

pub const SAMPLE_INPUTS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/sample-inputs");
pub const SAMPLE_OUTPUTS_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/sample-outputs");
pub const TRACE_FILES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/trace-files");

pub struct TestCasePaths {
    pub config: String,
    pub trace: String,
    pub output: String,
}

/// Collects the golden test cases from the fixtures directory
///
/// Expected outputs are named `output-<trace>-<config>.json`; the trace and config file
/// paths are reconstructed from the name
pub fn get_cases() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let mut out = Vec::new();
    let output_pattern = Regex::new(r"output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json")?;
    let mut files = fs::read_dir(SAMPLE_OUTPUTS_PATH)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| output_pattern.is_match(name))
        })
        .collect::<Vec<_>>();
    files.sort_by_key(|entry| entry.file_name());
    for file in files {
        let file_name = file
            .file_name()
            .into_string()
            .map_err(|e| format!("can't convert OS string ({e:?}) to standard string"))?;
        let tokens = output_pattern
            .captures(&file_name)
            .ok_or("couldn't parse the output file name")?;
        let trace = tokens
            .name("trace")
            .ok_or("couldn't get the trace name from the output file name")?
            .as_str();
        let config = tokens
            .name("config")
            .ok_or("couldn't get the config name from the output file name")?
            .as_str();
        out.push(TestCasePaths {
            config: format!("{SAMPLE_INPUTS_PATH}/{config}.json"),
            trace: format!("{TRACE_FILES_PATH}/{trace}.txt"),
            output: format!("{SAMPLE_OUTPUTS_PATH}/{file_name}"),
        })
    }
    Ok(out)
}
