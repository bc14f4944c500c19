//! Shared CLI helpers used across multiple commands.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use sptk_config::{AnalysisPreset, find_preset, validate_preset};
use sptk_io::{DataType, RecordReader, open_input, open_output, write_record};

/// Boxed input stream.
pub type Input = Box<dyn BufRead>;

/// Boxed output stream.
pub type Output = Box<dyn Write>;

/// Reader of `length`-value double records; a short final record is dropped.
pub fn double_records(path: Option<&Path>, length: usize) -> Result<RecordReader<Input>> {
    Ok(RecordReader::new(open_input(path)?, DataType::Double, length))
}

/// Reader of `length`-value double records; a short final record is zero padded.
pub fn padded_double_records(path: Option<&Path>, length: usize) -> Result<RecordReader<Input>> {
    Ok(double_records(path, length)?.with_zero_padding(true))
}

/// Buffered standard output.
pub fn stdout() -> Result<Output> {
    Ok(open_output(None)?)
}

/// Flush the output stream.
pub fn flush(out: &mut Output) -> Result<()> {
    out.flush().context("failed to write output")
}

/// Write `values` as little-endian doubles.
pub fn write_doubles(out: &mut Output, values: &[f64]) -> Result<()> {
    write_record(out, DataType::Double, values, false)?;
    Ok(())
}

/// Explicit flag, else preset value, else the tool default.
pub fn pick<T>(flag: Option<T>, preset: Option<T>, default: T) -> T {
    flag.or(preset).unwrap_or(default)
}

/// `--preset` option of the analysis commands.
#[derive(Args, Debug, Clone, Default)]
pub struct PresetArg {
    /// Analysis preset (factory name, user preset name or TOML path)
    #[arg(long)]
    pub preset: Option<String>,
}

impl PresetArg {
    /// Resolve and validate the preset, if one was requested.
    pub fn load(&self) -> Result<Option<AnalysisPreset>> {
        let Some(name) = &self.preset else {
            return Ok(None);
        };
        let preset =
            find_preset(name).with_context(|| format!("cannot load preset '{name}'"))?;
        validate_preset(&preset).with_context(|| format!("invalid preset '{name}'"))?;
        tracing::debug!(preset = %preset.name, "using analysis preset");
        Ok(Some(preset))
    }
}

/// γ from `-g`, or `-1/C` when the stage count `-c` is given.
pub fn resolve_gamma(gamma: f64, num_stage: Option<usize>) -> Result<f64> {
    match num_stage {
        Some(0) => bail!("number of stages must be positive"),
        Some(c) => Ok(-1.0 / c as f64),
        None => Ok(gamma),
    }
}

/// Order `m` when given, `length - 1` otherwise; it must be below `length`.
pub fn order_for_length(order: Option<usize>, length: usize) -> Result<usize> {
    let Some(order) = order else {
        return Ok(length.saturating_sub(1));
    };
    if length <= order {
        bail!("order of data sequence must be less than FFT length");
    }
    Ok(order)
}

/// Split `+type` operands from file operands.
pub fn split_type_operands(operands: &[String]) -> Result<(Option<&str>, Vec<PathBuf>)> {
    let mut type_spec = None;
    let mut files = Vec::new();
    for operand in operands {
        if let Some(spec) = operand.strip_prefix('+') {
            if type_spec.replace(spec).is_some() {
                bail!("data type is given more than once");
            }
        } else {
            files.push(PathBuf::from(operand));
        }
    }
    Ok((type_spec, files))
}

/// The single optional input file of a tool.
pub fn single_input(files: &[PathBuf]) -> Result<Option<&Path>> {
    match files {
        [] => Ok(None),
        [file] => Ok(Some(file.as_path())),
        _ => bail!("too many input files"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_precedence() {
        assert_eq!(pick(Some(1), Some(2), 3), 1);
        assert_eq!(pick(None, Some(2), 3), 2);
        assert_eq!(pick(None, None, 3), 3);
    }

    #[test]
    fn test_resolve_gamma() {
        assert_eq!(resolve_gamma(-0.5, None).unwrap(), -0.5);
        assert_eq!(resolve_gamma(0.0, Some(2)).unwrap(), -0.5);
        assert!(resolve_gamma(0.0, Some(0)).is_err());
    }

    #[test]
    fn test_order_for_length() {
        assert_eq!(order_for_length(None, 256).unwrap(), 255);
        assert_eq!(order_for_length(Some(10), 16).unwrap(), 10);
        assert!(order_for_length(Some(16), 16).is_err());
    }

    #[test]
    fn test_split_type_operands() {
        let operands = vec!["+sd".to_string(), "in.bin".to_string()];
        let (spec, files) = split_type_operands(&operands).unwrap();
        assert_eq!(spec, Some("sd"));
        assert_eq!(files, vec![PathBuf::from("in.bin")]);

        let twice = vec!["+s".to_string(), "+d".to_string()];
        assert!(split_type_operands(&twice).is_err());
        assert!(single_input(&[PathBuf::from("a"), PathBuf::from("b")]).is_err());
    }

    #[test]
    fn test_preset_arg() {
        assert!(PresetArg::default().load().unwrap().is_none());
        let arg = PresetArg {
            preset: Some("speech-16k".into()),
        };
        assert_eq!(arg.load().unwrap().unwrap().order, 24);
        let missing = PresetArg {
            preset: Some("/no/such/preset.toml".into()),
        };
        assert!(missing.load().is_err());
    }
}
