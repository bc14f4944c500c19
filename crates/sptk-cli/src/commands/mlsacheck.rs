//! `mlsacheck`: stability check of MLSA digital filters.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use sptk_analysis::{
    MlsaStabilityCheck, MlsaStabilityCheckBuffer, Modification, pade_threshold,
};

use super::common::{double_records, flush, stdout, write_doubles};

/// What to do when an unstable frame is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WarningType {
    Ignore,
    Warn,
    Exit,
}

impl WarningType {
    fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Ignore,
            2 => Self::Exit,
            _ => Self::Warn,
        }
    }
}

/// Arguments for `mlsacheck`.
#[derive(Args, Debug)]
pub struct MlsacheckArgs {
    /// Order of the mel-cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    order: usize,

    /// FFT length
    #[arg(short = 'l', default_value_t = 256)]
    fft_length: usize,

    /// All-pass constant
    #[arg(short = 'a', default_value_t = 0.35, allow_negative_numbers = true)]
    alpha: f64,

    /// Order of the Pade approximation
    #[arg(short = 'P', default_value_t = 4, value_parser = clap::value_parser!(u8).range(4..=7))]
    pade_order: u8,

    /// Warning type: 0 (none), 1 (report unstable frames), 2 (report and exit)
    #[arg(short = 'e', default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    warning_type: u8,

    /// Stability threshold [default: from the Pade order]
    #[arg(short = 'r')]
    threshold: Option<f64>,

    /// Keep filter stability rather than the log approximation error
    #[arg(short = 'k')]
    keep_stability: bool,

    /// Fast mode: check the amplitude at zero frequency only
    #[arg(short = 'f')]
    fast: bool,

    /// Repair unstable frames
    #[arg(short = 'x')]
    modify: bool,

    /// Repair type: 0 (clipping), 1 (scaling)
    #[arg(short = 't', default_value = "0")]
    modification: Modification,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

impl MlsacheckArgs {
    fn threshold(&self) -> Result<f64> {
        if let Some(threshold) = self.threshold {
            if threshold <= 0.0 {
                bail!("threshold must be positive");
            }
            return Ok(threshold);
        }
        pade_threshold(usize::from(self.pade_order), !self.keep_stability)
            .context("order of Pade approximation must be in 4..=7")
    }

    fn checker(&self, threshold: f64) -> MlsaStabilityCheck {
        if self.fast {
            MlsaStabilityCheck::fast(self.order, self.alpha, threshold)
        } else {
            MlsaStabilityCheck::new(
                self.order,
                self.alpha,
                threshold,
                self.fft_length,
                self.modification,
            )
        }
    }
}

pub fn run(args: MlsacheckArgs) -> Result<()> {
    let threshold = args.threshold()?;
    let check = args.checker(threshold);
    if !check.is_valid() {
        bail!("failed to set condition for stability check");
    }
    let warning_type = WarningType::from_index(args.warning_type);

    let mut reader = double_records(args.input.as_deref(), args.order + 1)?;
    let mut out = stdout()?;
    let mut buffer = MlsaStabilityCheckBuffer::default();
    let (mut mc, mut modified) = (Vec::new(), Vec::new());
    let mut frame = 0usize;
    while reader.next_record(&mut mc)? {
        let report = check
            .run(&mc, args.modify.then_some(&mut modified), &mut buffer)
            .context("failed to check stability of MLSA digital filter")?;

        if !report.is_stable && warning_type != WarningType::Ignore {
            let message = format!(
                "{frame}th frame is unstable (maximum = {}, threshold = {threshold})",
                report.maximum_amplitude
            );
            if warning_type == WarningType::Exit {
                flush(&mut out)?;
                bail!(message);
            }
            tracing::debug!(frame, maximum = report.maximum_amplitude, "unstable frame");
            eprintln!("sptk mlsacheck: {message}");
        }

        write_doubles(&mut out, if args.modify { &modified } else { &mc })?;
        frame += 1;
    }
    flush(&mut out)
}
