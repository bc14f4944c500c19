//! Cepstral analysis commands: `fftcep`, `mgcep`, `smcep` and `agcep`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use sptk_analysis::{
    AdaptiveGeneralizedCepstralAnalysis, AdaptiveGeneralizedCepstralAnalysisBuffer,
    FftCepstralAnalysis, FftCepstralAnalysisBuffer, FilterCoefficientsToSpectrumBuffer,
    GainNormalization, MelCepstrumToMlsaCoefficients, MelGeneralizedCepstralAnalysis,
    MelGeneralizedCepstralAnalysisBuffer, MelCepstralAnalysisBuffer,
    SecondOrderAllPassMelCepstralAnalysis, SpectrumFormat, SpectrumToSpectrum, WaveformToSpectrum,
};
use sptk_io::{DataType, RecordReader, ValueReader, open_input, open_output, write_value};

use super::common::{
    Input, PresetArg, double_records, flush, pick, resolve_gamma, stdout, write_doubles,
};

/// Options shared by the tools that analyse a periodogram.
#[derive(Args, Debug)]
pub struct SpectrumInputArgs {
    /// Input format: 0 (20 log|X|), 1 (ln|X|), 2 (|X|), 3 (|X|^2), 4 (windowed waveform)
    #[arg(short = 'q', default_value_t = 4, value_parser = clap::value_parser!(u8).range(0..=4))]
    input_format: u8,

    /// Small value added to the power spectrum
    #[arg(short = 'e')]
    epsilon: Option<f64>,

    /// Relative floor in decibels
    #[arg(short = 'E', allow_negative_numbers = true)]
    relative_floor: Option<f64>,
}

impl SpectrumInputArgs {
    fn validate(&self) -> Result<()> {
        if self.epsilon.is_some_and(|e| e <= 0.0) {
            bail!("small value added to power spectrum must be positive");
        }
        if self.relative_floor.is_some_and(|f| f >= 0.0) {
            bail!("relative floor must be negative");
        }
        Ok(())
    }
}

enum SpectrumConverter {
    Spectrum(SpectrumToSpectrum),
    Waveform(WaveformToSpectrum, FilterCoefficientsToSpectrumBuffer),
}

/// Frames of input converted to `L/2 + 1` power bins.
struct Periodograms {
    reader: RecordReader<Input>,
    frame: Vec<f64>,
    converter: SpectrumConverter,
}

impl Periodograms {
    fn open(path: Option<&Path>, fft_length: usize, args: &SpectrumInputArgs) -> Result<Self> {
        args.validate()?;
        let epsilon = args.epsilon.unwrap_or(0.0);
        let format = SpectrumFormat::from_index(usize::from(args.input_format));
        let (converter, is_valid, frame_length) = match format {
            Some(format) => {
                let converter = SpectrumToSpectrum::new(
                    fft_length,
                    format,
                    SpectrumFormat::Power,
                    epsilon,
                    args.relative_floor,
                );
                let is_valid = converter.is_valid();
                (SpectrumConverter::Spectrum(converter), is_valid, fft_length / 2 + 1)
            }
            None => {
                let converter = WaveformToSpectrum::new(
                    fft_length,
                    fft_length,
                    SpectrumFormat::Power,
                    epsilon,
                    args.relative_floor,
                );
                let is_valid = converter.is_valid();
                let buffer = FilterCoefficientsToSpectrumBuffer::default();
                (SpectrumConverter::Waveform(converter, buffer), is_valid, fft_length)
            }
        };
        if !is_valid {
            bail!("FFT length must be a power of two");
        }
        Ok(Self {
            reader: double_records(path, frame_length)?,
            frame: Vec::with_capacity(frame_length),
            converter,
        })
    }

    /// Next periodogram, or `false` at the end of input.
    fn next(&mut self, power: &mut Vec<f64>) -> Result<bool> {
        if !self.reader.next_record(&mut self.frame)? {
            return Ok(false);
        }
        match &mut self.converter {
            SpectrumConverter::Spectrum(converter) => converter
                .run(&self.frame, power)
                .context("failed to convert spectrum")?,
            SpectrumConverter::Waveform(converter, buffer) => converter
                .run(&self.frame, power, buffer)
                .context("failed to transform waveform to spectrum")?,
        }
        Ok(true)
    }
}

/// Arguments for `fftcep`.
#[derive(Args, Debug)]
pub struct FftcepArgs {
    /// FFT length [default: 256]
    #[arg(short = 'l')]
    fft_length: Option<usize>,

    /// Order of the cepstrum [default: 25]
    #[arg(short = 'm')]
    order: Option<usize>,

    /// Number of envelope iterations
    #[arg(short = 'i', default_value_t = 0)]
    iterations: usize,

    /// Acceleration factor
    #[arg(short = 'a', default_value_t = 0.0)]
    acceleration: f64,

    #[command(flatten)]
    spectrum: SpectrumInputArgs,

    #[command(flatten)]
    preset: PresetArg,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_fftcep(args: FftcepArgs) -> Result<()> {
    let preset = args.preset.load()?;
    let fft_length = pick(args.fft_length, preset.as_ref().map(|p| p.fft_length), 256);
    let order = pick(args.order, preset.as_ref().map(|p| p.order), 25);

    let analysis = FftCepstralAnalysis::new(fft_length, order, args.iterations, args.acceleration);
    if !analysis.is_valid() {
        bail!("failed to initialize FFT cepstral analysis (order must not exceed l/2)");
    }
    tracing::debug!(fft_length, order, iterations = args.iterations, "fftcep");

    let mut frames = Periodograms::open(args.input.as_deref(), fft_length, &args.spectrum)?;
    let mut out = stdout()?;
    let mut buffer = FftCepstralAnalysisBuffer::default();
    let (mut power, mut cepstrum) = (Vec::new(), Vec::new());
    while frames.next(&mut power)? {
        analysis
            .run(&power, &mut cepstrum, &mut buffer)
            .context("failed to run FFT cepstral analysis")?;
        write_doubles(&mut out, &cepstrum)?;
    }
    flush(&mut out)
}

/// Output representation of `mgcep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MgcepOutput {
    Cepstrum,
    MlsaCoefficients,
    GainNormalizedCepstrum,
    GainNormalizedMlsaCoefficients,
}

impl MgcepOutput {
    fn from_index(index: u8) -> Self {
        match index {
            1 => Self::MlsaCoefficients,
            2 => Self::GainNormalizedCepstrum,
            3 => Self::GainNormalizedMlsaCoefficients,
            _ => Self::Cepstrum,
        }
    }

    fn uses_mlsa_coefficients(self) -> bool {
        matches!(self, Self::MlsaCoefficients | Self::GainNormalizedMlsaCoefficients)
    }

    fn uses_gain_normalization(self) -> bool {
        matches!(self, Self::GainNormalizedCepstrum | Self::GainNormalizedMlsaCoefficients)
    }
}

/// Arguments for `mgcep`.
#[derive(Args, Debug)]
pub struct MgcepArgs {
    /// Order of the mel-generalized cepstrum [default: 25]
    #[arg(short = 'm')]
    order: Option<usize>,

    /// All-pass constant [default: 0.35]
    #[arg(short = 'a', allow_negative_numbers = true)]
    alpha: Option<f64>,

    /// Exponent of the generalized logarithm [default: 0]
    #[arg(short = 'g', allow_negative_numbers = true)]
    gamma: Option<f64>,

    /// Number of stages; sets gamma to -1/C
    #[arg(short = 'c', conflicts_with = "gamma")]
    num_stage: Option<usize>,

    /// FFT length [default: 256]
    #[arg(short = 'l')]
    fft_length: Option<usize>,

    /// Output format: 0 (cepstrum), 1 (MLSA coefficients), 2 (gain normalized cepstrum), 3 (gain normalized MLSA coefficients)
    #[arg(short = 'o', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    output_format: u8,

    /// Maximum number of iterations [default: 10]
    #[arg(short = 'i')]
    iterations: Option<usize>,

    /// Convergence threshold [default: 1e-3]
    #[arg(short = 'd')]
    threshold: Option<f64>,

    #[command(flatten)]
    spectrum: SpectrumInputArgs,

    #[command(flatten)]
    preset: PresetArg,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_mgcep(args: MgcepArgs) -> Result<()> {
    let preset = args.preset.load()?;
    let preset = preset.as_ref();
    let order = pick(args.order, preset.map(|p| p.order), 25);
    let alpha = pick(args.alpha, preset.map(|p| p.alpha()), 0.35);
    let gamma = resolve_gamma(pick(args.gamma, preset.map(|p| p.gamma), 0.0), args.num_stage)?;
    let fft_length = pick(args.fft_length, preset.map(|p| p.fft_length), 256);
    let iterations = pick(args.iterations, preset.map(|p| p.iterations), 10);
    let threshold = pick(args.threshold, preset.map(|p| p.threshold), 1e-3);
    let output_format = MgcepOutput::from_index(args.output_format);

    let analysis =
        MelGeneralizedCepstralAnalysis::new(fft_length, order, alpha, gamma, iterations, threshold);
    if !analysis.is_valid() {
        bail!("failed to initialize mel-generalized cepstral analysis");
    }
    let mc2b = MelCepstrumToMlsaCoefficients::new(order, alpha);
    let gnorm = GainNormalization::new(order, gamma);
    tracing::debug!(order, alpha, gamma, fft_length, ?output_format, "mgcep");

    let mut frames = Periodograms::open(args.input.as_deref(), fft_length, &args.spectrum)?;
    let mut out = stdout()?;
    let mut buffer = MelGeneralizedCepstralAnalysisBuffer::default();
    let (mut power, mut mgc) = (Vec::new(), Vec::new());
    while frames.next(&mut power)? {
        analysis
            .run(&power, &mut mgc, &mut buffer)
            .context("failed to run mel-generalized cepstral analysis")?;
        if output_format.uses_mlsa_coefficients() {
            mc2b.run_in_place(&mut mgc)
                .context("failed to convert to MLSA filter coefficients")?;
        }
        if output_format.uses_gain_normalization() {
            gnorm
                .run_in_place(&mut mgc)
                .context("failed to run gain normalization")?;
        }
        write_doubles(&mut out, &mgc)?;
    }
    flush(&mut out)
}

/// Arguments for `smcep`.
#[derive(Args, Debug)]
pub struct SmcepArgs {
    /// Order of the mel-cepstrum [default: 25]
    #[arg(short = 'm')]
    order: Option<usize>,

    /// All-pass constant [default: 0.35]
    #[arg(short = 'a', allow_negative_numbers = true)]
    alpha: Option<f64>,

    /// Emphasized frequency in units of pi rad
    #[arg(short = 't', default_value_t = 0.0)]
    theta: f64,

    /// FFT length [default: 256]
    #[arg(short = 'l')]
    fft_length: Option<usize>,

    /// Accuracy factor (a power of two)
    #[arg(short = 'f', default_value_t = 4)]
    accuracy_factor: usize,

    /// Maximum number of iterations [default: 30]
    #[arg(short = 'i')]
    iterations: Option<usize>,

    /// Convergence threshold [default: 1e-3]
    #[arg(short = 'd')]
    threshold: Option<f64>,

    #[command(flatten)]
    spectrum: SpectrumInputArgs,

    #[command(flatten)]
    preset: PresetArg,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_smcep(args: SmcepArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.theta) {
        bail!("emphasized frequency must lie in [0, 1]");
    }
    if !args.accuracy_factor.is_power_of_two() {
        bail!("accuracy factor must be a power of two");
    }
    let preset = args.preset.load()?;
    let preset = preset.as_ref();
    let order = pick(args.order, preset.map(|p| p.order), 25);
    let alpha = pick(args.alpha, preset.map(|p| p.alpha()), 0.35);
    let fft_length = pick(args.fft_length, preset.map(|p| p.fft_length), 256);
    let iterations = pick(args.iterations, preset.map(|p| p.iterations), 30);
    let threshold = pick(args.threshold, preset.map(|p| p.threshold), 1e-3);

    let analysis = SecondOrderAllPassMelCepstralAnalysis::new(
        fft_length,
        order,
        args.accuracy_factor,
        alpha,
        args.theta * std::f64::consts::PI,
        iterations,
        threshold,
    );
    if !analysis.is_valid() {
        bail!("failed to initialize second-order all-pass mel-cepstral analysis");
    }
    tracing::debug!(order, alpha, theta = args.theta, fft_length, "smcep");

    let mut frames = Periodograms::open(args.input.as_deref(), fft_length, &args.spectrum)?;
    let mut out = stdout()?;
    let mut buffer = MelCepstralAnalysisBuffer::default();
    let (mut power, mut mc) = (Vec::new(), Vec::new());
    while frames.next(&mut power)? {
        analysis
            .run(&power, &mut mc, &mut buffer)
            .context("failed to run mel-cepstral analysis")?;
        write_doubles(&mut out, &mc)?;
    }
    flush(&mut out)
}

/// Arguments for `agcep`.
#[derive(Args, Debug)]
pub struct AgcepArgs {
    /// Order of the cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    order: usize,

    /// Number of stages; gamma = -1/c
    #[arg(short = 'c', default_value_t = 1)]
    num_stage: usize,

    /// Minimum value of epsilon
    #[arg(short = 'e', default_value_t = 1e-16)]
    min_epsilon: f64,

    /// Momentum constant
    #[arg(short = 't', default_value_t = 0.9)]
    momentum: f64,

    /// Forgetting factor
    #[arg(short = 'l', default_value_t = 0.98)]
    forgetting_factor: f64,

    /// Step-size factor
    #[arg(short = 'k', default_value_t = 0.1)]
    step_size_factor: f64,

    /// Output period in samples
    #[arg(short = 'p', default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    output_period: u64,

    /// Write the prediction error to this file as doubles
    #[arg(short = 'E')]
    prediction_error_file: Option<PathBuf>,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_agcep(args: AgcepArgs) -> Result<()> {
    let analysis = AdaptiveGeneralizedCepstralAnalysis::new(
        args.order,
        args.num_stage,
        args.min_epsilon,
        args.momentum,
        args.forgetting_factor,
        args.step_size_factor,
    );
    if !analysis.is_valid() {
        bail!("failed to initialize adaptive generalized cepstral analysis");
    }

    let mut error_out = args
        .prediction_error_file
        .as_deref()
        .map(|path| open_output(Some(path)))
        .transpose()?;
    let mut reader = ValueReader::new(open_input(args.input.as_deref())?, DataType::Double);
    let mut out = stdout()?;
    let mut buffer = AdaptiveGeneralizedCepstralAnalysisBuffer::default();
    let mut gc = Vec::new();
    let mut count = 0u64;
    while let Some(x) = reader.read_value()? {
        let error = analysis
            .run(x, &mut gc, &mut buffer)
            .context("failed to run adaptive generalized cepstral analysis")?;
        if let Some(error_out) = error_out.as_mut() {
            write_value(error_out, DataType::Double, error, false)?;
        }
        count += 1;
        if count == args.output_period {
            write_doubles(&mut out, &gc)?;
            count = 0;
        }
    }
    if let Some(mut error_out) = error_out {
        error_out
            .flush()
            .context("failed to write prediction error")?;
    }
    flush(&mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mgcep_output_formats() {
        assert_eq!(MgcepOutput::from_index(0), MgcepOutput::Cepstrum);
        let both = MgcepOutput::from_index(3);
        assert!(both.uses_mlsa_coefficients() && both.uses_gain_normalization());
        assert!(!MgcepOutput::from_index(2).uses_mlsa_coefficients());
        assert!(!MgcepOutput::from_index(1).uses_gain_normalization());
    }

    #[test]
    fn test_spectrum_input_validation() {
        let ok = SpectrumInputArgs {
            input_format: 4,
            epsilon: Some(1e-8),
            relative_floor: Some(-60.0),
        };
        assert!(ok.validate().is_ok());
        let bad_floor = SpectrumInputArgs {
            relative_floor: Some(3.0),
            ..ok
        };
        assert!(bad_floor.validate().is_err());
        let bad_epsilon = SpectrumInputArgs {
            input_format: 4,
            epsilon: Some(0.0),
            relative_floor: None,
        };
        assert!(bad_epsilon.validate().is_err());
    }

    #[test]
    fn test_periodograms_reject_bad_fft_length() {
        let args = SpectrumInputArgs {
            input_format: 3,
            epsilon: None,
            relative_floor: None,
        };
        assert!(Periodograms::open(None, 100, &args).is_err());
    }
}
