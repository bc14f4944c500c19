//! Cepstrum conversion commands.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use sptk_analysis::{
    CepstrumFormat, CepstrumToAutocorrelation, CepstrumToAutocorrelationBuffer,
    GainNormalization, InverseGainNormalization, InverseMelCepstrumPowerNormalization,
    MelCepstrumPowerNormalization, MelCepstrumPowerNormalizationBuffer,
    MelCepstrumToMlsaCoefficients, MelGeneralizedCepstrumConverter,
    MelGeneralizedCepstrumConverterBuffer, MlsaCoefficientsToMelCepstrum,
    PrincipalComponentScores,
};
use sptk_core::{FrequencyTransform, FrequencyTransformBuffer, Matrix, is_valid_alpha};
use sptk_io::{DataType, ValueReader, open_input};

use super::common::{double_records, flush, resolve_gamma, stdout, write_doubles};

/// Arguments for `freqt`.
#[derive(Args, Debug)]
pub struct FreqtArgs {
    /// Order of the input cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    input_order: usize,

    /// Order of the output cepstrum
    #[arg(short = 'M', default_value_t = 25)]
    output_order: usize,

    /// All-pass constant of the input
    #[arg(short = 'a', default_value_t = 0.0, allow_negative_numbers = true)]
    input_alpha: f64,

    /// All-pass constant of the output
    #[arg(short = 'A', default_value_t = 0.35, allow_negative_numbers = true)]
    output_alpha: f64,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_freqt(args: FreqtArgs) -> Result<()> {
    if !is_valid_alpha(args.input_alpha) || !is_valid_alpha(args.output_alpha) {
        bail!("all-pass constants must satisfy |alpha| < 1");
    }
    let alpha = (args.output_alpha - args.input_alpha)
        / (1.0 - args.input_alpha * args.output_alpha);
    let freqt = FrequencyTransform::new(args.input_order, args.output_order, alpha);
    if !freqt.is_valid() {
        bail!("failed to initialize frequency transform");
    }

    let mut reader = double_records(args.input.as_deref(), args.input_order + 1)?;
    let mut out = stdout()?;
    let mut buffer = FrequencyTransformBuffer::default();
    let (mut input, mut output) = (Vec::new(), Vec::new());
    while reader.next_record(&mut input)? {
        freqt
            .run(&input, &mut output, &mut buffer)
            .context("failed to run frequency transform")?;
        write_doubles(&mut out, &output)?;
    }
    flush(&mut out)
}

/// Arguments for `gnorm` and `ignorm`.
#[derive(Args, Debug)]
pub struct GainNormalizationArgs {
    /// Order of the cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    order: usize,

    /// Exponent of the generalized logarithm
    #[arg(short = 'g', default_value_t = 0.0, allow_negative_numbers = true)]
    gamma: f64,

    /// Number of stages; sets gamma to -1/C
    #[arg(short = 'c', conflicts_with = "gamma")]
    num_stage: Option<usize>,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_gnorm(args: GainNormalizationArgs) -> Result<()> {
    let gamma = resolve_gamma(args.gamma, args.num_stage)?;
    let gnorm = GainNormalization::new(args.order, gamma);
    if !gnorm.is_valid() {
        bail!("gamma must lie in [-1, 1]");
    }
    map_records(args.input, args.order + 1, |input, output| {
        gnorm
            .run(input, output)
            .context("failed to run gain normalization")
    })
}

pub fn run_ignorm(args: GainNormalizationArgs) -> Result<()> {
    let gamma = resolve_gamma(args.gamma, args.num_stage)?;
    let ignorm = InverseGainNormalization::new(args.order, gamma);
    if !ignorm.is_valid() {
        bail!("gamma must lie in [-1, 1]");
    }
    map_records(args.input, args.order + 1, |input, output| {
        ignorm
            .run(input, output)
            .context("failed to run inverse gain normalization")
    })
}

/// Arguments for `mgc2mgc`.
#[derive(Args, Debug)]
pub struct Mgc2mgcArgs {
    /// Order of the input
    #[arg(short = 'm', default_value_t = 25)]
    input_order: usize,

    /// All-pass constant of the input
    #[arg(short = 'a', default_value_t = 0.0, allow_negative_numbers = true)]
    input_alpha: f64,

    /// Exponent of the input
    #[arg(short = 'g', default_value_t = 0.0, allow_negative_numbers = true)]
    input_gamma: f64,

    /// Number of input stages; sets the input gamma to -1/c
    #[arg(short = 'c', conflicts_with = "input_gamma")]
    input_num_stage: Option<usize>,

    /// Input is gain normalized
    #[arg(short = 'n')]
    input_normalized: bool,

    /// Input is multiplied by gamma
    #[arg(short = 'u')]
    input_multiplied: bool,

    /// Order of the output
    #[arg(short = 'M', default_value_t = 25)]
    output_order: usize,

    /// All-pass constant of the output
    #[arg(short = 'A', default_value_t = 0.0, allow_negative_numbers = true)]
    output_alpha: f64,

    /// Exponent of the output
    #[arg(short = 'G', default_value_t = 1.0, allow_negative_numbers = true)]
    output_gamma: f64,

    /// Number of output stages; sets the output gamma to -1/C
    #[arg(short = 'C', conflicts_with = "output_gamma")]
    output_num_stage: Option<usize>,

    /// Output is gain normalized
    #[arg(short = 'N')]
    output_normalized: bool,

    /// Output is multiplied by gamma
    #[arg(short = 'U')]
    output_multiplied: bool,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_mgc2mgc(args: Mgc2mgcArgs) -> Result<()> {
    let mut input_format = CepstrumFormat::new(
        args.input_order,
        args.input_alpha,
        resolve_gamma(args.input_gamma, args.input_num_stage)?,
    );
    if args.input_normalized {
        input_format = input_format.normalized();
    }
    if args.input_multiplied {
        input_format = input_format.multiplied();
    }
    let mut output_format = CepstrumFormat::new(
        args.output_order,
        args.output_alpha,
        resolve_gamma(args.output_gamma, args.output_num_stage)?,
    );
    if args.output_normalized {
        output_format = output_format.normalized();
    }
    if args.output_multiplied {
        output_format = output_format.multiplied();
    }

    let converter = MelGeneralizedCepstrumConverter::new(input_format, output_format);
    if !converter.is_valid() {
        bail!("failed to initialize mel-generalized cepstrum conversion");
    }
    tracing::debug!(stages = ?converter.stages(), "mgc2mgc pipeline");

    let mut buffer = MelGeneralizedCepstrumConverterBuffer::default();
    map_records(args.input, args.input_order + 1, |input, output| {
        converter
            .run(input, output, &mut buffer)
            .context("failed to convert mel-generalized cepstrum")
    })
}

/// Arguments for `mc2b` and `b2mc`.
#[derive(Args, Debug)]
pub struct MlsaCoefficientsArgs {
    /// Order of the mel-cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    order: usize,

    /// All-pass constant
    #[arg(short = 'a', default_value_t = 0.35, allow_negative_numbers = true)]
    alpha: f64,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_mc2b(args: MlsaCoefficientsArgs) -> Result<()> {
    let mc2b = MelCepstrumToMlsaCoefficients::new(args.order, args.alpha);
    if !mc2b.is_valid() {
        bail!("all-pass constant must satisfy |alpha| < 1");
    }
    map_records(args.input, args.order + 1, |input, output| {
        mc2b.run(input, output)
            .context("failed to convert mel-cepstrum to MLSA filter coefficients")
    })
}

pub fn run_b2mc(args: MlsaCoefficientsArgs) -> Result<()> {
    let b2mc = MlsaCoefficientsToMelCepstrum::new(args.order, args.alpha);
    if !b2mc.is_valid() {
        bail!("all-pass constant must satisfy |alpha| < 1");
    }
    map_records(args.input, args.order + 1, |input, output| {
        b2mc.run(input, output)
            .context("failed to convert MLSA filter coefficients to mel-cepstrum")
    })
}

/// Arguments for `c2acr`.
#[derive(Args, Debug)]
pub struct C2acrArgs {
    /// Order of the cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    input_order: usize,

    /// Order of the autocorrelation
    #[arg(short = 'M', default_value_t = 25)]
    output_order: usize,

    /// FFT length
    #[arg(short = 'l', default_value_t = 256)]
    fft_length: usize,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_c2acr(args: C2acrArgs) -> Result<()> {
    let c2acr = CepstrumToAutocorrelation::new(args.input_order, args.output_order, args.fft_length);
    if !c2acr.is_valid() {
        bail!("orders must be less than the FFT length, a power of two");
    }
    let mut buffer = CepstrumToAutocorrelationBuffer::default();
    map_records(args.input, args.input_order + 1, |input, output| {
        c2acr
            .run(input, output, &mut buffer)
            .context("failed to convert cepstrum to autocorrelation")
    })
}

/// Arguments for `pnorm`.
#[derive(Args, Debug)]
pub struct PnormArgs {
    /// Order of the mel-cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    order: usize,

    /// Impulse response length
    #[arg(short = 'l', default_value_t = 128)]
    impulse_response_length: usize,

    /// All-pass constant
    #[arg(short = 'a', default_value_t = 0.35, allow_negative_numbers = true)]
    alpha: f64,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_pnorm(args: PnormArgs) -> Result<()> {
    let pnorm =
        MelCepstrumPowerNormalization::new(args.order, args.impulse_response_length, args.alpha);
    if !pnorm.is_valid() {
        bail!("failed to initialize power normalization");
    }
    let mut buffer = MelCepstrumPowerNormalizationBuffer::default();
    let mut normalized = Vec::new();
    map_records(args.input, args.order + 1, |input, output| {
        let power = pnorm
            .run(input, &mut normalized, &mut buffer)
            .context("failed to run power normalization")?;
        output.clear();
        output.push(power);
        output.extend_from_slice(&normalized);
        Ok(())
    })
}

/// Arguments for `ipnorm`.
#[derive(Args, Debug)]
pub struct IpnormArgs {
    /// Order of the mel-cepstrum
    #[arg(short = 'm', default_value_t = 25)]
    order: usize,

    /// Input file: power followed by the normalized mel-cepstrum [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_ipnorm(args: IpnormArgs) -> Result<()> {
    let ipnorm = InverseMelCepstrumPowerNormalization::new(args.order);
    map_records(args.input, args.order + 2, |input, output| {
        ipnorm
            .run(input[0], &input[1..], output)
            .context("failed to run inverse power normalization")
    })
}

/// Arguments for `pcas`.
#[derive(Args, Debug)]
pub struct PcasArgs {
    /// Length of the vectors
    #[arg(short = 'l', default_value_t = 25)]
    vector_length: usize,

    /// Number of principal components
    #[arg(short = 'n', default_value_t = 2)]
    num_principal_component: usize,

    /// Mean vector followed by the eigenvectors, one per row
    eigenvector_file: PathBuf,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

pub fn run_pcas(args: PcasArgs) -> Result<()> {
    let length = args.vector_length;
    let count = args.num_principal_component;

    let mut reader = ValueReader::new(open_input(Some(args.eigenvector_file.as_path()))?, DataType::Double);
    let mut mean = Vec::with_capacity(length);
    if reader.read_many(length, &mut mean)? != length {
        bail!("cannot read mean vector");
    }
    let mut eigenvectors = Vec::with_capacity(count * length);
    if reader.read_many(count * length, &mut eigenvectors)? != count * length {
        bail!("cannot read eigenvectors");
    }
    let pcas = PrincipalComponentScores::new(mean, Matrix::from_vec(count, length, eigenvectors)?)
        .context("invalid principal component shape")?;

    map_records(args.input, length, |input, output| {
        pcas.run(input, output)
            .context("failed to compute principal component scores")
    })
}

/// Apply `f` to each `length`-value double record of `input` and write the
/// results to standard output.
fn map_records<F>(input: Option<PathBuf>, length: usize, mut f: F) -> Result<()>
where
    F: FnMut(&[f64], &mut Vec<f64>) -> Result<()>,
{
    let mut reader = double_records(input.as_deref(), length)?;
    let mut out = stdout()?;
    let (mut record, mut output) = (Vec::new(), Vec::new());
    while reader.next_record(&mut record)? {
        f(&record, &mut output)?;
        write_doubles(&mut out, &output)?;
    }
    flush(&mut out)
}
