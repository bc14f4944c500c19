//! SPTK CLI - speech signal processing tools over binary streams.

mod commands;

use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sptk")]
#[command(author, version, about = "Speech signal processing toolkit", long_about = None)]
struct Cli {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// FFT of a complex sequence
    Fft(commands::fft::FftArgs),

    /// Inverse FFT of a complex sequence
    Ifft(commands::fft::IfftArgs),

    /// FFT of a real sequence
    Fftr(commands::fft::FftrArgs),

    /// Inverse FFT of a real sequence
    Ifftr(commands::fft::IfftrArgs),

    /// 2D FFT of a complex matrix
    Fft2(commands::fft::Fft2Args),

    /// 2D inverse FFT of a complex matrix
    Ifft2(commands::fft::Ifft2Args),

    /// 2D FFT of a real matrix
    Fftr2(commands::fft::Fftr2Args),

    /// Frequency transform of a mel-cepstrum
    Freqt(commands::transform::FreqtArgs),

    /// Gain normalization of a generalized cepstrum
    Gnorm(commands::transform::GainNormalizationArgs),

    /// Inverse gain normalization
    Ignorm(commands::transform::GainNormalizationArgs),

    /// Mel-generalized cepstrum conversion
    Mgc2mgc(commands::transform::Mgc2mgcArgs),

    /// Mel-cepstrum to MLSA filter coefficients
    Mc2b(commands::transform::MlsaCoefficientsArgs),

    /// MLSA filter coefficients to mel-cepstrum
    B2mc(commands::transform::MlsaCoefficientsArgs),

    /// Cepstrum to autocorrelation
    C2acr(commands::transform::C2acrArgs),

    /// Power normalization of a mel-cepstrum
    Pnorm(commands::transform::PnormArgs),

    /// Inverse power normalization
    Ipnorm(commands::transform::IpnormArgs),

    /// Principal component scores
    Pcas(commands::transform::PcasArgs),

    /// FFT-based cepstral analysis
    Fftcep(commands::analysis::FftcepArgs),

    /// Mel-generalized cepstral analysis
    Mgcep(commands::analysis::MgcepArgs),

    /// Mel-cepstral analysis with a second-order all-pass warp
    Smcep(commands::analysis::SmcepArgs),

    /// Adaptive generalized cepstral analysis
    Agcep(commands::analysis::AgcepArgs),

    /// Stability check of the MLSA filter
    Mlsacheck(commands::mlsacheck::MlsacheckArgs),

    /// Data type conversion
    X2x(commands::stream::X2xArgs),

    /// Cut blocks out of a binary stream
    Bcut(commands::stream::BcutArgs),

    /// Copy a range of each block into a new block
    Bcp(commands::stream::BcpArgs),

    /// Merge frames of two streams
    Merge(commands::stream::MergeArgs),

    /// Swap bytes
    Swab(commands::stream::SwabArgs),

    /// Dump a binary stream as text
    Dmp(commands::stream::DmpArgs),

    /// Transpose matrices
    Transpose(commands::stream::TransposeArgs),

    /// List and show analysis presets
    Presets(commands::presets::PresetsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SPTK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    use commands::{analysis, fft, mlsacheck, presets, stream, transform};

    match command {
        Commands::Fft(args) => fft::run_fft(args),
        Commands::Ifft(args) => fft::run_ifft(args),
        Commands::Fftr(args) => fft::run_fftr(args),
        Commands::Ifftr(args) => fft::run_ifftr(args),
        Commands::Fft2(args) => fft::run_fft2(args),
        Commands::Ifft2(args) => fft::run_ifft2(args),
        Commands::Fftr2(args) => fft::run_fftr2(args),
        Commands::Freqt(args) => transform::run_freqt(args),
        Commands::Gnorm(args) => transform::run_gnorm(args),
        Commands::Ignorm(args) => transform::run_ignorm(args),
        Commands::Mgc2mgc(args) => transform::run_mgc2mgc(args),
        Commands::Mc2b(args) => transform::run_mc2b(args),
        Commands::B2mc(args) => transform::run_b2mc(args),
        Commands::C2acr(args) => transform::run_c2acr(args),
        Commands::Pnorm(args) => transform::run_pnorm(args),
        Commands::Ipnorm(args) => transform::run_ipnorm(args),
        Commands::Pcas(args) => transform::run_pcas(args),
        Commands::Fftcep(args) => analysis::run_fftcep(args),
        Commands::Mgcep(args) => analysis::run_mgcep(args),
        Commands::Smcep(args) => analysis::run_smcep(args),
        Commands::Agcep(args) => analysis::run_agcep(args),
        Commands::Mlsacheck(args) => mlsacheck::run(args),
        Commands::X2x(args) => stream::run_x2x(args),
        Commands::Bcut(args) => stream::run_bcut(args),
        Commands::Bcp(args) => stream::run_bcp(args),
        Commands::Merge(args) => stream::run_merge(args),
        Commands::Swab(args) => stream::run_swab(args),
        Commands::Dmp(args) => stream::run_dmp(args),
        Commands::Transpose(args) => stream::run_transpose(args),
        Commands::Presets(args) => presets::run(args),
    }
}

fn main() -> ExitCode {
    let matches = match Cli::command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let tool = matches.subcommand_name().unwrap_or("sptk").to_string();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sptk {tool}: {e:#}");
            ExitCode::FAILURE
        }
    }
}
