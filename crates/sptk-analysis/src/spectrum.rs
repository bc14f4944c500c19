//! Spectra of filter coefficients and conversions between spectral formats.
//!
//! All spectra here are half spectra of `L/2 + 1` bins for an `L`-point
//! transform. The four formats are related by
//!
//! ```text
//! dB = 20 log10 |X|      log = ln |X|      amplitude = |X|      power = |X|²
//! ```

use core::f64::consts::PI;
use core::str::FromStr;

use sptk_core::error::{Error, Result, ensure_length, ensure_valid};
use sptk_core::{NEPER, RealFft, RealFftBuffer, floor_log, floor_log10, is_power_of_two};

/// Representation of a half spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectrumFormat {
    /// `20 log10 |X|`.
    LogAmplitudeInDecibels,
    /// `ln |X|`.
    LogAmplitude,
    /// `|X|`.
    Amplitude,
    /// `|X|²`.
    Power,
}

impl SpectrumFormat {
    /// All formats in command-line index order.
    pub const ALL: [Self; 4] = [
        Self::LogAmplitudeInDecibels,
        Self::LogAmplitude,
        Self::Amplitude,
        Self::Power,
    ];

    /// Format for a command-line index (`0` dB through `3` power).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Apply the relative floor `floor_in_decibels` below the maximum.
    fn apply_floor(self, values: &mut [f64], floor_in_decibels: f64) {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bound = match self {
            Self::LogAmplitudeInDecibels => max + floor_in_decibels,
            Self::LogAmplitude => max + floor_in_decibels / NEPER,
            Self::Amplitude => max * 10f64.powf(0.05 * floor_in_decibels),
            Self::Power => max * 10f64.powf(0.1 * floor_in_decibels),
        };
        for v in values {
            *v = v.max(bound);
        }
    }
}

impl FromStr for SpectrumFormat {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "db" | "0" => Ok(Self::LogAmplitudeInDecibels),
            "log" | "1" => Ok(Self::LogAmplitude),
            "amplitude" | "amp" | "2" => Ok(Self::Amplitude),
            "power" | "3" => Ok(Self::Power),
            other => Err(format!("unknown spectrum format: {other}")),
        }
    }
}

fn convert(from: SpectrumFormat, to: SpectrumFormat, x: f64) -> f64 {
    use SpectrumFormat::{Amplitude, LogAmplitude, LogAmplitudeInDecibels, Power};
    match (from, to) {
        (LogAmplitudeInDecibels, LogAmplitude) => x / NEPER,
        (LogAmplitudeInDecibels, Amplitude) => 10f64.powf(0.05 * x),
        (LogAmplitudeInDecibels, Power) => 10f64.powf(0.1 * x),
        (LogAmplitude, LogAmplitudeInDecibels) => x * NEPER,
        (LogAmplitude, Amplitude) => x.exp(),
        (LogAmplitude, Power) => (2.0 * x).exp(),
        (Amplitude, LogAmplitudeInDecibels) => 20.0 * floor_log10(x),
        (Amplitude, LogAmplitude) => floor_log(x),
        (Amplitude, Power) => x * x,
        (Power, LogAmplitudeInDecibels) => 10.0 * floor_log10(x),
        (Power, LogAmplitude) => 0.5 * floor_log(x),
        (Power, Amplitude) => x.sqrt(),
        _ => x,
    }
}

/// Conversion between [`SpectrumFormat`]s with an additive power floor `ε`
/// and an optional relative floor in dB below the maximum.
#[derive(Debug, Clone)]
pub struct SpectrumToSpectrum {
    fft_length: usize,
    input_format: SpectrumFormat,
    output_format: SpectrumFormat,
    epsilon: f64,
    relative_floor_in_decibels: Option<f64>,
    is_valid: bool,
}

impl SpectrumToSpectrum {
    /// Converter for half spectra of an `fft_length`-point transform.
    pub fn new(
        fft_length: usize,
        input_format: SpectrumFormat,
        output_format: SpectrumFormat,
        epsilon: f64,
        relative_floor_in_decibels: Option<f64>,
    ) -> Self {
        let is_valid = is_power_of_two(fft_length)
            && 0.0 <= epsilon
            && relative_floor_in_decibels.is_none_or(|f| f < 0.0);
        Self {
            fft_length,
            input_format,
            output_format,
            epsilon,
            relative_floor_in_decibels,
            is_valid,
        }
    }

    /// FFT length `L`.
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    /// Input format.
    pub fn input_format(&self) -> SpectrumFormat {
        self.input_format
    }

    /// Output format.
    pub fn output_format(&self) -> SpectrumFormat {
        self.output_format
    }

    /// Whether `L` is a power of two, `ε ≥ 0` and the floor is negative.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Convert `input` (`L/2 + 1` bins).
    pub fn run(&self, input: &[f64], output: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(input.len(), self.fft_length / 2 + 1)?;
        output.clear();
        output.extend_from_slice(input);
        self.convert_in_place(output);
        Ok(())
    }

    /// In-place variant.
    pub fn run_in_place(&self, sequence: &mut [f64]) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(sequence.len(), self.fft_length / 2 + 1)?;
        self.convert_in_place(sequence);
        Ok(())
    }

    fn convert_in_place(&self, values: &mut [f64]) {
        let (from, to) = (self.input_format, self.output_format);
        if self.epsilon == 0.0 {
            for v in values.iter_mut() {
                *v = convert(from, to, *v);
            }
        } else {
            for v in values.iter_mut() {
                let power = convert(from, SpectrumFormat::Power, *v) + self.epsilon;
                *v = convert(SpectrumFormat::Power, to, power);
            }
        }
        if let Some(floor) = self.relative_floor_in_decibels {
            to.apply_floor(values, floor);
        }
    }
}

/// Scratch for [`FilterCoefficientsToSpectrum`] and
/// [`FilterCoefficientsToPhaseSpectrum`].
#[derive(Debug, Clone, Default)]
pub struct FilterCoefficientsToSpectrumBuffer {
    numerator_real: Vec<f64>,
    numerator_imag: Vec<f64>,
    denominator_real: Vec<f64>,
    denominator_imag: Vec<f64>,
    fft: RealFftBuffer,
}

/// Spectrum of `K B(z) / A'(z)` where `K = a[0]` and `A'` is the
/// denominator with its leading coefficient replaced by one.
#[derive(Debug, Clone)]
pub struct FilterCoefficientsToSpectrum {
    num_numerator_order: usize,
    num_denominator_order: usize,
    fft_length: usize,
    numerator_fft: RealFft,
    denominator_fft: RealFft,
    spectrum_to_spectrum: SpectrumToSpectrum,
    is_valid: bool,
}

impl FilterCoefficientsToSpectrum {
    /// Spectrum of order-`Mb`/order-`Ma` filters on an `fft_length` grid.
    pub fn new(
        num_numerator_order: usize,
        num_denominator_order: usize,
        fft_length: usize,
        output_format: SpectrumFormat,
        epsilon: f64,
        relative_floor_in_decibels: Option<f64>,
    ) -> Self {
        let numerator_fft = RealFft::new(num_numerator_order, fft_length);
        let denominator_fft = RealFft::new(num_denominator_order, fft_length);
        let spectrum_to_spectrum = SpectrumToSpectrum::new(
            fft_length,
            SpectrumFormat::Power,
            output_format,
            epsilon,
            relative_floor_in_decibels,
        );
        let is_valid = numerator_fft.is_valid()
            && denominator_fft.is_valid()
            && spectrum_to_spectrum.is_valid();
        Self {
            num_numerator_order,
            num_denominator_order,
            fft_length,
            numerator_fft,
            denominator_fft,
            spectrum_to_spectrum,
            is_valid,
        }
    }

    /// Numerator order `Mb`.
    pub fn num_numerator_order(&self) -> usize {
        self.num_numerator_order
    }

    /// Denominator order `Ma`.
    pub fn num_denominator_order(&self) -> usize {
        self.num_denominator_order
    }

    /// FFT length `L`.
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    /// Whether both orders fit the FFT and the format conversion is valid.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Compute the half spectrum (`L/2 + 1` bins) of `numerator / denominator`.
    ///
    /// Fails with [`Error::InvalidInput`] on a zero gain or a denominator
    /// that vanishes on the grid.
    pub fn run(
        &self,
        numerator: &[f64],
        denominator: &[f64],
        spectrum: &mut Vec<f64>,
        buffer: &mut FilterCoefficientsToSpectrumBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(numerator.len(), self.num_numerator_order + 1)?;
        ensure_length(denominator.len(), self.num_denominator_order + 1)?;

        let gain = denominator[0] * denominator[0];
        if gain == 0.0 {
            return Err(Error::InvalidInput("filter gain is zero"));
        }
        let half = self.fft_length / 2;
        let numerator_is_gain = self.num_numerator_order == 0;
        let denominator_is_gain = self.num_denominator_order == 0;

        if !numerator_is_gain {
            let real = &mut buffer.numerator_real;
            real.clear();
            real.extend_from_slice(numerator);
            self.numerator_fft
                .run_in_place(real, &mut buffer.numerator_imag, &mut buffer.fft)?;
        }
        if !denominator_is_gain {
            let real = &mut buffer.denominator_real;
            real.clear();
            real.push(1.0);
            real.extend_from_slice(&denominator[1..]);
            self.denominator_fft
                .run_in_place(real, &mut buffer.denominator_imag, &mut buffer.fft)?;
        }

        let b0 = numerator[0];
        spectrum.clear();
        for k in 0..=half {
            let numerator_power = if numerator_is_gain {
                b0 * b0
            } else {
                buffer.numerator_real[k].powi(2) + buffer.numerator_imag[k].powi(2)
            };
            let denominator_power = if denominator_is_gain {
                1.0
            } else {
                buffer.denominator_real[k].powi(2) + buffer.denominator_imag[k].powi(2)
            };
            if denominator_power == 0.0 {
                return Err(Error::InvalidInput("denominator has a zero on the grid"));
            }
            spectrum.push(gain * numerator_power / denominator_power);
        }
        self.spectrum_to_spectrum.run_in_place(spectrum)
    }
}

/// Phase response of `B(z) / A'(z)` in units of π.
#[derive(Debug, Clone)]
pub struct FilterCoefficientsToPhaseSpectrum {
    num_numerator_order: usize,
    num_denominator_order: usize,
    fft_length: usize,
    unwrapping: bool,
    numerator_fft: RealFft,
    denominator_fft: RealFft,
    is_valid: bool,
}

impl FilterCoefficientsToPhaseSpectrum {
    /// Phase of order-`Mb`/order-`Ma` filters; `unwrapping` removes the
    /// ±π jumps between neighbouring bins.
    pub fn new(
        num_numerator_order: usize,
        num_denominator_order: usize,
        fft_length: usize,
        unwrapping: bool,
    ) -> Self {
        let numerator_fft = RealFft::new(num_numerator_order, fft_length);
        let denominator_fft = RealFft::new(num_denominator_order, fft_length);
        let is_valid = numerator_fft.is_valid() && denominator_fft.is_valid();
        Self {
            num_numerator_order,
            num_denominator_order,
            fft_length,
            unwrapping,
            numerator_fft,
            denominator_fft,
            is_valid,
        }
    }

    /// Whether both orders fit the FFT.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// FFT length `L`.
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    /// Compute the phase (`L/2 + 1` bins).
    pub fn run(
        &self,
        numerator: &[f64],
        denominator: &[f64],
        phase: &mut Vec<f64>,
        buffer: &mut FilterCoefficientsToSpectrumBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(numerator.len(), self.num_numerator_order + 1)?;
        ensure_length(denominator.len(), self.num_denominator_order + 1)?;

        let FilterCoefficientsToSpectrumBuffer {
            numerator_real,
            numerator_imag,
            denominator_real,
            denominator_imag,
            fft,
        } = buffer;
        numerator_real.clear();
        numerator_real.extend_from_slice(numerator);
        self.numerator_fft
            .run_in_place(numerator_real, numerator_imag, fft)?;
        denominator_real.clear();
        denominator_real.push(1.0);
        denominator_real.extend_from_slice(&denominator[1..]);
        self.denominator_fft
            .run_in_place(denominator_real, denominator_imag, fft)?;

        phase.clear();
        let mut offset = 0.0;
        for k in 0..=self.fft_length / 2 {
            let (xr, xi) = (numerator_real[k], numerator_imag[k]);
            let (yr, yi) = (denominator_real[k], denominator_imag[k]);
            let mut value = (xi * yr - xr * yi).atan2(xr * yr + xi * yi) / PI;
            if self.unwrapping && 0 < k {
                let diff = value - phase[k - 1] + offset;
                if 1.0 < diff {
                    offset -= 2.0;
                } else if diff < -1.0 {
                    offset += 2.0;
                }
                value += offset;
            }
            phase.push(value);
        }
        Ok(())
    }
}

/// Spectrum of a windowed waveform frame.
#[derive(Debug, Clone)]
pub struct WaveformToSpectrum {
    frame_length: usize,
    filter_coefficients_to_spectrum: FilterCoefficientsToSpectrum,
}

impl WaveformToSpectrum {
    /// Spectrum of `frame_length`-sample frames on an `fft_length` grid.
    pub fn new(
        frame_length: usize,
        fft_length: usize,
        output_format: SpectrumFormat,
        epsilon: f64,
        relative_floor_in_decibels: Option<f64>,
    ) -> Self {
        Self {
            frame_length,
            filter_coefficients_to_spectrum: FilterCoefficientsToSpectrum::new(
                frame_length.saturating_sub(1),
                0,
                fft_length,
                output_format,
                epsilon,
                relative_floor_in_decibels,
            ),
        }
    }

    /// Frame length.
    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Whether the frame fits the FFT and the format conversion is valid.
    pub fn is_valid(&self) -> bool {
        0 < self.frame_length && self.filter_coefficients_to_spectrum.is_valid()
    }

    /// Compute the half spectrum of `waveform`.
    pub fn run(
        &self,
        waveform: &[f64],
        spectrum: &mut Vec<f64>,
        buffer: &mut FilterCoefficientsToSpectrumBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid())?;
        self.filter_coefficients_to_spectrum
            .run(waveform, &[1.0], spectrum, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_conversions() {
        use SpectrumFormat::*;
        let cases = [
            (LogAmplitudeInDecibels, Power, 20.0, 100.0),
            (LogAmplitudeInDecibels, Amplitude, 20.0, 10.0),
            (Amplitude, LogAmplitudeInDecibels, 100.0, 40.0),
            (Power, Amplitude, 9.0, 3.0),
            (Power, LogAmplitude, 1f64.exp(), 0.5),
            (LogAmplitude, Power, 0.5, 1f64.exp()),
            (LogAmplitude, LogAmplitudeInDecibels, 1.0, NEPER),
        ];
        for (from, to, x, expected) in cases {
            let y = convert(from, to, x);
            assert!((y - expected).abs() < 1e-12, "{from:?} -> {to:?}: {y}");
        }
    }

    #[test]
    fn test_epsilon_and_floor() {
        let s2s = SpectrumToSpectrum::new(
            8,
            SpectrumFormat::Power,
            SpectrumFormat::LogAmplitudeInDecibels,
            1.0,
            Some(-20.0),
        );
        let mut out = Vec::new();
        s2s.run(&[0.0, 99.0, 9999.0, 0.0, 0.0], &mut out).unwrap();
        // 10 log10(1) = 0 is floored at 40 - 20
        assert!((out[0] - 20.0).abs() < 1e-12);
        assert!((out[1] - 20.0).abs() < 1e-12);
        assert!((out[2] - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_converter() {
        let p = SpectrumFormat::Power;
        assert!(!SpectrumToSpectrum::new(6, p, p, 0.0, None).is_valid());
        assert!(!SpectrumToSpectrum::new(8, p, p, -1.0, None).is_valid());
        assert!(!SpectrumToSpectrum::new(8, p, p, 0.0, Some(0.0)).is_valid());
        assert_eq!(SpectrumFormat::from_index(2), Some(SpectrumFormat::Amplitude));
        assert_eq!(SpectrumFormat::from_index(4), None);
        assert_eq!("db".parse::<SpectrumFormat>(), Ok(SpectrumFormat::LogAmplitudeInDecibels));
    }

    #[test]
    fn test_one_pole_spectrum() {
        // 2 / (1 - 0.5 z⁻¹): |H(0)|² = 16, |H(π)|² = 16 / 9
        let f2s = FilterCoefficientsToSpectrum::new(0, 1, 8, SpectrumFormat::Power, 0.0, None);
        let mut spectrum = Vec::new();
        f2s.run(
            &[1.0],
            &[2.0, -0.5],
            &mut spectrum,
            &mut FilterCoefficientsToSpectrumBuffer::default(),
        )
        .unwrap();
        assert_eq!(spectrum.len(), 5);
        assert!((spectrum[0] - 16.0).abs() < 1e-12);
        assert!((spectrum[4] - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_gain_fails() {
        let f2s = FilterCoefficientsToSpectrum::new(1, 0, 8, SpectrumFormat::Power, 0.0, None);
        let mut spectrum = Vec::new();
        assert!(matches!(
            f2s.run(
                &[1.0, 1.0],
                &[0.0],
                &mut spectrum,
                &mut FilterCoefficientsToSpectrumBuffer::default()
            ),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_waveform_impulse_is_flat() {
        let w2s = WaveformToSpectrum::new(4, 16, SpectrumFormat::Amplitude, 0.0, None);
        let mut spectrum = Vec::new();
        w2s.run(
            &[1.0, 0.0, 0.0, 0.0],
            &mut spectrum,
            &mut FilterCoefficientsToSpectrumBuffer::default(),
        )
        .unwrap();
        assert!(spectrum.iter().all(|v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_delay_phase_unwraps() {
        // z⁻³ has phase -3ω, wrapping twice over [0, π]
        let mut buffer = FilterCoefficientsToSpectrumBuffer::default();
        let mut wrapped = Vec::new();
        FilterCoefficientsToPhaseSpectrum::new(3, 0, 16, false)
            .run(&[0.0, 0.0, 0.0, 1.0], &[1.0], &mut wrapped, &mut buffer)
            .unwrap();
        assert!(wrapped.iter().all(|p| p.abs() <= 1.0 + 1e-12));

        let mut unwrapped = Vec::new();
        FilterCoefficientsToPhaseSpectrum::new(3, 0, 16, true)
            .run(&[0.0, 0.0, 0.0, 1.0], &[1.0], &mut unwrapped, &mut buffer)
            .unwrap();
        for (k, p) in unwrapped.iter().enumerate() {
            let expected = -3.0 * k as f64 / 8.0;
            assert!((p - expected).abs() < 1e-9, "bin {k}: {p}");
        }
    }
}
