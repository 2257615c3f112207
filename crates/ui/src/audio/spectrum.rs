//! Dominant-frequency extraction and bar layout for one analyser frame

use lightdeck_protocol::FrequencySample;

/// FFT window used by the analyser node
pub const DEFAULT_FFT_SIZE: u32 = 2048;

/// Index of the loudest bin. Ties go to the lowest index; an all-zero
/// buffer yields 0.
pub fn dominant_bin(magnitudes: &[u8]) -> usize {
    let mut max_index = 0;
    let mut max_value = 0;
    for (i, &m) in magnitudes.iter().enumerate() {
        if m > max_value {
            max_value = m;
            max_index = i;
        }
    }
    max_index
}

/// Approximate center frequency of `index` among `bin_count` bins
#[allow(clippy::cast_precision_loss)]
pub fn bin_frequency(index: usize, sample_rate: f64, bin_count: usize) -> f64 {
    if bin_count == 0 {
        return 0.0;
    }
    index as f64 * sample_rate / (2.0 * bin_count as f64)
}

pub fn dominant_frequency(magnitudes: &[u8], sample_rate: f64) -> FrequencySample {
    FrequencySample {
        frequency: bin_frequency(dominant_bin(magnitudes), sample_rate, magnitudes.len()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Loud bins shade toward red, quiet ones toward green
pub const fn bar_color(magnitude: u8) -> Rgb {
    Rgb(magnitude, 255 - magnitude, 100)
}

/// One rectangle of the spectrum chart, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

/// Bars for a `width` x `height` canvas, one per bin, bottom-aligned
#[allow(clippy::cast_precision_loss)]
pub fn bars(magnitudes: &[u8], width: f64, height: f64) -> impl Iterator<Item = Bar> + '_ {
    let bar_width = if magnitudes.is_empty() {
        0.0
    } else {
        width / magnitudes.len() as f64
    };
    magnitudes.iter().enumerate().map(move |(i, &m)| {
        let bar_height = f64::from(m) / 255.0 * height;
        Bar {
            x: i as f64 * bar_width,
            y: height - bar_height,
            width: bar_width,
            height: bar_height,
            color: bar_color(m),
        }
    })
}
