//! Pixel format negotiation.
//!
//! The picker walks the Cartesian product of per-axis candidate lists like an
//! odometer: the first axis of the reduction order changes fastest, and every
//! axis restarts at the candidate matching its requested value.

use arrayvec::ArrayVec;
use canvas3_types::{PixelFormat, PixelFormatValue};
use smallvec::SmallVec;

use crate::config::ConfigSource;

pub const DEFAULT_REDUCTION_ORDER: &str = "ACmasdc";

const REDUCTION_ORDER_KEY: &str = "Video.OpenGL.FormatPicker.ReductionOrder";

/// Requested value and config key for every axis except color, whose request
/// is the canvas depth.
const START_VALUES: [(PixelFormatValue, &str, i32); 6] = [
    (PixelFormatValue::AlphaBits, "Video.OpenGL.AlphaBits", 8),
    (PixelFormatValue::DepthBits, "Video.OpenGL.DepthBits", 32),
    (PixelFormatValue::StencilBits, "Video.OpenGL.StencilBits", 8),
    (PixelFormatValue::AccumColorBits, "Video.OpenGL.AccumColorBits", 0),
    (PixelFormatValue::AccumAlphaBits, "Video.OpenGL.AccumAlphaBits", 0),
    (PixelFormatValue::MultiSamples, "Video.OpenGL.MultiSamples", 0),
];

/// One position of a mixed-radix counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OdometerDigit {
    pub value: usize,
    /// Where the digit restarts after wrapping.
    pub first: usize,
    pub radix: usize,
}

pub type OdometerDigits = ArrayVec<OdometerDigit, { PixelFormatValue::COUNT }>;

/// Advances the counter by one step, least significant digit first.
///
/// Returns the next digits and whether the counter wrapped around, which
/// means every combination has been visited.
pub fn increment(digits: &OdometerDigits) -> (OdometerDigits, bool) {
    let mut next = digits.clone();
    for digit in &mut next {
        digit.value += 1;
        if digit.value < digit.radix {
            return (next, false);
        }
        digit.value = digit.first;
    }
    (next, true)
}

/// Parses a comma separated candidate list, largest first.
///
/// Entries that are not plain integers are skipped. A list without a single
/// valid entry becomes `[0]`.
pub fn parse_candidates(list: &str) -> SmallVec<[i32; 8]> {
    let mut candidates: SmallVec<[i32; 8]> = list
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.parse().ok())
        .collect();
    if candidates.is_empty() {
        candidates.push(0);
    }
    candidates.sort_unstable_by(|a, b| b.cmp(a));
    candidates
}

/// Parses a reduction order string into a full traversal order.
///
/// Unknown letters and repeats are ignored; axes the string leaves out are
/// appended in their natural order so every axis is counted exactly once.
pub fn parse_reduction_order(order: &str) -> ArrayVec<PixelFormatValue, { PixelFormatValue::COUNT }> {
    let mut traversal = ArrayVec::new();
    for c in order.chars() {
        match PixelFormatValue::from_order_char(c) {
            Some(value) if !traversal.contains(&value) => traversal.push(value),
            Some(_) => {}
            None => log::debug!("Ignoring unknown pixel format reduction letter {c:?}"),
        }
    }
    for value in PixelFormatValue::ALL {
        if !traversal.contains(&value) {
            traversal.push(value);
        }
    }
    traversal
}

#[derive(Debug, Clone)]
struct Axis {
    value: PixelFormatValue,
    candidates: SmallVec<[i32; 8]>,
}

/// Enumerates pixel formats to try, best first.
#[derive(Debug, Clone, Default)]
pub struct PixelFormatPicker {
    /// In traversal order.
    axes: ArrayVec<Axis, { PixelFormatValue::COUNT }>,
    /// Position of the format staged after the current one.
    digits: OdometerDigits,
    staged: Option<PixelFormat>,
    wrapped: bool,
}

impl PixelFormatPicker {
    pub fn new(config: &dyn ConfigSource, color_depth: i32) -> Self {
        let mut picker = Self::default();
        picker.reset(config, color_depth);
        picker
    }

    /// Rereads the configuration and starts over with the best format.
    pub fn reset(&mut self, config: &dyn ConfigSource, color_depth: i32) {
        let mut requested = PixelFormat::default();
        requested[PixelFormatValue::ColorBits] = color_depth;
        for (value, key, default) in START_VALUES {
            requested[value] = config.get_int(key, default);
        }

        let order = config.get_str_or(REDUCTION_ORDER_KEY, DEFAULT_REDUCTION_ORDER);
        self.axes.clear();
        self.digits.clear();
        for value in parse_reduction_order(order) {
            let key = format!("Video.OpenGL.FormatPicker.{}", value.config_name());
            let candidates = parse_candidates(config.get_str_or(&key, ""));
            if candidates.as_slice() == [0] {
                log::trace!("No {} candidates configured, using 0", value.name());
            }

            let first = candidates
                .iter()
                .position(|&candidate| candidate <= requested[value])
                .unwrap_or(candidates.len() - 1);
            self.digits.push(OdometerDigit {
                value: first,
                first,
                radix: candidates.len(),
            });
            self.axes.push(Axis { value, candidates });
        }

        self.wrapped = false;
        self.staged = Some(self.current());
        self.advance();
    }

    fn current(&self) -> PixelFormat {
        let mut format = PixelFormat::default();
        for (axis, digit) in self.axes.iter().zip(&self.digits) {
            format[axis.value] = axis.candidates[digit.value];
        }
        format
    }

    fn advance(&mut self) {
        let (next, wrapped) = increment(&self.digits);
        self.digits = next;
        self.wrapped = wrapped;
    }

    /// The next format to try, or `None` once every combination was handed
    /// out. Stays `None` until the next [`PixelFormatPicker::reset`].
    pub fn next_format(&mut self) -> Option<PixelFormat> {
        let format = self.staged.take()?;
        if !self.wrapped {
            self.staged = Some(self.current());
            self.advance();
        }
        Some(format)
    }
}

impl Iterator for PixelFormatPicker {
    type Item = PixelFormat;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_format()
    }
}
