//! Cell emphasis colours derived from a rank.
//!
//! The top 30% of distinct positive values are tinted green and the bottom 30%
//! of distinct negative values are tinted red; the most extreme value gets the
//! deepest shade. Zero never receives emphasis.

use crate::rank::RankInfo;

/// 8-bit RGB background colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn css(self) -> String {
        format!("rgb({},{},{})", self.0, self.1, self.2)
    }
}

/// Which emphasis scale a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// High positive values (green scale).
    Positive,
    /// High-magnitude negative values (red scale).
    Negative,
}

const GREEN_BASE: [f64; 3] = [220.0, 252.0, 231.0];
const GREEN_DEEP: [f64; 3] = [16.0, 185.0, 129.0];
const RED_BASE: [f64; 3] = [254.0, 226.0, 226.0];
const RED_DEEP: [f64; 3] = [239.0, 68.0, 68.0];

const TOP_FRACTION: f64 = 0.3;
const BOTTOM_FRACTION: f64 = 0.7;

/// Interpolation fraction toward the deep colour: 1.0 at rank 0.
pub fn intensity(rank: usize, total: usize) -> f64 {
    if total <= 1 {
        return 1.0;
    }
    let cutoff = (total as f64 * TOP_FRACTION).floor() as i64;
    let span = (cutoff - 1).max(1) as f64;
    1.0 - rank as f64 / span
}

/// Background colour for `rank` out of `total` distinct values.
///
/// Callers only pass ranks inside the 30% band (see [`emphasis`]); for the
/// negative bucket the rank is re-based so the most negative value is 0.
pub fn cell_background(rank: usize, total: usize, bucket: Bucket) -> Rgb {
    let percent = intensity(rank, total);
    let (base, deep) = match bucket {
        Bucket::Positive => (GREEN_BASE, GREEN_DEEP),
        Bucket::Negative => (RED_BASE, RED_DEEP),
    };
    let channel = |i: usize| {
        let v = base[i] + (deep[i] - base[i]) * percent;
        // Half-up rounding per channel.
        (v + 0.5).floor().clamp(0.0, 255.0) as u8
    };
    Rgb(channel(0), channel(1), channel(2))
}

/// Decide whether a value gets a background override, and which.
pub fn emphasis(value: f64, info: &RankInfo) -> Option<Rgb> {
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    let RankInfo { rank, total, .. } = *info;
    let green_line = (total as f64 * TOP_FRACTION).floor() as usize;
    let red_line = (total as f64 * BOTTOM_FRACTION).floor() as usize;

    if value > 0.0 && rank < green_line {
        Some(cell_background(rank, total, Bucket::Positive))
    } else if value < 0.0 && rank >= red_line {
        let rebased = total.saturating_sub(1).saturating_sub(rank);
        Some(cell_background(rebased, total, Bucket::Negative))
    } else {
        None
    }
}
