//! Parrot/neon theme tokens for the FundLens TUI
//!
//! Provides a consistent color palette inspired by:
//! - Parrot color scheme (neon accents on dark background)
//! - Terminal aesthetic with high contrast
//!
//! # Color Palette
//! - **Background**: Near-black / deep charcoal (base layer)
//! - **Accent**: Electric cyan (primary highlights, focus)
//! - **Positive**: Neon green (shorts pay, strong opportunities)
//! - **Negative**: Hot pink (longs pay, failures)
//! - **Warning**: Neon orange (alerts, pending loads)
//! - **Neutral**: Cool purple (secondary info, neutral states)
//! - **Muted**: Steel blue (disabled, secondary text)
//!
//! Rank emphasis backgrounds are not part of the palette; they come from
//! `fundlens_core::color` and are converted with [`rgb`].

use ratatui::style::{Color, Modifier, Style};

use fundlens_core::color::Rgb;
use fundlens_core::format::{ArbitrageTier, RateDirection};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);

/// Parrot/neon theme for the FundLens TUI
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Near-black background (primary surface)
    pub background: Color,
    /// Electric cyan accent (focus, highlights)
    pub accent: Color,
    /// Neon green
    pub positive: Color,
    /// Hot pink
    pub negative: Color,
    /// Neon orange (warnings, alerts)
    pub warning: Color,
    /// Cool purple (neutral info, secondary)
    pub neutral: Color,
    /// Steel blue (muted text, disabled)
    pub muted: Color,
    /// White (primary text)
    pub text_primary: Color,
    /// Light gray (secondary text)
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    /// Create the default Parrot/neon theme
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: ACCENT,
            positive: POSITIVE,
            negative: NEGATIVE,
            warning: WARNING,
            neutral: NEUTRAL,
            muted: MUTED,
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Color for a funding rate: longs paying is pink, shorts paying is green.
    pub fn rate_color(&self, rate: f64) -> Color {
        match RateDirection::of(rate) {
            RateDirection::LongsPay => self.negative,
            RateDirection::ShortsPay => self.positive,
            RateDirection::Balanced => self.text_secondary,
        }
    }

    /// Color for an annualized arbitrage yield.
    pub fn tier_color(&self, tier: ArbitrageTier) -> Color {
        match tier {
            ArbitrageTier::Exceptional => self.positive,
            ArbitrageTier::Strong => self.accent,
            ArbitrageTier::Moderate => self.warning,
            ArbitrageTier::Low => self.muted,
        }
    }
}

/// Convert a rank emphasis color.
pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

/// Style for a cell painted with a rank emphasis background.
pub fn emphasized(background: Rgb) -> Style {
    Style::default()
        .bg(rgb(background))
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn rate(rate: f64) -> Style {
    Style::default().fg(Theme::default().rate_color(rate))
}

pub fn tier(tier: ArbitrageTier) -> Style {
    Style::default().fg(Theme::default().tier_color(tier))
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Header cell style; the active sort column is highlighted.
pub fn header(sorted: bool) -> Style {
    if sorted {
        accent_bold().add_modifier(Modifier::UNDERLINED)
    } else {
        neutral().add_modifier(Modifier::BOLD)
    }
}
