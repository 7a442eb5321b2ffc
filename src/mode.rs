//! The registry of target display modes.
//!
//! Each [`ModeDescriptor`] names a target resolution, a color budget, and a dithering strategy
//! emulating the graphics of some historical platform. The registry is a `static` table, so it
//! can be read from any number of threads without synchronization.
//!
//! The order of [`MODES`] is the generation order of a batch and is part of the output contract.

use crate::{Error, Result};
use palette::Srgb;
use std::fmt::Display;

/// The default ink color for ink-on-paper modes (cyan, `#00D7D7`).
pub const DEFAULT_INK: Srgb<u8> = Srgb::new(0, 215, 215);

/// The maximum number of colors a rendered mode may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorBudget {
    /// At most this many distinct colors.
    Limited(u16),
    /// Full color, no quantization is performed.
    Unconstrained,
}

impl Display for ColorBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorBudget::Limited(k) => write!(f, "{k}"),
            ColorBudget::Unconstrained => write!(f, "full"),
        }
    }
}

/// How a resized image is reduced to the mode's colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherStrategy {
    /// No dithering. The image is quantized if the [`ColorBudget`] is limited.
    None,
    /// Ordered Bayer dithering to pure black and white.
    Monochrome,
    /// Ordered Bayer dithering of a single `ink` color on a black paper.
    InkOnPaper {
        /// The color painted for "on" pixels.
        ink: Srgb<u8>,
    },
}

impl Display for DitherStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DitherStrategy::None => write!(f, "none"),
            DitherStrategy::Monochrome => write!(f, "ordered monochrome"),
            DitherStrategy::InkOnPaper { ink } => write!(
                f,
                "ordered ink-on-paper #{:02X}{:02X}{:02X}",
                ink.red, ink.green, ink.blue
            ),
        }
    }
}

/// A named target display configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    /// The mode identifier, also used as the output file stem.
    pub id: &'static str,
    /// The target width in pixels.
    pub width: u32,
    /// The target height in pixels.
    pub height: u32,
    /// The maximum number of output colors.
    pub colors: ColorBudget,
    /// The color reduction strategy.
    pub dither: DitherStrategy,
}

impl ModeDescriptor {
    /// Returns the target `(width, height)` of this mode.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// All registered modes in generation order.
pub static MODES: [ModeDescriptor; 5] = [
    ModeDescriptor {
        id: "1bit",
        width: 256,
        height: 192,
        colors: ColorBudget::Limited(2),
        dither: DitherStrategy::Monochrome,
    },
    // ZX Spectrum style, a single ink color over black paper
    ModeDescriptor {
        id: "8bit-basic",
        width: 256,
        height: 192,
        colors: ColorBudget::Limited(2),
        dither: DitherStrategy::InkOnPaper { ink: DEFAULT_INK },
    },
    ModeDescriptor {
        id: "8bit-cpc",
        width: 160,
        height: 200,
        colors: ColorBudget::Limited(16),
        dither: DitherStrategy::None,
    },
    ModeDescriptor {
        id: "8bit-plus",
        width: 320,
        height: 200,
        colors: ColorBudget::Unconstrained,
        dither: DitherStrategy::None,
    },
    ModeDescriptor {
        id: "16bit",
        width: 320,
        height: 224,
        colors: ColorBudget::Unconstrained,
        dither: DitherStrategy::None,
    },
];

/// Returns every registered mode in declaration order.
#[must_use]
pub fn all_modes() -> &'static [ModeDescriptor] {
    &MODES
}

/// Looks up the mode with the given identifier.
///
/// # Errors
/// Returns [`Error::UnknownMode`] if no mode has the identifier `id`.
pub fn describe(id: &str) -> Result<&'static ModeDescriptor> {
    MODES
        .iter()
        .find(|mode| mode.id == id)
        .ok_or_else(|| Error::UnknownMode(id.to_owned()))
}

/// Resolves a list of mode identifiers into descriptors, ordered as in [`MODES`].
///
/// Duplicate identifiers are collapsed.
///
/// # Errors
/// Returns [`Error::UnknownMode`] for the first identifier not in the registry.
pub fn select<S: AsRef<str>>(ids: &[S]) -> Result<Vec<ModeDescriptor>> {
    for id in ids {
        describe(id.as_ref())?;
    }

    Ok(MODES
        .iter()
        .filter(|mode| ids.iter().any(|id| id.as_ref() == mode.id))
        .copied()
        .collect())
}
