//! Contains various types needed across the crate.

use crate::{Error, MAX_COLORS, MIN_COLORS};
use std::fmt::Display;

/// This type is used to specify the maximum number of colors a quantized image may use.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// in the range [`MIN_COLORS`]`..=`[`MAX_COLORS`].
///
/// # Examples
/// Use `try_into` or [`PaletteSize::from_clamped`] to create [`PaletteSize`]s.
///
/// ```
/// # use retromodes::{PaletteSize, Error};
/// # fn main() -> Result<(), Error> {
/// let size = PaletteSize::try_from(16u16)?;
/// let size: PaletteSize = 16u16.try_into()?;
/// let size = PaletteSize::from_clamped(1024);
/// assert_eq!(size, PaletteSize::MAX);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The smallest supported palette size (given by [`MIN_COLORS`]).
    pub const MIN: Self = Self(MIN_COLORS);

    /// The largest supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Gets the inner value as a `usize` for array and `Vec` lengths.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` into the supported range.
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value < MIN_COLORS {
            Self::MIN
        } else if value > MAX_COLORS {
            Self::MAX
        } else {
            Self(value)
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if (MIN_COLORS..=MAX_COLORS).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidColorBudget(value))
        }
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}
