//! Renders one source image into a whole set of modes.

use crate::{ModeDescriptor, ModePipeline, Result};
use image::RgbImage;

/// A rendered image tagged with the mode it was rendered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOutput {
    /// The mode used to render [`ModeOutput::image`].
    pub mode: ModeDescriptor,
    /// The rendered image, with dimensions `mode.dimensions()`.
    pub image: RgbImage,
}

/// The outputs of a batch, one per requested mode in the requested order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModeOutputSet(Vec<ModeOutput>);

impl ModeOutputSet {
    /// Returns the number of outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set has no outputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the output for the mode with the given identifier, if any.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ModeOutput> {
        self.0.iter().find(|output| output.mode.id == id)
    }

    /// Returns an iterator over the outputs.
    pub fn iter(&self) -> std::slice::Iter<'_, ModeOutput> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ModeOutputSet {
    type Item = &'a ModeOutput;
    type IntoIter = std::slice::Iter<'a, ModeOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ModeOutputSet {
    type Item = ModeOutput;
    type IntoIter = std::vec::IntoIter<ModeOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl ModePipeline {
    /// Renders `source` into each of `modes` in order.
    ///
    /// Stops at the first mode that fails, so no partial set is returned.
    ///
    /// # Errors
    /// Returns the error of the first failing mode, see [`ModePipeline::render`].
    pub fn render_all(&self, source: &RgbImage, modes: &[ModeDescriptor]) -> Result<ModeOutputSet> {
        let outputs = modes
            .iter()
            .map(|mode| -> Result<ModeOutput> {
                let image = self.render(source, mode)?;
                tracing::info!(mode = mode.id, width = mode.width, height = mode.height, "generated");
                Ok(ModeOutput { mode: *mode, image })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ModeOutputSet(outputs))
    }

    /// Renders `source` into each of `modes`, with the modes processed in parallel.
    ///
    /// The outputs are in the same order as `modes` and identical to [`ModePipeline::render_all`].
    ///
    /// # Errors
    /// If any mode fails, returns the error of the earliest failing mode in `modes`.
    #[cfg(feature = "threads")]
    pub fn render_all_par(&self, source: &RgbImage, modes: &[ModeDescriptor]) -> Result<ModeOutputSet> {
        use rayon::prelude::*;

        let results = modes
            .par_iter()
            .map(|mode| -> Result<ModeOutput> {
                let image = self.render_par(source, mode)?;
                tracing::info!(mode = mode.id, width = mode.width, height = mode.height, "generated");
                Ok(ModeOutput { mode: *mode, image })
            })
            .collect::<Vec<Result<_>>>();

        let outputs = results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(ModeOutputSet(outputs))
    }
}

/// Renders `source` into each of `modes` in order with the default [`ModePipeline`].
///
/// # Errors
/// See [`ModePipeline::render_all`].
pub fn generate_all(source: &RgbImage, modes: &[ModeDescriptor]) -> Result<ModeOutputSet> {
    ModePipeline::new().render_all(source, modes)
}

/// Renders `source` into each of `modes` in parallel with the default [`ModePipeline`].
///
/// # Errors
/// See [`ModePipeline::render_all_par`].
#[cfg(feature = "threads")]
pub fn generate_all_par(source: &RgbImage, modes: &[ModeDescriptor]) -> Result<ModeOutputSet> {
    ModePipeline::new().render_all_par(source, modes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{all_modes, tests::*, ColorBudget, DitherStrategy, Error};
    use std::collections::HashSet;

    #[test]
    fn all_modes_in_order() {
        let source = noise_image(640, 480);
        let set = generate_all(&source, all_modes()).unwrap();

        assert_eq!(set.len(), all_modes().len());
        let ids = set.iter().map(|output| output.mode.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), set.len());

        for (output, mode) in set.iter().zip(all_modes()) {
            assert_eq!(&output.mode, mode);
            assert_eq!(output.image.dimensions(), mode.dimensions());
        }

        assert_eq!(set.get("8bit-cpc").unwrap().image.dimensions(), (160, 200));
        assert!(set.get("4bit").is_none());
    }

    #[test]
    fn empty_mode_list() {
        let set = generate_all(&noise_image(8, 8), &[]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn fails_fast() {
        let broken = ModeDescriptor {
            id: "broken",
            width: 16,
            height: 16,
            colors: ColorBudget::Limited(1),
            dither: DitherStrategy::None,
        };
        let modes = [all_modes()[0], broken, all_modes()[1]];
        let result = generate_all(&noise_image(32, 32), &modes);
        assert!(matches!(result, Err(Error::InvalidColorBudget(1))));
    }

    #[test]
    fn empty_source() {
        let result = generate_all(&RgbImage::new(0, 0), all_modes());
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let source = noise_image(300, 200);
        assert_eq!(
            generate_all(&source, all_modes()).unwrap(),
            generate_all_par(&source, all_modes()).unwrap()
        );
    }

    #[test]
    #[cfg(feature = "threads")]
    fn parallel_reports_earliest_error() {
        let zero_width = ModeDescriptor {
            id: "zero",
            width: 0,
            height: 8,
            colors: ColorBudget::Unconstrained,
            dither: DitherStrategy::None,
        };
        let bad_budget = ModeDescriptor {
            id: "budget",
            width: 8,
            height: 8,
            colors: ColorBudget::Limited(0),
            dither: DitherStrategy::None,
        };
        let result = generate_all_par(&noise_image(16, 16), &[all_modes()[0], zero_width, bad_budget]);
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }
}
