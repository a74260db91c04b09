//! Outlier model abstraction used by the anomaly scorer.

use crate::types::FeatureSample;

/// Fixed-width feature vector fed to an [`OutlierModel`].
pub type FeatureVector = [f64; FeatureSample::WIDTH];

/// A model that can be fit on a window of samples and then classify new
/// ones.
///
/// Implementations must be deterministic given their construction
/// parameters and the exact sequence of `fit` calls; the scorer relies on
/// this for reproducible verdicts.
pub trait OutlierModel: Send {
    /// Replaces any previous fit with one over `samples`.
    fn fit(&mut self, samples: &[FeatureVector]);

    /// Whether `fit` has produced a usable model.
    fn is_fitted(&self) -> bool;

    /// Returns `true` if `sample` is classified as an outlier. An unfitted
    /// model classifies nothing as an outlier.
    fn is_outlier(&self, sample: &FeatureVector) -> bool;
}
