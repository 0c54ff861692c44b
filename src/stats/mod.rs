//! Derived statistics: correlation matrices, histograms, scales.

pub mod correlation;
pub mod histogram;
pub mod scale;

pub use correlation::{CorrelationMatrix, correlation_matrix};
pub use histogram::histogram;
pub use scale::{AxisScales, LinearScale, PointScale};
