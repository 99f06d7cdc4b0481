pub mod detector;
pub mod strategy;
pub mod telemetry;

pub use detector::{DetectionResult, SelectorDriftDetector};
pub use strategy::{SelectorSpec, SelectorStrategy, StrategyValidation};
pub use telemetry::{DriftEvent, DriftTelemetry};
