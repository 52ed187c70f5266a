pub mod difference;
pub mod otsu;
pub mod tracking;

pub use difference::DifferencePass;
pub use otsu::OtsuPass;
pub use tracking::TrackingPass;
