//! Demand signal for the station map: placeholder scoring, severity
//! classification and top-K zone selection. Everything here is pure.

pub mod score;
pub mod severity;
pub mod station;
pub mod zones;

pub use score::*;
pub use severity::*;
pub use station::*;
pub use zones::*;
