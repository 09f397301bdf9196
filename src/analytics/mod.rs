//! Pure training analytics over a user's session history.
//!
//! Every function here is deterministic in its inputs: no I/O, no clock, no
//! shared state. Callers fetch history once and pass it in.

pub mod balance;
pub mod comparison;
pub mod estimator;
pub mod load;
pub mod model;
pub mod radar;
pub mod recovery;
pub mod thresholds;
pub mod trend;
