//! Stochastic arrivals.

mod poisson;

pub use poisson::ArrivalProcess;
