//! Simulation dynamics: gravity integration and the raycast sweep.

pub mod integrator;
pub mod sweep;

pub use integrator::Integrator;
pub use sweep::SimulateOutcome;
