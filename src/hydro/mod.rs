pub mod eos;
pub mod error;
pub mod euler;
pub mod geometry;
pub mod metric;
pub mod relativistic;
pub mod riemann;
