/**
 * Error to represent invalid hydrodynamics data, failed primitive variable
 * recovery, or an invalid physics setup.
 */
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("negative mass density: {0:.4e}")]
    NegativeMassDensity(f64),

    #[error("negative gas pressure: {0:.4e}")]
    NegativeGasPressure(f64),

    #[error("primitive recovery failed to converge after {iterations} iterations")]
    RootFinderFailed { iterations: usize },

    #[error("invalid equation of state: {0}")]
    InvalidEquationOfState(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{source} in block {block} at zone {index:?}")]
    Zone {
        source: Box<Error>,
        block: usize,
        index: (i64, i64, i64),
    },
}

impl Error {
    pub fn at_zone(self, block: usize, index: (i64, i64, i64)) -> Self {
        Error::Zone { source: Box::new(self), block, index }
    }
}
