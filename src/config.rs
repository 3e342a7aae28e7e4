use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::hydro::eos::{Dynamics, EquationOfState, Thermodynamics};
use crate::hydro::error::Error;




/**
 * Blending weights of one Runge-Kutta stage: the stage writes
 * `u0 <- gam0 u0 + gam1 u1 - beta dt div(F)`, where `u0` is the state being
 * advanced and `u1` the register holding the state at the start of the step.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageCoefficients {
    pub gam0: f64,
    pub gam1: f64,
    pub beta: f64,
}

static RK1: [StageCoefficients; 1] = [
    StageCoefficients { gam0: 0.0, gam1: 1.0, beta: 1.0 },
];

static RK2: [StageCoefficients; 2] = [
    StageCoefficients { gam0: 0.0, gam1: 1.0, beta: 1.0 },
    StageCoefficients { gam0: 0.5, gam1: 0.5, beta: 0.5 },
];

static RK3: [StageCoefficients; 3] = [
    StageCoefficients { gam0: 0.0, gam1: 1.0, beta: 1.0 },
    StageCoefficients { gam0: 0.25, gam1: 0.75, beta: 0.25 },
    StageCoefficients { gam0: 2.0 / 3.0, gam1: 1.0 / 3.0, beta: 2.0 / 3.0 },
];




/**
 * Strong-stability-preserving Runge-Kutta schemes
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeIntegrator {
    Rk1,
    Rk2,
    Rk3,
}




// ============================================================================
impl TimeIntegrator {
    pub fn stages(&self) -> &'static [StageCoefficients] {
        match self {
            TimeIntegrator::Rk1 => &RK1,
            TimeIntegrator::Rk2 => &RK2,
            TimeIntegrator::Rk3 => &RK3,
        }
    }
}

impl FromStr for TimeIntegrator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rk1" => Ok(TimeIntegrator::Rk1),
            "rk2" => Ok(TimeIntegrator::Rk2),
            "rk3" => Ok(TimeIntegrator::Rk3),
            _ => Err(Error::InvalidConfig(format!("unknown time integrator '{}'", s))),
        }
    }
}




/**
 * Physics and numerics settings of a hydrodynamics run.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydroConfig {
    pub thermodynamics: Thermodynamics,
    pub dynamics: Dynamics,

    /// Floors applied when recovering primitives outside the correction pass.
    pub density_floor: f64,
    pub pressure_floor: f64,

    /// Relative pressure tolerance of the relativistic primitive recovery.
    pub recovery_tolerance: f64,
    pub recovery_max_iterations: usize,

    /// Enable the first-order flux correction pass.
    pub fofc: bool,

    pub integrator: TimeIntegrator,
}

impl Default for HydroConfig {
    fn default() -> Self {
        Self {
            thermodynamics: Thermodynamics::Adiabatic { gamma_law_index: 5.0 / 3.0 },
            dynamics: Dynamics::Newtonian,
            density_floor: 1e-10,
            pressure_floor: 1e-12,
            recovery_tolerance: 1e-12,
            recovery_max_iterations: 100,
            fofc: true,
            integrator: TimeIntegrator::Rk2,
        }
    }
}




// ============================================================================
impl HydroConfig {

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.recovery_tolerance > 0.0) {
            return Err(Error::InvalidConfig("recovery tolerance must be positive".into()))
        }
        if self.recovery_max_iterations == 0 {
            return Err(Error::InvalidConfig("recovery needs at least one iteration".into()))
        }
        self.equation_of_state().map(|_| ())
    }

    /**
     * Build the equation of state described by this configuration.
     */
    pub fn equation_of_state(&self) -> Result<EquationOfState, Error> {
        let eos = EquationOfState::new(self.thermodynamics, self.dynamics)?
            .with_floors(self.density_floor, self.pressure_floor)
            .with_recovery(self.recovery_tolerance, self.recovery_max_iterations);
        eos.validate()?;
        Ok(eos)
    }
}
