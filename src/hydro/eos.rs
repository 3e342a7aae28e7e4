use serde::{Deserialize, Serialize};
use super::error::Error;
use super::euler::{Conserved, Primitive};
use super::geometry::Direction;
use super::metric::Metric;
use super::relativistic::RelativisticState;




/**
 * Thermodynamic closure of the fluid.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thermodynamics {
    Adiabatic { gamma_law_index: f64 },
    Isothermal { sound_speed: f64 },
}

/**
 * Whether the fluid is Newtonian or relativistic. Relativistic primitive
 * densities count baryons of the given rest mass.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dynamics {
    Newtonian,
    Relativistic { baryon_mass: f64 },
}

/**
 * How `EquationOfState::cons_to_prim` treats a conserved state that has no
 * physical primitive counterpart. `Diagnostic` reports the failure;
 * `Floored` resets the offending quantities to the floor values.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
    Diagnostic,
    Floored,
}




/**
 * The equation-of-state capability consumed by the Riemann solvers and the
 * flux correction. It covers the four combinations of `Thermodynamics` and
 * `Dynamics` except isothermal relativistic flow, which is rejected.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquationOfState {
    thermodynamics: Thermodynamics,
    dynamics: Dynamics,
    density_floor: f64,
    pressure_floor: f64,
    tolerance: f64,
    max_iterations: usize,
}




// ============================================================================
impl EquationOfState {

    pub fn new(thermodynamics: Thermodynamics, dynamics: Dynamics) -> Result<Self, Error> {
        let eos = Self {
            thermodynamics,
            dynamics,
            density_floor: 1e-10,
            pressure_floor: 1e-12,
            tolerance: 1e-12,
            max_iterations: 100,
        };
        eos.validate()?;
        Ok(eos)
    }

    /**
     * Newtonian gamma-law gas. Panics unless `gamma_law_index > 1`; use
     * `EquationOfState::new` to get the error instead.
     */
    pub fn gamma_law(gamma_law_index: f64) -> Self {
        Self::checked(Thermodynamics::Adiabatic { gamma_law_index }, Dynamics::Newtonian)
    }

    /// Newtonian isothermal gas. Panics if `sound_speed` is negative.
    pub fn isothermal(sound_speed: f64) -> Self {
        Self::checked(Thermodynamics::Isothermal { sound_speed }, Dynamics::Newtonian)
    }

    /**
     * Relativistic gamma-law gas. Panics unless `gamma_law_index > 1` and
     * `baryon_mass > 0`.
     */
    pub fn relativistic(gamma_law_index: f64, baryon_mass: f64) -> Self {
        Self::checked(Thermodynamics::Adiabatic { gamma_law_index }, Dynamics::Relativistic { baryon_mass })
    }

    fn checked(thermodynamics: Thermodynamics, dynamics: Dynamics) -> Self {
        match Self::new(thermodynamics, dynamics) {
            Ok(eos) => eos,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn with_floors(self, density_floor: f64, pressure_floor: f64) -> Self {
        Self { density_floor, pressure_floor, ..self }
    }

    pub fn with_recovery(self, tolerance: f64, max_iterations: usize) -> Self {
        Self { tolerance, max_iterations, ..self }
    }

    pub fn validate(&self) -> Result<(), Error> {
        match (self.thermodynamics, self.dynamics) {
            (Thermodynamics::Isothermal { .. }, Dynamics::Relativistic { .. }) => {
                Err(Error::InvalidEquationOfState("relativistic flow requires an adiabatic closure".into()))
            }
            (Thermodynamics::Adiabatic { gamma_law_index }, _) if !(gamma_law_index > 1.0) => {
                Err(Error::InvalidEquationOfState(format!("gamma-law index {} must exceed one", gamma_law_index)))
            }
            (Thermodynamics::Isothermal { sound_speed }, _) if !(sound_speed >= 0.0) => {
                Err(Error::InvalidEquationOfState(format!("negative sound speed {}", sound_speed)))
            }
            (_, Dynamics::Relativistic { baryon_mass }) if !(baryon_mass > 0.0) => {
                Err(Error::InvalidEquationOfState(format!("baryon mass {} must be positive", baryon_mass)))
            }
            _ if !(self.density_floor > 0.0 && self.pressure_floor > 0.0) => {
                Err(Error::InvalidEquationOfState("floors must be positive".into()))
            }
            _ => Ok(()),
        }
    }

    pub fn thermodynamics(&self) -> Thermodynamics {
        self.thermodynamics
    }

    pub fn dynamics(&self) -> Dynamics {
        self.dynamics
    }

    pub fn is_adiabatic(&self) -> bool {
        matches!(self.thermodynamics, Thermodynamics::Adiabatic { .. })
    }

    pub fn is_relativistic(&self) -> bool {
        matches!(self.dynamics, Dynamics::Relativistic { .. })
    }

    pub fn gamma_law_index(&self) -> Option<f64> {
        match self.thermodynamics {
            Thermodynamics::Adiabatic { gamma_law_index } => Some(gamma_law_index),
            Thermodynamics::Isothermal { .. } => None,
        }
    }

    pub fn baryon_mass(&self) -> Option<f64> {
        match self.dynamics {
            Dynamics::Relativistic { baryon_mass } => Some(baryon_mass),
            Dynamics::Newtonian => None,
        }
    }

    /// Number of fields in primitive and conserved vectors.
    pub fn num_fields(&self) -> usize {
        if self.is_adiabatic() { 5 } else { 4 }
    }

    /**
     * Relativistic derived quantities; only valid for a relativistic EOS.
     */
    pub fn relativistic_state(&self, prim: &Primitive, metric: &Metric) -> RelativisticState {
        let gamma = self.gamma_law_index().unwrap_or(f64::NAN);
        let mb = self.baryon_mass().unwrap_or(f64::NAN);
        RelativisticState::new(prim, metric, gamma, mb)
    }

    /**
     * Sound speed of a primitive state. For an isothermal gas this is the
     * fixed sound speed and the state is ignored. The relativistic value is
     * independent of the metric.
     */
    pub fn sound_speed(&self, prim: &Primitive) -> f64 {
        match self.dynamics {
            Dynamics::Newtonian => prim.sound_speed_squared(self.thermodynamics).sqrt(),
            Dynamics::Relativistic { .. } => {
                self.relativistic_state(prim, &Metric::minkowski()).sound_speed_squared.sqrt()
            }
        }
    }

    /**
     * The largest characteristic speed over all three directions, for time
     * step control.
     */
    pub fn max_signal_speed(&self, prim: &Primitive, metric: &Metric) -> f64 {
        match self.dynamics {
            Dynamics::Newtonian => prim.max_signal_speed(self.thermodynamics),
            Dynamics::Relativistic { .. } => {
                let s = self.relativistic_state(prim, metric);
                [Direction::I, Direction::J, Direction::K]
                    .iter()
                    .map(|&d| {
                        let (lm, lp, _) = s.characteristic_speeds(metric, d);
                        lm.abs().max(lp.abs())
                    })
                    .fold(0.0, f64::max)
            }
        }
    }

    /**
     * Conserved variables of a primitive state. The metric is ignored for
     * Newtonian flow.
     */
    pub fn prim_to_cons(&self, prim: &Primitive, metric: &Metric) -> Conserved {
        match self.dynamics {
            Dynamics::Newtonian => prim.to_conserved(self.thermodynamics),
            Dynamics::Relativistic { .. } => self.relativistic_state(prim, metric).to_conserved(metric),
        }
    }

    /**
     * Recover the primitive state from conserved variables. In `Diagnostic`
     * mode an unphysical state is an error; in `Floored` mode the floors are
     * applied and the result is always `Ok`.
     */
    pub fn cons_to_prim(&self, cons: &Conserved, metric: &Metric, recovery: Recovery) -> Result<Primitive, Error> {
        let result = match self.dynamics {
            Dynamics::Newtonian => cons.to_primitive(self.thermodynamics),
            Dynamics::Relativistic { .. } => self.cons_to_prim_relativistic(cons, metric),
        };
        match (result, recovery) {
            (Ok(p), _) => Ok(p),
            (Err(e), Recovery::Diagnostic) => Err(e),
            (Err(_), Recovery::Floored) => Ok(self.floored(cons, metric)),
        }
    }

    fn floored(&self, cons: &Conserved, metric: &Metric) -> Primitive {
        match self.dynamics {
            Dynamics::Newtonian => {
                let d = cons.mass_density().max(self.density_floor);
                let v = [cons.momentum_1() / d, cons.momentum_2() / d, cons.momentum_3() / d];
                let p = match self.thermodynamics {
                    Thermodynamics::Adiabatic { gamma_law_index } => {
                        let ek = 0.5 * d * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]);
                        ((cons.energy_density() - ek) * (gamma_law_index - 1.0)).max(self.pressure_floor)
                    }
                    Thermodynamics::Isothermal { .. } => 0.0,
                };
                Primitive::new(d, v[0], v[1], v[2], p)
            }
            Dynamics::Relativistic { baryon_mass } => {
                let d = cons.mass_density() / metric.sqrt_determinant();
                let n = d.max(self.density_floor) / baryon_mass;
                Primitive::new(n, 0.0, 0.0, 0.0, self.pressure_floor)
            }
        }
    }

    /**
     * Relativistic primitive recovery: bracket and bisect the pressure
     * `p` satisfying `p = (gamma - 1) rho eps(p)`, where `rho` and `eps`
     * follow from the conserved variables given a trial pressure.
     */
    fn cons_to_prim_relativistic(&self, cons: &Conserved, metric: &Metric) -> Result<Primitive, Error> {
        let gamma = self.gamma_law_index().unwrap_or(f64::NAN);
        let mb = self.baryon_mass().unwrap_or(f64::NAN);
        let sqrtg = metric.sqrt_determinant();
        let d = cons.mass_density() / sqrtg;
        let tau = cons.energy_density() / sqrtg;
        let s_dn = [cons.momentum_1() / sqrtg, cons.momentum_2() / sqrtg, cons.momentum_3() / sqrtg];
        let s_up = metric.raise(s_dn);
        let ssq: f64 = (0..3).map(|a| s_dn[a] * s_up[a]).sum();

        if !(d > 0.0) {
            return Err(Error::NegativeMassDensity(d))
        }

        // Residual of the pressure equation; None if the trial pressure
        // implies a superluminal velocity.
        let residual = |p: f64| -> Option<f64> {
            let e = tau + d + p;
            let x = e * e - ssq;
            if !(x > 0.0 && e > 0.0) {
                return None
            }
            let root = x.sqrt();
            let rho_eps = (x - d * root) / e - p;
            Some((gamma - 1.0) * rho_eps - p)
        };

        let f0 = match residual(0.0) {
            Some(f0) if f0 >= 0.0 => f0,
            Some(f0) => return Err(Error::NegativeGasPressure(f0)),
            None => return Err(Error::NegativeGasPressure(tau + d - ssq.sqrt())),
        };

        let mut lo = 0.0;
        let mut hi = f0.max(self.pressure_floor);
        let mut iterations = 0;

        while residual(hi).map_or(true, |f| f >= 0.0) {
            lo = hi;
            hi *= 2.0;
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(Error::RootFinderFailed { iterations })
            }
        }
        while hi - lo > self.tolerance * hi {
            let mid = 0.5 * (lo + hi);
            if residual(mid).map_or(false, |f| f >= 0.0) {
                lo = mid
            } else {
                hi = mid
            }
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(Error::RootFinderFailed { iterations })
            }
        }

        let p = 0.5 * (lo + hi);
        let e = tau + d + p;
        let w = e / (e * e - ssq).sqrt();
        let rho = d / w;
        let v_up = [s_up[0] / e, s_up[1] / e, s_up[2] / e];

        Ok(Primitive::new(rho / mb, w * v_up[0], w * v_up[1], w * v_up[2], p))
    }
}
