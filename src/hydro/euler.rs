use std::ops::{Add, Sub, Mul, Div};
use super::eos::Thermodynamics;
use super::error::Error;
use super::geometry::Direction;




// ============================================================================
/**
 * Conserved quantities: mass density, three momentum components, and total
 * energy density. The same vector shape holds a face flux. Relativistic
 * runs store the densitized `{D, S_1, S_2, S_3, tau}` in it.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conserved(f64, f64, f64, f64, f64);

/**
 * Primitive quantities: mass density, three velocity components, and gas
 * pressure. Isothermal states leave the pressure slot unused. Relativistic
 * states store the baryon number density and the spatial components of
 * `W v^i` in the first four slots.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive(f64, f64, f64, f64, f64);




// ============================================================================
impl Conserved {

    pub fn new(d: f64, s1: f64, s2: f64, s3: f64, e: f64) -> Self {
        Self(d, s1, s2, s3, e)
    }

    /**
     * Read from a zone slice; a slice of four fields (isothermal) leaves the
     * energy at zero.
     */
    pub fn from_slice(cons: &[f64]) -> Self {
        Self(cons[0], cons[1], cons[2], cons[3], cons.get(4).copied().unwrap_or(0.0))
    }

    pub fn write_to_slice(&self, cons: &mut [f64]) {
        let a = self.as_array();
        let n = cons.len().min(5);
        cons[..n].copy_from_slice(&a[..n])
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.0, self.1, self.2, self.3, self.4]
    }

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn momentum_1(&self) -> f64 {
        self.1
    }

    pub fn momentum_2(&self) -> f64 {
        self.2
    }

    pub fn momentum_3(&self) -> f64 {
        self.3
    }

    pub fn energy_density(&self) -> f64 {
        self.4
    }

    pub fn momentum_vector(&self) -> [f64; 3] {
        [self.1, self.2, self.3]
    }

    pub fn momentum_squared(&self) -> f64 {
        self.1 * self.1 + self.2 * self.2 + self.3 * self.3
    }

    /**
     * Return a copy with the momentum components moved from the rotated
     * frame (`direction` first) back to the grid frame.
     */
    pub fn unrotate(&self, direction: Direction) -> Self {
        let [s1, s2, s3] = direction.unrotate(self.momentum_vector());
        Self(self.0, s1, s2, s3, self.4)
    }

    pub fn to_primitive(&self, thermodynamics: Thermodynamics) -> Result<Primitive, Error> {
        let d = self.mass_density();

        if d <= 0.0 {
            return Err(Error::NegativeMassDensity(d))
        }
        let v1 = self.momentum_1() / d;
        let v2 = self.momentum_2() / d;
        let v3 = self.momentum_3() / d;

        match thermodynamics {
            Thermodynamics::Adiabatic { gamma_law_index } => {
                let ek = 0.5 * self.momentum_squared() / d;
                let et = self.energy_density() - ek;
                let pg = et * (gamma_law_index - 1.0);

                if pg < 0.0 {
                    Err(Error::NegativeGasPressure(pg))
                } else {
                    Ok(Primitive(d, v1, v2, v3, pg))
                }
            }
            Thermodynamics::Isothermal { .. } => Ok(Primitive(d, v1, v2, v3, 0.0)),
        }
    }
}




// ============================================================================
impl Primitive {

    pub fn new(d: f64, v1: f64, v2: f64, v3: f64, p: f64) -> Self {
        Self(d, v1, v2, v3, p)
    }

    /**
     * Read from a zone slice; a slice of four fields (isothermal) leaves the
     * pressure at zero.
     */
    pub fn from_slice(prim: &[f64]) -> Self {
        Self(prim[0], prim[1], prim[2], prim[3], prim.get(4).copied().unwrap_or(0.0))
    }

    pub fn write_to_slice(&self, prim: &mut [f64]) {
        let a = self.as_array();
        let n = prim.len().min(5);
        prim[..n].copy_from_slice(&a[..n])
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.0, self.1, self.2, self.3, self.4]
    }

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn velocity_1(&self) -> f64 {
        self.1
    }

    pub fn velocity_2(&self) -> f64 {
        self.2
    }

    pub fn velocity_3(&self) -> f64 {
        self.3
    }

    pub fn gas_pressure(&self) -> f64 {
        self.4
    }

    pub fn velocity_vector(&self) -> [f64; 3] {
        [self.1, self.2, self.3]
    }

    pub fn velocity(&self, direction: Direction) -> f64 {
        match direction {
            Direction::I => self.velocity_1(),
            Direction::J => self.velocity_2(),
            Direction::K => self.velocity_3(),
        }
    }

    pub fn velocity_squared(&self) -> f64 {
        self.1 * self.1 + self.2 * self.2 + self.3 * self.3
    }

    /**
     * Return a copy with the velocity components permuted so that
     * `direction` is the first one.
     */
    pub fn rotate(&self, direction: Direction) -> Self {
        let [v1, v2, v3] = direction.rotate(self.velocity_vector());
        Self(self.0, v1, v2, v3, self.4)
    }

    /**
     * The pressure entering the momentum flux: the gas pressure for an
     * adiabatic gas, `cs^2 rho` for an isothermal one.
     */
    pub fn pressure_term(&self, thermodynamics: Thermodynamics) -> f64 {
        match thermodynamics {
            Thermodynamics::Adiabatic { .. } => self.gas_pressure(),
            Thermodynamics::Isothermal { sound_speed } => sound_speed * sound_speed * self.mass_density(),
        }
    }

    pub fn sound_speed_squared(&self, thermodynamics: Thermodynamics) -> f64 {
        match thermodynamics {
            Thermodynamics::Adiabatic { gamma_law_index } => gamma_law_index * self.gas_pressure() / self.mass_density(),
            Thermodynamics::Isothermal { sound_speed } => sound_speed * sound_speed,
        }
    }

    pub fn max_signal_speed(&self, thermodynamics: Thermodynamics) -> f64 {
        f64::sqrt(self.velocity_squared()) + f64::sqrt(self.sound_speed_squared(thermodynamics))
    }

    pub fn to_conserved(&self, thermodynamics: Thermodynamics) -> Conserved {
        let d   = self.mass_density();
        let vsq = self.velocity_squared();
        let e = match thermodynamics {
            Thermodynamics::Adiabatic { gamma_law_index } => d * vsq * 0.5 + self.gas_pressure() / (gamma_law_index - 1.0),
            Thermodynamics::Isothermal { .. } => 0.0,
        };

        Conserved(
            d,
            d * self.velocity_1(),
            d * self.velocity_2(),
            d * self.velocity_3(),
            e)
    }

    pub fn flux_vector(&self, direction: Direction, thermodynamics: Thermodynamics) -> Conserved {
        let pg = self.pressure_term(thermodynamics);
        let vn = self.velocity(direction);
        let u = self.to_conserved(thermodynamics);
        let pv = match thermodynamics {
            Thermodynamics::Adiabatic { .. } => pg * vn,
            Thermodynamics::Isothermal { .. } => 0.0,
        };

        Conserved(
             u.0 * vn,
             u.1 * vn + pg * direction.along(Direction::I),
             u.2 * vn + pg * direction.along(Direction::J),
             u.3 * vn + pg * direction.along(Direction::K),
             u.4 * vn + pv)
    }
}




// ============================================================================
impl Add<Conserved> for Conserved {
    type Output = Conserved;
    fn add(self, u: Self) -> Conserved {
        Conserved(self.0 + u.0, self.1 + u.1, self.2 + u.2, self.3 + u.3, self.4 + u.4)
    }
}

impl Sub<Conserved> for Conserved {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1, self.2 - u.2, self.3 - u.3, self.4 - u.4)
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a, self.2 * a, self.3 * a, self.4 * a)
    }
}

impl Div<f64> for Conserved {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        Self(self.0 / a, self.1 / a, self.2 / a, self.3 / a, self.4 / a)
    }
}
