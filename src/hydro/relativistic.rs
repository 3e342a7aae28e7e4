use super::euler::{Conserved, Primitive};
use super::geometry::Direction;
use super::metric::Metric;




/**
 * Derived quantities of a relativistic primitive state in a given 3+1
 * metric. The primitive vector holds the baryon number density `n`, the
 * spatial components `u^i = W v^i` of the Eulerian-frame four-velocity, and
 * the gas pressure. The rest-mass density is `rho = m_b n`, and the gas obeys
 * an ideal gamma-law, `h = 1 + gamma / (gamma - 1) p / rho`.
 */
#[derive(Clone, Copy, Debug)]
pub struct RelativisticState {
    pub rest_mass_density: f64,
    pub gas_pressure: f64,
    pub lorentz_factor: f64,
    pub velocity_up: [f64; 3],
    pub velocity_down: [f64; 3],
    pub specific_enthalpy: f64,
    pub sound_speed_squared: f64,
}




// ============================================================================
impl RelativisticState {

    pub fn new(prim: &Primitive, metric: &Metric, gamma_law_index: f64, baryon_mass: f64) -> Self {
        let rho = baryon_mass * prim.mass_density();
        let pg = prim.gas_pressure();
        let u_up = prim.velocity_vector();
        let u_dn = metric.lower(u_up);
        let usq: f64 = (0..3).map(|a| u_up[a] * u_dn[a]).sum();
        let w = (1.0 + usq).sqrt();
        let h = 1.0 + gamma_law_index / (gamma_law_index - 1.0) * pg / rho;

        Self {
            rest_mass_density: rho,
            gas_pressure: pg,
            lorentz_factor: w,
            velocity_up: [u_up[0] / w, u_up[1] / w, u_up[2] / w],
            velocity_down: [u_dn[0] / w, u_dn[1] / w, u_dn[2] / w],
            specific_enthalpy: h,
            sound_speed_squared: gamma_law_index * pg / (rho * h),
        }
    }

    pub fn velocity_squared(&self) -> f64 {
        (0..3).map(|a| self.velocity_up[a] * self.velocity_down[a]).sum()
    }

    /**
     * Densitized conserved variables `sqrt(g) {D, S_i, tau}`.
     */
    pub fn to_conserved(&self, metric: &Metric) -> Conserved {
        let sqrtg = metric.sqrt_determinant();
        let w = self.lorentz_factor;
        let rhohw2 = self.rest_mass_density * self.specific_enthalpy * w * w;
        let d = sqrtg * self.rest_mass_density * w;
        let s = self.velocity_down;

        Conserved::new(
            d,
            sqrtg * rhohw2 * s[0],
            sqrtg * rhohw2 * s[1],
            sqrtg * rhohw2 * s[2],
            sqrtg * (rhohw2 - self.gas_pressure) - d)
    }

    /**
     * Flux of the densitized conserved variables through a surface normal to
     * `direction`.
     */
    pub fn flux_vector(&self, metric: &Metric, direction: Direction) -> Conserved {
        let a = direction.permutation()[0];
        let alpha = metric.lapse;
        let sqrtg = metric.sqrt_determinant();
        let vtilde = alpha * self.velocity_up[a] - metric.shift[a];
        let pterm = alpha * sqrtg * self.gas_pressure;
        let u = self.to_conserved(metric);

        Conserved::new(
            u.mass_density() * vtilde,
            u.momentum_1() * vtilde + pterm * direction.along(Direction::I),
            u.momentum_2() * vtilde + pterm * direction.along(Direction::J),
            u.momentum_3() * vtilde + pterm * direction.along(Direction::K),
            u.energy_density() * vtilde + pterm * self.velocity_up[a])
    }

    /**
     * The slowest and fastest characteristic speeds along `direction`, as
     * seen in the coordinate frame. The boolean is true if the radicand was
     * negative and clipped to zero.
     */
    pub fn characteristic_speeds(&self, metric: &Metric, direction: Direction) -> (f64, f64, bool) {
        let a = direction.permutation()[0];
        let ginv = Metric { spatial: metric.inverse(), ..*metric };
        let va = self.velocity_up[a];
        let vsq = self.velocity_squared();
        let cs2 = self.sound_speed_squared;
        let cs = cs2.sqrt();
        let q = (1.0 - vsq) * (ginv.component(a, a) * (1.0 - vsq * cs2) - va * va * (1.0 - cs2));
        let (root, clipped) = if q < 0.0 { (0.0, true) } else { (q.sqrt(), false) };
        let factor = metric.lapse / (1.0 - vsq * cs2);
        let lm = factor * (va * (1.0 - cs2) - cs * root) - metric.shift[a];
        let lp = factor * (va * (1.0 - cs2) + cs * root) - metric.shift[a];
        (lm, lp, clipped)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::RelativisticState;
    use crate::hydro::euler::Primitive;
    use crate::hydro::geometry::Direction;
    use crate::hydro::metric::Metric;

    #[test]
    fn state_at_rest_in_flat_space() {
        let p = Primitive::new(1.0, 0.0, 0.0, 0.0, 0.5);
        let s = RelativisticState::new(&p, &Metric::minkowski(), 4.0 / 3.0, 1.0);
        assert_eq!(s.lorentz_factor, 1.0);
        let u = s.to_conserved(&Metric::minkowski());
        assert!((u.mass_density() - 1.0).abs() < 1e-14);
        assert!((u.energy_density() - 0.5 * 3.0).abs() < 1e-12);
        let f = s.flux_vector(&Metric::minkowski(), Direction::J);
        assert_eq!(f.momentum_2(), 0.5);
        assert_eq!(f.mass_density(), 0.0);
    }

    #[test]
    fn characteristic_speeds_are_sub_luminal_and_symmetric_at_rest() {
        let p = Primitive::new(1.0, 0.0, 0.0, 0.0, 10.0);
        let s = RelativisticState::new(&p, &Metric::minkowski(), 5.0 / 3.0, 1.0);
        let (lm, lp, clipped) = s.characteristic_speeds(&Metric::minkowski(), Direction::I);
        assert!(!clipped);
        assert!((lm + lp).abs() < 1e-14);
        assert!(lp > 0.0 && lp < 1.0);
        assert!((lp - s.sound_speed_squared.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn fast_flow_speeds_stay_below_light() {
        let p = Primitive::new(1.0, 20.0, 0.0, 0.0, 1.0);
        let s = RelativisticState::new(&p, &Metric::minkowski(), 5.0 / 3.0, 1.0);
        let (lm, lp, _) = s.characteristic_speeds(&Metric::minkowski(), Direction::I);
        assert!(lm > 0.9 && lp < 1.0 && lm < lp);
    }
}
