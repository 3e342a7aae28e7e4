//! Approximate Riemann solvers. Each solver takes the left and right
//! primitive states at one face and returns a single numerical flux. States
//! are rotated so the solve direction is the first vector component, solved
//! there, and the flux is rotated back.
//!
//! References:
//! - E.F. Toro, "Riemann Solvers and Numerical Methods for Fluid Dynamics",
//!   2nd ed. (1999), chapter 10.
//! - B. Einfeldt et al., "On Godunov-type methods near low densities",
//!   JCP 92, 273 (1991).

use super::eos::{Dynamics, EquationOfState, Thermodynamics};
use super::euler::{Conserved, Primitive};
use super::geometry::Direction;
use super::metric::Metric;




/**
 * Result of an HLLE solve at one face.
 */
#[derive(Clone, Copy, Debug)]
pub struct RiemannSolution {
    /// The interface flux.
    pub flux: Conserved,

    /// The left flux in the frame moving at `bm`, i.e. `F_L - bm U_L`.
    pub left_flux: Conserved,

    /// The right flux in the frame moving at `bp`, i.e. `F_R - bp U_R`.
    pub right_flux: Conserved,

    /// Lower signal speed bound, clamped to be non-positive.
    pub bm: f64,

    /// Upper signal speed bound, clamped to be non-negative.
    pub bp: f64,

    /// Whether a negative sound-speed radicand was clipped to zero.
    pub clipped: bool,
}




// ============================================================================
/**
 * HLLE flux at a face normal to `direction`. Newtonian flow uses Roe-averaged
 * Einfeldt wave speed bounds; relativistic flow uses the extreme
 * characteristic speeds of the two states in the face metric. The metric is
 * ignored for Newtonian flow.
 */
pub fn riemann_hlle(
    eos: &EquationOfState,
    pl: &Primitive,
    pr: &Primitive,
    direction: Direction,
    metric: &Metric) -> RiemannSolution
{
    match eos.dynamics() {
        Dynamics::Newtonian => hlle_newtonian(eos.thermodynamics(), pl, pr, direction),
        Dynamics::Relativistic { .. } => hlle_relativistic(eos, pl, pr, direction, metric),
    }
}

/**
 * Local Lax-Friedrichs flux, using a single signal speed bound for both
 * waves. Much more diffusive than HLLE; used as the fallback flux in the
 * first-order flux correction.
 */
pub fn riemann_llf(
    eos: &EquationOfState,
    pl: &Primitive,
    pr: &Primitive,
    direction: Direction,
    metric: &Metric) -> Conserved
{
    match eos.dynamics() {
        Dynamics::Newtonian => llf_newtonian(eos.thermodynamics(), pl, pr, direction),
        Dynamics::Relativistic { .. } => llf_relativistic(eos, pl, pr, direction, metric),
    }
}




// ============================================================================
fn hlle_newtonian(thermodynamics: Thermodynamics, pl: &Primitive, pr: &Primitive, direction: Direction) -> RiemannSolution {
    let wl = pl.rotate(direction);
    let wr = pr.rotate(direction);

    // Roe-averaged velocity
    let sqrtdl = wl.mass_density().sqrt();
    let sqrtdr = wr.mass_density().sqrt();
    let isdlpdr = 1.0 / (sqrtdl + sqrtdr);
    let vl = wl.velocity_vector();
    let vr = wr.velocity_vector();
    let mut vroe = [0.0; 3];

    for a in 0..3 {
        vroe[a] = (sqrtdl * vl[a] + sqrtdr * vr[a]) * isdlpdr;
    }
    let vroe_sq = vroe[0] * vroe[0] + vroe[1] * vroe[1] + vroe[2] * vroe[2];

    let ul = wl.to_conserved(thermodynamics);
    let ur = wr.to_conserved(thermodynamics);
    let cl = wl.sound_speed_squared(thermodynamics).sqrt();
    let cr = wr.sound_speed_squared(thermodynamics).sqrt();

    // The enthalpy H = (E + p) / d, not E or p, is Roe-averaged.
    let (a, clipped) = match thermodynamics {
        Thermodynamics::Adiabatic { gamma_law_index } => {
            let hroe = ((ul.energy_density() + wl.gas_pressure()) / sqrtdl +
                        (ur.energy_density() + wr.gas_pressure()) / sqrtdr) * isdlpdr;
            let q = hroe - 0.5 * vroe_sq;

            if q < 0.0 {
                (0.0, true)
            } else {
                (((gamma_law_index - 1.0) * q).sqrt(), false)
            }
        }
        Thermodynamics::Isothermal { sound_speed } => (sound_speed, false),
    };

    let al = (vroe[0] - a).min(wl.velocity_1() - cl);
    let ar = (vroe[0] + a).max(wr.velocity_1() + cr);
    let (bm, bp) = clamp_wave_speeds(al, ar);

    let fl = wl.flux_vector(Direction::I, thermodynamics) - ul * bm;
    let fr = wr.flux_vector(Direction::I, thermodynamics) - ur * bp;

    RiemannSolution {
        flux: hll_blend(fl, fr, bm, bp).unrotate(direction),
        left_flux: fl.unrotate(direction),
        right_flux: fr.unrotate(direction),
        bm,
        bp,
        clipped,
    }
}

fn hlle_relativistic(
    eos: &EquationOfState,
    pl: &Primitive,
    pr: &Primitive,
    direction: Direction,
    metric: &Metric) -> RiemannSolution
{
    let g = metric.rotate(direction);
    let sl = eos.relativistic_state(&pl.rotate(direction), &g);
    let sr = eos.relativistic_state(&pr.rotate(direction), &g);
    let (lml, lpl, clipped_l) = sl.characteristic_speeds(&g, Direction::I);
    let (lmr, lpr, clipped_r) = sr.characteristic_speeds(&g, Direction::I);
    let (bm, bp) = clamp_wave_speeds(lml.min(lmr), lpl.max(lpr));

    let fl = sl.flux_vector(&g, Direction::I) - sl.to_conserved(&g) * bm;
    let fr = sr.flux_vector(&g, Direction::I) - sr.to_conserved(&g) * bp;

    RiemannSolution {
        flux: hll_blend(fl, fr, bm, bp).unrotate(direction),
        left_flux: fl.unrotate(direction),
        right_flux: fr.unrotate(direction),
        bm,
        bp,
        clipped: clipped_l || clipped_r,
    }
}

fn llf_newtonian(thermodynamics: Thermodynamics, pl: &Primitive, pr: &Primitive, direction: Direction) -> Conserved {
    let wl = pl.rotate(direction);
    let wr = pr.rotate(direction);
    let cl = wl.sound_speed_squared(thermodynamics).sqrt();
    let cr = wr.sound_speed_squared(thermodynamics).sqrt();
    let a = (wl.velocity_1().abs() + cl).max(wr.velocity_1().abs() + cr);

    let ul = wl.to_conserved(thermodynamics);
    let ur = wr.to_conserved(thermodynamics);
    let fl = wl.flux_vector(Direction::I, thermodynamics);
    let fr = wr.flux_vector(Direction::I, thermodynamics);

    ((fl + fr) * 0.5 - (ur - ul) * (0.5 * a)).unrotate(direction)
}

fn llf_relativistic(
    eos: &EquationOfState,
    pl: &Primitive,
    pr: &Primitive,
    direction: Direction,
    metric: &Metric) -> Conserved
{
    let g = metric.rotate(direction);
    let sl = eos.relativistic_state(&pl.rotate(direction), &g);
    let sr = eos.relativistic_state(&pr.rotate(direction), &g);
    let (lml, lpl, _) = sl.characteristic_speeds(&g, Direction::I);
    let (lmr, lpr, _) = sr.characteristic_speeds(&g, Direction::I);
    let a = lml.abs().max(lpl.abs()).max(lmr.abs()).max(lpr.abs());

    let ul = sl.to_conserved(&g);
    let ur = sr.to_conserved(&g);
    let fl = sl.flux_vector(&g, Direction::I);
    let fr = sr.flux_vector(&g, Direction::I);

    ((fl + fr) * 0.5 - (ur - ul) * (0.5 * a)).unrotate(direction)
}




// ============================================================================
fn clamp_wave_speeds(al: f64, ar: f64) -> (f64, f64) {
    let bm = if al < 0.0 { al } else { 0.0 };
    let bp = if ar > 0.0 { ar } else { 0.0 };
    (bm, bp)
}

/**
 * Two-wave HLL flux from the shifted fluxes `fl = F_L - bm U_L` and
 * `fr = F_R - bp U_R`. With `bm == 0` the flux is exactly `fl` (no left-going
 * wave), with `bp == 0` exactly `fr`, and with both zero the mean.
 */
fn hll_blend(fl: Conserved, fr: Conserved, bm: f64, bp: f64) -> Conserved {
    if bp == bm {
        (fl + fr) * 0.5
    } else if bm == 0.0 {
        fl
    } else if bp == 0.0 {
        fr
    } else {
        let tmp = 0.5 * (bp + bm) / (bp - bm);
        (fl + fr) * 0.5 + (fl - fr) * tmp
    }
}
