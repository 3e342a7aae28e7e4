use log::warn;
use rayon::prelude::*;
use crate::config::StageCoefficients;
use crate::hydro::eos::{EquationOfState, Recovery};
use crate::hydro::error::Error;
use crate::hydro::euler::{Conserved, Primitive};
use crate::hydro::metric::{Metric, MetricField};
use crate::index_space::offset_index;
use crate::mesh::Mesh;
use crate::patch::Patch;
use super::flux::Fluxes;




/**
 * Return `beta dt div(F)` for each field of the cell at `(block, index)`,
 * summed over the active axes. A face flux enters the two cells sharing it
 * with opposite signs.
 */
pub fn flux_difference(mesh: &Mesh, fluxes: &Fluxes, beta_dt: f64, block: usize, index: (i64, i64, i64)) -> [f64; 5] {
    let mut divf = [0.0; 5];

    for axis in mesh.active_axes() {
        if let Some(flux) = fluxes.along(axis) {
            let dtodx = beta_dt / mesh.cell_spacing(block, axis);
            let fm = flux.get_slice(block, index);
            let fp = flux.get_slice(block, offset_index(index, 1, axis));

            for n in 0..fm.len() {
                divf[n] += dtodx * (fp[n] - fm[n])
            }
        }
    }
    divf
}




/**
 * Apply one Runge-Kutta stage to the interior zones of `u0` in place:
 * `u0 <- gam0 u0 + gam1 u1 - beta dt div(F)`. Guard zones are not touched.
 */
pub fn advance_stage(mesh: &Mesh, stage: &StageCoefficients, dt: f64, fluxes: &Fluxes, u0: &mut Patch, u1: &Patch) {
    let interior = mesh.interior().clone();
    let beta_dt = stage.beta * dt;

    u0.par_zones_mut()
        .filter(|(_, index, _)| interior.contains(*index))
        .for_each(|(m, index, u)| {
            let divf = flux_difference(mesh, fluxes, beta_dt, m, index);
            let v = u1.get_slice(m, index);

            for n in 0..u.len() {
                u[n] = stage.gam0 * u[n] + stage.gam1 * v[n] - divf[n]
            }
        })
}




/**
 * Recover primitive variables on the interior zones of `primitive` from
 * `conserved`. With `Recovery::Diagnostic` the first unphysical zone is
 * returned as an error; with `Recovery::Floored` floors are applied where
 * needed and the number of floored zones is returned.
 */
pub fn recover_primitive(
    mesh: &Mesh,
    eos: &EquationOfState,
    conserved: &Patch,
    metric: Option<&MetricField>,
    recovery: Recovery,
    primitive: &mut Patch) -> Result<usize, Error>
{
    let interior = mesh.interior().clone();

    let floored = primitive.par_zones_mut()
        .filter(|(_, index, _)| interior.contains(*index))
        .map(|(m, index, p)| {
            let g = metric.map_or_else(Metric::minkowski, |g| g.at_cell(m, index));
            let u = Conserved::from_slice(conserved.get_slice(m, index));

            match eos.cons_to_prim(&u, &g, Recovery::Diagnostic) {
                Ok(w) => {
                    w.write_to_slice(p);
                    Ok(false)
                }
                Err(e) if recovery == Recovery::Diagnostic => Err(e.at_zone(m, index)),
                Err(_) => {
                    eos.cons_to_prim(&u, &g, Recovery::Floored)?.write_to_slice(p);
                    Ok(true)
                }
            }
        })
        .collect::<Result<Vec<bool>, Error>>()?
        .into_iter()
        .filter(|&f| f)
        .count();

    if floored > 0 {
        warn!("applied floors in {} of {} zones", floored, mesh.total_zones());
    }
    Ok(floored)
}

/**
 * Fill conserved variables on every zone of `conserved` from `primitive`.
 */
pub fn conserved_from_primitive(eos: &EquationOfState, primitive: &Patch, metric: Option<&MetricField>, conserved: &mut Patch) {
    conserved.par_zones_mut().for_each(|(m, index, u)| {
        let g = metric.map_or_else(Metric::minkowski, |g| g.at_cell(m, index));
        let w = Primitive::from_slice(primitive.get_slice(m, index));
        eos.prim_to_cons(&w, &g).write_to_slice(u)
    })
}
