use std::error::Error;
use clap::Parser;
use log::{debug, info, LevelFilter};
use rayon::prelude::*;
use serde::Serialize;
use simple_logger::SimpleLogger;
use gridflux::config::{HydroConfig, TimeIntegrator};
use gridflux::hydro::eos::{Dynamics, EquationOfState, Recovery};
use gridflux::hydro::euler::Primitive;
use gridflux::hydro::metric::Metric;
use gridflux::index_space::Axis;
use gridflux::mesh::Mesh;
use gridflux::patch::Patch;
use gridflux::solvers::flux::{compute_fluxes, FaceStates, Fluxes, RiemannStats};
use gridflux::solvers::fofc::{FluxCorrection, FofcReport};
use gridflux::solvers::update::{advance_stage, conserved_from_primitive, recover_primitive};




#[derive(Parser, Debug)]
#[clap(version, about = "Sod shock tube with HLLE fluxes and first-order flux correction")]
struct Opts {
    /// Total number of zones on the unit interval
    #[clap(short = 'n', long, default_value = "400")]
    num_zones: i64,

    /// Number of blocks the interval is split into
    #[clap(short = 'b', long, default_value = "4")]
    num_blocks: usize,

    #[clap(short = 't', long, default_value = "0.2")]
    tfinal: f64,

    #[clap(long, default_value = "0.4")]
    cfl: f64,

    /// One of rk1, rk2, rk3
    #[clap(short = 'i', long, default_value = "rk2")]
    integrator: TimeIntegrator,

    /// Run special-relativistic hydrodynamics instead of Newtonian
    #[clap(short = 'r', long)]
    relativistic: bool,

    /// Disable the first-order flux correction pass
    #[clap(long)]
    no_fofc: bool,

    /// Read the hydro configuration from a CBOR file; overrides the physics flags
    #[clap(long)]
    config: Option<String>,

    #[clap(short = 'o', long, default_value = "shock_tube.cbor")]
    output: String,

    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}




#[derive(Serialize)]


/**
 * The simulation solution state
 */
struct State {
    config: HydroConfig,
    iteration: u64,
    time: f64,
    primitive: Patch,
    riemann: RiemannStats,
    fofc: FofcReport,
}




// ============================================================================
fn initial_primitive(mesh: &Mesh, dx: f64) -> Patch {
    let n = mesh.interior().dim().0 as i64;

    Patch::from_function(mesh.num_blocks(), 5, mesh.extended(), |m, (i, _, _), p| {
        let x = dx * ((m as i64 * n + i) as f64 + 0.5);
        let w = if x < 0.5 {
            Primitive::new(1.0, 0.0, 0.0, 0.0, 1.0)
        } else {
            Primitive::new(0.125, 0.0, 0.0, 0.0, 0.1)
        };
        w.write_to_slice(p)
    })
}

/**
 * Fill guard zones from the neighboring block, or with a copy of the edge
 * zone (outflow) at either end of the domain.
 */
fn fill_guard_zones(mesh: &Mesh, patch: &mut Patch) {
    let source = patch.clone();
    let n = mesh.interior().dim().0 as i64;

    patch.par_zones_mut().for_each(|(m, index, s)| {
        if mesh.interior().contains(index) {
            return
        }
        let (b, i) = mesh
            .chained_along(Axis::I, m, index)
            .unwrap_or((m, (index.0.max(0).min(n - 1), index.1, index.2)));
        s.copy_from_slice(source.get_slice(b, i))
    })
}

fn max_signal_speed(mesh: &Mesh, eos: &EquationOfState, primitive: &Patch) -> f64 {
    let interior = mesh.interior();
    primitive
        .iter_zones()
        .filter(|(_, index, _)| interior.contains(*index))
        .map(|(_, _, p)| eos.max_signal_speed(&Primitive::from_slice(p), &Metric::minkowski()))
        .fold(0.0, f64::max)
}




// ============================================================================
fn run(opts: &Opts) -> Result<State, Box<dyn Error>> {
    let config = match &opts.config {
        Some(path) => ciborium::de::from_reader(std::io::BufReader::new(std::fs::File::open(path)?))?,
        None => HydroConfig {
            dynamics: if opts.relativistic {
                Dynamics::Relativistic { baryon_mass: 1.0 }
            } else {
                Dynamics::Newtonian
            },
            fofc: !opts.no_fofc,
            integrator: opts.integrator,
            ..HydroConfig::default()
        },
    };
    config.validate()?;

    if opts.num_blocks == 0 || opts.num_zones % opts.num_blocks as i64 != 0 {
        return Err(format!("{} zones do not split evenly into {} blocks", opts.num_zones, opts.num_blocks).into())
    }

    let eos = config.equation_of_state()?;
    let dx = 1.0 / opts.num_zones as f64;
    let mesh = Mesh::uniform(opts.num_blocks, (opts.num_zones / opts.num_blocks as i64, 1, 1), 1, [dx, 1.0, 1.0]);

    let mut primitive = initial_primitive(&mesh, dx);
    let mut conserved = Patch::zeros(mesh.num_blocks(), 5, mesh.extended());
    conserved_from_primitive(&eos, &primitive, None, &mut conserved);

    let mut fluxes = Fluxes::new(&mesh, 5);
    let mut correction = FluxCorrection::new(&mesh);
    let mut state = State {
        config: config.clone(),
        iteration: 0,
        time: 0.0,
        primitive: Patch::zeros(0, 5, mesh.extended()),
        riemann: RiemannStats::default(),
        fofc: FofcReport::default(),
    };

    info!("{} zones in {} blocks, {:?}, fofc={}", opts.num_zones, mesh.num_blocks(), eos.dynamics(), config.fofc);

    while state.time < opts.tfinal {
        let a = max_signal_speed(&mesh, &eos, &primitive);
        let dt = (opts.cfl * dx / a).min(opts.tfinal - state.time);
        let u1 = conserved.clone();

        for stage in config.integrator.stages() {
            fill_guard_zones(&mesh, &mut primitive);

            let states = [FaceStates::piecewise_constant(&mesh, &primitive, Axis::I)];
            state.riemann = state.riemann + compute_fluxes(&eos, &states, None, &mut fluxes);

            if config.fofc {
                let report = correction.apply(&mesh, &eos, stage, dt, &conserved, &u1, &primitive, None, &mut fluxes, |m, index| {
                    mesh.chained_along(Axis::I, m, index)
                });
                if report.flagged_cells > 0 {
                    debug!("flagged: {:?}", correction.flags().flagged().collect::<Vec<_>>());
                }
                state.fofc.flagged_cells += report.flagged_cells;
                state.fofc.corrected_faces += report.corrected_faces;
            }
            advance_stage(&mesh, stage, dt, &fluxes, &mut conserved, &u1);
            recover_primitive(&mesh, &eos, &conserved, None, Recovery::Floored, &mut primitive)?;
        }

        state.iteration += 1;
        state.time += dt;
        info!("[{:05}] t={:.4} dt={:.3e}", state.iteration, state.time, dt);
    }

    fill_guard_zones(&mesh, &mut primitive);
    state.primitive = primitive;
    Ok(state)
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts = Opts::parse();
    SimpleLogger::new().with_level(opts.log_level).init()?;

    let state = run(&opts)?;
    info!("riemann: {:?}", state.riemann);
    info!("fofc: {:?}", state.fofc);

    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&state, &mut buffer)?;
    info!("wrote {}", opts.output);
    Ok(())
}
