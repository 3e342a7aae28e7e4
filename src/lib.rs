//! Gridflux computes interface fluxes for finite-volume hydrodynamics on
//! block-structured grids. It covers Newtonian and general-relativistic
//! (Valencia form) gas dynamics with adiabatic or isothermal equations of
//! state. Face fluxes come from an HLLE approximate Riemann solver; in the
//! relativistic case the solver evaluates the spacetime metric at each face.
//! A first-order flux correction (FOFC) pass predicts each stage update,
//! detects cells whose predicted state would be unphysical, and falls back
//! to a local Lax-Friedrichs flux on the faces of those cells.
//!
//! Data lives in flat arrays over a three-dimensional index space, one
//! `Patch` per quantity covering every block of the mesh. Each kernel is a
//! rayon parallel map in which every output slot has exactly one writer.

pub mod config;
pub mod hydro;
pub mod index_space;
pub mod mesh;
pub mod patch;
pub mod solvers;
