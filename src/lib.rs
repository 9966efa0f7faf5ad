//! Synthetic load profile generation for distributed energy resources.
//!
//! The pipeline has three stages: ingest or synthesize household demand data
//! ([`data`]), fit a state classifier and a state transition estimator on
//! reference-dispatch labels ([`model`], [`sim::dispatch`]), and roll the
//! transition model through a physical DER simulation ([`systems`],
//! [`sim::generator`]) to synthesize realistic load profiles. Scenarios are
//! configured via TOML ([`config`]) and profiles exported as CSV ([`io`]).

pub mod config;
pub mod data;
pub mod io;
pub mod model;
pub mod sim;
pub mod systems;
