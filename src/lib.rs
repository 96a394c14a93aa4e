//! partbench: InvenTree parts-maintenance toolkit
//!
//! A command-line toolkit for keeping a self-hosted InvenTree parts
//! inventory tidy: part-name convention checks, category parameter
//! normalization, parameter-matrix CSV round-trips, selection list
//! upkeep, and stock location management.

pub mod cli;
pub mod core;
pub mod entities;
