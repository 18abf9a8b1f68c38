#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod config;
pub mod conservation;
pub mod driver;
pub mod energy;
pub mod error;
pub mod integrators;
pub mod observation;
pub mod pattern;
pub mod plot;
pub mod recorder;
pub mod rigid_body;
pub mod simulate;
pub mod sink;
pub mod stats;
pub mod types;
pub mod util;

pub use error::{BenchError, Result};

pub const GRAVITY: Float = 9.81;

pub const PI: Float = std::f32::consts::PI;
