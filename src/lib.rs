#![allow(non_snake_case)]
pub mod distribution;
pub mod error;
pub mod filter;
pub mod model;
pub mod plotting;
pub mod simulator;
