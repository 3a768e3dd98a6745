#[macro_use]
mod macros;

pub mod charge;
pub mod ratios;
pub mod temperature;
