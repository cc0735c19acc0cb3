// Spectrum file importing.

pub mod mgf;

pub use mgf::{load_from_mgf, parse_mgf};
