//! Current-Grant Normalizer: currently-held grants in the same shape the
//! expander produces.

pub mod normalizer;

pub use normalizer::GrantNormalizer;
