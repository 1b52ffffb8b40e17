pub mod runtime;
pub mod simulate;
