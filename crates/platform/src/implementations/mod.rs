//! Concrete platform implementations

pub mod unix;
