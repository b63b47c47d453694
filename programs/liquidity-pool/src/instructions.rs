#![allow(ambiguous_glob_reexports)]

pub mod initialize_pool;
pub mod deposit;
pub mod share_math;

pub use initialize_pool::*;
pub use deposit::*;
