//! Plain operations exposed as tools, independent of any transport.

pub mod calc;

pub use calc::add;
