//! integrated tests

mod properties;
mod sampling;
