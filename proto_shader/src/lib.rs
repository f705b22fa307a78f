pub mod core;
pub mod logging;
pub mod prelude;

// Lets modules refer to this crate by name, as downstream code does.
extern crate self as proto_shader;

#[cfg(test)]
mod tests;
