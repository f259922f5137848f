pub mod annotations;
pub mod config;
pub mod dialect;
pub mod error;

#[cfg(test)]
pub mod test_utils;
