//! CLI command implementations.

pub mod dump;
pub mod load;

#[cfg(test)]
pub(crate) mod test_support;
