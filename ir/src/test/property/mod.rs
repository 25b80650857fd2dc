//! Property-based tests for attributes.

#[cfg(test)]
mod attr_props;

pub mod generators;
