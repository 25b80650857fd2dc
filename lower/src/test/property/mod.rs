//! Property-based tests for constant conversion.

mod attr_props;
