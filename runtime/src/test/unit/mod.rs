pub mod bindings;
pub mod teardown;
