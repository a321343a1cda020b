pub(crate) mod config;
pub(crate) mod spec;
pub(crate) mod transform;
