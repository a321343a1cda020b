pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod frame;
pub(crate) mod masks;
pub(crate) mod plan;
pub(crate) mod surface_pool;
