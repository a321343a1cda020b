pub(crate) mod decode;
pub(crate) mod gate;
pub(crate) mod source;
pub(crate) mod store;
