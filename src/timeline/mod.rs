pub(crate) mod spans;
pub(crate) mod store;
