pub(crate) mod cache;
pub(crate) mod fetch;
pub(crate) mod url;
