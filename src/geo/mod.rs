pub(crate) mod projection;
