//! Canvas drawing and the frame loop.

pub(crate) mod overlay;
pub(crate) mod paint;
pub(crate) mod pipeline;
pub(crate) mod surface;
pub(crate) mod text;
pub(crate) mod viewport;
