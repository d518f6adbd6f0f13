//! Library side of the `tabprof` binary: logging setup and the end-to-end
//! load/profile/materialize pipeline.

pub mod logging;
pub mod pipeline;
