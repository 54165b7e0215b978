//! Ambient infrastructure shared by the service manager binaries.

pub mod logging;
