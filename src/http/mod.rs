//! HTTP plumbing: the injectable transport seam plus header and URL
//! construction helpers used by the dispatcher and the batch engine.

pub(crate) mod headers;
pub mod transport;
pub(crate) mod url;
