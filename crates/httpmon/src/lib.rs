//! Top-level facade crate for httpmon.
//!
//! Re-exports the core recorder and the sidecar library so users can depend on a single crate.

pub mod core {
    pub use httpmon_core::*;
}

pub mod sidecar {
    pub use httpmon_sidecar::*;
}
