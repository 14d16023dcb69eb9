//! Policy-driven encryption and sharing engine.
//!
//! Ties the lower layers together: the policy resolver picks cryptographic
//! parameters per sensitivity tier, the pipeline encrypts and decrypts
//! records under those parameters, and the share service gates access to
//! records through expiring, limited, optionally password-protected links.

pub mod config;
pub mod limiter;
pub mod pipeline;
pub mod policy;
pub mod share;

pub use config::EngineConfig;
pub use limiter::AttemptTracker;
pub use pipeline::{Decryption, EncryptionPipeline};
pub use policy::PolicyResolver;
pub use share::{CreateShareRequest, ShareDecryption, ShareService};
