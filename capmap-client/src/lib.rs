pub mod client;
pub mod error;
pub mod model;

pub use client::{CapabilityClient, CollisionPolicy, ProgressCallback};
pub use error::ClientError;
pub use model::{Application, ApplicationMap, CapabilityNode, CapabilityRef};
