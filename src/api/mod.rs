//! Generic resource API: the service contract and the router that mounts a
//! full REST surface for any service implementing it.

pub mod resource;
pub mod service;

pub use resource::ResourceRouter;
pub use service::{BatchItem, ResourceService};
