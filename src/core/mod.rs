pub mod errors;
pub mod paths;
pub mod profile_manager;
pub mod services;

pub use profile_manager::{profile_warnings, LoadMetadata, ProfileManager};
