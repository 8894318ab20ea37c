pub mod cancel;
pub mod capability;
pub mod context;
pub mod engine;
pub mod profile;
pub mod rate_limit;
pub mod registry;
pub mod sink;
