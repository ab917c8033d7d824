pub mod alerts;
pub mod error;
pub mod favorites;
pub mod proxy;
pub mod sources;
