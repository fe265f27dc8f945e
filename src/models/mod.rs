pub mod bin;
pub mod deposit;
pub mod event;
pub mod policy;
pub mod product;
pub mod profile;
pub mod quiz;
pub mod station;
pub mod waste;
