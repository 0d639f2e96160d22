pub mod appointment;
pub mod auth;
pub mod error;
pub mod external;
pub mod notification;
pub mod policy;
pub mod slot;
