//! Key validation and parallel dispatch

pub mod validator;
pub mod worker_pool;
