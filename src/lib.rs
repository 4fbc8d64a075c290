//! citeaudit - verify citation claims against academic metadata
//!
//! The core lives in [`audit`], with single-claim checks in
//! [`fact_check`]; [`providers`] supplies the remote collaborators,
//! [`http_server`] and [`cli`] expose them.

pub mod audit;
pub mod cli;
pub mod fact_check;
pub mod http_server;
pub mod observability;
pub mod providers;
