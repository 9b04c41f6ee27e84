//! Campaign attribution, marketing metrics and referral flow graphs derived
//! from advertising click-to-conversion traces.

pub mod aggregate;
pub mod campaign;
pub mod config;
pub mod error;
pub mod filter;
pub mod flow;
pub mod format;
pub mod source;
pub mod trace;
