pub mod auth;
pub mod config;
pub mod lists;
pub mod run;
pub mod schedule;
pub mod state;
pub mod sync;
pub mod travel;
