pub mod cli;
pub mod config;
pub mod pool;
pub mod run;
pub mod signal;
pub mod template;
