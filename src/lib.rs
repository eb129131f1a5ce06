//! Command line journal for recording what you are currently doing.
//! Every transition between activities is timestamped, and closed activities
//! are kept in a bounded history that can be browsed, searched, and reused
//! through a terminal.
//!

pub mod cli;
pub mod display;
pub mod store;
pub mod utils;
