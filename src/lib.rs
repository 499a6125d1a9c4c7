pub mod cli;
pub mod core;
pub mod events;
pub mod google;
pub mod sections;
