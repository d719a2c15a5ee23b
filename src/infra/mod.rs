pub mod command_source;
pub mod visibility;
