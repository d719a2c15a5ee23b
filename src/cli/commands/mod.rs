pub(crate) mod config;
pub(crate) mod once;
pub(crate) mod watch;
