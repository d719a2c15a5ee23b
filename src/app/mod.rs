pub mod future_poll;
pub mod poller;
pub mod watch_loop;
