pub mod poller_state;
pub mod throttle;
pub mod visibility;
