pub mod clock;
pub mod countdown;
pub mod event;
pub mod mission;
pub mod session;
