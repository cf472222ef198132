pub mod account;
pub mod booking;
pub mod venue;

pub use account::*;
pub use booking::*;
pub use venue::*;
