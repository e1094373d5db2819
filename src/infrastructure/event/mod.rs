pub mod bus;

pub use bus::{PostEvent, PostEventBus};
