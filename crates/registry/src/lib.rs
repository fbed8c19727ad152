pub mod store;

pub use store::SubscriberStore;
