pub mod broadcaster;
pub mod format;

pub use broadcaster::{DeliveryFailure, DispatchReport, NotificationDispatcher};
pub use format::format_signal;
