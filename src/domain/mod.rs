pub mod notification;
pub mod payload;

pub use notification::{PushNotification, PushResponse, PushType};
pub use payload::PushData;
