pub mod push_sender;

pub use push_sender::PushNotificationSender;
