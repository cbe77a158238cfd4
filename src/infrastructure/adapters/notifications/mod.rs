pub mod telegram_notification_adapter;

pub use telegram_notification_adapter::{TelegramAdapterConfig, TelegramNotificationAdapter};
