//! Telegram Bot API adapter.

mod bot_client;

pub use bot_client::TelegramNotifier;
