//! ConsoleNotifier - 標準出力にダイアログを流す Notifier
//!
//! CLI デモ用。alert / confirm をダイアログの代わりに 1 行ずつ印字し、
//! confirm には設定済みの回答を即座に返す。

use crate::ports::notifier::Notifier;

pub struct ConsoleNotifier {
    auto_confirm: bool,
}

impl ConsoleNotifier {
    /// confirm に常に「はい」と答える Notifier
    pub fn new() -> Self {
        Self { auto_confirm: true }
    }

    pub fn with_auto_confirm(auto_confirm: bool) -> Self {
        Self { auto_confirm }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        println!("[alert] {message}");
    }

    fn confirm(&self, message: &str) -> bool {
        println!(
            "[confirm] {message} -> {}",
            if self.auto_confirm { "yes" } else { "no" }
        );
        self.auto_confirm
    }
}
