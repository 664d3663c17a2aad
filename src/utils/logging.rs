//! Structured Logging with Sensitive Data Redaction
//!
//! Log lines go to stderr so stdout stays reserved for JSON responses.
//! Every field value is filtered by its key before it is stored:
//! - mnemonics, seeds, private keys and WIFs are never printed
//! - addresses keep a short prefix and suffix
//! - txids and raw transaction hex are shortened

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a field value is treated, decided from its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Secret,
    Address,
    Hash,
    Plain,
}

const SECRET_MARKERS: &[&str] = &["mnemonic", "seed", "private", "secret", "wif", "passphrase", "signing_key"];
const ADDRESS_MARKERS: &[&str] = &["address", "recipient", "sender"];
const HASH_MARKERS: &[&str] = &["txid", "tx_id", "tx_hex", "hash"];

fn classify(key: &str) -> FieldKind {
    let key = key.to_ascii_lowercase();
    let matches = |markers: &[&str]| markers.iter().any(|m| key.contains(m));

    if matches(SECRET_MARKERS) {
        FieldKind::Secret
    } else if matches(ADDRESS_MARKERS) {
        FieldKind::Address
    } else if matches(HASH_MARKERS) {
        FieldKind::Hash
    } else {
        FieldKind::Plain
    }
}

/// Only the length of a secret survives
fn conceal(value: &str) -> String {
    match value.len() {
        0 => "[EMPTY]".to_string(),
        1..=4 => "[REDACTED]".to_string(),
        n => format!("[REDACTED:{}chars]", n),
    }
}

/// `head...tail`, or `None` when the value is too short to shorten safely
fn shorten(value: &str, head: usize, tail: usize) -> Option<String> {
    if !value.is_ascii() || value.len() <= head + tail + 3 {
        return None;
    }
    Some(format!("{}...{}", &value[..head], &value[value.len() - tail..]))
}

fn filter_value(kind: FieldKind, raw: &str) -> String {
    let value = raw.trim();
    match kind {
        FieldKind::Secret => conceal(raw),
        FieldKind::Plain => raw.to_string(),
        _ if value.is_empty() => "[EMPTY]".to_string(),
        // short or odd addresses are hidden entirely
        FieldKind::Address => shorten(value, 6, 4).unwrap_or_else(|| conceal(value)),
        FieldKind::Hash => shorten(value, 10, 6).unwrap_or_else(|| value.to_string()),
    }
}

/// One log line being assembled
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a field, filtered according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let filtered = filter_value(classify(key), &value.to_string());
        self.fields.push((key, filtered));
        self
    }

    /// `LEVEL [module] message | k=v k=v`, without timestamp
    pub fn render(&self) -> String {
        let mut line = format!("{} [{}] {}", self.level, self.module, self.message);
        for (i, (key, value)) in self.fields.iter().enumerate() {
            line.push_str(if i == 0 { " | " } else { " " });
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    /// Write to stderr. Debug entries are dropped unless debug is enabled.
    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }
        eprintln!("{} {}", chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true), self.render());
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Debug logging, printed only when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::__log_at!(Debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::__log_at!(Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::__log_at!(Warn, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::__log_at!(Error, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keys() {
        assert_eq!(classify("mnemonic"), FieldKind::Secret);
        assert_eq!(classify("private_key_wif"), FieldKind::Secret);
        assert_eq!(classify("wallet_address"), FieldKind::Address);
        assert_eq!(classify("tx_id"), FieldKind::Hash);
        assert_eq!(classify("fee"), FieldKind::Plain);
    }

    #[test]
    fn test_conceal() {
        assert_eq!(conceal(""), "[EMPTY]");
        assert_eq!(conceal("abc"), "[REDACTED]");
        assert_eq!(conceal("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_address_and_hash_shortening() {
        assert_eq!(
            filter_value(FieldKind::Address, "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"),
            "bc1qar...5mdq"
        );
        assert_eq!(filter_value(FieldKind::Address, "tb1q"), "[REDACTED]");

        let txid = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";
        assert_eq!(filter_value(FieldKind::Hash, txid), "4a5e1e4baa...eda33b");
        assert_eq!(filter_value(FieldKind::Hash, "abcd"), "abcd");
    }

    #[test]
    fn test_mnemonic_never_rendered() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let line = LogEntry::new(LogLevel::Info, "wallet", "Wallet initialized")
            .field("mnemonic", phrase)
            .field("wallet_address", "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu")
            .field("fee", 705)
            .render();

        assert!(!line.contains("abandon"));
        assert!(line.contains("mnemonic=[REDACTED:"));
        assert!(line.contains("wallet_address=bc1qcr...6fyu"));
        assert!(line.ends_with("fee=705"));
    }

    #[test]
    fn test_render_format() {
        let entry = LogEntry::new(LogLevel::Warn, "test", "msg").field("amount", 123456).field("inputs", 2);
        assert_eq!(entry.render(), "WARN [test] msg | amount=123456 inputs=2");
        assert_eq!(LogEntry::new(LogLevel::Error, "test", "msg").render(), "ERROR [test] msg");
    }
}
