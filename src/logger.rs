use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

pub trait TransferLogger: Send + Sync {
    fn subscribed(&self, _channel: i8, _address: &str) {}
    fn unsubscribed(&self, _channel: i8, _address: &str) {}
    fn sent(&self, _channel: i8, _path: &Path, _bytes: u64) {}
    fn received(&self, _channel: i8, _path: &Path, _bytes: u64) {}
    fn error(&self, _context: &str, _msg: &str) {}
}

pub struct NoopLogger;
impl TransferLogger for NoopLogger {}

pub struct TextLogger {
    file: Mutex<File>,
}

impl TextLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(f),
        })
    }

    fn line(&self, s: &str) {
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "[{}] {}", Utc::now().to_rfc3339(), s);
        }
    }
}

impl TransferLogger for TextLogger {
    fn subscribed(&self, channel: i8, address: &str) {
        self.line(&format!("SUBSCRIBE channel={channel} address={address}"));
    }
    fn unsubscribed(&self, channel: i8, address: &str) {
        self.line(&format!("UNSUBSCRIBE channel={channel} address={address}"));
    }
    fn sent(&self, channel: i8, path: &Path, bytes: u64) {
        self.line(&format!(
            "SEND channel={} path={} bytes={}",
            channel,
            path.display(),
            bytes
        ));
    }
    fn received(&self, channel: i8, path: &Path, bytes: u64) {
        self.line(&format!(
            "RECEIVE channel={} path={} bytes={}",
            channel,
            path.display(),
            bytes
        ));
    }
    fn error(&self, context: &str, msg: &str) {
        self.line(&format!("ERROR ctx={context} msg={msg}"));
    }
}
