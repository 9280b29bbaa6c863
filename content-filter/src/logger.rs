use log::{Level, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use wasm_bindgen::JsValue;
use web_sys::console;

// 全局日志实例
static LOGGER: OnceCell<ConsoleLogger> = OnceCell::new();

/// 把 `log` 宏的输出转发到浏览器控制台
struct ConsoleLogger {
    level: Level,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&message),
            Level::Warn => console::warn_1(&message),
            Level::Info => console::info_1(&message),
            Level::Debug => console::log_1(&message),
            Level::Trace => console::debug_1(&message),
        }
    }

    fn flush(&self) {}
}

/// 安装控制台日志，重复调用无副作用
pub fn init(level: Level) {
    let logger = LOGGER.get_or_init(|| ConsoleLogger { level });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level.to_level_filter());
    }
}
