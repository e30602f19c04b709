use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::common::json_guard::JsonLimits;

/// 应用配置总结构
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub translator: TranslatorSettings,
    pub publisher: PublisherSettings,
    pub transport: TransportSettings,
    pub listener: ListenerSettings,
}

/// 日志配置（tracing-subscriber 的 EnvFilter 指令）
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub filter: String,
}

/// 翻译器配置：解析前对原始载荷的大小与嵌套深度限制
#[derive(Debug, Deserialize, Clone)]
pub struct TranslatorSettings {
    /// 单条载荷允许的最大字节数，默认 256KB
    pub max_payload_bytes: usize,
    /// JSON 最大嵌套深度，默认 16
    pub max_json_depth: usize,
}

impl TranslatorSettings {
    pub fn json_limits(&self) -> JsonLimits {
        JsonLimits {
            max_bytes: self.max_payload_bytes,
            max_depth: self.max_json_depth,
        }
    }
}

/// 发布器配置
#[derive(Debug, Deserialize, Clone)]
pub struct PublisherSettings {
    /// 内部事件发布的目标主题
    pub topic: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// 每个信封输出为一行 JSON 到标准输出
    Stdout,
    /// 进程内主题总线
    Bus,
}

/// 传输层配置
#[derive(Debug, Deserialize, Clone)]
pub struct TransportSettings {
    pub kind: TransportKind,
    /// 总线模式下每个订阅者队列的容量
    pub bus_capacity: usize,
}

/// 行式输入源配置
#[derive(Debug, Deserialize, Clone)]
pub struct ListenerSettings {
    /// 单行载荷的最大字节数，超出的行将被丢弃
    pub max_line_bytes: usize,
}

impl Settings {
    /// 加载配置：支持默认值、可选配置文件、环境变量覆盖
    pub fn new() -> anyhow::Result<Self> {
        let builder = defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("ACCOUNT_RELAY").separator("__"));
        Self::build(builder)
    }

    /// 从指定文件加载（文件必须存在），不读取环境变量
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let builder = defaults()?.add_source(File::from(path).required(true));
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<config::builder::DefaultState>) -> anyhow::Result<Self> {
        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.translator.max_payload_bytes == 0 {
            return Err(anyhow::anyhow!("translator.max_payload_bytes must be > 0"));
        }
        if self.translator.max_json_depth == 0 {
            return Err(anyhow::anyhow!("translator.max_json_depth must be > 0"));
        }
        if self.publisher.topic.trim().is_empty() {
            return Err(anyhow::anyhow!("publisher.topic must not be empty"));
        }
        if self.transport.bus_capacity == 0 {
            return Err(anyhow::anyhow!("transport.bus_capacity must be > 0"));
        }
        if self.listener.max_line_bytes < self.translator.max_payload_bytes {
            return Err(anyhow::anyhow!(
                "listener.max_line_bytes must be >= translator.max_payload_bytes"
            ));
        }
        Ok(())
    }
}

fn defaults() -> anyhow::Result<ConfigBuilder<config::builder::DefaultState>> {
    let builder = Config::builder()
        // 默认值（代码内硬编码）
        .set_default("logging.filter", "account_relay=info")?
        .set_default("translator.max_payload_bytes", 256 * 1024)?
        .set_default("translator.max_json_depth", 16)?
        .set_default("publisher.topic", "account.changed")?
        .set_default("transport.kind", "stdout")?
        .set_default("transport.bus_capacity", 1024)?
        // 行长度上限需覆盖单条载荷上限
        .set_default("listener.max_line_bytes", 256 * 1024)?;
    Ok(builder)
}
