use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PocketlinkError {
    InvalidUrl(String),
    InvalidValidity(String),
    InvalidShortcodeFormat(String),
    ShortcodeTaken(String),
    NotFound(String),
    Expired(String),
    StoreFailure(String),
    Serialization(String),
    CodeSpaceExhausted(String),
    Validation(String),
    Config(String),
    FileOperation(String),
}

impl PocketlinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PocketlinkError::InvalidUrl(_) => "E001",
            PocketlinkError::InvalidValidity(_) => "E002",
            PocketlinkError::InvalidShortcodeFormat(_) => "E003",
            PocketlinkError::ShortcodeTaken(_) => "E004",
            PocketlinkError::NotFound(_) => "E005",
            PocketlinkError::Expired(_) => "E006",
            PocketlinkError::StoreFailure(_) => "E007",
            PocketlinkError::Serialization(_) => "E008",
            PocketlinkError::CodeSpaceExhausted(_) => "E009",
            PocketlinkError::Validation(_) => "E010",
            PocketlinkError::Config(_) => "E011",
            PocketlinkError::FileOperation(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PocketlinkError::InvalidUrl(_) => "Invalid URL",
            PocketlinkError::InvalidValidity(_) => "Invalid Validity",
            PocketlinkError::InvalidShortcodeFormat(_) => "Invalid Shortcode Format",
            PocketlinkError::ShortcodeTaken(_) => "Shortcode Taken",
            PocketlinkError::NotFound(_) => "Resource Not Found",
            PocketlinkError::Expired(_) => "Link Expired",
            PocketlinkError::StoreFailure(_) => "Record Store Failure",
            PocketlinkError::Serialization(_) => "Serialization Error",
            PocketlinkError::CodeSpaceExhausted(_) => "Code Space Exhausted",
            PocketlinkError::Validation(_) => "Validation Error",
            PocketlinkError::Config(_) => "Configuration Error",
            PocketlinkError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PocketlinkError::InvalidUrl(msg)
            | PocketlinkError::InvalidValidity(msg)
            | PocketlinkError::InvalidShortcodeFormat(msg)
            | PocketlinkError::ShortcodeTaken(msg)
            | PocketlinkError::NotFound(msg)
            | PocketlinkError::Expired(msg)
            | PocketlinkError::StoreFailure(msg)
            | PocketlinkError::Serialization(msg)
            | PocketlinkError::CodeSpaceExhausted(msg)
            | PocketlinkError::Validation(msg)
            | PocketlinkError::Config(msg)
            | PocketlinkError::FileOperation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// Whether the error was raised by input validation, before any mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PocketlinkError::InvalidUrl(_)
                | PocketlinkError::InvalidValidity(_)
                | PocketlinkError::InvalidShortcodeFormat(_)
                | PocketlinkError::ShortcodeTaken(_)
                | PocketlinkError::Validation(_)
        )
    }
}

impl fmt::Display for PocketlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PocketlinkError {}

// 便捷的构造函数
impl PocketlinkError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::InvalidUrl(msg.into())
    }

    pub fn invalid_validity<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::InvalidValidity(msg.into())
    }

    pub fn invalid_shortcode_format<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::InvalidShortcodeFormat(msg.into())
    }

    pub fn shortcode_taken<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::ShortcodeTaken(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::Expired(msg.into())
    }

    pub fn store_failure<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::StoreFailure(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::Serialization(msg.into())
    }

    pub fn code_space_exhausted<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::CodeSpaceExhausted(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::Validation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        PocketlinkError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for PocketlinkError {
    fn from(err: std::io::Error) -> Self {
        PocketlinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PocketlinkError {
    fn from(err: serde_json::Error) -> Self {
        PocketlinkError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for PocketlinkError {
    fn from(err: config::ConfigError) -> Self {
        PocketlinkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PocketlinkError {
    fn from(err: toml::ser::Error) -> Self {
        PocketlinkError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PocketlinkError>;
