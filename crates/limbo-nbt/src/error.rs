use thiserror::Error;

#[derive(Debug, Error)]
pub enum NbtError {
    #[error("truncated: needed {needed} more byte(s), {remaining} left")]
    Truncated { needed: usize, remaining: usize },

    #[error("root must be a compound, found tag id {0}")]
    RootNotCompound(u8),

    #[error("tag id {0} does not exist")]
    UnknownTag(u8),

    #[error("string is not valid UTF-8")]
    BadString(#[from] std::string::FromUtf8Error),

    #[error("array or list declares length {0}")]
    NegativeLength(i32),

    #[error("tags nested deeper than {0}")]
    TooDeep(usize),

    #[error("gzip stream is corrupt")]
    Gzip(#[source] std::io::Error),
}
