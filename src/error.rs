//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum RswebtechError {
    // 规则库相关错误
    #[error("规则库加载失败：{0}")]
    CatalogLoadError(String),
    #[error("规则库为空，无可用指纹")]
    CatalogEmptyError,

    // 编译相关错误
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type RwtResult<T> = Result<T, RswebtechError>;
