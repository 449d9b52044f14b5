//! 提取模块：HTML检测面提取
pub mod html_extractor;

pub use self::html_extractor::{HtmlExtractor, HtmlSurface};
