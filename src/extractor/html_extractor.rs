//! HTML标签提取器
//! 负责从响应体中提取script-src、meta标签与页面标题

use std::cell::RefCell;

use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use markup5ever::interface::Attribute;
use once_cell::sync::Lazy;
use regex::Regex;
use tendril::StrTendril;

/// 单次提取得到的HTML检测面
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HtmlSurface {
    // <script src="..."> 的src列表（按出现顺序）
    pub script_srcs: Vec<String>,
    // <meta name=... content=...> 的（名称小写，内容）列表
    pub meta_tags: Vec<(String, String)>,
}

/// 标签收集器（tokenizer回调侧）
#[derive(Default)]
struct SurfaceSink {
    script_srcs: RefCell<Vec<String>>,
    meta_tags: RefCell<Vec<(String, String)>>,
}

impl TokenSink for SurfaceSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            match name.as_ref() {
                "script" => self.collect_script_src(&attrs),
                "meta" => self.collect_meta(&attrs),
                _ => {}
            }
        }
        TokenSinkResult::Continue
    }
}

impl SurfaceSink {
    fn collect_script_src(&self, attrs: &[Attribute]) {
        for attr in attrs {
            if attr.name.local.as_ref() == "src" && !attr.value.is_empty() {
                self.script_srcs.borrow_mut().push(attr.value.to_string());
                break;
            }
        }
    }

    fn collect_meta(&self, attrs: &[Attribute]) {
        let mut name = None;
        let mut content = None;

        for attr in attrs {
            match attr.name.local.as_ref() {
                "name" => name = Some(attr.value.to_string().to_lowercase()),
                "content" => content = Some(attr.value.to_string()),
                _ => {}
            }
        }

        if let (Some(n), Some(c)) = (name, content) {
            self.meta_tags.borrow_mut().push((n, c));
        }
    }
}

/// HTML提取器
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// 单趟tokenize提取脚本URL与meta标签
    ///
    /// 容忍任意残缺HTML，不产生错误。
    pub fn extract(html: &str) -> HtmlSurface {
        let tokenizer = Tokenizer::new(SurfaceSink::default(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        let sink = tokenizer.sink;
        HtmlSurface {
            script_srcs: sink.script_srcs.into_inner(),
            meta_tags: sink.meta_tags.into_inner(),
        }
    }

    /// 提取第一个<title>内容（原样返回，不解码实体）
    pub fn extract_title(html: &str) -> String {
        static TITLE_REGEX: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

        TITLE_REGEX
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}
