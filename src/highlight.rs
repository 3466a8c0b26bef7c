use std::collections::HashMap;
use std::sync::OnceLock;

use askama::Template;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Turns raw code into escaped HTML for one language.
pub type HighlightStrategy = fn(&str) -> askama::Result<String>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub html: String,
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const JAVASCRIPT_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "default",
    "delete", "do", "else", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "yield",
];

const TYPESCRIPT_EXTRA: &[&str] = &[
    "enum", "implements", "interface", "keyof", "namespace", "private", "protected", "public",
    "readonly", "type",
];

const BASH_KEYWORDS: &[&str] = &[
    "case", "do", "done", "echo", "elif", "else", "esac", "export", "fi", "for", "function",
    "if", "in", "local", "return", "then", "until", "while",
];

/// Extracts `rust` from a markdown class such as `language-rust`.
pub fn language_tag(class_name: &str) -> Option<&str> {
    static LANGUAGE_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = LANGUAGE_RE
        .get_or_init(|| Regex::new(r"language-(\w+)").ok())
        .as_ref()?;

    re.captures(class_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Language tag to highlighting strategy, with a plain escaping fallback.
#[derive(Clone)]
pub struct HighlighterRegistry {
    strategies: HashMap<String, HighlightStrategy>,
    aliases: HashMap<String, String>,
    fallback: HighlightStrategy,
}

impl Default for HighlighterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty(plain);
        registry.register("rust", highlight_rust);
        registry.register("python", highlight_python);
        registry.register("javascript", highlight_javascript);
        registry.register("typescript", highlight_typescript);
        registry.register("bash", highlight_bash);
        registry.register("json", highlight_json);

        registry.alias("rs", "rust");
        registry.alias("py", "python");
        registry.alias("js", "javascript");
        registry.alias("jsx", "javascript");
        registry.alias("ts", "typescript");
        registry.alias("tsx", "typescript");
        registry.alias("sh", "bash");
        registry.alias("shell", "bash");
        registry
    }
}

impl HighlighterRegistry {
    pub fn empty(fallback: HighlightStrategy) -> Self {
        Self {
            strategies: HashMap::new(),
            aliases: HashMap::new(),
            fallback,
        }
    }

    pub fn register(&mut self, language: &str, strategy: HighlightStrategy) {
        self.strategies
            .insert(language.to_ascii_lowercase(), strategy);
    }

    pub fn alias(&mut self, alias: &str, language: &str) {
        self.aliases
            .insert(alias.to_ascii_lowercase(), language.to_ascii_lowercase());
    }

    pub fn strategy_for(&self, language: Option<&str>) -> HighlightStrategy {
        let Some(language) = language else {
            return self.fallback;
        };

        let key = language.to_ascii_lowercase();
        let key = self.aliases.get(&key).cloned().unwrap_or(key);
        self.strategies.get(&key).copied().unwrap_or(self.fallback)
    }

    pub fn render(&self, class_name: Option<&str>, code: &str) -> askama::Result<CodeBlock> {
        let language = class_name.and_then(language_tag);
        let body = (self.strategy_for(language))(code)?;
        let html = CodeBlockTemplate {
            language,
            body: &body,
        }
        .render()?;

        Ok(CodeBlock {
            language: language.map(str::to_string),
            html,
        })
    }
}

#[derive(Template)]
#[template(path = "code_block.html")]
struct CodeBlockTemplate<'a> {
    language: Option<&'a str>,
    body: &'a str,
}

#[derive(Template)]
#[template(source = "{{ text }}", ext = "html")]
struct TextTemplate<'a> {
    text: &'a str,
}

#[derive(Template)]
#[template(source = "<span class=\"token {{ class }}\">{{ text }}</span>", ext = "html")]
struct TokenTemplate<'a> {
    class: &'a str,
    text: &'a str,
}

/// The fallback strategy: escaped text with no token markup.
pub fn plain(code: &str) -> askama::Result<String> {
    TextTemplate { text: code }.render()
}

fn highlight_rust(code: &str) -> askama::Result<String> {
    highlight_keywords(code, RUST_KEYWORDS)
}

fn highlight_python(code: &str) -> askama::Result<String> {
    highlight_keywords(code, PYTHON_KEYWORDS)
}

fn highlight_javascript(code: &str) -> askama::Result<String> {
    highlight_keywords(code, JAVASCRIPT_KEYWORDS)
}

fn highlight_typescript(code: &str) -> askama::Result<String> {
    let keywords: Vec<&str> = JAVASCRIPT_KEYWORDS
        .iter()
        .chain(TYPESCRIPT_EXTRA)
        .copied()
        .collect();
    highlight_keywords(code, &keywords)
}

fn highlight_bash(code: &str) -> askama::Result<String> {
    highlight_keywords(code, BASH_KEYWORDS)
}

fn highlight_keywords(code: &str, keywords: &[&str]) -> askama::Result<String> {
    static WORD_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = WORD_RE
        .get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").ok())
        .as_ref()
    else {
        return plain(code);
    };

    wrap_matches(code, re, |word| {
        keywords
            .iter()
            .any(|keyword| *keyword == word)
            .then_some("keyword")
    })
}

fn highlight_json(code: &str) -> askama::Result<String> {
    static LITERAL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = LITERAL_RE
        .get_or_init(|| {
            Regex::new(r#""(?:[^"\\]|\\.)*"|-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?|\btrue\b|\bfalse\b|\bnull\b"#)
                .ok()
        })
        .as_ref()
    else {
        return plain(code);
    };

    wrap_matches(code, re, |literal| {
        Some(if literal.starts_with('"') {
            "string"
        } else if literal.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
            "number"
        } else {
            "literal"
        })
    })
}

fn wrap_matches<'a, F>(code: &'a str, re: &Regex, classify: F) -> askama::Result<String>
where
    F: Fn(&'a str) -> Option<&'static str>,
{
    let mut html = String::with_capacity(code.len() + code.len() / 2);
    let mut last = 0;

    for found in re.find_iter(code) {
        let Some(class) = classify(found.as_str()) else {
            continue;
        };
        html.push_str(&plain(&code[last..found.start()])?);
        html.push_str(
            &TokenTemplate {
                class,
                text: found.as_str(),
            }
            .render()?,
        );
        last = found.end();
    }
    html.push_str(&plain(&code[last..])?);
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_language_from_class_name() {
        assert_eq!(language_tag("language-rust"), Some("rust"));
        assert_eq!(language_tag("hljs language-ts extra"), Some("ts"));
        assert_eq!(language_tag("no-language"), None);
        assert_eq!(language_tag(""), None);
    }

    #[test]
    fn known_language_gets_keyword_spans() {
        let registry = HighlighterRegistry::default();
        let block = registry
            .render(Some("language-rust"), "fn main() { let x = 1; }")
            .unwrap();

        assert_eq!(block.language.as_deref(), Some("rust"));
        assert!(block
            .html
            .starts_with("<div class=\"code-block language-rust\"><code>"));
        assert!(block.html.contains("<span class=\"token keyword\">fn</span> main"));
        assert!(block.html.contains("<span class=\"token keyword\">let</span> x"));
    }

    #[test]
    fn aliases_resolve_to_registered_strategy() {
        let registry = HighlighterRegistry::default();
        let block = registry
            .render(Some("language-py"), "def f(): return None")
            .unwrap();
        assert!(block.html.contains("<span class=\"token keyword\">def</span>"));
        assert!(block.html.contains("<span class=\"token keyword\">None</span>"));
    }

    #[test]
    fn unknown_language_falls_back_to_escaped_text() {
        let registry = HighlighterRegistry::default();
        let block = registry.render(Some("language-cobol"), "IF A < B").unwrap();

        assert_eq!(block.language.as_deref(), Some("cobol"));
        assert_eq!(
            block.html,
            "<div class=\"code-block language-cobol\"><code>IF A &lt; B</code></div>"
        );

        let untagged = registry.render(None, "<b>").unwrap();
        assert_eq!(untagged.html, "<div class=\"code-block\"><code>&lt;b&gt;</code></div>");
    }

    #[test]
    fn json_literals_are_classified() {
        let registry = HighlighterRegistry::default();
        let block = registry
            .render(Some("language-json"), r#"{"a": 1, "b": null}"#)
            .unwrap();
        assert!(block
            .html
            .contains("<span class=\"token string\">&quot;a&quot;</span>"));
        assert!(block.html.contains("<span class=\"token number\">1</span>"));
        assert!(block.html.contains("<span class=\"token literal\">null</span>"));
    }

    #[test]
    fn custom_strategy_can_be_registered() {
        fn shout(code: &str) -> askama::Result<String> {
            plain(&code.to_uppercase())
        }

        let mut registry = HighlighterRegistry::empty(plain);
        registry.register("Shout", shout);
        let block = registry.render(Some("language-shout"), "hi").unwrap();
        assert!(block.html.contains("<code>HI</code>"));
    }

    #[test]
    fn markup_inside_code_is_escaped_in_every_strategy() {
        let registry = HighlighterRegistry::default();
        let block = registry
            .render(Some("language-rust"), "if a < b && c > d { x }")
            .unwrap();

        assert!(block
            .html
            .contains("<span class=\"token keyword\">if</span> a &lt; b &amp;&amp; c &gt; d"));
        assert!(!block.html.contains("a < b"));

        let json = registry
            .render(Some("language-json"), r#"{"k": "<script>"}"#)
            .unwrap();
        assert!(json.html.contains("&lt;script&gt;"));
        assert!(!json.html.contains("<script>"));
    }
}
