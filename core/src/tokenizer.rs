use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerOptions {
    /// English Snowball stemming, so "tools" and "tool" are one term.
    pub stem: bool,
    pub stopwords: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self { stem: true, stopwords: false }
    }
}

/// Text -> terms. Indexing and querying of one index share one instance.
pub struct Tokenizer {
    options: TokenizerOptions,
    stemmer: Option<Stemmer>,
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        let stemmer = options.stem.then(|| Stemmer::create(Algorithm::English));
        Self { options, stemmer }
    }

    pub fn options(&self) -> TokenizerOptions {
        self.options
    }

    /// NFKC-normalize, lowercase, split on anything that is not a letter or
    /// digit, then optionally drop stopwords and stem.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if self.options.stopwords && STOPWORDS.contains(token) {
                continue;
            }
            match &self.stemmer {
                Some(stemmer) => tokens.push(stemmer.stem(token).into_owned()),
                None => tokens.push(token.to_string()),
            }
        }
        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerOptions::default())
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer").field("options", &self.options).finish()
    }
}

/// Tokenize with default options.
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default().tokenize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn splits_on_punctuation() {
        let plain = Tokenizer::new(TokenizerOptions { stem: false, stopwords: false });
        assert_eq!(plain.tokenize("getting-started.mdx"), vec!["getting", "started", "mdx"]);
        assert_eq!(plain.tokenize("v2_api"), vec!["v2", "api"]);
    }

    #[test]
    fn blank_text_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t ").is_empty());
        assert!(tokenize("--- ... !!!").is_empty());
    }
}
