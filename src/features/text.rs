//! Text tokenization and length statistics for vectorization

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Tokenizer matching the fitted vectorizers: runs of two or more word characters
pub struct TextProcessor {
    token_regex: Regex,
    lowercase: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub character_count: usize,
    pub word_count: usize,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TextProcessor {
    pub fn new(lowercase: bool) -> Self {
        let token_regex = Regex::new(r"\b\w\w+\b").expect("Invalid token regex");
        Self { token_regex, lowercase }
    }

    /// Split text into word tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        self.token_regex
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Tokens plus space-joined n-grams for every n in `min_n..=max_n`
    pub fn ngrams(&self, text: &str, min_n: usize, max_n: usize) -> Vec<String> {
        let tokens = self.tokenize(text);
        let min_n = min_n.max(1);
        let mut grams = Vec::new();

        for n in min_n..=max_n {
            if n == 1 {
                grams.extend(tokens.iter().cloned());
                continue;
            }
            grams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }

        grams
    }

    /// Character and word counts on Unicode boundaries
    pub fn stats(text: &str) -> TextStats {
        TextStats {
            character_count: text.chars().count(),
            word_count: text.unicode_words().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization_drops_single_characters() {
        let processor = TextProcessor::default();
        let tokens = processor.tokenize("Python-разработчик, опыт с Django и C!");

        assert_eq!(tokens, vec!["python", "разработчик", "опыт", "django"]);
    }

    #[test]
    fn test_tokenization_keeps_case_when_asked() {
        let processor = TextProcessor::new(false);
        assert_eq!(processor.tokenize("Rust Go"), vec!["Rust", "Go"]);
    }

    #[test]
    fn test_bigrams() {
        let processor = TextProcessor::default();
        let grams = processor.ngrams("senior rust developer", 1, 2);

        assert!(grams.contains(&"rust".to_string()));
        assert!(grams.contains(&"senior rust".to_string()));
        assert!(grams.contains(&"rust developer".to_string()));
        assert_eq!(grams.len(), 5);
    }

    #[test]
    fn test_stats_count_unicode() {
        let stats = TextProcessor::stats("Удалёнка, Python и SQL");
        assert_eq!(stats.character_count, 22);
        assert_eq!(stats.word_count, 4);
    }
}
