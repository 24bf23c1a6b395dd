//! Workspace statistics for `evaluate_resources`

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;
use walkdir::WalkDir;

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "py"];
const KEYWORDS_PER_FILE: usize = 10;
const KEYWORDS_TO_DISPLAY: usize = 10;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "couldn", "d", "did", "didn", "do", "does", "doesn", "doing",
    "don", "down", "during", "each", "few", "for", "from", "further", "had", "hadn", "has",
    "hasn", "have", "haven", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "ll", "m",
    "ma", "me", "mightn", "more", "most", "mustn", "my", "myself", "needn", "no", "nor", "not",
    "now", "o", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "re", "s", "same", "shan", "she", "should", "shouldn", "so", "some",
    "such", "t", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "ve", "very", "was", "wasn", "we", "were", "weren", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "won", "wouldn", "y", "you", "your", "yours",
    "yourself", "yourselves",
];

fn non_alpha() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z]+").expect("valid regex"))
}

/// Aggregate statistics over the text files of a directory tree
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DirectorySummary {
    pub total_files: usize,
    pub total_size: u64,
    pub extensions: BTreeMap<String, usize>,
    /// `(keyword, number of files listing it among their top keywords)`
    pub top_keywords: Vec<(String, usize)>,
}

impl DirectorySummary {
    pub fn render(&self) -> String {
        let mut out = String::from("Directory Summary:\n");
        out.push_str(&format!("Total files: {}\n", self.total_files));
        out.push_str(&format!("Total size: {} bytes\n", self.total_size));
        out.push_str("File types:\n");
        for (ext, count) in &self.extensions {
            out.push_str(&format!("{}: {}\n", ext, count));
        }
        out.push_str(&format!(
            "Top {} Keywords Across All Files:\n",
            KEYWORDS_TO_DISPLAY
        ));
        for (keyword, count) in &self.top_keywords {
            out.push_str(&format!("{}: {}\n", keyword, count));
        }
        out
    }
}

/// Walk `root` and summarize `.txt`, `.md` and `.py` files
pub fn summarize_directory(root: &Path) -> DirectorySummary {
    let mut summary = DirectorySummary::default();
    let mut keyword_files: HashMap<String, usize> = HashMap::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let ext = match entry.path().extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => continue,
        };
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }

        summary.total_files += 1;
        summary.total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
        *summary.extensions.entry(format!(".{}", ext)).or_insert(0) += 1;

        if let Ok(bytes) = std::fs::read(entry.path()) {
            let text = String::from_utf8_lossy(&bytes);
            for keyword in extract_keywords(&text, KEYWORDS_PER_FILE) {
                *keyword_files.entry(keyword).or_insert(0) += 1;
            }
        }
    }

    summary.top_keywords = top_n(keyword_files, KEYWORDS_TO_DISPLAY);
    summary
}

/// Most frequent non-stop-words, letters only, lowercased
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let cleaned = non_alpha().replace_all(text, " ").to_lowercase();
    let mut freq: HashMap<String, usize> = HashMap::new();
    for word in cleaned.split_whitespace() {
        if !STOP_WORDS.contains(&word) {
            *freq.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    top_n(freq, limit).into_iter().map(|(w, _)| w).collect()
}

/// Highest counts first, ties broken alphabetically
fn top_n(counts: HashMap<String, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_keywords_filters_stop_words() {
        let keywords = extract_keywords("The rust compiler and the Rust book. Rust 2021!", 3);
        assert_eq!(keywords[0], "rust");
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.iter().any(|k| k.chars().any(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_summarize_counts_text_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "rockets rockets fuel").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/b.py"), "rockets orbit").unwrap();
        fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();

        let summary = summarize_directory(dir.path());
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.total_size, 20 + 13);
        assert_eq!(summary.extensions.get(".md"), Some(&1));
        assert_eq!(summary.extensions.get(".py"), Some(&1));
        assert!(!summary.extensions.contains_key(".png"));
        assert_eq!(summary.top_keywords[0], ("rockets".to_string(), 2));

        let rendered = summary.render();
        assert!(rendered.starts_with("Directory Summary:\nTotal files: 2\n"));
        assert!(rendered.contains("Top 10 Keywords Across All Files:\nrockets: 2\n"));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let summary = summarize_directory(dir.path());
        assert_eq!(summary, DirectorySummary::default());
    }
}
