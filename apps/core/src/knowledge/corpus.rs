//! Corpus Store - splits a plain-text corpus into passages.

use crate::error::AppError;
use crate::models::Passage;
use std::path::Path;
use tracing::info;

pub struct CorpusStore;

impl CorpusStore {
    /// Reads `path` and splits it into passages.
    ///
    /// Fails with [`AppError::CorpusLoad`] when the file is missing, unreadable or holds
    /// no non-blank paragraph.
    pub fn load(path: &Path) -> Result<Vec<Passage>, AppError> {
        if !path.exists() {
            return Err(AppError::CorpusLoad(format!(
                "Corpus file not found: {:?}",
                path
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::CorpusLoad(format!("Failed to read corpus {:?}: {}", path, e))
        })?;

        let passages = Self::parse(&text);
        if passages.is_empty() {
            return Err(AppError::CorpusLoad(format!(
                "Corpus {:?} contains no passages",
                path
            )));
        }

        info!("Loaded {} passages from {:?}", passages.len(), path);
        Ok(passages)
    }

    /// Splits text on blank lines; whitespace-only paragraphs are dropped and the
    /// survivors are numbered 0..n in source order.
    pub fn parse(text: &str) -> Vec<Passage> {
        let mut paragraphs: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        // lines() also strips the '\r' of CRLF endings.
        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join("\n"));
        }

        paragraphs
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .enumerate()
            .map(|(id, text)| Passage { id, text })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_blank_lines() {
        let passages = CorpusStore::parse("1 O Son of Spirit!\nline two\n\n2 O Son of Being!\n");
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].text, "1 O Son of Spirit!\nline two");
        assert_eq!(passages[1].id, 1);
    }

    #[test]
    fn test_parse_ignores_whitespace_paragraphs_and_crlf() {
        let passages = CorpusStore::parse("\r\n   \r\nfirst\r\n\r\n\t\r\n\r\nsecond\r\n");
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(passages[1].id, 1);
    }
}
