//! Context assembly from retrieved documents

use crate::database::DocumentMatch;

/// Assembler for creating a context block from search results
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Render retrieved documents as numbered entries, stopping before the
    /// context budget is exceeded.
    #[must_use]
    pub fn assemble(&self, results: &[DocumentMatch]) -> String {
        let mut context = String::new();
        let mut total_length = 0;

        for (idx, result) in results.iter().enumerate() {
            let entry = format!("\n[Document {}]\n{}\n", idx + 1, result.content.trim());

            if total_length + entry.len() > self.max_context_length {
                break;
            }

            context.push_str(&entry);
            total_length += entry.len();
        }

        context
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(4000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> DocumentMatch {
        DocumentMatch {
            content: content.to_string(),
            metadata: serde_json::json!({}),
            similarity: 0.9,
        }
    }

    #[test]
    fn test_numbers_entries() {
        let assembler = ContextAssembler::default();
        let context = assembler.assemble(&[doc("first review"), doc("second review")]);
        assert!(context.contains("[Document 1]\nfirst review"));
        assert!(context.contains("[Document 2]\nsecond review"));
    }

    #[test]
    fn test_respects_length_budget() {
        let assembler = ContextAssembler::new(40);
        let context = assembler.assemble(&[doc("short"), doc(&"x".repeat(100))]);
        assert!(context.contains("[Document 1]"));
        assert!(!context.contains("[Document 2]"));
        assert!(context.len() <= 40);
    }

    #[test]
    fn test_empty_results() {
        let assembler = ContextAssembler::default();
        assert_eq!(assembler.assemble(&[]), "");
    }
}
