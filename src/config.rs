// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Engine-wide limits.

/// Limits applied while parsing. The defaults are generous enough for any
/// reasonably-authored template set; they exist to turn a pathological or
/// accidentally-cyclic input into a clean error rather than a hang.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum `{% extends %}`/`{% include %}` recursion depth before
    /// `ParserError::IncludeDepthExceeded`.
    pub max_include_depth: usize,
    /// Maximum length, in bytes, of a single literal run. `None` means
    /// unbounded.
    pub max_literal_len: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_include_depth: 64,
            max_literal_len: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_parser_fallback() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_include_depth, 64);
        assert_eq!(cfg.max_literal_len, None);
    }
}
