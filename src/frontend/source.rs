use std::borrow::Cow;
use std::path::Path;

/// An immutable program text, read in full before scanning starts.
///
/// The file is read as raw bytes. Each malformed UTF-8 sequence becomes one
/// U+FFFD, which the scanner reports as an invalid token, so a stray byte
/// is a lexical error and not a load failure.
#[derive(Debug, Clone)]
pub struct Source {
    text: String,
}

impl Source {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        log::debug!("loaded {} bytes from {}", bytes.len(), path.display());
        Ok(Source::from_bytes(&bytes))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = match String::from_utf8_lossy(bytes) {
            Cow::Borrowed(text) => text.to_string(),
            Cow::Owned(text) => {
                log::debug!("source contains malformed UTF-8");
                text
            }
        };
        Source { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::token::TokenKind;

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Source::load(Path::new("/definitely/not/here.ql")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_load_reads_whole_file() {
        let path = std::env::temp_dir().join(format!("quill-source-{}.ql", std::process::id()));
        std::fs::write(&path, "1 +\n2").unwrap();

        let source = Source::load(&path).unwrap();
        assert_eq!(source.text(), "1 +\n2");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_utf8_scans_to_invalid_token() {
        let source = Source::from_bytes(b"1 + \xff 2");
        let (tokens, diagnostics) = Lexer::new(source.text()).scan();
        assert_eq!(
            tokens.kinds(),
            vec![
                TokenKind::NumberInt,
                TokenKind::Plus,
                TokenKind::Invalid,
                TokenKind::NumberInt,
                TokenKind::Eof
            ]
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.first().unwrap().to_string(),
            "[line 1] at invalid token: Malformed UTF-8 byte sequence."
        );
    }
}
