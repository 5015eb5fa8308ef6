//! Capture export: render lines and write them in a chosen text encoding.
//!
//! Format: one node per line, each followed by a blank separator line when
//! separator lines are enabled. The file is written to `<file>.tmp` and
//! renamed into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::TreeError;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Big-endian with a byte order mark.
    Utf16,
    Latin1,
    Ascii,
}


impl TextEncoding {
    /// Look up an encoding by name. Case, `-` and `_` are ignored.
    pub fn from_name(name: &str) -> Option<TextEncoding> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        match key.as_str() {
            "UTF8" => Some(TextEncoding::Utf8),
            "UTF16LE" => Some(TextEncoding::Utf16Le),
            "UTF16BE" => Some(TextEncoding::Utf16Be),
            "UTF16" => Some(TextEncoding::Utf16),
            "ISO88591" | "LATIN1" => Some(TextEncoding::Latin1),
            "USASCII" | "ASCII" => Some(TextEncoding::Ascii),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf16 => "UTF-16",
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Ascii => "US-ASCII",
        }
    }

    /// Encode `text`, or `None` if a character has no representation.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
            TextEncoding::Utf16Le => Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            TextEncoding::Utf16 => {
                let mut bytes = vec![0xFE, 0xFF];
                bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                Some(bytes)
            }
            TextEncoding::Latin1 => text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect(),
            TextEncoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { Some(c as u8) } else { None })
                .collect(),
        }
    }
}


/// Pick the export encoding: the caller's name, else the configured one,
/// else UTF-8. Blank names count as not given.
pub fn resolve_encoding(
    requested: Option<&str>,
    configured: Option<&str>,
    file: &Path,
) -> Result<TextEncoding, TreeError> {
    let name = [requested, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|n| !n.is_empty());
    match name {
        None => Ok(TextEncoding::Utf8),
        Some(n) => TextEncoding::from_name(n).ok_or_else(|| TreeError::Encoding {
            file: file.display().to_string(),
            encoding: n.to_string(),
        }),
    }
}


pub fn render(lines: &[String], separator_lines: bool) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
        if separator_lines {
            out.push('\n');
        }
    }
    out
}


/// Render and write `lines` to `file`.
pub fn write_lines(
    file: &Path,
    lines: &[String],
    encoding: TextEncoding,
    separator_lines: bool,
) -> Result<(), TreeError> {
    let text = render(lines, separator_lines);
    let bytes = encoding.encode(&text).ok_or_else(|| TreeError::Encoding {
        file: file.display().to_string(),
        encoding: encoding.name().to_string(),
    })?;
    atomic_write(file, &bytes).map_err(|source| TreeError::Io {
        file: file.display().to_string(),
        source,
    })?;
    info!(file = %file.display(), lines = lines.len(), encoding = encoding.name(), "tree data exported");
    Ok(())
}


fn atomic_write(file: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = temp_path(file);
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    debug!(tmp = %tmp.display(), "renaming export into place");
    fs::rename(&tmp, file)
}


fn temp_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn encoding_names_are_lenient() {
        assert_eq!(TextEncoding::from_name("utf-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_name("UTF_16le"), Some(TextEncoding::Utf16Le));
        assert_eq!(TextEncoding::from_name("latin1"), Some(TextEncoding::Latin1));
        assert_eq!(TextEncoding::from_name("ISO-8859-1"), Some(TextEncoding::Latin1));
        assert_eq!(TextEncoding::from_name("US-ASCII"), Some(TextEncoding::Ascii));
        assert_eq!(TextEncoding::from_name("EBCDIC"), None);
    }

    #[test]
    fn utf16_variants() {
        assert_eq!(TextEncoding::Utf16Le.encode("A").unwrap(), vec![0x41, 0x00]);
        assert_eq!(TextEncoding::Utf16Be.encode("A").unwrap(), vec![0x00, 0x41]);
        assert_eq!(TextEncoding::Utf16.encode("A").unwrap(), vec![0xFE, 0xFF, 0x00, 0x41]);
    }

    #[test]
    fn narrow_encodings_reject_wide_chars() {
        assert_eq!(TextEncoding::Latin1.encode("Dvořák"), None);
        assert_eq!(TextEncoding::Latin1.encode("Händel").unwrap().len(), 6);
        assert_eq!(TextEncoding::Ascii.encode("Händel"), None);
    }

    #[test]
    fn blank_request_falls_back_to_configured() {
        let file = Path::new("out.txt");
        assert_eq!(resolve_encoding(Some("  "), Some("UTF-16BE"), file).unwrap(), TextEncoding::Utf16Be);
        assert_eq!(resolve_encoding(None, None, file).unwrap(), TextEncoding::Utf8);
        let err = resolve_encoding(Some("klingon"), None, file).unwrap_err();
        assert!(err.to_string().contains("out.txt"));
    }

    #[test]
    fn render_with_and_without_separators() {
        let l = lines(&["Folder", "\tDoc1"]);
        assert_eq!(render(&l, true), "Folder\n\n\tDoc1\n\n");
        assert_eq!(render(&l, false), "Folder\n\tDoc1\n");
    }

    #[test]
    fn write_creates_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("tree.txt");
        write_lines(&file, &lines(&["Root", "\tA"]), TextEncoding::Utf8, true).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "Root\n\n\tA\n\n");
        assert!(!temp_path(&file).exists());
    }

    #[test]
    fn unencodable_text_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tree.txt");
        let err = write_lines(&file, &lines(&["Dvořák"]), TextEncoding::Ascii, false).unwrap_err();
        assert!(matches!(err, TreeError::Encoding { .. }));
        assert!(err.to_string().contains("tree.txt"));
        assert!(!file.exists());
    }

    #[test]
    fn unwritable_target_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("plain.txt");
        fs::write(&blocker, "x").unwrap();
        let err = write_lines(&blocker.join("tree.txt"), &lines(&["A"]), TextEncoding::Utf8, false).unwrap_err();
        assert!(matches!(err, TreeError::Io { .. }));
    }
}
