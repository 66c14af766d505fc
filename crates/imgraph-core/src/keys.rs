//! Key derivation: mapping elements to stable identity strings

use std::ffi::OsStr;
use std::fmt::{Display, Write};
use std::path::Path;

/// Derives the identity string of an element.
///
/// Implementations must be pure and deterministic: the model re-derives keys
/// whenever it validates a vertex, so two calls on equal elements must agree.
/// Any `Fn(&V) -> String` closure is a key derivation.
pub trait KeyDerivation<V> {
    fn key(&self, element: &V) -> String;
}

impl<V, F> KeyDerivation<V> for F
where
    F: Fn(&V) -> String,
{
    fn key(&self, element: &V) -> String {
        self(element)
    }
}

/// Keys an element by the file name of its path (`images/cat.png` -> `cat.png`).
///
/// Paths without a file name component (`/`, `..`) fall back to the whole
/// path. Bytes that are not valid UTF-8 are written as `\xNN` and a literal
/// backslash as `\\`, so distinct names always get distinct keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameKey;

impl<P: AsRef<Path>> KeyDerivation<P> for FileNameKey {
    fn key(&self, element: &P) -> String {
        let path = element.as_ref();
        escape_os_str(path.file_name().unwrap_or(path.as_os_str()))
    }
}

fn escape_os_str(name: &OsStr) -> String {
    let mut out = String::with_capacity(name.len());
    for chunk in name.as_encoded_bytes().utf8_chunks() {
        for c in chunk.valid().chars() {
            if c == '\\' {
                out.push_str("\\\\");
            } else {
                out.push(c);
            }
        }
        for byte in chunk.invalid() {
            let _ = write!(out, "\\x{:02X}", byte);
        }
    }
    out
}

/// Keys an element by its `Display` rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayKey;

impl<V: Display> KeyDerivation<V> for DisplayKey {
    fn key(&self, element: &V) -> String {
        element.to_string()
    }
}
