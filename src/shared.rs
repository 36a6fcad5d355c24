use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

// Local resources
pub const RESOURCES: &str = "resources";

/// Expands `seed` into `keys.len() + 1` values where each one is the previous
/// value XORed with the next key.
pub fn xor_chain(seed: u32, keys: &[u32]) -> Vec<u32> {
    let mut chain = Vec::with_capacity(keys.len() + 1);
    chain.push(seed);
    for key in keys {
        let prev = chain[chain.len() - 1];
        chain.push(prev ^ key);
    }
    chain
}

/// XORs `data` with `key` position by position. Both must be the same length.
pub fn xor_with_key(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if data.len() != key.len() {
        return Err(anyhow!(
            "Data is {} bytes but key is {} bytes",
            data.len(),
            key.len()
        ));
    }

    Ok(data.iter().zip(key).map(|(d, k)| d ^ k).collect())
}

pub fn pack_le_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Renders bytes the way a byte-string literal prints: `b"HTB{\x00...}"`.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let body = bytes
        .iter()
        .map(|&b| match b {
            b'\\' => "\\\\".to_string(),
            b'"' => "\\\"".to_string(),
            b'\n' => "\\n".to_string(),
            b'\r' => "\\r".to_string(),
            b'\t' => "\\t".to_string(),
            0x20..=0x7e => (b as char).to_string(),
            _ => format!("\\x{:02x}", b),
        })
        .join("");
    format!("b\"{}\"", body)
}

// A missing file is not an error, callers fall back to their embedded values
// or skip the task.
fn open_resource(path: &Path) -> Result<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Unable to open {}", path.display())),
    }
}

pub fn load_resource<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match open_resource(path)? {
        Some(file) => file,
        None => return Ok(None),
    };

    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Unable to parse {}", path.display()))?;
    Ok(Some(value))
}

pub fn load_text_resource(path: &Path) -> Result<Option<String>> {
    let mut file = match open_resource(path)? {
        Some(file) => file,
        None => return Ok(None),
    };

    let mut text = String::new();
    file.read_to_string(&mut text)
        .with_context(|| format!("Unable to read {}", path.display()))?;
    Ok(Some(text))
}
