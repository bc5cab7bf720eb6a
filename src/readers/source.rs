use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

/// Loads a source file as text, buffered or memory-mapped.
pub fn read_text(path: &Path, use_mmap: bool) -> Result<String> {
    let file = File::open(path)?;

    let (text, encoding) = if use_mmap && file.metadata()?.len() > 0 {
        let mmap = unsafe { Mmap::map(&file)? };
        decode_bytes(&mmap)
    } else {
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        decode_bytes(&bytes)
    };

    debug!(
        path = %path.display(),
        encoding = encoding.name(),
        bytes = text.len(),
        "Loaded source file"
    );
    Ok(text)
}

/// Decodes file contents, honouring a BOM and falling back to Windows-1252
/// when the bytes are not valid UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> (String, &'static Encoding) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let (text, _, _) = encoding.decode(bytes);
        return (text.into_owned(), encoding);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), UTF_8),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            (text.into_owned(), WINDOWS_1252)
        }
    }
}
