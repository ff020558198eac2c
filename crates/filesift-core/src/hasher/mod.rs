use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

const READ_BUFFER_LEN: usize = 64 * 1024;

/// Streaming BLAKE3 of a file's contents, as lowercase hex.
pub fn checksum_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; READ_BUFFER_LEN];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Byte-for-byte equality check. Sizes are compared before any content is read.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(checksum_file(a)? == checksum_file(b)?)
}
