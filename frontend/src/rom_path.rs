//! Resolves a single ROM or GT1 file path to bytes. Unlike the arcade
//! frontends in this codebase, the Gigatron core takes one flat ROM image
//! and, optionally, one GT1 program — no multi-file ROM sets or archives
//! to assemble.

use std::fs;
use std::io;

pub fn read_file(path: &str) -> io::Result<Vec<u8>> {
    fs::read(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_contents_verbatim() {
        let dir = std::env::temp_dir().join("gigatron_rom_path_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.rom");
        fs::write(&path, [0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        let bytes = read_file(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_file("/nonexistent/gigatron.rom").is_err());
    }
}
