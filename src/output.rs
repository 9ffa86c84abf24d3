use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Write normalized BibTeX text to `path`. In append mode a single newline
/// is inserted first when the existing file does not already end with one,
/// so consecutive writes never share a line.
pub fn save_bibtex(bib_str: &str, path: &Path, append: bool) -> std::io::Result<()> {
    if !append {
        return fs::write(path, bib_str);
    }

    let separator = needs_separator(path);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if separator {
        file.write_all(b"\n")?;
    }
    file.write_all(bib_str.as_bytes())
}

/// A missing or empty file needs no separator. If the file exists but
/// cannot be inspected, assume the separator is needed.
fn needs_separator(path: &Path) -> bool {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return false,
        Err(_) => return true,
    };
    if len == 0 {
        return false;
    }
    let mut last = [0u8; 1];
    match fs::File::open(path).and_then(|mut file| {
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)
    }) {
        Ok(()) => last[0] != b'\n',
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");
        fs::write(&path, "old content").unwrap();

        save_bibtex("@article{a,\n}\n", &path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "@article{a,\n}\n");
    }

    #[test]
    fn append_to_missing_file_adds_no_leading_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");

        save_bibtex("@article{a,\n}\n", &path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "@article{a,\n}\n");
    }

    #[test]
    fn append_to_empty_file_adds_no_leading_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");
        fs::write(&path, "").unwrap();

        save_bibtex("@article{a,\n}\n", &path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "@article{a,\n}\n");
    }

    #[test]
    fn append_inserts_separator_when_last_byte_is_not_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");
        fs::write(&path, "@article{a,\n}").unwrap();

        save_bibtex("@article{b,\n}\n", &path, true).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "@article{a,\n}\n@article{b,\n}\n"
        );
    }

    #[test]
    fn append_adds_no_separator_after_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");
        fs::write(&path, "@article{a,\n}\n").unwrap();

        save_bibtex("@article{b,\n}\n", &path, true).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "@article{a,\n}\n@article{b,\n}\n"
        );
    }
}
