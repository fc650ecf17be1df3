//! Directory assets travel as one gzip-compressed tar object.
//!
//! Archives are deterministic: entries sorted, timestamps and owners zeroed.
//! Only regular files are packed, so the archive and the meta listing
//! describe the same set of paths.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder, EntryType, Header};
use walkdir::WalkDir;

/// Sorted `/`-joined paths of every regular file under `root`
pub fn list_files(root: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        files.push(relative_name(root, entry.path())?);
    }
    files.sort();
    Ok(files)
}

/// Write `root` as tar+gzip into `writer`, returning the packed listing
pub fn pack_directory<W: Write>(root: &Path, writer: W) -> io::Result<Vec<String>> {
    let files = list_files(root)?;

    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);
    for name in &files {
        let path = root.join(name);
        let file = File::open(&path)?;
        let size = file.metadata()?.len();

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(size);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        builder.append_data(&mut header, name, file)?;
    }
    let encoder = builder.into_inner()?;
    encoder.finish()?.flush()?;
    Ok(files)
}

/// Unpack a tar+gzip stream into `dest`, which is created if missing.
///
/// Entries escaping `dest` are skipped by `tar` itself.
pub fn unpack_archive<R: Read>(reader: R, dest: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dest)?;
    let mut archive = Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(false);
    archive.unpack(dest)
}

fn relative_name(root: &Path, path: &Path) -> io::Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        let part = component.as_os_str().to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("non UTF-8 path {}", path.display()),
            )
        })?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}
