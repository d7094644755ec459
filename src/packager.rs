//! Turns a validated bundle into a reproducible `.skill.tar.gz` archive.
//!
//! Entries are sorted by path with mtime, uid and gid zeroed and modes
//! normalized to 0644/0755. The gzip header carries no timestamp or file
//! name, so packaging an unchanged bundle twice yields identical bytes. A
//! JSON manifest with per-file SHA-256 digests is appended as the last entry.

use flate2::{Compression, GzBuilder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ValidationConfig;
use crate::error::{Result, SkillError};
use crate::util::to_slash_path;
use crate::validator::{is_valid, StructureValidator, ValidationIssue};

pub const MANIFEST_NAME: &str = ".skill-manifest.json";
pub const ARCHIVE_SUFFIX: &str = ".skill.tar.gz";

/// Bundle-root files are grouped under this key in the size breakdown.
pub const ROOT_GROUP: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSize {
    pub files: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub files: Vec<ManifestEntry>,
    pub total_bytes: u64,
    /// Keyed by top-level directory, or [`ROOT_GROUP`]
    pub directories: BTreeMap<String, GroupSize>,
}

impl Manifest {
    fn new(name: String, files: Vec<ManifestEntry>) -> Self {
        let mut directories: BTreeMap<String, GroupSize> = BTreeMap::new();
        for entry in &files {
            let group = match entry.path.split_once('/') {
                Some((top, _)) => top.to_string(),
                None => ROOT_GROUP.to_string(),
            };
            let size = directories.entry(group).or_default();
            size.files += 1;
            size.bytes += entry.size;
        }
        Self {
            name,
            total_bytes: files.iter().map(|f| f.size).sum(),
            files,
            directories,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackageReport {
    pub archive: PathBuf,
    pub archive_bytes: u64,
    pub manifest: Manifest,
    /// Warnings from validation; packaging only proceeds without errors
    pub warnings: Vec<ValidationIssue>,
}

pub struct Packager {
    validator: StructureValidator,
}

impl Default for Packager {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl Packager {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            validator: StructureValidator::new(config),
        }
    }

    /// Validate `bundle` and write `<output_dir>/<bundle-name>.skill.tar.gz`.
    /// Nothing is written when validation reports an error.
    pub fn package(&self, bundle: &Path, output_dir: &Path) -> Result<PackageReport> {
        if !bundle.is_dir() {
            return Err(SkillError::NotFound(bundle.to_path_buf()));
        }

        let issues = self.validator.validate(bundle);
        if !is_valid(&issues) {
            return Err(SkillError::ValidationFailed { issues });
        }

        let name = bundle_name(bundle)?;
        let files = collect_files(bundle)?;
        debug!("Packaging {} files from {}", files.len(), bundle.display());

        fs::create_dir_all(output_dir).map_err(|e| SkillError::from_io(e, output_dir))?;
        let archive_path = output_dir.join(format!("{}{}", name, ARCHIVE_SUFFIX));

        let mut staged = tempfile::Builder::new()
            .prefix(".skillsmith-package-")
            .tempfile_in(output_dir)
            .map_err(|e| SkillError::from_io(e, output_dir))?;
        let manifest = write_archive(staged.as_file_mut(), bundle, &files, name)?;
        staged
            .persist(&archive_path)
            .map_err(|e| SkillError::from_io(e.error, &archive_path))?;

        let archive_bytes = fs::metadata(&archive_path)
            .map_err(|e| SkillError::from_io(e, &archive_path))?
            .len();

        info!(
            archive = %archive_path.display(),
            files = manifest.files.len(),
            bytes = manifest.total_bytes,
            archive_bytes,
            "Packaged skill bundle"
        );

        Ok(PackageReport {
            archive: archive_path,
            archive_bytes,
            manifest,
            warnings: issues,
        })
    }
}

fn bundle_name(bundle: &Path) -> Result<String> {
    let resolved = fs::canonicalize(bundle).map_err(|e| SkillError::from_io(e, bundle))?;
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            SkillError::Archive(format!("Cannot derive a name from {}", bundle.display()))
        })
}

/// Files to include, as `(bundle-relative path, absolute path)` sorted by relative path.
pub fn collect_files(bundle: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    walk(bundle, bundle, &mut files)?;
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| SkillError::from_io(e, dir))?;
    for entry in entries {
        let entry = entry.map_err(|e| SkillError::from_io(e, dir))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_excluded(&name) {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| SkillError::from_io(e, &path))?;
        if file_type.is_dir() {
            walk(root, &path, out)?;
        } else if file_type.is_file() {
            let rel = to_slash_path(path.strip_prefix(root).unwrap_or(&path));
            out.push((rel, path));
        } else {
            debug!("Skipping non-regular file {}", path.display());
        }
    }
    Ok(())
}

/// Path segments packaging leaves out of the archive.
pub(crate) fn is_excluded(name: &str) -> bool {
    name.starts_with('.')
        || name == "__pycache__"
        || name.ends_with(".pyc")
        || name.ends_with(".pyo")
        || name.ends_with(ARCHIVE_SUFFIX)
}

fn write_archive(
    out: &mut fs::File,
    bundle: &Path,
    files: &[(String, PathBuf)],
    name: String,
) -> Result<Manifest> {
    let encoder = GzBuilder::new()
        .mtime(0)
        .write(out, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    let mut entries = Vec::with_capacity(files.len());
    for (rel, path) in files {
        let data = fs::read(path).map_err(|e| SkillError::from_io(e, path))?;
        append(&mut builder, rel, &data, file_mode(path))?;
        entries.push(ManifestEntry {
            path: rel.clone(),
            size: data.len() as u64,
            sha256: hex::encode(Sha256::digest(&data)),
        });
    }

    let manifest = Manifest::new(name, entries);
    let json = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| SkillError::Archive(format!("Failed to encode manifest: {}", e)))?;
    append(&mut builder, MANIFEST_NAME, &json, 0o644)?;

    let encoder = builder
        .into_inner()
        .map_err(|e| SkillError::Archive(format!("Failed to finish tar stream: {}", e)))?;
    let out = encoder
        .finish()
        .map_err(|e| SkillError::Archive(format!("Failed to finish gzip stream: {}", e)))?;
    out.flush()?;

    debug!("Archive written for {}", bundle.display());
    Ok(manifest)
}

fn append<W: Write>(
    builder: &mut tar::Builder<W>,
    path: &str,
    data: &[u8],
    mode: u32,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(mode);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    builder
        .append_data(&mut header, path, data)
        .map_err(|e| SkillError::Archive(format!("Failed to add {}: {}", path, e)))
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(meta) if meta.permissions().mode() & 0o111 != 0 => 0o755,
        _ => 0o644,
    }
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
    0o644
}
