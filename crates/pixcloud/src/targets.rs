//! Label-data target files.
//!
//! Each non-comment line names an aligned/template FITS pair and, optionally,
//! the pixel the label points at:
//!
//! ```text
//! index file_dir aligned template [center_ra center_dec time pixel_x pixel_y [ra dec]]
//! ```
//!
//! The files are often written on another machine, so `file_dir` may be a
//! Windows path that does not exist locally. [`TargetRecord::resolve`] falls
//! back to searching local roots for a file with the same name.

use crate::error::TargetsError;
use crate::generate::PixelCenter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq)]
pub struct TargetRecord {
    pub index: String,
    pub file_dir: String,
    pub aligned_filename: String,
    pub template_aligned_filename: String,
    pub pixel_center: Option<PixelCenter>,
    pub ra_dec: Option<(f64, f64)>,
}

/// Resolved on-disk locations of a record's two images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitsPair {
    pub aligned: PathBuf,
    pub template: PathBuf,
}

fn parse_pixel(s: &str) -> Option<i32> {
    s.parse::<i32>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i32))
}

fn parse_line(line: &str) -> Option<TargetRecord> {
    let mut it = line.split_whitespace();
    let index = it.next()?.to_string();
    let file_dir = it.next()?.to_string();
    let aligned_filename = it.next()?.to_string();
    let template_aligned_filename = it.next()?.to_string();

    let rest: Vec<&str> = it.collect();

    // center_ra center_dec time pixel_x pixel_y
    let pixel_center = match rest.as_slice() {
        [cra, cdec, _time, px, py, ..] => {
            let header_ok = cra.parse::<f64>().is_ok() && cdec.parse::<f64>().is_ok();
            match (header_ok, parse_pixel(px), parse_pixel(py)) {
                (true, Some(x), Some(y)) => Some(PixelCenter::new(x, y)),
                _ => None,
            }
        }
        _ => None,
    };

    let ra_dec = match (pixel_center, rest.get(5), rest.get(6)) {
        (Some(_), Some(ra), Some(dec)) => match (ra.parse::<f64>(), dec.parse::<f64>()) {
            (Ok(ra), Ok(dec)) => Some((ra, dec)),
            _ => None,
        },
        _ => None,
    };

    Some(TargetRecord {
        index,
        file_dir,
        aligned_filename,
        template_aligned_filename,
        pixel_center,
        ra_dec,
    })
}

/// Parses every record in `text`, skipping blanks, `#` comments and short lines.
pub fn parse_targets(text: &str) -> Vec<TargetRecord> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(parse_line)
        .collect()
}

/// Reads and parses a target file. A file without records is an error.
pub fn read_targets(path: &Path) -> Result<Vec<TargetRecord>, TargetsError> {
    let text = std::fs::read_to_string(path).map_err(|source| TargetsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_targets(&text);
    if records.is_empty() {
        return Err(TargetsError::NoRecords(path.to_path_buf()));
    }
    log::info!("Parsed {} target records from {}", records.len(), path.display());
    Ok(records)
}

/// Standard places to look for images named by a record.
pub fn default_search_roots(cwd: &Path) -> Vec<PathBuf> {
    vec![
        cwd.to_path_buf(),
        cwd.join("test-img"),
        cwd.join("test-label-data"),
        cwd.join("..").join("..").join(".."),
    ]
}

/// Last path component, treating both `/` and `\` as separators.
fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn is_absolute_anywhere(path: &str) -> bool {
    let b = path.as_bytes();
    let drive = b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && (b[2] == b'\\' || b[2] == b'/');
    drive || path.starts_with('\\') || Path::new(path).is_absolute()
}

/// First regular file named `name` below `root`, in file-name order.
pub fn find_file_by_name(root: &Path, name: &str) -> Option<PathBuf> {
    if !root.is_dir() {
        return None;
    }
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|e| e.file_type().is_file() && e.file_name().to_str() == Some(name))
        .map(|e| e.into_path())
}

/// Returns `candidate` if it exists, else the first same-named file under
/// `roots`, else `candidate` unchanged.
pub fn resolve_path(candidate: &Path, roots: &[PathBuf]) -> PathBuf {
    if candidate.exists() {
        return candidate.to_path_buf();
    }
    let Some(text) = candidate.to_str() else {
        return candidate.to_path_buf();
    };
    let name = file_name_of(text);
    if name.is_empty() {
        return candidate.to_path_buf();
    }

    for root in roots {
        if let Some(found) = find_file_by_name(root, name) {
            log::debug!("Resolved {} to {}", text, found.display());
            return found;
        }
    }
    candidate.to_path_buf()
}

impl TargetRecord {
    fn candidate(&self, filename: &str) -> PathBuf {
        if is_absolute_anywhere(filename) || self.file_dir.is_empty() {
            PathBuf::from(filename)
        } else {
            Path::new(&self.file_dir).join(filename)
        }
    }

    /// Locates the aligned and template images on the local disk.
    pub fn resolve(&self, search_roots: &[PathBuf]) -> FitsPair {
        FitsPair {
            aligned: resolve_path(&self.candidate(&self.aligned_filename), search_roots),
            template: resolve_path(&self.candidate(&self.template_aligned_filename), search_roots),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# index file_dir aligned template ...
1 E:\\survey\\night1 a_001.fits t_001.fits 150.1 2.2 2024-01-01T00:00:00 512 384 150.2 2.3

2 data b.fits tb.fits 150.1 2.2 2024-01-01T00:00:00 10 20
3 data c.fits tc.fits
4 data d.fits td.fits 150.1 2.2 t notanumber 5
short line only
";

    #[test]
    fn test_parse_optional_fields() {
        let recs = parse_targets(SAMPLE);
        assert_eq!(recs.len(), 4);

        assert_eq!(recs[0].index, "1");
        assert_eq!(recs[0].file_dir, "E:\\survey\\night1");
        assert_eq!(recs[0].pixel_center, Some(PixelCenter::new(512, 384)));
        assert_eq!(recs[0].ra_dec, Some((150.2, 2.3)));

        assert_eq!(recs[1].pixel_center, Some(PixelCenter::new(10, 20)));
        assert_eq!(recs[1].ra_dec, None);

        assert_eq!(recs[2].aligned_filename, "c.fits");
        assert_eq!(recs[2].pixel_center, None);

        assert_eq!(recs[3].pixel_center, None);
        assert_eq!(recs[3].ra_dec, None);
    }

    #[test]
    fn test_float_pixel_fields_truncate() {
        let recs = parse_targets("9 d a.fits t.fits 1.0 2.0 now 12.7 3.2");
        assert_eq!(recs[0].pixel_center, Some(PixelCenter::new(12, 3)));
    }

    #[test]
    fn test_read_targets_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("none.txt");
        assert!(matches!(read_targets(&missing), Err(TargetsError::Io { .. })));

        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "# only a comment\n\n").unwrap();
        assert!(matches!(read_targets(&empty), Err(TargetsError::NoRecords(_))));

        let good = dir.path().join("good.txt");
        fs::write(&good, "1 d a.fits t.fits\n").unwrap();
        assert_eq!(read_targets(&good).unwrap().len(), 1);
    }

    #[test]
    fn test_file_name_of_handles_both_separators() {
        assert_eq!(file_name_of("E:\\a\\b\\img.fits"), "img.fits");
        assert_eq!(file_name_of("a/b/img.fits"), "img.fits");
        assert_eq!(file_name_of("img.fits"), "img.fits");
        assert!(is_absolute_anywhere("C:\\x\\y.fits"));
        assert!(is_absolute_anywhere("/abs/y.fits"));
        assert!(!is_absolute_anywhere("rel/y.fits"));
    }

    #[test]
    fn test_resolve_existing_candidate() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.fits"), b"x").unwrap();
        fs::write(dir.path().join("t.fits"), b"x").unwrap();
        let rec = TargetRecord {
            index: "1".into(),
            file_dir: dir.path().to_string_lossy().into_owned(),
            aligned_filename: "a.fits".into(),
            template_aligned_filename: "t.fits".into(),
            pixel_center: None,
            ra_dec: None,
        };
        let pair = rec.resolve(&[]);
        assert_eq!(pair.aligned, dir.path().join("a.fits"));
        assert_eq!(pair.template, dir.path().join("t.fits"));
    }

    #[test]
    fn test_resolve_by_file_name_under_roots() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("test-img").join("night1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("a_001.fits"), b"x").unwrap();

        let recs = parse_targets(SAMPLE);
        // Skip the `../../..` root so the test stays inside the temp dir.
        let roots = &default_search_roots(dir.path())[..3];
        let pair = recs[0].resolve(roots);
        assert_eq!(pair.aligned, nested.join("a_001.fits"));
        // Not found anywhere: the joined candidate comes back unchanged.
        assert_eq!(
            pair.template,
            Path::new("E:\\survey\\night1").join("t_001.fits")
        );
    }
}
