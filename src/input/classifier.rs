use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::types::InputMode;
use crate::input::layout::{
    bacterial_genomes_dir, direct_subdir_file, prophage_workflow_file, DirectoryShape,
    InputLayout, MERGED_PROPHAGE_FILE, PROPHAGE_DETECTION_SUBDIR,
};
use crate::utils::validation::{has_sequence_extension, sequence_extensions_display};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input path does not exist: {}", .path.display())]
    PathNotFound { path: PathBuf },

    #[error(
        "Invalid file extension '{extension}' for {}. Expected one of: {}",
        .path.display(),
        sequence_extensions_display()
    )]
    InvalidExtension { path: PathBuf, extension: String },

    #[error("Input file is empty: {}", .path.display())]
    EmptyInput { path: PathBuf },

    #[error(
        "Directory contains no {} files: {}{}",
        sequence_extensions_display(),
        .path.display(),
        .unpopulated.as_ref().map(|p| format!(
            "\nA bacterial workflow structure was found but holds no genome files:\n  {}",
            p.display()
        )).unwrap_or_default()
    )]
    NoGenomeFiles {
        path: PathBuf,
        /// Recognized workflow output directory that turned out to be empty
        unpopulated: Option<PathBuf>,
    },

    #[error(
        "Directory contains multiple FASTA files ({count} files found): {}\n\
         Annotation workflow requires a single merged prophage file. \
         Please use the prophage workflow output or merge sequences into a single file.",
        .path.display()
    )]
    MultipleFilesAmbiguous { path: PathBuf, count: usize },

    #[error(
        "Directory does not contain valid prophage input: {}\nExpected:\n  \
         - Prophage workflow results (with {PROPHAGE_DETECTION_SUBDIR}/{MERGED_PROPHAGE_FILE})\n  \
         - Direct subdirectory (with {MERGED_PROPHAGE_FILE})\n  \
         - Single FASTA file",
        .path.display()
    )]
    NoValidInput { path: PathBuf },

    #[error("Input path is neither a file nor a directory: {}", .path.display())]
    UnsupportedPathType { path: PathBuf },

    #[error("Failed to inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InputError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Outcome of classifying one input path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputResolution {
    /// Recognized layout
    pub mode: InputMode,
    /// The file or directory the engine consumes
    pub path: PathBuf,
    /// Workflow output artifact that identified the layout, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<PathBuf>,
    /// Number of sequence files found at the consumed location
    pub sequence_files: usize,
}

impl InputResolution {
    fn single_file(path: &Path) -> Self {
        Self {
            mode: InputMode::SingleFile,
            path: path.to_path_buf(),
            marker: None,
            sequence_files: 1,
        }
    }
}

enum ShapeMatch {
    Matched(InputResolution),
    Absent,
    /// The shape's directory exists but holds no sequence files
    Unpopulated(PathBuf),
}

/// Classify `path` as one of the input layouts accepted by `layout`.
///
/// Only filesystem metadata and directory listings are read.
///
/// # Errors
///
/// Returns an `InputError` naming the single reason the path was rejected.
pub fn classify(path: &Path, layout: InputLayout) -> Result<InputResolution, InputError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(InputError::PathNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(InputError::io(path, e)),
    };

    let resolution = if metadata.is_file() {
        classify_file(path, metadata.len())?
    } else if metadata.is_dir() {
        classify_dir(path, layout)?
    } else {
        return Err(InputError::UnsupportedPathType {
            path: path.to_path_buf(),
        });
    };

    debug!(
        mode = %resolution.mode,
        path = %resolution.path.display(),
        "classified input"
    );
    Ok(resolution)
}

fn classify_file(path: &Path, len: u64) -> Result<InputResolution, InputError> {
    if !has_sequence_extension(path) {
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        return Err(InputError::InvalidExtension {
            path: path.to_path_buf(),
            extension,
        });
    }
    if len == 0 {
        return Err(InputError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    Ok(InputResolution::single_file(path))
}

fn classify_dir(dir: &Path, layout: InputLayout) -> Result<InputResolution, InputError> {
    let mut unpopulated = None;

    for shape in layout.directory_shapes() {
        match match_shape(dir, *shape)? {
            ShapeMatch::Matched(resolution) => return Ok(resolution),
            ShapeMatch::Absent => debug!(?shape, dir = %dir.display(), "shape not present"),
            ShapeMatch::Unpopulated(found) => {
                debug!(?shape, dir = %found.display(), "shape present but empty");
                unpopulated = Some(found);
            }
        }
    }

    match layout {
        InputLayout::Annotation => Err(InputError::NoValidInput {
            path: dir.to_path_buf(),
        }),
        InputLayout::GenomeQc | InputLayout::ProphageDetection => Err(InputError::NoGenomeFiles {
            path: dir.to_path_buf(),
            unpopulated,
        }),
    }
}

fn match_shape(dir: &Path, shape: DirectoryShape) -> Result<ShapeMatch, InputError> {
    match shape {
        DirectoryShape::BacterialWorkflowOutput => {
            let genomes = bacterial_genomes_dir(dir);
            if !is_dir(&genomes)? {
                return Ok(ShapeMatch::Absent);
            }
            let files = sequence_files(&genomes)?;
            if files.is_empty() {
                return Ok(ShapeMatch::Unpopulated(genomes));
            }
            Ok(ShapeMatch::Matched(InputResolution {
                mode: InputMode::BacterialWorkflow,
                path: dir.to_path_buf(),
                sequence_files: files.len(),
                marker: Some(genomes),
            }))
        }
        DirectoryShape::GenomeFiles => {
            let files = sequence_files(dir)?;
            if files.is_empty() {
                return Ok(ShapeMatch::Absent);
            }
            Ok(ShapeMatch::Matched(InputResolution {
                mode: InputMode::Directory,
                path: dir.to_path_buf(),
                marker: None,
                sequence_files: files.len(),
            }))
        }
        DirectoryShape::ProphageWorkflowOutput => {
            merged_file(dir, prophage_workflow_file(dir), InputMode::ProphageWorkflow)
        }
        DirectoryShape::MergedProphageFile => {
            merged_file(dir, direct_subdir_file(dir), InputMode::DirectSubdir)
        }
        DirectoryShape::SingleSequenceFile => {
            let files = sequence_files(dir)?;
            match files.as_slice() {
                [] => Ok(ShapeMatch::Absent),
                [file] => {
                    if file_len(file)? == Some(0) {
                        return Err(InputError::EmptyInput { path: file.clone() });
                    }
                    Ok(ShapeMatch::Matched(InputResolution::single_file(file)))
                }
                _ => Err(InputError::MultipleFilesAmbiguous {
                    path: dir.to_path_buf(),
                    count: files.len(),
                }),
            }
        }
    }
}

/// A directory identified by its merged prophage sequence file
fn merged_file(dir: &Path, marker: PathBuf, mode: InputMode) -> Result<ShapeMatch, InputError> {
    match file_len(&marker)? {
        None => Ok(ShapeMatch::Absent),
        Some(0) => Err(InputError::EmptyInput { path: marker }),
        Some(_) => Ok(ShapeMatch::Matched(InputResolution {
            mode,
            path: dir.to_path_buf(),
            marker: Some(marker),
            sequence_files: 1,
        })),
    }
}

/// Size of a regular file, or None if nothing (or a non-file) is there
fn file_len(path: &Path) -> Result<Option<u64>, InputError> {
    match fs::metadata(path) {
        Ok(m) if m.is_file() => Ok(Some(m.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(InputError::io(path, e)),
    }
}

fn is_dir(path: &Path) -> Result<bool, InputError> {
    match fs::metadata(path) {
        Ok(m) => Ok(m.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(InputError::io(path, e)),
    }
}

/// Sequence files directly inside `dir`, sorted by path
fn sequence_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let entries = fs::read_dir(dir).map_err(|e| InputError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| InputError::io(dir, e))?.path();
        if has_sequence_extension(&path) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::layout::BACTERIAL_GENOMES_SUBDIR;

    const SEQ: &[u8] = b">contig_1\nACGTACGT\n";

    fn write(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn bacterial_output(root: &Path) -> PathBuf {
        let mut dir = root.to_path_buf();
        for part in BACTERIAL_GENOMES_SUBDIR {
            dir.push(part);
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = classify(&dir.path().join("nope.fa"), InputLayout::GenomeQc).unwrap_err();
        assert!(matches!(err, InputError::PathNotFound { .. }));
    }

    #[test]
    fn test_single_file_all_layouts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.fa", "b.fasta", "c.fna", "d.FASTA"] {
            let path = dir.path().join(name);
            write(&path, SEQ);
            for layout in [
                InputLayout::GenomeQc,
                InputLayout::ProphageDetection,
                InputLayout::Annotation,
            ] {
                let res = classify(&path, layout).unwrap();
                assert_eq!(res.mode, InputMode::SingleFile);
                assert_eq!(res.path, path);
            }
        }
    }

    #[test]
    fn test_invalid_extension_regardless_of_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.txt");
        write(&path, SEQ);
        let err = classify(&path, InputLayout::GenomeQc).unwrap_err();
        match &err {
            InputError::InvalidExtension { extension, .. } => assert_eq!(extension, ".txt"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains(".fa, .fasta, .fna"));

        let empty_bad = dir.path().join("empty.gb");
        write(&empty_bad, b"");
        assert!(matches!(
            classify(&empty_bad, InputLayout::Annotation),
            Err(InputError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.fna");
        write(&path, b"");
        for layout in [InputLayout::GenomeQc, InputLayout::Annotation] {
            assert!(matches!(
                classify(&path, layout),
                Err(InputError::EmptyInput { .. })
            ));
        }
    }

    #[test]
    fn test_genome_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("g1.fa"), SEQ);
        write(&dir.path().join("g2.fna"), SEQ);
        write(&dir.path().join("notes.txt"), b"x");

        let res = classify(dir.path(), InputLayout::GenomeQc).unwrap();
        assert_eq!(res.mode, InputMode::Directory);
        assert_eq!(res.path, dir.path());
        assert_eq!(res.sequence_files, 2);
    }

    #[test]
    fn test_genome_qc_ignores_nested_output() {
        let dir = tempfile::tempdir().unwrap();
        let genomes = bacterial_output(dir.path());
        write(&genomes.join("g.fa"), SEQ);

        let err = classify(dir.path(), InputLayout::GenomeQc).unwrap_err();
        assert!(matches!(err, InputError::NoGenomeFiles { .. }));
    }

    #[test]
    fn test_empty_directory_has_no_genomes() {
        let dir = tempfile::tempdir().unwrap();
        let err = classify(dir.path(), InputLayout::ProphageDetection).unwrap_err();
        assert!(matches!(
            err,
            InputError::NoGenomeFiles {
                unpopulated: None,
                ..
            }
        ));
    }

    #[test]
    fn test_bacterial_workflow_output() {
        let dir = tempfile::tempdir().unwrap();
        let genomes = bacterial_output(dir.path());
        write(&genomes.join("g1.fa"), SEQ);
        write(&genomes.join("g2.fa"), SEQ);

        let res = classify(dir.path(), InputLayout::ProphageDetection).unwrap();
        assert_eq!(res.mode, InputMode::BacterialWorkflow);
        assert_eq!(res.path, dir.path());
        assert_eq!(res.marker.as_deref(), Some(genomes.as_path()));
        assert_eq!(res.sequence_files, 2);
    }

    #[test]
    fn test_bacterial_output_takes_priority_over_loose_files() {
        let dir = tempfile::tempdir().unwrap();
        let genomes = bacterial_output(dir.path());
        write(&genomes.join("g1.fa"), SEQ);
        write(&dir.path().join("loose.fa"), SEQ);

        let res = classify(dir.path(), InputLayout::ProphageDetection).unwrap();
        assert_eq!(res.mode, InputMode::BacterialWorkflow);
    }

    #[test]
    fn test_empty_bacterial_output_falls_back_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        bacterial_output(dir.path());
        write(&dir.path().join("loose.fasta"), SEQ);

        let res = classify(dir.path(), InputLayout::ProphageDetection).unwrap();
        assert_eq!(res.mode, InputMode::Directory);

        fs::remove_file(dir.path().join("loose.fasta")).unwrap();
        let err = classify(dir.path(), InputLayout::ProphageDetection).unwrap_err();
        assert!(matches!(
            err,
            InputError::NoGenomeFiles {
                unpopulated: Some(_),
                ..
            }
        ));
        assert!(err.to_string().contains("dereplicated_genomes"));
    }

    #[test]
    fn test_prophage_workflow_output() {
        let dir = tempfile::tempdir().unwrap();
        let marker = prophage_workflow_file(dir.path());
        write(&marker, SEQ);

        let res = classify(dir.path(), InputLayout::Annotation).unwrap();
        assert_eq!(res.mode, InputMode::ProphageWorkflow);
        assert_eq!(res.path, dir.path());
        assert_eq!(res.marker, Some(marker));
    }

    #[test]
    fn test_direct_subdir() {
        let dir = tempfile::tempdir().unwrap();
        write(&direct_subdir_file(dir.path()), SEQ);

        let res = classify(dir.path(), InputLayout::Annotation).unwrap();
        assert_eq!(res.mode, InputMode::DirectSubdir);
        assert_eq!(res.path, dir.path());
    }

    #[test]
    fn test_prophage_output_takes_priority() {
        let dir = tempfile::tempdir().unwrap();
        write(&prophage_workflow_file(dir.path()), SEQ);
        write(&direct_subdir_file(dir.path()), SEQ);
        write(&dir.path().join("a.fa"), SEQ);
        write(&dir.path().join("b.fa"), SEQ);

        let res = classify(dir.path(), InputLayout::Annotation).unwrap();
        assert_eq!(res.mode, InputMode::ProphageWorkflow);
    }

    #[test]
    fn test_empty_merged_file() {
        let dir = tempfile::tempdir().unwrap();
        write(&prophage_workflow_file(dir.path()), b"");
        assert!(matches!(
            classify(dir.path(), InputLayout::Annotation),
            Err(InputError::EmptyInput { .. })
        ));

        let other = tempfile::tempdir().unwrap();
        write(&direct_subdir_file(other.path()), b"");
        assert!(matches!(
            classify(other.path(), InputLayout::Annotation),
            Err(InputError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_single_loose_fasta_is_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("prophages.fna");
        write(&file, SEQ);
        write(&dir.path().join("readme.md"), b"x");

        let res = classify(dir.path(), InputLayout::Annotation).unwrap();
        assert_eq!(res.mode, InputMode::SingleFile);
        assert_eq!(res.path, file);
    }

    #[test]
    fn test_multiple_loose_fasta_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("prophage1.fasta"), SEQ);
        write(&dir.path().join("prophage2.fasta"), SEQ);

        let err = classify(dir.path(), InputLayout::Annotation).unwrap_err();
        assert!(matches!(
            err,
            InputError::MultipleFilesAmbiguous { count: 2, .. }
        ));
        let msg = err.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains("merge sequences into a single file"));
    }

    #[test]
    fn test_annotation_no_valid_input() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("notes.txt"), b"x");

        let err = classify(dir.path(), InputLayout::Annotation).unwrap_err();
        assert!(matches!(err, InputError::NoValidInput { .. }));
        let msg = err.to_string();
        assert!(msg.contains("2.Prophage_detection/All_prophage_sequences.fasta"));
        assert!(msg.contains("Direct subdirectory"));
        assert!(msg.contains("Single FASTA file"));
    }
}
