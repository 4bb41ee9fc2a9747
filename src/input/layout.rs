use std::path::{Path, PathBuf};

/// Dereplicated genomes written by the bacterial genome QC workflow, relative
/// to its output root
pub const BACTERIAL_GENOMES_SUBDIR: [&str; 4] = [
    "1.Genome_preprocessing",
    "Bact3_dRep",
    "drep_output",
    "dereplicated_genomes",
];

/// Prophage detection subdirectory of a workflow output root
pub const PROPHAGE_DETECTION_SUBDIR: &str = "2.Prophage_detection";

/// Merged prophage sequences written by the prophage detection workflow
pub const MERGED_PROPHAGE_FILE: &str = "All_prophage_sequences.fasta";

/// `<root>/1.Genome_preprocessing/Bact3_dRep/drep_output/dereplicated_genomes`
#[must_use]
pub fn bacterial_genomes_dir(root: &Path) -> PathBuf {
    BACTERIAL_GENOMES_SUBDIR
        .iter()
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// `<root>/2.Prophage_detection/All_prophage_sequences.fasta`
#[must_use]
pub fn prophage_workflow_file(root: &Path) -> PathBuf {
    root.join(PROPHAGE_DETECTION_SUBDIR).join(MERGED_PROPHAGE_FILE)
}

/// `<dir>/All_prophage_sequences.fasta`
#[must_use]
pub fn direct_subdir_file(dir: &Path) -> PathBuf {
    dir.join(MERGED_PROPHAGE_FILE)
}

/// A directory shape the classifier can recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryShape {
    /// Bacterial genome QC output root with at least one dereplicated genome
    BacterialWorkflowOutput,
    /// Prophage detection output root holding the merged sequence file
    ProphageWorkflowOutput,
    /// Directory holding the merged sequence file itself
    MergedProphageFile,
    /// Directory with one or more sequence files directly inside
    GenomeFiles,
    /// Directory with exactly one loose sequence file
    SingleSequenceFile,
}

/// Which subcommand an input path is classified for.
///
/// Each layout tries its directory shapes in order; pipeline-output shapes
/// always come before generic directory scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// Input to the bacterial genome QC workflow
    GenomeQc,
    /// Input to the prophage detection workflow
    ProphageDetection,
    /// Input to the annotation workflow
    Annotation,
}

impl InputLayout {
    #[must_use]
    pub fn directory_shapes(self) -> &'static [DirectoryShape] {
        match self {
            Self::GenomeQc => &[DirectoryShape::GenomeFiles],
            Self::ProphageDetection => &[
                DirectoryShape::BacterialWorkflowOutput,
                DirectoryShape::GenomeFiles,
            ],
            Self::Annotation => &[
                DirectoryShape::ProphageWorkflowOutput,
                DirectoryShape::MergedProphageFile,
                DirectoryShape::SingleSequenceFile,
            ],
        }
    }

    /// Name of the CLI option that carries the input for this layout
    #[must_use]
    pub fn option_name(self) -> &'static str {
        match self {
            Self::GenomeQc | Self::ProphageDetection => "--genome",
            Self::Annotation => "--prophage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_paths() {
        let root = Path::new("/runs/r1");
        assert_eq!(
            bacterial_genomes_dir(root),
            PathBuf::from("/runs/r1/1.Genome_preprocessing/Bact3_dRep/drep_output/dereplicated_genomes")
        );
        assert_eq!(
            prophage_workflow_file(root),
            PathBuf::from("/runs/r1/2.Prophage_detection/All_prophage_sequences.fasta")
        );
        assert_eq!(
            direct_subdir_file(root),
            PathBuf::from("/runs/r1/All_prophage_sequences.fasta")
        );
    }

    #[test]
    fn test_pipeline_shapes_come_first() {
        assert_eq!(
            InputLayout::ProphageDetection.directory_shapes()[0],
            DirectoryShape::BacterialWorkflowOutput
        );
        assert_eq!(
            InputLayout::Annotation.directory_shapes()[0],
            DirectoryShape::ProphageWorkflowOutput
        );
        assert_eq!(
            InputLayout::GenomeQc.directory_shapes(),
            &[DirectoryShape::GenomeFiles]
        );
    }
}
