//! Input path classification.
//!
//! Every workflow takes one primary input path. Depending on the workflow, the
//! path may be a single sequence file, a directory of sequence files, or the
//! output directory of an earlier workflow:
//!
//! | Layout | Accepted directory shapes, in order |
//! |--------|-------------------------------------|
//! | genome QC | sequence files directly inside |
//! | prophage detection | bacterial QC output (`1.Genome_preprocessing/Bact3_dRep/drep_output/dereplicated_genomes/`), then sequence files directly inside |
//! | annotation | prophage detection output (`2.Prophage_detection/All_prophage_sequences.fasta`), then `All_prophage_sequences.fasta` directly inside, then exactly one loose sequence file |
//!
//! Files must end in `.fa`, `.fasta` or `.fna` (any case) and must not be empty.
//!
//! ## Example
//!
//! ```rust,no_run
//! use phorager::input::{classify, InputLayout};
//! use std::path::Path;
//!
//! let resolution = classify(Path::new("results/"), InputLayout::Annotation).unwrap();
//! println!("{} -> {}", resolution.mode, resolution.path.display());
//! ```

pub mod classifier;
pub mod layout;

pub use classifier::{classify, InputError, InputResolution};
pub use layout::{DirectoryShape, InputLayout};
