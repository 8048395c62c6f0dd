//! Command-line interface for arctree

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arctree")]
#[command(
    about = "arctree - Browse directories and nested archives as one tree",
    long_about = None
)]
pub struct Cli {
    /// Traversal options as JSON (see TraversalOptions)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the virtual tree below a directory or archive
    List {
        /// Directory or archive file
        path: PathBuf,

        /// Read every file-like node and print its size
        #[arg(long)]
        contents: bool,
    },

    /// Write one file from the virtual tree to stdout
    Cat {
        /// Directory or archive file
        path: PathBuf,

        /// Path inside the tree, e.g. outer.zip/inner.zip/notes.txt
        virtual_path: String,
    },

    /// Materialize the virtual tree on disk, archives unpacked as directories
    Extract {
        /// Directory or archive file
        path: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}
