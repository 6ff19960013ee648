use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
/// Prints the DDL needed to turn stored PostgreSQL objects into their new versions.
///
/// Objects are read from JSON files holding either one object or an array of objects. The
/// script goes to stdout, logging (controlled by RUST_LOG) goes to stderr.
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Compose constraints and indices from their structured fields instead of using the
    /// stored definitions.
    #[arg(long, global = true, env = "DBO_DIFF_FULL")]
    pub full: bool,

    /// Name of a constraint or index to keep, even when the new table no longer has it.
    /// Can be given multiple times.
    #[arg(long = "keep", global = true)]
    pub keep: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Diff the new objects against their stored versions
    Diff(DiffArgs),
    /// Print the create script of the new objects
    Create {
        /// File with the new objects
        #[arg(long)]
        new: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// File with the new objects
    #[arg(long)]
    pub new: String,

    /// File with the objects as they are now. Objects missing from it, or everything when
    /// it is not given, are created from scratch.
    #[arg(long)]
    pub old: Option<String>,

    /// Print the statements under a `-- <bucket>` header per bucket instead of one script.
    #[arg(long)]
    pub print_buckets: bool,
}
