use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "maru")]
#[command(about = "Maru language semantic analyzer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a Maru source file and print its symbol table
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Input file path
    pub file: String,
}
