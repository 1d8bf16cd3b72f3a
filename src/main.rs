pub mod ast;
pub mod cli;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod semantic;

use clap::Parser;
use cli::{Cli, Commands};
use log::info;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    });
}

fn run() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze_command(args),
    }
}

fn analyze_command(args: cli::AnalyzeArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Load front-end limits from project.toml or use defaults
    let limits = match limits::CompilerLimits::from_project_toml("project.toml") {
        Ok(l) => {
            l.validate()?;
            l
        }
        Err(_) => {
            // Silently use defaults
            limits::CompilerLimits::default()
        }
    };

    // Read source file
    let source = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("Failed to read '{}': {}", args.file, e))?;

    // Lex, parse, analyze
    let tokens = lexer::lex(&source, &limits)?;
    let ast = parser::parse(source, tokens, &limits)?;

    info!("analyzing {}", args.file);
    let analysis = semantic::SemanticAnalyzer::new(ast).analyze();

    // Symbol table dump on stdout, diagnostics on stderr
    for line in analysis.symbols.export_lines() {
        println!("{}", line);
    }
    for error in &analysis.errors {
        eprintln!("{}", error);
    }

    Ok(if analysis.is_clean() { 0 } else { 1 })
}
