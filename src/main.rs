//! pyglossa CLI - Python subset to Glossa/Pseudoglossa translator

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use pyglossa::codegen::is_function;
use pyglossa::errors::print_error;
use pyglossa::lexer::Keyword;
use pyglossa::parser::{Ast, ScalarType, StmtKind};
use pyglossa::text::is_valid_identifier;
use pyglossa::{
    analyze_ast, get_algorithm_name, parse, translate, Dialect, Markup, Options, SymbolTable,
    Variable, GLOSSA, PSEUDOGLOSSA,
};
use tracing::{info, Level};

#[derive(ClapParser, Debug)]
#[command(
    name = "pyglossa",
    version,
    about = "Translate a Python subset into Glossa or Pseudoglossa"
)]
struct Cli {
    /// More output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a source file
    Translate {
        file: PathBuf,

        /// Target dialect
        #[arg(short, long, value_enum, default_value_t = DialectArg::Glossa)]
        dialect: DialectArg,

        /// Plain text instead of highlighted markup
        #[arg(long, default_value_t = false)]
        plain: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Variable defined outside the program, as NAME:TYPE
        #[arg(short, long = "global", value_parser = parse_global)]
        globals: Vec<(String, ScalarType)>,
    },
    /// Parse a source file and list its statements
    Parse { file: PathBuf },
    /// Analyze a source file and print its variables and subprograms
    Check { file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DialectArg {
    Glossa,
    Pseudoglossa,
}

impl DialectArg {
    fn policy(self) -> &'static Dialect {
        match self {
            DialectArg::Glossa => &GLOSSA,
            DialectArg::Pseudoglossa => &PSEUDOGLOSSA,
        }
    }
}

fn parse_global(arg: &str) -> Result<(String, ScalarType), String> {
    let (name, ty) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got '{}'", arg))?;
    let name = name.trim();
    if !is_valid_identifier(name) || Keyword::parse(name).is_some() {
        return Err(format!("'{}' is not a valid variable name", name));
    }
    let ty = ScalarType::from_keyword(ty.trim())
        .ok_or_else(|| format!("unknown type '{}'", ty.trim()))?;
    Ok((name.to_string(), ty))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Command::Translate {
            file,
            dialect,
            plain,
            output,
            globals,
        } => run_translate(&file, dialect, plain, output.as_deref(), globals),
        Command::Parse { file } => run_parse(&file),
        Command::Check { file } => run_check(&file),
    }
}

fn read_source(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            None
        }
    }
}

fn run_translate(
    file: &Path,
    dialect: DialectArg,
    plain: bool,
    output: Option<&Path>,
    globals: Vec<(String, ScalarType)>,
) -> ExitCode {
    let Some(source) = read_source(file) else {
        return ExitCode::FAILURE;
    };

    let markup = if plain { Markup::Plain } else { Markup::Html };
    let mut options = Options::new(dialect.policy()).with_markup(markup);
    if !globals.is_empty() {
        let mut table = SymbolTable::new();
        for (name, ty) in globals {
            table.define(name, Variable::declared(ty, Default::default()));
        }
        options = options.with_external_globals(table);
    }

    let code = match translate(&source, &options) {
        Ok(code) => code,
        Err(e) => {
            print_error(&source, &e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(path) => match fs::write(path, &code) {
            Ok(()) => {
                info!(path = %path.display(), bytes = code.len(), "written");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error writing '{}': {}", path.display(), e);
                ExitCode::FAILURE
            }
        },
        None => {
            print!("{}", code);
            ExitCode::SUCCESS
        }
    }
}

fn parse_file(file: &Path) -> Option<(String, Ast)> {
    let source = read_source(file)?;
    match parse(&source) {
        Ok(ast) => Some((source, ast)),
        Err(e) => {
            print_error(&source, &e);
            None
        }
    }
}

fn run_parse(file: &Path) -> ExitCode {
    let Some((_, ast)) = parse_file(file) else {
        return ExitCode::FAILURE;
    };

    println!("Parsed {} statements:", ast.body.len());
    for stmt in &ast.body {
        match &stmt.kind {
            StmtKind::Function(f) => {
                println!("  def {} ({} params)", f.name, f.params.len());
            }
            other => println!("  {}", other.label()),
        }
    }
    ExitCode::SUCCESS
}

fn run_check(file: &Path) -> ExitCode {
    let Some((source, ast)) = parse_file(file) else {
        return ExitCode::FAILURE;
    };
    let name = match get_algorithm_name(&source) {
        Ok(name) => name,
        Err(e) => {
            print_error(&source, &e);
            return ExitCode::FAILURE;
        }
    };

    let analyzed = analyze_ast(ast, &name, None);
    println!("OK: {}", analyzed.algorithm_name);
    if let Some(renamed) = &analyzed.renamed {
        println!("  renamed '{}' to '{}'", name, renamed);
    }

    print_symbols("Variables", &analyzed.ast.globals, 0);

    let functions: Vec<_> = analyzed.ast.functions().collect();
    if !functions.is_empty() {
        println!("\nSubprograms:");
    }
    for func in functions {
        let params: Vec<_> = func
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, type_name(p.ty)))
            .collect();
        if is_function(func) {
            println!(
                "  function {}({}) -> {}",
                func.name,
                params.join(", "),
                type_name(func.result_type())
            );
        } else {
            println!("  procedure {}({})", func.name, params.join(", "));
        }
        print_symbols("Locals", &func.locals, 2);
    }

    ExitCode::SUCCESS
}

fn print_symbols(title: &str, table: &SymbolTable, indent: usize) {
    if table.is_empty() {
        return;
    }
    let pad = " ".repeat(indent);
    println!("{}{}:", pad, title);
    for (name, var) in table.iter() {
        let origin = if var.is_declared() { "declared" } else { "inferred" };
        println!("{}  {}: {} ({})", pad, name, type_name(var.ty), origin);
    }
}

fn type_name(ty: Option<ScalarType>) -> &'static str {
    ty.map_or("?", |t| t.as_str())
}
