// Kompile: parse a source file and print its AST

use std::fs;
use std::path::PathBuf;

use clap::Parser as ClapParser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use kompile::diagnostics::ConsoleSink;
use kompile::driver::{scan_tokens, Driver, Recovery};
use kompile::parser::precedence::{parse_binop_arg, PrecedenceTable};

/// Tokenize and parse a Kompile source file
#[derive(ClapParser, Debug)]
#[command(name = "kompile", version, about, long_about = None)]
struct Args {
    /// Source file to parse
    file: PathBuf,

    /// Print the token stream instead of parsing
    #[arg(long)]
    tokens: bool,

    /// What to do after a parse error: skip-token, skip-item or halt
    #[arg(long, default_value = "skip-item")]
    recovery: Recovery,

    /// Register an extra binary operator, e.g. --binop '/=40'
    #[arg(long = "binop", value_name = "CHAR=PREC")]
    binops: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable coloured diagnostics
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let color = if args.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, color)?;

    let mut table = PrecedenceTable::standard();
    for binop in &args.binops {
        let registered = parse_binop_arg(binop).and_then(|(op, prec)| table.register(op, prec));
        if let Err(e) = registered {
            eprintln!("Error: invalid --binop '{}': {}", binop, e);
            std::process::exit(2);
        }
    }

    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", args.file.display(), e);
            std::process::exit(1);
        }
    };

    let mut sink = if args.no_color {
        ConsoleSink::new(false)
    } else {
        ConsoleSink::stderr()
    };

    if args.tokens {
        let (tokens, errors) = scan_tokens(&source, &mut sink);
        for token in &tokens {
            let loc = token.location();
            println!("{:>4}:{:<3} {}", loc.line, loc.column, token);
        }
        if errors > 0 {
            eprintln!("{} malformed literal(s) in {}", errors, args.file.display());
            std::process::exit(1);
        }
        return Ok(());
    }

    let operators: Vec<String> = table
        .operators()
        .iter()
        .map(|(op, prec)| format!("{}={}", op, prec))
        .collect();
    info!("operators: {}", operators.join(" "));

    let driver = Driver::new(&table, args.recovery);
    info!("recovery policy: {:?}", driver.recovery());
    let session = driver.run(&source, &mut sink);

    for item in &session.items {
        println!("{}", item);
    }

    eprintln!(
        "Parsed {} top-level item(s) from {} with {} error(s).",
        session.items.len(),
        args.file.display(),
        session.errors
    );

    if !session.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}
