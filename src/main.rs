//! rule-template CLI
//!
//! Usage:
//!   rule-template [OPTIONS] [FILE]
//!
//! Options:
//!   -b, --bindings <FILE>  Variable bindings (JSON map of name -> {value, type})
//!   -V, --variables        List extracted variables instead of substituting
//!   -c, --check            Validate bindings and report all problems
//!   --verify               Re-parse the resolved output with the host grammar
//!   -h, --help             Print help

use std::collections::HashMap;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use rule_template::{Binding, Bindings, TemplateParser};

#[derive(Parser)]
#[command(name = "rule-template")]
#[command(about = "Placeholder substitution for domain rule expressions")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Variable bindings as a JSON object: {"NAME": {"value": ..., "type": "..."}}
    #[arg(short, long)]
    bindings: Option<PathBuf>,

    /// List extracted variables (name, filters, positions) and exit
    #[arg(short = 'V', long)]
    variables: bool,

    /// Validate bindings against the template and report all problems
    #[arg(short, long)]
    check: bool,

    /// Re-parse the resolved output against the host grammar
    #[arg(long)]
    verify: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    // Read template
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    // Load bindings
    let bindings: Bindings = match &cli.bindings {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, Binding>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    eprintln!("Error parsing bindings '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error reading bindings '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Bindings::new(),
    };

    let parser = TemplateParser::new();
    let template = match parser.parse(&source) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e.format(source.trim(), &filename));
            std::process::exit(1);
        }
    };

    if cli.variables {
        for var in parser.extract_variables(&template) {
            let filters = if var.filters.is_empty() {
                String::new()
            } else {
                format!(" | {}", var.filters.join(" | "))
            };
            let positions: Vec<String> = var
                .positions
                .iter()
                .map(|p| format!("{}..{}", p.start, p.end))
                .collect();
            println!("{}{} at {}", var.name, filters, positions.join(", "));
        }
        return;
    }

    if cli.check {
        let result = parser.validate(&template, &bindings);
        if result.valid {
            println!("ok");
            return;
        }
        for error in &result.errors {
            eprintln!("error: {}", error);
        }
        std::process::exit(1);
    }

    let resolved = match parser.prepare(&template, &bindings) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.verify {
        if let Err(e) = parser.check_resolved(&resolved) {
            eprintln!("Resolved rule failed to parse:");
            eprintln!("{}", e.format(resolved.trim(), "<resolved>"));
            std::process::exit(1);
        }
    }

    println!("{}", resolved);
}

fn print_intro() {
    println!(
        r#"rule-template - placeholder substitution for domain rule expressions

USAGE:
    rule-template [OPTIONS] [FILE]
    echo '<rule>' | rule-template --bindings vars.json

OPTIONS:
    -b, --bindings <FILE>  JSON bindings: {{"NAME": {{"value": ..., "type": "..."}}}}
    -V, --variables        List extracted variables and exit
    -c, --check            Validate bindings, reporting every problem
    --verify               Re-parse the resolved output with the host grammar
    -h, --help             Print help

QUICK START:
    echo 'EventIs(${{E}}) && ${{N}} > 10' | rule-template -b vars.json

with vars.json:
    {{"E": {{"value": "start", "type": "string"}},
      "N": {{"value": 42, "type": "number"}}}}

prints: EventIs("start") && 42 > 10

Placeholders take the form ${{NAME}} or ${{NAME|filter1|filter2}}. Builtin
filters: string, upper, lower, capitalize, title, trim, number, boolean,
abs, round, floor, ceil, default(fallback)."#
    );
}
