// heaplens: static heap-allocation lifecycle analyzer

mod analyzer;
mod estimate;
mod extract;
mod language;
mod normalize;
mod quality;
mod report;
mod track;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use analyzer::analyze;
use language::Language;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("heaplens");

    if args.len() < 2 {
        eprintln!("Error: No input file provided");
        eprintln!();
        eprintln!("Usage: {} <file> [language]", program_name);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} leaky.c            # language inferred from extension", program_name);
        eprintln!("  {} snippet.txt cpp    # language given explicitly", program_name);
        eprintln!();
        eprintln!("Languages: c, cpp, javascript, python, java, rust, go, generic");
        std::process::exit(1);
    }

    let input_file = &args[1];
    if !Path::new(input_file).exists() {
        eprintln!("Error: File '{}' not found", input_file);
        std::process::exit(1);
    }

    let language = match args.get(2) {
        Some(tag) => match Language::from_str(tag) {
            Ok(language) => language,
            Err(message) => {
                eprintln!("Error: {}", message);
                std::process::exit(1);
            }
        },
        None => Path::new(input_file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Language::from_extension)
            .unwrap_or(Language::Generic),
    };

    let source = match fs::read_to_string(input_file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: Could not read '{}': {}", input_file, err);
            std::process::exit(1);
        }
    };

    let report = analyze(&source, language);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("Error: Could not serialize report: {}", err);
            std::process::exit(1);
        }
    }
}
