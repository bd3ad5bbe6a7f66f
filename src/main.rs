use std::io::Read;

use clap::Parser;

use bit_scope::{analyze_transcript, AnalyzerConfig, ServiceConfig, Transcript};

#[derive(Parser)]
#[command(
    name = "bit-scope",
    about = "Break a stand-up transcript into bits and detect comedy-writing patterns",
    version
)]
struct Cli {
    /// Transcript JSON files to analyze (reads stdin if none provided)
    files: Vec<String>,

    /// Pause length in seconds that starts a new bit
    #[arg(long, default_value_t = 1.5)]
    pause_threshold: f64,

    /// OpenAI-compatible chat completion endpoint for style classification
    /// (API key is taken from OPENAI_API_KEY)
    #[arg(long)]
    service_url: Option<String>,

    /// Model name sent to the classification service
    #[arg(long, default_value = "gpt-3.5-turbo")]
    service_model: String,
}

fn build_config(cli: &Cli) -> AnalyzerConfig {
    let service = cli.service_url.as_ref().map(|url| ServiceConfig {
        api_url: url.clone(),
        api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
        model: cli.service_model.clone(),
        ..ServiceConfig::default()
    });
    AnalyzerConfig {
        pause_threshold_secs: cli.pause_threshold,
        service,
        ..AnalyzerConfig::default()
    }
}

fn analyze_and_print(input: &str, config: &AnalyzerConfig) {
    let transcript: Transcript = serde_json::from_str(input).unwrap_or_else(|e| {
        eprintln!("Error parsing transcript JSON: {e}");
        std::process::exit(1);
    });
    let report = analyze_transcript(&transcript, config);
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = build_config(&cli);

    if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .expect("Failed to read stdin");
        analyze_and_print(&input, &config);
    } else {
        for path in &cli.files {
            let input = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {path}: {e}");
                std::process::exit(1);
            });
            analyze_and_print(&input, &config);
        }
    }
}
