use bubble_markup::{
    extract_products, render_message, MarkupError, RawMessage, ThemeConfig,
};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Render chat message files to widget HTML
#[derive(Parser, Debug)]
#[command(name = "bubble-render", version)]
struct Args {
    /// Theme file (.json, .yaml or .yml); defaults to the built-in theme
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Who sent the messages
    #[arg(long, value_enum, default_value_t = SenderArg::Bot)]
    sender: SenderArg,

    /// Print the extracted products as JSON instead of HTML
    #[arg(long)]
    extract: bool,

    /// Message files; `-` reads stdin
    #[arg(required = true)]
    files: Vec<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SenderArg {
    User,
    Bot,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let theme = match &args.theme {
        Some(path) => match ThemeConfig::load_file(path) {
            Ok(theme) => theme,
            Err(e) => {
                eprintln!("✗ theme {} has errors:", path.display());
                eprintln!("  {}", e);
                process::exit(1);
            }
        },
        None => ThemeConfig::default(),
    };

    let mut exit_code = 0;

    for file in &args.files {
        match render_file(file, &args, &theme) {
            Ok(output) => {
                println!("{}", output);
                eprintln!("✓ {}", file);
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn render_file(file: &str, args: &Args, theme: &ThemeConfig) -> Result<String, MarkupError> {
    let content = read_input(file)?;

    if args.extract {
        let result = extract_products(&content);
        return Ok(serde_json::to_string_pretty(&result)?);
    }

    let message = match args.sender {
        SenderArg::User => RawMessage::user_text(&content)?,
        SenderArg::Bot => RawMessage::bot_text(content)?,
    };
    Ok(render_message(&message, theme))
}

fn read_input(file: &str) -> Result<String, MarkupError> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(file)
            .map_err(|e| MarkupError::Io(format!("Failed to read file: {}", e)))
    }
}

fn print_error(error: &MarkupError) {
    match error {
        MarkupError::InvalidArgument(msg) => {
            eprintln!("  Invalid input:");
            eprintln!("    {}", msg);
        }
        MarkupError::Io(msg) => {
            eprintln!("  I/O error:");
            eprintln!("    {}", msg);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
