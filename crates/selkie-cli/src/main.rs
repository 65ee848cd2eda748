use futures::executor::block_on;
use selkie::export::{self, RasterOptions};
use selkie::render::{Surface, foreign_object_labels_to_text};
use selkie::{DialectRegistry, normalize, strip_markdown_fences};
use std::io::Read;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Export(export::ExportError),
    Normalize(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Export(err) => write!(f, "{err}"),
            CliError::Normalize(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<export::ExportError> for CliError {
    fn from(value: export::ExportError) -> Self {
        Self::Export(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Normalize,
    Detect,
    Rewrite,
    Export,
}

#[derive(Debug, Clone, Copy, Default)]
enum ExportFormat {
    #[default]
    Svg,
    Png,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    out: Option<String>,
    out_dir: Option<String>,
    export_format: ExportFormat,
}

fn usage() -> &'static str {
    "selkie-cli\n\
\n\
USAGE:\n\
  selkie-cli [normalize] [<path>|-]\n\
  selkie-cli detect [<path>|-]\n\
  selkie-cli rewrite [--out <path>] [<path>|-]\n\
  selkie-cli export [--format svg|png|json] [--out-dir <dir>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - normalize prints repaired diagram code; detect prints the dialect keyword.\n\
  - rewrite takes an SVG document and replaces rich-text labels with plain text nodes.\n\
  - export takes an SVG document (svg/png) or diagram code (json) and writes the\n\
    artifact (diagram.svg / diagram.png / diagram.json) into --out-dir (default '.').\n\
  - Rendering diagram code to SVG requires a rendering engine and is not part of this CLI.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "normalize" => args.command = Command::Normalize,
            "detect" => args.command = Command::Detect,
            "rewrite" => args.command = Command::Rewrite,
            "export" => args.command = Command::Export,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.export_format = fmt
                    .parse::<ExportFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--out-dir" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out_dir = Some(dir.clone());
            }
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn normalized_code(text: &str) -> Result<String, CliError> {
    let stripped = strip_markdown_fences(text);
    let result = normalize(&stripped, &DialectRegistry::default_dialects());
    match result.error {
        Some(message) => Err(CliError::Normalize(message)),
        None => Ok(result.code),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Normalize => {
            let code = normalized_code(&text)?;
            println!("{code}");
            Ok(())
        }
        Command::Detect => {
            let code = normalized_code(&text)?;
            let registry = DialectRegistry::default_dialects();
            match registry.detect(&code) {
                Some(dialect) => println!("{dialect}"),
                None => return Err(CliError::Normalize(
                    "Unknown or unsupported diagram type.".to_string(),
                )),
            }
            Ok(())
        }
        Command::Rewrite => {
            let rewritten = foreign_object_labels_to_text(&text);
            write_text(&rewritten, args.out.as_deref())
        }
        Command::Export => {
            let out_dir = std::path::PathBuf::from(args.out_dir.as_deref().unwrap_or("."));
            let artifact = match args.export_format {
                ExportFormat::Json => export::export_json(&text)?,
                ExportFormat::Svg => {
                    let mut surface = Surface::new("export", 800.0, 600.0);
                    surface.set_diagram(text);
                    export::export_svg(&surface)?
                }
                ExportFormat::Png => {
                    let mut surface = Surface::new("export", 800.0, 600.0);
                    surface.set_diagram(text);
                    block_on(export::export_png(&surface, &RasterOptions::default()))?
                }
            };
            let path = artifact.write_to_dir(&out_dir)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
