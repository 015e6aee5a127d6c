//! qrgen command-line entrypoint

use clap::Parser;
use qrgen::output::{Rendered, render_download, render_error, render_generation};
use qrgen::{
    Controller, ErrorCorrection, QrSize, QrgenConfig, Result, Theme, logging, metrics, theme,
};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "qrgen",
    version,
    about = "Render QR codes through a remote service and save them"
)]
struct Cli {
    /// Text or URL to encode
    text: Option<String>,

    /// Image size: small (200px), medium (300px) or large (400px)
    #[arg(long, short, value_name = "SIZE")]
    size: Option<QrSize>,

    /// Error correction level: L, M, Q or H
    #[arg(long, short, value_name = "LEVEL")]
    ecc: Option<ErrorCorrection>,

    /// Save the rendered image after generating it
    #[arg(long, short)]
    download: bool,

    /// Directory downloads are written to (takes precedence over config file)
    #[arg(long, short, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Save the bytes from the render request instead of fetching the image again
    #[arg(long)]
    reuse_image: bool,

    /// Override the render service base URL
    #[arg(long, value_name = "URL")]
    service_url: Option<String>,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Colour theme for the terminal preview: light or dark
    #[arg(long, value_name = "THEME")]
    theme: Option<Theme>,

    /// Do not draw the rendered image in the terminal
    #[arg(long)]
    no_preview: bool,

    /// Read commands from stdin instead of running a single generation
    #[arg(long, short)]
    interactive: bool,

    /// Enable periodic metrics summaries regardless of configuration file settings
    #[arg(long)]
    metrics: bool,

    /// Optional configuration file (toml/yaml). Defaults to qrgen.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

struct OutputSinks {
    json: bool,
    preview: bool,
}

impl OutputSinks {
    fn preview_theme(&self) -> Option<Theme> {
        (self.preview && !self.json).then(theme::current)
    }

    fn emit(&self, rendered: &Rendered) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&rendered.json)?);
        } else {
            for line in &rendered.human {
                println!("{line}");
            }
        }
        Ok(())
    }

    fn emit_error(&self, message: &str) -> Result<()> {
        let rendered = render_error(message);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&rendered.json)?);
        } else {
            for line in &rendered.human {
                eprintln!("{line}");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QrgenConfig::load(cli.config.as_deref())?;

    if let Some(size) = cli.size {
        config.ui.size = size;
    }
    if let Some(ecc) = cli.ecc {
        config.ui.error_correction = ecc;
    }
    if let Some(theme) = cli.theme {
        config.ui.theme = theme;
    }
    if cli.no_preview {
        config.ui.preview = false;
    }
    if let Some(ref dir) = cli.output_dir {
        config.download.output_dir = dir.clone();
    }
    if cli.reuse_image {
        config.download.refetch = false;
    }
    if let Some(ref url) = cli.service_url {
        config.service.base_url = url.clone();
    }
    if cli.metrics {
        config.logging.metrics = true;
    }

    logging::init(&config.logging)?;

    if config.logging.metrics {
        metrics::enable(config.logging.metrics_interval_secs);
    }

    let active_theme = theme::init(config.ui.theme);
    debug!(theme = %active_theme, "Theme initialised");

    let mut controller = Controller::from_config(&config)?;
    info!(endpoint = %config.service.base_url, "qrgen ready");

    let sinks = OutputSinks {
        json: cli.json,
        preview: config.ui.preview,
    };

    if cli.interactive {
        if let Some(text) = cli.text {
            controller.set_data(text);
        }
        return run_interactive(&mut controller, &sinks).await;
    }

    controller.set_data(cli.text.unwrap_or_default());
    run_once(&mut controller, &sinks, cli.download).await
}

async fn run_once(controller: &mut Controller, sinks: &OutputSinks, download: bool) -> Result<()> {
    let generated = match controller.generate().await {
        Ok(qr) => render_generation(qr, sinks.preview_theme()),
        Err(err) => {
            sinks.emit_error(&err.user_message())?;
            return Err(err);
        }
    };

    if !download {
        return sinks.emit(&generated);
    }

    let saved = controller.download().await;
    if sinks.json {
        let mut root = Map::new();
        root.insert("qr".to_string(), generated.json);
        match &saved {
            Ok(file) => {
                root.insert("download".to_string(), render_download(file).json);
            }
            Err(err) => {
                root.insert("download_error".to_string(), Value::String(err.user_message()));
            }
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(root))?);
    } else {
        sinks.emit(&generated)?;
        match &saved {
            Ok(file) => sinks.emit(&render_download(file))?,
            Err(err) => sinks.emit_error(&err.user_message())?,
        }
    }

    saved.map(|_| ())
}

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Text(String),
    Size(QrSize),
    Ecc(ErrorCorrection),
    Generate,
    Download,
    Theme(Option<Theme>),
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line.trim_end(), ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "text" => Ok(Command::Text(rest.to_string())),
            "size" => rest.parse().map(Command::Size),
            "ecc" => rest.parse().map(Command::Ecc),
            "generate" | "g" => Ok(Command::Generate),
            "download" | "d" => Ok(Command::Download),
            "theme" => match rest.trim() {
                "" | "toggle" => Ok(Command::Theme(None)),
                other => other.parse().map(|theme| Command::Theme(Some(theme))),
            },
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{other}', type 'help'")),
        }
    }
}

const HELP: &[&str] = &[
    "Commands:",
    "  text <value>                set the text or URL to encode",
    "  size small|medium|large     pick the image size",
    "  ecc L|M|Q|H                 pick the error correction level",
    "  generate                    render the current form",
    "  download                    save the displayed QR code",
    "  theme [light|dark|toggle]   change the preview theme",
    "  show                        print the form and status",
    "  quit                        leave",
];

async fn run_interactive(controller: &mut Controller, sinks: &OutputSinks) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"qrgen> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                sinks.emit_error(&message)?;
                continue;
            }
        };

        match command {
            Command::Text(text) => controller.set_data(text),
            Command::Size(size) => controller.set_size(size),
            Command::Ecc(ecc) => controller.set_error_correction(ecc),
            Command::Generate => match controller.generate().await {
                Ok(qr) => {
                    let rendered = render_generation(qr, sinks.preview_theme());
                    sinks.emit(&rendered)?;
                }
                Err(err) => sinks.emit_error(&err.user_message())?,
            },
            Command::Download => match controller.download().await {
                Ok(saved) => sinks.emit(&render_download(&saved))?,
                Err(err) => sinks.emit_error(&err.user_message())?,
            },
            Command::Theme(choice) => {
                let active = match choice {
                    Some(chosen) => {
                        theme::set(chosen);
                        chosen
                    }
                    None => theme::toggle(),
                };
                println!("Theme: {active}");
            }
            Command::Show => print_state(controller),
            Command::Help => HELP.iter().for_each(|line| println!("{line}")),
            Command::Quit => break,
        }
    }

    if let Some(snapshot) = metrics::snapshot() {
        debug!(?snapshot, "Session metrics");
    }
    Ok(())
}

fn print_state(controller: &Controller) {
    let state = controller.state();
    println!("Text: {}", state.form.data);
    println!("Size: {}", state.form.size.label());
    println!("Error correction: {}", state.form.error_correction.label());
    println!("Theme: {}", theme::current());
    match &state.current {
        Some(qr) => println!("Displayed: {}", qr.url),
        None => println!("Displayed: nothing yet"),
    }
    if let Some(error) = &state.error {
        println!("Last error: {error}");
    }
    if let Some(error) = &state.download_error {
        println!("Last download error: {error}");
    }
    if let Some(saved) = &state.last_saved {
        println!("Last saved: {}", saved.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_commands() {
        assert_eq!(
            "text Hello, World!".parse::<Command>(),
            Ok(Command::Text("Hello, World!".to_string()))
        );
        assert_eq!("size large".parse::<Command>(), Ok(Command::Size(QrSize::Large)));
        assert_eq!("ECC h".parse::<Command>(), Ok(Command::Ecc(ErrorCorrection::H)));
        assert_eq!("g".parse::<Command>(), Ok(Command::Generate));
    }

    #[test]
    fn parses_theme_variants() {
        assert_eq!("theme".parse::<Command>(), Ok(Command::Theme(None)));
        assert_eq!("theme toggle".parse::<Command>(), Ok(Command::Theme(None)));
        assert_eq!(
            "theme dark".parse::<Command>(),
            Ok(Command::Theme(Some(Theme::Dark)))
        );
    }

    #[test]
    fn rejects_unknown_input() {
        assert!("size huge".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
    }

    #[test]
    fn text_keeps_inner_spacing() {
        assert_eq!(
            "text  a  b ".parse::<Command>(),
            Ok(Command::Text(" a  b ".to_string()))
        );
    }
}
