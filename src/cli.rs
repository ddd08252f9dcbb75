use crate::config::{Config, load_config};
use crate::extract::{extract_code_block, extract_drawing, strip_drawing_data};
use crate::gemini::{GeminiClient, load_image_base64};
use crate::generate::{GenerationRequest, TextGenerator};
use crate::prompt::ReaderAction;
use crate::render::{write_output_png, write_output_svg};
use crate::render_description;
use crate::session::{Event, Session, check_content};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sdraw",
    version,
    about = "Beam reinforcement design assistant: ask the design engine, render its bar drawing as SVG"
)]
pub struct Args {
    /// Beam data file (JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// What to ask the design engine for
    #[arg(short = 'a', long = "action", value_enum, default_value_t = ReaderAction::DrawReinforcement)]
    pub action: ReaderAction,

    /// Extra instruction appended to (or replacing) the action prompt
    #[arg(short = 'p', long = "prompt")]
    pub prompt: Option<String>,

    /// JPEG image (e.g. a sketch of the beam) sent along with the data
    #[arg(long = "image")]
    pub image: Option<PathBuf>,

    /// Use a saved engine response instead of calling the service
    #[arg(short = 'r', long = "response")]
    pub response: Option<PathBuf>,

    /// Drawing output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Drawing output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, layout and generation overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write the fenced script from the response to this file
    #[arg(short = 's', long = "script")]
    pub script: Option<PathBuf>,

    /// Fence language the script is taken from
    #[arg(long = "scriptLanguage", default_value = "python")]
    pub script_language: String,

    /// Write the response text (without drawing data) to this file
    #[arg(short = 't', long = "text")]
    pub text: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// Where the response text is written.
#[derive(Debug, PartialEq, Eq)]
enum TextSink<'a> {
    File(&'a Path),
    Stdout,
    Stderr,
}

/// Stdout carries the text unless the SVG itself is streamed there.
fn text_sink(args: &Args, has_drawing: bool) -> TextSink<'_> {
    if let Some(path) = args.text.as_deref() {
        return TextSink::File(path);
    }
    let svg_on_stdout =
        has_drawing && matches!(args.output_format, OutputFormat::Svg) && args.output.is_none();
    if svg_on_stdout {
        TextSink::Stderr
    } else {
        TextSink::Stdout
    }
}

pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let raw = match args.response.as_deref() {
        Some(path) => std::fs::read_to_string(path)?,
        None => request_response(&args, &config)?,
    };

    let drawing = extract_drawing(&raw);

    if let Some(path) = args.script.as_deref() {
        std::fs::write(path, extract_code_block(&raw, Some(&args.script_language)))?;
        tracing::info!(path = %path.display(), "script written");
    }

    let text = strip_drawing_data(&raw);
    match text_sink(&args, drawing.is_some()) {
        TextSink::File(path) => std::fs::write(path, text)?,
        TextSink::Stdout => println!("{text}"),
        TextSink::Stderr => eprintln!("{text}"),
    }

    let Some(description) = drawing else {
        tracing::info!("response carries no drawing data; nothing rendered");
        return Ok(());
    };
    tracing::info!(
        length = description.length,
        height = description.height,
        bars = description.bars.len(),
        "rendering beam drawing"
    );

    let svg = render_description(&description, &config);
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("structural_draw=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// One validated round trip through the design engine.
fn request_response(args: &Args, config: &Config) -> Result<String> {
    let content = read_input(args.input.as_deref())?;
    let request = build_request(args, content)?;

    let session = Session::new().apply(Event::Submit(request))?;
    let client = GeminiClient::from_env(&config.generation)?;
    let pending = session
        .pending()
        .ok_or_else(|| anyhow::anyhow!("no request pending after submit"))?;
    let event = match client.generate(pending) {
        Ok(text) => Event::Success(text),
        Err(err) => Event::Failure(err),
    };
    let session = session.apply(event)?;

    if let Some(message) = session.error() {
        return Err(anyhow::anyhow!("{message}"));
    }
    session
        .outcome()
        .map(|outcome| outcome.text.clone())
        .ok_or_else(|| anyhow::anyhow!("design engine returned no outcome"))
}

fn build_request(args: &Args, content: String) -> Result<GenerationRequest> {
    check_content(&content)?;
    let mut request = GenerationRequest::new(content, args.action);
    if let Some(prompt) = &args.prompt {
        request = request.with_custom_prompt(prompt.clone());
    }
    if let Some(image) = args.image.as_deref() {
        request = request.with_image(load_image_base64(image)?);
    }
    Ok(request)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionError;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "sdraw",
            "-i",
            "beams.json",
            "-a",
            "bar-schedule",
            "-e",
            "png",
            "-o",
            "beam.png",
            "--script",
            "beam.py",
        ])
        .unwrap();
        assert_eq!(args.action, ReaderAction::BarSchedule);
        assert!(matches!(args.output_format, OutputFormat::Png));
        assert_eq!(args.script.as_deref(), Some(Path::new("beam.py")));
        assert_eq!(args.script_language, "python");
    }

    #[test]
    fn action_defaults_to_drawing() {
        let args = Args::try_parse_from(["sdraw", "-r", "saved.txt"]).unwrap();
        assert_eq!(args.action, ReaderAction::DrawReinforcement);
        assert!(matches!(args.output_format, OutputFormat::Svg));
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("a.png")), "png").unwrap(),
            PathBuf::from("a.png")
        );
    }

    #[test]
    fn response_text_avoids_streamed_svg() {
        let to_file = Args::try_parse_from(["sdraw", "-r", "saved.txt", "-o", "beam.svg"]).unwrap();
        assert_eq!(text_sink(&to_file, true), TextSink::Stdout);

        let png = Args::try_parse_from(["sdraw", "-r", "saved.txt", "-e", "png", "-o", "beam.png"]).unwrap();
        assert_eq!(text_sink(&png, true), TextSink::Stdout);

        let streamed = Args::try_parse_from(["sdraw", "-r", "saved.txt"]).unwrap();
        assert_eq!(text_sink(&streamed, true), TextSink::Stderr);
        assert_eq!(text_sink(&streamed, false), TextSink::Stdout);

        let explicit = Args::try_parse_from(["sdraw", "-r", "saved.txt", "-t", "report.md"]).unwrap();
        assert_eq!(text_sink(&explicit, true), TextSink::File(Path::new("report.md")));
    }

    #[test]
    fn blank_input_is_rejected_before_image_is_read() {
        let args = Args::try_parse_from(["sdraw", "--image", "does/not/exist.jpg"]).unwrap();
        let err = build_request(&args, "  \n".to_string()).unwrap_err();
        assert_eq!(err.downcast_ref::<SessionError>(), Some(&SessionError::EmptyInput));
        assert!(build_request(&args, "[{\"id\": \"V1\"}]".to_string()).is_err());
    }
}
