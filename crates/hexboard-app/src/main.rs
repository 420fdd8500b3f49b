//! Headless entry point: load a drawing, fit the view to it and write an SVG
//! snapshot.
//!
//! ```text
//! hexboard <document.json | name> [out.svg] [--library DIR] [--config editor.json] [--size WxH] [--grid] [--save]
//! hexboard --list [--library DIR]
//! ```
//!
//! A `.json` path is read from its own directory. A bare name is looked up in
//! the document library, which defaults to the per-user data directory.
//! Without an output path the SVG is written next to the document.

use hexboard_core::{Canvas, ConfigError, EditorConfig, FileStorage, Storage, StorageError, SvgOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

const DEFAULT_BACKGROUND: &str = "#000000";

#[derive(Debug, Error)]
enum AppError {
    #[error(
        "usage: hexboard <document.json | name> [out.svg] [--library DIR] [--config editor.json] [--size WxH] [--grid] [--save]"
    )]
    Usage,
    #[error("invalid --size {0:?}, expected WIDTHxHEIGHT")]
    Size(String),
    #[error("invalid document name {0:?}: use letters, digits, '-' or '_'")]
    Name(String),
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: std::io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Default)]
struct Args {
    document: Option<PathBuf>,
    output: Option<PathBuf>,
    library: Option<PathBuf>,
    config: Option<PathBuf>,
    size: Option<(f64, f64)>,
    grid: bool,
    save: bool,
    list: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, AppError> {
        let mut positional = Vec::new();
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--library" => parsed.library = Some(args.next().ok_or(AppError::Usage)?.into()),
                "--config" => parsed.config = Some(args.next().ok_or(AppError::Usage)?.into()),
                "--size" => parsed.size = Some(parse_size(&args.next().ok_or(AppError::Usage)?)?),
                "--grid" => parsed.grid = true,
                "--save" => parsed.save = true,
                "--list" => parsed.list = true,
                flag if flag.starts_with("--") => return Err(AppError::Usage),
                _ => positional.push(PathBuf::from(arg)),
            }
        }
        let mut positional = positional.into_iter();
        parsed.document = positional.next();
        parsed.output = positional.next();
        if positional.next().is_some() || (parsed.document.is_none() && !parsed.list) {
            return Err(AppError::Usage);
        }
        Ok(parsed)
    }
}

fn parse_size(text: &str) -> Result<(f64, f64), AppError> {
    let size_error = || AppError::Size(text.to_string());
    let (w, h) = text.split_once('x').ok_or_else(size_error)?;
    let w: f64 = w.parse().map_err(|_| size_error())?;
    let h: f64 = h.parse().map_err(|_| size_error())?;
    if w > 0.0 && h > 0.0 { Ok((w, h)) } else { Err(size_error()) }
}

/// Ids are stored verbatim as file names, so only accept what needs no escaping.
fn document_id(name: &str) -> Result<String, AppError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(name.to_string()) } else { Err(AppError::Name(name.to_string())) }
}

fn open_library(library: Option<&Path>) -> Result<FileStorage, AppError> {
    let storage = match library {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    Ok(storage)
}

/// The storage holding `document` and its id within it.
fn locate(document: &Path, library: Option<&Path>) -> Result<(FileStorage, String), AppError> {
    let name = || AppError::Name(document.display().to_string());
    if document.extension().is_some_and(|ext| ext == "json") {
        let dir = match document.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let stem = document.file_stem().and_then(|s| s.to_str()).ok_or_else(name)?;
        Ok((FileStorage::new(dir)?, document_id(stem)?))
    } else {
        let id = document.to_str().ok_or_else(name)?;
        Ok((open_library(library)?, document_id(id)?))
    }
}

fn list(library: Option<&Path>) -> Result<(), AppError> {
    let storage = open_library(library)?;
    let ids = storage.list()?;
    log::info!("{} documents in {}", ids.len(), storage.base_path().display());
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    let Some(document) = &args.document else {
        return list(args.library.as_deref());
    };

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let mut canvas = Canvas::with_config(config);
    if let Some((width, height)) = args.size {
        canvas.set_viewport_size(width, height);
    }

    let (storage, id) = locate(document, args.library.as_deref())?;
    let count = canvas.apply_document(storage.load(&id)?);
    canvas.fit_to_content();
    log::info!(
        "{} segments, snap mode {}, zoom {:.3}",
        count,
        canvas.snap_mode(),
        canvas.camera().zoom
    );

    if args.save {
        // Rewrites legacy bare arrays in the current format.
        storage.save(&id, &canvas.to_document())?;
    }

    let options = SvgOptions {
        background: Some(DEFAULT_BACKGROUND.to_string()),
        grid: args.grid.then(|| *canvas.lattice()),
        ..SvgOptions::default()
    };
    let svg = canvas.export_svg(&options);

    let output = args
        .output
        .unwrap_or_else(|| storage.base_path().join(format!("{}.svg", id)));
    std::fs::write(&output, svg).map_err(|source| AppError::Write {
        path: output.display().to_string(),
        source,
    })?;
    log::info!("Wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Hexboard");

    match Args::parse(std::env::args().skip(1)).and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexboard_core::Document;
    use std::fs;
    use tempfile::tempdir;

    const LEGACY: &str = r#"[{"a":{"x":0,"y":0},"b":{"x":40,"y":0}},{"a":{"x":40,"y":0},"b":{"x":20,"y":34.64}}]"#;

    fn args(list: &[&str]) -> Result<Args, AppError> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["doc.json", "out.svg", "--size", "640x480", "--grid", "--save"]).unwrap();
        assert_eq!(parsed.document, Some(PathBuf::from("doc.json")));
        assert_eq!(parsed.output, Some(PathBuf::from("out.svg")));
        assert_eq!(parsed.size, Some((640.0, 480.0)));
        assert!(parsed.grid);
        assert!(parsed.save);

        let listing = args(&["--list", "--library", "/tmp/docs"]).unwrap();
        assert!(listing.list && listing.document.is_none());
        assert_eq!(listing.library, Some(PathBuf::from("/tmp/docs")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(args(&[]), Err(AppError::Usage)));
        assert!(matches!(args(&["a", "b", "c"]), Err(AppError::Usage)));
        assert!(matches!(args(&["a", "--size", "wide"]), Err(AppError::Size(_))));
        assert!(matches!(args(&["a", "--verbose"]), Err(AppError::Usage)));
        assert!(matches!(args(&["a", "--library"]), Err(AppError::Usage)));
    }

    #[test]
    fn test_document_ids() {
        assert_eq!(document_id("sketch-2_b").unwrap(), "sketch-2_b");
        assert!(matches!(document_id("my sketch"), Err(AppError::Name(_))));
        assert!(matches!(document_id(""), Err(AppError::Name(_))));
    }

    #[test]
    fn test_run_renders_and_upgrades_legacy_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.json");
        fs::write(&path, LEGACY).unwrap();

        let parsed = Args {
            document: Some(path.clone()),
            grid: true,
            save: true,
            ..Args::default()
        };
        run(parsed).unwrap();

        let svg = fs::read_to_string(dir.path().join("old.svg")).unwrap();
        assert_eq!(svg.matches("<line ").count(), 2);

        let saved = Document::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.lines.len(), 2);
        assert!(saved.snap_mode.is_some());
        assert!(fs::read_to_string(&path).unwrap().trim_start().starts_with('{'));
    }

    #[test]
    fn test_run_reads_named_document_from_library() {
        let dir = tempdir().unwrap();
        let library = FileStorage::new(dir.path().join("docs")).unwrap();
        library.save("sketch", &Document::from_json(LEGACY).unwrap()).unwrap();
        let output = dir.path().join("sketch.svg");

        let parsed = Args {
            document: Some(PathBuf::from("sketch")),
            output: Some(output.clone()),
            library: Some(dir.path().join("docs")),
            ..Args::default()
        };
        run(parsed).unwrap();
        assert!(fs::read_to_string(&output).unwrap().contains("<line "));
    }

    #[test]
    fn test_run_reports_missing_and_invalid_documents() {
        let dir = tempdir().unwrap();
        let missing = Args {
            document: Some(dir.path().join("nothing.json")),
            ..Args::default()
        };
        assert!(matches!(run(missing), Err(AppError::Storage(StorageError::NotFound(_)))));

        fs::write(dir.path().join("broken.json"), "{\"lines\": 3}").unwrap();
        let broken = Args {
            document: Some(dir.path().join("broken.json")),
            ..Args::default()
        };
        assert!(matches!(run(broken), Err(AppError::Storage(StorageError::Serialization(_)))));
        assert!(!dir.path().join("broken.svg").exists());
    }
}
