//! Headless entry point: replays a recorded session and saves the result.

mod session;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use linecad_core::storage::{FileStorage, RetryQueue, Storage};
use linecad_core::{Editor, EditorConfig};

use session::{AppError, Session, replay};

/// Save attempts before giving up.
const MAX_SAVE_ATTEMPTS: usize = 3;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting linecad");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (session_path, output_dir, config_path) = match args.as_slice() {
        [session, output] => (PathBuf::from(session), PathBuf::from(output), None),
        [session, output, config] => (PathBuf::from(session), PathBuf::from(output), Some(PathBuf::from(config))),
        _ => {
            eprintln!("usage: linecad <session.json> <output-dir> [config.json]");
            return ExitCode::from(2);
        }
    };

    match run(&session_path, &output_dir, config_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, AppError> {
    if let Some(path) = path {
        return Ok(EditorConfig::load(path)?);
    }
    match EditorConfig::default_path() {
        Some(path) if path.exists() => Ok(EditorConfig::load(path)?),
        _ => Ok(EditorConfig::default()),
    }
}

fn run(session_path: &Path, output_dir: &Path, config_path: Option<&Path>) -> Result<(), AppError> {
    let config = load_config(config_path)?;
    let session = Session::load(session_path)?;

    let id = session_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("drawing")
        .to_string();

    let mut editor = Editor::new(config);
    editor.drawing_mut().name = id.clone();
    let summary = replay(&mut editor, &session)?;
    log::info!(
        "replayed {} events: {} committed, {} deleted, {} moved",
        summary.events,
        summary.committed,
        summary.deleted,
        summary.moved
    );

    let storage = Arc::new(FileStorage::new(output_dir)?);
    let drawing = editor.into_drawing();
    let count = drawing.drawable_count();

    let mut queue = RetryQueue::new();
    let target = Arc::clone(&storage);
    let key = id.clone();
    let mut saved = queue.exec(format!("save {id}"), move || target.save(&key, &drawing));
    for _ in 1..MAX_SAVE_ATTEMPTS {
        if saved {
            break;
        }
        saved = queue.process() > 0;
    }
    if !saved {
        return Err(AppError::Storage(linecad_core::StorageError::Other(format!(
            "could not save {id} after {MAX_SAVE_ATTEMPTS} attempts"
        ))));
    }

    log::info!("saved {count} drawables to {}", storage.base_path().display());
    Ok(())
}
