//! Classboard replay tool.
//!
//! Opens a board from the file store, replays a newline-delimited log of sync
//! messages against it, prints the resulting zone layouts and optionally saves
//! it back.

use clap::Parser;
use classboard_core::hierarchy;
use classboard_core::storage::{AutoSaveManager, FileStorage, StorageError, create_default_storage};
use classboard_core::{Board, BoardConfig, BoardError, SceneObject};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "classboard")]
#[command(about = "Replay classroom board sync logs and inspect zone layouts")]
#[command(version)]
struct Cli {
    /// Board store directory. Defaults to the per-user data directory.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Stored board to open. Starts from an empty board when omitted.
    #[arg(long, conflicts_with = "last")]
    board: Option<String>,

    /// Open the most recently saved board.
    #[arg(long)]
    last: bool,

    /// Newline-delimited sync messages to apply, one JSON object per line.
    #[arg(long)]
    messages: Option<PathBuf>,

    /// Board configuration overrides (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the resulting board back to the store.
    #[arg(long)]
    save: bool,

    /// List stored boards and exit.
    #[arg(long)]
    list: bool,

    /// Name for a new board.
    #[arg(long, default_value = "Untitled board")]
    name: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Outcome of replaying a message log.
#[derive(Debug, Default, PartialEq, Eq)]
struct ReplayStats {
    applied: usize,
    unchanged: usize,
    dropped: usize,
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

fn open_store(dir: Option<&Path>) -> Result<AutoSaveManager<FileStorage>, CliError> {
    let storage = match dir {
        Some(dir) => Arc::new(FileStorage::new(dir.to_path_buf())?),
        None => create_default_storage()?,
    };
    log::debug!("Using board store {}", storage.base_path().display());
    Ok(AutoSaveManager::new(storage))
}

/// Board to work on: the requested one, the last saved one, or a new one.
fn open_board(
    store: &mut AutoSaveManager<FileStorage>,
    cli: &Cli,
    config: BoardConfig,
) -> Result<Board, CliError> {
    if let Some(id) = &cli.board {
        let record = pollster::block_on(store.load(id))?;
        return Ok(Board::from_record(record, config));
    }
    if cli.last {
        match pollster::block_on(store.load_last()) {
            Some(record) => return Ok(Board::from_record(record, config)),
            None => log::warn!("No saved board yet, starting a new one"),
        }
    }
    Ok(Board::with_config(cli.name.clone(), config))
}

/// Apply every non-blank line of `log` as a remote message.
fn replay(board: &mut Board, log: &str) -> ReplayStats {
    let mut stats = ReplayStats::default();
    for (n, line) in log.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match board.handle_message(line) {
            Ok(true) => stats.applied += 1,
            Ok(false) => stats.unchanged += 1,
            Err(_) => {
                log::warn!("Line {} dropped", n + 1);
                stats.dropped += 1;
            }
        }
    }
    stats
}

/// Human-readable summary of every zone's layout.
fn describe_zones(board: &Board) -> Vec<String> {
    let mut lines = Vec::new();
    for obj in board.scene().objects() {
        let Some(zone) = obj.as_zone() else { continue };
        let Some(layout) = board.compute_layout(obj.id(), None) else { continue };
        lines.push(format!(
            "zone {} \"{}\" ({:?}): {} members, height {:.0}",
            obj.id(),
            zone.title,
            zone.zone_kind,
            layout.positions.len(),
            layout.height
        ));
        for (id, point) in &layout.positions {
            let kind = board.get_object(id).map_or("?", SceneObject::kind_name);
            lines.push(format!("  {} {} at ({:.0}, {:.0})", kind, id, point.x, point.y));
        }
    }
    lines
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut store = open_store(cli.store.as_deref())?;
    if cli.list {
        for id in pollster::block_on(store.list_boards())? {
            println!("{}", id);
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => BoardConfig::from_json(&read(path)?)?,
        None => BoardConfig::default(),
    };
    let mut board = open_board(&mut store, &cli, config)?;
    log::info!("Board {} with {} objects", board.id(), board.scene().len());

    if let Some(path) = &cli.messages {
        let stats = replay(&mut board, &read(path)?);
        println!(
            "replayed: {} applied, {} unchanged, {} dropped",
            stats.applied, stats.unchanged, stats.dropped
        );
    }

    println!(
        "{}: {} objects, {} ink strokes",
        board.name(),
        board.scene().len(),
        board.scene().ink().len()
    );
    for line in describe_zones(&board) {
        println!("{}", line);
    }
    if !hierarchy::is_consistent(board.scene()) {
        log::warn!("Zone containment is inconsistent");
    }

    if cli.save {
        pollster::block_on(store.save(&board.to_record()))?;
        log::info!("Saved board {}", board.id());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classboard_core::storage::Storage;
    use tempfile::tempdir;

    const LOG: &str = r#"
{"type":"ADD_ITEM","item":{"kind":"zone","id":"z","x":0,"y":0,"w":600,"title":"Claims","zoneKind":"plain"}}
{"type":"ADD_ITEM","item":{"kind":"note","id":"a","x":0,"y":0,"w":100,"h":100,"text":"first"}}
{"type":"ZONE_REORDER","zoneId":"z","children":["a"]}
not json
{"type":"DELETE_NOTE","id":"missing"}
"#;

    #[test]
    fn test_replay_counts() {
        let mut board = Board::new("t");
        let stats = replay(&mut board, LOG);

        assert_eq!(stats, ReplayStats { applied: 3, unchanged: 1, dropped: 1 });
        assert!(hierarchy::is_consistent(board.scene()));
        assert!(!board.has_outgoing());
    }

    #[test]
    fn test_describe_zones() {
        let mut board = Board::new("t");
        replay(&mut board, LOG);

        let lines = describe_zones(&board);
        assert_eq!(lines[0], "zone z \"Claims\" (Plain): 1 members, height 300");
        assert_eq!(lines[1], "  note a at (20, 50)");
    }

    fn cli(store: &Path) -> Cli {
        Cli {
            store: Some(store.to_path_buf()),
            board: None,
            last: false,
            messages: None,
            config: None,
            save: false,
            list: false,
            name: "Replayed".to_string(),
        }
    }

    #[test]
    fn test_run_saves_to_store() {
        let dir = tempdir().unwrap();
        let messages = dir.path().join("log.ndjson");
        fs::write(&messages, LOG).unwrap();
        let store_dir = dir.path().join("boards");

        run(Cli { messages: Some(messages), save: true, ..cli(&store_dir) }).unwrap();

        let store = open_store(Some(&store_dir)).unwrap();
        let ids = pollster::block_on(store.list_boards()).unwrap();
        assert_eq!(ids.len(), 1);
        let record = pollster::block_on(store.storage().load(&ids[0])).unwrap();
        assert_eq!(record.name, "Replayed");
        assert_eq!(record.objects.len(), 2);
    }

    #[test]
    fn test_run_reopens_saved_board() {
        let dir = tempdir().unwrap();
        let messages = dir.path().join("log.ndjson");
        fs::write(&messages, LOG).unwrap();
        let store_dir = dir.path().join("boards");
        run(Cli { messages: Some(messages), save: true, ..cli(&store_dir) }).unwrap();

        let mut store = open_store(Some(&store_dir)).unwrap();
        let id = pollster::block_on(store.list_boards()).unwrap().remove(0);
        let by_id = Cli { board: Some(id.clone()), ..cli(&store_dir) };
        let reopened = open_board(&mut store, &by_id, BoardConfig::default()).unwrap();
        assert_eq!(reopened.id(), id);
        assert_eq!(reopened.zone_members("z").len(), 1);

        let last = Cli { last: true, ..cli(&store_dir) };
        let last = open_board(&mut store, &last, BoardConfig::default()).unwrap();
        assert_eq!(last.id(), id);
    }

    #[test]
    fn test_last_without_saves_starts_new_board() {
        let dir = tempdir().unwrap();
        let mut store = open_store(Some(dir.path())).unwrap();
        let last = Cli { last: true, ..cli(dir.path()) };
        let board = open_board(&mut store, &last, BoardConfig::default()).unwrap();
        assert_eq!(board.name(), "Replayed");
        assert!(board.scene().is_empty());
    }

    #[test]
    fn test_run_reports_missing_board() {
        let dir = tempdir().unwrap();
        let result = run(Cli { board: Some("missing".to_string()), ..cli(dir.path()) });
        assert!(matches!(result, Err(CliError::Storage(StorageError::NotFound(_)))));
    }

    #[test]
    fn test_run_reports_missing_messages() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.ndjson");
        let result = run(Cli { messages: Some(missing), ..cli(dir.path()) });
        assert!(matches!(result, Err(CliError::Read { .. })));
    }
}
