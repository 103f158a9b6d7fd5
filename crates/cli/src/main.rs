use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use focus_range::{
    FocusRangeDrag, FocusRangeStore, Fps, GestureKind, Range, Sequence, SheetAddress, ThumbEdge,
    UnitScale,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "focus-cli")]
#[command(about = "Focus range CLI - headless focus-range editing operations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new focus-range store file
    New {
        /// Store file path
        store: PathBuf,

        /// Sequence length in unit time
        #[arg(long, default_value = "10.0")]
        length: f64,

        /// Frame rate (e.g., 30, 25, 24)
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// Set a sheet's focus range
    Set {
        /// Store file path
        store: PathBuf,

        /// Project id
        #[arg(short, long)]
        project: String,

        /// Sheet id
        #[arg(short, long)]
        sheet: String,

        /// Range start in unit time
        start: f64,

        /// Range end in unit time
        end: f64,

        /// Create the range disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Toggle a sheet's focus range between enabled and disabled
    Toggle {
        /// Store file path
        store: PathBuf,

        /// Project id
        #[arg(short, long)]
        project: String,

        /// Sheet id
        #[arg(short, long)]
        sheet: String,
    },

    /// Delete a sheet's focus range
    Delete {
        /// Store file path
        store: PathBuf,

        /// Project id
        #[arg(short, long)]
        project: String,

        /// Sheet id
        #[arg(short, long)]
        sheet: String,
    },

    /// Simulate a drag gesture from a series of pixel deltas
    Drag {
        /// Store file path
        store: PathBuf,

        /// Project id
        #[arg(short, long)]
        project: String,

        /// Sheet id
        #[arg(short, long)]
        sheet: String,

        /// Gesture kind
        #[arg(long, value_enum)]
        gesture: GestureArg,

        /// Creation origin in unit time (create gesture only)
        #[arg(long)]
        origin: Option<f64>,

        /// View scale in pixels per unit
        #[arg(long, default_value = "100.0")]
        pixels_per_unit: f64,

        /// Pixel deltas, each measured from the gesture start
        #[arg(allow_hyphen_values = true)]
        deltas: Vec<f64>,
    },

    /// Undo the last committed edit
    Undo {
        /// Store file path
        store: PathBuf,
    },

    /// Redo the last undone edit
    Redo {
        /// Store file path
        store: PathBuf,
    },

    /// Print the store, or one sheet's focus range
    Show {
        /// Store file path
        store: PathBuf,

        /// Project id
        #[arg(short, long)]
        project: Option<String>,

        /// Sheet id
        #[arg(short, long)]
        sheet: Option<String>,

        /// Include the committed-edit history
        #[arg(long)]
        history: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GestureArg {
    /// Resize the range's start edge
    ThumbStart,
    /// Resize the range's end edge
    ThumbEnd,
    /// Move the whole range
    Strip,
    /// Create a new range from an origin
    Create,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::New { store, length, fps } => new_command(store, length, fps),
        Commands::Set {
            store,
            project,
            sheet,
            start,
            end,
            disabled,
        } => set_command(store, project, sheet, start, end, disabled),
        Commands::Toggle {
            store,
            project,
            sheet,
        } => toggle_command(store, project, sheet),
        Commands::Delete {
            store,
            project,
            sheet,
        } => delete_command(store, project, sheet),
        Commands::Drag {
            store,
            project,
            sheet,
            gesture,
            origin,
            pixels_per_unit,
            deltas,
        } => drag_command(store, project, sheet, gesture, origin, pixels_per_unit, deltas),
        Commands::Undo { store } => undo_command(store),
        Commands::Redo { store } => redo_command(store),
        Commands::Show {
            store,
            project,
            sheet,
            history,
        } => show_command(store, project, sheet, history),
    }
}

fn load_store(path: &Path) -> Result<FocusRangeStore> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store file: {}", path.display()))?;
    let store = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse store file: {}", path.display()))?;
    Ok(store)
}

fn save_store(path: &Path, store: &mut FocusRangeStore) -> Result<()> {
    if let Some(metadata) = store.metadata.as_object_mut() {
        metadata.insert(
            "saved".to_string(),
            serde_json::json!(chrono::Utc::now().to_rfc3339()),
        );
    }
    std::fs::write(path, serde_json::to_string_pretty(store)?)
        .with_context(|| format!("failed to write store file: {}", path.display()))?;
    Ok(())
}

/// Reads the sequence settings the `new` command recorded in the store
/// metadata, falling back to defaults when absent.
fn sequence_from_metadata(store: &FocusRangeStore) -> Sequence {
    let sequence = &store.metadata["sequence"];
    let length = sequence["length"].as_f64().unwrap_or(10.0);
    let fps = sequence["fps"].as_u64().unwrap_or(30) as u32;
    Sequence::new(length, Fps::new(fps, 1))
}

fn new_command(path: PathBuf, length: f64, fps: u32) -> Result<()> {
    info!(
        "Creating store {:?} (sequence length {} at {}fps)",
        path, length, fps
    );

    let mut store = FocusRangeStore::new();
    store.metadata = serde_json::json!({
        "version": "1.0.0",
        "created": chrono::Utc::now().to_rfc3339(),
        "sequence": { "length": length, "fps": fps },
    });

    save_store(&path, &mut store)?;
    info!("Store created");
    Ok(())
}

fn set_command(
    path: PathBuf,
    project: String,
    sheet: String,
    start: f64,
    end: f64,
    disabled: bool,
) -> Result<()> {
    if end < start {
        return Err(anyhow::anyhow!(
            "range end {} is before range start {}",
            end,
            start
        ));
    }

    let mut store = load_store(&path)?;
    let address = SheetAddress::new(project, sheet);

    store.set_focus_range(address.clone(), Range::new(start, end), !disabled)?;
    save_store(&path, &mut store)?;

    info!(
        "Set focus range [{}, {}] on {} ({})",
        start,
        end,
        address,
        if disabled { "disabled" } else { "enabled" }
    );
    Ok(())
}

fn toggle_command(path: PathBuf, project: String, sheet: String) -> Result<()> {
    let mut store = load_store(&path)?;
    let address = SheetAddress::new(project, sheet);

    let enabled = store.toggle_enabled(address.clone())?;
    save_store(&path, &mut store)?;

    info!(
        "Focus range on {} is now {}",
        address,
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn delete_command(path: PathBuf, project: String, sheet: String) -> Result<()> {
    let mut store = load_store(&path)?;
    let address = SheetAddress::new(project, sheet);

    store.delete_focus_range(address.clone())?;
    save_store(&path, &mut store)?;

    info!("Deleted focus range on {}", address);
    Ok(())
}

fn drag_command(
    path: PathBuf,
    project: String,
    sheet: String,
    gesture: GestureArg,
    origin: Option<f64>,
    pixels_per_unit: f64,
    deltas: Vec<f64>,
) -> Result<()> {
    let mut store = load_store(&path)?;
    let address = SheetAddress::new(project, sheet);
    let sequence = sequence_from_metadata(&store);

    let kind = match gesture {
        GestureArg::ThumbStart => GestureKind::Thumb(ThumbEdge::Start),
        GestureArg::ThumbEnd => GestureKind::Thumb(ThumbEdge::End),
        GestureArg::Strip => GestureKind::Strip,
        GestureArg::Create => GestureKind::Create {
            origin: origin
                .ok_or_else(|| anyhow::anyhow!("the create gesture requires --origin"))?,
        },
    };

    if deltas.is_empty() {
        warn!("No deltas given; the gesture is a zero-distance click");
    }

    let mut drag = FocusRangeDrag::new(
        address.clone(),
        sequence,
        UnitScale::new(pixels_per_unit),
        kind,
    );

    drag.drag_start(&mut store)?;
    for delta in &deltas {
        drag.drag(&mut store, *delta)?;
        if let Some(state) = store.focus_range(&address) {
            debug!(
                "Staged [{}, {}] at {}px",
                state.range.start, state.range.end, delta
            );
        }
    }
    let committed = drag.drag_end(&mut store)?;

    if committed {
        info!("Gesture committed after {} moves", deltas.len());
    } else {
        info!("Gesture discarded (no movement)");
    }

    match store.focus_range(&address) {
        Some(state) => info!(
            "Focus range on {}: [{}, {}] ({})",
            address,
            state.range.start,
            state.range.end,
            if state.enabled { "enabled" } else { "disabled" }
        ),
        None => info!("No focus range on {}", address),
    }

    save_store(&path, &mut store)?;
    Ok(())
}

fn undo_command(path: PathBuf) -> Result<()> {
    let mut store = load_store(&path)?;
    store.undo()?;
    save_store(&path, &mut store)?;
    info!("Undid last edit (revision {})", store.revision());
    Ok(())
}

fn redo_command(path: PathBuf) -> Result<()> {
    let mut store = load_store(&path)?;
    store.redo()?;
    save_store(&path, &mut store)?;
    info!("Redid last undone edit (revision {})", store.revision());
    Ok(())
}

fn show_command(
    path: PathBuf,
    project: Option<String>,
    sheet: Option<String>,
    history: bool,
) -> Result<()> {
    let store = load_store(&path)?;

    match (project, sheet) {
        (Some(project), Some(sheet)) => {
            let address = SheetAddress::new(project, sheet);
            match store.focus_range(&address) {
                Some(state) => println!("{}", serde_json::to_string_pretty(state)?),
                None => warn!("No focus range on {}", address),
            }
        }
        (None, None) => {
            println!("{}", serde_json::to_string_pretty(&store)?);
        }
        _ => {
            return Err(anyhow::anyhow!(
                "--project and --sheet must be given together"
            ));
        }
    }

    if history {
        info!("Revision: {}", store.revision());
        for edit in store.undo_history() {
            let committed_at = chrono::DateTime::from_timestamp_millis(edit.committed_at)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| edit.committed_at.to_string());
            println!("{}  {}  {:?}", edit.id, committed_at, edit.inverse);
        }
    }

    Ok(())
}
