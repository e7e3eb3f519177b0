// Mandala Chart CLI - edit, share and save 9x9 goal charts from the terminal

mod exit_codes;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use serde::Serialize;

use mandala_config::settings::{LinkCheck, Settings};
use mandala_config::snapshots::{SnapshotError, SnapshotStore};
use mandala_engine::activation;
use mandala_engine::coords::{Position, Region};
use mandala_engine::events::GridEvent;
use mandala_engine::grid::Grid;
use mandala_engine::navigation;
use mandala_engine::store::{link_violations, MandalaStore};
use mandala_io::{csv, json, preview, share, templates};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

/// Log filter variable; `RUST_LOG` is used when unset.
const LOG_ENV: &str = "MANDALA_LOG";

#[derive(Parser)]
#[command(name = "mandala")]
#[command(about = "Mandala Chart editor for 9x9 goal grids")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Chart file (JSON array of 81 strings)
    #[arg(long, short = 'f', global = true, env = "MANDALA_FILE", default_value = "mandala.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chart
    #[command(after_help = "\
Examples:
  mandala show
  mandala show --all
  mandala show --region top_left
  mandala show --region top_left --next")]
    Show {
        /// Also show regions whose theme is blank
        #[arg(long, conflicts_with_all = ["region", "next", "prev"])]
        all: bool,

        /// Show one region (falls back to the center when inactive)
        #[arg(long, short = 'r')]
        region: Option<Region>,

        /// Show the active region after --region (or after the center)
        #[arg(long, conflicts_with = "prev")]
        next: bool,

        /// Show the active region before --region (or before the center)
        #[arg(long)]
        prev: bool,
    },

    /// Write a cell, keeping themes and region centers in sync
    #[command(after_help = "\
Positions are a flat index 0-80 or region:cell.
Examples:
  mandala set center:center 'Run a marathon'
  mandala set c:tl Endurance
  mandala set 40 'Run a marathon'")]
    Set {
        /// Cell position
        position: Position,

        /// New value (empty clears)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Clear a cell (clearing a theme clears its region)
    Clear {
        /// Cell position
        position: Position,
    },

    /// Empty the whole chart
    Reset,

    /// List active regions
    Active {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a share link for the chart
    Share {
        /// Base URL (defaults to share.baseUrl)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Replace the chart with one from a share link or code
    #[command(after_help = "\
An unreadable link leaves a non-empty chart file untouched unless --force
is given, in which case the chart is emptied.")]
    Open {
        /// Share URL or bare share code
        link: String,

        /// Replace the chart even when the link cannot be read
        #[arg(long)]
        force: bool,
    },

    /// Built-in example charts
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Write the chart as 9x9 JSON, CSV or TSV
    Export {
        /// Output format
        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Replace the chart from a JSON, CSV or TSV file
    Import {
        /// File to import
        path: PathBuf,
    },

    /// Named copies of the chart
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },

    /// Link-preview title and description
    Preview {
        /// Share code to preview instead of the chart file
        code: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Settings file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List templates
    List,
    /// Replace the chart with a template
    Apply {
        /// Template id
        id: String,
    },
}

#[derive(Subcommand)]
enum SavedCommands {
    /// List saved charts, most recently updated first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save the current chart
    Save,
    /// Replace the chart with a saved one
    Load { id: String },
    /// Rename a saved chart
    Rename { id: String, name: String },
    /// Delete a saved chart
    Delete { id: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file path
    Path,
    /// Write a commented default settings file
    Init,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
    Tsv,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        eprintln!("Usage: mandala <command> [options]");
        eprintln!("       mandala --help for more information");
        return ExitCode::from(EXIT_USAGE);
    };

    let ctx = Context {
        file: cli.file,
        settings: Settings::load(),
    };

    let result = match command {
        Commands::Show { all, region, next, prev } => {
            let step = match (next, prev) {
                (true, _) => Some(Step::Next),
                (_, true) => Some(Step::Prev),
                _ => None,
            };
            cmd_show(&ctx, all, region, step)
        }
        Commands::Set { position, value } => cmd_set(&ctx, position, &value),
        Commands::Clear { position } => cmd_set(&ctx, position, ""),
        Commands::Reset => cmd_reset(&ctx),
        Commands::Active { json } => cmd_active(&ctx, json),
        Commands::Share { base_url } => cmd_share(&ctx, base_url),
        Commands::Open { link, force } => cmd_open(&ctx, &link, force),
        Commands::Template { command } => match command {
            TemplateCommands::List => cmd_template_list(),
            TemplateCommands::Apply { id } => cmd_template_apply(&ctx, &id),
        },
        Commands::Export { format, output } => cmd_export(&ctx, format, output),
        Commands::Import { path } => cmd_import(&ctx, &path),
        Commands::Saved { command } => match command {
            SavedCommands::List { json } => cmd_saved_list(&ctx, json),
            SavedCommands::Save => cmd_saved_save(&ctx),
            SavedCommands::Load { id } => cmd_saved_load(&ctx, &id),
            SavedCommands::Rename { id, name } => cmd_saved_rename(&ctx, &id, &name),
            SavedCommands::Delete { id } => cmd_saved_delete(&ctx, &id),
        },
        Commands::Preview { code, json } => cmd_preview(&ctx, code, json),
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                println!("{}", Settings::config_path().display());
                Ok(())
            }
            ConfigCommands::Init => cmd_config_init(),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging() {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<SnapshotError> for CliError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::NotFound(_) => {
                CliError::io(err.to_string()).with_hint("run `mandala saved list` to see ids")
            }
            _ => CliError::io(err.to_string()),
        }
    }
}

struct Context {
    file: PathBuf,
    settings: Settings,
}

impl Context {
    /// The chart on disk; a missing file is an empty chart.
    fn read_chart(&self) -> Result<Grid, CliError> {
        if !self.file.exists() {
            debug!("{} does not exist, starting empty", self.file.display());
            return Ok(Grid::empty());
        }
        json::read_grid(&self.file)
            .map_err(|e| CliError::parse(format!("{}: {}", self.file.display(), e)))
    }

    fn open_store(&self) -> Result<MandalaStore, CliError> {
        Ok(MandalaStore::with_grid(self.read_chart()?))
    }

    fn write_chart(&self, grid: &Grid) -> Result<(), CliError> {
        json::write_grid(grid, &self.file)
            .map_err(|e| CliError::io(format!("{}: {}", self.file.display(), e)))
    }

    /// Replace the chart wholesale and write it out.
    fn replace_chart(&self, grid: Grid) -> Result<Grid, CliError> {
        let mut store = self.open_store()?;
        let grid = store.load(grid);
        debug!("chart replaced, revision {}", store.revision());
        self.write_chart(&grid)?;
        Ok(grid)
    }

    /// Warn about theme/region disagreements in data from outside.
    fn check_links(&self, grid: &Grid, source: &str) {
        if self.settings.link_check == LinkCheck::Off {
            return;
        }
        for violation in link_violations(grid) {
            warn!("{}: {}", source, violation);
        }
    }

    fn snapshots(&self) -> SnapshotStore {
        SnapshotStore::open(self.settings.snapshots_path())
    }
}

// ============================================================================
// show / active
// ============================================================================

#[derive(Clone, Copy)]
enum Step {
    Next,
    Prev,
}

fn cmd_show(
    ctx: &Context,
    all: bool,
    region: Option<Region>,
    step: Option<Step>,
) -> Result<(), CliError> {
    let grid = ctx.read_chart()?;
    let width = ctx.settings.cell_width.max(3);

    let region = match step {
        Some(step) => {
            let from = navigation::resolve_view(&grid, region.unwrap_or(Region::Center));
            Some(match step {
                Step::Next => navigation::next_active(&grid, from),
                Step::Prev => navigation::prev_active(&grid, from),
            })
        }
        None => region,
    };

    match region {
        Some(requested) => {
            let view = navigation::resolve_view(&grid, requested);
            if view != requested {
                eprintln!("note: {} has no theme yet; showing the center", requested);
            }
            println!(
                "{}",
                render::render_tabs(&grid, view, ctx.settings.label_max_chars)
            );
            println!();
            println!("{}", render::render_region(&grid, view, width));
        }
        None => {
            let show_inactive = all || ctx.settings.show_inactive;
            println!("{}", render::render_grid(&grid, width, show_inactive));
            println!();
            println!(
                "themes: {}/{}",
                activation::active_outer_count(&grid),
                Region::outer().count()
            );
        }
    }
    Ok(())
}

fn cmd_active(ctx: &Context, json: bool) -> Result<(), CliError> {
    let grid = ctx.read_chart()?;

    if json {
        let active = active_tabs(&grid, ctx.settings.label_max_chars);
        let out = serde_json::to_string_pretty(&active)
            .map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    for tab in navigation::tabs(&grid, ctx.settings.label_max_chars) {
        if tab.active {
            println!("{}\t{}", tab.region, tab.label);
        }
    }
    Ok(())
}

fn active_tabs(grid: &Grid, max_chars: usize) -> Vec<navigation::RegionTab> {
    navigation::tabs(grid, max_chars)
        .into_iter()
        .filter(|tab| tab.active)
        .collect()
}

// ============================================================================
// set / clear / reset
// ============================================================================

fn cmd_set(ctx: &Context, position: Position, value: &str) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;

    // Cells of a region without a theme are never shown
    let Position { region, cell } = position;
    if !value.trim().is_empty()
        && !cell.is_center()
        && !activation::is_active(store.grid(), region)
    {
        let mut err = CliError::args(format!("{} has no theme yet", region));
        if let Some(theme) = region.theme_cell() {
            err = err.with_hint(format!("set the theme `center:{}` first", theme));
        }
        return Err(err);
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.set_event_callback(Box::new(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push(event);
        }
    }));

    let grid = store.update_cell(position.index(), value)
        .map_err(|e| CliError::args(e.to_string()))?;
    store.clear_event_callback();
    ctx.write_chart(&grid)?;

    let events = events.lock().map(|e| e.clone()).unwrap_or_default();
    for event in events {
        if let GridEvent::CellsChanged(change) = event {
            let others = change
                .indices
                .iter()
                .filter(|&&i| i != position.index())
                .count();
            if change.cascaded {
                eprintln!("cleared {} linked cell(s)", others);
            } else if others > 0 {
                eprintln!("synced {} linked cell(s)", others);
            }
        }
    }
    debug!("{} written, revision {}", position, store.revision());
    Ok(())
}

fn cmd_reset(ctx: &Context) -> Result<(), CliError> {
    let mut store = MandalaStore::new();
    let grid = store.reset();
    ctx.write_chart(&grid)
}

// ============================================================================
// share / open / preview
// ============================================================================

fn cmd_share(ctx: &Context, base_url: Option<String>) -> Result<(), CliError> {
    let grid = ctx.read_chart()?;
    let base = base_url.unwrap_or_else(|| ctx.settings.share_base_url.clone());
    let url = share::share_url(&base, &ctx.settings.share_param_key, &grid)
        .map_err(|e| CliError::args(e.to_string()))?;
    println!("{}", url);
    Ok(())
}

fn cmd_open(ctx: &Context, link: &str, force: bool) -> Result<(), CliError> {
    let grid = match share::grid_from_link(link, &ctx.settings.share_param_key) {
        Ok(grid) => grid,
        Err(e) => {
            if !force && !ctx.read_chart()?.is_blank() {
                return Err(CliError::parse(format!("could not read share link: {}", e))
                    .with_hint(format!(
                        "{} was left unchanged; pass --force to open an empty chart",
                        ctx.file.display()
                    )));
            }
            warn!("could not read share link ({}); opening an empty chart", e);
            Grid::empty()
        }
    };
    ctx.check_links(&grid, "share link");
    ctx.replace_chart(grid)?;
    Ok(())
}

fn cmd_preview(ctx: &Context, code: Option<String>, json: bool) -> Result<(), CliError> {
    let preview = match code {
        Some(code) => preview::for_code(Some(&code)),
        None => preview::for_grid(&ctx.read_chart()?),
    };

    if json {
        let out = serde_json::to_string_pretty(&preview)
            .map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
    } else {
        println!("{}", preview.title);
        println!("{}", preview.description);
    }
    Ok(())
}

// ============================================================================
// template
// ============================================================================

fn cmd_template_list() -> Result<(), CliError> {
    for template in templates::all() {
        println!("{}\t{}\t{}", template.id, template.name, template.description);
    }
    Ok(())
}

fn cmd_template_apply(ctx: &Context, id: &str) -> Result<(), CliError> {
    let template = templates::by_id(id).ok_or_else(|| {
        CliError::args(format!("unknown template '{}'", id))
            .with_hint("run `mandala template list` to see ids")
    })?;
    ctx.replace_chart(template.grid())?;
    eprintln!("applied template: {}", template.name);
    Ok(())
}

// ============================================================================
// export / import
// ============================================================================

fn cmd_export(ctx: &Context, format: ExportFormat, output: Option<PathBuf>) -> Result<(), CliError> {
    let grid = ctx.read_chart()?;

    match (format, output) {
        (ExportFormat::Json, Some(path)) => json::export(&grid, &path).map_err(CliError::io),
        (ExportFormat::Csv, Some(path)) => csv::export(&grid, &path).map_err(CliError::io),
        (ExportFormat::Tsv, Some(path)) => csv::export_tsv(&grid, &path).map_err(CliError::io),
        (ExportFormat::Json, None) => {
            let out = serde_json::to_string_pretty(&json::to_rows(&grid))
                .map_err(|e| CliError::io(e.to_string()))?;
            println!("{}", out);
            Ok(())
        }
        (ExportFormat::Csv, None) => {
            let out = csv::export_to_string(&grid).map_err(CliError::io)?;
            print!("{}", out);
            Ok(())
        }
        (ExportFormat::Tsv, None) => {
            let out = csv::export_tsv_to_string(&grid).map_err(CliError::io)?;
            print!("{}", out);
            Ok(())
        }
    }
}

fn cmd_import(ctx: &Context, path: &Path) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::args(format!("{}: no such file", path.display())));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let grid = match ext.as_str() {
        "csv" => csv::import(path),
        "tsv" => csv::import_tsv(path),
        _ => json::read_grid(path),
    }
    .map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))?;

    ctx.check_links(&grid, &path.display().to_string());
    ctx.replace_chart(grid)?;
    Ok(())
}

// ============================================================================
// saved
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedSummary<'a> {
    id: &'a str,
    name: &'a str,
    created_at: i64,
    updated_at: i64,
}

fn format_millis(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn cmd_saved_list(ctx: &Context, json: bool) -> Result<(), CliError> {
    let store = ctx.snapshots();
    if store.unparsed_len() > 0 {
        eprintln!(
            "note: {} saved chart(s) in {} could not be read and are not listed",
            store.unparsed_len(),
            store.path().display()
        );
    }

    if json {
        let summaries: Vec<SavedSummary> = store
            .list()
            .iter()
            .map(|e| SavedSummary {
                id: &e.id,
                name: &e.name,
                created_at: e.created_at,
                updated_at: e.updated_at,
            })
            .collect();
        let out = serde_json::to_string_pretty(&summaries)
            .map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    for entry in store.list() {
        println!(
            "{}\t{}\t{}",
            entry.id,
            format_millis(entry.updated_at),
            entry.name.replace('\n', " ")
        );
    }
    Ok(())
}

fn cmd_saved_save(ctx: &Context) -> Result<(), CliError> {
    let grid = ctx.read_chart()?;
    let saved = ctx.snapshots().save(&grid)?;
    println!("{}", saved.id);
    Ok(())
}

fn cmd_saved_load(ctx: &Context, id: &str) -> Result<(), CliError> {
    let store = ctx.snapshots();
    let entry = store
        .get(id)
        .ok_or_else(|| CliError::from(SnapshotError::NotFound(id.to_string())))?;
    ctx.replace_chart(entry.data.clone())?;
    eprintln!("loaded: {}", entry.name);
    Ok(())
}

fn cmd_saved_rename(ctx: &Context, id: &str, name: &str) -> Result<(), CliError> {
    let renamed = ctx.snapshots().rename(id, name)?;
    println!("{}", renamed.name);
    Ok(())
}

fn cmd_saved_delete(ctx: &Context, id: &str) -> Result<(), CliError> {
    let removed = ctx.snapshots().delete(id)?;
    eprintln!("deleted: {}", removed.name);
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_init() -> Result<(), CliError> {
    let path = Settings::config_path();
    let created = Settings::create_default_file(&path).map_err(CliError::io)?;
    if created {
        println!("{}", path.display());
    } else {
        eprintln!("{} already exists", path.display());
    }
    Ok(())
}
