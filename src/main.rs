// Entry point and interactive menu.
//
// The menu mirrors the field dashboard workflow:
// - [1] loads both workbooks and prepares the distance-ranked table,
// - [2] changes the issue / chain filters,
// - [3] picks route stops within the active chain,
// - [4] previews the visible table, headline counts and comments,
// - [5] exports CSV, GeoJSON and a JSON summary.
// With `--export` the menu is skipped and the export runs once.
use clap::Parser;
use field_map::cache::PipelineCache;
use field_map::cli::Args;
use field_map::config::Config;
use field_map::filter::{self, FilterOutcome, FilterState};
use field_map::output;
use field_map::render::{GeoJsonRenderer, MapRenderer};
use field_map::types::{ExportSummary, MapRow, PreparedMap};
use field_map::util::format_int;
use field_map::{logging, MapError, Result};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use tracing::{info, warn};

struct Session {
    args: Args,
    config: Config,
    cache: PipelineCache,
    prepared: Option<Arc<PreparedMap>>,
    filters: FilterState,
    route: Vec<String>,
}

impl Session {
    fn new(args: Args, config: Config) -> Self {
        let filters = config.filters.to_state();
        let route = filters.route_stops(&args.route);
        if route.is_empty() && !args.route.is_empty() {
            warn!("--route ignored: routes need an active --chain filter");
        }
        Self {
            route,
            args,
            config,
            cache: PipelineCache::new(),
            prepared: None,
            filters,
        }
    }

    fn visible(&self) -> Option<FilterOutcome> {
        let prepared = self.prepared.as_ref()?;
        Some(filter::apply(
            &prepared.records,
            prepared.has_chain_code,
            &self.filters,
        ))
    }
}

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| MapError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Option [1]: read both workbooks and run (or reuse) the pipeline.
fn handle_load(session: &mut Session) -> Result<()> {
    let loc_bytes = read_file(&session.args.locations)?;
    let alert_bytes = read_file(&session.args.alerts)?;
    let reference = session.config.reference_or_default();

    let prepared = session.cache.get_or_prepare(
        &loc_bytes,
        &alert_bytes,
        reference,
        &session.config.alert_sheet,
    )?;

    let loc = &prepared.location_report;
    let alerts = &prepared.alert_report;
    println!(
        "Locations: {} rows in '{}', {} kept ({} incomplete, {} bad coordinates)",
        format_int(loc.total_rows),
        loc.sheet,
        format_int(loc.kept_rows),
        format_int(loc.missing_rows),
        format_int(loc.coercion_failures)
    );
    println!(
        "Alerts: {} rows in '{}', {} kept ({} without site code)",
        format_int(alerts.total_rows),
        alerts.sheet,
        format_int(alerts.kept_rows),
        format_int(alerts.missing_rows)
    );
    println!(
        "Map: {} alerted sites within reach of ({:.6}, {:.6}), {} issue types\n",
        format_int(prepared.records.len()),
        reference.lat,
        reference.lon,
        prepared.issues.len()
    );
    for warning in &prepared.warnings {
        println!("Warning: {warning}.\n");
    }

    session.prepared = Some(prepared);
    Ok(())
}

/// Option [2]: change filters. Any change clears the route.
fn handle_filters(session: &mut Session) {
    let Some(prepared) = session.prepared.clone() else {
        println!("Error: No data loaded. Please load the workbooks first (option 1).\n");
        return;
    };

    println!("Issues available: {}", prepared.issues.join(", "));
    let answer = prompt("Issues to show (comma-separated, Enter = all, '-' = none)");
    let issues = match answer.as_str() {
        "" => None,
        "-" => Some(BTreeSet::new()),
        list => Some(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    };
    let chain = prompt("Lant code (Enter = none)");
    let toggle = prompt("Cluster markers? (Y/N, Enter = keep)").to_uppercase();
    match toggle.as_str() {
        "Y" => session.config.cluster = true,
        "N" => session.config.cluster = false,
        _ => {}
    }

    session.filters = FilterState {
        issues,
        chain_code: (!chain.is_empty()).then_some(chain),
    };
    session.route.clear();
    println!();
}

/// Option [3]: pick route stops among the sites of the active chain.
fn handle_route(session: &mut Session) {
    let Some(outcome) = session.visible() else {
        println!("Error: No data loaded. Please load the workbooks first (option 1).\n");
        return;
    };
    if session.filters.active_chain().is_none() || outcome.records.is_empty() {
        println!(
            "Routes are built within a chain. \
             Set a Lant filter that matches some sites first.\n"
        );
        return;
    }

    let sites = filter::chain_sites(&outcome.records);
    println!("Sites in chain: {}", sites.join(" "));
    let answer = prompt("Stops in order (space-separated)");
    let requested: Vec<String> = answer
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(str::to_string)
        .collect();
    session.route = session.filters.route_stops(&requested);
    println!("Route: {}\n", session.route.join(" -> "));
}

/// Option [4]: preview the visible table and headline counts.
fn handle_show(session: &Session) {
    let (Some(prepared), Some(outcome)) = (session.prepared.as_ref(), session.visible()) else {
        println!("Error: No data loaded. Please load the workbooks first (option 1).\n");
        return;
    };
    for w in &outcome.warnings {
        println!("Warning: {}", w);
    }

    let m = output::metrics(&outcome.records);
    println!(
        "Sites on map: {}   OnAir: {}   Down: {}",
        format_int(m.total),
        format_int(m.onair),
        format_int(m.down)
    );
    if let Some(chain) = session.filters.active_chain() {
        println!("Lant filter active: {}", chain);
    }
    println!();

    let rows: Vec<MapRow> = outcome.records.iter().map(MapRow::from).collect();
    output::preview_table(&rows, session.config.preview_rows);

    match output::comments_view(&outcome.records, prepared.has_comments) {
        None => println!("Comments column not found.\n"),
        Some(c) if c.is_empty() => println!("No comments.\n"),
        Some(c) => {
            println!("Comments (visible sites)");
            output::preview_table(&c, session.config.preview_rows);
        }
    }
}

/// Option [5]: write the visible table, the GeoJSON map and a summary.
fn handle_export(session: &Session) -> Result<()> {
    let Some(outcome) = session.visible() else {
        println!("Error: No data loaded. Please load the workbooks first (option 1).\n");
        return Ok(());
    };
    for w in &outcome.warnings {
        println!("Warning: {}", w);
    }

    let dir = &session.config.output_dir;
    std::fs::create_dir_all(dir)?;
    let reference = session.config.reference_or_default();

    let csv_path = dir.join("map_sites.csv");
    output::write_csv(&csv_path, &outcome.records)?;

    let geojson = GeoJsonRenderer.render(
        &outcome.records,
        reference,
        session.config.cluster,
        &session.route,
    )?;
    let geojson_path = dir.join("map.geojson");
    output::write_json(&geojson_path, &geojson)?;

    let summary = ExportSummary {
        generated_at: chrono::Local::now().to_rfc3339(),
        reference_lat: reference.lat,
        reference_lon: reference.lon,
        metrics: output::metrics(&outcome.records),
        issues: session
            .prepared
            .as_ref()
            .map(|p| p.issues.clone())
            .unwrap_or_default(),
        chain_code: session.filters.active_chain().map(str::to_string),
        route: session.route.clone(),
    };
    let summary_path = dir.join("summary.json");
    output::write_json(&summary_path, &summary)?;

    info!(rows = outcome.records.len(), dir = %dir.display(), "exported map data");
    println!(
        "Exported {} sites to {}, {} and {}\n",
        format_int(outcome.records.len()),
        csv_path.display(),
        geojson_path.display(),
        summary_path.display()
    );
    Ok(())
}

fn run_menu(session: &mut Session) {
    loop {
        println!("Field Map Tools - Alerts");
        println!("[1] Load workbooks");
        println!("[2] Set filters");
        println!("[3] Build route");
        println!("[4] Show table");
        println!("[5] Export");
        println!("[0] Exit\n");
        let result = match prompt("Enter choice").as_str() {
            "1" => handle_load(session),
            "2" => {
                handle_filters(session);
                Ok(())
            }
            "3" => {
                handle_route(session);
                Ok(())
            }
            "4" => {
                handle_show(session);
                Ok(())
            }
            "5" => handle_export(session),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 0-5.\n");
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {}\n", e);
        }
    }
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    let config = match &args.config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    };
    let config = match config {
        Ok(c) => args.apply_to(c),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let export_only = args.export;
    let mut session = Session::new(args, config);

    if export_only {
        if let Err(e) = handle_load(&mut session).and_then(|_| handle_export(&session)) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        return;
    }

    run_menu(&mut session);
}
