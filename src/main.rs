// Entry point and high-level CLI flow.
//
// - Option [1] loads one CSV per configured platform from the data directory.
// - Option [2] sets (or clears) the reporting window; datasets are recomputed.
// - Option [3] writes per-platform group/comparison tables and a JSON summary,
//   printing Markdown previews of each.
use ad_report::config::AppConfig;
use ad_report::loader::{read_table, rows_from_table};
use ad_report::period::{previous_period, DateWindow};
use ad_report::pipeline::DatasetStore;
use ad_report::util::format_int;
use ad_report::{output, reports, ReportError};
use std::io::{self, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct App {
    config: AppConfig,
    store: DatasetStore,
}

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load every platform file that exists in the data dir.
fn handle_load(app: &mut App) {
    let ids: Vec<String> = app.store.registry().ids().map(str::to_string).collect();
    let mut loaded = 0usize;
    for id in ids {
        let path = app.config.data_file(&id);
        if !path.exists() {
            continue;
        }
        let table = match read_table(&path) {
            Ok(t) => t,
            Err(e) => {
                error!(platform = %id, path = %path.display(), error = %e, "failed to read table");
                eprintln!("Failed to load {}: {}", path.display(), e);
                continue;
            }
        };
        let (rows, report) = rows_from_table(&table);
        match app.store.set_rows(&id, rows) {
            Ok(dataset) => {
                loaded += 1;
                println!(
                    "Loaded {} ({} rows, {} skipped, {} groups)",
                    id,
                    format_int(report.loaded_rows),
                    format_int(report.skipped_rows),
                    format_int(dataset.groups().len())
                );
            }
            Err(e) => eprintln!("Failed to load {}: {}", id, e),
        }
    }
    if loaded == 0 {
        println!(
            "No platform files found in {} (expected <platform>.csv).",
            app.config.data_dir.display()
        );
    }
    println!();
}

/// Handle option [2]: set or clear the reporting window.
fn handle_date_range(app: &mut App) {
    let from = read_line("From (YYYY-MM-DD, blank for all data): ");
    let to = read_line("To (YYYY-MM-DD, blank for all data): ");
    let window = DateWindow::from_bounds(Some(&from), Some(&to));
    match &window {
        Some(w) => {
            let prev = previous_period(w);
            println!(
                "Reporting {} to {} (compared with {} to {}).\n",
                w.from, w.to, prev.from, prev.to
            );
        }
        None => println!("No valid date range given; reporting on all data.\n"),
    }
    app.store.set_window(window);
}

/// Handle option [3]: write reports for every loaded platform.
fn handle_generate_reports(app: &App) {
    if app.store.is_empty() {
        println!("Error: No data loaded. Please load the data files first (option 1).\n");
        return;
    }
    if let Err(e) = std::fs::create_dir_all(&app.config.output_dir) {
        eprintln!("Failed to create {}: {}", app.config.output_dir.display(), e);
        return;
    }

    println!("Generating reports...\n");
    for (id, dataset) in app.store.iter() {
        let Ok(config) = app.store.registry().get(id) else {
            continue;
        };

        let groups = reports::generate_group_table(config, &dataset.report);
        let file = app.config.output_dir.join(format!("{}_groups.csv", id));
        if let Err(e) = output::write_csv(&file, &groups) {
            eprintln!("Write error: {}", e);
        }
        let note = match &dataset.report.window {
            Some(w) => format!("{} to {}, by {}", w.from, w.to, config.group_by),
            None => format!("All dates, by {}", config.group_by),
        };
        output::preview_table(&config.name, Some(&note), &groups, app.config.preview_rows);
        println!("(Full table exported to {})\n", file.display());

        let comparison = reports::generate_comparison_table(config, &dataset.report);
        if !comparison.is_empty() {
            let file = app.config.output_dir.join(format!("{}_comparison.csv", id));
            if let Err(e) = output::write_csv(&file, &comparison) {
                eprintln!("Write error: {}", e);
            }
            output::preview_table(
                &format!("{} vs previous period", config.name),
                None,
                &comparison,
                comparison.rows.len(),
            );
        }
    }

    let summary = reports::generate_summary(&app.store);
    let file = app.config.output_dir.join("summary.json");
    match output::write_json(&file, &summary) {
        Ok(()) => info!(path = %file.display(), platforms = summary.platforms.len(), "summary written"),
        Err(e) => eprintln!("Write error: {}", e),
    }
    println!("Summary saved to {}\n", file.display());
}

fn main() -> Result<(), ReportError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ad_report=info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    let registry = config.registry()?;
    info!(platforms = registry.len(), data_dir = %config.data_dir.display(), "starting");
    let mut app = App {
        config,
        store: DatasetStore::new(registry),
    };

    loop {
        println!("Select an option:");
        println!("[1] Load data files");
        println!("[2] Set date range");
        println!("[3] Generate reports\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_load(&mut app),
            "2" => handle_date_range(&mut app),
            "3" => {
                println!();
                handle_generate_reports(&app);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
    Ok(())
}
