// Entry point and high-level console flow.
//
// The binary mirrors the original dashboard's two workflows:
// - Option [1] analyzes one workbook sheet and prints a ranked preview.
// - Option [2] exports artifacts (CSV, chart JSON, narrative) for the
//   analysis currently held in memory.
// - Option [3] runs the analysis on two workbooks and compares them.

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

use rca_report::compare::{compare, insights};
use rca_report::config::{RunConfig, DEFAULT_CONFIG_FILE};
use rca_report::error::RcaError;
use rca_report::grid::{split_tables, SheetSelector};
use rca_report::loader::load_grid;
use rca_report::narrative::narrative;
use rca_report::output;
use rca_report::rca::{aggregate, label};
use rca_report::types::RcaResultSet;
use rca_report::util::format_int;
use rca_report::view::chart_series;

const OUTPUT_DIR: &str = "output";
const PREVIEW_ROWS: usize = 10;

// Simple in-memory app state so one analysis can feed several export runs
// without re-reading the workbook.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { analysis: None }));

struct AppState {
    analysis: Option<Analysis>,
}

#[derive(Clone)]
struct Analysis {
    brand: String,
    result: RcaResultSet,
}

/// Read a single line of input after printing the given prompt.
fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Ask the user whether to go back to the menu after a workflow finishes.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Run the full single-sheet pipeline: load, split, aggregate, label.
///
/// An empty result set is reported as [`RcaError::EmptyResult`] so callers
/// can print the "no data" message instead of storing a useless analysis.
fn analyze(path: &str, selector: &SheetSelector) -> Result<RcaResultSet, RcaError> {
    let grid = load_grid(path, selector)?;
    let tables = split_tables(&grid);
    let result = aggregate(tables);
    if result.is_empty() {
        return Err(RcaError::EmptyResult);
    }
    Ok(label(result))
}

/// Handle option [1]: analyze one workbook sheet and keep the result.
fn handle_analyze() {
    let path = prompt("Workbook path (.xlsx or .csv): ");
    let selector = SheetSelector::parse(&prompt("Sheet name or index (e.g. 0 or 'Robi'): "));
    let brand = {
        let b = prompt("Brand name for narrative: ");
        if b.is_empty() {
            "Brand".to_string()
        } else {
            b
        }
    };

    match analyze(&path, &selector) {
        Ok(result) => {
            println!(
                "\nProcessed {} tables ({} qualified, {} skipped), {} segment rows.",
                format_int(result.report.tables_seen as i64),
                format_int(result.report.tables_used as i64),
                format_int(
                    (result.report.skipped_missing_columns + result.report.skipped_no_header)
                        as i64
                ),
                format_int(result.len() as i64)
            );
            println!("\nTop segments by combined impact:\n");
            output::preview_table_rows(&output::result_rows(&result), PREVIEW_ROWS);
            let mut state = APP_STATE.lock().unwrap();
            state.analysis = Some(Analysis { brand, result });
            println!("Analysis stored. Use option [2] to export artifacts.\n");
        }
        Err(RcaError::EmptyResult) => {
            println!("No valid RCA analysis found in this sheet.\n");
        }
        Err(e) => {
            eprintln!("Analysis failed: {}\n", e);
        }
    }
}

/// Handle option [2]: write every artifact for the stored analysis.
fn handle_export(cfg: &RunConfig) {
    let analysis = {
        let state = APP_STATE.lock().unwrap();
        state.analysis.clone()
    };
    let Some(analysis) = analysis else {
        println!("Error: No analysis in memory. Run option [1] first.\n");
        return;
    };

    if let Err(e) = export_artifacts(cfg, &analysis) {
        eprintln!("Export failed: {}\n", e);
    }
}

fn export_artifacts(cfg: &RunConfig, analysis: &Analysis) -> Result<(), RcaError> {
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let view = cfg.business_view()?;

    let results_path = format!("{}/rca_results.csv", OUTPUT_DIR);
    output::write_csv(&results_path, &output::result_rows(&analysis.result))?;
    println!("RCA results written to {}", results_path);

    let projected = view.apply_all(&analysis.result);
    let (pos, neg) = chart_series(&projected, cfg.top_n);
    let charts_path = format!("{}/rca_chart_series.json", OUTPUT_DIR);
    output::write_chart_series(&charts_path, &[&pos, &neg])?;
    println!("Chart series written to {}", charts_path);

    let text = narrative(&analysis.result, &view, &cfg.sections, &analysis.brand);
    println!("\n===== RCA NARRATIVE (KEY FACTORS) =====\n");
    println!("{}\n", text);
    let narrative_path = format!("{}/rca_insights.txt", OUTPUT_DIR);
    output::write_text(&narrative_path, &text)?;
    println!("Narrative saved to {}", narrative_path);

    let summary_path = format!("{}/rca_summary.json", OUTPUT_DIR);
    output::write_json(
        &summary_path,
        &output::run_summary(&analysis.brand, &analysis.result),
    )?;
    println!("Run summary written to {}\n", summary_path);
    Ok(())
}

/// Handle option [3]: analyze two workbooks and compare their profiles.
fn handle_compare(cfg: &RunConfig) {
    let path_a = prompt("Workbook A path: ");
    let sheet_a = SheetSelector::parse(&prompt("Sheet for A (index or name): "));
    let brand_a = prompt("Brand name for A: ");
    let path_b = prompt("Workbook B path: ");
    let sheet_b = SheetSelector::parse(&prompt("Sheet for B (index or name): "));
    let brand_b = prompt("Brand name for B: ");

    let result_a = match analyze(&path_a, &sheet_a) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Workbook A: {}\n", e);
            return;
        }
    };
    let result_b = match analyze(&path_b, &sheet_b) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Workbook B: {}\n", e);
            return;
        }
    };

    let rows = match compare(&result_a, &result_b) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Comparison failed: {}\n", e);
            return;
        }
    };

    println!("\nTop segments where contribution changed most:\n");
    output::preview_table_rows(&output::comparison_rows(&rows), cfg.top_n);
    println!("Key comparison insights (top segments):\n");
    println!("{}\n", insights(&rows, &brand_a, &brand_b, cfg.top_n));

    if let Err(e) = std::fs::create_dir_all(OUTPUT_DIR)
        .map_err(RcaError::from)
        .and_then(|_| {
            let path = format!("{}/rca_comparison.csv", OUTPUT_DIR);
            output::write_csv(&path, &output::comparison_rows(&rows))?;
            println!("Full comparison written to {}\n", path);
            Ok(())
        })
    {
        eprintln!("Write error: {}\n", e);
    }
}

fn main() {
    env_logger::init();
    let cfg = match RunConfig::load(DEFAULT_CONFIG_FILE) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return;
        }
    };

    loop {
        println!("KPI Root-Cause Analysis");
        println!("[1] Analyze a workbook sheet");
        println!("[2] Export artifacts for the stored analysis");
        println!("[3] Compare two workbooks\n");
        match read_choice().as_str() {
            "1" => {
                println!();
                handle_analyze();
            }
            "2" => {
                println!();
                handle_export(&cfg);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!();
                handle_compare(&cfg);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}
