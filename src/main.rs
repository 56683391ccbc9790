use std::io::stdout;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::{error, info};

use airscope::AirscopeError;
use airscope::cli::{Args, Command, expand_path, explorer_config, page_layout};
use airscope::controller::Controller;
use airscope::dataset::{Dataset, load_data_file};
use airscope::deriver::derive_regions;
use airscope::domain::ExplorerConfig;
use airscope::logging::{init_file_logging, init_stderr_logging};
use airscope::model::{Model, Status};
use airscope::report::write_report;
use airscope::ui::DashboardUI;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), AirscopeError> {
    match args.command {
        Command::Explore {
            path,
            top_n,
            bins,
            poll_ms,
            log_file,
        } => {
            let cfg = explorer_config(top_n, bins, poll_ms, &log_file)?;
            if let Some(log_path) = &cfg.log_file {
                init_file_logging(log_path, &args.log_level)?;
            }
            explore(&path, &cfg)
        }
        Command::Report {
            path,
            output,
            width,
            lines_per_page,
        } => {
            init_stderr_logging(&args.log_level)?;
            let layout = page_layout(width, lines_per_page)?;
            let dataset = load_dataset(&path)?;
            let output = expand_path(&output)?;
            let pages = write_report(&dataset, &layout, &output)?;
            println!("Wrote {pages} pages to {}", output.display());
            Ok(())
        }
    }
}

fn load_dataset(path: &str) -> Result<Dataset, AirscopeError> {
    let start_time = Instant::now();
    let path = expand_path(path)?;
    let airports = load_data_file(path)?;
    let dataset = derive_regions(airports);
    info!(
        "Derived states for {} airports in {}ms",
        dataset.len(),
        start_time.elapsed().as_millis()
    );
    Ok(dataset)
}

fn explore(path: &str, cfg: &ExplorerConfig) -> Result<(), AirscopeError> {
    let dataset = Arc::new(load_dataset(path)?);
    let name = expand_path(path)?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let mut model = Model::init(name, dataset, cfg)?;
    let mut ui = DashboardUI::new();
    let controller = Controller::new(cfg);

    let mut terminal = ratatui::init();
    let result = execute!(stdout(), EnableMouseCapture)
        .map_err(AirscopeError::from)
        .and_then(|_| event_loop(&mut terminal, &mut model, &mut ui, &controller));

    // Restore the terminal even when the loop failed.
    let _ = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &mut DashboardUI,
    controller: &Controller,
) -> Result<(), AirscopeError> {
    info!("Starting airscope dashboard");
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(ui.map_geometry())?;
        model.update(message)?;
    }
    info!("Leaving airscope dashboard");
    Ok(())
}
