use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use family_budget::api::{BudgetApi, HttpApi};
use family_budget::ui::{app::App, render};

// Logging goes to a file so the alternate screen stays clean.
fn init_logging() -> Result<()> {
    let file = std::fs::File::create("family-budget.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FAMILY_BUDGET_API").ok())
        .unwrap_or_else(|| "http://localhost:7016".to_string());

    let api: Arc<dyn BudgetApi> = Arc::new(HttpApi::new(base_url));
    let mut app = App::new(api);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);

    // initial load for the starting tab
    app.sync().await;

    loop {
        terminal.draw(|f| render::draw(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await;
            }
        }

        // one fetch per pass; rapid filter edits coalesce here and requests
        // stay strictly sequential
        app.sync().await;

        if app.quit {
            return Ok(());
        }
    }
}
