use std::sync::Arc;

use course_admin::client::{ClientConfig, HttpResourceClient};
use course_admin::form::FormState;
use course_admin::grid::{Grid, RowEvent};
use course_admin::models::CourseField;
use course_admin::panel::{CoursePanel, PanelConfig};
use course_admin::store::ReloadOutcome;
use course_admin::validation::{Schema, ValidationConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  list | refresh        reload courses from the server
  add                   open the Add Course dialog
  edit <row>            edit a row of the current page
  delete <row>          delete a row of the current page
  set <field> <value>   change name or description in the open dialog
  blur <field>          leave a field (shows its error)
  submit | cancel       close the dialog
  next | prev           change page
  page-size <5|10>      rows per page
  select <row>          toggle row selection
  help | quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Refresh,
    Add,
    Edit(usize),
    Delete(usize),
    Set(CourseField, String),
    Blur(CourseField),
    Submit,
    Cancel,
    Next,
    Prev,
    PageSize(usize),
    Select(usize),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let row = |arg: &str| -> Result<usize, String> {
            match arg.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n - 1),
                _ => Err(format!("expected a row number, got {:?}", arg)),
            }
        };
        let field = |arg: &str| -> Result<CourseField, String> {
            CourseField::parse(arg).ok_or_else(|| format!("unknown field {:?}", arg))
        };

        match word {
            "list" | "refresh" => Ok(Command::Refresh),
            "add" => Ok(Command::Add),
            "edit" => row(rest).map(Command::Edit),
            "delete" => row(rest).map(Command::Delete),
            "set" => {
                let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Command::Set(field(name)?, value.trim_start().to_string()))
            }
            "blur" => field(rest).map(Command::Blur),
            "submit" => Ok(Command::Submit),
            "cancel" | "close" => Ok(Command::Cancel),
            "next" => Ok(Command::Next),
            "prev" => Ok(Command::Prev),
            "page-size" => rest
                .parse()
                .map(Command::PageSize)
                .map_err(|_| format!("expected a page size, got {:?}", rest)),
            "select" => row(rest).map(Command::Select),
            "help" | "" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command {:?} (try help)", other)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_admin=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client_config = ClientConfig::new_from_env()?;
    let panel_config = PanelConfig::new_from_env()?;
    let schema = Schema::course(&ValidationConfig::new_from_env()?)?;

    let client = HttpResourceClient::new(client_config)?;
    let panel = CoursePanel::new(Arc::new(client), Arc::new(schema));
    let mut grid = Grid::default();
    grid.set_page_size(panel_config.page_size);

    println!("Course Page  [Add Course]");
    report_reload(&panel, panel.mount().await).await;
    show(&panel, &mut grid).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run(&panel, &mut grid, command).await,
            Err(message) => println!("{}", message),
        }
    }

    panel.unmount();
    Ok(())
}

async fn run(panel: &CoursePanel, grid: &mut Grid, command: Command) {
    let rows = panel.courses().await;

    match command {
        Command::Refresh => report_reload(panel, panel.reload().await).await,
        Command::Add => {
            if let Err(e) = panel.open_create().await {
                println!("{}", e);
            }
        }
        Command::Edit(index) | Command::Delete(index) => {
            let field = if matches!(command, Command::Edit(_)) { "edit" } else { "delete" };
            match grid.action(&rows, index, field) {
                Some(RowEvent::Edit(course)) => {
                    if let Err(e) = panel.open_edit(&course).await {
                        println!("{}", e);
                    }
                }
                Some(RowEvent::Delete(id)) => {
                    if let Err(e) = panel.delete(&id).await {
                        println!("delete failed: {}", e);
                    }
                }
                None => println!("no row {} on this page", index + 1),
            }
        }
        Command::Set(field, value) => {
            if let Err(e) = panel.set_field(field, value).await {
                println!("{}", e);
            }
        }
        Command::Blur(field) => {
            if let Err(e) = panel.blur(field).await {
                println!("{}", e);
            }
        }
        Command::Submit => {
            if let Err(e) = panel.submit().await {
                println!("{}", e);
            }
        }
        Command::Cancel => panel.cancel().await,
        Command::Next => {
            grid.next_page(rows.len());
        }
        Command::Prev => {
            grid.prev_page();
        }
        Command::PageSize(size) => {
            if !grid.set_page_size(size) {
                println!("page size must be 5 or 10");
            }
        }
        Command::Select(index) => match grid.page_rows(&rows).get(index) {
            Some(course) => {
                grid.toggle_selected(&course.id);
            }
            None => println!("no row {} on this page", index + 1),
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }

    show(panel, grid).await;
}

async fn report_reload(panel: &CoursePanel, outcome: ReloadOutcome) {
    if outcome == ReloadOutcome::KeptStale {
        if let Some(error) = panel.last_reload_error().await {
            println!("could not refresh courses, showing last known list: {}", error);
        }
    }
}

async fn show(panel: &CoursePanel, grid: &mut Grid) {
    let rows = panel.courses().await;
    grid.sync_rows(&rows);
    println!("{}", grid.render(&rows));
    let selected = grid.selected().count();
    if selected > 0 {
        println!("{} selected", selected);
    }

    let view = panel.form_view().await;
    let fields = match &view.state {
        FormState::Idle => return,
        FormState::Creating { fields } | FormState::Editing { fields, .. } => fields,
    };

    println!("--- {} ---", view.title);
    for field in CourseField::ALL {
        println!("{:<12} {}", field.label(), fields.get(field));
        if let Some((_, message)) = view.visible_errors.iter().find(|(f, _)| *f == field) {
            println!("{:<12} ! {}", "", message);
        }
    }
    println!("[Cancel] [{}]", view.submit_label.unwrap_or("Add"));
}
