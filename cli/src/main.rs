mod page;
mod view;
mod widget;

use std::env;
use std::fs::File;
use std::io;

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind};
use log::LevelFilter;
use ratatui::{DefaultTerminal, Frame};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

use fabric::{Credentials, Sweep, SweepConfigBuilder, SweepOutcome};

use page::Page;
use view::FabricView;

const USAGE: &str = "usage: cli [--plain] [--log FILE] [KIND=]URL...

  KIND is switch, host or auto (default)

environment:
  FABRIC_LOG        log level (default info)
  FABRIC_COMMUNITY  community string sent to every agent
  FABRIC_TOKEN      bearer token sent to every agent";

#[derive(Debug, Default)]
struct Args {
    plain: bool,
    log_file: Option<String>,
    targets: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--plain" => parsed.plain = true,
            "--log" => {
                parsed.log_file = Some(args.next().ok_or("--log needs a file name")?);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => {
                return Err(format!("unknown option {}\n\n{}", other, USAGE))
            }
            _ => parsed.targets.push(arg),
        }
    }
    if parsed.targets.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(parsed)
}

fn log_level() -> LevelFilter {
    env::var("FABRIC_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Terminal logging in plain mode, file logging (if asked for) under the TUI
fn init_logging(args: &Args) -> io::Result<()> {
    let level = log_level();
    let result = match (&args.log_file, args.plain) {
        (Some(path), _) => WriteLogger::init(level, Config::default(), File::create(path)?),
        (None, true) => TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        (None, false) => return Ok(()),
    };
    result.map_err(io::Error::other)
}

fn credentials() -> Option<Credentials> {
    let community = env::var("FABRIC_COMMUNITY").ok();
    let token = env::var("FABRIC_TOKEN").ok();
    if community.is_none() && token.is_none() {
        return None;
    }
    Some(Credentials { community, token })
}

async fn sweep(args: &Args) -> fabric::Result<SweepOutcome> {
    let mut builder = SweepConfigBuilder::new();
    for target in &args.targets {
        builder = builder.target_arg(target)?;
    }
    let mut config = builder.build()?;
    if let Some(credentials) = credentials() {
        for target in &mut config.targets {
            target.credentials = credentials.clone();
        }
    }
    Sweep::new(config)?.run().await
}

fn print_plain(outcome: &SweepOutcome) {
    println!("{}", outcome.report);
    println!();
    for line in view::host_lines(&outcome.report.hosts) {
        println!("{}", line);
    }
    println!();
    for line in view::node_lines(&outcome.store) {
        println!("{}", line);
    }
    println!();
    for line in view::link_lines(&outcome.store) {
        println!("{}", line);
    }
}

fn main() -> io::Result<()> {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };
    init_logging(&args)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(sweep(&args)).map_err(io::Error::other)?;

    if args.plain {
        print_plain(&outcome);
        return Ok(());
    }

    let mut terminal = ratatui::init();
    let app_result = App::new(&outcome).run(&mut terminal);
    ratatui::restore();
    app_result
}

pub struct App {
    exit: bool,
    page: Page,
    view: FabricView,
}

impl App {
    fn new(outcome: &SweepOutcome) -> Self {
        Self {
            exit: false,
            page: Page::default(),
            view: FabricView::new(outcome),
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.view.draw(frame, self.page);
    }

    fn handle_events(&mut self) -> io::Result<()> {
        if let event::Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                self.handle_key_event(key_event);
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.exit = true,
            KeyCode::Tab => self.page = self.page.next(),
            KeyCode::Down | KeyCode::Char('j') => self.view.list_mut(self.page).next(),
            KeyCode::Up | KeyCode::Char('k') => self.view.list_mut(self.page).previous(),
            _ => {}
        }
    }
}
