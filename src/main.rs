// Interactive tracker for a company's departments, roles and employees. Pick an action from
// the menu, answer the prompts, and the result is read from or written to the database.
use std::io::{self, Write};

use company_tracker::prompt::TerminalPrompter;
use company_tracker::{Config, Session, SqliteGateway, TextInterface};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> company_tracker::Result<()> {
    let config = Config::from_env()?;
    let gateway = SqliteGateway::connect(&config)?;

    let session = Session::new(gateway, TerminalPrompter::new(), io::stdout());
    TextInterface::init(session)?.run()
}
