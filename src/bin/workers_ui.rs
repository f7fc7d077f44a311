use std::io::{self, BufRead};

use dotenv::dotenv;
use log::error;

use workers_manager::api::HttpWorkersApi;
use workers_manager::config::Settings;
use workers_manager::shell::commands::{Command, HELP};
use workers_manager::shell::terminal::TerminalPrompter;
use workers_manager::shell::Shell;
use workers_manager::view::WorkersView;

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    dotenv().ok();
    // Quiet by default so logs do not interleave with the page
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::other(e)
    })?;

    let api = HttpWorkersApi::new(Some(settings.api_base));
    println!("Using API at {}", api.base_url());

    let mut shell = Shell::new(WorkersView::new(api, TerminalPrompter));
    shell.navigate("/").await;
    println!("{}", shell.render());

    loop {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(command) => {
                if let Err(e) = shell.apply(command).await {
                    println!("{}", e);
                }
                println!("{}", shell.render());
            }
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}
