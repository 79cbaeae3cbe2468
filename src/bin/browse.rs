//! Line-oriented catalog browser driving the list-synchronization core
//! against a running books service.

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use pushkind_library::client::{BrowseSession, Command, HttpBooksApi};
use pushkind_library::models::config::{self, ClientConfig};
use pushkind_library::sync::{ListView, QueryCoordinator};

const HELP: &str = "\
/text                 search title or author
sort title|author|year
order asc|desc
page N | next | prev | reload
add title; author; year
toggle ID | delete ID
quit";

fn render(view: &ListView) {
    println!();
    if view.is_loading() {
        println!("Loading...");
    }
    if let Some(error) = &view.error {
        println!("Error: {error}");
    }
    if view.books.items.is_empty() && !view.is_loading() {
        println!("No books found.");
    }
    for book in &view.books.items {
        let mark = if book.read { "x" } else { " " };
        println!(
            "[{mark}] {:>4}  {} by {} ({})",
            book.id, book.title, book.author, book.year
        );
    }
    println!(
        "sort: {} {} | search: {:?}",
        view.sort_key, view.sort_order, view.query_text
    );
    let mut nav = Vec::new();
    if view.books.has_previous() {
        nav.push("prev");
    }
    if view.books.has_next() {
        nav.push("next");
    }
    if nav.is_empty() {
        println!("{}", view.summary());
    } else {
        println!("{} ({})", view.summary(), nav.join(" | "));
    }
}

async fn render_changes(mut views: watch::Receiver<ListView>) {
    while views.changed().await.is_ok() {
        let view = views.borrow_and_update().clone();
        render(&view);
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));

    let client_config = match config::load::<ClientConfig>() {
        Ok(client_config) => client_config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    let api = match HttpBooksApi::new(&client_config.api_url, client_config.request_timeout()) {
        Ok(api) => api,
        Err(err) => {
            log::error!("Failed to build HTTP client: {err}");
            std::process::exit(1);
        }
    };

    let coordinator =
        QueryCoordinator::new(client_config.page_size, client_config.debounce_window());
    let session = BrowseSession::spawn(Arc::new(api), coordinator);
    let renderer = tokio::spawn(render_changes(session.views()));

    println!("Browsing {}\n{HELP}", client_config.api_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                log::error!("Failed to read input: {err}");
                break;
            }
        };

        match line.trim() {
            "quit" | "exit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if session.send(command).await.is_err() {
                    log::error!("Browse session is gone");
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    session.shutdown().await;
    renderer.abort();
}
