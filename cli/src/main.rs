mod view;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use view::{Board, BoardsView, Change, Notification};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for the server")]
    Timeout,
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("board not found: {0}")]
    UnknownBoard(i64),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    View(#[from] view::ViewError),
}

#[derive(Parser, Debug)]
#[command(name = "kanboard-cli", about = "Kanboard API and notification CLI")]
struct Cli {
    #[arg(long, env = "KANBOARD_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Boards(BoardsCommand),
    /// Load boards, append one card locally, and push the dirty boards.
    PushCard {
        board_id: i64,
        #[arg(long)]
        card: String,
    },
    /// Follow the `boards` channel and print each change.
    Watch {
        #[arg(long, help = "Exit after this many notifications")]
        max_events: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct BoardsCommand {
    #[command(subcommand)]
    command: BoardsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BoardsSubcommand {
    List,
    Create {
        #[arg(long)]
        name: String,
    },
    /// Replace a board's full card list.
    AddCard {
        board_id: i64,
        #[arg(long, help = "JSON array of cards")]
        cards: String,
    },
    /// Send a raw bulk update, e.g. `[{"id":1,"name":"Doing"}]`.
    Update {
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext {
        base_url: cli.base_url,
    };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Boards(boards) => run_boards(&ctx, boards).await,
        Command::PushCard { board_id, card } => push_card(&ctx, board_id, &card).await,
        Command::Watch { max_events } => watch(&ctx, max_events).await,
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let url = format!("{}/healthz", cli.base_url.trim_end_matches('/'));
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError {
            status: status.as_u16(),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

async fn run_boards(cli: &CliContext, boards: BoardsCommand) -> Result<(), CliError> {
    let json = match boards.command {
        BoardsSubcommand::List => api_request(cli, reqwest::Method::GET, "/api/boards", None).await?,
        BoardsSubcommand::Create { name } => {
            let body = serde_json::json!({ "name": name });
            api_request(cli, reqwest::Method::POST, "/api/boards", Some(body)).await?
        }
        BoardsSubcommand::AddCard { board_id, cards } => {
            let cards = serde_json::from_str::<Value>(&cards)?;
            let path = format!("/api/boards/{board_id}/cards");
            let body = serde_json::json!({ "cards": cards });
            api_request(cli, reqwest::Method::POST, &path, Some(body)).await?
        }
        BoardsSubcommand::Update { data } => {
            let boards = serde_json::from_str::<Value>(&data)?;
            let body = serde_json::json!({ "boards": boards });
            api_request(cli, reqwest::Method::PUT, "/api/boards", Some(body)).await?
        }
    };
    print_json(&json)
}

async fn push_card(cli: &CliContext, board_id: i64, card: &str) -> Result<(), CliError> {
    let card = serde_json::from_str::<Value>(card)?;
    let listed = api_request(cli, reqwest::Method::GET, "/api/boards", None).await?;
    let mut view = BoardsView::new();
    view.load(serde_json::from_value::<Vec<Board>>(listed)?);

    if !view.push_card(board_id, card) {
        return Err(CliError::UnknownBoard(board_id));
    }

    let dirty = view.dirty();
    if dirty.is_empty() {
        eprintln!("nothing to push");
        return Ok(());
    }

    let body = serde_json::json!({ "boards": dirty });
    let json = api_request(cli, reqwest::Method::PUT, "/api/boards", Some(body)).await?;
    view.mark_synced();
    eprintln!("pushed {} board(s)", dirty.len());
    print_json(&json)
}

async fn watch(cli: &CliContext, max_events: Option<usize>) -> Result<(), CliError> {
    let listed = api_request(cli, reqwest::Method::GET, "/api/boards", None).await?;
    let mut view = BoardsView::new();
    view.load(serde_json::from_value::<Vec<Board>>(listed)?);
    eprintln!("watching {} board(s)", view.boards().len());

    let (mut stream, _) = connect_async(ws_url(&cli.base_url, view::BOARDS_CHANNEL)?)
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;

    let mut seen = 0_usize;
    loop {
        let Some(message) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        let text = match message.map_err(|error| CliError::WsConnect(Box::new(error)))? {
            Message::Text(text) => text,
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => continue,
        };

        let notification = serde_json::from_str::<Notification>(text.as_str())?;
        match view.apply(&notification)? {
            Change::Ignored => continue,
            change => {
                println!("{} {change:?}", notification.event);
                print_json(&serde_json::to_value(view.boards())?)?;
            }
        }

        seen = seen.saturating_add(1);
        if max_events.is_some_and(|limit| seen >= limit) {
            return Ok(());
        }
    }
}

async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;
    let url = format!("{}{}", cli.base_url.trim_end_matches('/'), path);

    let request = client.request(method, &url);
    let request = if let Some(json) = body {
        request.json(&json)
    } else {
        request
    };

    let response = request.send().await.map_err(|error| {
        if error.is_timeout() {
            CliError::Timeout
        } else {
            CliError::Http(error)
        }
    })?;
    let status = response.status();
    let value = response
        .json::<Value>()
        .await
        .unwrap_or_else(|_| Value::Null);

    if !status.is_success() {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), ToOwned::to_owned);
        return Err(CliError::ServerError {
            status: status.as_u16(),
            message,
        });
    }

    Ok(value)
}

fn ws_url(base_url: &str, channel: &str) -> Result<String, CliError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws?channel={channel}"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws?channel={channel}"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
