//! # Tableside Kiosk
//!
//! Entry point for the terminal ordering front end.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Kiosk Startup                                   │
//! │                                                                         │
//! │  1. init_tracing()            RUST_LOG or "info,tableside=debug"       │
//! │  2. ClientConfig::load        argv[1] path, else the default location  │
//! │  3. HttpBackend::new          reqwest client with request timeout      │
//! │  4. OrderingSession::new      catalog, cart, table, submission, codes  │
//! │  5. session.initialize()      first menu load, exactly once            │
//! │  6. command loop              one command per stdin line               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tableside_client::{
    ClientConfig, ClientError, HttpBackend, OrderingSession, ScanEnd, ScanHandle,
};
use tableside_core::{AsyncOperationState, CartSummary, ScanEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Tableside kiosk");

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ClientConfig::load(Some(path)).context("loading configuration")?,
        None => ClientConfig::load_or_default(None),
    };
    info!(base_url = %config.base_url(), "Configuration loaded");

    let backend = HttpBackend::new(&config).context("building HTTP client")?;
    let session = OrderingSession::new(Arc::new(backend));

    match session.initialize().await {
        AsyncOperationState::Succeeded(count) => println!("menu loaded: {} items", count),
        AsyncOperationState::Failed(message) => println!("menu unavailable: {}", message),
        _ => {}
    }
    println!("{}", HELP);

    let mut kiosk = Kiosk {
        session,
        scan: None,
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match commands::parse(&line) {
            None => continue,
            Some(Err(usage)) => println!("{}", usage),
            Some(Ok(Command::Quit)) => break,
            Some(Ok(command)) => kiosk.run(command).await,
        }
    }

    info!("Kiosk shutting down");
    Ok(())
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tableside=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Command Execution
// =============================================================================

struct Kiosk {
    session: OrderingSession,
    scan: Option<ScanHandle>,
}

impl Kiosk {
    async fn run(&mut self, command: Command) {
        match command {
            Command::Menu => self.print_menu(),
            Command::Add(item_id) => {
                report(self.session.add_item(&item_id));
                self.print_cart();
            }
            Command::Quantity { item_id, text } => {
                report(self.session.set_quantity_text(&item_id, &text));
                self.print_cart();
            }
            Command::Cart => self.print_cart(),
            Command::Table(raw) => {
                let session = self.session.enter_table(&raw);
                println!("table: '{}'", session.table_id);
                self.finish_scan().await;
            }
            Command::Scan => {
                if let Some(previous) = self.scan.take() {
                    previous.task.abort();
                }
                let handle = self.session.start_scan();
                println!("scanning... (decode <payload>, noise <message>, cancel)");
                self.scan = Some(handle);
            }
            Command::Decode(payload) => self.feed(ScanEvent::Decoded(payload)).await,
            Command::Noise(message) => self.feed(ScanEvent::Error(message)).await,
            Command::Cancel => {
                if self.session.cancel_scan() {
                    println!("scan cancelled");
                } else {
                    println!("no scan running");
                }
                self.finish_scan().await;
            }
            Command::Order => match self.session.place_order().await {
                Ok(order) => println!(
                    "order {} placed for table {}",
                    order.order_id, order.table_id
                ),
                Err(err) => print_error(&err),
            },
            Command::Status => match self.session.refresh_last_order().await {
                Ok(order) => println!(
                    "order {} at table {}: {} ({} lines)",
                    order.order_id,
                    order.table_id,
                    order.status,
                    order.items.len()
                ),
                Err(err) => print_error(&err),
            },
            Command::Qr(table_id) => match self.session.provision_code(&table_id).await {
                Ok(image) => println!(
                    "code: {} ({})",
                    image.url,
                    image.content_type.as_deref().unwrap_or("unknown type")
                ),
                Err(err) => print_error(&err),
            },
            Command::Lookup(table_id) => match self.session.lookup_table(&table_id).await {
                Ok(table) => println!(
                    "table {}: number {}, {} seats",
                    table.table_id, table.table_number, table.seats
                ),
                Err(err) => print_error(&err),
            },
            Command::Register {
                table_number,
                seats,
            } => match self.session.register_table(table_number, seats).await {
                Ok(table) => println!("table {} created, code: {}", table.table_id, table.image.url),
                Err(err) => print_error(&err),
            },
            Command::Reload => match self.session.reload_menu().await {
                Ok(items) => println!("menu loaded: {} items", items.len()),
                Err(err) => print_error(&err),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    /// Hands one sensor event to the running scan, then lets the driver
    /// process it before reporting.
    async fn feed(&mut self, event: ScanEvent) {
        let Some(handle) = &self.scan else {
            println!("no scan running (type 'scan' first)");
            return;
        };

        if handle.events.send(event).await.is_err() {
            println!("scan already finished");
        }
        self.finish_scan().await;

        if self.scan.is_some() {
            println!("still scanning...");
        }
    }

    /// Lets the scan driver catch up, then collects its report if it has
    /// finished.
    async fn finish_scan(&mut self) {
        tokio::task::yield_now().await;

        let finished = self.scan.as_ref().is_some_and(|h| h.task.is_finished());
        if !finished {
            return;
        }
        let Some(handle) = self.scan.take() else {
            return;
        };

        match handle.task.await {
            Ok(report) => match report.end {
                ScanEnd::Resolved(session) => println!("table: '{}' (scanned)", session.table_id),
                ScanEnd::Stopped => println!("scan ended"),
                ScanEnd::StreamClosed => println!("scanner disconnected"),
            },
            Err(err) => println!("scan task failed: {}", err),
        }
    }

    fn print_menu(&self) {
        let catalog = self.session.catalog();
        if let Some(message) = catalog.status().error() {
            println!("(last load failed: {})", message);
        }

        let groups = catalog.items_by_category();
        if groups.is_empty() {
            println!("menu is empty");
            return;
        }
        for (category, items) in groups {
            println!("{}", category.as_deref().unwrap_or("Menu"));
            for item in items {
                println!("  {:<8} {:<24} {:>8}", item.id, item.name, item.price.to_string());
                if !item.description.is_empty() {
                    println!("           {}", item.description);
                }
            }
        }
    }

    fn print_cart(&self) {
        let summary = self.session.cart().with_cart(|cart| CartSummary::from(cart));
        if summary.lines.is_empty() {
            println!("cart is empty");
            return;
        }
        for line in &summary.lines {
            println!(
                "  {:<8} {:<24} x{:<4} {:>8}",
                line.item.id,
                line.item.name,
                line.quantity,
                line.line_total().to_string()
            );
        }
        println!("  total {:>41}", summary.total.to_string());

        match self.session.table().table_id() {
            Some(table_id) => println!("  table '{}'", table_id),
            None => println!("  no table yet (table <id> or scan)"),
        }
    }
}

fn report(result: Result<(), ClientError>) {
    if let Err(err) = result {
        print_error(&err);
    }
}

fn print_error(err: &ClientError) {
    let hint = if err.is_retryable() { " (try again)" } else { "" };
    println!("error [{}]: {}{}", err.kind(), err, hint);
}
