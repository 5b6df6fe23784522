use std::sync::Arc;
use stock_price_agent::{
    agent::StockPriceAgent,
    graph::{GraphStore, InMemoryGraphStore},
    keynodes::{Keynodes, REQUIRED_SYMBOLS},
    market::YahooFinanceClient,
    models::{EdgeKind, ElementId},
};
use tracing::info;

/// Seed a small demo knowledge base: the symbol registry, one company with
/// a localized name and ticker, and one pending question about it.
async fn seed_demo_graph(store: &InMemoryGraphStore) -> stock_price_agent::Result<ElementId> {
    for name in REQUIRED_SYMBOLS {
        if *name == "unknown_company_for_stock_price_agent_message_text" {
            store.register_literal_symbol(name, "Unknown company").await;
        } else {
            store.register_symbol(name).await;
        }
    }
    let keynodes = Keynodes::resolve(store).await?;

    let company = store.create_node().await;
    let name_link = store.create_literal("Apple").await?;
    let name_edge = store
        .create_edge(EdgeKind::Common, company, name_link)
        .await?;
    store
        .create_edge(EdgeKind::Membership, keynodes.nrel_main_idtf, name_edge)
        .await?;
    store
        .create_edge(EdgeKind::Membership, keynodes.lang, name_link)
        .await?;

    let ticker_link = store.create_literal("AAPL").await?;
    let ticker_edge = store
        .create_edge(EdgeKind::Common, company, ticker_link)
        .await?;
    store
        .create_edge(EdgeKind::Membership, keynodes.nrel_company_cipher, ticker_edge)
        .await?;
    store
        .create_edge(EdgeKind::Membership, keynodes.lang, ticker_link)
        .await?;

    let message = store.create_node().await;
    store
        .create_edge(EdgeKind::Membership, keynodes.message_type, message)
        .await?;
    let entity_edge = store
        .create_edge(EdgeKind::Membership, message, company)
        .await?;
    store
        .create_edge(EdgeKind::Membership, keynodes.rrel_entity, entity_edge)
        .await?;

    let action = store.create_node().await;
    let argument = store
        .create_edge(EdgeKind::Membership, action, message)
        .await?;
    store
        .create_edge(EdgeKind::Membership, keynodes.rrel_first_argument, argument)
        .await?;

    Ok(action)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Stock Price Agent starting");

    let store = Arc::new(InMemoryGraphStore::new());
    let action = seed_demo_graph(&store).await?;

    let market = Arc::new(YahooFinanceClient::from_env()?);
    let agent = StockPriceAgent::new(store.clone(), market).await?;

    match agent.on_event(action).await {
        Ok(report) => {
            println!("\n=== INVOCATION REPORT ===");
            println!("Action:   {}", report.action);
            println!("Status:   {}", report.status);
            println!("Duration: {} ms", report.execution_time_ms);
            Ok(())
        }
        Err(e) => {
            eprintln!("Invocation failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
