use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use printdesk::config::ShopConfig;
use printdesk::domain::options::OrderOptions;
use printdesk::domain::order::OrderId;
use printdesk::domain::payment::{PaymentConfirmation, PaymentMode};
use printdesk::domain::rate_card::RateCard;
use printdesk::infrastructure::broadcast::Broadcaster;
use printdesk::infrastructure::uploads::LocalUploads;
use printdesk::interfaces::csv::order_writer::OrderWriter;
use printdesk::telemetry;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ShopConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price print options (JSON) against the current rate card
    Quote { options: String },
    /// Check out an upload and confirm its payment, creating an order
    Place {
        /// Print options as JSON
        #[arg(long)]
        options: String,
        /// File to print
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        phone: String,
        /// Gateway order id. Defaults to the dummy id issued at checkout.
        #[arg(long)]
        gateway_order_id: Option<String>,
        #[arg(long, default_value = "")]
        payment_id: String,
        #[arg(long, default_value = "")]
        signature: String,
    },
    /// Set the status of an order (new, processing, ready)
    Advance { id: String, status: String },
    /// List all orders as CSV, newest first
    Orders,
    /// Today's revenue and order counts
    Stats,
    /// Revenue chart data
    Revenue {
        /// month-by-week, year-by-month or all-years
        #[arg(long, default_value = "month-by-week")]
        range: String,
    },
    /// Show the current rate card
    Prices,
    /// Replace the rate card (JSON); omitted keys take their default
    SetPrices { rates: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{text}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();
    let cli = Cli::parse();

    let events = Arc::new(Broadcaster::default());
    let shop = cli.config.open_shop(events).await.into_diagnostic()?;

    match cli.command {
        Command::Quote { options } => {
            let options: OrderOptions = serde_json::from_str(&options).into_diagnostic()?;
            let price = shop.quote(&options).await.into_diagnostic()?;
            print_json(&serde_json::json!({
                "price": price,
                "details": options.to_string(),
            }))?;
        }
        Command::Place {
            options,
            file,
            phone,
            gateway_order_id,
            payment_id,
            signature,
        } => {
            let options: OrderOptions = serde_json::from_str(&options).into_diagnostic()?;
            if shop.payment_mode() == PaymentMode::Live && gateway_order_id.is_none() {
                return Err(miette!(
                    "--gateway-order-id is required when a payment secret is set"
                ));
            }
            let upload = LocalUploads
                .import(&cli.config.uploads, &file)
                .await
                .into_diagnostic()?;
            let checkout = shop
                .checkout(options, upload, phone)
                .await
                .into_diagnostic()?;

            let gateway_order_id = gateway_order_id
                .or(checkout.request.order_id.clone())
                .ok_or_else(|| miette!("--gateway-order-id is required when a payment secret is set"))?;
            let confirmation = PaymentConfirmation {
                gateway_order_id,
                payment_id,
                signature,
            };
            let order = shop
                .confirm_payment(&confirmation, Some(checkout.context))
                .await
                .into_diagnostic()?;
            print_json(&order)?;
        }
        Command::Advance { id, status } => {
            let order = shop
                .advance(&OrderId::from(id), &status)
                .await
                .into_diagnostic()?;
            print_json(&order)?;
        }
        Command::Orders => {
            let orders = shop.orders().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = OrderWriter::new(stdout.lock());
            writer.write_orders(&orders).into_diagnostic()?;
        }
        Command::Stats => print_json(&shop.stats().await.into_diagnostic()?)?,
        Command::Revenue { range } => {
            let series = shop
                .revenue_series_for_key(&range)
                .await
                .into_diagnostic()?;
            print_json(&series)?;
        }
        Command::Prices => print_json(&shop.rate_card().await.into_diagnostic()?)?,
        Command::SetPrices { rates } => {
            let card: RateCard = serde_json::from_str(&rates).into_diagnostic()?;
            let card = shop.replace_rate_card(card).await.into_diagnostic()?;
            print_json(&card)?;
        }
    }

    Ok(())
}
