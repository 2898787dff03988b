//! `ubgrab` command-line client.

mod cli;
mod logging;

use anyhow::Context;
use clap::Parser;
use ubgrab::prelude::*;

use crate::cli::{Cli, Commands, SeedAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut builder = App::builder().base_url(&cli.api_base);
    if let Some(dir) = &cli.data_dir {
        builder = builder.data_dir(dir);
    }
    let app = builder.build().context("failed to start")?;
    let session = app.ready().await;
    tracing::debug!(
        api_base = %cli.api_base,
        authenticated = session.is_authenticated(),
        "session loaded"
    );

    run(&app, cli.command).await.map_err(|err| match err {
        UbgrabError::NotAuthenticated => {
            anyhow::anyhow!("not logged in; run `ubgrab login` first")
        }
        other => anyhow::Error::new(other),
    })
}

async fn run(
    app: &App<FileStore, HttpBackend>,
    command: Commands,
) -> Result<(), UbgrabError> {
    match command {
        Commands::Login { phone, password } => {
            app.login(&phone, &password).await?;
            println!("logged in");
        }
        Commands::Logout => {
            app.logout().await?;
            println!("logged out");
        }
        Commands::Status => {
            if app.is_authenticated() {
                println!("logged in");
            } else {
                println!("logged out");
            }
        }
        Commands::Profile => {
            let me = app.profile().await?;
            println!("id:      {}", me.id);
            println!("name:    {}", me.name);
            println!("phone:   {}", me.phone);
            println!("created: {}", me.created_at);
        }
        Commands::Couriers => {
            let couriers = app.couriers().await?;
            if couriers.is_empty() {
                println!("no couriers");
            }
            for courier in couriers {
                println!(
                    "#{:<4} {:<16} {}",
                    courier.id,
                    courier.phone,
                    courier.description.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Orders => {
            let orders = app.orders().await?;
            if orders.is_empty() {
                println!("no orders");
            }
            for order in orders {
                println!(
                    "#{:<4} {} {} -> {} {:.2} [{}]",
                    order.id,
                    order.date_when,
                    order.where_from,
                    order.where_to,
                    order.price,
                    order.status
                );
            }
        }
        Commands::CreateOrder {
            from,
            to,
            price,
            date,
            courier,
        } => {
            let mut order = NewOrder::new(from, to, price, date);
            if let Some(id) = courier {
                order = order.with_courier(id);
            }
            let created = app.create_order(&order).await?;
            println!("created order #{}", created.id);
        }
        Commands::Seed { action: SeedAction::Fill } => {
            let report = app.seed_fill().await?;
            println!(
                "{} ({} customers, {} couriers)",
                report.message, report.customers, report.couriers
            );
        }
        Commands::Seed { action: SeedAction::Clear } => {
            let report = app.seed_clear().await?;
            println!(
                "{} ({} orders, {} reviews, {} customers, {} couriers)",
                report.message,
                report.orders,
                report.reviews,
                report.customers,
                report.couriers
            );
        }
    }
    Ok(())
}
