//! Coupons Administration CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use coupons_app::{
    database::{self, Db, PoolSettings},
    domain::coupons::{
        CouponsService, PgCouponsService,
        data::{CouponFilter, Pagination},
        records::{CouponRecord, CouponUuid},
    },
};

#[derive(Debug, Parser)]
#[command(name = "coupons-app", about = "Coupons CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Coupon(CouponCommand),
}

#[derive(Debug, Args)]
struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// List coupons, newest first
    List(ListCouponsArgs),

    /// Switch a coupon on or off
    Toggle(ToggleCouponArgs),

    /// Record one redemption of a coupon
    Redeem(RedeemCouponArgs),
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[derive(Debug, Args)]
struct ListCouponsArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Only list active (`true`) or inactive (`false`) coupons
    #[arg(long)]
    active: Option<bool>,

    /// Case-insensitive code substring
    #[arg(long)]
    search: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: i64,

    #[arg(long, default_value_t = 50)]
    limit: i64,
}

#[derive(Debug, Args)]
struct ToggleCouponArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Coupon UUID
    #[arg(long)]
    uuid: CouponUuid,

    /// New status
    #[arg(long, action = clap::ArgAction::Set)]
    active: bool,
}

#[derive(Debug, Args)]
struct RedeemCouponArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Coupon code, matched exactly
    #[arg(long)]
    code: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let Commands::Coupon(CouponCommand { command }) = cli.command;

    match command {
        CouponSubcommand::List(args) => list_coupons(args).await,
        CouponSubcommand::Toggle(args) => toggle_coupon(args).await,
        CouponSubcommand::Redeem(args) => redeem_coupon(args).await,
    }
}

async fn coupons_service(args: &DatabaseArgs) -> Result<PgCouponsService, String> {
    let pool = database::connect(&args.database_url, PoolSettings::default())
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(PgCouponsService::new(Db::new(pool)))
}

async fn list_coupons(args: ListCouponsArgs) -> Result<(), String> {
    let service = coupons_service(&args.database).await?;

    let page = service
        .list_coupons(
            CouponFilter {
                is_active: args.active,
                kind: None,
                search: args.search,
            },
            Pagination::new(Some(args.page), Some(args.limit)),
        )
        .await
        .map_err(|error| format!("failed to list coupons: {error}"))?;

    for coupon in &page.coupons {
        println!("{}", summary(coupon));
    }

    println!(
        "page {} of {} ({} coupons)",
        page.page, page.pages, page.total
    );

    Ok(())
}

async fn toggle_coupon(args: ToggleCouponArgs) -> Result<(), String> {
    let service = coupons_service(&args.database).await?;

    let coupon = service
        .set_coupon_active(args.uuid, args.active)
        .await
        .map_err(|error| format!("failed to update coupon status: {error}"))?;

    println!("{}", summary(&coupon));

    Ok(())
}

async fn redeem_coupon(args: RedeemCouponArgs) -> Result<(), String> {
    let service = coupons_service(&args.database).await?;

    let coupon = service
        .redeem_coupon(&args.code)
        .await
        .map_err(|error| format!("failed to redeem coupon: {error}"))?;

    println!("{}", summary(&coupon));

    Ok(())
}

fn summary(coupon: &CouponRecord) -> String {
    let usage = coupon.usage_limit.map_or_else(
        || coupon.usage_count.to_string(),
        |limit| format!("{}/{limit}", coupon.usage_count),
    );

    format!(
        "{}\t{}\t{}\t{}\t{}\tused {usage}\t{}",
        coupon.uuid,
        coupon.code,
        coupon.kind,
        coupon.value,
        if coupon.is_active { "active" } else { "inactive" },
        coupon.valid_until,
    )
}
