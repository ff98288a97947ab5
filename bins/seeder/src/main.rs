//! Development data seeder for Spendwise.
//!
//! Seeds a demo user with a category, a monthly income, one debit and one
//! credit card, and a handful of expenses posted through the ledger engine,
//! then logs the resulting statistics report. Safe to run repeatedly.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use spendwise_core::budget::Income;
use spendwise_core::expense::{Category, ExpenseDraft};
use spendwise_core::instrument::{
    CREDIT_CARD, DEBIT_CARD, Instrument, InstrumentService, NewFunding, NewInstrument,
};
use spendwise_core::posting::PostingService;
use spendwise_core::statistics::{ReportOptions, StatisticsService};
use spendwise_core::store::LedgerStore;
use spendwise_db::SeaLedgerStore;
use spendwise_db::entities::{categories, incomes, users};
use spendwise_shared::config::AppConfig;
use spendwise_shared::types::{CategoryId, IncomeId, UserId};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Demo user ID (consistent for all seeds)
const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
/// Demo category ID
const DEMO_CATEGORY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);
/// Demo income ID
const DEMO_INCOME_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0003);

const DEBIT_CARD_NUMBER: &str = "4000000000000002";
const CREDIT_CARD_NUMBER: &str = "5100000000000008";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(fmt::layer())
        .init();

    info!("Connecting to database...");
    let db = spendwise_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(SeaLedgerStore::new(db.clone()));

    let owner = UserId::from_uuid(DEMO_USER_ID);
    let today = Utc::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    seed_user(&db, &store, owner).await?;
    let category = seed_category(&db, &store).await?;
    seed_income(&db, &store, owner, month_start).await?;
    let (debit, credit) = seed_instruments(&store, owner, today).await?;
    seed_expenses(&store, owner, category, &debit, &credit, month_start).await?;

    let report = StatisticsService::new(store)
        .report(owner, &ReportOptions::from(&config.statistics))
        .await?;
    info!(
        report = %serde_json::to_string_pretty(&report)?,
        "Statistics for demo user"
    );

    info!("Seeding complete!");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    store: &SeaLedgerStore,
    owner: UserId,
) -> anyhow::Result<()> {
    if users::Entity::find_by_id(owner.into_inner()).one(db).await?.is_some() {
        info!("Demo user already exists, skipping...");
        return Ok(());
    }
    store.insert_user(owner, "Demo User").await?;
    info!(user_id = %owner, "Seeded demo user");
    Ok(())
}

async fn seed_category(
    db: &DatabaseConnection,
    store: &SeaLedgerStore,
) -> anyhow::Result<CategoryId> {
    let id = CategoryId::from_uuid(DEMO_CATEGORY_ID);
    if categories::Entity::find_by_id(id.into_inner()).one(db).await?.is_some() {
        info!("Demo category already exists, skipping...");
        return Ok(id);
    }
    store
        .insert_category(&Category {
            id,
            name: "Groceries".to_string(),
            deleted_at: None,
        })
        .await?;
    info!(category_id = %id, "Seeded category");
    Ok(id)
}

async fn seed_income(
    db: &DatabaseConnection,
    store: &SeaLedgerStore,
    owner: UserId,
    month_start: NaiveDate,
) -> anyhow::Result<()> {
    let id = IncomeId::from_uuid(DEMO_INCOME_ID);
    if incomes::Entity::find_by_id(id.into_inner()).one(db).await?.is_some() {
        info!("Demo income already exists, skipping...");
        return Ok(());
    }
    store
        .insert_income(&Income {
            id,
            owner_id: owner,
            amount: Decimal::new(450_000, 2),
            date: month_start,
            description: "Salary".to_string(),
            deleted_at: None,
        })
        .await?;
    info!(income_id = %id, "Seeded income");
    Ok(())
}

async fn seed_instruments(
    store: &Arc<SeaLedgerStore>,
    owner: UserId,
    today: NaiveDate,
) -> anyhow::Result<(Instrument, Instrument)> {
    let service = InstrumentService::new(store.clone());
    let valid_until = today
        .checked_add_months(Months::new(36))
        .context("Validity date out of range")?;

    let debit = match store.find_instrument_by_number(owner, DEBIT_CARD_NUMBER).await? {
        Some(card) => card,
        None => {
            let request = NewInstrument {
                card_number: DEBIT_CARD_NUMBER.to_string(),
                brand: "Visa".to_string(),
                valid_until,
                funding: NewFunding::Debit {
                    balance: Decimal::new(120_000, 2),
                },
            };
            service.create(owner, request, today).await?
        }
    };

    let credit = match store.find_instrument_by_number(owner, CREDIT_CARD_NUMBER).await? {
        Some(card) => card,
        None => {
            let request = NewInstrument {
                card_number: CREDIT_CARD_NUMBER.to_string(),
                brand: "MasterCard".to_string(),
                valid_until,
                funding: NewFunding::Credit {
                    limit: Decimal::new(300_000, 2),
                    closing_day: 20,
                },
            };
            service.create(owner, request, today).await?
        }
    };

    info!(debit_id = %debit.id, credit_id = %credit.id, "Instruments ready");
    Ok((debit, credit))
}

async fn seed_expenses(
    store: &Arc<SeaLedgerStore>,
    owner: UserId,
    category: CategoryId,
    debit: &Instrument,
    credit: &Instrument,
    month_start: NaiveDate,
) -> anyhow::Result<()> {
    if !store.list_expenses(owner).await?.is_empty() {
        info!("Demo expenses already exist, skipping...");
        return Ok(());
    }

    let draft = |amount: Decimal, description: &str, method: &str| ExpenseDraft {
        amount,
        date: month_start,
        description: description.to_string(),
        payment_method: method.to_string(),
        installments: None,
        category_id: category,
        credit_instrument_id: Some(credit.id),
        debit_instrument_id: Some(debit.id),
        paid: false,
    };

    let mut laptop = draft(Decimal::new(90_000, 2), "Laptop", CREDIT_CARD);
    laptop.installments = Some(3);
    let drafts = [
        draft(Decimal::new(8_540, 2), "Supermarket", DEBIT_CARD),
        draft(Decimal::new(4_200, 2), "Dinner", CREDIT_CARD),
        draft(Decimal::new(1_250, 2), "Bakery", "cash"),
        laptop,
    ];

    let postings = PostingService::new(store.clone());
    for draft in drafts {
        let description = draft.description.clone();
        let posting = postings.post_expense(owner, draft, month_start).await?;
        info!(
            description = %description,
            rows = posting.expenses.len(),
            "Seeded expense"
        );
    }
    Ok(())
}
