//! Add, edit and settings forms.
//!
//! Flags are laid over a fresh draft (add) or the stored record (edit), and
//! the result goes through the coordinator like any other write. Images are
//! uploaded first; their URLs are attached only when every upload succeeded.

use super::boot::App;
use super::edit::upload_images;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use travelsheet_core::checklist::append_checklist_marker;
use travelsheet_core::draft;
use travelsheet_core::model::{
    ExchangeRate, ExpenseRecord, ItineraryEntry, Record, Settings, SheetKind, WishItem,
};

#[derive(Args, Debug, Default)]
pub struct ItineraryFields {
    /// Day as YYYY-MM-DD (add defaults to today)
    #[arg(long)]
    pub day: Option<String>,
    /// Start time, e.g. 09:30
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub remark: Option<String>,
    /// Days the entry spans
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub duration: Option<u32>,
    /// Image to upload and attach; repeat for several
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

impl ItineraryFields {
    fn apply(self, entry: &mut ItineraryEntry, uploaded: Vec<String>) {
        if let Some(day) = self.day {
            entry.day = day;
        }
        if let Some(time) = self.time {
            entry.time = time.replace(':', "");
        }
        if let Some(category) = self.category {
            entry.category = category;
        }
        if let Some(content) = self.content {
            entry.content = content;
        }
        if let Some(location) = self.location {
            entry.location = location;
        }
        if let Some(remark) = self.remark {
            entry.remark = remark;
        }
        if let Some(duration) = self.duration {
            entry.duration = duration;
        }
        entry.images.extend(uploaded);
    }
}

#[derive(Args, Debug, Default)]
pub struct ExpenseFields {
    /// Date as YYYY-MM-DD (add defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub item: Option<String>,
    #[arg(long)]
    pub amount: Option<f64>,
    /// Currency code; NT$ is computed from the trip's rate table
    #[arg(long)]
    pub currency: Option<String>,
    /// Who paid; also resets the debtors to just this traveler
    #[arg(long)]
    pub payer: Option<String>,
    /// Traveler to add to or remove from the debtors; repeat for several
    #[arg(long = "debtor")]
    pub debtors: Vec<String>,
    #[arg(long)]
    pub payment_method: Option<String>,
    #[arg(long)]
    pub remark: Option<String>,
    /// Receipt image to upload and attach
    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl ExpenseFields {
    fn apply(self, expense: &mut ExpenseRecord, uploaded: Vec<String>) {
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(item) = self.item {
            expense.item = item;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(currency) = self.currency {
            expense.currency = currency.trim().to_ascii_uppercase();
        }
        if let Some(payer) = self.payer {
            expense.select_payer(&payer);
        }
        for debtor in &self.debtors {
            expense.debtor = draft::toggle_selection(&expense.debtor, debtor);
        }
        if let Some(method) = self.payment_method {
            expense.payment_method = method;
        }
        if let Some(remark) = self.remark {
            expense.remark = remark;
        }
        if let Some(url) = uploaded.into_iter().next() {
            expense.image = url;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct WishFields {
    /// Tag to add or remove; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Replace the free-text content
    #[arg(long)]
    pub content: Option<String>,
    /// Append an open checklist line; repeat for several
    #[arg(long = "check")]
    pub checks: Vec<String>,
    #[arg(long)]
    pub payer: Option<String>,
    /// Image to upload and attach; repeat for several
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

impl WishFields {
    fn apply(self, wish: &mut WishItem, uploaded: Vec<String>) {
        for tag in &self.tags {
            wish.tag = draft::toggle_selection(&wish.tag, tag);
        }
        if let Some(content) = self.content {
            wish.content = content;
        }
        for check in &self.checks {
            wish.content = append_checklist_marker(&wish.content) + check.trim();
        }
        if let Some(payer) = self.payer {
            wish.payer = payer;
        }
        wish.images.extend(uploaded);
    }
}

#[derive(Subcommand, Debug)]
pub enum AddCommand {
    /// Add an itinerary entry
    Itinerary(ItineraryFields),
    /// Add an expense
    Expense(ExpenseFields),
    /// Add a wish
    Wish(WishFields),
}

#[derive(Subcommand, Debug)]
pub enum EditCommand {
    /// Edit an itinerary entry
    Itinerary {
        id: String,
        #[command(flatten)]
        fields: ItineraryFields,
    },
    /// Edit an expense
    Expense {
        id: String,
        #[command(flatten)]
        fields: ExpenseFields,
    },
    /// Edit a wish
    Wish {
        id: String,
        #[command(flatten)]
        fields: WishFields,
    },
}

impl EditCommand {
    fn target(&self) -> (SheetKind, &str) {
        match self {
            EditCommand::Itinerary { id, .. } => (SheetKind::Itinerary, id),
            EditCommand::Expense { id, .. } => (SheetKind::Expenses, id),
            EditCommand::Wish { id, .. } => (SheetKind::Wishes, id),
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct SettingsFields {
    /// Replace the traveler list; repeat for several
    #[arg(long = "traveler")]
    pub travelers: Vec<String>,
    /// Replace the itinerary categories; repeat for several
    #[arg(long = "category")]
    pub categories: Vec<String>,
    /// Replace the wish tags; repeat for several
    #[arg(long = "wish-tag")]
    pub wish_tags: Vec<String>,
    /// Replace the payment methods; repeat for several
    #[arg(long = "payment-method")]
    pub payment_methods: Vec<String>,
    /// Exchange rate as CODE=RATE; repeat for several, replaces the table
    #[arg(long = "rate", value_parser = parse_rate)]
    pub rates: Vec<ExchangeRate>,
}

impl SettingsFields {
    fn is_empty(&self) -> bool {
        self.travelers.is_empty()
            && self.categories.is_empty()
            && self.wish_tags.is_empty()
            && self.payment_methods.is_empty()
            && self.rates.is_empty()
    }

    fn apply(self, settings: &mut Settings) {
        let replace = |target: &mut Vec<String>, given: Vec<String>| {
            if !given.is_empty() {
                *target = given;
            }
        };
        replace(&mut settings.travelers, self.travelers);
        replace(&mut settings.categories, self.categories);
        replace(&mut settings.wish_tags, self.wish_tags);
        replace(&mut settings.payment_methods, self.payment_methods);
        if !self.rates.is_empty() {
            settings.rates = self.rates;
        }
    }
}

fn parse_rate(raw: &str) -> Result<ExchangeRate, String> {
    let (code, rate) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=RATE, got '{}'", raw))?;
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(format!("missing currency code in '{}'", raw));
    }
    let rate: f64 = rate
        .trim()
        .parse()
        .map_err(|_| format!("invalid rate '{}'", rate.trim()))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(format!("rate for {} must be positive", code));
    }
    Ok(ExchangeRate { code, rate })
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub async fn add(app: &App, command: AddCommand) -> Result<()> {
    let settings = app.coordinator.snapshot().await.settings;
    let record = match command {
        AddCommand::Itinerary(fields) => {
            let uploaded = upload_images(app, &fields.images).await?;
            let mut entry = draft::new_itinerary_entry(&today());
            fields.apply(&mut entry, uploaded);
            Record::Itinerary(entry)
        }
        AddCommand::Expense(fields) => {
            let uploaded = upload_images(app, fields.image.as_slice()).await?;
            let mut expense = draft::new_expense(&settings, &today());
            fields.apply(&mut expense, uploaded);
            Record::Expense(expense)
        }
        AddCommand::Wish(fields) => {
            let uploaded = upload_images(app, &fields.images).await?;
            let mut wish = draft::new_wish(&settings);
            fields.apply(&mut wish, uploaded);
            Record::Wish(wish)
        }
    };
    app.coordinator.upsert(record).await?;
    Ok(())
}

pub async fn edit(app: &App, command: EditCommand) -> Result<()> {
    let (sheet, id) = command.target();
    let stored = app
        .coordinator
        .snapshot()
        .await
        .find(sheet, id)
        .with_context(|| format!("No {} record '{}'", sheet, id))?;

    let record = match (command, stored) {
        (EditCommand::Itinerary { fields, .. }, Record::Itinerary(mut entry)) => {
            let uploaded = upload_images(app, &fields.images).await?;
            fields.apply(&mut entry, uploaded);
            Record::Itinerary(entry)
        }
        (EditCommand::Expense { fields, .. }, Record::Expense(mut expense)) => {
            let uploaded = upload_images(app, fields.image.as_slice()).await?;
            fields.apply(&mut expense, uploaded);
            Record::Expense(expense)
        }
        (EditCommand::Wish { fields, .. }, Record::Wish(mut wish)) => {
            let uploaded = upload_images(app, &fields.images).await?;
            fields.apply(&mut wish, uploaded);
            Record::Wish(wish)
        }
        (_, other) => anyhow::bail!(
            "Record '{}' is not in {}",
            other.id().unwrap_or_default(),
            sheet
        ),
    };
    app.coordinator.upsert(record).await?;
    Ok(())
}

/// Prints the trip settings, or saves them when any field is given.
pub async fn settings(app: &App, fields: SettingsFields) -> Result<()> {
    let mut settings = app.coordinator.snapshot().await.settings;
    if fields.is_empty() {
        print_settings(&settings);
        return Ok(());
    }

    fields.apply(&mut settings);
    app.coordinator.save_settings(settings).await?;
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("👥 Travelers:       {}", settings.travelers.join(", "));
    println!("🏷️  Categories:      {}", settings.categories.join(", "));
    println!("🔖 Wish tags:       {}", settings.wish_tags.join(", "));
    println!("💳 Payment methods: {}", settings.payment_methods.join(", "));
    for rate in &settings.rates {
        println!("💱 {} = {}", rate.code, rate.rate);
    }
}
