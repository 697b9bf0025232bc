//! Subcommands and their execution.

use std::path::Path;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::Subcommand;
use currex_common::{default_historical_date, format_date, Currency, CurrencyPair};
use currex_fx::{
    parse_amount, AppContext, Conversion, ConversionRequest, FxError, RateComparison, RatePoint,
};
use currex_store::{Language, Theme};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::messages::Message;
use crate::render;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Source currency (defaults to the preferred one)
        from: Option<Currency>,
        /// Target currency (defaults to the preferred one)
        to: Option<Currency>,
        /// Convert in the opposite direction
        #[arg(long)]
        swap: bool,
    },

    /// Show the current exchange rate
    Rate {
        from: Option<Currency>,
        to: Option<Currency>,
    },

    /// Look up the exchange rate on a past date
    History {
        from: Option<Currency>,
        to: Option<Currency>,
        /// Date as YYYY-MM-DD (defaults to one week ago)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Chart the exchange rate over recent days
    Trend {
        from: Option<Currency>,
        to: Option<Currency>,
        /// Number of days to cover
        #[arg(long)]
        days: Option<u32>,
    },

    /// Manage favorite currency pairs
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Show saved preferences
    Prefs,

    /// Show or toggle the color theme
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Show or set the interface language
    #[command(subcommand)]
    Language(LanguageCommand),
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// Save a pair such as USD-EUR (defaults to the preferred pair)
    Add { pair: Option<CurrencyPair> },
    /// Remove a saved pair
    Remove { pair: CurrencyPair },
    /// List saved pairs
    List,
    /// Convert using the favorite at a list position
    Use {
        /// Position shown by `favorites list`, starting at 1
        position: usize,
        /// Amount to convert
        #[arg(default_value = "1", allow_hyphen_values = true)]
        amount: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    Show,
    Toggle,
}

#[derive(Subcommand, Debug)]
pub enum LanguageCommand {
    Show,
    /// Set the language (en, si)
    Set { language: Language },
}

/// Executes commands against one [`AppContext`] and prints the results.
pub struct Runner<'a> {
    ctx: &'a AppContext,
    json: bool,
    store_path: &'a Path,
}

impl<'a> Runner<'a> {
    pub fn new(ctx: &'a AppContext, json: bool, store_path: &'a Path) -> Self {
        Self {
            ctx,
            json,
            store_path,
        }
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Convert {
                amount,
                from,
                to,
                swap,
            } => self.convert(&amount, from, to, swap).await,
            Command::Rate { from, to } => self.rate(from, to).await,
            Command::History { from, to, date } => self.history(from, to, date).await,
            // The day count is applied to the context configuration
            Command::Trend { from, to, .. } => self.trend(from, to).await,
            Command::Favorites(command) => self.favorites(command).await,
            Command::Prefs => self.prefs(),
            Command::Theme(command) => self.theme(command),
            Command::Language(command) => self.language(command),
        }
    }

    async fn convert(
        &self,
        amount: &str,
        from: Option<Currency>,
        to: Option<Currency>,
        swap: bool,
    ) -> anyhow::Result<()> {
        let pair = self.pair(from, to);
        let amount = parse_amount(amount)?;
        let request = ConversionRequest::user(amount, pair.from, pair.to);

        let conversion = if swap {
            self.ctx
                .engine()
                .swap(&request)
                .await?
                .ok_or_else(|| anyhow!("conversion superseded by a newer request"))?
        } else {
            self.ctx.engine().convert(request).await?
        };

        self.show_conversion(&conversion)?;
        self.say(Message::ConversionSuccess);
        Ok(())
    }

    async fn rate(&self, from: Option<Currency>, to: Option<Currency>) -> anyhow::Result<()> {
        let pair = self.pair(from, to);
        let rate = self.ctx.rates().resolve(pair).await;
        let line = format!("{} {}", self.text(Message::ExchangeRate), rate);
        self.emit(&rate, vec![line])
    }

    async fn history(
        &self,
        from: Option<Currency>,
        to: Option<Currency>,
        date: Option<NaiveDate>,
    ) -> anyhow::Result<()> {
        let pair = self.pair(from, to);
        let date = date.unwrap_or_else(default_historical_date);

        let historical = self.ctx.history().get_rate(date, pair.from, pair.to).await?;
        let current = self.ctx.rates().resolve(pair).await;
        let comparison = RateComparison::compare(&historical, &current);

        let lines = vec![
            self.text(Message::Historical).to_string(),
            format!("{}: {}", format_date(date), historical.describe()),
            format!("{} {}", self.text(Message::ExchangeRate), current),
            render::change_line(&comparison),
        ];
        let value = json!({
            "historical": historical,
            "current": current,
            "comparison": comparison,
        });
        self.emit(&value, lines)
    }

    async fn trend(&self, from: Option<Currency>, to: Option<Currency>) -> anyhow::Result<()> {
        let pair = self.pair(from, to);
        let series = self.ctx.history().trend(pair.from, pair.to).await?;
        let provenance = series.provenance();
        let points: Vec<RatePoint> = series.collect();

        let mut lines = vec![format!("{} ({})", pair, provenance)];
        lines.extend(render::chart(&points, render::CHART_WIDTH));
        let value = json!({
            "pair": pair,
            "provenance": provenance,
            "points": points,
        });
        self.emit(&value, lines)
    }

    async fn favorites(&self, command: FavoritesCommand) -> anyhow::Result<()> {
        let preferences = self.ctx.preferences();

        match command {
            FavoritesCommand::Add { pair } => {
                let pair = pair.unwrap_or_else(|| self.ctx.default_pair());
                match preferences.save_favorite(pair) {
                    Ok(()) => self.say(Message::FavoriteAdded),
                    Err(e) if e.is_informational() => self.say(Message::FavoriteExists),
                    Err(e) => return Err(FxError::from(e).into()),
                }
                Ok(())
            }
            FavoritesCommand::Remove { pair } => {
                if preferences.remove_favorite(pair).map_err(FxError::from)? {
                    self.say(Message::FavoriteRemoved);
                } else {
                    debug!(pair = %pair, "Pair was not a favorite");
                }
                Ok(())
            }
            FavoritesCommand::List => {
                let favorites = preferences.list_favorites();
                let mut lines = vec![self.text(Message::Favorites).to_string()];
                lines.extend(favorites.iter().enumerate().map(|(i, pair)| {
                    format!(
                        "{:>3}. {} {} → {} {}",
                        i + 1,
                        pair.from.flag(),
                        pair.from,
                        pair.to.flag(),
                        pair.to
                    )
                }));
                self.emit(&favorites, lines)
            }
            FavoritesCommand::Use { position, amount } => {
                let pair = position
                    .checked_sub(1)
                    .and_then(|i| preferences.list_favorites().get(i).copied())
                    .ok_or_else(|| anyhow!("no favorite at position {}", position))?;
                let amount = parse_amount(&amount)?;

                let conversion = self
                    .ctx
                    .engine()
                    .submit(ConversionRequest::auto(amount, pair.from, pair.to))
                    .await?
                    .ok_or_else(|| anyhow!("conversion superseded by a newer request"))?;
                self.show_conversion(&conversion)
            }
        }
    }

    fn prefs(&self) -> anyhow::Result<()> {
        let preferences = self.ctx.preferences();
        let preferred = preferences.load_preferred_currencies();
        let language = preferences.language();
        let theme = preferences.theme();
        let favorites = preferences.list_favorites();

        let mut lines = Vec::new();
        if let Some(pair) = preferred {
            lines.push(format!("{}: {}", self.text(Message::From), pair.from));
            lines.push(format!("{}: {}", self.text(Message::To), pair.to));
        }
        lines.push(format!("language: {}", language));
        lines.push(format!("theme: {}", theme));
        lines.push(format!("favorites: {}", favorites.len()));
        lines.push(format!("store: {}", self.store_path.display()));

        let value = json!({
            "preferred": preferred,
            "language": language.code(),
            "theme": theme.code(),
            "favorites": favorites,
            "store": self.store_path.display().to_string(),
        });
        self.emit(&value, lines)
    }

    fn theme(&self, command: ThemeCommand) -> anyhow::Result<()> {
        let theme: Theme = match command {
            ThemeCommand::Show => self.ctx.preferences().theme(),
            ThemeCommand::Toggle => self.ctx.preferences().toggle_theme().map_err(FxError::from)?,
        };
        self.emit(&json!({ "theme": theme.code() }), vec![theme.to_string()])
    }

    fn language(&self, command: LanguageCommand) -> anyhow::Result<()> {
        let preferences = self.ctx.preferences();
        if let LanguageCommand::Set { language } = command {
            preferences.set_language(language).map_err(FxError::from)?;
        }
        let language = preferences.language();
        self.emit(&json!({ "language": language.code() }), vec![language.to_string()])
    }

    fn show_conversion(&self, conversion: &Conversion) -> anyhow::Result<()> {
        let lines = vec![
            render::conversion_line(conversion),
            format!("{} {}", self.text(Message::ExchangeRate), conversion.rate),
        ];
        self.emit(conversion, lines)
    }

    fn pair(&self, from: Option<Currency>, to: Option<Currency>) -> CurrencyPair {
        let default = self.ctx.default_pair();
        CurrencyPair::new(from.unwrap_or(default.from), to.unwrap_or(default.to))
    }

    fn text(&self, message: Message) -> &'static str {
        message.text(self.ctx.preferences().language())
    }

    fn say(&self, message: Message) {
        if !self.json {
            println!("{}", self.text(message));
        }
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, lines: Vec<String>) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            for line in lines {
                println!("{}", line);
            }
        }
        Ok(())
    }
}
