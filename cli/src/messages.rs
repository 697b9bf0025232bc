//! Localized user-facing messages.

use currex_fx::FxError;
use currex_store::Language;

/// Message keys shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    From,
    To,
    ExchangeRate,
    Favorites,
    Historical,
    ConversionSuccess,
    ConversionError,
    FavoriteAdded,
    FavoriteExists,
    FavoriteRemoved,
    HistoricalError,
    InvalidAmount,
    SameCurrency,
    NetworkError,
}

impl Message {
    pub const ALL: [Message; 14] = [
        Message::From,
        Message::To,
        Message::ExchangeRate,
        Message::Favorites,
        Message::Historical,
        Message::ConversionSuccess,
        Message::ConversionError,
        Message::FavoriteAdded,
        Message::FavoriteExists,
        Message::FavoriteRemoved,
        Message::HistoricalError,
        Message::InvalidAmount,
        Message::SameCurrency,
        Message::NetworkError,
    ];

    /// Text in the given language.
    pub fn text(self, language: Language) -> &'static str {
        match language {
            Language::English => self.english(),
            Language::Sinhala => self.sinhala(),
        }
    }

    /// Message for an error code, if one is defined.
    pub fn for_error_code(code: &str) -> Option<Message> {
        match code {
            "INVALID_AMOUNT" => Some(Message::InvalidAmount),
            "SAME_CURRENCY" => Some(Message::SameCurrency),
            "UNSUPPORTED_CURRENCY" => Some(Message::ConversionError),
            "PROVIDER_UNAVAILABLE" => Some(Message::NetworkError),
            "HISTORICAL_UNAVAILABLE" | "INVALID_DATE_RANGE" => Some(Message::HistoricalError),
            "ALREADY_EXISTS" => Some(Message::FavoriteExists),
            _ => None,
        }
    }

    fn english(self) -> &'static str {
        match self {
            Message::From => "From",
            Message::To => "To",
            Message::ExchangeRate => "Exchange Rate:",
            Message::Favorites => "Favorite Currency Pairs",
            Message::Historical => "Historical Exchange Rates",
            Message::ConversionSuccess => "Conversion completed successfully!",
            Message::ConversionError => "Error converting currencies. Please try again.",
            Message::FavoriteAdded => "Currency pair added to favorites!",
            Message::FavoriteExists => "This currency pair is already in favorites.",
            Message::FavoriteRemoved => "Currency pair removed from favorites.",
            Message::HistoricalError => "Error fetching historical data.",
            Message::InvalidAmount => "Please enter a valid amount.",
            Message::SameCurrency => "Please select different currencies.",
            Message::NetworkError => "Network error. Please check your connection.",
        }
    }

    fn sinhala(self) -> &'static str {
        match self {
            Message::From => "සිට",
            Message::To => "දක්වා",
            Message::ExchangeRate => "විනිමය අනුපාතය:",
            Message::Favorites => "ප්‍රියතම මුදල් යුගල",
            Message::Historical => "ඓතිහාසික විනිමය අනුපාත",
            Message::ConversionSuccess => "පරිවර්තනය සාර්ථකව සම්පූර්ණ විය!",
            Message::ConversionError => "මුදල් පරිවර්තනයේ දෝෂයක්. කරුණාකර නැවත උත්සාහ කරන්න.",
            Message::FavoriteAdded => "මුදල් යුගලය ප්‍රියතමයන්ට එකතු කරන ලදී!",
            Message::FavoriteExists => "මෙම මුදල් යුගලය දැනටමත් ප්‍රියතමයන්හි ඇත.",
            Message::FavoriteRemoved => "මුදල් යුගලය ප්‍රියතමයන්ගෙන් ඉවත් කරන ලදී.",
            Message::HistoricalError => "ඓතිහාසික දත්ත ලබා ගැනීමේ දෝෂයක්.",
            Message::InvalidAmount => "කරුණාකර වලංගු ප්‍රමාණයක් ඇතුළත් කරන්න.",
            Message::SameCurrency => "කරුණාකර විවිධ මුදල් තෝරන්න.",
            Message::NetworkError => "ජාල දෝෂයක්. කරුණාකර ඔබගේ සම්බන්ධතාවය පරීක්ෂා කරන්න.",
        }
    }
}

/// User-facing line for an error: the localized message where one exists,
/// followed by the error detail.
pub fn describe_error(language: Language, error: &anyhow::Error) -> String {
    match error.downcast_ref::<FxError>() {
        Some(fx) => match Message::for_error_code(fx.error_code()) {
            Some(message) => format!("{} ({})", message.text(language), fx),
            None => fx.to_string(),
        },
        None => format!("{:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use currex_common::Currency;

    #[test]
    fn test_every_message_translated() {
        for message in Message::ALL {
            let en = message.text(Language::English);
            let si = message.text(Language::Sinhala);
            assert!(!en.is_empty());
            assert!(!si.is_empty());
            assert_ne!(en, si, "{:?}", message);
        }
    }

    #[test]
    fn test_error_codes_map_to_messages() {
        assert_eq!(
            Message::for_error_code("INVALID_AMOUNT"),
            Some(Message::InvalidAmount)
        );
        assert_eq!(
            Message::for_error_code("PROVIDER_UNAVAILABLE"),
            Some(Message::NetworkError)
        );
        assert_eq!(Message::for_error_code("CONFIGURATION_ERROR"), None);
    }

    #[test]
    fn test_describe_error() {
        let error = anyhow::Error::new(FxError::SameCurrency(Currency::Usd));
        let line = describe_error(Language::English, &error);
        assert!(line.starts_with("Please select different currencies."));
        assert!(line.contains("USD"));

        let config = anyhow::Error::new(FxError::Config("bad timeout".into()));
        assert_eq!(
            describe_error(Language::Sinhala, &config),
            "Configuration error: bad timeout"
        );

        let other = anyhow::anyhow!("disk full");
        assert_eq!(describe_error(Language::English, &other), "disk full");
    }
}
