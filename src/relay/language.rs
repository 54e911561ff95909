//! Selectable languages and the canned user-visible strings for each.

use chrono::{DateTime, Utc};

/// Prefix for inline keyboard callback data (`lang:uk`).
const CALLBACK_PREFIX: &str = "lang:";

/// A language the user can select. Every variant has a full set of
/// canned messages, so the selectable set and the templated set match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Uk,
    En,
    De,
    Pl,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Uk, Language::En, Language::De, Language::Pl];

    /// ISO 639-1 code, as understood by the translator.
    pub fn code(self) -> &'static str {
        match self {
            Language::Uk => "uk",
            Language::En => "en",
            Language::De => "de",
            Language::Pl => "pl",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    /// Label shown on the selection keyboard.
    pub fn label(self) -> &'static str {
        match self {
            Language::Uk => "🇺🇦 Українська",
            Language::En => "🇬🇧 English",
            Language::De => "🇩🇪 Deutsch",
            Language::Pl => "🇵🇱 Polski",
        }
    }

    pub fn is_english(self) -> bool {
        self == Language::En
    }

    pub fn callback_data(self) -> String {
        format!("{CALLBACK_PREFIX}{}", self.code())
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        data.strip_prefix(CALLBACK_PREFIX).and_then(Self::from_code)
    }

    pub fn greeting(self) -> &'static str {
        match self {
            Language::Uk => "Привіт! Я AI-бот із GPT-2. Задай питання!",
            Language::En => "Hi! I'm an AI bot powered by GPT-2. Ask me a question!",
            Language::De => "Hallo! Ich bin ein KI-Bot mit GPT-2. Stell mir eine Frage!",
            Language::Pl => "Cześć! Jestem botem AI opartym na GPT-2. Zadaj mi pytanie!",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Language::Uk => {
                "Надішли мені питання, і я відповім.\n\
                 /language - змінити мову\n\
                 /stats - статистика запитів"
            }
            Language::En => {
                "Send me a question and I'll answer it.\n\
                 /language - change language\n\
                 /stats - query statistics"
            }
            Language::De => {
                "Schick mir eine Frage und ich antworte.\n\
                 /language - Sprache ändern\n\
                 /stats - Anfragestatistik"
            }
            Language::Pl => {
                "Wyślij mi pytanie, a odpowiem.\n\
                 /language - zmień język\n\
                 /stats - statystyki zapytań"
            }
        }
    }

    pub fn choose_prompt(self) -> &'static str {
        match self {
            Language::Uk => "Оберіть мову:",
            Language::En => "Choose a language:",
            Language::De => "Wähle eine Sprache:",
            Language::Pl => "Wybierz język:",
        }
    }

    /// Confirmation sent in the newly selected language.
    pub fn selected(self) -> &'static str {
        match self {
            Language::Uk => "Мову змінено на українську.",
            Language::En => "Language set to English.",
            Language::De => "Sprache auf Deutsch umgestellt.",
            Language::Pl => "Język zmieniono na polski.",
        }
    }

    pub fn too_long(self, limit: usize) -> String {
        match self {
            Language::Uk => format!("Повідомлення задовге. Максимум {limit} символів."),
            Language::En => format!("Your message is too long. The limit is {limit} characters."),
            Language::De => format!("Die Nachricht ist zu lang. Maximal {limit} Zeichen."),
            Language::Pl => format!("Wiadomość jest za długa. Maksymalnie {limit} znaków."),
        }
    }

    /// Substitute for degenerate model output. Each one is already a
    /// normalized reply: at least 20 chars, 5 words, one final period.
    pub fn generation_fallback(self) -> &'static str {
        match self {
            Language::Uk => "Не вдалося згенерувати відповідь. Будь ласка, спробуйте ще раз.",
            Language::En => "Sorry, I could not come up with a good answer. Please try again.",
            Language::De => "Leider konnte keine Antwort erzeugt werden. Bitte versuche es noch einmal.",
            Language::Pl => "Nie udało się wygenerować odpowiedzi. Spróbuj ponownie za chwilę.",
        }
    }

    pub fn apology(self) -> &'static str {
        match self {
            Language::Uk => "Вибачте, сталася помилка. Спробуйте пізніше.",
            Language::En => "Sorry, something went wrong. Please try again later.",
            Language::De => "Entschuldigung, etwas ist schiefgelaufen. Bitte später erneut versuchen.",
            Language::Pl => "Przepraszam, coś poszło nie tak. Spróbuj później.",
        }
    }

    pub fn stats_text(self, count: u64, since: DateTime<Utc>) -> String {
        let since = since.format("%Y-%m-%d %H:%M UTC");
        match self {
            Language::Uk => format!("📊 Оброблено запитів: {count} (з {since})"),
            Language::En => format!("📊 Queries processed: {count} (since {since})"),
            Language::De => format!("📊 Bearbeitete Anfragen: {count} (seit {since})"),
            Language::Pl => format!("📊 Przetworzone zapytania: {count} (od {since})"),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ukrainian() {
        assert_eq!(Language::default(), Language::Uk);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code(" UK "), Some(Language::Uk));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn test_callback_data() {
        for lang in Language::ALL {
            assert_eq!(Language::from_callback_data(&lang.callback_data()), Some(lang));
        }
        assert_eq!(Language::from_callback_data("uk"), None);
        assert_eq!(Language::from_callback_data("lang:xx"), None);
    }

    #[test]
    fn test_too_long_mentions_limit() {
        for lang in Language::ALL {
            assert!(lang.too_long(500).contains("500"));
        }
    }

    #[test]
    fn test_stats_text_includes_count() {
        let since = DateTime::from_timestamp(0, 0).unwrap();
        let text = Language::En.stats_text(42, since);
        assert!(text.contains("42"));
        assert!(text.contains("1970-01-01"));
    }
}
