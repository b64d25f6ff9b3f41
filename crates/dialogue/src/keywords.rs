//! Keyword tables driving the rule-based parts of a turn.
//!
//! Matching is case-insensitive. `phrases` match anywhere in the message
//! (so stems like `просроч` cover every inflection); `words` match only as
//! whole tokens, for short tags like `ип` or `hi` that would otherwise fire
//! inside unrelated words.

use qaryz_core::Intent;

/// Bumped whenever any table below changes.
pub const KEYWORD_TABLE_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    phrases: &'static [&'static str],
    words: &'static [&'static str],
}

impl KeywordSet {
    pub const fn new(phrases: &'static [&'static str], words: &'static [&'static str]) -> Self {
        Self { phrases, words }
    }

    pub fn matches(&self, message: &str) -> bool {
        self.matches_lowercase(&message.to_lowercase())
    }

    /// Same as [`matches`](Self::matches) for text that is already lowercase.
    pub fn matches_lowercase(&self, lower: &str) -> bool {
        self.phrases.iter().any(|p| lower.contains(p))
            || (!self.words.is_empty()
                && tokens(lower).any(|token| self.words.contains(&token)))
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty())
}

pub const GREETING: KeywordSet = KeywordSet::new(
    &[
        "здравствуй",
        "привет",
        "добрый день",
        "добрый вечер",
        "доброе утро",
        "здорово",
        "хочу на консультацию",
        "консультация",
    ],
    &["hi", "hello"],
);

/// Registered individual entrepreneurs cannot go through personal bankruptcy.
pub const ENTREPRENEUR: KeywordSet = KeywordSet::new(
    &["индивидуальный предприниматель", "предпринимател"],
    &["ип"],
);

/// "What now?" after an answer has been given. Greetings are checked first,
/// so no phrase here may contain a greeting phrase.
pub const FOLLOWUP: KeywordSet = KeywordSet::new(
    &[
        "что дальше",
        "что потом",
        "что после",
        "после банкротства",
        "что делать дальше",
        "что делать потом",
        "что делать после",
        "следующий шаг",
        "дальнейшие действия",
        "план действий",
        "куда обращаться",
        "где получить помощь",
        "хочу консультацию",
        "помогите",
        "посоветуйте",
    ],
    &[],
);

pub const FOLLOWUP_PLAN: KeywordSet =
    KeywordSet::new(&["что дальше", "что потом", "план действий"], &[]);

pub const FOLLOWUP_HELP: KeywordSet =
    KeywordSet::new(&["консультац", "помощь", "помогите", "посоветуйте"], &[]);

// ── Re-ranking topics ──

pub const INCOME_TOPIC: KeywordSet =
    KeywordSet::new(&["зарплат", "доход", "работ", "пенси"], &[]);

pub const PROPERTY_TOPIC: KeywordSet = KeywordSet::new(
    &["квартир", "дом", "машин", "недвижимост", "автомобил"],
    &[],
);

pub const OVERDUE_TOPIC: KeywordSet =
    KeywordSet::new(&["просроч", "коллектор", "не плачу", "задерж"], &[]);

// ── Fallback extraction ──

/// Checked in order; the first matching set decides.
pub const INTENT_TABLE: [(KeywordSet, Intent); 4] = [
    (
        KeywordSet::new(&["как начать", "с чего начать"], &[]),
        Intent::HowToStart,
    ),
    (
        KeywordSet::new(&["документ", "справк"], &[]),
        Intent::Documentation,
    ),
    (
        KeywordSet::new(&["последстви", "что будет после"], &[]),
        Intent::Consequences,
    ),
    (
        KeywordSet::new(&["подхожу", "могу ли"], &[]),
        Intent::EligibilityCheck,
    ),
];

pub const CORRECTION: KeywordSet =
    KeywordSet::new(&["исправ", "на самом деле", "ошибся", "ошиблась"], &[]);

/// Intent named by the message, if any.
pub fn intent_from_keywords(message: &str) -> Option<Intent> {
    let lower = message.to_lowercase();
    INTENT_TABLE
        .iter()
        .find(|(set, _)| set.matches_lowercase(&lower))
        .map(|(_, intent)| *intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_case_insensitive() {
        assert!(GREETING.matches("Добрый день! У меня долги"));
        assert!(GREETING.matches("HELLO"));
        assert!(!GREETING.matches("У меня долг 5 млн"));
    }

    #[test]
    fn short_words_match_whole_tokens_only() {
        assert!(GREETING.matches("hi there"));
        assert!(!GREETING.matches("this is my debt"));
        assert!(ENTREPRENEUR.matches("У меня ИП"));
        assert!(ENTREPRENEUR.matches("ип, зарегистрирован в 2020"));
        assert!(!ENTREPRENEUR.matches("У меня ипотека"));
        assert!(!ENTREPRENEUR.matches("Типичная ситуация"));
    }

    #[test]
    fn entrepreneur_phrases() {
        assert!(ENTREPRENEUR.matches("Я индивидуальный предприниматель"));
        assert!(ENTREPRENEUR.matches("раньше был предпринимателем"));
    }

    #[test]
    fn followup_phrases_are_not_greetings() {
        for phrase in FOLLOWUP.phrases {
            assert!(!GREETING.matches(phrase), "{phrase} is caught as a greeting");
        }
        assert!(FOLLOWUP.matches("хочу консультацию"));
        assert!(!FOLLOWUP.matches("мне нужна консультация"));
    }

    #[test]
    fn followup_branches() {
        assert!(FOLLOWUP.matches("А что дальше?"));
        assert!(FOLLOWUP_PLAN.matches("Какой план действий?"));
        assert!(FOLLOWUP_HELP.matches("хочу консультацию"));
        assert!(!FOLLOWUP.matches("спасибо"));
    }

    #[test]
    fn intent_table_order() {
        assert_eq!(intent_from_keywords("С чего начать?"), Some(Intent::HowToStart));
        assert_eq!(intent_from_keywords("Какие документы нужны?"), Some(Intent::Documentation));
        assert_eq!(intent_from_keywords("Какие последствия?"), Some(Intent::Consequences));
        assert_eq!(intent_from_keywords("Подхожу ли я?"), Some(Intent::EligibilityCheck));
        assert_eq!(intent_from_keywords("долг 5 млн"), None);
    }

    #[test]
    fn topics() {
        assert!(OVERDUE_TOPIC.matches("Звонят коллекторы"));
        assert!(INCOME_TOPIC.matches("Зарплата маленькая"));
        assert!(PROPERTY_TOPIC.matches("есть квартира"));
        assert!(CORRECTION.matches("Ой, на самом деле 3 млн"));
    }
}
