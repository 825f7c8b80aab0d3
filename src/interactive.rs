use crate::error::{Result as WordfindResult, WordfindError};
use crate::i18n::{Locale, MessageKey, localize};
use crate::search::{SEVEN_DAYS, THIRTY_DAYS};
use dialoguer::{Input, Select};
use log::info;
use std::time::Duration;

/// Recency choices in the order they are offered.
pub const RECENCY_CHOICES: [(MessageKey, Option<Duration>); 3] = [
    (MessageKey::Last7Days, Some(SEVEN_DAYS)),
    (MessageKey::Last30Days, Some(THIRTY_DAYS)),
    (MessageKey::NoFilter, None),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAnswers {
    pub term: String,
    pub case_insensitive: bool,
    pub recency_window: Option<Duration>,
}

pub fn recency_for_choice(index: usize) -> Option<Duration> {
    RECENCY_CHOICES.get(index).and_then(|(_, window)| *window)
}

/// Asks for the term, the case rule and the recency window. An empty term
/// is an input error.
pub fn prompt_search(locale: Locale, default_term: Option<&str>) -> WordfindResult<PromptAnswers> {
    let mut input = Input::<String>::new()
        .with_prompt(localize(MessageKey::PromptTerm, locale))
        .allow_empty(true);
    if let Some(term) = default_term {
        input = input.with_initial_text(term);
    }
    let term = input.interact_text().map_err(prompt_error)?;
    if term.is_empty() {
        return Err(WordfindError::Input(
            localize(MessageKey::NoTerm, locale).to_string(),
        ));
    }

    let yes_no = [
        localize(MessageKey::Yes, locale),
        localize(MessageKey::No, locale),
    ];
    let case_choice = Select::new()
        .with_prompt(localize(MessageKey::PromptIgnoreCase, locale))
        .items(&yes_no)
        .default(1)
        .interact()
        .map_err(prompt_error)?;

    let recency_labels: Vec<&str> = RECENCY_CHOICES
        .iter()
        .map(|(key, _)| localize(*key, locale))
        .collect();
    let recency_choice = Select::new()
        .with_prompt(localize(MessageKey::PromptRecency, locale))
        .items(&recency_labels)
        .default(RECENCY_CHOICES.len() - 1)
        .interact()
        .map_err(prompt_error)?;

    let answers = PromptAnswers {
        term,
        case_insensitive: case_choice == 0,
        recency_window: recency_for_choice(recency_choice),
    };
    info!("Interactive search: {answers:?}");
    Ok(answers)
}

fn prompt_error(e: dialoguer::Error) -> WordfindError {
    WordfindError::Other(format!("Prompt failed: {e}"))
}
