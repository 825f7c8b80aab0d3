//! User-facing message table. The search engine never touches this; only the
//! front end does.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
    PromptTerm,
    PromptIgnoreCase,
    PromptRecency,
    Yes,
    No,
    Last7Days,
    Last30Days,
    NoFilter,
    NoTerm,
    NoRoot,
    Searching,
    NoMatches,
    Found,
    ResultsHeader,
    ResultFile,
    ResultLines,
    ReadDirFailed,
    Copied,
}

/// Message template for `key`. Placeholders are `{term}`, `{count}`,
/// `{path}`, `{lines}` and `{error}`.
pub fn localize(key: MessageKey, locale: Locale) -> &'static str {
    use MessageKey::*;
    match locale {
        Locale::En => match key {
            PromptTerm => "Enter the word to search for",
            PromptIgnoreCase => "Ignore upper and lower case?",
            PromptRecency => "Search only recently modified files?",
            Yes => "Yes",
            No => "No",
            Last7Days => "Last 7 days",
            Last30Days => "Last 30 days",
            NoFilter => "No filter",
            NoTerm => "No word was entered.",
            NoRoot => "No folder is available to search: {path}",
            Searching => "Searching for word...",
            NoMatches => "No matches found for \"{term}\".",
            Found => "Search finished. Found \"{term}\" in {count} file(s).",
            ResultsHeader => "Search results:",
            ResultFile => "File: {path}",
            ResultLines => "Matches: {count} (Lines: {lines})",
            ReadDirFailed => "Error reading {path}: {error}",
            Copied => "Results copied to clipboard!",
        },
        Locale::Es => match key {
            PromptTerm => "Ingrese la palabra a buscar",
            PromptIgnoreCase => "¿Ignorar mayúsculas y minúsculas?",
            PromptRecency => "¿Buscar solo en archivos modificados recientemente?",
            Yes => "Sí",
            No => "No",
            Last7Days => "Últimos 7 días",
            Last30Days => "Últimos 30 días",
            NoFilter => "Sin filtro",
            NoTerm => "No se ingresó ninguna palabra.",
            NoRoot => "No hay una carpeta abierta para buscar: {path}",
            Searching => "Buscando palabra...",
            NoMatches => "No se encontró la palabra \"{term}\" en ningún archivo.",
            Found => "Búsqueda finalizada. Se encontró \"{term}\" en {count} archivo(s).",
            ResultsHeader => "Resultados de búsqueda:",
            ResultFile => "Archivo: {path}",
            ResultLines => "Coincidencias: {count} (Líneas: {lines})",
            ReadDirFailed => "Error al leer {path}: {error}",
            Copied => "¡Resultados copiados al portapapeles!",
        },
    }
}

/// Looks up `key` and fills in the named placeholders.
pub fn message(key: MessageKey, locale: Locale, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(localize(key, locale).to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}
