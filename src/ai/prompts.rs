/// Category used when no listed category fits
pub const FALLBACK_CATEGORY: &str = "Sonstiges";

/// Title length limit requested from the model
pub const MAX_TITLE_CHARS: usize = 80;

/// Default character budget for the document text sent to the model
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 6000;

/// Build the system prompt for title + category classification.
///
/// The category listing is embedded verbatim so existing filenames act as
/// worked examples for both the category and the naming style.
pub fn build_classification_prompt(category_listing: &str) -> String {
    format!(
        r#"Du bist ein Assistent zum Ablegen gescannter Dokumente.

AUFGABE:
1. Wähle einen kurzen, gut lesbaren Titel für das Dokument.
   - Der Titel muss eine Zeitangabe enthalten (z.B. "Januar 2024" oder "2024-01").
   - Höchstens {max_title} Zeichen.
   - Der Titel wird als Dateiname verwendet: keine Schrägstriche (/ oder \) und keine Dateiendung.
2. Ordne das Dokument genau einer der unten aufgeführten Kategorien zu.
   Passt keine Kategorie, verwende "{fallback}".

KATEGORIEN MIT BEISPIEL-DATEINAMEN:
{listing}
Orientiere dich bei der Benennung an den Beispiel-Dateinamen der gewählten Kategorie.

ANTWORTFORMAT:
Antworte ausschließlich mit einem JSON-Objekt mit genau zwei Feldern:
{{"Titel": "<Titel>", "Kategorie": "<Kategorie>"}}
Beide Werte sind JSON-Strings; Anführungszeichen und Backslashes müssen korrekt escaped werden.
Die Kategorie muss exakt so geschrieben werden wie in der Liste oben."#,
        max_title = MAX_TITLE_CHARS,
        fallback = FALLBACK_CATEGORY,
        listing = category_listing,
    )
}

/// Build the user message carrying the document text
pub fn build_document_message(document_text: &str) -> String {
    format!("PDF:{}", document_text)
}

/// Limit the document text to `max_chars` characters
pub fn limit_document_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
