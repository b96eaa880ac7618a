use serde_json::json;

use crate::database::models::quote::{Quote, QuoteDraft};
use crate::database::models::template::{Template, TemplateDraft};
use crate::filter::{Predicate, Window};

use super::store::{Store, StoreError};

/// Install the stock global templates when no global template exists yet.
/// Returns how many were inserted.
pub async fn seed_global_templates(store: &dyn Store<Template>) -> Result<usize, StoreError> {
    let existing = store.select(&[Predicate::is_null("user_id")], Window { offset: 0, limit: 1 }).await?;
    if !existing.is_empty() {
        return Ok(0);
    }

    let stock = [
        (
            "Classic Quote",
            json!({
                "background": "#ffffff",
                "text_color": "#000000",
                "font_family": "Arial",
                "font_size": "24px",
                "text_align": "center",
                "padding": "40px",
                "border": "none",
                "quote_style": "quotation_marks",
            }),
        ),
        (
            "Modern Gradient",
            json!({
                "background": "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
                "text_color": "#ffffff",
                "font_family": "Roboto",
                "font_size": "28px",
                "text_align": "center",
                "padding": "50px",
                "border_radius": "15px",
                "quote_style": "clean",
            }),
        ),
        (
            "Minimalist Dark",
            json!({
                "background": "#1a1a1a",
                "text_color": "#f5f5f5",
                "font_family": "Helvetica",
                "font_size": "26px",
                "text_align": "left",
                "padding": "35px",
                "border_left": "4px solid #ff6b6b",
                "quote_style": "dash",
            }),
        ),
    ];

    let count = stock.len();
    for (name, config) in stock {
        store.insert(TemplateDraft { user_id: None, name: name.to_string(), config }).await?;
    }
    tracing::info!("Seeded {} global templates", count);
    Ok(count)
}

/// Install the starter quote catalogue into an empty quote store.
/// The quotes have no creator, so only administrators may edit them.
pub async fn seed_starter_quotes(store: &dyn Store<Quote>) -> Result<usize, StoreError> {
    if store.count(&[]).await? > 0 {
        return Ok(0);
    }

    let starters = [
        ("The only way to do great work is to love what you do.", "Steve Jobs", "motivation"),
        ("Life is what happens to you while you're busy making other plans.", "John Lennon", "life"),
        ("The future belongs to those who believe in the beauty of their dreams.", "Eleanor Roosevelt", "inspiration"),
        ("It is during our darkest moments that we must focus to see the light.", "Aristotle", "motivation"),
        ("The only impossible journey is the one you never begin.", "Tony Robbins", "motivation"),
    ];

    let count = starters.len();
    for (text, author, category) in starters {
        let draft = QuoteDraft {
            text: text.to_string(),
            author: author.to_string(),
            category: category.to_string(),
            created_by: None,
        };
        store.insert(draft).await?;
    }
    tracing::info!("Seeded {} starter quotes", count);
    Ok(count)
}
