use ammonia;

/// Cleans question markup before it is placed into the question listing.
///
/// Question titles and bodies are authored as HTML and shown as markup in
/// the listing, so they go through ammonia's whitelist: formatting tags
/// survive, `<script>`, event handler attributes and the like are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_formatting_drops_scripts() {
        let cleaned = clean_html("<b>Capital</b> of France?<script>alert(1)</script>");
        assert_eq!(cleaned, "<b>Capital</b> of France?");
    }

    #[test]
    fn strips_event_handlers() {
        let cleaned = clean_html(r#"<i onclick="steal()">x</i>"#);
        assert_eq!(cleaned, "<i>x</i>");
    }
}
