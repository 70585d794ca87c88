use crate::core::form_state::FormState;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replaces `{{key}}` placeholders. Keys `resolve` does not know stay as
/// literal text, braces included.
pub fn interpolate<F>(template: &str, resolve: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after_open[..end];
        match resolve(key) {
            Some(value) => out.push_str(value.as_str()),
            None => {
                out.push_str(OPEN);
                out.push_str(key);
                out.push_str(CLOSE);
            }
        }
        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// URL templates percent-encode every substituted value.
pub fn interpolate_url(template: &str, form: &FormState) -> String {
    interpolate(template, |key| {
        form.get(key)
            .map(|value| urlencoding::encode(value.template_text().as_str()).into_owned())
    })
}

/// Body templates substitute values verbatim.
pub fn interpolate_body(template: &str, form: &FormState) -> String {
    interpolate(template, |key| form.get(key).map(|value| value.template_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn form() -> FormState {
        let mut form = FormState::new();
        form.set("city", Value::text("São Paulo"));
        form.set("zip", Value::text("01000"));
        form.set("active", Value::Bool(false));
        form
    }

    #[test]
    fn url_values_are_percent_encoded() {
        let url = interpolate_url("https://api.test/geo?city={{city}}&zip={{zip}}", &form());
        assert_eq!(url, "https://api.test/geo?city=S%C3%A3o%20Paulo&zip=01000");
    }

    #[test]
    fn body_values_are_substituted_verbatim() {
        let body = interpolate_body(r#"{"zip": {{zip}}, "city": "{{city}}"}"#, &form());
        assert_eq!(body, r#"{"zip": 01000, "city": "São Paulo"}"#);
    }

    #[test]
    fn unknown_tokens_are_left_in_place() {
        let body = interpolate_body("{{missing}}-{{zip}}-{{unterminated", &form());
        assert_eq!(body, "{{missing}}-01000-{{unterminated");
    }

    #[test]
    fn unchecked_boxes_substitute_as_empty() {
        let url = interpolate_url("/flags?active={{active}}", &form());
        assert_eq!(url, "/flags?active=");
    }
}
