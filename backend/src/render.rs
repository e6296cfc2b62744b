//! Server-side rendering of the prediction page.

use uuid::Uuid;

use crate::models::{City, Country, Field, FormOption, PredictionResult};
use crate::session::FormSession;

const TITLE: &str = "Earthquake Prediction System";
const DESCRIPTION: &str = "Enter parameters to predict earthquake characteristics";

/// Renders the full page for a session, or `None` while it is still
/// initializing.
pub fn render_session(id: Uuid, session: &FormSession) -> Option<String> {
    if !session.is_ready() {
        return None;
    }

    let form = session.form();
    let mut html = String::with_capacity(4096);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{TITLE}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n<body>\n\
         <div class=\"card\">\n<header>\n<h1>{TITLE}</h1>\n<p>{DESCRIPTION}</p>\n</header>\n\
         <form method=\"post\" action=\"/sessions/{id}\">\n<div class=\"grid\">\n"
    ));

    for field in Field::ALL {
        let value = form.get(field);
        match field {
            Field::Country => push_select::<Country>(&mut html, field, value),
            Field::City => push_select::<City>(&mut html, field, value),
            _ => push_input(&mut html, field, value),
        }
    }

    html.push_str("</div>\n<button type=\"submit\">Predict</button>\n</form>\n");

    if let Some(prediction) = session.prediction() {
        push_prediction(&mut html, prediction);
    }

    html.push_str("</div>\n</body>\n</html>\n");
    Some(html)
}

fn push_input(html: &mut String, field: Field, value: &str) {
    let name = field.name();
    html.push_str(&format!(
        "<div class=\"field\">\n<label for=\"{name}\">{label}</label>\n\
         <input id=\"{name}\" name=\"{name}\" placeholder=\"{placeholder}\" value=\"{value}\" required>\n</div>\n",
        label = field.label(),
        placeholder = field.placeholder(),
        value = escape(value),
    ));
}

fn push_select<O: FormOption>(html: &mut String, field: Field, value: &str) {
    let name = field.name();
    html.push_str(&format!(
        "<div class=\"field\">\n<label for=\"{name}\">{label}</label>\n\
         <select id=\"{name}\" name=\"{name}\">\n<option value=\"\">{placeholder}</option>\n",
        label = field.label(),
        placeholder = field.placeholder(),
    ));
    for option in O::ALL.iter().copied() {
        let selected = if option.id() == value { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{selected}>{}</option>\n",
            option.id(),
            option.label()
        ));
    }
    html.push_str("</select>\n</div>\n");
}

fn push_prediction(html: &mut String, prediction: &PredictionResult) {
    html.push_str(&format!(
        "<footer class=\"result\">\n\
         <p>Predicted Magnitude: {}</p>\n\
         <p>Expected Depth: {}</p>\n\
         <p>Probability of Occurrence: {}</p>\n</footer>\n",
        prediction.predicted_magnitude,
        prediction.expected_depth,
        escape(&prediction.probability_of_occurrence),
    ));
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
