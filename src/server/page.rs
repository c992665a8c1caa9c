//! HTML rendering of the four charts.
//!
//! Figures are Plotly specs embedded as JSON and drawn in the browser.

use serde_json::{Value, json};

use crate::aggregation::{AggregateTable, Aggregates, Granularity};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const STYLESHEET: &str = "https://codepen.io/chriddyp/pen/bWLwgP.css";

const YEARLY_TITLE: &str = "Nombre d'objets créés par an";
const MONTHLY_TITLE: &str = "Nombre d'objets créés dans les 12 derniers mois";

/// Stacked bar chart with one trace per export.
pub fn figure(table: &AggregateTable) -> Value {
    let title = match table.granularity {
        Granularity::Year => YEARLY_TITLE,
        Granularity::Month => MONTHLY_TITLE,
    };
    let labels = table.labels();

    let traces: Vec<Value> = table
        .columns
        .iter()
        .map(|id| {
            json!({
                "type": "bar",
                "name": id.as_str(),
                "x": labels,
                "y": table.series(*id).unwrap_or_default(),
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "title": { "text": title },
            "barmode": "relative",
            "xaxis": { "type": "category" },
            "legend": { "title": { "text": "variable" } },
        },
    })
}

pub fn render_page(aggregates: &Aggregates) -> String {
    let graph = |id: &str, table: &AggregateTable| {
        // `</` inside the JSON would end the script element early.
        let spec = figure(table).to_string().replace("</", "<\\/");
        format!(
            "<div id=\"{id}\"></div>\n\
             <script>(function (fig) {{ Plotly.newPlot(\"{id}\", fig.data, fig.layout); }})({spec});</script>\n"
        )
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Données du catalogue data.gouv.fr</title>\n");
    html.push_str(&format!("<link rel=\"stylesheet\" href=\"{STYLESHEET}\">\n"));
    html.push_str(&format!("<script src=\"{PLOTLY_CDN}\"></script>\n"));
    html.push_str("</head>\n<body>\n<div>\n");
    html.push_str("<h1>Données du catalogue data.gouv.fr</h1>\n");
    html.push_str("<h2>Catalogue complet</h2>\n");
    html.push_str(&graph("year", &aggregates.yearly));
    html.push_str(&graph("month", &aggregates.monthly));
    html.push_str("<h2>Catalogue hors geo.data.gouv.fr</h2>\n");
    html.push_str(&graph("year_no_geo", &aggregates.yearly_no_geo));
    html.push_str(&graph("month_no_geo", &aggregates.monthly_no_geo));
    html.push_str("</div>\n</body>\n</html>\n");
    html
}
