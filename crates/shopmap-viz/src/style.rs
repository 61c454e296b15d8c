//! Marker, popup, and base-map styling.

use shopmap_core::ShopRecord;

use crate::host::{MarkerIcon, MarkerSpec, StyleRule, Visibility};

pub const CHECKED_IN_COLOR: &str = "#9333ea";
pub const PENDING_COLOR: &str = "#dc2626";

pub const CHECKED_IN_LABEL: &str = "เช็คอินแล้ว";
pub const PENDING_LABEL: &str = "รอดำเนินการ";

#[must_use]
pub fn status_color(checked_in: bool) -> &'static str {
    if checked_in {
        CHECKED_IN_COLOR
    } else {
        PENDING_COLOR
    }
}

#[must_use]
pub fn status_label(checked_in: bool) -> &'static str {
    if checked_in {
        CHECKED_IN_LABEL
    } else {
        PENDING_LABEL
    }
}

/// Hide POI and transit labels; keep their icons.
#[must_use]
pub fn clean_map_styles() -> Vec<StyleRule> {
    [
        ("poi", "labels.text"),
        ("poi.business", "labels"),
        ("transit", "labels"),
        ("transit.station", "labels"),
    ]
    .into_iter()
    .map(|(feature_type, element_type)| StyleRule {
        feature_type: feature_type.to_string(),
        element_type: element_type.to_string(),
        visibility: Visibility::Off,
    })
    .collect()
}

#[must_use]
pub fn marker_spec(record: &ShopRecord) -> MarkerSpec {
    MarkerSpec {
        position: record.position,
        title: record.name.clone(),
        icon: MarkerIcon {
            fill_color: status_color(record.checked_in),
            fill_opacity: 1.0,
            stroke_color: "#ffffff",
            stroke_weight: 3.0,
            scale: 12.0,
        },
        popup_html: popup_html(record),
    }
}

/// Detail card: name, address, and a status badge in the marker colour.
#[must_use]
pub fn popup_html(record: &ShopRecord) -> String {
    let color = status_color(record.checked_in);
    format!(
        concat!(
            r#"<div style="min-width: 150px; padding: 8px; font-family: system-ui;">"#,
            r#"<h3 style="font-weight: bold; font-size: 16px; margin: 0 0 4px 0; color: #1a1a1a;">{name}</h3>"#,
            r#"<div style="color: #666; font-size: 12px; margin-bottom: 8px;">{address}</div>"#,
            r#"<span style="display: inline-block; padding: 4px 12px; border-radius: 12px; font-size: 12px; font-weight: 500; color: white; background-color: {color};">{label}</span>"#,
            "</div>"
        ),
        name = escape_html(&record.name),
        address = escape_html(&record.address),
        color = color,
        label = status_label(record.checked_in),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
