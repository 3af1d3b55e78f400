//! JSON import and standalone HTML export of track data.

use crate::config::TimelineOptions;
use crate::error::ImportError;
use crate::model::Track;
use crate::render::escape_xml;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const EMBED_ID: &str = "tube-timeline-data";

static EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<script type="application/json" id="tube-timeline-data">(.*?)</script>"#)
        .unwrap()
});

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Embedded {
    data: Vec<Track>,
    #[serde(default)]
    options: TimelineOptions,
}

/// Parses a JSON array of tracks.
///
/// Nothing is returned unless every element is a well-formed track, so a
/// failed import never half-replaces the caller's data.
pub fn import_tracks(json: &str) -> Result<Vec<Track>, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };
    let tracks = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Track>(item).map_err(|source| ImportError::Track { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("imported {} tracks", tracks.len());
    Ok(tracks)
}

pub fn export_json(tracks: &[Track]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tracks)
}

/// Self-contained page with the rendered SVG inline and the data and options
/// embedded for re-import.
pub fn export_html(
    tracks: &[Track],
    options: &TimelineOptions,
    svg: &str,
) -> serde_json::Result<String> {
    let embedded = serde_json::to_string_pretty(&Embedded {
        data: tracks.to_vec(),
        options: options.clone(),
    })?;
    // Keep the payload from closing its own script element.
    let embedded = embedded.replace("</", "<\\/");
    let title = escape_xml(&options.header.title);
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{title}</title>\n  <style>body {{ margin: 0; font-family: sans-serif; }} svg {{ display: block; max-width: 100vw; height: auto; }}</style>\n</head>\n<body>\n{svg}\n<script type=\"application/json\" id=\"{EMBED_ID}\">\n{embedded}\n</script>\n</body>\n</html>\n"
    ))
}

/// Reads the data and options back out of a page written by [`export_html`].
pub fn import_html(html: &str) -> Result<(Vec<Track>, TimelineOptions), ImportError> {
    let payload = EMBED_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("<\\/", "</"))
        .ok_or(ImportError::MissingPayload)?;
    let value: Value = serde_json::from_str(&payload)?;
    let Some(data) = value.get("data") else {
        return Err(ImportError::MissingPayload);
    };
    let tracks = import_tracks(&data.to_string())?;
    let options = match value.get("options") {
        Some(options) => serde_json::from_value(options.clone())?,
        None => TimelineOptions::default(),
    };
    Ok((tracks, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Milestone, MilestoneKind};

    const SAMPLE: &str = r##"[
        {"track": "Piccadilly", "color": "#003688", "dates": [
            {"date": "01/01/2024", "name": "Kickoff", "type": "start"},
            {"date": "15/02/2024", "name": "Abstract due", "type": "abstract"},
            {"date": "01/06/2024", "name": "Done", "type": "end", "url": "https://example.org"}
        ]},
        {"track": "District", "color": "#00782A", "dates": []}
    ]"##;

    #[test]
    fn imports_track_arrays() {
        let tracks = import_tracks(SAMPLE).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].dates[1].kind.as_str(), "abstract");
        assert_eq!(tracks[0].dates[2].url.as_deref(), Some("https://example.org"));
        assert!(tracks[1].dates.is_empty());
    }

    #[test]
    fn rejects_non_arrays() {
        assert!(matches!(
            import_tracks(r#"{"track": "A"}"#),
            Err(ImportError::NotAnArray)
        ));
        assert!(matches!(import_tracks("[{"), Err(ImportError::Json(_))));
    }

    #[test]
    fn reports_the_bad_element() {
        let err = import_tracks(r#"[{"track": "A", "dates": []}, {"track": 7}]"#).unwrap_err();
        assert!(matches!(err, ImportError::Track { index: 1, .. }));
        assert!(err.to_string().starts_with("track 1 is malformed"));
    }

    #[test]
    fn html_export_embeds_svg_and_data() {
        let tracks = vec![
            Track::new("Circle", "#FFD300")
                .with_milestone(Milestone::new("01/03/2024", "</script> trap", MilestoneKind::Start)),
        ];
        let mut options = TimelineOptions::default();
        options.header.title = "Plan & <Roadmap>".to_string();
        let html = export_html(&tracks, &options, "<svg></svg>").unwrap();
        assert!(html.contains("<title>Plan &amp; &lt;Roadmap&gt;</title>"));
        assert!(html.contains("<svg></svg>"));
        assert_eq!(html.matches("</script>").count(), 1);

        let (back, back_options) = import_html(&html).unwrap();
        assert_eq!(back, tracks);
        assert_eq!(back_options, options);
    }

    #[test]
    fn html_without_embedded_data_is_rejected() {
        let err = import_html("<html><body><svg></svg></body></html>").unwrap_err();
        assert!(matches!(err, ImportError::MissingPayload));
        assert_eq!(err.to_string(), "page carries no embedded timeline data");

        let page = format!(
            "<script type=\"application/json\" id=\"{EMBED_ID}\">{{\"options\": {{}}}}</script>"
        );
        assert!(matches!(import_html(&page), Err(ImportError::MissingPayload)));
    }

    #[test]
    fn json_export_round_trips() {
        let tracks = import_tracks(SAMPLE).unwrap();
        let json = export_json(&tracks).unwrap();
        assert_eq!(import_tracks(&json).unwrap(), tracks);
    }
}
