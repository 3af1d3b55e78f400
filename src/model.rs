use crate::date::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashSet};

/// Non-endpoint milestone kinds. They all draw the same intermediate marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntermediateKind {
    Node,
    Submission,
    Review,
    Notification,
    Abstract,
    Invitation,
    CameraReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MilestoneKind {
    Start,
    End,
    Intermediate(IntermediateKind),
}

impl MilestoneKind {
    pub fn from_type(value: &str) -> Option<Self> {
        let kind = match value.trim() {
            "start" => Self::Start,
            "end" => Self::End,
            "" | "node" => Self::Intermediate(IntermediateKind::Node),
            "submission" => Self::Intermediate(IntermediateKind::Submission),
            "review" => Self::Intermediate(IntermediateKind::Review),
            "notification" => Self::Intermediate(IntermediateKind::Notification),
            "abstract" => Self::Intermediate(IntermediateKind::Abstract),
            "invitation" => Self::Intermediate(IntermediateKind::Invitation),
            "cameraReady" => Self::Intermediate(IntermediateKind::CameraReady),
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Intermediate(kind) => match kind {
                IntermediateKind::Node => "node",
                IntermediateKind::Submission => "submission",
                IntermediateKind::Review => "review",
                IntermediateKind::Notification => "notification",
                IntermediateKind::Abstract => "abstract",
                IntermediateKind::Invitation => "invitation",
                IntermediateKind::CameraReady => "cameraReady",
            },
        }
    }

    /// Start and end milestones anchor the track line and draw as handles.
    pub fn is_endpoint(self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

impl Default for MilestoneKind {
    fn default() -> Self {
        Self::Intermediate(IntermediateKind::Node)
    }
}

impl Serialize for MilestoneKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MilestoneKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_type(&raw).unwrap_or_else(|| {
            log::warn!("unknown milestone type `{raw}`, drawing it as an intermediate node");
            Self::default()
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MilestoneKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Milestone {
    pub fn new(date: impl Into<String>, name: impl Into<String>, kind: MilestoneKind) -> Self {
        Self {
            date: date.into(),
            name: name.into(),
            label: None,
            kind,
            url: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Text drawn next to the glyph: label, else name, else the raw date.
    pub fn display_label(&self) -> &str {
        if let Some(label) = self.label.as_deref()
            && !label.trim().is_empty()
        {
            return label;
        }
        if !self.name.trim().is_empty() {
            return &self.name;
        }
        &self.date
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

fn default_track_color() -> String {
    "#888888".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_track_color")]
    pub color: String,
    #[serde(default)]
    pub dates: Vec<Milestone>,
}

impl Track {
    pub fn new(track: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            track: track.into(),
            label: None,
            color: color.into(),
            dates: Vec::new(),
        }
    }

    pub fn with_milestone(mut self, milestone: Milestone) -> Self {
        self.dates.push(milestone);
        self
    }
}

/// One track after date parsing, with its resolved line endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEntry {
    /// Position in the caller's track list (legend order).
    pub source_index: usize,
    pub track: Track,
    /// Parsed date per entry of `track.dates`, same indices.
    pub parsed: Vec<Option<NaiveDate>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TrackEntry {
    fn new(source_index: usize, track: Track) -> Self {
        let parsed: Vec<Option<NaiveDate>> = track
            .dates
            .iter()
            .map(|milestone| {
                let date = milestone.parsed_date();
                if date.is_none() {
                    log::warn!(
                        "track `{}`: milestone `{}` has unparseable date `{}`, skipping it",
                        track.track,
                        milestone.name,
                        milestone.date
                    );
                }
                date
            })
            .collect();

        let first_of_kind = |kind: MilestoneKind| {
            track
                .dates
                .iter()
                .zip(&parsed)
                .find_map(|(m, date)| if m.kind == kind { *date } else { None })
        };
        let start = first_of_kind(MilestoneKind::Start)
            .or_else(|| parsed.iter().flatten().next().copied());
        let end = first_of_kind(MilestoneKind::End)
            .or_else(|| parsed.iter().rev().flatten().next().copied());

        Self {
            source_index,
            track,
            parsed,
            start,
            end,
        }
    }

    pub fn name(&self) -> &str {
        &self.track.track
    }

    /// Milestones with a parsed date, as `(index into dates, milestone, date)`.
    pub fn dated_milestones(&self) -> impl Iterator<Item = (usize, &Milestone, NaiveDate)> {
        self.track
            .dates
            .iter()
            .zip(&self.parsed)
            .enumerate()
            .filter_map(|(idx, (milestone, date))| date.map(|date| (idx, milestone, date)))
    }
}

/// Derived view of the caller's tracks, rebuilt at the start of every render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineModel {
    pub tracks: Vec<TrackEntry>,
    /// Every parsed date, deduplicated and ascending.
    pub all_dates: Vec<NaiveDate>,
    pub track_names: Vec<String>,
}

impl TimelineModel {
    /// Builds the model from a private copy of `tracks`.
    pub fn build(tracks: &[Track], sort_tracks: bool) -> Self {
        let mut entries: Vec<TrackEntry> = tracks
            .iter()
            .cloned()
            .enumerate()
            .map(|(idx, track)| TrackEntry::new(idx, track))
            .collect();

        if sort_tracks {
            // Stable: equal starts keep caller order, missing starts go last.
            entries.sort_by_key(|entry| (entry.start.is_none(), entry.start));
        }

        let all_dates: Vec<NaiveDate> = entries
            .iter()
            .flat_map(|entry| entry.parsed.iter().flatten().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let track_names: Vec<String> = entries.iter().map(|e| e.track.track.clone()).collect();
        let mut seen = HashSet::new();
        for name in &track_names {
            if !seen.insert(name.as_str()) {
                log::warn!("duplicate track name `{name}`: its milestones will share one lane");
            }
        }

        Self {
            tracks: entries,
            all_dates,
            track_names,
        }
    }

    /// `[min, max]` of every parsed date, `None` when nothing parsed.
    pub fn domain(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.all_dates.first()?, *self.all_dates.last()?))
    }

    pub fn track(&self, name: &str) -> Option<&TrackEntry> {
        self.tracks.iter().find(|entry| entry.name() == name)
    }

    /// Tracks in the caller's original order, for the legend.
    pub fn tracks_in_source_order(&self) -> Vec<&TrackEntry> {
        let mut ordered: Vec<&TrackEntry> = self.tracks.iter().collect();
        ordered.sort_by_key(|entry| entry.source_index);
        ordered
    }
}

/// Writes a committed drag date back into the caller's tracks.
///
/// The milestone is matched by kind and name, since its date is what changed.
/// Returns `false` when no matching track or milestone exists.
pub fn apply_milestone_date(
    tracks: &mut [Track],
    track_name: &str,
    kind: MilestoneKind,
    milestone_name: &str,
    new_date: &str,
) -> bool {
    let Some(track) = tracks.iter_mut().find(|t| t.track == track_name) else {
        return false;
    };
    let Some(milestone) = track
        .dates
        .iter_mut()
        .find(|m| m.kind == kind && m.name == milestone_name)
    else {
        return false;
    };
    milestone.date = new_date.to_string();
    true
}

/// Sorts a track's milestones by date, unparseable dates first.
pub fn sort_milestones(track: &mut Track) {
    track.dates.sort_by_key(Milestone::parsed_date);
}
