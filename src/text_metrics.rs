use fontdb::{Database, Family, ID, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Advance width of `text` in the first installed face of `font_family`.
///
/// `None` when no usable face is found; callers fall back to heuristics.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, bold)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
}

impl FaceKey {
    fn new(font_family: &str, bold: bool) -> Self {
        let trimmed = font_family.trim();
        let family = if trimmed.is_empty() {
            "sans-serif".to_string()
        } else {
            trimmed.to_string()
        };
        Self { family, bold }
    }

    fn cache_stem(&self) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<FaceKey, Option<Advances>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
        let key = FaceKey::new(font_family, bold);
        if !self.faces.contains_key(&key) {
            let advances = self.load(&key);
            if advances.is_none() {
                log::debug!("no font face for `{}`, using heuristic widths", key.family);
            }
            self.faces.insert(key.clone(), advances);
        }
        let advances = self.faces.get_mut(&key)?.as_mut()?;
        Some(advances.width(text, font_size))
    }

    fn load(&mut self, key: &FaceKey) -> Option<Advances> {
        if let Some(cached) = read_cached_font(key) {
            return Some(cached);
        }
        let id = self.query(key)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            if Face::parse(data, index).is_ok() {
                write_cached_font(key, data, index);
                loaded = Advances::new(data.to_vec(), index);
            }
        });
        loaded
    }

    fn query(&mut self, key: &FaceKey) -> Option<ID> {
        let names: Vec<&str> = key
            .family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        self.db.query(&Query {
            families: &families,
            weight: if key.bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        })
    }
}

/// Per-character horizontal advances of one face, in font units.
struct Advances {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii: [Option<u16>; 128],
    other: HashMap<char, Option<u16>>,
}

impl Advances {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = f32::from(face.units_per_em().max(1));
        let mut ascii = [None; 128];
        for (byte, slot) in ascii.iter_mut().enumerate() {
            *slot = glyph_advance(&face, byte as u8 as char);
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii,
            other: HashMap::new(),
        })
    }

    fn width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let missing = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars() {
            let advance = match ch {
                '\n' => continue,
                '\t' => self.advance(' ').map(|space| space.saturating_mul(4)),
                _ => self.advance(ch),
            };
            width += advance.map_or(missing, |units| f32::from(units) * scale);
        }
        width.max(0.0)
    }

    fn advance(&mut self, ch: char) -> Option<u16> {
        if ch.is_ascii() {
            return self.ascii[ch as usize];
        }
        if let Some(known) = self.other.get(&ch) {
            return *known;
        }
        let advance = Face::parse(&self.data, self.index)
            .ok()
            .and_then(|face| glyph_advance(&face, ch));
        self.other.insert(ch, advance);
        advance
    }
}

fn glyph_advance(face: &Face<'_>, ch: char) -> Option<u16> {
    let glyph = face.glyph_index(ch)?;
    face.glyph_hor_advance(glyph).filter(|advance| *advance > 0)
}

fn cache_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    Some(base.join("tube-timeline").join("font-cache"))
}

fn read_cached_font(key: &FaceKey) -> Option<Advances> {
    let dir = cache_dir()?;
    let stem = key.cache_stem();
    let bytes = fs::read(dir.join(format!("{stem}.font"))).ok()?;
    let index: u32 = fs::read_to_string(dir.join(format!("{stem}.meta")))
        .ok()?
        .trim()
        .parse()
        .ok()?;
    Advances::new(bytes, index)
}

fn write_cached_font(key: &FaceKey, data: &[u8], index: u32) {
    let Some(dir) = cache_dir() else {
        return;
    };
    let stem = key.cache_stem();
    let font_path = dir.join(format!("{stem}.font"));
    if font_path.exists() {
        return;
    }
    // Best effort: a failed write only costs a system font scan next run.
    if fs::create_dir_all(&dir).is_ok() && fs::write(&font_path, data).is_ok() {
        let _ = fs::write(dir.join(format!("{stem}.meta")), index.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 12.0, "sans-serif", false), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "sans-serif", false), Some(0.0));
    }

    #[test]
    fn measured_width_grows_with_text_when_available() {
        let short = measure_text_width("ab", 12.0, "sans-serif", false);
        let long = measure_text_width("abababab", 12.0, "sans-serif", false);
        if let (Some(short), Some(long)) = (short, long) {
            assert!(long > short);
        }
    }

    #[test]
    fn face_key_defaults_blank_family() {
        assert_eq!(FaceKey::new("  ", true).family, "sans-serif");
        assert_ne!(
            FaceKey::new("serif", true).cache_stem(),
            FaceKey::new("serif", false).cache_stem()
        );
    }
}
