/*!
 * Advanced SubStation Alpha (ASS/SSA) format.
 *
 * Parsing is a line-oriented scan over `[Script Info]`, `[V4+ Styles]` and
 * `[Events]`. Each `Dialogue:` line is decoded on its own into either a
 * `SubtitleLine` or a `ParseWarning`, so one malformed event never sinks the
 * rest of the file. Karaoke `{\kNN}` tags become per-word timing.
 *
 * Export writes a minimal valid script with a single `Default` style and
 * re-synthesizes karaoke tags from word timing.
 */

use log::{debug, warn};
use std::path::Path;

use super::{FormatTag, ParseReport, ParseWarning, SubtitleParser, WarningKind};
use crate::app_config::AssConfig;
use crate::errors::{Result, SubtitleError, ValidationError};
use crate::karaoke::{clean_ass_text, escape_override_braces, reconstruct_words, synthesize_karaoke};
use crate::model::{SubtitleData, SubtitleLine};
use crate::style::{self, MetaMap, MetaValue};
use crate::timecode::{format_ass_time, parse_ass_time};

/// Number of comma separated fields in a `Dialogue:` line
const EVENT_FIELD_COUNT: usize = 10;

/// Standard v4+ style field order, used when a file has no `Format:` line
const DEFAULT_STYLE_FORMAT: [&str; 23] = [
    "name", "fontname", "fontsize", "primarycolour", "secondarycolour", "outlinecolour",
    "backcolour", "bold", "italic", "underline", "strikeout", "scalex", "scaley", "spacing",
    "angle", "borderstyle", "outline", "shadow", "alignment", "marginl", "marginr", "marginv",
    "encoding",
];

const STYLE_FORMAT_LINE: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT_LINE: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

// Normalized style keys beyond the shared ones in `style`
const PRIMARY_COLOUR: &str = "primary_colour";
const SECONDARY_COLOUR: &str = "secondary_colour";
const OUTLINE_COLOUR: &str = "outline_colour";
const BACK_COLOUR: &str = "back_colour";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ScriptInfo,
    Styles,
    Events,
    Other,
}

impl Section {
    fn from_header(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "script info" => Self::ScriptInfo,
            "v4+ styles" | "v4 styles" => Self::Styles,
            "events" => Self::Events,
            _ => Self::Other,
        }
    }
}

/// A dialogue line that survived decoding, with any word-level warnings
struct DecodedEvent {
    line: SubtitleLine,
    word_warnings: Vec<ParseWarning>,
}

/// A style row: its name plus either the normalized fields or the reason it failed
type StyleRow = (String, std::result::Result<MetaMap, String>);

/// Parser and exporter for ASS/SSA scripts
#[derive(Debug, Clone, Default)]
pub struct AssSubtitleParser {
    config: AssConfig,
}

impl AssSubtitleParser {
    /// Create a parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom settings
    pub fn with_config(config: AssConfig) -> Self {
        Self { config }
    }

    /// Decode the body of a `Dialogue:` line (text after the prefix)
    fn decode_event(body: &str, line_number: usize) -> std::result::Result<DecodedEvent, ParseWarning> {
        let fields: Vec<&str> = body.splitn(EVENT_FIELD_COUNT, ',').collect();
        if fields.len() < EVENT_FIELD_COUNT {
            return Err(ParseWarning::at_line(
                line_number,
                WarningKind::MalformedEvent,
                format!("expected {} fields, found {}", EVENT_FIELD_COUNT, fields.len()),
            ));
        }

        let parse_time = |raw: &str| {
            parse_ass_time(raw).map_err(|e| {
                ParseWarning::at_line(line_number, WarningKind::InvalidTimestamp, e.to_string())
            })
        };
        let start = parse_time(fields[1])?;
        let end = parse_time(fields[2])?;
        let raw_text = fields[9];

        let text = clean_ass_text(raw_text);
        if text.is_empty() {
            return Err(ParseWarning::at_line(
                line_number,
                WarningKind::EmptyText,
                "event has no text once tags are removed",
            ));
        }

        let karaoke = reconstruct_words(raw_text, start);
        let word_warnings = karaoke
            .skipped
            .iter()
            .map(|skipped| {
                ParseWarning::at_line(
                    line_number,
                    WarningKind::InvalidWord,
                    format!("skipped word '{}': {}", skipped.word, skipped.reason),
                )
            })
            .collect();

        let line = SubtitleLine::new(start, end, text, karaoke.words, MetaMap::new()).map_err(|e| {
            ParseWarning::at_line(line_number, WarningKind::InvalidEvent, e.to_string())
        })?;

        Ok(DecodedEvent { line, word_warnings })
    }

    /// Split a `Format:` line into lowercase field names
    fn parse_format_line(body: &str) -> Vec<String> {
        body.split(',')
            .map(|field| field.trim().to_lowercase())
            .filter(|field| !field.is_empty())
            .collect()
    }

    /// Decode the body of a `Style:` line into normalized style keys
    fn parse_style(body: &str, format: &[String]) -> std::result::Result<StyleRow, String> {
        let values: Vec<&str> = body.splitn(format.len().max(1), ',').map(str::trim).collect();
        let field = |key: &str| {
            format
                .iter()
                .position(|f| f == key)
                .and_then(|index| values.get(index).copied())
        };

        let name = field("name").unwrap_or_default().to_string();
        if name.is_empty() {
            return Err("style has no name".to_string());
        }
        if values.len() < format.len() {
            let reason = format!("expected {} fields, found {}", format.len(), values.len());
            return Ok((name, Err(reason)));
        }

        Ok((name.clone(), Self::normalize_style(&name, &field)))
    }

    fn normalize_style<'a>(
        name: &str,
        field: &dyn Fn(&str) -> Option<&'a str>,
    ) -> std::result::Result<MetaMap, String> {
        let number = |key: &str| -> std::result::Result<Option<f64>, String> {
            match field(key) {
                None => Ok(None),
                Some(raw) => raw
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| format!("field '{}' is not a number: '{}'", key, raw)),
            }
        };
        let flag = |key: &str| field(key).map(|raw| raw == "-1" || raw == "1");

        let mut map = MetaMap::new();
        map.insert("name".to_string(), name.into());

        if let Some(font) = field("fontname") {
            map.insert(style::FONT_FAMILY.to_string(), font.into());
        }
        if let Some(size) = number("fontsize")? {
            map.insert(style::FONT_SIZE.to_string(), numeric_value(size));
        }
        if let Some(bold) = flag("bold") {
            let weight = if bold { "bold" } else { "normal" };
            map.insert(style::FONT_WEIGHT.to_string(), weight.into());
        }
        if let Some(italic) = flag("italic") {
            map.insert("italic".to_string(), italic.into());
        }

        for (source, target) in [
            ("primarycolour", PRIMARY_COLOUR),
            ("secondarycolour", SECONDARY_COLOUR),
            ("outlinecolour", OUTLINE_COLOUR),
            ("backcolour", BACK_COLOUR),
        ] {
            if let Some(colour) = field(source) {
                map.insert(target.to_string(), colour.into());
            }
        }

        for (source, target) in [
            ("outline", "outline"),
            ("shadow", "shadow"),
            ("alignment", "alignment"),
            ("marginl", "margin_l"),
            ("marginr", "margin_r"),
            ("marginv", "margin_v"),
        ] {
            if let Some(value) = number(source)? {
                map.insert(target.to_string(), numeric_value(value));
            }
        }

        Ok(map)
    }

    /// `Default` style, else the first style; empty when that style failed to parse
    fn select_global_style(styles: Vec<StyleRow>) -> MetaMap {
        let chosen = match styles.iter().position(|(name, _)| name == "Default") {
            Some(index) => styles.into_iter().nth(index),
            None => styles.into_iter().next(),
        };

        match chosen {
            Some((_, Ok(map))) => map,
            Some((name, Err(reason))) => {
                warn!("Ignoring unreadable style '{}': {}", name, reason);
                MetaMap::new()
            }
            None => MetaMap::new(),
        }
    }

    /// Build the single `Style: Default` line from the global style
    fn style_line(&self, global_style: &MetaMap) -> String {
        let font = global_style
            .get(style::FONT_FAMILY)
            .and_then(MetaValue::as_str)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(self.config.default_font.as_str());
        let size = global_style
            .get(style::FONT_SIZE)
            .and_then(MetaValue::as_f64)
            .filter(|s| *s > 0.0)
            .unwrap_or(self.config.default_font_size as f64);
        let bold = match global_style.get(style::FONT_WEIGHT).and_then(MetaValue::as_str) {
            Some("bold") => -1,
            _ => 0,
        };
        let italic = match global_style.get("italic").and_then(MetaValue::as_bool) {
            Some(true) => -1,
            _ => 0,
        };

        let colour = |ass_key: &str, generic_key: &str, fallback: &str| {
            global_style
                .get(ass_key)
                .or_else(|| global_style.get(generic_key))
                .and_then(ass_colour)
                .unwrap_or_else(|| fallback.to_string())
        };
        let primary = colour(PRIMARY_COLOUR, style::TEXT_COLOR, "&H00FFFFFF");
        let secondary = colour(SECONDARY_COLOUR, SECONDARY_COLOUR, "&H000000FF");
        let outline_colour = colour(OUTLINE_COLOUR, style::OUTLINE_COLOR, "&H00000000");
        let back = colour(BACK_COLOUR, style::SHADOW_COLOR, "&H80000000");

        let number = |key: &str, fallback: f64| {
            global_style
                .get(key)
                .and_then(MetaValue::as_f64)
                .unwrap_or(fallback)
        };

        format!(
            "Style: Default,{},{},{},{},{},{},{},{},0,0,100,100,0,0,1,{},{},{},{},{},{},1",
            font,
            format_number(size),
            primary,
            secondary,
            outline_colour,
            back,
            bold,
            italic,
            format_number(number("outline", 2.0)),
            format_number(number("shadow", 0.0)),
            format_number(number("alignment", 2.0)),
            format_number(number("margin_l", 10.0)),
            format_number(number("margin_r", 10.0)),
            format_number(number("margin_v", 10.0)),
        )
    }

    /// Dialogue text for one line: karaoke runs when words exist, plain text otherwise
    fn event_text(line: &SubtitleLine, index: usize) -> Result<String> {
        if line.text.contains(['{', '}']) {
            warn!("Line {} contains override braces, writing them as fullwidth lookalikes", index);
        }

        let text = if line.words.is_empty() {
            escape_override_braces(&line.text).into_owned()
        } else {
            if !line.words_match_text() {
                debug!("Line {} has text outside its timed words, keeping it untimed", index);
            }
            synthesize_karaoke(line.start_time, &line.text, &line.words).map_err(|e| match e {
                SubtitleError::Validation { context, source } => {
                    SubtitleError::validation(format!("line {}, {}", index, context), source)
                }
                other => other,
            })?
        };
        Ok(text.replace("\r\n", "\\N").replace('\n', "\\N"))
    }
}

// @converts: float to integer form when whole, for ASS numeric fields
fn numeric_value(value: f64) -> MetaValue {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        MetaValue::Integer(value as i64)
    } else {
        MetaValue::Number(value)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// ASS colour string from either a raw `&H...` value or an `[r, g, b, a]` list
fn ass_colour(value: &MetaValue) -> Option<String> {
    match value {
        MetaValue::Text(raw) if raw.trim().starts_with("&H") => Some(raw.trim().to_string()),
        MetaValue::List(parts) if parts.len() == 3 || parts.len() == 4 => {
            let channel = |i: usize| parts.get(i).and_then(MetaValue::as_i64).map(|v| v.clamp(0, 255));
            let (r, g, b) = (channel(0)?, channel(1)?, channel(2)?);
            let alpha = if parts.len() == 4 { channel(3)? } else { 255 };
            // ASS alpha is inverted: 00 is opaque
            Some(format!("&H{:02X}{:02X}{:02X}{:02X}", 255 - alpha, b, g, r))
        }
        _ => None,
    }
}

impl SubtitleParser for AssSubtitleParser {
    fn format(&self) -> FormatTag {
        FormatTag::Ass
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".ass", ".ssa"]
    }

    fn parse_str(&self, content: &str, source: &Path) -> Result<ParseReport> {
        let mut section = Section::Other;
        let mut metadata = MetaMap::new();
        let mut style_format: Vec<String> = DEFAULT_STYLE_FORMAT.iter().map(|f| f.to_string()).collect();
        let mut styles: Vec<StyleRow> = Vec::new();
        let mut lines = Vec::new();
        let mut warnings = Vec::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = Section::from_header(&line[1..line.len() - 1]);
                continue;
            }

            match section {
                Section::ScriptInfo => {
                    if let Some((key, value)) = line.split_once(':') {
                        metadata.insert(key.trim().to_string(), value.trim().into());
                    }
                }
                Section::Styles => {
                    if let Some(body) = line.strip_prefix("Format:") {
                        let format = Self::parse_format_line(body);
                        if !format.is_empty() {
                            style_format = format;
                        }
                    } else if let Some(body) = line.strip_prefix("Style:") {
                        match Self::parse_style(body, &style_format) {
                            Ok(row) => {
                                if let Err(reason) = &row.1 {
                                    warnings.push(ParseWarning::at_line(
                                        line_number,
                                        WarningKind::InvalidStyle,
                                        format!("style '{}': {}", row.0, reason),
                                    ));
                                }
                                styles.push(row);
                            }
                            Err(reason) => warnings.push(ParseWarning::at_line(
                                line_number,
                                WarningKind::InvalidStyle,
                                reason,
                            )),
                        }
                    }
                }
                Section::Events => {
                    if let Some(body) = line.strip_prefix("Dialogue:") {
                        match Self::decode_event(body, line_number) {
                            Ok(decoded) => {
                                warnings.extend(decoded.word_warnings);
                                lines.push(decoded.line);
                            }
                            Err(warning) => {
                                if warning.kind == WarningKind::EmptyText {
                                    debug!("Dropping empty event at line {} of {}", line_number, source.display());
                                } else {
                                    warn!("Dropping event at line {} of {}: {}", line_number, source.display(), warning.message);
                                }
                                warnings.push(warning);
                            }
                        }
                    }
                }
                Section::Other => {}
            }
        }

        let global_style = Self::select_global_style(styles);
        let data = SubtitleData::new(lines, global_style, metadata);
        Ok(ParseReport::new(data, warnings))
    }

    fn export_to_string(&self, data: &SubtitleData, _destination: &Path) -> Result<String> {
        let mut out = vec![
            "[Script Info]".to_string(),
            format!("Title: {}", self.config.title),
            "ScriptType: v4.00+".to_string(),
            "WrapStyle: 0".to_string(),
            "ScaledBorderAndShadow: yes".to_string(),
            format!("PlayResX: {}", self.config.play_res_x),
            format!("PlayResY: {}", self.config.play_res_y),
            String::new(),
            "[V4+ Styles]".to_string(),
            STYLE_FORMAT_LINE.to_string(),
            self.style_line(&data.global_style),
            String::new(),
            "[Events]".to_string(),
            EVENT_FORMAT_LINE.to_string(),
        ];

        for (index, line) in data.lines.iter().enumerate() {
            if !(line.end_time > line.start_time) || line.start_time < 0.0 {
                return Err(SubtitleError::validation(
                    format!("line {}", index),
                    ValidationError::InvalidTimeRange {
                        start: line.start_time,
                        end: line.end_time,
                    },
                ));
            }

            out.push(format!(
                "Dialogue: 0,{},{},Default,,0,0,0,,{}",
                format_ass_time(line.start_time),
                format_ass_time(line.end_time),
                Self::event_text(line, index)?
            ));
        }

        let mut content = out.join("\n");
        content.push('\n');
        Ok(content)
    }
}
