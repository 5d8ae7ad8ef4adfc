/// Layout of a pest-management record into printable lines.
///
/// The formatter only decides line content and order. Coordinates, line spacing and
/// the binary document format belong to whatever renders the `GuideDocument`.
///
/// Output order is fixed: title, affected crop, scientific name, severity, the
/// description section, then one section per strategy category (organic, chemical,
/// prevention) with a bullet group per entry.
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::error::GuideError;
use crate::model::PestGuide;

const BULLET: &str = "• ";
const CONTINUATION: &str = "  ";

/// Strategy categories in output order: (record key, section heading).
const CATEGORIES: [(&str, &str); 3] = [
    ("organic", "Organic Solutions"),
    ("chemical", "Chemical Control"),
    ("prevention", "Prevention"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Title,
    Heading,
    Body,
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StyledLine {
    pub text: String,
    pub style: LineStyle,
}

/// Ordered, immutable sequence of styled lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct GuideDocument {
    lines: Vec<StyledLine>,
}

impl GuideDocument {
    pub fn lines(&self) -> &[StyledLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Split into pages of at most `lines_per_page` lines (minimum 1).
    pub fn paginate(&self, lines_per_page: usize) -> Vec<&[StyledLine]> {
        self.lines.chunks(lines_per_page.max(1)).collect()
    }

    /// Plain-text rendering with a blank line before every section heading.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
                if line.style == LineStyle::Heading {
                    out.push('\n');
                }
            }
            out.push_str(&line.text);
        }
        out
    }
}

/// Greedy word wrap. Breaks only at whitespace; a word longer than `max_width` is kept
/// whole on its own line. Width is counted in chars.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Format a loosely-typed record (typically straight out of `extract`).
///
/// Every field is required. A field that is absent, blank, or of the wrong JSON type
/// fails with `GuideError::MissingField`; nested fields are reported dotted, e.g.
/// `strategies.chemical`. A blank strategy entry fails as its category.
pub fn format(record: &Value, max_width: usize) -> Result<GuideDocument, GuideError> {
    let view = GuideView::from_value(record)?;
    view.validate()?;
    Ok(layout(&view, max_width))
}

/// Format an already-typed record, with the same blank-field checks as `format`.
pub fn format_pest_guide(
    guide: &PestGuide,
    max_width: usize,
) -> Result<GuideDocument, GuideError> {
    let view = GuideView {
        name: &guide.name,
        affected_crop: &guide.affected_crop,
        scientific_name: &guide.scientific_name,
        severity: guide.severity,
        description: &guide.description,
        categories: [
            guide.strategies.organic.iter().map(String::as_str).collect(),
            guide.strategies.chemical.iter().map(String::as_str).collect(),
            guide.strategies.prevention.iter().map(String::as_str).collect(),
        ],
    };
    view.validate()?;
    Ok(layout(&view, max_width))
}

struct GuideView<'a> {
    name: &'a str,
    affected_crop: &'a str,
    scientific_name: &'a str,
    severity: f64,
    description: &'a str,
    categories: [Vec<&'a str>; 3],
}

impl<'a> GuideView<'a> {
    /// Type checks only; blank values are rejected by `validate`.
    fn from_value(record: &'a Value) -> Result<Self, GuideError> {
        let name = str_field(record, "name")?;
        let affected_crop = str_field(record, "affectedCrop")?;
        let scientific_name = str_field(record, "scientificName")?;
        let severity = record
            .get("severity")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing("severity"))?;
        let description = str_field(record, "description")?;

        let strategies = record
            .get("strategies")
            .filter(|v| v.is_object())
            .ok_or_else(|| missing("strategies"))?;

        let mut categories: [Vec<&'a str>; 3] = Default::default();
        for (slot, (key, _)) in categories.iter_mut().zip(CATEGORIES) {
            *slot = str_list(strategies, key)?;
        }

        Ok(Self {
            name,
            affected_crop,
            scientific_name,
            severity,
            description,
            categories,
        })
    }

    fn validate(&self) -> Result<(), GuideError> {
        let fields = [
            ("name", self.name),
            ("affectedCrop", self.affected_crop),
            ("scientificName", self.scientific_name),
        ];
        for (path, value) in fields {
            if value.trim().is_empty() {
                return Err(missing(path));
            }
        }
        if !self.severity.is_finite() {
            return Err(missing("severity"));
        }
        if self.description.trim().is_empty() {
            return Err(missing("description"));
        }
        for (entries, (key, _)) in self.categories.iter().zip(CATEGORIES) {
            if entries.iter().any(|e| e.trim().is_empty()) {
                return Err(missing(&format!("strategies.{key}")));
            }
        }
        Ok(())
    }
}

fn missing(path: &str) -> GuideError {
    GuideError::MissingField(path.to_string())
}

fn str_field<'a>(record: &'a Value, key: &str) -> Result<&'a str, GuideError> {
    record
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(key))
}

fn str_list<'a>(strategies: &'a Value, key: &str) -> Result<Vec<&'a str>, GuideError> {
    let path = format!("strategies.{key}");
    strategies
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| missing(&path))?
        .iter()
        .map(|entry| entry.as_str().ok_or_else(|| missing(&path)))
        .collect()
}

fn layout(view: &GuideView<'_>, max_width: usize) -> GuideDocument {
    let mut lines = Vec::new();

    push_wrapped(&mut lines, view.name, max_width, LineStyle::Title);
    push_wrapped(
        &mut lines,
        &format!("Affected crop: {}", view.affected_crop),
        max_width,
        LineStyle::Body,
    );
    push_wrapped(
        &mut lines,
        &format!("Scientific name: {}", view.scientific_name),
        max_width,
        LineStyle::Body,
    );
    push_wrapped(
        &mut lines,
        &format!("Severity: {}", format_percentage(view.severity)),
        max_width,
        LineStyle::Body,
    );

    push_wrapped(&mut lines, "Description", max_width, LineStyle::Heading);
    push_wrapped(&mut lines, view.description, max_width, LineStyle::Body);

    let entry_width = max_width.saturating_sub(BULLET.chars().count()).max(1);
    for (entries, (_, title)) in view.categories.iter().zip(CATEGORIES) {
        push_wrapped(&mut lines, title, max_width, LineStyle::Heading);
        for entry in entries {
            for (i, text) in wrap_text(entry, entry_width).into_iter().enumerate() {
                let prefix = if i == 0 { BULLET } else { CONTINUATION };
                lines.push(StyledLine {
                    text: format!("{prefix}{text}"),
                    style: LineStyle::Bullet,
                });
            }
        }
    }

    GuideDocument { lines }
}

fn push_wrapped(lines: &mut Vec<StyledLine>, text: &str, max_width: usize, style: LineStyle) {
    lines.extend(
        wrap_text(text, max_width)
            .into_iter()
            .map(|text| StyledLine { text, style }),
    );
}

fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}%")
    } else {
        format!("{value}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn armyworm() -> Value {
        json!({
            "name": "Fall Armyworm",
            "scientificName": "Spodoptera frugiperda",
            "affectedCrop": "Maize",
            "severity": 70,
            "description": "Larvae feed in the whorl of young maize plants, leaving ragged holes and sawdust-like frass.",
            "strategies": {
                "organic": [
                    "Apply neem oil solution (30-50 ml per 10 liters of water) in the early morning.",
                    "Apply wood ash to the whorls of young plants."
                ],
                "chemical": ["Emamectin benzoate: 0.2-0.4 kg/ha"],
                "prevention": ["Practice crop rotation to break pest cycles"]
            }
        })
    }

    #[test]
    fn wrap_breaks_at_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn long_word_is_never_split() {
        let word = "a".repeat(25);
        assert_eq!(wrap_text(&word, 20), vec![word.clone()]);

        let exact = "b".repeat(20);
        assert_eq!(wrap_text(&exact, 20), vec![exact.clone()]);

        let lines = wrap_text(&format!("hi {word} there"), 20);
        assert_eq!(lines, vec!["hi".to_string(), word, "there".to_string()]);
    }

    #[test]
    fn wrap_preserves_word_sequence() {
        let paragraph = "Release natural predators like Trichogramma wasps that parasitize \
            armyworm eggs.   Apply Bacillus thuringiensis (Bt) as a biological insecticide.";
        for width in [1, 7, 15, 40, 200] {
            let rejoined = wrap_text(paragraph, width).join(" ");
            let expected: Vec<&str> = paragraph.split_whitespace().collect();
            assert_eq!(rejoined, expected.join(" "), "width {width}");
        }
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap_text("   \n ", 10).is_empty());
    }

    #[test]
    fn format_emits_sections_in_fixed_order() {
        let doc = format(&armyworm(), 40).unwrap();
        let lines = doc.lines();

        assert_eq!(lines[0].text, "Fall Armyworm");
        assert_eq!(lines[0].style, LineStyle::Title);
        assert_eq!(lines[1].text, "Affected crop: Maize");
        assert_eq!(lines[2].text, "Scientific name: Spodoptera frugiperda");
        assert_eq!(lines[3].text, "Severity: 70%");
        assert_eq!(
            lines[4],
            StyledLine {
                text: "Description".to_string(),
                style: LineStyle::Heading,
            }
        );

        let headings: Vec<&str> = lines
            .iter()
            .filter(|l| l.style == LineStyle::Heading)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(
            headings,
            vec!["Description", "Organic Solutions", "Chemical Control", "Prevention"]
        );

        let bullets: Vec<&StyledLine> =
            lines.iter().filter(|l| l.style == LineStyle::Bullet).collect();
        assert!(bullets[0].text.starts_with("• Apply neem oil"));
        assert!(bullets[1].text.starts_with("  "));
        assert!(lines.iter().all(|l| l.text.chars().count() <= 40));
    }

    #[test]
    fn missing_severity_is_named() {
        let mut record = armyworm();
        record.as_object_mut().unwrap().remove("severity");
        assert_eq!(
            format(&record, 80).unwrap_err(),
            GuideError::MissingField("severity".to_string())
        );
    }

    #[test]
    fn missing_nested_category_is_dotted() {
        let mut record = armyworm();
        record["strategies"]
            .as_object_mut()
            .unwrap()
            .remove("chemical");
        assert_eq!(
            format(&record, 80).unwrap_err(),
            GuideError::MissingField("strategies.chemical".to_string())
        );
    }

    #[test]
    fn blank_name_counts_as_missing() {
        let mut record = armyworm();
        record["name"] = json!("  ");
        assert_eq!(
            format(&record, 80).unwrap_err(),
            GuideError::MissingField("name".to_string())
        );
    }

    #[test]
    fn typed_and_untyped_records_format_identically() {
        let guide: PestGuide = serde_json::from_value(armyworm()).unwrap();
        assert_eq!(
            format_pest_guide(&guide, 50).unwrap(),
            format(&armyworm(), 50).unwrap()
        );
    }

    #[test]
    fn fractional_severity_keeps_decimals() {
        let mut record = armyworm();
        record["severity"] = json!(12.5);
        let doc = format(&record, 80).unwrap();
        assert_eq!(doc.lines()[3].text, "Severity: 12.5%");
    }

    #[test]
    fn headings_wrap_at_narrow_width() {
        let doc = format(&armyworm(), 10).unwrap();
        let headings: Vec<&str> = doc
            .lines()
            .iter()
            .filter(|l| l.style == LineStyle::Heading)
            .map(|l| l.text.as_str())
            .collect();
        assert!(headings.contains(&"Organic"));
        assert!(headings.contains(&"Solutions"));

        for line in doc.lines() {
            let words = line
                .text
                .strip_prefix(BULLET)
                .or_else(|| line.text.strip_prefix(CONTINUATION))
                .unwrap_or(&line.text);
            if words.contains(' ') {
                assert!(
                    line.text.chars().count() <= 10,
                    "multi-word line over width: {:?}",
                    line.text
                );
            }
        }
    }

    #[test]
    fn unbroken_description_stays_on_one_body_line() {
        for len in [30, 45] {
            let mut record = armyworm();
            let word = "x".repeat(len);
            record["description"] = json!(word.clone());
            let doc = format(&record, 30).unwrap();

            let lines = doc.lines();
            let at = lines.iter().position(|l| l.text == "Description").unwrap();
            assert_eq!(lines[at + 1].text, word);
            assert_eq!(lines[at + 1].style, LineStyle::Body);
            assert_eq!(lines[at + 2].style, LineStyle::Heading);
        }
    }

    #[test]
    fn blank_strategy_entry_is_missing_category() {
        let mut record = armyworm();
        record["strategies"]["organic"] = json!(["Spray neem oil", "  "]);
        assert_eq!(
            format(&record, 80).unwrap_err(),
            GuideError::MissingField("strategies.organic".to_string())
        );
    }

    #[test]
    fn typed_record_gets_blank_checks() {
        let mut guide: PestGuide = serde_json::from_value(armyworm()).unwrap();
        guide.scientific_name = String::new();
        assert_eq!(
            format_pest_guide(&guide, 80).unwrap_err(),
            GuideError::MissingField("scientificName".to_string())
        );

        let mut guide: PestGuide = serde_json::from_value(armyworm()).unwrap();
        guide.strategies.prevention.push(" ".to_string());
        assert_eq!(
            format_pest_guide(&guide, 80).unwrap_err(),
            GuideError::MissingField("strategies.prevention".to_string())
        );
    }

    #[test]
    fn paginate_and_plain_text() {
        let doc = format(&armyworm(), 80).unwrap();
        let pages = doc.paginate(5);
        assert_eq!(pages.iter().map(|p| p.len()).sum::<usize>(), doc.len());
        assert!(pages.iter().all(|p| p.len() <= 5));
        assert_eq!(doc.paginate(0).len(), doc.len());

        let text = doc.to_plain_text();
        assert!(text.starts_with("Fall Armyworm\nAffected crop: Maize"));
        assert!(text.contains("\n\nChemical Control\n• Emamectin benzoate"));
    }
}
