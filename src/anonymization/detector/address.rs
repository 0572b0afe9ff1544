//! Russian postal address recognizer
//!
//! An address is found in two steps. A *starter* anchors the address core:
//! a city, a typed street (`ул. Новая`, `северный пр 69`, `4 линия д.41`),
//! a bare street with a house number (`Кирочная 54К`), a marked house
//! number written before its street (`дом 12, ул. Ленина`), an apartment or
//! a metro station. The span is then greedily extended with *qualifiers*
//! that may follow the core: house, street, building, apartment, entrance,
//! floor, intercom, metro, walking distance and access directions.
//!
//! Spans never end on trailing whitespace or punctuation, because every
//! starter and qualifier ends on a content character.

use super::SpanRecognizer;
use crate::anonymization::models::{EntityType, Span, SpanSource};
use anyhow::{Context, Result};
use regex::{Captures, Regex};

/// Optional comma between address components
const SEP: &str = r"[ \t]*,?[ \t]*";

/// Street type words and abbreviations, followed by a dot or a word boundary
const STREET_TYPE: &str = r"(?i:улиц[аеуы]|ул|проспект[аеу]?|просп|пр-кт|пр-т|пр-д|пр|переул(?:ок|ке|ка)|пер|шоссе|ш|бульвар[аеу]?|б-р|набережн(?:ая|ой|ую)|наб|площад[ьи]|пл|проезд[аеу]?|тупик[аеу]?|алле[яиюе]|микрорайон[аеу]?|мкр)(?:\.|\b)";

/// Capitalized, possibly hyphenated word
const CAP_WORD: &str = r"[А-ЯЁ][а-яё]+(?:-[А-ЯЁа-яё][а-яё]*)*";

/// House number: `12`, `12/3`, `12-14`, `12Б`
const HOUSE_NUM: &str = r"[0-9]{1,4}(?:[/-][0-9]{1,4})?(?:[А-ЯЁа-яё]\b)?";

/// Words that end like a street adjective but never name a street
const NOT_STREET_NAMES: &[&str] = &[
    "какая",
    "какой",
    "какое",
    "такая",
    "такой",
    "такое",
    "эта",
    "наша",
    "ваша",
    "моя",
    "мой",
    "твоя",
    "другая",
    "другой",
    "другое",
    "любая",
    "любой",
    "каждая",
    "каждый",
    "первая",
    "последняя",
    "следующая",
    "большой",
];

/// Component kinds that make up an address span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    City,
    House,
    Street,
    Building,
    Apartment,
    Entrance,
    Floor,
    Intercom,
    Metro,
    Distance,
    Access,
    Landmark,
}

struct Starter {
    part: Part,
    regex: Regex,
    confidence: f32,
    /// Reject when the house number is followed by a unit ("7 лет")
    check_units: bool,
}

struct Qualifier {
    part: Part,
    regex: Regex,
    check_units: bool,
}

fn house() -> String {
    format!(r"(?:(?i:дом|д)\.?[ \t]*)?{HOUSE_NUM}")
}

fn street_name() -> String {
    format!(r"[А-ЯЁа-яё][а-яё]*(?:-[А-ЯЁа-яё][а-яё]*)*(?:[ \t]+{CAP_WORD})?")
}

fn metro_name() -> String {
    format!(
        r"(?:(?i:площадь|пл\.|проспект|пр\.|парк|улица|ул\.)[ \t]*)?{CAP_WORD}(?:[ \t]+{CAP_WORD}){{0,2}}"
    )
}

/// `дом 12`, `д. 5`; the marker is required
fn marked_house() -> String {
    format!(r"(?i:дом|д)\.?[ \t]*{HOUSE_NUM}")
}

/// Preposition joining a leading house to its street: `д. 5 по ул. Новой`
const STREET_PREPOSITION: &str = r"(?:(?i:по|на)[ \t]+)?";

/// `ул. Новая, д. 1`
fn typed_street_body() -> String {
    format!(
        r"{STREET_TYPE}[ \t]*(?P<name>{name})(?:{SEP}(?P<house>{house}))?",
        name = street_name(),
        house = house()
    )
}

/// `северный пр 69`, `Южное шоссе, д. 53`
fn adjective_street_body() -> String {
    format!(
        r"(?P<adj>[А-ЯЁа-яё][а-яё]*(?:-[а-яё]+)*(?:ый|ий|ой|ая|яя|ое|ее))[ \t]+{STREET_TYPE}(?:{SEP}(?P<house>{house}))?",
        house = house()
    )
}

/// `4 линия д.41`, `5-я линия В.О.`
fn line_body() -> String {
    format!(
        r"[0-9]{{1,2}}(?:-?(?:я|й|ая|ый|ое|е))?[ \t]+(?i:лини[яи]\b|лин\.)(?:[ \t]+(?:В\.?[ \t]?О\.?|П\.?[ \t]?С\.?))?(?:{SEP}(?P<house>{house}))?",
        house = house()
    )
}

fn starter(part: Part, pattern: &str, confidence: f32, check_units: bool) -> Result<Starter> {
    let regex = Regex::new(pattern)
        .with_context(|| format!("Invalid address starter pattern for {part:?}"))?;
    Ok(Starter {
        part,
        regex,
        confidence,
        check_units,
    })
}

fn qualifier(part: Part, body: &str, check_units: bool) -> Result<Qualifier> {
    let prefix = if part == Part::Street {
        STREET_PREPOSITION
    } else {
        ""
    };
    let regex = Regex::new(&format!("^{SEP}{prefix}{body}"))
        .with_context(|| format!("Invalid address qualifier pattern for {part:?}"))?;
    Ok(Qualifier {
        part,
        regex,
        check_units,
    })
}

/// Recognizes addresses with their qualifiers as a single span
pub struct AddressRecognizer {
    starters: Vec<Starter>,
    qualifiers: Vec<Qualifier>,
    unit_word: Regex,
    /// Lowercase word right after a number: "Главная 3 причины"
    noun_follows: Regex,
}

impl AddressRecognizer {
    pub fn new() -> Result<Self> {
        let apartment = r"(?i:квартира|кв\.?|офис|оф\.?)[ \t]*№?[ \t]*[0-9]{1,4}[А-ЯЁа-яё]?\b";
        let metro = format!(
            r"(?i:станция метро|метро|ст\.[ \t]*м\.)[ \t]+{}",
            metro_name()
        );

        let starters = vec![
            starter(
                Part::City,
                &format!(r"\b(?:[Гг]\.[ \t]*|[Гг]ород[ \t]+){CAP_WORD}"),
                0.7,
                false,
            )?,
            starter(Part::Street, &format!(r"\b{}", typed_street_body()), 0.85, false)?,
            starter(Part::Street, &format!(r"\b{}", adjective_street_body()), 0.85, false)?,
            starter(Part::Street, &format!(r"\b{}", line_body()), 0.85, false)?,
            starter(
                Part::Street,
                &format!(r"\b(?P<adj>[А-ЯЁ][а-яё]{{2,}}ая)[ \t]+(?P<house>{})", house()),
                0.65,
                true,
            )?,
            starter(Part::House, &format!(r"\b{}", marked_house()), 0.75, true)?,
            starter(Part::Apartment, &format!(r"\b{apartment}"), 0.7, false)?,
            starter(Part::Metro, &format!(r"\b{metro}"), 0.7, false)?,
        ];

        let qualifiers = vec![
            qualifier(Part::House, &marked_house(), true)?,
            qualifier(
                Part::Building,
                r"(?i:корпус|корп\.?|к\.?|строение|стр\.?|литера|лит\.?)[ \t]*[0-9]{1,3}[А-ЯЁа-яё]?\b",
                false,
            )?,
            qualifier(Part::Apartment, apartment, false)?,
            qualifier(
                Part::Entrance,
                r"(?:(?i:подъезд|парадная|парадной|под\.)[ \t]*№?[ \t]*[0-9]{1,2}|[0-9]{1,2}(?:-?(?:й|я|ий|ья))?[ \t]+(?i:подъезд|парадная))\b",
                false,
            )?,
            qualifier(
                Part::Floor,
                r"(?:(?i:этаж|эт\.)[ \t]*[0-9]{1,3}|[0-9]{1,3}(?:-?(?:й|м|ий|ом))?[ \t]+(?i:этаж))\b",
                false,
            )?,
            qualifier(
                Part::Intercom,
                r"(?i:код домофона|домофон)[ \t]*:?[ \t]*[0-9]{1,6}",
                false,
            )?,
            qualifier(
                Part::Metro,
                &format!(r"(?i:станция метро|метро|ст\.[ \t]*м\.|м\.)[ \t]*{}", metro_name()),
                false,
            )?,
            qualifier(
                Part::Distance,
                r"[0-9]{1,3}[ \t]+(?i:минут[аы]?|мин\.?)[ \t]+(?:(?i:пешком|ходьбы)[ \t]+)?(?i:от|до)[ \t]+(?i:метро|м\.|станции)",
                false,
            )?,
            qualifier(
                Part::Access,
                r"(?i:проезд\w*|проход\w*|вход\w*|въезд\w*)(?:[ \t]+(?i:и)[ \t]+(?i:проезд\w*|проход\w*|вход\w*|въезд\w*))?[ \t]+(?i:со|с|через|от)[ \t]+[А-ЯЁа-яё][а-яё]*(?:-[А-ЯЁа-яё][а-яё]*)*",
                false,
            )?,
            qualifier(Part::Street, &typed_street_body(), false)?,
            qualifier(Part::Street, &adjective_street_body(), false)?,
            qualifier(Part::Street, &line_body(), false)?,
        ];

        // Landmarks may follow a full stop: "от метро. Комсомола 7"
        let landmark = Regex::new(&format!(
            r"^[ \t]*[,.]?[ \t]*(?P<name>{CAP_WORD})[ \t]+(?P<house>{HOUSE_NUM})"
        ))
        .context("Invalid address landmark pattern")?;

        let mut qualifiers = qualifiers;
        qualifiers.push(Qualifier {
            part: Part::Landmark,
            regex: landmark,
            check_units: true,
        });

        let unit_word = Regex::new(
            r"^[ \t]*(?:(?i:лет|год\w*|час\w*|минут\w*|мин|человек\w*|чел|градус\w*|раз\w*|дн[еяи]\w*|день|недел\w*|месяц\w*|шт|штук\w*|руб\w*|тыс\w*|кг|км|процент\w*)\b|%)",
        )
        .context("Invalid unit word pattern")?;

        let noun_follows =
            Regex::new(r"^[ \t]+[а-яё]").context("Invalid following word pattern")?;

        Ok(Self {
            starters,
            qualifiers,
            unit_word,
            noun_follows,
        })
    }

    /// Whether a starter or qualifier match is a plausible address part
    fn accept(&self, caps: &Captures<'_>, following: &str, check_units: bool) -> bool {
        let house = caps.name("house");

        if let Some(adj) = caps.name("adj") {
            if NOT_STREET_NAMES.contains(&adj.as_str().to_lowercase().as_str()) {
                return false;
            }
        }

        if house.is_none() {
            let named = caps.name("adj").or_else(|| caps.name("name"));
            if let Some(word) = named {
                if !word.as_str().starts_with(|c: char| c.is_uppercase()) {
                    return false;
                }
            }
        }

        !(check_units && house.is_some() && self.unit_word.is_match(following))
    }

    fn allowed(part: Part, used: &[Part]) -> bool {
        if part != Part::Landmark && used.contains(&part) {
            return false;
        }
        match part {
            // A street may follow a city or a house written before it
            Part::Street => used.iter().all(|p| {
                matches!(p, Part::City | Part::House | Part::Building | Part::Apartment)
            }),
            Part::House => !used.contains(&Part::Street),
            Part::Landmark => {
                !used.contains(&Part::Landmark)
                    && matches!(
                        used.last(),
                        Some(Part::Metro | Part::Distance | Part::Access)
                    )
            }
            _ => true,
        }
    }

    /// Extend a core match with as many qualifiers as follow it
    ///
    /// Returns the new end offset and every part in the span, core first.
    fn extend(&self, text: &str, first: Part, mut end: usize) -> (usize, Vec<Part>) {
        let mut used = vec![first];

        'next: loop {
            let rest = &text[end..];
            for qualifier in &self.qualifiers {
                if !Self::allowed(qualifier.part, &used) {
                    continue;
                }
                let Some(caps) = qualifier.regex.captures(rest) else {
                    continue;
                };
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                if whole.is_empty() || !self.accept(&caps, &rest[whole.end()..], qualifier.check_units)
                {
                    continue;
                }
                end += whole.end();
                used.push(qualifier.part);
                continue 'next;
            }
            break;
        }

        (end, used)
    }

    fn starter_spans<'a>(&'a self, starter: &'a Starter, text: &'a str) -> impl Iterator<Item = Span> + 'a {
        starter.regex.captures_iter(text).filter_map(move |caps| {
            let whole = caps.get(0)?;
            if !self.accept(&caps, &text[whole.end()..], starter.check_units) {
                return None;
            }

            let mut confidence = starter.confidence;
            if starter.part == Part::Street && caps.name("house").is_none() {
                confidence -= 0.15;
            }

            let (end, parts) = self.extend(text, starter.part, whole.end());
            let added = parts.len() - 1;

            // A leading house number is only an address when its street follows
            if starter.part == Part::House && !parts.contains(&Part::Street) {
                return None;
            }
            // A bare street counted like a noun ("Главная 3 причины") needs a
            // qualifier to stand
            if starter.part == Part::Street
                && starter.check_units
                && added == 0
                && self.noun_follows.is_match(&text[whole.end()..])
            {
                return None;
            }

            let confidence = (confidence + 0.05 * added as f32).min(0.95);

            Span::from_text(
                text,
                whole.start(),
                end,
                EntityType::Address,
                confidence,
                SpanSource::Pattern,
            )
            .ok()
        })
    }
}

impl SpanRecognizer for AddressRecognizer {
    fn name(&self) -> &str {
        "address"
    }

    fn entity_type(&self) -> EntityType {
        EntityType::Address
    }

    fn recognize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Span> + 'a> {
        Box::new(
            self.starters
                .iter()
                .flat_map(move |starter| self.starter_spans(starter, text)),
        )
    }
}
