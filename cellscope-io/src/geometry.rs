//! CrystFEL geometry file parser.
//!
//! Only the fields needed to place panels and bad regions are read:
//!
//! ```text
//! ; comment
//! clen = 0.12             ; top-level keys are defaults for every panel
//! q0a0/min_fs = 0
//! q0a0/fs = +0.0052x -0.99998y
//! q0a0/corner_x = -443.5
//! badbeamstop/min_x = -10
//! ```
//!
//! Panel-space bad regions (given in `fs`/`ss` rather than `x`/`y`) are
//! skipped with a warning.

use crate::{Error, Result};
use cellscope_core::{BadRegion, DetectorGeometry, GeometryError, PanelGeometry};
use std::collections::HashMap;
use std::path::Path;

#[derive(Default)]
struct Section {
    name: String,
    fields: HashMap<String, String>,
}

/// Reads and parses a geometry file.
///
/// # Errors
/// Returns an error if the file cannot be read or a panel/bad region is
/// missing a required field.
pub fn read_geometry<P: AsRef<Path>>(path: P) -> Result<DetectorGeometry> {
    let text = std::fs::read_to_string(path)?;
    parse_geometry(&text)
}

/// Parses geometry file text.
///
/// # Errors
/// Returns [`Error::Syntax`] for lines that are not `key = value`, and a
/// geometry error for missing or unparseable fields.
pub fn parse_geometry(text: &str) -> Result<DetectorGeometry> {
    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::Syntax {
                line: number + 1,
                message: format!("expected `key = value`, found {line:?}"),
            });
        };
        let (key, value) = (key.trim(), value.trim().to_string());

        match key.split_once('/') {
            Some((name, field)) => {
                let slot = *index.entry(name.to_string()).or_insert_with(|| {
                    sections.push(Section {
                        name: name.to_string(),
                        ..Section::default()
                    });
                    sections.len() - 1
                });
                sections[slot].fields.insert(field.trim().to_string(), value);
            }
            None => {
                defaults.insert(key.to_string(), value);
            }
        }
    }

    let mut geometry = DetectorGeometry::default();
    for section in sections {
        if section.name.starts_with("bad") {
            if section.fields.contains_key("min_fs") || section.fields.contains_key("panel") {
                log::warn!("{}: panel-space bad regions are not supported, skipping", section.name);
                continue;
            }
            geometry.bad_regions.push(bad_region(&section)?);
        } else {
            geometry.panels.push(panel(&section, &defaults)?);
        }
    }

    if geometry.panels.is_empty() {
        return Err(GeometryError::NoPanels.into());
    }
    log::debug!(
        "geometry: {} panels, {} bad regions",
        geometry.panels.len(),
        geometry.bad_regions.len()
    );
    Ok(geometry)
}

fn lookup<'a>(
    section: &'a Section,
    defaults: &'a HashMap<String, String>,
    field: &'static str,
) -> std::result::Result<&'a str, GeometryError> {
    section
        .fields
        .get(field)
        .or_else(|| defaults.get(field))
        .map(String::as_str)
        .ok_or_else(|| GeometryError::MissingField {
            name: section.name.clone(),
            field,
        })
}

fn invalid(section: &Section, field: &str, value: &str) -> GeometryError {
    GeometryError::InvalidValue {
        name: section.name.clone(),
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn number<T: std::str::FromStr>(
    section: &Section,
    defaults: &HashMap<String, String>,
    field: &'static str,
) -> std::result::Result<T, GeometryError> {
    let value = lookup(section, defaults, field)?;
    value.parse().map_err(|_| invalid(section, field, value))
}

fn panel(section: &Section, defaults: &HashMap<String, String>) -> Result<PanelGeometry> {
    let fs = lookup(section, defaults, "fs")?;
    let ss = lookup(section, defaults, "ss")?;
    let (xfs, yfs) = parse_direction(fs).ok_or_else(|| invalid(section, "fs", fs))?;
    let (xss, yss) = parse_direction(ss).ok_or_else(|| invalid(section, "ss", ss))?;

    Ok(PanelGeometry {
        name: section.name.clone(),
        min_fs: number(section, defaults, "min_fs")?,
        min_ss: number(section, defaults, "min_ss")?,
        max_fs: number(section, defaults, "max_fs")?,
        max_ss: number(section, defaults, "max_ss")?,
        xfs,
        yfs,
        xss,
        yss,
        corner_x: number(section, defaults, "corner_x")?,
        corner_y: number(section, defaults, "corner_y")?,
    })
}

fn bad_region(section: &Section) -> Result<BadRegion> {
    let none = HashMap::new();
    Ok(BadRegion {
        name: section.name.clone(),
        min_x: number(section, &none, "min_x")?,
        max_x: number(section, &none, "max_x")?,
        min_y: number(section, &none, "min_y")?,
        max_y: number(section, &none, "max_y")?,
    })
}

/// Parses a direction such as `+0.0052x -0.99998y` into its `(x, y)`
/// components. A `z` term is accepted and ignored.
#[must_use]
pub fn parse_direction(text: &str) -> Option<(f64, f64)> {
    let mut spaced = String::with_capacity(text.len() + 4);
    let mut previous = ' ';
    for ch in text.chars() {
        if (ch == '+' || ch == '-') && matches!(previous, 'x' | 'y' | 'z') {
            spaced.push(' ');
        }
        spaced.push(ch);
        previous = ch;
    }

    let (mut x, mut y) = (0.0, 0.0);
    let mut seen = false;
    for token in spaced.split_whitespace() {
        let axis = token.chars().last()?;
        let coefficient = match &token[..token.len() - axis.len_utf8()] {
            "" | "+" => 1.0,
            "-" => -1.0,
            number => number.parse::<f64>().ok()?,
        };
        match axis {
            'x' => x += coefficient,
            'y' => y += coefficient,
            'z' => {}
            _ => return None,
        }
        seen = true;
    }
    seen.then_some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction("+0.0052x -0.99998y"), Some((0.0052, -0.99998)));
        assert_eq!(parse_direction("-x"), Some((-1.0, 0.0)));
        assert_eq!(parse_direction("+1.0y+0.5x"), Some((0.5, 1.0)));
        assert_eq!(parse_direction("1x +0z"), Some((1.0, 0.0)));
        assert_eq!(parse_direction("sideways"), None);
        assert_eq!(parse_direction(""), None);
    }

    #[test]
    fn test_missing_field_names_panel() {
        let err = parse_geometry("q0a0/min_fs = 0\nq0a0/fs = x\nq0a0/ss = y\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Geometry(GeometryError::MissingField { ref name, field: "min_ss" }) if name == "q0a0"
        ));
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = parse_geometry("; header\nthis is not valid\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }
}
