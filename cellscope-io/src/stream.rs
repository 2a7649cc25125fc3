//! CrystFEL stream parser.
//!
//! A stream is a sequence of chunks, one per detector frame:
//!
//! ```text
//! ----- Begin chunk -----
//! Image filename: run12.h5
//! Event: //4
//! Peaks from peak search
//!   fs/px   ss/px (1/d)/nm^-1   Intensity  Panel
//!  123.45  234.56       1.23      456.78  q0a0
//! End of peak list
//! --- Begin crystal
//! astar = +0.1286 +0.0000 +0.0000 nm^-1
//! bstar = ...
//! cstar = ...
//! lattice_type = tetragonal
//! centering = P
//! unique_axis = c
//! Reflections measured after indexing
//!    h    k    l          I   sigma(I)       peak background  fs/px  ss/px panel
//!   -3    1   -3     130.70      37.26     346.00     115.78  879.9 1053.0 q0a1
//! End of reflections
//! --- End crystal
//! ----- End chunk -----
//! ```
//!
//! Problems are local to a record: a crystal without reciprocal vectors is
//! skipped, unreadable table rows are dropped, and missing lattice fields fall
//! back to `triclinic`, `P` and `?`.

use crate::Result;
use cellscope_core::{Crystal, LatticeLabel, PeakRecord};
use std::path::Path;
use std::str::FromStr;

const BEGIN_GEOMETRY: &str = "----- Begin geometry file -----";
const END_GEOMETRY: &str = "----- End geometry file -----";
const BEGIN_CHUNK: &str = "----- Begin chunk -----";
const END_CHUNK: &str = "----- End chunk -----";
const BEGIN_PEAKS: &str = "Peaks from peak search";
const END_PEAKS: &str = "End of peak list";
const BEGIN_CRYSTAL: &str = "--- Begin crystal";
const END_CRYSTAL: &str = "--- End crystal";
const BEGIN_REFLECTIONS: &str = "Reflections measured after indexing";
const END_REFLECTIONS: &str = "End of reflections";

/// A crystal and its post-indexing reflections.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedCrystal {
    pub crystal: Crystal,
    pub reflections: Vec<PeakRecord>,
}

/// A parsed crystal block.
#[derive(Debug, Clone, PartialEq)]
pub enum CrystalRecord {
    /// Every field was present.
    Complete(IndexedCrystal),
    /// Some lattice fields were missing or unreadable and were defaulted.
    Degraded {
        indexed: IndexedCrystal,
        /// Names of the defaulted fields.
        missing: Vec<&'static str>,
    },
}

impl CrystalRecord {
    /// The crystal and its reflections.
    #[must_use]
    pub fn indexed(&self) -> &IndexedCrystal {
        match self {
            CrystalRecord::Complete(indexed) | CrystalRecord::Degraded { indexed, .. } => indexed,
        }
    }

    /// The crystal.
    #[must_use]
    pub fn crystal(&self) -> &Crystal {
        &self.indexed().crystal
    }

    /// True if any field was defaulted.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, CrystalRecord::Degraded { .. })
    }
}

/// One frame of a stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub filename: String,
    pub event: Option<String>,
    /// Peaks from the peak search.
    pub peaks: Vec<PeakRecord>,
    pub crystals: Vec<CrystalRecord>,
}

impl Chunk {
    /// Search peaks followed by the reflections of every crystal.
    #[must_use]
    pub fn all_peaks(&self) -> Vec<PeakRecord> {
        self.peaks
            .iter()
            .chain(self.crystals.iter().flat_map(|c| c.indexed().reflections.iter()))
            .cloned()
            .collect()
    }
}

/// A parsed stream file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamFile {
    /// Geometry file text embedded in the stream header, if any.
    pub geometry: Option<String>,
    pub chunks: Vec<Chunk>,
    /// Crystal blocks dropped because their reciprocal basis was unusable.
    pub skipped: usize,
}

impl StreamFile {
    /// Parses stream text.
    ///
    /// # Errors
    /// Currently infallible for well-formed UTF-8; malformed records are
    /// skipped with a warning.
    pub fn parse(text: &str) -> Result<Self> {
        let mut stream = StreamFile::default();
        let mut chunk: Option<Chunk> = None;
        let mut crystal: Option<CrystalBlock> = None;
        let mut lines = text.lines().map(str::trim);

        while let Some(line) = lines.next() {
            match line {
                BEGIN_GEOMETRY => {
                    let body: Vec<&str> = lines.by_ref().take_while(|l| *l != END_GEOMETRY).collect();
                    stream.geometry = Some(body.join("\n"));
                }
                BEGIN_CHUNK => {
                    if let Some(unfinished) = chunk.replace(Chunk::default()) {
                        log::warn!("chunk {} not terminated", unfinished.filename);
                        stream.chunks.push(unfinished);
                    }
                }
                END_CHUNK => {
                    if let Some(done) = chunk.take() {
                        stream.chunks.push(done);
                    }
                }
                BEGIN_PEAKS => {
                    let peaks = read_table(&mut lines, END_PEAKS, parse_search_peak);
                    chunk.get_or_insert_with(Chunk::default).peaks.extend(peaks);
                }
                BEGIN_CRYSTAL => crystal = Some(CrystalBlock::default()),
                END_CRYSTAL => {
                    let current = chunk.get_or_insert_with(Chunk::default);
                    if let Some(block) = crystal.take() {
                        match block.finish(current) {
                            Some(record) => current.crystals.push(record),
                            None => stream.skipped += 1,
                        }
                    }
                }
                BEGIN_REFLECTIONS => {
                    let reflections = read_table(&mut lines, END_REFLECTIONS, parse_reflection);
                    if let Some(block) = crystal.as_mut() {
                        block.reflections.extend(reflections);
                    }
                }
                _ => {
                    if let Some(block) = crystal.as_mut() {
                        block.field(line);
                    } else if let (Some(current), Some((key, value))) =
                        (chunk.as_mut(), line.split_once(':'))
                    {
                        match key.trim() {
                            "Image filename" => current.filename = value.trim().to_string(),
                            "Event" => current.event = Some(value.trim().to_string()),
                            _ => {}
                        }
                    }
                }
            }
        }

        if let Some(unfinished) = chunk {
            log::warn!("chunk {} not terminated", unfinished.filename);
            stream.chunks.push(unfinished);
        }
        if stream.skipped > 0 {
            log::warn!("{} crystals skipped for missing reciprocal vectors", stream.skipped);
        }
        Ok(stream)
    }

    /// All crystals in stream order.
    pub fn crystals(&self) -> impl Iterator<Item = &Crystal> + '_ {
        self.records().map(CrystalRecord::crystal)
    }

    /// All crystal records in stream order.
    pub fn records(&self) -> impl Iterator<Item = &CrystalRecord> + '_ {
        self.chunks.iter().flat_map(|c| c.crystals.iter())
    }

    /// Owned copy of every crystal, for a selection session.
    #[must_use]
    pub fn population(&self) -> Vec<Crystal> {
        self.crystals().cloned().collect()
    }

    /// Number of crystals with defaulted fields.
    #[must_use]
    pub fn degraded(&self) -> usize {
        self.records().filter(|r| r.is_degraded()).count()
    }

    /// Finds a chunk by image filename and, optionally, event.
    #[must_use]
    pub fn chunk(&self, filename: &str, event: Option<&str>) -> Option<&Chunk> {
        self.chunks
            .iter()
            .find(|c| c.filename == filename && (event.is_none() || c.event.as_deref() == event))
    }
}

/// Reads and parses a stream file.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_stream<P: AsRef<Path>>(path: P) -> Result<StreamFile> {
    let text = std::fs::read_to_string(path)?;
    StreamFile::parse(&text)
}

fn read_table<'a, I, F>(lines: &mut I, end: &str, parse: F) -> Vec<PeakRecord>
where
    I: Iterator<Item = &'a str>,
    F: Fn(&[&str]) -> Option<PeakRecord>,
{
    let mut records = Vec::new();
    for line in lines.by_ref() {
        if line == end {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = fields.first() else {
            continue;
        };
        if first.parse::<f64>().is_err() {
            // Column header.
            continue;
        }
        match parse(&fields) {
            Some(record) => records.push(record),
            None => log::warn!("unreadable table row: {line:?}"),
        }
    }
    records
}

fn parse_search_peak(fields: &[&str]) -> Option<PeakRecord> {
    let [fs, ss, resolution, intensity, panel] = fields else {
        return None;
    };
    Some(PeakRecord::search(
        fs.parse().ok()?,
        ss.parse().ok()?,
        resolution.parse().ok()?,
        intensity.parse().ok()?,
        *panel,
    ))
}

fn parse_reflection(fields: &[&str]) -> Option<PeakRecord> {
    let [h, k, l, intensity, sigma, peak, background, fs, ss, panel] = fields else {
        return None;
    };
    Some(PeakRecord::reflection(
        (h.parse().ok()?, k.parse().ok()?, l.parse().ok()?),
        intensity.parse().ok()?,
        sigma.parse().ok()?,
        peak.parse().ok()?,
        background.parse().ok()?,
        fs.parse().ok()?,
        ss.parse().ok()?,
        *panel,
    ))
}

#[derive(Default)]
struct CrystalBlock {
    astar: Option<[f64; 3]>,
    bstar: Option<[f64; 3]>,
    cstar: Option<[f64; 3]>,
    lattice_type: Option<String>,
    centering: Option<String>,
    unique_axis: Option<String>,
    reflections: Vec<PeakRecord>,
}

impl CrystalBlock {
    fn field(&mut self, line: &str) {
        let Some((key, value)) = line.split_once('=') else {
            return;
        };
        let value = value.trim();
        match key.trim() {
            "astar" => self.astar = parse_vector(value),
            "bstar" => self.bstar = parse_vector(value),
            "cstar" => self.cstar = parse_vector(value),
            "lattice_type" => self.lattice_type = Some(value.to_string()),
            "centering" => self.centering = Some(value.to_string()),
            "unique_axis" => self.unique_axis = Some(value.to_string()),
            _ => {}
        }
    }

    fn finish(self, chunk: &Chunk) -> Option<CrystalRecord> {
        let name = match &chunk.event {
            Some(event) => format!("{} {} #{}", chunk.filename, event, chunk.crystals.len()),
            None => format!("{} #{}", chunk.filename, chunk.crystals.len()),
        };

        let (Some(astar), Some(bstar), Some(cstar)) = (self.astar, self.bstar, self.cstar) else {
            log::warn!("{name}: crystal without reciprocal lattice vectors, skipping");
            return None;
        };
        let Some(cell) = cell_from_reciprocal(astar, bstar, cstar) else {
            log::warn!("{name}: degenerate reciprocal lattice, skipping");
            return None;
        };

        let mut missing = Vec::new();
        let lattice_type = field_or_default(self.lattice_type, "lattice_type", &mut missing);
        let centering = field_or_default(self.centering, "centering", &mut missing);
        let unique_axis = field_or_default(self.unique_axis, "unique_axis", &mut missing);

        let indexed = IndexedCrystal {
            crystal: Crystal::new(
                name,
                cell,
                centering,
                LatticeLabel::new(lattice_type, unique_axis),
            ),
            reflections: self.reflections,
        };

        if missing.is_empty() {
            Some(CrystalRecord::Complete(indexed))
        } else {
            log::warn!(
                "{}: defaulted {}",
                indexed.crystal.name,
                missing.join(", ")
            );
            Some(CrystalRecord::Degraded { indexed, missing })
        }
    }
}

fn field_or_default<T: FromStr + Default>(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> T {
    match value.as_deref().map(str::parse::<T>) {
        Some(Ok(parsed)) => parsed,
        _ => {
            missing.push(field);
            T::default()
        }
    }
}

fn parse_vector(value: &str) -> Option<[f64; 3]> {
    let mut parts = value.split_whitespace().map(str::parse::<f64>);
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    Some([x, y, z])
}

fn dot(u: [f64; 3], v: [f64; 3]) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn angle_deg(u: [f64; 3], v: [f64; 3]) -> f64 {
    let cos = dot(u, v) / (dot(u, u).sqrt() * dot(v, v).sqrt());
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Real-space cell `[a, b, c, alfa, beta, gamma]` (Å, degrees) from
/// reciprocal basis vectors in nm^-1. `None` for a singular basis.
#[must_use]
pub fn cell_from_reciprocal(astar: [f64; 3], bstar: [f64; 3], cstar: [f64; 3]) -> Option<[f64; 6]> {
    let volume = dot(astar, cross(bstar, cstar));
    if !volume.is_finite() || volume.abs() < 1e-12 {
        return None;
    }
    let scale = |v: [f64; 3]| v.map(|x| x / volume);
    let a = scale(cross(bstar, cstar));
    let b = scale(cross(cstar, astar));
    let c = scale(cross(astar, bstar));

    let length = |v: [f64; 3]| dot(v, v).sqrt() * 10.0;
    Some([
        length(a),
        length(b),
        length(c),
        angle_deg(b, c),
        angle_deg(a, c),
        angle_deg(a, b),
    ])
}
