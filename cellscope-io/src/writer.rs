//! Unit-cell file and composed-image writers.

use crate::Result;
use cellscope_core::{PeakRecord, UnitCell};
use ndarray::ArrayView2;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// File name the consensus cell is written to.
pub const UNIT_CELL_FILE: &str = "unit_cell.cell";

/// Renders a unit cell in CrystFEL cell-file format.
#[must_use]
pub fn format_unit_cell(cell: &UnitCell) -> String {
    let mut out = String::from("CrystFEL unit cell file version 1.0\n\n");
    // Writing into a String cannot fail.
    let _ = writeln!(out, "lattice_type = {}", cell.lattice_type);
    let _ = writeln!(out, "unique_axis = {}", cell.unique_axis);
    let _ = writeln!(out, "centering = {}", cell.centering);
    out.push('\n');
    let _ = writeln!(out, "a = {:.2} A", cell.a);
    let _ = writeln!(out, "b = {:.2} A", cell.b);
    let _ = writeln!(out, "c = {:.2} A", cell.c);
    let _ = writeln!(out, "al = {:.2} deg", cell.alfa);
    let _ = writeln!(out, "be = {:.2} deg", cell.beta);
    let _ = writeln!(out, "ga = {:.2} deg", cell.gamma);
    out
}

/// Writer for unit-cell files.
pub struct UnitCellWriter {
    writer: BufWriter<File>,
}

impl UnitCellWriter {
    /// Creates (or truncates) a unit-cell file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes the cell and flushes.
    ///
    /// # Errors
    /// Returns an error on write failure.
    pub fn write_cell(&mut self, cell: &UnitCell) -> Result<()> {
        self.writer.write_all(format_unit_cell(cell).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writer for composed images and their peak lists.
pub struct ImageWriter {
    writer: BufWriter<File>,
}

impl ImageWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes the image as row-major little-endian `f32`.
    ///
    /// # Errors
    /// Returns an error on write failure.
    pub fn write_image_binary(&mut self, image: ArrayView2<'_, f32>) -> Result<()> {
        for value in image {
            self.writer.write_all(&value.to_le_bytes())?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes peaks as CSV. Peaks without a composed position are skipped.
    ///
    /// # Errors
    /// Returns an error on write failure.
    pub fn write_peaks_csv(&mut self, peaks: &[PeakRecord]) -> Result<()> {
        writeln!(self.writer, "x,y,fs,ss,intensity,panel")?;
        for peak in peaks {
            let Some((x, y)) = peak.position else {
                continue;
            };
            writeln!(
                self.writer,
                "{},{},{},{},{},{}",
                x, y, peak.fs, peak.ss, peak.intensity, peak.panel
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellscope_core::{Centering, LatticeType, UniqueAxis};
    use ndarray::array;
    use tempfile::NamedTempFile;

    fn cell() -> UnitCell {
        UnitCell {
            lattice_type: LatticeType::Monoclinic,
            unique_axis: UniqueAxis::B,
            centering: Centering::C,
            a: 61.0,
            b: 90.456,
            c: 65.2,
            alfa: 90.0,
            beta: 118.0,
            gamma: 90.0,
        }
    }

    #[test]
    fn test_format_unit_cell() {
        let text = format_unit_cell(&cell());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "CrystFEL unit cell file version 1.0",
                "",
                "lattice_type = monoclinic",
                "unique_axis = b",
                "centering = C",
                "",
                "a = 61.00 A",
                "b = 90.46 A",
                "c = 65.20 A",
                "al = 90.00 deg",
                "be = 118.00 deg",
                "ga = 90.00 deg",
            ]
        );
    }

    #[test]
    fn test_write_cell() {
        let file = NamedTempFile::new().unwrap();
        UnitCellWriter::create(file.path()).unwrap().write_cell(&cell()).unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, format_unit_cell(&cell()));
    }

    #[test]
    fn test_write_image_binary() {
        let file = NamedTempFile::new().unwrap();
        let image = array![[1.0_f32, 2.0], [3.0, 4.0]];
        ImageWriter::create(file.path())
            .unwrap()
            .write_image_binary(image.view())
            .unwrap();
        let bytes = std::fs::read(file.path()).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[8..12], &3.0_f32.to_le_bytes());
    }

    #[test]
    fn test_write_peaks_csv() {
        let file = NamedTempFile::new().unwrap();
        let peaks = vec![
            PeakRecord::search(10.0, 20.0, 1.5, 300.0, "q0a0").with_position(110.5, 40.0),
            PeakRecord::search(1.0, 2.0, 1.5, 5.0, "q0a1"),
        ];
        ImageWriter::create(file.path())
            .unwrap()
            .write_peaks_csv(&peaks)
            .unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["x,y,fs,ss,intensity,panel", "110.5,40,10,20,300,q0a0"]);
    }
}
