//! cellscope command-line interface.
//!
//! Composes detector images from CrystFEL geometry, and curates crystal
//! populations from stream files into a consensus unit cell.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::too_many_lines
)]

use cellscope_cell::{
    BinningConfig, ConsensusBuilder, ConsensusConfig, ConsensusError, SelectionSession,
};
use cellscope_core::{CellParameter, DetectorGeometry, PeakRecord};
use cellscope_detector::{CenterOffset, ComposeConfig, ImageComposer};
use cellscope_io::{
    parse_geometry, read_geometry, read_stream, ImageWriter, RawImageReader, StreamFile,
    UnitCellWriter, UNIT_CELL_FILE,
};
use clap::{Args, Parser, Subcommand};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] cellscope_io::Error),

    #[error("Detector error: {0}")]
    Detector(#[from] cellscope_detector::DetectorError),

    #[error("Consensus not built: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

/// Detector image composition and unit-cell curation for serial crystallography.
#[derive(Parser)]
#[command(name = "cellscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the detector geometry comes from.
#[derive(Args)]
struct GeometrySource {
    /// CrystFEL geometry file
    #[arg(short, long)]
    geometry: Option<PathBuf>,

    /// Stream file whose embedded geometry is used when --geometry is absent
    #[arg(short, long)]
    stream: Option<PathBuf>,
}

impl GeometrySource {
    fn load(&self) -> Result<(DetectorGeometry, Option<StreamFile>)> {
        let stream = self.stream.as_deref().map(read_stream).transpose()?;
        let geometry = match (&self.geometry, &stream) {
            (Some(path), _) => read_geometry(path)?,
            (None, Some(stream)) => {
                let text = stream.geometry.as_deref().ok_or_else(|| {
                    CliError::Usage("stream has no embedded geometry, pass --geometry".into())
                })?;
                parse_geometry(text)?
            }
            (None, None) => return Err(CliError::Usage("pass --geometry or --stream".into())),
        };
        Ok((geometry, stream))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a raw detector image into a single composed image
    Compose {
        #[command(flatten)]
        source: GeometrySource,

        /// Raw little-endian f32 source image
        #[arg(short, long)]
        image: PathBuf,

        /// Source image rows (default: from geometry)
        #[arg(long)]
        rows: Option<usize>,

        /// Source image columns (default: from geometry)
        #[arg(long)]
        cols: Option<usize>,

        /// Image filename of the stream chunk whose peaks are overlaid
        #[arg(long, requires = "stream")]
        frame: Option<String>,

        /// Event of the stream chunk whose peaks are overlaid
        #[arg(long, requires = "frame")]
        event: Option<String>,

        /// Composed image side length (default: fitted to panel placements)
        #[arg(long)]
        size: Option<usize>,

        /// Beam-centre shift along X in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        center_x: i64,

        /// Beam-centre shift along Y in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        center_y: i64,

        /// Output image path (raw little-endian f32)
        #[arg(short, long)]
        output: PathBuf,

        /// Output CSV of peaks in composed-image coordinates
        #[arg(long)]
        peaks_csv: Option<PathBuf>,
    },

    /// Select crystals by cell-parameter regions and derive a consensus cell
    Cell {
        /// Input stream file
        stream: PathBuf,

        /// Region on one parameter, e.g. `a=60:62` or `beta=117:119` (repeatable)
        #[arg(short, long = "region", value_parser = parse_region)]
        regions: Vec<(CellParameter, f64, f64)>,

        /// Initial histogram bin count
        #[arg(long, default_value_t = BinningConfig::default().initial_bins)]
        bins: usize,

        /// Double the bin count this many times
        #[arg(long, default_value = "0")]
        finer: u32,

        /// Halve the bin count this many times
        #[arg(long, default_value = "0")]
        coarser: u32,

        /// Minimum share of the majority centering
        #[arg(long, default_value_t = ConsensusConfig::default().centering_threshold)]
        centering_threshold: f64,

        /// Unit-cell output file
        #[arg(short, long, default_value = UNIT_CELL_FILE)]
        output: PathBuf,

        /// Print the consensus as JSON
        #[arg(long)]
        json: bool,

        /// Print per-parameter histograms
        #[arg(long)]
        histograms: bool,
    },

    /// Show panel placements and optionally locate a composed-image pixel
    Info {
        #[command(flatten)]
        source: GeometrySource,

        /// Composed image side length (default: fitted to panel placements)
        #[arg(long)]
        size: Option<usize>,

        /// Composed-image pixel `x,y` to map back to panel coordinates
        #[arg(long, value_parser = parse_point)]
        locate: Option<(f64, f64)>,

        /// Print panel placements as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_region(text: &str) -> std::result::Result<(CellParameter, f64, f64), String> {
    let (name, range) = text
        .split_once('=')
        .ok_or_else(|| format!("expected `parameter=lo:hi`, found {text:?}"))?;
    let parameter: CellParameter = name.parse().map_err(|e| format!("{e}"))?;
    let (lo, hi) = range
        .split_once(':')
        .ok_or_else(|| format!("expected `lo:hi`, found {range:?}"))?;
    let lo: f64 = lo.trim().parse().map_err(|e| format!("{lo:?}: {e}"))?;
    let hi: f64 = hi.trim().parse().map_err(|e| format!("{hi:?}: {e}"))?;
    Ok((parameter, lo, hi))
}

fn parse_point(text: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, found {text:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("{x:?}: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("{y:?}: {e}"))?;
    Ok((x, y))
}

fn compose_config(size: Option<usize>, center: CenterOffset) -> ComposeConfig {
    let config = ComposeConfig::new().with_center(center);
    match size {
        Some(side) => config.with_image_size(side, side),
        None => config,
    }
}

fn chunk_peaks(stream: Option<&StreamFile>, frame: Option<&str>, event: Option<&str>) -> Result<Vec<PeakRecord>> {
    let (Some(stream), Some(frame)) = (stream, frame) else {
        return Ok(Vec::new());
    };
    stream
        .chunk(frame, event)
        .map(cellscope_io::Chunk::all_peaks)
        .ok_or_else(|| CliError::Usage(format!("no chunk for frame {frame}")))
}

fn print_histograms(session: &SelectionSession) {
    for dimension in session.dimensions() {
        let histogram = dimension.histogram();
        let (lo, hi) = dimension.range();
        let region = dimension
            .region()
            .map_or_else(|| "none".to_string(), |r| format!("{:.2}..{:.2}", r.lo, r.hi));
        println!(
            "{} [{:.2}, {:.2}] {} bins, region {}",
            dimension.parameter(),
            lo,
            hi,
            histogram.bins(),
            region
        );

        let included = histogram.total_included_counts();
        let peak = included.iter().copied().max().unwrap_or(0).max(1);
        for (i, count) in included.iter().enumerate() {
            if *count == 0 && histogram.excluded_counts[i] == 0 {
                continue;
            }
            let bar = "#".repeat(count * 40 / peak);
            println!(
                "  {:>10.3} {:>6} {:>6} {}",
                histogram.edges[i], count, histogram.excluded_counts[i], bar
            );
        }
    }
}

fn write_cell(path: &Path, cell: &cellscope_core::UnitCell) -> Result<()> {
    UnitCellWriter::create(path)?.write_cell(cell)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            source,
            image,
            rows,
            cols,
            frame,
            event,
            size,
            center_x,
            center_y,
            output,
            peaks_csv,
        } => {
            let (geometry, stream) = source.load()?;
            let (default_rows, default_cols) = geometry.source_shape();
            let rows = rows.unwrap_or(default_rows);
            let cols = cols.unwrap_or(default_cols);

            let raw = RawImageReader::open(&image)?.read(rows, cols)?;
            let peaks = chunk_peaks(stream.as_ref(), frame.as_deref(), event.as_deref())?;

            let config = compose_config(size, CenterOffset::new(center_x, center_y));
            let composer = ImageComposer::new(geometry, config)?;
            let (fit_rows, fit_cols) = composer.image_size();
            log::debug!("Composing onto {fit_rows}x{fit_cols} canvas");
            let composed = composer.compose(raw.view(), &peaks)?;

            ImageWriter::create(&output)?.write_image_binary(composed.data.view())?;
            if let Some(path) = &peaks_csv {
                ImageWriter::create(path)?.write_peaks_csv(&composed.peaks)?;
            }

            let (out_rows, out_cols) = composed.data.dim();
            println!(
                "Composed {} panels into {}x{} image: {}",
                composed.panels.len(),
                out_rows,
                out_cols,
                output.display()
            );
            println!("Bad regions: {}", composed.bad_regions.len());
            println!("Peaks: {}", composed.peaks.len());
        }

        Commands::Cell {
            stream,
            regions,
            bins,
            finer,
            coarser,
            centering_threshold,
            output,
            json,
            histograms,
        } => {
            let stream = read_stream(&stream)?;
            let population = stream.population();
            log::info!(
                "{} crystals ({} degraded, {} skipped)",
                population.len(),
                stream.degraded(),
                stream.skipped
            );

            let binning = BinningConfig::default().with_initial_bins(bins);
            let mut session = SelectionSession::new(population, binning);
            for (parameter, lo, hi) in regions {
                session.set_region(parameter, lo, hi);
            }
            for _ in 0..finer {
                session.increase_resolution();
            }
            for _ in 0..coarser {
                session.decrease_resolution();
            }

            println!(
                "Included: {}, excluded: {}",
                session.included().len(),
                session.excluded().len()
            );
            if histograms {
                print_histograms(&session);
            }

            let builder = ConsensusBuilder::with_config(
                ConsensusConfig::new().with_centering_threshold(centering_threshold),
            );
            let consensus = builder.build_for_session(&session)?;

            write_cell(&output, &consensus.cell)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&consensus)?);
            } else {
                let cell = consensus.cell;
                println!(
                    "{} {} ({}) from {} crystals",
                    cell.lattice_type, cell.centering, cell.unique_axis, consensus.crystals
                );
                for (parameter, fit) in CellParameter::ALL.into_iter().zip(consensus.fits) {
                    println!(
                        "  {:<5} = {:>8.2} {:<3} (sigma {:.3})",
                        parameter,
                        cell.parameter(parameter),
                        parameter.unit(),
                        fit.std_dev
                    );
                }
            }
            log::info!("Unit cell written to {}", output.display());
        }

        Commands::Info {
            source,
            size,
            locate,
            json,
        } => {
            let (geometry, _) = source.load()?;
            let shape = geometry.source_shape();
            let composer = ImageComposer::new(geometry, compose_config(size, CenterOffset::default()))?;
            let composed = composer.compose(Array2::<f32>::zeros(shape).view(), &[])?;

            if json {
                println!("{}", serde_json::to_string_pretty(&composed.panels)?);
            } else {
                let (rows, cols) = composer.image_size();
                println!("Source image: {}x{}", shape.0, shape.1);
                println!("Composed image: {}x{}", rows, cols);
                for layout in &composed.panels {
                    println!(
                        "  {:<8} {:<16} rows {}..{} cols {}..{}",
                        layout.name,
                        format!("{:?}", layout.orientation),
                        layout.row,
                        layout.row + layout.rows as i64,
                        layout.col,
                        layout.col + layout.cols as i64
                    );
                }
                for region in &composed.bad_regions {
                    println!(
                        "  {:<8} rows {:?} cols {:?}",
                        region.name,
                        region.rows(),
                        region.cols()
                    );
                }
            }

            if let Some((x, y)) = locate {
                match composed.locate(x, y) {
                    Some((panel, fs, ss)) => println!("({x}, {y}) -> {panel} fs {fs:.2} ss {ss:.2}"),
                    None => println!("({x}, {y}) -> no panel"),
                }
            }
        }
    }

    Ok(())
}
