//! bjpeg CLI - baseline JPEG encoder
//!
//! Encodes PGM/PPM images or raw interleaved pixel buffers to JPEG.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use bjpeg::jpeg::{self, JpegOptions, Subsampling};
use bjpeg::ColorType;

/// A small baseline JPEG encoder.
///
/// Accepts PGM (P5) and PPM (P6) files, or raw 8-bit pixels when
/// `--width` and `--height` are given.
#[derive(Parser, Debug)]
#[command(name = "bjpeg")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    bjpeg photo.ppm -o photo.jpg                       Encode a PPM file
    bjpeg photo.ppm -o photo.jpg -q 90                 Higher quality
    bjpeg photo.ppm -o photo.jpg --subsampling s444    Full-resolution chroma
    bjpeg pixels.raw --width 640 --height 480 --channels 3 -o out.jpg
    cat scan.pgm | bjpeg - -o - > scan.jpg             Stream stdin to stdout")]
struct Args {
    /// Input image (PGM/PPM or raw pixels), or - for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path, or - for stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// JPEG quality (1-100, higher = better quality)
    #[arg(short, long, default_value = "85", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Width of raw input in pixels
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Height of raw input in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Channels per pixel of raw input (1 = gray, 3 = RGB)
    #[arg(long, default_value = "1")]
    channels: u8,

    /// Chroma subsampling
    #[arg(long, value_enum, default_value = "s420")]
    subsampling: SubsamplingArg,

    /// Convert to grayscale
    #[arg(long)]
    grayscale: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Encode without writing any files
    #[arg(long, short = 'n')]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SubsamplingArg {
    /// 4:4:4 - No subsampling (best quality)
    S444,
    /// 4:2:0 - 2x2 chroma downsample (smaller file)
    S420,
}

impl From<SubsamplingArg> for Subsampling {
    fn from(arg: SubsamplingArg) -> Self {
        match arg {
            SubsamplingArg::S444 => Subsampling::S444,
            SubsamplingArg::S420 => Subsampling::S420,
        }
    }
}

/// Loaded pixel data.
struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    color_type: ColorType,
    input_format: &'static str,
}

/// Parse a binary PGM (P5) or PPM (P6) file with an 8-bit maxval.
///
/// The header is four whitespace-separated fields (magic, width, height,
/// maxval) with `#` comments running to end of line. A single whitespace
/// byte separates maxval from the raster.
fn decode_pnm(data: Vec<u8>) -> Result<SourceImage, Box<dyn std::error::Error>> {
    let mut fields: Vec<&[u8]> = Vec::with_capacity(4);
    let mut pos = 0;
    while fields.len() < 4 {
        match data.get(pos).copied() {
            None => return Err("Truncated PNM header".into()),
            Some(b'#') => {
                while data.get(pos).is_some_and(|&b| b != b'\n') {
                    pos += 1;
                }
            }
            Some(b) if b.is_ascii_whitespace() => pos += 1,
            Some(_) => {
                let start = pos;
                while data
                    .get(pos)
                    .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'#')
                {
                    pos += 1;
                }
                fields.push(&data[start..pos]);
            }
        }
    }
    // The separator after maxval
    let raster_start = pos + 1;

    let (color_type, input_format) = match fields[0] {
        b"P5" => (ColorType::Gray, "PGM"),
        b"P6" => (ColorType::Rgb, "PPM"),
        other => {
            let magic = String::from_utf8_lossy(other);
            return Err(format!("Unsupported PNM type '{magic}', expected P5 or P6").into());
        }
    };
    let number = |field: &[u8]| -> Result<u32, Box<dyn std::error::Error>> {
        Ok(std::str::from_utf8(field)?.parse()?)
    };
    let width = number(fields[1])?;
    let height = number(fields[2])?;
    let max_val = number(fields[3])?;
    if max_val != 255 {
        return Err(format!("PNM maxval {max_val} is not supported, only 255").into());
    }

    let raster_len = width as usize * height as usize * color_type.bytes_per_pixel();
    let pixels = data
        .get(raster_start..raster_start + raster_len)
        .ok_or_else(|| format!("PNM raster is shorter than {raster_len} bytes"))?
        .to_vec();

    Ok(SourceImage {
        width,
        height,
        pixels,
        color_type,
        input_format,
    })
}

fn is_pnm(data: &[u8]) -> bool {
    data.starts_with(b"P5") || data.starts_with(b"P6")
}

fn load_image(data: Vec<u8>, args: &Args) -> Result<SourceImage, Box<dyn std::error::Error>> {
    if let (Some(width), Some(height)) = (args.width, args.height) {
        let color_type = ColorType::from_channels(args.channels)?;
        return Ok(SourceImage {
            width,
            height,
            pixels: data,
            color_type,
            input_format: "raw",
        });
    }
    if is_pnm(&data) {
        return decode_pnm(data);
    }
    Err("Unknown input format. Supported: PGM (P5), PPM (P6), or raw pixels with --width/--height".into())
}

/// Collapse RGB to luma with the same weights the encoder uses for Y.
fn to_grayscale(pixels: &[u8], color_type: ColorType) -> Vec<u8> {
    match color_type {
        ColorType::Gray => pixels.to_vec(),
        ColorType::Rgb => pixels
            .chunks_exact(3)
            .map(|p| bjpeg::color::rgb_to_ycbcr(p[0], p[1], p[2]).0)
            .collect(),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let is_stdin = args.input.as_os_str() == "-";
    let is_stdout = args
        .output
        .as_ref()
        .map(|p| p.as_os_str() == "-")
        .unwrap_or(false);

    let start = Instant::now();
    let data = if is_stdin {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .map_err(|e| format!("Can't read from stdin: {e}"))?;
        buffer
    } else {
        fs::read(&args.input).map_err(|e| {
            if args.input.exists() {
                format!("Can't read '{}': {e}", args.input.display())
            } else {
                format!(
                    "File not found: '{}'. Check that the path is correct.",
                    args.input.display()
                )
            }
        })?
    };
    let input_size = data.len() as u64;
    let img = load_image(data, &args)?;
    let load_time = start.elapsed();

    let width = img.width;
    let height = img.height;

    if args.verbose {
        let input = &args.input;
        let ct = img.color_type;
        eprintln!("Loaded: {input:?}");
        eprintln!("  Input format: {}", img.input_format);
        eprintln!("  Dimensions: {width}x{height}");
        eprintln!("  Color type: {ct:?}");
        eprintln!("  Load time: {load_time:.2?}");
    }

    let output_path = if is_stdin {
        args.output.clone().ok_or(
            "When reading from stdin (-), you must specify an output file with -o/--output",
        )?
    } else {
        args.output.clone().unwrap_or_else(|| {
            let mut path = args.input.clone();
            path.set_extension("jpg");
            path
        })
    };

    let (pixels, color_type) = if args.grayscale {
        (to_grayscale(&img.pixels, img.color_type), ColorType::Gray)
    } else {
        (img.pixels, img.color_type)
    };

    let options = JpegOptions::builder(width, height)
        .color_type(color_type)
        .quality(args.quality)
        .subsampling(args.subsampling.into())
        .build();

    let encode_start = Instant::now();
    let mut output_data = Vec::new();
    jpeg::encode_into(&mut output_data, &pixels, &options)?;
    let encode_time = encode_start.elapsed();

    let output_size = output_data.len() as u64;
    let ratio = if input_size > 0 {
        (output_size as f64 / input_size as f64) * 100.0
    } else {
        0.0
    };

    let output_display = if is_stdout {
        "<stdout>".to_string()
    } else {
        output_path.display().to_string()
    };

    if args.dry_run {
        if !args.quiet {
            eprintln!("Dry run: would write to {output_display}");
            eprintln!(
                "{} -> {} ({:.1}%)",
                format_size(input_size),
                format_size(output_size),
                ratio
            );
        }
        return Ok(());
    }

    if is_stdout {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(&output_data)
            .and_then(|()| stdout.flush())
            .map_err(|e| format!("Can't write to stdout: {e}"))?;
    } else {
        fs::write(&output_path, &output_data).map_err(|e| {
            format!(
                "Can't write to '{}': {}. Check that the directory exists and is writable.",
                output_path.display(),
                e
            )
        })?;
    }

    // Results go to stderr when stdout carries the image
    let print_results = |msg: &str| {
        if is_stdout {
            eprintln!("{msg}");
        } else {
            println!("{msg}");
        }
    };

    if args.verbose {
        eprintln!("Output: {output_display}");
        eprintln!("  Color type: {color_type:?}");
        eprintln!("  Quality: {}", args.quality);
        if color_type == ColorType::Rgb {
            eprintln!("  Subsampling: {:?}", args.subsampling);
        }
        eprintln!("  Encode time: {encode_time:.2?}");
        eprintln!(
            "  Size: {} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        );
    } else if !args.quiet {
        print_results(&format!(
            "{} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        ));
    }

    Ok(())
}

/// Human-readable byte count in binary units.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
