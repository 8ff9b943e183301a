//! Writes an svg to help visualize easing curves

use std::fs;
use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use kinema::{EaseDirection, Tween};

/// Clap-friendly version of [EaseDirection]
#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliDirection {
    In,
    Out,
    InOut,
}

impl CliDirection {
    fn to_lib(self) -> EaseDirection {
        match self {
            CliDirection::In => EaseDirection::In,
            CliDirection::Out => EaseDirection::Out,
            CliDirection::InOut => EaseDirection::InOut,
        }
    }
}

#[derive(Parser)]
struct Args {
    #[arg(long, value_enum)]
    #[clap(default_value = "in-out")]
    direction: CliDirection,

    /// Points sampled per curve
    #[arg(long)]
    #[clap(default_value_t = 60)]
    samples: usize,

    #[arg(long)]
    #[clap(default_value = "/tmp/easing.svg")]
    out_file: PathBuf,
}

/// Plot units per unit of progress or value
const SCALE: f64 = 100.0;

fn color(i: usize) -> String {
    const PALETTE: [(u8, u8, u8); 8] = [
        (0x1f, 0x77, 0xb4),
        (0xff, 0x7f, 0x0e),
        (0x2c, 0xa0, 0x2c),
        (0xd6, 0x27, 0x28),
        (0x94, 0x67, 0xbd),
        (0x8c, 0x56, 0x4b),
        (0xe3, 0x77, 0xc2),
        (0x7f, 0x7f, 0x7f),
    ];
    let (r, g, b) = PALETTE[i % PALETTE.len()];
    format!("#{r:02x}{g:02x}{b:02x}")
}

pub fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let direction = args.direction.to_lib();
    let samples = args.samples.max(2);

    let curves: Vec<_> = Tween::ALL
        .iter()
        .map(|tween| {
            let points: Vec<_> = (0..=samples)
                .map(|i| {
                    let t = i as f64 / samples as f64;
                    (t * SCALE, tween.ease(direction, t) * SCALE)
                })
                .collect();
            (*tween, points)
        })
        .collect();

    // elastic and bounce overshoot, fit the view to what was actually drawn
    let (min_value, max_value) = curves
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(_, v)| *v))
        .fold((0.0f64, SCALE), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let margin = 0.1 * SCALE;
    let value_span = max_value - min_value;

    let mut svg = String::new();
    svg.push_str(&format!("<svg viewBox=\"{:.2} {:.2} {:.2} {:.2}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\" >\n",
        -margin,
        -max_value - margin,
        SCALE + 3.0 * margin,
        value_span + 2.0 * margin));
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"{:.2}\" width=\"{SCALE}\" height=\"{SCALE}\" fill=\"none\" stroke=\"#ccc\" stroke-width=\"0.2\" />\n",
        -SCALE
    ));

    for (i, (tween, points)) in curves.iter().enumerate() {
        let color = color(i);
        svg.push_str(&format!("\n  <!-- {tween} -->\n"));
        // y-up so the curves read the usual way
        let d: Vec<_> = points
            .iter()
            .enumerate()
            .map(|(j, (t, v))| {
                let cmd = if j == 0 { 'M' } else { 'L' };
                format!("{cmd}{t:.2},{:.2}", -v)
            })
            .collect();
        svg.push_str(&format!(
            "  <path fill=\"none\" stroke=\"{color}\" stroke-width=\"0.4\" d=\"{}\" />\n",
            d.join(" ")
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"4\" fill=\"{color}\">{tween}</text>\n",
            SCALE + margin / 2.0,
            -max_value + 5.0 * (i + 1) as f64
        ));
    }
    svg.push_str("</svg>\n");

    fs::write(&args.out_file, svg)?;
    log::info!("Wrote {}", args.out_file.display());
    Ok(())
}
