use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kinema::{
    bbox::{rotated_corners, rotation_origin},
    clip::{collect_clip_refs, DEFAULT_MAX_DEPTH},
    model::Placement,
    morph_path, ObjectId, Project,
};
use kurbo::Point;
use thiserror::Error;

#[derive(Parser)]
#[command(about = "Resolve and inspect keyframed vector animation projects")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print what every visible layer shows at a frame, as json
    Resolve {
        #[arg(long)]
        project: PathBuf,

        #[arg(long)]
        #[clap(default_value_t = 1)]
        frame: u32,

        /// Replace clip-instances with the content of their clip
        #[arg(long)]
        expand: bool,

        #[arg(long)]
        #[clap(default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Write here instead of stdout
        #[arg(long)]
        out_file: Option<PathBuf>,
    },
    /// Print the box and rotated corners of an object at a frame
    Bbox {
        #[arg(long)]
        project: PathBuf,

        #[arg(long)]
        #[clap(default_value_t = 1)]
        frame: u32,

        #[arg(long)]
        id: String,
    },
    /// Morph between two path command strings
    Morph {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long)]
        #[clap(default_value_t = 0.5)]
        t: f64,
    },
    /// Load a project and report problems
    Check {
        #[arg(long)]
        project: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Kinema(#[from] kinema::Error),
    #[error("Unable to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to serialize: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Frame {0} is outside 1..={1}")]
    FrameOutOfRange(u32, u32),
    #[error("No object '{0}' at frame {1}")]
    NoSuchObject(String, u32),
    #[error("'{0}' has no geometry")]
    NoGeometry(String),
}

fn check_frame(project: &Project, frame: u32) -> Result<(), CliError> {
    if frame == 0 || frame > project.total_frames {
        return Err(CliError::FrameOutOfRange(frame, project.total_frames));
    }
    Ok(())
}

fn resolve(
    project: &Project,
    frame: u32,
    expand: bool,
    max_depth: usize,
    out_file: Option<PathBuf>,
) -> Result<(), CliError> {
    check_frame(project, frame)?;
    let layers = if expand {
        project.resolve_expanded(frame, max_depth)?
    } else {
        project.resolve(frame)
    };
    let json = serde_json::to_string_pretty(&layers)?;
    match out_file {
        Some(out_file) => {
            fs::write(&out_file, json)?;
            eprintln!("Wrote {}", out_file.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn bbox(project: &Project, frame: u32, id: &str) -> Result<(), CliError> {
    check_frame(project, frame)?;
    let object = project
        .find_object(frame, &ObjectId::from(id))
        .ok_or_else(|| CliError::NoSuchObject(id.to_string(), frame))?;
    let bounds = kinema::bounding_box(&object, &project.clips)
        .ok_or_else(|| CliError::NoGeometry(id.to_string()))?;
    let rotation = object.shape.rotation();
    let origin = rotation_origin(&object.shape, bounds);
    println!(
        "{} {id} x {:.2} y {:.2} width {:.2} height {:.2}",
        object.kind(),
        bounds.x0,
        bounds.y0,
        bounds.width(),
        bounds.height()
    );
    println!(
        "rotation {rotation:.2} around ({:.2}, {:.2})",
        origin.x, origin.y
    );
    let corners: Vec<_> = rotated_corners(bounds, rotation, origin)
        .iter()
        .map(|Point { x, y }| format!("({x:.2}, {y:.2})"))
        .collect();
    println!("corners {}", corners.join(" "));
    Ok(())
}

fn check(project: &Project) {
    eprintln!(
        "{} layers, {} clips, {} frames at {} fps",
        project.layers.len(),
        project.clips.ids().count(),
        project.total_frames,
        project.frame_rate
    );

    let mut refs = BTreeSet::new();
    for layer in project.layers.iter() {
        for keyframe in layer.keyframes() {
            if keyframe.frame > project.total_frames {
                log::warn!(
                    "Layer '{}' has a keyframe at {} past the last frame {}",
                    layer.name,
                    keyframe.frame,
                    project.total_frames
                );
            }
            collect_clip_refs(&keyframe.objects, &mut refs);
        }
    }
    for id in project.clips.ids() {
        if let Some(clip) = project.clips.get(id) {
            for layer in clip.layers.iter() {
                for keyframe in layer.keyframes() {
                    collect_clip_refs(&keyframe.objects, &mut refs);
                }
            }
        }
    }
    for missing in refs.iter().filter(|id| project.clips.get(id).is_none()) {
        log::warn!("Clip '{missing}' is referenced but not defined, it will use a placeholder box");
    }
    eprintln!("OK");
}

fn main() -> Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Resolve {
            project,
            frame,
            expand,
            max_depth,
            out_file,
        } => resolve(&Project::load(project)?, frame, expand, max_depth, out_file)?,
        Command::Bbox { project, frame, id } => bbox(&Project::load(project)?, frame, &id)?,
        Command::Morph { from, to, t } => println!("{}", morph_path(&from, &to, t)),
        Command::Check { project } => check(&Project::load(project)?),
    }
    Ok(())
}
