//! Suryanamaskara coach: replay recorded landmark streams through the sequencer.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use surya_namaskar_coach::{
    classifier::{ReferenceClassifier, ReferenceKeypoints},
    coach::{FrameReport, PoseCoach},
    config::{Config, EXAMPLE_CONFIG},
    landmarks::LandmarkSet,
    poses::{normalize_pose_name, PoseSequence, YogaPose},
    replay::{read_records, FrameRecord},
    sequence::SequenceSession,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a session from a JSON-lines recording
    Replay {
        /// Recording to replay
        recording: PathBuf,

        /// Classify frames with these reference keypoints instead of recorded labels
        #[arg(short, long)]
        references: Option<PathBuf>,

        /// Practise a single pose instead of the configured sequence
        #[arg(short, long)]
        learn: Option<YogaPose>,

        /// Print one JSON report per frame
        #[arg(long)]
        json: bool,
    },

    /// List the poses of the configured sequence
    Poses {
        /// Include description and tips
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write an example configuration file
    InitConfig {
        /// Output path
        #[arg(default_value = "coach.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Average labelled recordings into a reference keypoints file
    BuildReferences {
        /// Output YAML path
        #[arg(short, long)]
        output: PathBuf,

        /// Labelled recordings
        #[arg(required = true)]
        recordings: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = load_config(args.config.as_deref());

    match args.command {
        Command::Replay {
            recording,
            references,
            learn,
            json,
        } => replay(&config, &recording, references, learn, json),
        Command::Poses { verbose } => {
            list_poses(&config.session.sequence, verbose);
            Ok(())
        }
        Command::InitConfig { output, force } => init_config(&output, force),
        Command::BuildReferences { output, recordings } => build_references(&output, &recordings),
    }
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    info!("Loading configuration from: {}", path.display());
    let config = match Config::from_file(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Failed to load config file: {}. Using defaults.", e);
            return Config::default();
        }
    };
    if let Err(e) = config.validate() {
        warn!("Invalid configuration: {}. Using defaults.", e);
        return Config::default();
    }
    config
}

fn replay(
    config: &Config,
    recording: &Path,
    references: Option<PathBuf>,
    learn: Option<YogaPose>,
    json: bool,
) -> Result<()> {
    let records = read_records(recording).with_context(|| format!("Failed to read {}", recording.display()))?;
    info!("Loaded {} frames from {}", records.len(), recording.display());

    let mut template = config.session_template();
    if let Some(pose) = learn {
        info!("Learn mode: {}", pose.display_name());
        template.sequence = PoseSequence::single(pose);
    }
    let session = template.build();

    let summary = match references.or_else(|| config.classifier.reference_keypoints.clone()) {
        Some(path) => {
            let refs = ReferenceKeypoints::from_file(&path)
                .with_context(|| format!("Failed to load reference keypoints from {}", path.display()))?;
            let classifier = ReferenceClassifier::new(&refs)?;
            let coach = PoseCoach::new(classifier, session).with_confidence_scale(config.confidence_scale());
            replay_classified(coach, &records, json)?
        }
        None => replay_labelled(session, &records, json)?,
    };

    let (processed, skipped) = summary.frame_counts();
    println!(
        "Completed {}/{} poses ({} frames processed, {} without a body)",
        summary.state().current_pose_index.min(summary.sequence().len()),
        summary.sequence().len(),
        processed,
        skipped
    );
    Ok(())
}

fn replay_labelled(mut session: SequenceSession, records: &[FrameRecord], json: bool) -> Result<SequenceSession> {
    for (i, record) in records.iter().enumerate() {
        let landmarks = frame_landmarks(record, i)?;
        let label = match (&record.label, &landmarks) {
            (Some(label), _) => label.as_str(),
            (None, None) => "",
            (None, Some(_)) => bail!("Frame {} has landmarks but no label; pass --references to classify", i + 1),
        };
        let report = FrameReport::new(session.process_frame(label, landmarks.as_ref()), None);
        print_report(&report, json)?;
        if report.feedback.completed {
            break;
        }
    }
    Ok(session)
}

fn replay_classified(
    mut coach: PoseCoach<ReferenceClassifier>,
    records: &[FrameRecord],
    json: bool,
) -> Result<SequenceSession> {
    let (mut labelled, mut agreed) = (0_usize, 0_usize);
    for (i, record) in records.iter().enumerate() {
        let landmarks = frame_landmarks(record, i)?;
        let report = coach
            .process(landmarks.as_ref())
            .with_context(|| format!("Frame {}", i + 1))?;
        if let (Some(expected), Some(predicted)) = (&record.label, &report.feedback.classifier_label) {
            labelled += 1;
            if normalize_pose_name(expected) == *predicted {
                agreed += 1;
            }
        }
        print_report(&report, json)?;
        if report.feedback.completed {
            break;
        }
    }
    if labelled > 0 {
        info!("Classifier agreed with {}/{} recorded labels", agreed, labelled);
    }
    Ok(coach.session().clone())
}

fn frame_landmarks(record: &FrameRecord, index: usize) -> Result<Option<LandmarkSet>> {
    record
        .to_landmarks()
        .with_context(|| format!("Frame {} has invalid landmarks", index + 1))
}

fn print_report(report: &FrameReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else if report.feedback.advanced {
        let held = report.feedback.target_pose.map_or("pose", YogaPose::display_name);
        if report.feedback.completed {
            println!("Held {held}, sequence complete");
        } else {
            println!("Held {held}");
        }
    }
    Ok(())
}

fn list_poses(sequence: &PoseSequence, verbose: bool) {
    for (i, pose) in sequence.poses().iter().enumerate() {
        println!("{:2}. {} ({})", i + 1, pose.display_name(), pose.name());
        if verbose {
            println!("    {}", pose.description());
            for tip in pose.tips() {
                println!("    - {tip}");
            }
        }
    }
}

fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    std::fs::write(output, EXAMPLE_CONFIG).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote example configuration to {}", output.display());
    Ok(())
}

fn build_references(output: &Path, recordings: &[PathBuf]) -> Result<()> {
    let mut samples = Vec::new();
    for path in recordings {
        let records = read_records(path).with_context(|| format!("Failed to read {}", path.display()))?;
        for (i, record) in records.iter().enumerate() {
            match (&record.label, frame_landmarks(record, i)?) {
                (Some(label), Some(landmarks)) => samples.push((label.clone(), landmarks)),
                _ => continue,
            }
        }
    }
    if samples.is_empty() {
        bail!("No labelled frames with landmarks found");
    }

    let refs = ReferenceKeypoints::from_samples(samples.iter().map(|(label, lm)| (label.as_str(), lm)));
    refs.to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {} reference poses from {} frames to {}",
        refs.len(),
        samples.len(),
        output.display()
    );
    Ok(())
}
