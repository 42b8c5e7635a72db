use clap::{Parser, Subcommand};
use fiducial_registration::config::{load_config_or_default, Config};
use fiducial_registration::logging::{clear_correlation_id, init_logging, new_correlation_id, RegistrationSpan};
use fiducial_registration::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "register")]
#[command(about = "Landmark-based rigid and similarity registration of fiducial lists")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the transform mapping one fiducial list onto another
    Align {
        /// Fiducial list to move
        #[arg(short, long)]
        from: PathBuf,

        /// Fiducial list to align onto
        #[arg(short, long)]
        to: PathBuf,

        /// RigidBody or Similarity (unrecognized values fall back to RigidBody)
        #[arg(short, long)]
        mode: Option<String>,

        /// Output file for the transform
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the registration report
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Append a tracked probe tip position to a fiducial list
    Capture {
        /// Probe-to-world pose (transform file)
        #[arg(short, long)]
        pose: PathBuf,

        /// Fiducial list to append to (created if missing)
        #[arg(short, long)]
        list: PathBuf,

        /// Reference-to-world pose; the tip is stored in the reference frame
        #[arg(short, long)]
        reference: Option<PathBuf>,
    },

    /// Report fiducial registration error of an existing transform
    Residuals {
        #[arg(short = 'T', long)]
        transform: PathBuf,

        #[arg(short, long)]
        from: PathBuf,

        #[arg(short, long)]
        to: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config_or_default(cli.config.as_deref());
    match cli.verbose {
        0 => {}
        1 => config.logging.global_level = "info".to_string(),
        2 => config.logging.global_level = "debug".to_string(),
        _ => {
            config.logging.global_level = "trace".to_string();
            config.logging.algorithm_level = "trace".to_string();
        }
    }
    let _guard = init_logging(&config.logging)?;

    match cli.command {
        Commands::Align { from, to, mode, output, report } => {
            handle_align(&config, from, to, mode, output, report)?;
        }
        Commands::Capture { pose, list, reference } => {
            handle_capture(pose, list, reference)?;
        }
        Commands::Residuals { transform, from, to } => {
            handle_residuals(&config, transform, from, to)?;
        }
    }

    Ok(())
}

fn handle_align(
    config: &Config,
    from_path: PathBuf,
    to_path: PathBuf,
    mode: Option<String>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mode = mode
        .map(|m| AlignmentMode::from_name(&m))
        .unwrap_or(config.registration.default_mode);
    let run = RegistrationSpan::new(mode, new_correlation_id());
    let _enter = run.enter();

    let from = load_fiducial_list(&from_path)?;
    let to = load_fiducial_list(&to_path)?;
    run.record_inputs(&from.name, &to.name, from.len());

    let mut wizard = RegistrationWizard::new();
    let mut node = LinearTransformNode::new("Registration");
    let status = wizard.calculate_transform(Some(&from), Some(&to), Some(&mut node), mode.name());
    run.record_result(&status, wizard.last_registration_error());

    println!("{}", status);
    let rms = match wizard.last_registration_error() {
        Some(rms) => rms,
        None => {
            clear_correlation_id();
            anyhow::bail!("Registration failed: {}", status)
        }
    };

    let transform = node.matrix_to_parent;
    println!("Mode: {}", mode);
    println!("{:.*}", config.output.precision, transform);
    println!("RMS fiducial error: {:.4}", rms);
    if rms > config.registration.warn_rms_threshold {
        tracing::warn!(rms_error = rms, threshold = config.registration.warn_rms_threshold, "Fiducial error above threshold");
    }

    if let Some(path) = output {
        save_transform(&transform, &path)?;
        println!("Transform saved to {:?}", path);
    }

    let report_path = report.or_else(|| {
        config
            .output
            .write_report
            .then(|| PathBuf::from(format!("registration-{}.json", run.run_id())))
    });
    if let Some(path) = report_path {
        let summary = RegistrationReport::new(
            run.run_id(),
            mode,
            transform,
            &from.to_point_set(),
            &to.to_point_set(),
        );
        std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        println!("Report saved to {:?}", path);
    }

    clear_correlation_id();
    Ok(())
}

fn handle_capture(pose_path: PathBuf, list_path: PathBuf, reference_path: Option<PathBuf>) -> anyhow::Result<()> {
    let pose = load_transform(&pose_path)?;
    let reference = reference_path.as_deref().map(load_transform).transpose()?;
    let list = if list_path.exists() {
        load_fiducial_list(&list_path)?
    } else {
        let name = list_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "F".to_string());
        FiducialList::new(&name)
    };

    let mut wizard = RegistrationWizard::new();
    wizard.set_active_list(list);
    let added = match &reference {
        Some(reference) => wizard.add_fiducial_in_reference(Some(&pose), reference),
        None => wizard.add_fiducial(Some(&pose)),
    };
    match added {
        Some(index) => {
            let position = wizard.active_list().and_then(|list| list.nth_position(index));
            println!("Added fiducial #{} at {:?}", index + 1, position.map(|p| [p.x, p.y, p.z]));
        }
        None => anyhow::bail!("Reference pose is not invertible; nothing captured"),
    }

    if let Some(list) = wizard.take_active_list() {
        save_fiducial_list(&list, &list_path)?;
    }
    Ok(())
}

fn handle_residuals(
    config: &Config,
    transform_path: PathBuf,
    from_path: PathBuf,
    to_path: PathBuf,
) -> anyhow::Result<()> {
    let transform = load_transform(&transform_path)?;
    let from = load_fiducial_list(&from_path)?;
    let to = load_fiducial_list(&to_path)?;
    validate_fiducial_count(&from, MIN_LANDMARKS)?;
    validate_fiducial_count(&to, MIN_LANDMARKS)?;
    if from.len() != to.len() {
        anyhow::bail!("{}", AlignmentError::MismatchedCounts { from: from.len(), to: to.len() });
    }

    let from_points = from.to_point_set();
    let to_points = to.to_point_set();
    for (fiducial, residual) in from.fiducials.iter().zip(residuals(&transform, &from_points, &to_points)) {
        println!("{:<16} {:.*}", fiducial.label, config.output.precision, residual);
    }
    println!("RMS fiducial error: {:.4}", rms_error(&transform, &from_points, &to_points));
    Ok(())
}
