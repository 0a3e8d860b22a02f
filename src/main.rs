//! Gati - run motion scenarios on the simulated robot
//!
//! Usage:
//!   gati square-ccw --speed 0.2 --distance 0.5
//!   gati closed-loop --imu
//!   gati --config gati.toml straight
//!   gati --dump-config > gati.toml
//!
//! Log level comes from `[logging] level`; `RUST_LOG` overrides it.

use clap::{Parser, ValueEnum};
use gati::devices::mock::SimRobot;
use gati::drivers::LogTelemetry;
use gati::error::Result;
use gati::{RobotConfig, TurnDirection};
use std::f32::consts::{FRAC_PI_2, PI};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Scenario {
    /// Segmented straight line forward
    Straight,
    /// Segmented straight line backward
    Backward,
    /// Segmented square, turning right at each corner
    SquareCw,
    /// Segmented square, turning left at each corner
    SquareCcw,
    /// Segmented 90° rotation to the left
    Spin,
    /// Closed-loop drive then a closed-loop half turn
    ClosedLoop,
}

/// Drive the simulated robot through a scenario and report the pose estimate
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to run
    #[arg(value_enum, default_value_t = Scenario::SquareCcw)]
    scenario: Scenario,

    /// Configuration file path (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the gyro for heading (calibrates the bias first)
    #[arg(long)]
    imu: bool,

    /// Distance or square side length in meters
    #[arg(short, long, default_value_t = 1.0)]
    distance: f32,

    /// Wheel speed in m/s
    #[arg(short, long, default_value_t = 0.2)]
    speed: f32,

    /// Only print encoder totals after each segment
    #[arg(long)]
    encoders_only: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RobotConfig::load(path)?,
        None => RobotConfig::default(),
    };
    if args.imu {
        config.navigator.use_imu = true;
    }

    if args.dump_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Gati v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config {
        Some(path) => log::info!("Using config: {}", path.display()),
        None => log::info!("Using built-in defaults ({:?})", config.revision),
    }

    let sim = SimRobot::from_robot_config(&config);
    let mut pilot = sim.build_pilot(&config)?;
    let mut sink = if args.encoders_only {
        LogTelemetry::encoders_only()
    } else {
        LogTelemetry::new()
    };

    log::info!("Running {:?}", args.scenario);
    let result = match args.scenario {
        Scenario::Straight => pilot
            .drive_segmented(args.distance, args.speed, &mut sink)
            .map(|_| ()),
        Scenario::Backward => pilot
            .drive_segmented(-args.distance, args.speed, &mut sink)
            .map(|_| ()),
        Scenario::SquareCw => pilot
            .square(args.distance, args.speed, TurnDirection::Right, &mut sink)
            .map(|_| ()),
        Scenario::SquareCcw => pilot
            .square(args.distance, args.speed, TurnDirection::Left, &mut sink)
            .map(|_| ()),
        Scenario::Spin => pilot
            .rotate_segmented(FRAC_PI_2, args.speed, &mut sink)
            .map(|_| ()),
        Scenario::ClosedLoop => run_closed_loop(&mut pilot, &args),
    };

    pilot.halt();
    if let Err(e) = result {
        log::error!("Scenario failed: {}", e);
        return Err(e);
    }

    let estimate = pilot.pose();
    let truth = sim.true_pose();
    log::info!(
        "Estimate: x={:.4}, y={:.4}, theta(deg)={:.2}",
        estimate.x,
        estimate.y,
        estimate.theta.to_degrees()
    );
    log::info!(
        "Truth:    x={:.4}, y={:.4}, theta(deg)={:.2}",
        truth.x,
        truth.y,
        truth.theta.to_degrees()
    );
    log::info!(
        "Error:    position={:.4}m, heading={:.2}deg",
        estimate.distance_to(&truth),
        gati::core::math::normalize_angle(estimate.theta - truth.theta).to_degrees()
    );

    Ok(())
}

fn run_closed_loop(pilot: &mut gati::Pilot, args: &Args) -> Result<()> {
    let drive = pilot.drive_distance(args.distance, args.speed)?;
    log::info!(
        "Drive: {:?} after {}ms, traveled {:.4}m",
        drive.termination,
        drive.elapsed_ms,
        drive.traveled
    );

    let turn = pilot.rotate_angle(PI, args.speed)?;
    log::info!(
        "Rotate: {:?} after {}ms, turned {:.2}deg",
        turn.termination,
        turn.elapsed_ms,
        turn.traveled.to_degrees()
    );
    Ok(())
}
